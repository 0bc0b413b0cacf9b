//! Reward evaluation.
//!
//! Scoring is a pluggable policy behind one contract: a pure function
//! of the current snapshot (and optionally the previous one) yielding a
//! scalar reward and a terminal flag. Two policies ship:
//!
//! - [`ScoreReward`] — the plain score-growth formula.
//! - [`HuntReward`] — score growth with a floor-clamped food term plus
//!   kill and proximity bonuses.
//!
//! Both treat empty optional groups as zero contributions and are
//! terminal exactly when the snapshot marks the self agent dead.

use coil_core::{Snapshot, SnapshotError};

/// One step's scoring result.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RewardSignal {
    /// Scalar reward for the transition into `current`.
    pub reward: f32,
    /// Whether the episode ended on this snapshot.
    pub terminal: bool,
}

/// Pluggable per-step scoring.
///
/// `previous` is the snapshot consumed by the preceding step (absent on
/// the first step after a reset); policies that only need producer-side
/// deltas such as `food_eaten` may ignore it.
pub trait RewardPolicy: Send {
    /// Score the transition into `current`.
    ///
    /// # Errors
    ///
    /// [`SnapshotError::MissingSelf`] when `current` has no self agent.
    fn evaluate(
        &self,
        previous: Option<&Snapshot>,
        current: &Snapshot,
    ) -> Result<RewardSignal, SnapshotError>;
}

// ── ScoreReward ──────────────────────────────────────────────────

/// Score-growth reward: `size · size_weight + food_eaten · food_weight`,
/// minus `death_penalty` when the agent is dead.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreReward {
    /// Weight on the agent's current size. Default: 0.5.
    pub size_weight: f32,
    /// Weight on the per-tick score delta. Default: 10.0.
    pub food_weight: f32,
    /// Fixed penalty applied once when the agent is dead. Default: 100.0.
    pub death_penalty: f32,
}

impl Default for ScoreReward {
    fn default() -> Self {
        Self {
            size_weight: 0.5,
            food_weight: 10.0,
            death_penalty: 100.0,
        }
    }
}

impl RewardPolicy for ScoreReward {
    fn evaluate(
        &self,
        _previous: Option<&Snapshot>,
        current: &Snapshot,
    ) -> Result<RewardSignal, SnapshotError> {
        let agent = current.slither.as_ref().ok_or(SnapshotError::MissingSelf)?;
        let mut reward = agent.size * self.size_weight + agent.food_eaten * self.food_weight;
        let terminal = current.is_dead();
        if terminal {
            reward -= self.death_penalty;
        }
        Ok(RewardSignal { reward, terminal })
    }
}

// ── HuntReward ───────────────────────────────────────────────────

/// Aggressive-play reward.
///
/// The food term is clamped to a floor before weighting so a negative
/// score delta (the producer's score estimate can dip) cannot run away,
/// then scaled up with the agent's current size. On top of that: a
/// fixed death penalty, a fixed bonus once per tick when any rival died,
/// and a proximity bonus per dead rival whose head lies within
/// [`proximity_range`](HuntReward::proximity_range) of any of the
/// agent's own body segments — at most once per dead rival no matter
/// how many segments are in range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HuntReward {
    /// Lower clamp on the raw `food_eaten` value. Default: -5.0.
    pub food_floor: f32,
    /// Weight on the clamped food term. Default: 10.0.
    pub food_weight: f32,
    /// Size scaling: the food term is multiplied by
    /// `1 + size · size_gain`. Default: 0.01.
    pub size_gain: f32,
    /// Fixed penalty applied once when the agent is dead. Default: 100.0.
    pub death_penalty: f32,
    /// Fixed bonus applied once per tick when any rival died. Default: 50.0.
    pub kill_bonus: f32,
    /// Bonus per dead rival that died within reach. Default: 25.0.
    pub proximity_bonus: f32,
    /// Reach in world units for the proximity bonus. Default: 20.0.
    pub proximity_range: f32,
}

impl Default for HuntReward {
    fn default() -> Self {
        Self {
            food_floor: -5.0,
            food_weight: 10.0,
            size_gain: 0.01,
            death_penalty: 100.0,
            kill_bonus: 50.0,
            proximity_bonus: 25.0,
            proximity_range: 20.0,
        }
    }
}

impl RewardPolicy for HuntReward {
    fn evaluate(
        &self,
        _previous: Option<&Snapshot>,
        current: &Snapshot,
    ) -> Result<RewardSignal, SnapshotError> {
        let agent = current.slither.as_ref().ok_or(SnapshotError::MissingSelf)?;

        let food = agent.food_eaten.max(self.food_floor);
        let mut reward = food * self.food_weight * (1.0 + agent.size * self.size_gain);

        let terminal = current.is_dead();
        if terminal {
            reward -= self.death_penalty;
        }

        let mut any_kill = false;
        for rival in current.others.iter().filter(|r| r.dead) {
            any_kill = true;
            let in_reach = agent.parts.iter().any(|part| {
                let dx = part.x - rival.x;
                let dy = part.y - rival.y;
                (dx * dx + dy * dy).sqrt() <= self.proximity_range
            });
            if in_reach {
                reward += self.proximity_bonus;
            }
        }
        if any_kill {
            reward += self.kill_bonus;
        }

        Ok(RewardSignal { reward, terminal })
    }
}
