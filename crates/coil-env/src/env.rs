//! The synchronous control-loop adapter.
//!
//! [`GameEnv`] exposes the reset/step contract a policy consumer
//! drives. Each call consumes exactly one queued snapshot from the
//! mailbox — never zero, never two — so the control loop can neither
//! skip nor double-consume a game tick.
//!
//! The env owns the consumer side of the mailbox; the transport server
//! owns the producer side. The policy itself is external: callers run
//! `predict(observation) → action` however they like and feed the
//! action back through [`step`](GameEnv::step).

use std::error::Error;
use std::fmt;
use std::sync::{Arc, Mutex};

use coil_core::{Action, Snapshot, SnapshotError};
use coil_obs::{encode, GridSpec, ObsGrid, SpecError};

use crate::mailbox::Mailbox;
use crate::reward::RewardPolicy;

// ── EnvError ─────────────────────────────────────────────────────

/// Errors surfaced by [`GameEnv::reset`] and [`GameEnv::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvError {
    /// `step` was called before `reset`, or after a terminal step
    /// without an intervening `reset`.
    NotInitialized,
    /// The consumed snapshot violated the producer contract. Surfaced,
    /// never defaulted — data integrity must not be masked.
    MalformedSnapshot(SnapshotError),
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "step called before reset"),
            Self::MalformedSnapshot(e) => write!(f, "malformed snapshot: {e}"),
        }
    }
}

impl Error for EnvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MalformedSnapshot(e) => Some(e),
            Self::NotInitialized => None,
        }
    }
}

impl From<SnapshotError> for EnvError {
    fn from(e: SnapshotError) -> Self {
        Self::MalformedSnapshot(e)
    }
}

// ── Transition ───────────────────────────────────────────────────

/// Result of one [`GameEnv::step`].
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    /// Observation encoded from the consumed snapshot.
    pub observation: ObsGrid,
    /// Scalar reward for this transition.
    pub reward: f32,
    /// Whether the episode ended. After a terminal transition the env
    /// must be `reset()` before stepping again.
    pub terminal: bool,
}

// ── ObsProbe ─────────────────────────────────────────────────────

/// Cloneable read-only handle onto the most recently encoded
/// observation.
///
/// An optional observer (renderer, debugger) polls this without
/// touching the mailbox or the control loop's timing. The slot is
/// updated after every successful encode in `reset` and `step`.
#[derive(Clone, Debug, Default)]
pub struct ObsProbe {
    slot: Arc<Mutex<Option<ObsGrid>>>,
}

impl ObsProbe {
    /// A copy of the most recently encoded observation, if any.
    pub fn latest(&self) -> Option<ObsGrid> {
        self.slot.lock().unwrap().clone()
    }

    fn publish(&self, grid: &ObsGrid) {
        *self.slot.lock().unwrap() = Some(grid.clone());
    }
}

// ── GameEnv ──────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Stepping,
}

/// The reset/step state machine driven by the policy consumer.
///
/// Starts `Idle`; [`reset`](GameEnv::reset) moves it to `Stepping`; a
/// terminal [`step`](GameEnv::step) moves it back to `Idle`. Stepping
/// while `Idle` is a programming error
/// ([`EnvError::NotInitialized`]).
pub struct GameEnv {
    mailbox: Arc<Mailbox>,
    spec: GridSpec,
    reward: Box<dyn RewardPolicy>,
    probe: ObsProbe,
    phase: Phase,
    previous: Option<Snapshot>,
}

// Compile-time assertion: the env must be movable onto the control-loop
// thread.
const _: fn() = || {
    fn assert<T: Send>() {}
    assert::<GameEnv>();
};

impl GameEnv {
    /// Create an env over a shared mailbox.
    ///
    /// # Errors
    ///
    /// Returns the spec's validation error, so a misconfigured window
    /// fails at construction rather than on the first tick.
    pub fn new(
        mailbox: Arc<Mailbox>,
        spec: GridSpec,
        reward: Box<dyn RewardPolicy>,
    ) -> Result<Self, SpecError> {
        spec.validate()?;
        Ok(Self {
            mailbox,
            spec,
            reward,
            probe: ObsProbe::default(),
            phase: Phase::Idle,
            previous: None,
        })
    }

    /// Begin an episode: block for the next snapshot and return its
    /// observation. No reward is defined for this transition.
    ///
    /// # Errors
    ///
    /// [`EnvError::MalformedSnapshot`] if the consumed snapshot cannot
    /// be encoded. The env stays `Idle` in that case.
    pub fn reset(&mut self) -> Result<ObsGrid, EnvError> {
        let snapshot = self.mailbox.await_next();
        let observation = encode(&snapshot, &self.spec)?;
        self.probe.publish(&observation);
        self.previous = Some(snapshot);
        self.phase = Phase::Stepping;
        tracing::debug!("episode started");
        Ok(observation)
    }

    /// Advance one step: publish `action`, block for the resulting
    /// snapshot, and return its observation, reward, and terminal flag.
    ///
    /// # Errors
    ///
    /// [`EnvError::NotInitialized`] when called while `Idle`;
    /// [`EnvError::MalformedSnapshot`] when the consumed snapshot
    /// cannot be encoded or scored (the phase is unchanged).
    pub fn step(&mut self, action: Action) -> Result<Transition, EnvError> {
        if self.phase != Phase::Stepping {
            return Err(EnvError::NotInitialized);
        }
        self.mailbox.set_action(action);
        let snapshot = self.mailbox.await_next();

        let observation = encode(&snapshot, &self.spec)?;
        let signal = self.reward.evaluate(self.previous.as_ref(), &snapshot)?;
        self.probe.publish(&observation);
        self.previous = Some(snapshot);
        if signal.terminal {
            self.phase = Phase::Idle;
            tracing::debug!("episode ended");
        }
        Ok(Transition {
            observation,
            reward: signal.reward,
            terminal: signal.terminal,
        })
    }

    /// A cloneable handle onto the most recently encoded observation.
    pub fn probe(&self) -> ObsProbe {
        self.probe.clone()
    }

    /// The shared mailbox handle, e.g. to toggle suppression between
    /// rollouts.
    pub fn mailbox(&self) -> &Arc<Mailbox> {
        &self.mailbox
    }

    /// The observation spec this env encodes with.
    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }
}

impl fmt::Debug for GameEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameEnv")
            .field("phase", &self.phase)
            .field("grid_size", &self.spec.grid_size)
            .field("channels", &self.spec.layout.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reward::{HuntReward, ScoreReward};
    use coil_obs::ChannelLayout;
    use coil_core::SelfState;

    fn mailbox_with(snapshots: impl IntoIterator<Item = Snapshot>) -> Arc<Mailbox> {
        let mailbox = Arc::new(Mailbox::new());
        for snapshot in snapshots {
            mailbox.submit(snapshot);
        }
        mailbox
    }

    fn live_snapshot(size: f32, food_eaten: f32) -> Snapshot {
        Snapshot {
            slither: Some(SelfState {
                size,
                food_eaten,
                ..SelfState::default()
            }),
            ..Snapshot::default()
        }
    }

    fn dead_snapshot() -> Snapshot {
        let mut snapshot = live_snapshot(10.0, 0.0);
        snapshot.dead = true;
        snapshot
    }

    fn make_env(mailbox: Arc<Mailbox>) -> GameEnv {
        GameEnv::new(
            mailbox,
            GridSpec::default(),
            Box::new(ScoreReward::default()),
        )
        .unwrap()
    }

    #[test]
    fn new_rejects_invalid_spec() {
        let spec = GridSpec {
            grid_size: 0,
            ..GridSpec::default()
        };
        let result = GameEnv::new(
            Arc::new(Mailbox::new()),
            spec,
            Box::new(ScoreReward::default()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn step_before_reset_is_not_initialized() {
        let mut env = make_env(mailbox_with([live_snapshot(1.0, 0.0)]));
        assert_eq!(env.step(Action::NEUTRAL), Err(EnvError::NotInitialized));
        // The queued snapshot was not consumed by the failed step.
        assert_eq!(env.mailbox().queued(), 1);
    }

    #[test]
    fn reset_consumes_exactly_one_snapshot() {
        let mailbox = mailbox_with([live_snapshot(1.0, 0.0), live_snapshot(2.0, 0.0)]);
        let mut env = make_env(Arc::clone(&mailbox));
        let obs = env.reset().unwrap();
        assert_eq!(obs.shape(), (5, 20, 20));
        assert_eq!(mailbox.queued(), 1);
    }

    #[test]
    fn step_returns_reward_and_consumes_one() {
        let mailbox = mailbox_with([
            live_snapshot(1.0, 0.0),
            live_snapshot(10.0, 1.0),
            live_snapshot(3.0, 0.0),
        ]);
        let mut env = make_env(Arc::clone(&mailbox));
        env.reset().unwrap();

        let transition = env.step(Action::new(0.5, -0.5, 0.0)).unwrap();
        assert_eq!(transition.reward, 10.0 * 0.5 + 1.0 * 10.0);
        assert!(!transition.terminal);
        assert_eq!(mailbox.queued(), 1);
        // The step's action is what the transport will read.
        assert_eq!(mailbox.latest_action(), Action::new(0.5, -0.5, 0.0));
    }

    #[test]
    fn terminal_step_returns_env_to_idle() {
        let mailbox = mailbox_with([
            live_snapshot(1.0, 0.0),
            dead_snapshot(),
            live_snapshot(5.0, 0.0),
        ]);
        let mut env = make_env(Arc::clone(&mailbox));
        env.reset().unwrap();

        let transition = env.step(Action::NEUTRAL).unwrap();
        assert!(transition.terminal);
        assert_eq!(transition.reward, 10.0 * 0.5 - 100.0);

        // A finished episode must be reset before stepping again.
        assert_eq!(env.step(Action::NEUTRAL), Err(EnvError::NotInitialized));
        env.reset().unwrap();
        assert_eq!(mailbox.queued(), 0);
    }

    #[test]
    fn malformed_snapshot_is_surfaced_from_reset() {
        let mut env = make_env(mailbox_with([Snapshot::default()]));
        assert_eq!(
            env.reset(),
            Err(EnvError::MalformedSnapshot(SnapshotError::MissingSelf))
        );
        // Still idle: the bad snapshot did not start an episode.
        assert_eq!(env.step(Action::NEUTRAL), Err(EnvError::NotInitialized));
    }

    #[test]
    fn malformed_snapshot_is_surfaced_from_step() {
        let mailbox = mailbox_with([
            live_snapshot(1.0, 0.0),
            Snapshot::default(),
            live_snapshot(2.0, 1.0),
        ]);
        let mut env = make_env(mailbox);
        env.reset().unwrap();
        assert_eq!(
            env.step(Action::NEUTRAL),
            Err(EnvError::MalformedSnapshot(SnapshotError::MissingSelf))
        );
        // The phase is unchanged: the next step proceeds normally.
        let transition = env.step(Action::NEUTRAL).unwrap();
        assert_eq!(transition.reward, 2.0 * 0.5 + 1.0 * 10.0);
    }

    #[test]
    fn probe_tracks_latest_observation() {
        let mailbox = mailbox_with([live_snapshot(1.0, 0.0), live_snapshot(2.0, 0.0)]);
        let mut env = make_env(mailbox);
        let probe = env.probe();
        assert!(probe.latest().is_none());

        let obs = env.reset().unwrap();
        assert_eq!(probe.latest().unwrap(), obs);

        let transition = env.step(Action::NEUTRAL).unwrap();
        assert_eq!(probe.latest().unwrap(), transition.observation);
    }

    #[test]
    fn hunt_reward_plugs_into_the_same_env() {
        let mut kill = live_snapshot(0.0, 0.0);
        kill.others = vec![coil_core::Rival {
            x: 5.0,
            y: 0.0,
            dead: true,
            ..coil_core::Rival::default()
        }];
        // Give the agent a segment so the proximity bonus can fire.
        kill.slither.as_mut().unwrap().parts = vec![coil_core::Segment {
            x: 0.0,
            y: 0.0,
            size: None,
        }];

        let mailbox = mailbox_with([live_snapshot(0.0, 0.0), kill]);
        let policy = HuntReward::default();
        let mut env = GameEnv::new(
            mailbox,
            GridSpec {
                grid_size: 10,
                view_range: 500.0,
                layout: ChannelLayout::tactical(),
            },
            Box::new(policy),
        )
        .unwrap();

        env.reset().unwrap();
        let transition = env.step(Action::NEUTRAL).unwrap();
        assert_eq!(
            transition.reward,
            policy.kill_bonus + policy.proximity_bonus
        );
    }
}
