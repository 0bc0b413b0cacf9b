//! The snapshot data model: one tick's world state.
//!
//! These structs deserialize directly from the `payload` of an inbound
//! `update` envelope. The payload is semi-structured: every entity group
//! except the self agent is optional and defaults to empty, and unknown
//! fields are ignored. Field names match the wire format produced by the
//! game-side client script.
//!
//! A snapshot is immutable once constructed and owned by exactly one
//! component at a time (transport → mailbox → control loop). `Clone` is
//! derived for the peek/observer paths, which work on copies.

use serde::Deserialize;

fn default_food_value() -> f32 {
    1.0
}

// ── Entity pieces ────────────────────────────────────────────────

/// One body segment of an agent.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Segment {
    /// World x coordinate.
    pub x: f32,
    /// World y coordinate.
    pub y: f32,
    /// Segment size, when the producer reports it.
    #[serde(default)]
    pub size: Option<f32>,
}

/// A food item.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Food {
    /// World x coordinate.
    pub x: f32,
    /// World y coordinate.
    pub y: f32,
    /// Nutritional value. Defaults to 1.0 when the producer omits it.
    #[serde(default = "default_food_value")]
    pub value: f32,
}

/// A prey marker (small fleeing morsel).
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Prey {
    /// World x coordinate.
    pub x: f32,
    /// World y coordinate.
    pub y: f32,
}

// ── Agents ───────────────────────────────────────────────────────

/// The controlled agent's state within a snapshot.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct SelfState {
    /// Head world x coordinate.
    pub x: f32,
    /// Head world y coordinate.
    pub y: f32,
    /// Heading unit-vector x component. Not all producers report it.
    #[serde(default)]
    pub xm: f32,
    /// Heading unit-vector y component.
    #[serde(default)]
    pub ym: f32,
    /// Heading angle in radians.
    #[serde(default)]
    pub ang: f32,
    /// Current size (score).
    #[serde(default)]
    pub size: f32,
    /// Score gained since the previous snapshot. May be negative.
    #[serde(default)]
    pub food_eaten: f32,
    /// Body segments, head first.
    #[serde(default)]
    pub parts: Vec<Segment>,
    /// Whether the agent is dead as of this tick.
    #[serde(default)]
    pub dead: bool,
}

impl SelfState {
    /// The head position as an `(x, y)` pair.
    pub fn head(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

/// An opposing agent.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Rival {
    /// Head world x coordinate.
    pub x: f32,
    /// Head world y coordinate.
    pub y: f32,
    /// Heading angle in radians.
    #[serde(default)]
    pub ang: f32,
    /// Current size (score).
    #[serde(default)]
    pub size: f32,
    /// Whether this rival died this tick. The producer reports each
    /// death exactly once.
    #[serde(default)]
    pub dead: bool,
    /// Body segments.
    #[serde(default)]
    pub parts: Vec<Segment>,
}

/// The single tracked target agent, when the producer designates one.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct TargetState {
    /// Head world x coordinate.
    pub x: f32,
    /// Head world y coordinate.
    pub y: f32,
    /// Heading angle in radians.
    #[serde(default)]
    pub ang: f32,
    /// Body segments.
    #[serde(default)]
    pub parts: Vec<Segment>,
}

// ── Snapshot ─────────────────────────────────────────────────────

/// One tick's full world state as delivered by the game client.
///
/// Everything except `slither` is optional: absent groups deserialize
/// to empty collections and are normal states, not errors. A snapshot
/// without a `slither` object parses fine but cannot be encoded or
/// scored — consumers surface
/// [`SnapshotError::MissingSelf`](crate::SnapshotError::MissingSelf)
/// at that point.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Snapshot {
    /// Payload-level death flag. The client splices `dead: true` over
    /// the last known state when it infers a death, so this may be set
    /// while `slither.dead` is not.
    #[serde(default)]
    pub dead: bool,
    /// The controlled agent. Required for encoding and scoring.
    #[serde(default)]
    pub slither: Option<SelfState>,
    /// Food items near the agent.
    #[serde(default)]
    pub foods: Vec<Food>,
    /// Opposing agents.
    #[serde(default)]
    pub others: Vec<Rival>,
    /// Globally ranked subset of nearby body segments.
    #[serde(default)]
    pub top_body_parts: Vec<Segment>,
    /// Prey markers.
    #[serde(default)]
    pub preys: Vec<Prey>,
    /// The tracked target agent, if any. "Target is no one" is a
    /// normal state.
    #[serde(default)]
    pub target_slither: Option<TargetState>,
}

impl Snapshot {
    /// Whether this snapshot marks the controlled agent as dead, at
    /// either the payload level or inside the agent state.
    pub fn is_dead(&self) -> bool {
        self.dead || self.slither.as_ref().is_some_and(|s| s.dead)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_payload_parses() {
        let json = r#"{
            "slither": {
                "x": 100.0, "y": 200.0, "xm": 1.0, "ym": 0.0,
                "ang": 0.5, "size": 12.0, "food_eaten": 2.0,
                "parts": [{"x": 100.0, "y": 200.0}, {"x": 95.0, "y": 200.0, "size": 3.0}]
            },
            "foods": [{"x": 10.0, "y": 10.0, "value": 2.5}],
            "others": [{"x": 50.0, "y": 50.0, "ang": 1.0, "size": 8.0, "dead": false,
                        "parts": [{"x": 50.0, "y": 50.0}]}],
            "top_body_parts": [{"x": 40.0, "y": 40.0, "size": 8.0}],
            "preys": [{"x": 5.0, "y": 5.0}],
            "target_slither": {"x": 50.0, "y": 50.0, "ang": 1.0, "parts": []}
        }"#;
        let snap: Snapshot = serde_json::from_str(json).unwrap();
        let agent = snap.slither.as_ref().unwrap();
        assert_eq!(agent.head(), (100.0, 200.0));
        assert_eq!(agent.parts.len(), 2);
        assert_eq!(agent.parts[1].size, Some(3.0));
        assert_eq!(snap.foods[0].value, 2.5);
        assert_eq!(snap.others[0].parts.len(), 1);
        assert!(snap.target_slither.is_some());
        assert!(!snap.is_dead());
    }

    #[test]
    fn minimal_payload_defaults_groups_to_empty() {
        let snap: Snapshot =
            serde_json::from_str(r#"{"slither": {"x": 0.0, "y": 0.0}}"#).unwrap();
        assert!(snap.foods.is_empty());
        assert!(snap.others.is_empty());
        assert!(snap.top_body_parts.is_empty());
        assert!(snap.preys.is_empty());
        assert!(snap.target_slither.is_none());
        let agent = snap.slither.unwrap();
        assert_eq!(agent.food_eaten, 0.0);
        assert!(agent.parts.is_empty());
    }

    #[test]
    fn food_value_defaults_to_one() {
        let snap: Snapshot =
            serde_json::from_str(r#"{"foods": [{"x": 1.0, "y": 2.0}]}"#).unwrap();
        assert_eq!(snap.foods[0].value, 1.0);
    }

    #[test]
    fn missing_slither_parses_as_none() {
        let snap: Snapshot = serde_json::from_str(r#"{"foods": []}"#).unwrap();
        assert!(snap.slither.is_none());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let json = r#"{
            "slither": {"x": 1.0, "y": 2.0, "score_multiplier": 3},
            "debug_overlay": true
        }"#;
        let snap: Snapshot = serde_json::from_str(json).unwrap();
        assert!(snap.slither.is_some());
    }

    #[test]
    fn payload_level_dead_splice_is_terminal() {
        // The client sends {dead: true, ...last_state} on inferred death,
        // leaving slither.dead untouched.
        let json = r#"{"dead": true, "slither": {"x": 1.0, "y": 2.0, "dead": false}}"#;
        let snap: Snapshot = serde_json::from_str(json).unwrap();
        assert!(snap.is_dead());
    }

    #[test]
    fn nested_dead_flag_is_terminal() {
        let json = r#"{"slither": {"x": 1.0, "y": 2.0, "dead": true}}"#;
        let snap: Snapshot = serde_json::from_str(json).unwrap();
        assert!(snap.is_dead());
    }
}
