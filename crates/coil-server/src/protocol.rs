//! Wire envelope codec.
//!
//! Inbound: `{"type": "update", "payload": <snapshot>}`. Any other
//! `type` is ignored without error. Outbound:
//! `{"type": "update", "payload": {"xt": f, "yt": f, "acceleration": 0|1}}`.
//!
//! The accelerate-intent threshold is applied here, at reply
//! construction, and nowhere else in the system.

use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

use coil_core::{Action, Snapshot};

/// Accelerate intents strictly above this become `acceleration: 1`.
pub const ACCELERATE_THRESHOLD: f32 = 0.9;

/// A decoded inbound message.
#[derive(Clone, Debug, PartialEq)]
pub enum Inbound {
    /// A state update carrying one snapshot.
    Update(Snapshot),
    /// A well-formed envelope of some other type. Dropped silently.
    Ignored,
}

/// An inbound frame that could not be parsed as the expected envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProtocolError {
    /// The frame is not a valid envelope, or an `update` payload did
    /// not deserialize as a snapshot.
    MalformedMessage {
        /// Parser description of what went wrong.
        reason: String,
    },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedMessage { reason } => {
                write!(f, "malformed message: {reason}")
            }
        }
    }
}

impl Error for ProtocolError {}

#[derive(Deserialize)]
struct InboundEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: serde_json::Value,
}

#[derive(Serialize)]
struct ReplyEnvelope {
    #[serde(rename = "type")]
    kind: &'static str,
    payload: ReplyPayload,
}

#[derive(Serialize)]
struct ReplyPayload {
    xt: f32,
    yt: f32,
    acceleration: u8,
}

/// Decode one inbound frame.
///
/// # Errors
///
/// [`ProtocolError::MalformedMessage`] when the frame is not a valid
/// envelope or an `update` payload is not a valid snapshot. Callers
/// log and drop; the connection stays open.
pub fn decode_inbound(raw: &[u8]) -> Result<Inbound, ProtocolError> {
    let envelope: InboundEnvelope =
        serde_json::from_slice(raw).map_err(|e| ProtocolError::MalformedMessage {
            reason: e.to_string(),
        })?;
    if envelope.kind != "update" {
        return Ok(Inbound::Ignored);
    }
    let snapshot: Snapshot =
        serde_json::from_value(envelope.payload).map_err(|e| ProtocolError::MalformedMessage {
            reason: e.to_string(),
        })?;
    Ok(Inbound::Update(snapshot))
}

/// Encode the reply for one update: the action's targets plus the
/// thresholded acceleration bit.
///
/// Non-finite target components are replaced with 0.0 so the reply is
/// always representable JSON.
pub fn encode_reply(action: &Action) -> String {
    let finite = |v: f32| if v.is_finite() { v } else { 0.0 };
    let envelope = ReplyEnvelope {
        kind: "update",
        payload: ReplyPayload {
            xt: finite(action.xt),
            yt: finite(action.yt),
            acceleration: u8::from(action.accelerate > ACCELERATE_THRESHOLD),
        },
    };
    serde_json::to_string(&envelope).expect("reply envelope has no non-serializable values")
}
