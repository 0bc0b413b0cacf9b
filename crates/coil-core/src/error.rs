//! Error types shared by snapshot consumers.

use std::error::Error;
use std::fmt;

/// A snapshot violated the producer contract.
///
/// Raised by the encoder and the reward evaluators when a required
/// (non-optional) part of the snapshot is absent. Absent optional
/// groups are normal and never produce this error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotError {
    /// The snapshot has no `slither` object. Encoding and scoring are
    /// both anchored on the self agent, so this cannot be defaulted.
    MissingSelf,
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSelf => write!(f, "snapshot has no self agent"),
        }
    }
}

impl Error for SnapshotError {}
