//! Core types for the Coil game bridge.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the wire-facing data model — one tick's world state as delivered by
//! the game client ([`Snapshot`]) and the control output sent back
//! ([`Action`]) — plus the error types shared by the encoder and the
//! reward evaluators.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod action;
pub mod error;
pub mod snapshot;

pub use action::Action;
pub use error::SnapshotError;
pub use snapshot::{Food, Prey, Rival, Segment, SelfState, Snapshot, TargetState};
