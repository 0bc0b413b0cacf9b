//! Synchronization and control-loop layer of the Coil game bridge.
//!
//! Three pieces sit between the transport and the policy consumer:
//!
//! - [`Mailbox`] — the thread-safe hand-off point between the
//!   network-driven producer and the synchronous control loop.
//! - [`RewardPolicy`] — pluggable scoring of snapshots, with two
//!   shipped implementations ([`ScoreReward`], [`HuntReward`]).
//! - [`GameEnv`] — the reset/step state machine the policy drives, plus
//!   the [`ObsProbe`] hook for a decoupled observer.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod env;
pub mod mailbox;
pub mod reward;

pub use env::{EnvError, GameEnv, ObsProbe, Transition};
pub use mailbox::Mailbox;
pub use reward::{HuntReward, RewardPolicy, RewardSignal, ScoreReward};
