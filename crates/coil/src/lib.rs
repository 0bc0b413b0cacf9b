//! Coil: a bridge between a live snake-arena game client and a
//! synchronous reinforcement-learning control loop.
//!
//! The game pushes world snapshots over a WebSocket; the control loop
//! must issue exactly one action per observed state, synchronously.
//! Coil provides the pieces between the two: the transport server, the
//! mailbox that turns asynchronous delivery into a blocking FIFO, a
//! deterministic snapshot→grid encoder, pluggable reward policies, and
//! the reset/step adapter a policy consumer drives.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use coil::prelude::*;
//!
//! // The mailbox is the single shared hand-off between the transport
//! // and the control loop.
//! let mailbox = Arc::new(Mailbox::new());
//!
//! // Normally the transport server submits snapshots; here we feed one
//! // by hand so reset() has something to consume.
//! let snapshot: Snapshot = serde_json::from_str(
//!     r#"{"slither": {"x": 0.0, "y": 0.0, "size": 10.0},
//!         "foods": [{"x": 10.0, "y": 10.0, "value": 2.0}]}"#,
//! ).unwrap();
//! mailbox.submit(snapshot);
//!
//! let mut env = GameEnv::new(
//!     Arc::clone(&mailbox),
//!     GridSpec::default(),
//!     Box::new(ScoreReward::default()),
//! ).unwrap();
//!
//! let observation = env.reset().unwrap();
//! assert_eq!(observation.shape(), (5, 20, 20));
//! ```
//!
//! Serving the transport side:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use coil::prelude::*;
//!
//! # async fn serve() -> Result<(), coil::server::ServerError> {
//! let mailbox = Arc::new(Mailbox::new());
//! let server = BridgeServer::bind(ServerConfig::default(), Arc::clone(&mailbox)).await?;
//! tokio::spawn(server.run());
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `coil-core` | Snapshot model, `Action`, snapshot errors |
//! | [`obs`] | `coil-obs` | `GridSpec`, channel layouts, the encoder |
//! | [`env`] | `coil-env` | `Mailbox`, reward policies, `GameEnv` |
//! | [`server`] | `coil-server` | `ServerConfig`, envelope codec, `BridgeServer` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Snapshot model, action type, and snapshot errors (`coil-core`).
pub use coil_core as types;

/// Observation specification and grid encoding (`coil-obs`).
pub use coil_obs as obs;

/// Mailbox, reward policies, and the control-loop adapter (`coil-env`).
pub use coil_env as env;

/// WebSocket transport server and wire codec (`coil-server`).
pub use coil_server as server;

/// Common imports for typical Coil usage.
///
/// ```rust
/// use coil::prelude::*;
/// ```
pub mod prelude {
    // Data model
    pub use coil_core::{Action, Snapshot, SnapshotError};

    // Observation encoding
    pub use coil_obs::{encode, Channel, ChannelLayout, GridSpec, ObsGrid};

    // Mailbox and control loop
    pub use coil_env::{
        EnvError, GameEnv, HuntReward, Mailbox, ObsProbe, RewardPolicy, ScoreReward, Transition,
    };

    // Transport
    pub use coil_server::{BridgeServer, ServerConfig};
}
