//! WebSocket transport server for the Coil game bridge.
//!
//! [`BridgeServer`] owns the listening socket. Each accepted connection
//! runs an independent receive/reply loop: every inbound `update`
//! envelope is parsed into a snapshot, submitted to the shared
//! [`Mailbox`](coil_env::Mailbox), and answered with the mailbox's
//! latest action — strict request/reply, one outbound message per
//! inbound update. Malformed frames are logged and dropped without
//! closing the connection; peer disconnects are expected events, not
//! errors. Dead connections are detected with a server-initiated
//! ping/pong keepalive.
//!
//! The server never blocks on the mailbox: submission and action reads
//! are non-blocking by construction, so a stalled control loop cannot
//! stall the network.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod protocol;
pub mod server;

pub use config::{ConfigError, ServerConfig};
pub use protocol::{decode_inbound, encode_reply, Inbound, ProtocolError, ACCELERATE_THRESHOLD};
pub use server::{BridgeServer, ServerError};
