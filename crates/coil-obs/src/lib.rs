//! Observation encoding for the Coil game bridge.
//!
//! Turns one [`Snapshot`](coil_core::Snapshot) into a fixed-shape
//! multi-channel spatial grid centered on the controlled agent. The
//! shape is a function of configuration only — entity counts never
//! change it, and entities outside the observation window are silently
//! dropped.
//!
//! The encoder is descriptor-driven: a [`ChannelLayout`] lists what
//! each output channel contains, and [`encode`] fills them in one pass
//! per channel. Three built-in layouts of increasing richness are
//! provided; custom layouts compose freely from [`Channel`] values.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod encode;
pub mod grid;
pub mod spec;

pub use encode::encode;
pub use grid::ObsGrid;
pub use spec::{Channel, ChannelLayout, GridSpec, SpecError};
