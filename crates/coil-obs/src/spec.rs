//! Observation specification types.
//!
//! A [`GridSpec`] describes the observation window (resolution and
//! half-width in world units) and the [`ChannelLayout`] describing what
//! each output channel contains. Encoding the same snapshot with the
//! same spec always yields an identical grid.

use std::error::Error;
use std::fmt;

// ── Channel ──────────────────────────────────────────────────────

/// What one output channel contains.
///
/// Spatial channels are populated additively: every write is `+=`, so
/// each cell holds a plain sum and the result is independent of entity
/// iteration order. Broadcast channels fill the whole plane with one
/// scalar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    /// Food value accumulated per cell. Multiple items in one cell add,
    /// reflecting local food density.
    FoodDensity,
    /// Presence marks (+1 per segment) for the agent's own body.
    SelfBody,
    /// Presence marks (+1 per segment) for all opposing agents' bodies.
    RivalBodies,
    /// Size-weighted marks for the globally ranked segment subset
    /// (+segment size, or +1 when the producer omitted the size).
    RankedBodies,
    /// Presence marks (+1) for prey markers.
    Preys,
    /// The agent's heading-vector x component broadcast over the plane.
    HeadingX,
    /// The agent's heading-vector y component broadcast over the plane.
    HeadingY,
    /// The agent's heading angle written at its own head cell.
    SelfHeading,
    /// Each rival's heading angle written at that rival's head cell.
    RivalHeadings,
    /// Presence marks for the target agent's body. All-zero when no
    /// target is designated.
    TargetBody,
    /// The target's heading angle at its head cell. All-zero when no
    /// target is designated.
    TargetHeading,
}

// ── ChannelLayout ────────────────────────────────────────────────

/// Ordered list of output channels.
///
/// Channel `i` of the encoded grid is filled according to entry `i`.
/// A channel kind may appear more than once; each occurrence is filled
/// independently.
///
/// # Examples
///
/// ```
/// use coil_obs::{Channel, ChannelLayout};
///
/// let layout = ChannelLayout::compact();
/// assert_eq!(layout.len(), 5);
/// assert_eq!(layout.channels()[0], Channel::FoodDensity);
///
/// let custom = ChannelLayout::new(vec![Channel::FoodDensity, Channel::SelfBody]);
/// assert_eq!(custom.len(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelLayout {
    channels: Vec<Channel>,
}

impl ChannelLayout {
    /// Build a layout from an explicit channel list.
    pub fn new(channels: Vec<Channel>) -> Self {
        Self { channels }
    }

    /// The minimal 5-channel layout: food density, rival bodies, own
    /// body, and the two broadcast heading components.
    pub fn compact() -> Self {
        Self::new(vec![
            Channel::FoodDensity,
            Channel::RivalBodies,
            Channel::SelfBody,
            Channel::HeadingX,
            Channel::HeadingY,
        ])
    }

    /// The compact layout plus ranked segments, prey markers, and the
    /// agent's own heading angle at its head cell.
    pub fn tactical() -> Self {
        let mut channels = Self::compact().channels;
        channels.extend([Channel::RankedBodies, Channel::Preys, Channel::SelfHeading]);
        Self::new(channels)
    }

    /// The richest layout: tactical plus rival headings and the two
    /// target channels.
    pub fn full() -> Self {
        let mut channels = Self::tactical().channels;
        channels.extend([
            Channel::RivalHeadings,
            Channel::TargetBody,
            Channel::TargetHeading,
        ]);
        Self::new(channels)
    }

    /// Number of channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Whether the layout has no channels.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// The ordered channel list.
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Index of the first occurrence of `channel`, if present.
    pub fn position(&self, channel: Channel) -> Option<usize> {
        self.channels.iter().position(|&c| c == channel)
    }
}

// ── SpecError ────────────────────────────────────────────────────

/// Errors detected while validating a [`GridSpec`].
#[derive(Clone, Debug, PartialEq)]
pub enum SpecError {
    /// `grid_size` is zero — the window would have no cells.
    ZeroGridSize,
    /// `view_range` is NaN, infinite, zero, or negative.
    InvalidViewRange {
        /// The invalid value.
        value: f32,
    },
    /// The channel layout has no channels.
    EmptyLayout,
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroGridSize => write!(f, "grid_size must be at least 1"),
            Self::InvalidViewRange { value } => {
                write!(f, "view_range must be finite and positive, got {value}")
            }
            Self::EmptyLayout => write!(f, "channel layout is empty"),
        }
    }
}

impl Error for SpecError {}

// ── GridSpec ─────────────────────────────────────────────────────

/// Complete configuration for observation encoding.
///
/// The observation window is a square of half-width `view_range` world
/// units centered on the agent, mapped linearly onto
/// `grid_size × grid_size` cells.
///
/// # Examples
///
/// ```
/// use coil_obs::GridSpec;
///
/// let spec = GridSpec::default();
/// assert_eq!(spec.grid_size, 20);
/// assert_eq!(spec.view_range, 1000.0);
/// assert!(spec.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct GridSpec {
    /// Cells per axis.
    pub grid_size: usize,
    /// Window half-width in world units.
    pub view_range: f32,
    /// What each output channel contains.
    pub layout: ChannelLayout,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            grid_size: 20,
            view_range: 1000.0,
            layout: ChannelLayout::compact(),
        }
    }
}

impl GridSpec {
    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.grid_size == 0 {
            return Err(SpecError::ZeroGridSize);
        }
        if !self.view_range.is_finite() || self.view_range <= 0.0 {
            return Err(SpecError::InvalidViewRange {
                value: self.view_range,
            });
        }
        if self.layout.is_empty() {
            return Err(SpecError::EmptyLayout);
        }
        Ok(())
    }
}
