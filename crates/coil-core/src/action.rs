//! The control action: two steering targets and an accelerate intent.

/// One control decision for one tick.
///
/// `xt` and `yt` are the steering target in `[-1, 1]`; `accelerate` is
/// the raw accelerate intent in `[0, 1]`. Thresholding of the intent to
/// a boolean happens once, at the transport reply-construction step,
/// not here.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Action {
    /// Horizontal steering target in `[-1, 1]`.
    pub xt: f32,
    /// Vertical steering target in `[-1, 1]`.
    pub yt: f32,
    /// Accelerate intent in `[0, 1]`.
    pub accelerate: f32,
}

impl Action {
    /// The defined neutral action: zero targets, no acceleration.
    ///
    /// Returned by the mailbox before any action has been set.
    pub const NEUTRAL: Action = Action {
        xt: 0.0,
        yt: 0.0,
        accelerate: 0.0,
    };

    /// Build an action with every component clamped into its declared
    /// range. NaN components clamp to 0.0.
    pub fn new(xt: f32, yt: f32, accelerate: f32) -> Self {
        Self {
            xt: clamp_or_zero(xt, -1.0, 1.0),
            yt: clamp_or_zero(yt, -1.0, 1.0),
            accelerate: clamp_or_zero(accelerate, 0.0, 1.0),
        }
    }
}

fn clamp_or_zero(v: f32, lo: f32, hi: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(lo, hi)
    }
}
