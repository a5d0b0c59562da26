//! Global constants for the image map

/// Fixed zoom headroom used when the image fills the screen instead of
/// fitting it.
pub const FILL_SCREEN_MAX_FACTOR: f32 = 1.5;

/// Default maximum size multiplier for fit-to-screen mode.
pub const DEFAULT_MAX_SIZE_FACTOR: f32 = 1.5;

/// Default touch slop in pixels.
pub const DEFAULT_TOUCH_SLOP: f32 = 8.0;

/// Default minimum fling velocity in pixels per second.
pub const DEFAULT_MIN_FLING_VELOCITY: f32 = 50.0;

/// Default maximum fling velocity in pixels per second.
pub const DEFAULT_MAX_FLING_VELOCITY: f32 = 8_000.0;

/// Only samples this recent contribute to the release velocity.
pub const DEFAULT_VELOCITY_HORIZON_MS: u64 = 100;

/// Fling decay time constant in milliseconds.
pub const DEFAULT_FLING_TIME_CONSTANT_MS: f32 = 325.0;

/// Below this speed (px/s) a fling counts as settled.
pub const DEFAULT_FLING_SETTLE_VELOCITY: f32 = 20.0;

/// Default device density (physical pixels per logical pixel).
pub const DEFAULT_DENSITY: f32 = 1.0;

/// Default bubble text size in pixels.
pub const DEFAULT_BUBBLE_TEXT_SIZE: f32 = 30.0;

/// Default image cache budget: 64 MiB of RGBA pixels.
pub const DEFAULT_CACHE_BUDGET_BYTES: usize = 64 * 1024 * 1024;

/// Bubble geometry
pub mod bubble {
    /// Padding added to the measured text box on each axis.
    pub const PADDING: i32 = 20;
    /// Gap between the anchor and the bottom of a bubble placed above it.
    pub const GAP_ABOVE: f32 = 30.0;
    /// Gap between the anchor and the top of a bubble flipped below it.
    pub const GAP_BELOW: f32 = 20.0;
    /// Corner radius of the bubble box.
    pub const CORNER_RADIUS: f32 = 20.0;
    /// Shadow offset on both axes.
    pub const SHADOW_OFFSET: f32 = 4.0;
    /// Length of the pointer triangle towards the anchor.
    pub const POINTER_LENGTH: f32 = 35.0;
    /// Half the width of the pointer triangle's base.
    pub const POINTER_HALF_WIDTH: f32 = 5.0;
    /// Offset of the pointer triangle's shadow from the pointer itself.
    pub const POINTER_SHADOW_SHIFT: f32 = 1.0;
    /// Text baseline lift inside the box.
    pub const TEXT_BASELINE_LIFT: f32 = 10.0;
}

/// Decorations are drawn with their top-left this far up and left of the
/// scaled anchor, centring a 34 px marker.
pub const DECORATION_OFFSET: f32 = 17.0;
