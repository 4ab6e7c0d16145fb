//! Shared gesture thresholds.
//!
//! Distances are in dp and are resolved through the window's density when a
//! behavior starts listening.

/// Distance a touch must travel before a scroll or drag takes it over.
pub const SCROLL_DISTANCE_DP: f32 = 20.0;

/// Distance a single wheel notch scrolls.
pub const SCROLL_WHEEL_DISTANCE_DP: f32 = 20.0;

/// Seconds a scroll candidate may stay below [`SCROLL_DISTANCE_DP`] before it
/// is handed to the children.
pub const SCROLL_TIMEOUT: f64 = 0.2;

/// Seconds a touch must rest on a draggable before the drag starts.
pub const DRAG_TIMEOUT: f64 = 0.2;

pub const DRAG_DISTANCE_DP: f32 = SCROLL_DISTANCE_DP;

pub const TAP_MAX_INTERVAL: f64 = 0.3;

/// Trailing window used when turning recent moves into a fling velocity.
pub const VELOCITY_WINDOW: f64 = 10.0 / 60.0;

/// Number of move samples kept for the fling velocity.
pub const VELOCITY_HISTORY_LEN: usize = 5;

pub const SWIPE_THRESHOLD_DP: f32 = 20.0;

pub const DELETE_THRESHOLD_DP: f32 = 300.0;

/// A swiped child is fully transparent at this multiple of the delete threshold.
pub const SWIPE_FADE_FACTOR: f32 = 1.4;

/// Seconds a failed drag takes to slide back to where it started.
pub const DRAG_FAIL_ANIMATION: f32 = 0.1;

pub const SPACER_MIN_SIZE_DP: f32 = 50.0;
