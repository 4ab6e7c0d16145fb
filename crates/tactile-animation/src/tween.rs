use crate::transition::Transition;
use std::future::Future;
use tactile_core::{nanos_to_secs, RuntimeHandle};
use tactile_ui_graphics::{Color, Point, Size};

/// Types that can be linearly interpolated.
pub trait Lerp {
    fn lerp(&self, target: &Self, fraction: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(&self, target: &Self, fraction: f32) -> Self {
        self + (target - self) * fraction
    }
}

impl Lerp for f64 {
    fn lerp(&self, target: &Self, fraction: f32) -> Self {
        self + (target - self) * fraction as f64
    }
}

impl Lerp for Point {
    fn lerp(&self, target: &Self, fraction: f32) -> Self {
        Point::new(self.x.lerp(&target.x, fraction), self.y.lerp(&target.y, fraction))
    }
}

impl Lerp for Size {
    fn lerp(&self, target: &Self, fraction: f32) -> Self {
        Size::new(
            self.width.lerp(&target.width, fraction),
            self.height.lerp(&target.height, fraction),
        )
    }
}

impl Lerp for Color {
    fn lerp(&self, target: &Self, fraction: f32) -> Self {
        Color(
            self.0.lerp(&target.0, fraction),
            self.1.lerp(&target.1, fraction),
            self.2.lerp(&target.2, fraction),
            self.3.lerp(&target.3, fraction),
        )
    }
}

/// Calls `on_progress` once per frame with eased progress until `duration_secs`
/// of frame time have elapsed.
///
/// Time is measured from the runtime's current time when the tween is first
/// polled. The
/// last call always receives `transition.transform(1.0)`. A non-positive
/// duration reports completion immediately without waiting for a frame.
/// Dropping the future stops the tween where it is.
pub fn tween<F>(
    runtime: &RuntimeHandle,
    duration_secs: f32,
    transition: Transition,
    mut on_progress: F,
) -> impl Future<Output = ()> + 'static
where
    F: FnMut(f32) + 'static,
{
    let clock = runtime.frame_clock();
    async move {
        if duration_secs <= 0.0 {
            on_progress(transition.transform(1.0));
            return;
        }
        let start = clock.runtime_handle().now_nanos();
        loop {
            let now = clock.next_frame().await;
            let elapsed = nanos_to_secs(now.saturating_sub(start)) as f32;
            let progress = (elapsed / duration_secs).min(1.0);
            log::trace!("tween progress {progress:.3}");
            on_progress(transition.transform(progress));
            if progress >= 1.0 {
                break;
            }
        }
    }
}
