use std::collections::VecDeque;

/// One recorded movement: timestamp in seconds and the deltas since the
/// previous sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionSample {
    pub time: f64,
    pub dx: f32,
    pub dy: f32,
}

/// The most recent movements of a touch, oldest first.
#[derive(Clone, Debug)]
pub struct TouchHistory {
    samples: VecDeque<MotionSample>,
    capacity: usize,
}

impl TouchHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Appends a sample, dropping the oldest once full.
    pub fn push(&mut self, time: f64, dx: f32, dy: f32) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(MotionSample { time, dx, dy });
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> impl DoubleEndedIterator<Item = &MotionSample> {
        self.samples.iter()
    }
}

/// Release velocity from the samples that fall within `window` seconds of
/// the newest one.
///
/// Returns zero when only the newest sample is that recent.
pub fn compute_velocity(history: &TouchHistory, window: f64) -> (f32, f32) {
    let mut samples = history.samples().rev();
    let Some(newest) = samples.next() else {
        return (0.0, 0.0);
    };
    let time_end = newest.time;
    let deadline = time_end - window;
    let (mut dx_sum, mut dy_sum) = (newest.dx, newest.dy);
    let mut time_start = time_end;
    for sample in samples {
        if sample.time < deadline {
            break;
        }
        dx_sum += sample.dx;
        dy_sum += sample.dy;
        time_start = sample.time;
    }
    if time_start == time_end {
        return (0.0, 0.0);
    }
    let duration = (time_end - time_start) as f32;
    (dx_sum / duration, dy_sum / duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_sample_has_no_velocity() {
        let mut history = TouchHistory::new(5);
        history.push(1.0, 30.0, 0.0);
        assert_eq!(compute_velocity(&history, 10.0 / 60.0), (0.0, 0.0));
    }

    #[test]
    fn test_velocity_averages_recent_samples() {
        let mut history = TouchHistory::new(5);
        history.push(0.0, 0.0, 0.0);
        history.push(0.05, 10.0, -5.0);
        history.push(0.10, 10.0, -5.0);
        history.push(0.10, 0.0, 0.0);
        let (vx, vy) = compute_velocity(&history, 10.0 / 60.0);
        assert!((vx - 200.0).abs() < 1e-3, "vx = {vx}");
        assert!((vy + 100.0).abs() < 1e-3, "vy = {vy}");
    }

    #[test]
    fn test_samples_outside_window_are_ignored() {
        let mut history = TouchHistory::new(5);
        history.push(0.0, 500.0, 0.0);
        history.push(1.0, 10.0, 0.0);
        history.push(1.1, 10.0, 0.0);
        let (vx, _) = compute_velocity(&history, 10.0 / 60.0);
        assert!((vx - 200.0).abs() < 1e-2, "vx = {vx}");
    }

    #[test]
    fn test_history_keeps_only_capacity() {
        let mut history = TouchHistory::new(5);
        for i in 0..8 {
            history.push(i as f64, 1.0, 1.0);
        }
        assert_eq!(history.len(), 5);
        assert_eq!(history.samples().next().map(|s| s.time), Some(3.0));
    }
}
