use web_time::Instant;

/// Number of frame durations averaged for the reported frame rate.
pub const DEFAULT_WINDOW: usize = 64;

/// Fixed-size ring buffer of recent frame durations.
///
/// Owned by the render-loop driver. Each frame pushes its delta time; the
/// reported FPS is the reciprocal of the mean over the filled part of the
/// ring, so the figure settles within one window of frames.
pub struct FrameStats {
    samples: Vec<f32>,
    next: usize,
    filled: usize,
    last_frame: Instant,
}

impl FrameStats {
    /// Create an empty ring holding `window` samples (at least one).
    #[must_use]
    pub fn new(window: usize) -> Self {
        Self {
            samples: vec![0.0; window.max(1)],
            next: 0,
            filled: 0,
            last_frame: Instant::now(),
        }
    }

    /// Measure the time since the previous call (or construction), record
    /// it and return it in seconds.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.push(dt);
        dt
    }

    /// Record one frame duration in seconds. Non-positive durations are
    /// ignored.
    pub fn push(&mut self, dt: f32) {
        if dt <= 0.0 || !dt.is_finite() {
            return;
        }
        self.samples[self.next] = dt;
        self.next = (self.next + 1) % self.samples.len();
        self.filled = (self.filled + 1).min(self.samples.len());
    }

    /// Mean frame duration in seconds, `None` before the first sample.
    #[must_use]
    pub fn mean_frame_time(&self) -> Option<f32> {
        if self.filled == 0 {
            return None;
        }
        let sum: f32 = self.samples[..self.filled].iter().sum();
        Some(sum / self.filled as f32)
    }

    /// Averaged frames per second, `0.0` before the first sample.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.mean_frame_time().map_or(0.0, |t| 1.0 / t)
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ring_reports_zero() {
        let stats = FrameStats::new(4);
        assert_eq!(stats.fps(), 0.0);
        assert!(stats.mean_frame_time().is_none());
    }

    #[test]
    fn averages_only_filled_samples() {
        let mut stats = FrameStats::new(4);
        stats.push(0.5);
        stats.push(0.25);
        let mean = stats.mean_frame_time().unwrap();
        assert!((mean - 0.375).abs() < 1e-6);
    }

    #[test]
    fn oldest_samples_are_overwritten() {
        let mut stats = FrameStats::new(2);
        stats.push(1.0);
        stats.push(0.1);
        stats.push(0.1);
        assert!((stats.fps() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn rejects_degenerate_durations() {
        let mut stats = FrameStats::new(2);
        stats.push(0.0);
        stats.push(-1.0);
        stats.push(f32::NAN);
        assert!(stats.mean_frame_time().is_none());
    }
}
