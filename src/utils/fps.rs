// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 每秒帧率统计
use std::time::{Duration, Instant};

pub struct FpsCounter {
    count: u64,
    last: Instant,
    window: Duration,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::with_window(Duration::from_secs(1))
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            count: 0,
            last: Instant::now(),
            window,
        }
    }

    /// Counts one frame. Returns the measured rate once per window.
    pub fn tick(&mut self) -> Option<f64> {
        self.count += 1;
        let elapsed = self.last.elapsed();
        if elapsed < self.window {
            return None;
        }
        let fps = self.count as f64 / elapsed.as_secs_f64();
        self.last = Instant::now();
        self.count = 0;
        Some(fps)
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}
