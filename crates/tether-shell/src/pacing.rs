//! Frame pacing for embedders that do not swap buffers themselves.

use std::time::Duration;

use crate::platform::Clock;

/// Refresh rate assumed when the display cannot report one.
pub const DEFAULT_REFRESH_RATE: f32 = 60.0;

/// The final stretch before a deadline is busy-waited instead of slept.
pub const SPIN_THRESHOLD: Duration = Duration::from_micros(500);

#[derive(Debug, Clone)]
pub struct FramePacer {
    last_swap: Duration,
    swap_called: bool,
    refresh_rate: Option<f32>,
}

impl FramePacer {
    pub fn new(now: Duration) -> Self {
        Self {
            last_swap: now,
            swap_called: false,
            refresh_rate: None,
        }
    }

    pub fn begin_frame(&mut self) {
        self.swap_called = false;
    }

    /// Records a buffer swap submitted by the embedder.
    pub fn record_swap(&mut self, now: Duration) {
        self.swap_called = true;
        self.last_swap = now;
    }

    pub fn swap_called(&self) -> bool {
        self.swap_called
    }

    pub fn last_swap(&self) -> Duration {
        self.last_swap
    }

    /// Cached refresh rate, querying the display on first use.
    pub fn refresh_rate(&mut self, query: impl FnOnce() -> Option<f32>) -> f32 {
        if let Some(rate) = self.refresh_rate {
            return rate;
        }
        let rate = query()
            .filter(|rate| rate.is_finite() && *rate > 0.0)
            .unwrap_or(DEFAULT_REFRESH_RATE);
        tracing::debug!(rate, "Display refresh rate");
        self.refresh_rate = Some(rate);
        rate
    }

    /// Forgets the cached rate, e.g. after the display changed orientation.
    pub fn invalidate_refresh_rate(&mut self) {
        self.refresh_rate = None;
    }

    pub fn deadline(&self, refresh_rate: f32) -> Duration {
        self.last_swap + Duration::from_secs_f64(1.0 / f64::from(refresh_rate))
    }

    /// Waits out the remainder of the frame interval since the last swap.
    ///
    /// Sleeps until [`SPIN_THRESHOLD`] before the deadline, then spins on the
    /// clock. A frame that already overran restarts the interval from now.
    pub fn wait_for_deadline(&mut self, clock: &dyn Clock, refresh_rate: f32) {
        let deadline = self.deadline(refresh_rate);
        let mut now = clock.now();
        if now >= deadline {
            self.last_swap = now;
            return;
        }

        let remaining = deadline - now;
        if remaining > SPIN_THRESHOLD {
            clock.sleep(remaining - SPIN_THRESHOLD);
            now = clock.now();
        }
        while now < deadline {
            std::hint::spin_loop();
            now = clock.now();
        }
        self.last_swap = deadline;
    }
}
