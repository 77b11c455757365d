use std::time::Duration;

use tether_core::profiling::profile_function;

/// Frame timing information handed to the embedder.
///
/// # Example
///
/// ```no_run
/// use tether_shell::{App, ShellCtx};
///
/// struct Spinner {
///     angle: f32,
/// }
///
/// impl App for Spinner {
///     fn render(&mut self, ctx: &mut ShellCtx) {
///         self.angle += ctx.frame_time().delta_seconds() * std::f32::consts::TAU;
///         ctx.swap_buffers();
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FrameTime {
    /// Time elapsed since the last frame
    pub delta: Duration,
    /// Total time elapsed since the shell started
    pub elapsed: Duration,
    /// Total number of frames rendered
    pub frame_count: u64,
}

impl FrameTime {
    pub fn new() -> Self {
        Self {
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Returns delta time in seconds (f32)
    #[inline]
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Returns elapsed time in seconds (f32)
    #[inline]
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }
}

impl Default for FrameTime {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks frame timing against the shell's clock readings.
#[derive(Debug, Clone)]
pub(crate) struct TimeTracker {
    start_time: Duration,
    last_frame_time: Duration,
    frame_count: u64,
}

impl TimeTracker {
    pub fn new(now: Duration) -> Self {
        Self {
            start_time: now,
            last_frame_time: now,
            frame_count: 0,
        }
    }

    pub fn tick(&mut self, now: Duration) -> FrameTime {
        profile_function!();
        let delta = now.saturating_sub(self.last_frame_time);
        let elapsed = now.saturating_sub(self.start_time);

        self.last_frame_time = now;
        self.frame_count += 1;

        FrameTime {
            delta,
            elapsed,
            frame_count: self.frame_count,
        }
    }
}
