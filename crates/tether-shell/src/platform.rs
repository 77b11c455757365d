//! Platform collaborator interfaces consumed by the shell.
//!
//! Every trait here is object-safe so a host can hand the shell a
//! [`Platform`] of boxed implementations, and tests can substitute recording
//! mocks. Handles into the graphics layer are opaque `Copy` newtypes; the shell
//! never interprets them.

use std::time::{Duration, Instant};

use tether_core::geometry::{Bounds, Insets, Size};

use crate::config::{ApiTier, ChromeMode, ColorFormat, OrientationLock, SwapBehavior};
use crate::error::BridgeError;
use crate::sensor::{RawSensorSample, SensorKind};

/// Raw handle to the OS window a surface is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeWindow(pub u64);

/// A pixel-format configuration chosen by the graphics backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfigId(pub u64);

/// A graphics context handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(pub u64);

/// A drawing surface handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

/// A context bound to a surface for drawing and reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Binding {
    pub surface: SurfaceId,
    pub context: ContextId,
}

/// Attribute request passed to [`GraphicsBackend::choose_config`], in bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelFormatRequest {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
    pub depth: u8,
    pub stencil: u8,
    pub samples: u8,
}

impl PixelFormatRequest {
    /// The next weaker request: multisampling is reduced first, then depth
    /// precision. Returns `None` once nothing is left to relax.
    pub fn relaxed(&self) -> Option<Self> {
        if self.samples > 0 {
            Some(Self {
                samples: self.samples.saturating_sub(2),
                ..*self
            })
        } else if self.depth > 8 {
            Some(Self {
                depth: self.depth - 8,
                ..*self
            })
        } else {
            None
        }
    }
}

/// Version a created context reports. Many drivers fail the minor query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextVersion {
    pub major: u32,
    pub minor: Option<u32>,
}

/// Last error reported by the graphics backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GraphicsStatus {
    #[default]
    Success,
    BadSurface,
    BadContext,
    ContextLost,
    Other(i32),
}

/// Native graphics context primitives (EGL-shaped).
pub trait GraphicsBackend {
    /// Opens the display connection.
    fn initialize(&mut self) -> bool;

    /// Closes the display connection.
    fn terminate(&mut self);

    fn choose_config(&mut self, request: &PixelFormatRequest) -> Option<ConfigId>;

    fn native_visual_id(&self, config: ConfigId) -> Option<i32>;

    fn create_context(&mut self, config: ConfigId, tier: ApiTier) -> Option<ContextId>;

    fn context_version(&self, context: ContextId) -> Option<ContextVersion>;

    fn destroy_context(&mut self, context: ContextId);

    fn create_window_surface(&mut self, config: ConfigId, window: NativeWindow)
    -> Option<SurfaceId>;

    fn set_swap_behavior(&mut self, surface: SurfaceId, behavior: SwapBehavior) -> bool;

    fn destroy_surface(&mut self, surface: SurfaceId);

    /// Binds a context to a surface, or unbinds everything with `None`.
    fn make_current(&mut self, binding: Option<Binding>) -> bool;

    fn swap_buffers(&mut self, surface: SurfaceId) -> bool;

    /// Live pixel size of the surface.
    fn surface_size(&self, surface: SurfaceId) -> Option<Size<u32>>;

    /// Reads and clears the last error.
    fn last_error(&mut self) -> GraphicsStatus;
}

/// Access to the native window owned by the OS event thread.
pub trait WindowProvider {
    /// The window currently attached, if any.
    fn native_window(&self) -> Option<NativeWindow>;

    /// Configured screen density in dots per inch.
    fn density(&self) -> Option<i32>;

    fn set_window_format(&mut self, format: ColorFormat);

    fn set_fullscreen(&mut self, fullscreen: bool);

    /// Matches the window buffers to the chosen config's visual.
    fn set_buffers_format(&mut self, visual_id: i32);
}

/// Remote calls into the managed runtime that owns the UI thread.
///
/// Any call may fail; the shell treats a failure as "feature unavailable"
/// and falls back to a safe default.
pub trait RuntimeBridge {
    fn attach(&mut self) -> Result<(), BridgeError>;

    fn detach(&mut self);

    fn set_chrome(&mut self, chrome: ChromeMode) -> Result<(), BridgeError>;

    fn set_requested_orientation(&mut self, lock: OrientationLock) -> Result<(), BridgeError>;

    fn set_soft_keyboard_visible(&mut self, visible: bool) -> Result<(), BridgeError>;

    /// Sends the task to the background. Returns whether the runtime complied.
    fn move_task_to_back(&mut self) -> Result<bool, BridgeError>;

    /// Re-arms content rect notifications so visible-frame changes are reported.
    fn reset_content_rect(&mut self) -> Result<(), BridgeError>;

    fn visible_display_frame(&mut self) -> Result<Bounds, BridgeError>;

    fn unicode_char(&mut self, key_code: i32, meta_state: i32) -> Result<u32, BridgeError>;

    /// Display rotation as a quarter-turn count (0..=3).
    fn display_rotation(&mut self) -> Result<i32, BridgeError>;

    fn refresh_rate(&mut self) -> Result<f32, BridgeError>;

    fn cutout_insets(&mut self) -> Result<Insets, BridgeError>;

    fn system_window_insets(&mut self) -> Result<Insets, BridgeError>;
}

/// Device sensor subscription primitive.
pub trait SensorService {
    fn is_available(&self, kind: SensorKind) -> bool;

    fn enable(&mut self, kind: SensorKind) -> bool;

    fn disable(&mut self, kind: SensorKind) -> bool;

    /// Minimum interval the device supports, `None` for on-change sensors.
    fn min_delay(&self, kind: SensorKind) -> Option<Duration>;

    fn set_event_rate(&mut self, kind: SensorKind, interval: Duration);

    /// Moves every sample received since the last call into `out`.
    fn drain(&mut self, out: &mut Vec<RawSensorSample>);

    /// Releases the event queue. Called once on teardown.
    fn release(&mut self) {}
}

/// Monotonic clock.
pub trait Clock {
    /// Time since an arbitrary fixed origin.
    fn now(&self) -> Duration;

    fn sleep(&self, duration: Duration);
}

/// [`Clock`] backed by [`Instant`] and [`std::thread::sleep`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// The full set of collaborators a [`Shell`](crate::Shell) drives.
pub struct Platform {
    pub graphics: Box<dyn GraphicsBackend>,
    pub window: Box<dyn WindowProvider>,
    pub bridge: Box<dyn RuntimeBridge>,
    pub sensors: Box<dyn SensorService>,
    pub clock: Box<dyn Clock>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(depth: u8, samples: u8) -> PixelFormatRequest {
        PixelFormatRequest {
            red: 8,
            green: 8,
            blue: 8,
            alpha: 8,
            depth,
            stencil: 0,
            samples,
        }
    }

    #[test]
    fn relaxation_drops_samples_before_depth() {
        let mut current = request(24, 4);
        let mut seen = vec![(current.depth, current.samples)];
        while let Some(next) = current.relaxed() {
            current = next;
            seen.push((current.depth, current.samples));
        }
        assert_eq!(
            seen,
            vec![(24, 4), (24, 2), (24, 0), (16, 0), (8, 0)]
        );
    }

    #[test]
    fn nothing_to_relax_without_depth_or_samples() {
        assert_eq!(request(0, 0).relaxed(), None);
        assert_eq!(request(8, 0).relaxed(), None);
    }
}
