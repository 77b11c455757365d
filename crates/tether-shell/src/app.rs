use std::time::Duration;

use tether_core::geometry::{Bounds, Insets, Rect, Size};

use crate::chrome::{KeyboardState, Orientation};
use crate::config::{ApiTier, ChromeMode, SupportedOrientations};
use crate::input::{Key, KeyAction, Modifiers, TouchPhase};
use crate::lifecycle::LifecycleState;
use crate::sensor::{SensorEvent, SensorKind};
use crate::shell::ShellCore;
use crate::time::FrameTime;

/// Handle the embedder uses to query and steer the shell from a callback.
pub struct ShellCtx<'a> {
    core: &'a mut ShellCore,
}

impl<'a> ShellCtx<'a> {
    pub(crate) fn new(core: &'a mut ShellCore) -> Self {
        Self { core }
    }
}

impl ShellCtx<'_> {
    /// Surface size in pixels, as last reported through `App::resized`.
    pub fn display_size(&self) -> Size<u32> {
        self.core.surface.state().size()
    }

    /// Pixels per density-independent unit.
    pub fn scale(&self) -> f64 {
        self.core.surface.state().scale
    }

    /// API tier of the current context.
    pub fn api_tier(&self) -> ApiTier {
        self.core.surface.state().tier
    }

    pub fn lifecycle_state(&self) -> LifecycleState {
        self.core.lifecycle.state()
    }

    pub fn is_animating(&self) -> bool {
        self.core.lifecycle.is_animating()
    }

    pub fn orientation(&self) -> Orientation {
        self.core.chrome.orientation()
    }

    pub fn supported_orientations(&self) -> SupportedOrientations {
        self.core.config.supported_orientations
    }

    /// Changes the supported set and asks the window manager for the
    /// matching orientation lock.
    pub fn set_supported_orientations(&mut self, orientations: SupportedOrientations) {
        if self.core.config.supported_orientations != orientations {
            self.core.config.supported_orientations = orientations;
            self.core.apply_orientation_lock();
        }
    }

    pub fn chrome(&self) -> ChromeMode {
        self.core.config.chrome
    }

    pub fn set_chrome(&mut self, chrome: ChromeMode) {
        if self.core.config.chrome != chrome {
            self.core.config.chrome = chrome;
            self.core.apply_chrome();
        }
    }

    /// Distances from each surface edge to the area not covered by system UI.
    pub fn chrome_insets(&mut self) -> Insets {
        self.core.chrome_insets()
    }

    /// Last acknowledged content rectangle.
    pub fn content_rect(&self) -> Bounds {
        self.core.receiver.content_rect()
    }

    pub fn keyboard(&self) -> KeyboardState {
        self.core.chrome.keyboard()
    }

    pub fn is_keyboard_visible(&self) -> bool {
        self.core.chrome.keyboard().visible
    }

    /// Shows or hides the soft keyboard. Showing it drops fullscreen chrome.
    pub fn set_keyboard_visible(&mut self, visible: bool) {
        self.core.set_keyboard_visible(visible);
    }

    pub fn multitouch_enabled(&self) -> bool {
        self.core.input.multitouch()
    }

    pub fn set_multitouch_enabled(&mut self, enabled: bool) {
        self.core.config.multitouch = enabled;
        self.core.input.set_multitouch(enabled);
    }

    /// Registers interest in a sensor. Samples are delivered through
    /// `App::sensor` while the shell is animating.
    pub fn set_sensor_enabled(&mut self, kind: SensorKind, enabled: bool) {
        if self.core.sensors.set_requested(kind, enabled) {
            self.core.sync_sensors();
        }
    }

    pub fn is_sensor_enabled(&self, kind: SensorKind) -> bool {
        self.core.sensors.is_requested(kind)
    }

    pub fn is_sensor_available(&self, kind: SensorKind) -> bool {
        self.core.platform.sensors.is_available(kind)
    }

    /// Most recent sample of a sensor, if one arrived since it was enabled.
    pub fn last_sensor_event(&self, kind: SensorKind) -> Option<SensorEvent> {
        self.core.sensors.last_event(kind).copied()
    }

    /// Asks for an `App::refresh` call before the next render.
    pub fn request_refresh(&mut self) {
        self.core.refresh_requested = true;
    }

    /// Presents the frame. Returns `false` if the swap failed; the shell has
    /// then already started recovering the surface or context.
    pub fn swap_buffers(&mut self) -> bool {
        self.core.swap_buffers()
    }

    /// Time on the shell's monotonic clock.
    pub fn time(&self) -> Duration {
        self.core.platform.clock.now()
    }

    /// Timing of the frame being rendered.
    pub fn frame_time(&self) -> &FrameTime {
        &self.core.frame_time
    }
}

/// Embedder callbacks. Every method but [`App::render`] defaults to a no-op.
///
/// All callbacks run on the render thread, one at a time.
pub trait App {
    /// Called once, on the first attach, before any other callback.
    #[allow(unused_variables)]
    fn on_start(&mut self, ctx: &mut ShellCtx) {}

    /// A new graphics context is current. Create GPU resources here.
    #[allow(unused_variables)]
    fn surface_created(&mut self, ctx: &mut ShellCtx, width: u32, height: u32) {}

    /// The graphics context is gone. Every GPU resource is invalid.
    #[allow(unused_variables)]
    fn surface_destroyed(&mut self, ctx: &mut ShellCtx) {}

    /// Draw one frame. Call [`ShellCtx::swap_buffers`] to present it; if the
    /// frame is not swapped the shell paces to the display refresh rate.
    fn render(&mut self, ctx: &mut ShellCtx);

    /// The previous frame's contents are stale and everything must be redrawn.
    #[allow(unused_variables)]
    fn refresh(&mut self, ctx: &mut ShellCtx) {}

    #[allow(unused_variables)]
    fn resized(&mut self, ctx: &mut ShellCtx, width: u32, height: u32) {}

    #[allow(unused_variables)]
    fn focus_changed(&mut self, ctx: &mut ShellCtx, focused: bool) {}

    #[allow(unused_variables)]
    fn low_memory(&mut self, ctx: &mut ShellCtx) {}

    #[allow(unused_variables)]
    fn orientation_changed(&mut self, ctx: &mut ShellCtx, orientation: Orientation) {}

    /// `frame` is the keyboard's area in surface pixels, zero when hidden.
    #[allow(unused_variables)]
    fn keyboard_visibility_changed(&mut self, ctx: &mut ShellCtx, visible: bool, frame: Rect<f64>) {
    }

    /// Returns `true` if the key was consumed.
    #[allow(unused_variables)]
    fn key(&mut self, ctx: &mut ShellCtx, key: Key, action: KeyAction, modifiers: Modifiers) -> bool {
        false
    }

    /// Text typed by a key, as UTF-8.
    #[allow(unused_variables)]
    fn char_input(&mut self, ctx: &mut ShellCtx, text: &str, modifiers: Modifiers) {}

    #[allow(unused_variables)]
    fn touch(&mut self, ctx: &mut ShellCtx, slot: usize, phase: TouchPhase, x: f64, y: f64) {}

    /// A sample for a sensor enabled with [`ShellCtx::set_sensor_enabled`].
    #[allow(unused_variables)]
    fn sensor(&mut self, ctx: &mut ShellCtx, event: &SensorEvent) {}
}
