//! An [`App`] that records every callback it receives.

use std::sync::Arc;

use parking_lot::Mutex;
use tether_core::geometry::Rect;
use tether_shell::chrome::Orientation;
use tether_shell::input::{Key, KeyAction, Modifiers, TouchPhase};
use tether_shell::sensor::{SensorEvent, SensorKind};
use tether_shell::{App, ShellCtx};

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Start,
    SurfaceCreated { width: u32, height: u32 },
    SurfaceDestroyed,
    Render,
    Refresh,
    Resized { width: u32, height: u32 },
    Focus(bool),
    LowMemory,
    Orientation(Orientation),
    Keyboard { visible: bool, frame: Rect<f64> },
    Key { key: Key, action: KeyAction, modifiers: Modifiers },
    Char { text: String, modifiers: Modifiers },
    Touch { slot: usize, phase: TouchPhase, x: f64, y: f64 },
    Sensor(SensorEvent),
}

/// Shared view of the events a [`RecordingApp`] received.
#[derive(Debug, Clone, Default)]
pub struct AppLog {
    events: Arc<Mutex<Vec<AppEvent>>>,
}

impl AppLog {
    pub fn events(&self) -> Vec<AppEvent> {
        self.events.lock().clone()
    }

    /// Returns the recorded events and clears the log.
    pub fn take(&self) -> Vec<AppEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    pub fn count(&self, predicate: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|event| predicate(event)).count()
    }

    fn push(&self, event: AppEvent) {
        self.events.lock().push(event);
    }
}

/// Records callbacks into an [`AppLog`].
///
/// By default it swaps buffers on every render and leaves keys unhandled.
#[derive(Debug, Clone)]
pub struct RecordingApp {
    log: AppLog,
    swap_on_render: bool,
    handles_keys: bool,
    sensors_on_start: Vec<SensorKind>,
}

impl RecordingApp {
    pub fn new() -> (Self, AppLog) {
        let log = AppLog::default();
        (
            Self {
                log: log.clone(),
                swap_on_render: true,
                handles_keys: false,
                sensors_on_start: Vec::new(),
            },
            log,
        )
    }

    pub fn with_swap_on_render(mut self, swap: bool) -> Self {
        self.swap_on_render = swap;
        self
    }

    pub fn with_key_handling(mut self, handled: bool) -> Self {
        self.handles_keys = handled;
        self
    }

    /// Sensors registered from `on_start`.
    pub fn with_sensors(mut self, kinds: &[SensorKind]) -> Self {
        self.sensors_on_start = kinds.to_vec();
        self
    }
}

impl App for RecordingApp {
    fn on_start(&mut self, ctx: &mut ShellCtx) {
        self.log.push(AppEvent::Start);
        for kind in &self.sensors_on_start {
            ctx.set_sensor_enabled(*kind, true);
        }
    }

    fn surface_created(&mut self, _ctx: &mut ShellCtx, width: u32, height: u32) {
        self.log.push(AppEvent::SurfaceCreated { width, height });
    }

    fn surface_destroyed(&mut self, _ctx: &mut ShellCtx) {
        self.log.push(AppEvent::SurfaceDestroyed);
    }

    fn render(&mut self, ctx: &mut ShellCtx) {
        self.log.push(AppEvent::Render);
        if self.swap_on_render {
            ctx.swap_buffers();
        }
    }

    fn refresh(&mut self, _ctx: &mut ShellCtx) {
        self.log.push(AppEvent::Refresh);
    }

    fn resized(&mut self, _ctx: &mut ShellCtx, width: u32, height: u32) {
        self.log.push(AppEvent::Resized { width, height });
    }

    fn focus_changed(&mut self, _ctx: &mut ShellCtx, focused: bool) {
        self.log.push(AppEvent::Focus(focused));
    }

    fn low_memory(&mut self, _ctx: &mut ShellCtx) {
        self.log.push(AppEvent::LowMemory);
    }

    fn orientation_changed(&mut self, _ctx: &mut ShellCtx, orientation: Orientation) {
        self.log.push(AppEvent::Orientation(orientation));
    }

    fn keyboard_visibility_changed(&mut self, _ctx: &mut ShellCtx, visible: bool, frame: Rect<f64>) {
        self.log.push(AppEvent::Keyboard { visible, frame });
    }

    fn key(&mut self, _ctx: &mut ShellCtx, key: Key, action: KeyAction, modifiers: Modifiers) -> bool {
        self.log.push(AppEvent::Key {
            key,
            action,
            modifiers,
        });
        self.handles_keys
    }

    fn char_input(&mut self, _ctx: &mut ShellCtx, text: &str, modifiers: Modifiers) {
        self.log.push(AppEvent::Char {
            text: text.to_string(),
            modifiers,
        });
    }

    fn touch(&mut self, _ctx: &mut ShellCtx, slot: usize, phase: TouchPhase, x: f64, y: f64) {
        self.log.push(AppEvent::Touch { slot, phase, x, y });
    }

    fn sensor(&mut self, _ctx: &mut ShellCtx, event: &SensorEvent) {
        self.log.push(AppEvent::Sensor(*event));
    }
}
