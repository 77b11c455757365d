//! Mock window, runtime bridge, sensor service and clock.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tether_core::geometry::{Bounds, Insets};
use tether_shell::config::{ChromeMode, ColorFormat, OrientationLock};
use tether_shell::error::BridgeError;
use tether_shell::platform::{Clock, NativeWindow, Platform, RuntimeBridge, SensorService, WindowProvider};
use tether_shell::sensor::{RawSensorSample, SensorKind};

use crate::mock_graphics::MockGraphics;

#[derive(Debug, Clone, PartialEq, Eq)]
struct WindowState {
    window: Option<NativeWindow>,
    density: Option<i32>,
    format: Option<ColorFormat>,
    fullscreen: Option<bool>,
    buffers_format: Option<i32>,
}

/// Mock window provider. Starts with a window attached at 160 dpi.
#[derive(Debug, Clone)]
pub struct MockWindow {
    state: Arc<Mutex<WindowState>>,
}

impl MockWindow {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(WindowState {
                window: Some(NativeWindow(1)),
                density: Some(160),
                format: None,
                fullscreen: None,
                buffers_format: None,
            })),
        }
    }

    pub fn set_window(&self, window: Option<NativeWindow>) {
        self.state.lock().window = window;
    }

    pub fn set_density(&self, density: Option<i32>) {
        self.state.lock().density = density;
    }

    /// Pixel format requested by the shell, if any.
    pub fn format(&self) -> Option<ColorFormat> {
        self.state.lock().format
    }

    pub fn fullscreen(&self) -> Option<bool> {
        self.state.lock().fullscreen
    }

    pub fn buffers_format(&self) -> Option<i32> {
        self.state.lock().buffers_format
    }
}

impl Default for MockWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowProvider for MockWindow {
    fn native_window(&self) -> Option<NativeWindow> {
        self.state.lock().window
    }

    fn density(&self) -> Option<i32> {
        self.state.lock().density
    }

    fn set_window_format(&mut self, format: ColorFormat) {
        self.state.lock().format = Some(format);
    }

    fn set_fullscreen(&mut self, fullscreen: bool) {
        self.state.lock().fullscreen = Some(fullscreen);
    }

    fn set_buffers_format(&mut self, visual_id: i32) {
        self.state.lock().buffers_format = Some(visual_id);
    }
}

/// Records a runtime bridge call.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeCall {
    Attach,
    Detach,
    SetChrome(ChromeMode),
    SetRequestedOrientation(OrientationLock),
    SetSoftKeyboardVisible(bool),
    MoveTaskToBack,
    ResetContentRect,
    VisibleDisplayFrame,
    UnicodeChar { key_code: i32, meta_state: i32 },
    DisplayRotation,
    RefreshRate,
    CutoutInsets,
    SystemWindowInsets,
}

#[derive(Debug)]
struct BridgeState {
    calls: Vec<BridgeCall>,
    rotation: Option<i32>,
    refresh_rate: Option<f32>,
    visible_frame: Option<Bounds>,
    unicode: HashMap<i32, u32>,
    cutout_insets: Option<Insets>,
    system_window_insets: Option<Insets>,
    move_task_to_back: Option<bool>,
    soft_keyboard_available: bool,
}

/// Mock runtime bridge.
///
/// Queries configured as `None` fail with [`BridgeError::Unavailable`].
#[derive(Debug, Clone)]
pub struct MockBridge {
    state: Arc<Mutex<BridgeState>>,
}

impl MockBridge {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(BridgeState {
                calls: Vec::new(),
                rotation: Some(0),
                refresh_rate: Some(60.0),
                visible_frame: None,
                unicode: HashMap::new(),
                cutout_insets: None,
                system_window_insets: None,
                move_task_to_back: Some(true),
                soft_keyboard_available: true,
            })),
        }
    }

    pub fn calls(&self) -> Vec<BridgeCall> {
        self.state.lock().calls.clone()
    }

    pub fn count(&self, predicate: impl Fn(&BridgeCall) -> bool) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| predicate(call))
            .count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub fn set_rotation(&self, rotation: Option<i32>) {
        self.state.lock().rotation = rotation;
    }

    pub fn set_refresh_rate(&self, rate: Option<f32>) {
        self.state.lock().refresh_rate = rate;
    }

    pub fn set_visible_frame(&self, frame: Option<Bounds>) {
        self.state.lock().visible_frame = frame;
    }

    /// Code point produced by `key_code`, for every meta state.
    pub fn set_unicode(&self, key_code: i32, code_point: u32) {
        self.state.lock().unicode.insert(key_code, code_point);
    }

    pub fn set_cutout_insets(&self, insets: Option<Insets>) {
        self.state.lock().cutout_insets = insets;
    }

    pub fn set_system_window_insets(&self, insets: Option<Insets>) {
        self.state.lock().system_window_insets = insets;
    }

    pub fn set_move_task_to_back(&self, result: Option<bool>) {
        self.state.lock().move_task_to_back = result;
    }

    pub fn set_soft_keyboard_available(&self, available: bool) {
        self.state.lock().soft_keyboard_available = available;
    }
}

impl Default for MockBridge {
    fn default() -> Self {
        Self::new()
    }
}

fn answer<T>(value: Option<T>, call: &'static str) -> Result<T, BridgeError> {
    value.ok_or(BridgeError::Unavailable(call))
}

impl RuntimeBridge for MockBridge {
    fn attach(&mut self) -> Result<(), BridgeError> {
        self.state.lock().calls.push(BridgeCall::Attach);
        Ok(())
    }

    fn detach(&mut self) {
        self.state.lock().calls.push(BridgeCall::Detach);
    }

    fn set_chrome(&mut self, chrome: ChromeMode) -> Result<(), BridgeError> {
        self.state.lock().calls.push(BridgeCall::SetChrome(chrome));
        Ok(())
    }

    fn set_requested_orientation(&mut self, lock: OrientationLock) -> Result<(), BridgeError> {
        self.state
            .lock()
            .calls
            .push(BridgeCall::SetRequestedOrientation(lock));
        Ok(())
    }

    fn set_soft_keyboard_visible(&mut self, visible: bool) -> Result<(), BridgeError> {
        let mut state = self.state.lock();
        state.calls.push(BridgeCall::SetSoftKeyboardVisible(visible));
        answer(
            state.soft_keyboard_available.then_some(()),
            "set_soft_keyboard_visible",
        )
    }

    fn move_task_to_back(&mut self) -> Result<bool, BridgeError> {
        let mut state = self.state.lock();
        state.calls.push(BridgeCall::MoveTaskToBack);
        answer(state.move_task_to_back, "move_task_to_back")
    }

    fn reset_content_rect(&mut self) -> Result<(), BridgeError> {
        self.state.lock().calls.push(BridgeCall::ResetContentRect);
        Ok(())
    }

    fn visible_display_frame(&mut self) -> Result<Bounds, BridgeError> {
        let mut state = self.state.lock();
        state.calls.push(BridgeCall::VisibleDisplayFrame);
        answer(state.visible_frame, "visible_display_frame")
    }

    fn unicode_char(&mut self, key_code: i32, meta_state: i32) -> Result<u32, BridgeError> {
        let mut state = self.state.lock();
        state.calls.push(BridgeCall::UnicodeChar {
            key_code,
            meta_state,
        });
        answer(state.unicode.get(&key_code).copied(), "unicode_char")
    }

    fn display_rotation(&mut self) -> Result<i32, BridgeError> {
        let mut state = self.state.lock();
        state.calls.push(BridgeCall::DisplayRotation);
        answer(state.rotation, "display_rotation")
    }

    fn refresh_rate(&mut self) -> Result<f32, BridgeError> {
        let mut state = self.state.lock();
        state.calls.push(BridgeCall::RefreshRate);
        answer(state.refresh_rate, "refresh_rate")
    }

    fn cutout_insets(&mut self) -> Result<Insets, BridgeError> {
        let mut state = self.state.lock();
        state.calls.push(BridgeCall::CutoutInsets);
        answer(state.cutout_insets, "cutout_insets")
    }

    fn system_window_insets(&mut self) -> Result<Insets, BridgeError> {
        let mut state = self.state.lock();
        state.calls.push(BridgeCall::SystemWindowInsets);
        answer(state.system_window_insets, "system_window_insets")
    }
}

#[derive(Debug, Default)]
struct SensorState {
    unavailable: Vec<SensorKind>,
    enabled: Vec<SensorKind>,
    min_delays: HashMap<SensorKind, Duration>,
    rates: Vec<(SensorKind, Duration)>,
    queue: Vec<RawSensorSample>,
    enable_calls: usize,
    disable_calls: usize,
    released: bool,
}

/// Mock sensor service. Every sensor kind is available unless removed.
#[derive(Debug, Clone, Default)]
pub struct MockSensors {
    state: Arc<Mutex<SensorState>>,
}

impl MockSensors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, kind: SensorKind, available: bool) {
        let mut state = self.state.lock();
        state.unavailable.retain(|k| *k != kind);
        if !available {
            state.unavailable.push(kind);
        }
    }

    pub fn set_min_delay(&self, kind: SensorKind, delay: Duration) {
        self.state.lock().min_delays.insert(kind, delay);
    }

    /// Queues a sample for the next drain.
    pub fn push_sample(&self, sample: RawSensorSample) {
        self.state.lock().queue.push(sample);
    }

    pub fn is_enabled(&self, kind: SensorKind) -> bool {
        self.state.lock().enabled.contains(&kind)
    }

    /// Event rates set by the shell, in call order.
    pub fn rates(&self) -> Vec<(SensorKind, Duration)> {
        self.state.lock().rates.clone()
    }

    pub fn enable_calls(&self) -> usize {
        self.state.lock().enable_calls
    }

    pub fn disable_calls(&self) -> usize {
        self.state.lock().disable_calls
    }

    pub fn is_released(&self) -> bool {
        self.state.lock().released
    }
}

impl SensorService for MockSensors {
    fn is_available(&self, kind: SensorKind) -> bool {
        !self.state.lock().unavailable.contains(&kind)
    }

    fn enable(&mut self, kind: SensorKind) -> bool {
        let mut state = self.state.lock();
        state.enable_calls += 1;
        if !state.enabled.contains(&kind) {
            state.enabled.push(kind);
        }
        true
    }

    fn disable(&mut self, kind: SensorKind) -> bool {
        let mut state = self.state.lock();
        state.disable_calls += 1;
        state.enabled.retain(|k| *k != kind);
        true
    }

    fn min_delay(&self, kind: SensorKind) -> Option<Duration> {
        self.state.lock().min_delays.get(&kind).copied()
    }

    fn set_event_rate(&mut self, kind: SensorKind, interval: Duration) {
        self.state.lock().rates.push((kind, interval));
    }

    fn drain(&mut self, out: &mut Vec<RawSensorSample>) {
        out.append(&mut self.state.lock().queue);
    }

    fn release(&mut self) {
        self.state.lock().released = true;
    }
}

#[derive(Debug)]
struct ClockState {
    now: Duration,
    tick: Duration,
    sleeps: Vec<Duration>,
}

/// Deterministic clock.
///
/// Every `now()` reading advances time by a small tick so busy-wait loops
/// terminate; `sleep` advances by the requested duration.
#[derive(Debug, Clone)]
pub struct ManualClock {
    state: Arc<Mutex<ClockState>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ClockState {
                now: Duration::ZERO,
                tick: Duration::from_micros(100),
                sleeps: Vec::new(),
            })),
        }
    }

    pub fn advance(&self, duration: Duration) {
        self.state.lock().now += duration;
    }

    pub fn set_tick(&self, tick: Duration) {
        self.state.lock().tick = tick;
    }

    /// Current time without advancing.
    pub fn peek(&self) -> Duration {
        self.state.lock().now
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.state.lock().sleeps.clone()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        let mut state = self.state.lock();
        let now = state.now;
        let tick = state.tick;
        state.now += tick;
        now
    }

    fn sleep(&self, duration: Duration) {
        let mut state = self.state.lock();
        state.sleeps.push(duration);
        state.now += duration;
    }
}

/// A full set of mock collaborators sharing state with the test.
#[derive(Debug, Clone, Default)]
pub struct MockPlatform {
    pub graphics: MockGraphics,
    pub window: MockWindow,
    pub bridge: MockBridge,
    pub sensors: MockSensors,
    pub clock: ManualClock,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Boxed handles for [`tether_shell::Shell::new`].
    pub fn platform(&self) -> Platform {
        Platform {
            graphics: Box::new(self.graphics.clone()),
            window: Box::new(self.window.clone()),
            bridge: Box::new(self.bridge.clone()),
            sensors: Box::new(self.sensors.clone()),
            clock: Box::new(self.clock.clone()),
        }
    }
}
