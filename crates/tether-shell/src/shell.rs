//! The render-thread scheduler.
//!
//! [`Shell`] owns the embedder's [`App`] and every piece of platform state.
//! Each cycle drains the command channel, delivers sensor samples and, while
//! animating, draws one frame.

use tether_core::geometry::{Bounds, Insets};
use tether_core::profiling::{new_frame, profile_function};

use crate::app::{App, ShellCtx};
use crate::channel::{CommandReceiver, HostMessage, Poll};
use crate::chrome::{ChromeTracker, InsetSource, Orientation, inset_priority, insets_from_visible_frame};
use crate::command::Command;
use crate::config::{ChromeMode, ShellConfig};
use crate::error::{BridgeError, SurfaceError};
use crate::input::{InputNormalizer, Modifiers, NormalizedKey, RawKeyEvent, RawMotionEvent, TextInput};
use crate::lifecycle::{AnimationChange, Lifecycle, LifecycleState};
use crate::pacing::FramePacer;
use crate::platform::{GraphicsStatus, Platform, RuntimeBridge};
use crate::sensor::{SensorEvent, SensorMultiplexer};
use crate::surface::{SurfaceEvent, SurfaceManager, SurfaceState, density_scale};
use crate::time::{FrameTime, TimeTracker};

/// Why [`Shell::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// A destroy command was processed.
    Destroyed,
    /// Every [`CommandSender`](crate::CommandSender) was dropped.
    HostDisconnected,
}

/// Everything but the embedder, so callbacks can borrow it through
/// [`ShellCtx`] while the shell holds the `App`.
pub(crate) struct ShellCore {
    pub(crate) config: ShellConfig,
    pub(crate) platform: Platform,
    pub(crate) receiver: CommandReceiver,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) surface: SurfaceManager,
    pub(crate) pacer: FramePacer,
    pub(crate) time: TimeTracker,
    pub(crate) frame_time: FrameTime,
    pub(crate) input: InputNormalizer,
    pub(crate) sensors: SensorMultiplexer,
    pub(crate) chrome: ChromeTracker,
    pub(crate) refresh_requested: bool,
    sensor_events: Vec<SensorEvent>,
}

impl ShellCore {
    /// Runs a bridge call, substituting `default` on failure.
    fn bridge_call<T>(
        &mut self,
        call: &'static str,
        default: T,
        f: impl FnOnce(&mut dyn RuntimeBridge) -> Result<T, BridgeError>,
    ) -> T {
        match f(self.platform.bridge.as_mut()) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(call, %err, "Runtime bridge call failed");
                default
            }
        }
    }

    pub(crate) fn apply_chrome(&mut self) {
        let chrome = self.config.chrome;
        self.bridge_call("set_chrome", (), |bridge| bridge.set_chrome(chrome));
    }

    pub(crate) fn apply_orientation_lock(&mut self) {
        let lock = self.config.supported_orientations.lock();
        self.bridge_call("set_requested_orientation", (), |bridge| {
            bridge.set_requested_orientation(lock)
        });
    }

    pub(crate) fn query_orientation(&mut self) -> Option<Orientation> {
        self.bridge_call("display_rotation", None, |bridge| {
            bridge.display_rotation().map(Some)
        })
        .map(Orientation::from_rotation)
    }

    pub(crate) fn set_keyboard_visible(&mut self, visible: bool) {
        let applied = self.bridge_call("set_soft_keyboard_visible", false, |bridge| {
            bridge.set_soft_keyboard_visible(visible).map(|()| true)
        });
        if applied && visible && self.config.chrome == ChromeMode::Fullscreen {
            self.config.chrome = ChromeMode::NavigationAndStatusBar;
            self.apply_chrome();
        }
    }

    pub(crate) fn chrome_insets(&mut self) -> Insets {
        let bridge = self.platform.bridge.as_mut();
        for source in inset_priority(self.config.chrome) {
            let insets = match source {
                InsetSource::DisplayCutout => bridge.cutout_insets().ok(),
                InsetSource::SystemWindow => bridge.system_window_insets().ok(),
                InsetSource::VisibleFrame => {
                    let visible = bridge
                        .visible_display_frame()
                        .unwrap_or(Bounds::ZERO);
                    Some(insets_from_visible_frame(
                        visible,
                        self.surface.state().size(),
                    ))
                }
            };
            if let Some(insets) = insets {
                return insets;
            }
            tracing::trace!(?source, "Inset source unavailable");
        }
        Insets::ZERO
    }

    pub(crate) fn sync_sensors(&mut self) {
        let animating = self.lifecycle.is_animating();
        self.sensors.sync(self.platform.sensors.as_mut(), animating);
    }

    pub(crate) fn recover_graphics(&mut self, status: GraphicsStatus) {
        let Platform {
            graphics, window, ..
        } = &mut self.platform;
        match self
            .surface
            .recover(graphics.as_mut(), window.as_mut(), &self.config, status)
        {
            Ok(()) => {}
            Err(err @ SurfaceError::ConfigurationExhausted { .. }) => {
                tracing::error!(%err, "Graphics recovery failed");
            }
            Err(err) => tracing::warn!(%err, "Graphics recovery failed"),
        }
    }

    pub(crate) fn swap_buffers(&mut self) -> bool {
        let result = self.surface.swap_buffers(self.platform.graphics.as_mut());
        let now = self.platform.clock.now();
        self.pacer.record_swap(now);
        match result {
            Ok(()) => true,
            Err(status) => {
                self.recover_graphics(status);
                false
            }
        }
    }
}

/// Drives an [`App`] from lifecycle commands on the render thread.
///
/// Only one shell may exist per process; the composition root that owns the
/// platform collaborators is responsible for that.
pub struct Shell {
    app: Box<dyn App>,
    core: ShellCore,
    started: bool,
    attached: bool,
}

impl Shell {
    pub fn new(
        app: impl App + 'static,
        config: ShellConfig,
        platform: Platform,
        receiver: CommandReceiver,
    ) -> Self {
        let now = platform.clock.now();
        let scale = density_scale(platform.window.density());
        Self {
            app: Box::new(app),
            core: ShellCore {
                lifecycle: Lifecycle::new(config.policy),
                surface: SurfaceManager::new(scale),
                pacer: FramePacer::new(now),
                time: TimeTracker::new(now),
                frame_time: FrameTime::new(),
                input: InputNormalizer::new(config.multitouch),
                sensors: SensorMultiplexer::new(),
                chrome: ChromeTracker::default(),
                refresh_requested: false,
                sensor_events: Vec::new(),
                config,
                platform,
                receiver,
            },
            started: false,
            attached: false,
        }
    }

    pub fn lifecycle_state(&self) -> LifecycleState {
        self.core.lifecycle.state()
    }

    pub fn surface_state(&self) -> &SurfaceState {
        self.core.surface.state()
    }

    pub fn config(&self) -> &ShellConfig {
        &self.core.config
    }

    /// Context for steering the shell between cycles.
    pub fn ctx(&mut self) -> ShellCtx<'_> {
        ShellCtx::new(&mut self.core)
    }

    /// Runs until a destroy command or until the host hangs up.
    ///
    /// Blocks on the command channel whenever the shell is not animating.
    pub fn run(&mut self) -> ExitReason {
        loop {
            if let Some(reason) = self.cycle(true) {
                return reason;
            }
        }
    }

    /// Runs one cycle without ever blocking on the channel.
    ///
    /// For hosts that own their event loop. Returns `Some` once the shell has
    /// shut down.
    pub fn pump(&mut self) -> Option<ExitReason> {
        self.cycle(false)
    }

    /// Resumes after a shutdown with a fresh channel and lifecycle. The `App`,
    /// the configuration and the first-focus flag carry over.
    pub fn reattach(&mut self, receiver: CommandReceiver) {
        if !self.core.lifecycle.is_destroyed() {
            self.teardown();
        }
        let now = self.core.platform.clock.now();
        self.core.receiver = receiver;
        self.core.lifecycle.reset();
        self.core.pacer = FramePacer::new(now);
        self.core.refresh_requested = false;
        tracing::info!("Shell reattached");
    }

    fn attach(&mut self) {
        profile_function!();
        let core = &mut self.core;
        if let Err(err) = core.platform.bridge.attach() {
            tracing::warn!(%err, "Runtime bridge attach failed");
        }

        let scale = density_scale(core.platform.window.density());
        core.surface.state_mut().scale = scale;
        core.platform.window.set_window_format(core.config.color_format);
        core.platform
            .window
            .set_fullscreen(core.config.chrome == ChromeMode::Fullscreen);
        core.apply_chrome();
        core.apply_orientation_lock();

        let orientation = core.query_orientation().unwrap_or_default();
        core.chrome = ChromeTracker::new(orientation);
        self.attached = true;
        tracing::info!(scale, ?orientation, "Shell attached");

        if !self.started {
            self.started = true;
            self.app.on_start(&mut ShellCtx::new(&mut self.core));
        }
    }

    fn cycle(&mut self, block_when_idle: bool) -> Option<ExitReason> {
        profile_function!();
        new_frame();

        if self.core.lifecycle.is_destroyed() {
            return Some(ExitReason::Destroyed);
        }
        if !self.attached {
            self.attach();
        }

        let mut may_block = block_when_idle;
        loop {
            let message = if may_block && !self.core.lifecycle.is_animating() {
                match self.core.receiver.wait() {
                    Some(message) => message,
                    None => return Some(self.disconnect()),
                }
            } else {
                match self.core.receiver.poll() {
                    Poll::Message(message) => message,
                    Poll::Empty => break,
                    Poll::Disconnected => return Some(self.disconnect()),
                }
            };
            may_block = false;

            self.handle_message(message);
            if self.core.lifecycle.is_destroyed() {
                return Some(ExitReason::Destroyed);
            }
        }

        self.poll_sensors();

        if self.core.lifecycle.is_animating() {
            self.core.pacer.begin_frame();
            self.draw_frame();
            if !self.core.pacer.swap_called() {
                self.pace();
            }
        }
        None
    }

    fn disconnect(&mut self) -> ExitReason {
        tracing::warn!("Command channel closed, shutting down");
        self.teardown();
        ExitReason::HostDisconnected
    }

    fn pace(&mut self) {
        let core = &mut self.core;
        let rate = core.pacer.refresh_rate(|| match core.platform.bridge.refresh_rate() {
            Ok(rate) => Some(rate),
            Err(err) => {
                tracing::warn!(%err, "Refresh rate unavailable");
                None
            }
        });
        core.pacer
            .wait_for_deadline(core.platform.clock.as_ref(), rate);
    }

    fn handle_message(&mut self, message: HostMessage) {
        match message {
            HostMessage::Command(command) => self.handle_command(command),
            HostMessage::Raw(code) => match Command::from_code(code) {
                Some(command) => self.handle_command(command),
                None => tracing::trace!(code, "Ignoring command code"),
            },
            HostMessage::Key(event) => self.handle_key(&event),
            HostMessage::Motion(event) => self.handle_motion(&event),
        }
    }

    fn handle_command(&mut self, command: Command) {
        tracing::debug!(?command, state = ?self.core.lifecycle.state(), "Lifecycle command");
        match command {
            Command::InitWindow => self.init_window(),
            Command::TermWindow => {
                self.core
                    .surface
                    .destroy_surface(self.core.platform.graphics.as_mut());
                let change = self.core.lifecycle.window_terminated();
                self.apply_animation_change(change);
            }
            Command::WindowRedrawNeeded => self.core.refresh_requested = true,
            Command::GainedFocus => {
                let change = self.core.lifecycle.focus_gained();
                self.apply_animation_change(change);
            }
            Command::LostFocus => {
                if self.core.lifecycle.is_animating() {
                    // One last frame so the paused contents are current.
                    self.core.refresh_requested = true;
                    self.draw_frame();
                }
                let change = self.core.lifecycle.focus_lost();
                self.apply_animation_change(change);
            }
            Command::ContentRectChanged => self.content_rect_changed(),
            Command::LowMemory => self.app.low_memory(&mut ShellCtx::new(&mut self.core)),
            Command::Start => self.core.apply_chrome(),
            Command::Destroy => self.teardown(),
            Command::WindowResized
            | Command::Resume
            | Command::SaveState
            | Command::Pause
            | Command::Stop => {}
        }
    }

    fn init_window(&mut self) {
        profile_function!();
        let core = &mut self.core;
        let Platform {
            graphics, window, ..
        } = &mut core.platform;
        match core
            .surface
            .initialize(graphics.as_mut(), window.as_mut(), &core.config)
        {
            Ok(tier) => tracing::debug!(?tier, "Surface ready"),
            Err(err @ SurfaceError::ConfigurationExhausted { .. }) => {
                tracing::error!(%err, "Surface initialization failed");
            }
            Err(err) => {
                tracing::warn!(%err, "Surface initialization failed");
                let status = err.status().unwrap_or_else(|| graphics.last_error());
                core.recover_graphics(status);
            }
        }
        self.dispatch_surface_events();

        if self.core.surface.is_current() {
            let change = self.core.lifecycle.window_ready();
            self.apply_animation_change(change);
        }
        self.core.refresh_requested = true;
        self.draw_frame();
    }

    fn apply_animation_change(&mut self, change: Option<AnimationChange>) {
        let Some(change) = change else {
            return;
        };
        let core = &mut self.core;
        core.refresh_requested = true;
        if change.animating {
            if core.surface.has_surface()
                && !core.surface.is_current()
                && !core.surface.make_current(core.platform.graphics.as_mut())
            {
                let status = core.platform.graphics.last_error();
                core.recover_graphics(status);
            }
        } else {
            core.surface
                .release_current(core.platform.graphics.as_mut());
        }
        self.dispatch_surface_events();

        if change.notify_focus {
            self.app
                .focus_changed(&mut ShellCtx::new(&mut self.core), change.animating);
        }
        self.core.sync_sensors();
    }

    fn draw_frame(&mut self) {
        profile_function!();
        if !self.core.surface.is_current() {
            return;
        }
        self.update_surface_size(false);
        if std::mem::take(&mut self.core.refresh_requested) {
            self.app.refresh(&mut ShellCtx::new(&mut self.core));
        }

        let now = self.core.platform.clock.now();
        self.core.frame_time = self.core.time.tick(now);
        self.app.render(&mut ShellCtx::new(&mut self.core));
        self.dispatch_surface_events();
    }

    fn update_surface_size(&mut self, force: bool) {
        let core = &mut self.core;
        let Some(live) = core.surface.live_size(core.platform.graphics.as_ref()) else {
            return;
        };
        let Some(size) = ChromeTracker::check_resize(core.surface.state_mut(), live, force) else {
            return;
        };
        tracing::debug!(width = size.width, height = size.height, force, "Surface resized");
        core.refresh_requested = true;
        self.update_orientation();
        self.app
            .resized(&mut ShellCtx::new(&mut self.core), size.width, size.height);
    }

    fn update_orientation(&mut self) {
        let Some(orientation) = self.core.query_orientation() else {
            return;
        };
        if let Some(orientation) = self.core.chrome.update_orientation(orientation) {
            self.core.refresh_requested = true;
            self.core.pacer.invalidate_refresh_rate();
            self.app
                .orientation_changed(&mut ShellCtx::new(&mut self.core), orientation);
        }
    }

    fn content_rect_changed(&mut self) {
        self.core.refresh_requested = true;
        let window = self.core.receiver.acknowledge_content_rect();
        self.core
            .bridge_call("reset_content_rect", (), |bridge| bridge.reset_content_rect());

        self.update_surface_size(true);
        self.update_orientation();
        self.update_keyboard(window);
    }

    fn update_keyboard(&mut self, window: Bounds) {
        let visible = self
            .core
            .bridge_call("visible_display_frame", window, |bridge| {
                bridge.visible_display_frame()
            });
        let scale = self.core.surface.state().scale;
        if let Some(keyboard) = self.core.chrome.update_keyboard(window, visible, scale) {
            self.core.refresh_requested = true;
            self.app.keyboard_visibility_changed(
                &mut ShellCtx::new(&mut self.core),
                keyboard.visible,
                keyboard.frame.to_rect(),
            );
        }
    }

    fn handle_key(&mut self, event: &RawKeyEvent) {
        let mut handled = false;
        if let Some(NormalizedKey {
            key,
            actions,
            modifiers,
            is_back_release,
        }) = self.core.input.key(event)
        {
            for action in actions {
                handled |= self
                    .app
                    .key(&mut ShellCtx::new(&mut self.core), key, action, modifiers);
            }
            if is_back_release && !handled && self.core.config.policy.background_on_back {
                let moved = self
                    .core
                    .bridge_call("move_task_to_back", false, |bridge| bridge.move_task_to_back());
                tracing::debug!(moved, "Unhandled back key, moving task to background");
            }
        }

        let repeats = self.core.input.text_repeats(event);
        if repeats > 0 {
            let code_point = self.core.bridge_call("unicode_char", 0, |bridge| {
                bridge.unicode_char(event.key_code, event.meta_state)
            });
            if let Some(text) = TextInput::from_code_point(code_point) {
                let modifiers = Modifiers::from_meta_state(event.meta_state);
                for _ in 0..repeats {
                    self.app.char_input(
                        &mut ShellCtx::new(&mut self.core),
                        text.as_str(),
                        modifiers,
                    );
                }
            }
        }
    }

    fn handle_motion(&mut self, event: &RawMotionEvent) {
        for touch in self.core.input.touches(event) {
            self.app.touch(
                &mut ShellCtx::new(&mut self.core),
                touch.slot,
                touch.phase,
                touch.x,
                touch.y,
            );
        }
    }

    fn poll_sensors(&mut self) {
        let mut events = std::mem::take(&mut self.core.sensor_events);
        self.core
            .sensors
            .poll(self.core.platform.sensors.as_mut(), &mut events);
        for event in &events {
            self.app.sensor(&mut ShellCtx::new(&mut self.core), event);
        }
        events.clear();
        self.core.sensor_events = events;
    }

    fn dispatch_surface_events(&mut self) {
        loop {
            let events = self.core.surface.drain_events();
            if events.is_empty() {
                break;
            }
            for event in events {
                let ctx = &mut ShellCtx::new(&mut self.core);
                match event {
                    SurfaceEvent::Created { width, height } => {
                        tracing::debug!(width, height, "Surface created");
                        self.app.surface_created(ctx, width, height);
                    }
                    SurfaceEvent::Destroyed => {
                        tracing::debug!("Surface destroyed");
                        self.app.surface_destroyed(ctx);
                    }
                }
            }
        }
    }

    fn teardown(&mut self) {
        profile_function!();
        tracing::info!("Shell shutting down");
        let core = &mut self.core;
        core.sensors.shutdown(core.platform.sensors.as_mut());
        core.surface.destroy(core.platform.graphics.as_mut());
        self.dispatch_surface_events();

        let change = self.core.lifecycle.destroyed();
        self.apply_animation_change(change);

        self.core.receiver.close();
        self.core.platform.bridge.detach();
        self.attached = false;
    }
}
