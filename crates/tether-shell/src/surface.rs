//! Graphics display, context and surface ownership.
//!
//! The [`SurfaceManager`] owns every backend handle and the [`SurfaceState`]
//! snapshot the rest of the shell reads. It never calls into the embedder
//! directly: creation and destruction of a context are queued as
//! [`SurfaceEvent`]s and dispatched by the shell in order, which keeps
//! `surface_created` ahead of the first render and `surface_destroyed` ahead
//! of the next `surface_created`.

use tether_core::geometry::Size;
use tether_core::profiling::profile_function;

use crate::chrome::RESIZE_EVENT_MAX_WAIT_FRAMES;
use crate::config::{ApiTier, ShellConfig, SwapBehavior};
use crate::error::{SurfaceError, SurfaceResult};
use crate::platform::{
    Binding, ConfigId, ContextId, GraphicsBackend, GraphicsStatus, PixelFormatRequest, SurfaceId,
    WindowProvider,
};

/// Display density that maps to a scale of 1.0.
pub const BASELINE_DENSITY: i32 = 160;

/// Density scale factor for a reported screen density.
pub fn density_scale(density: Option<i32>) -> f64 {
    const DENSITY_NONE: i32 = 0xffff;
    const DENSITY_ANY: i32 = 0xfffe;
    match density {
        Some(dpi) if dpi > 0 && dpi != DENSITY_NONE && dpi != DENSITY_ANY => {
            f64::from(dpi) / f64::from(BASELINE_DENSITY)
        }
        _ => 1.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceState {
    pub width: u32,
    pub height: u32,
    pub scale: f64,
    pub context_current: bool,
    pub tier: ApiTier,
    /// Frames left before an unconfirmed size change is reported anyway.
    pub resize_wait_frames: u32,
}

impl Default for SurfaceState {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            scale: 1.0,
            context_current: false,
            tier: ApiTier::Gles2,
            resize_wait_frames: RESIZE_EVENT_MAX_WAIT_FRAMES,
        }
    }
}

impl SurfaceState {
    pub fn size(&self) -> Size<u32> {
        Size::new(self.width, self.height)
    }
}

/// Context lifetime notifications for the embedder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    Created { width: u32, height: u32 },
    Destroyed,
}

/// How a failed bind or swap is repaired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Destroy and recreate the surface, keeping the context.
    RecreateSurface,
    /// Abandon the context and create a new one.
    RecreateContext,
    /// Tear everything down and start over.
    Reinitialize,
}

impl Recovery {
    pub fn classify(status: GraphicsStatus) -> Self {
        match status {
            GraphicsStatus::BadSurface => Recovery::RecreateSurface,
            GraphicsStatus::ContextLost | GraphicsStatus::BadContext => Recovery::RecreateContext,
            GraphicsStatus::Success | GraphicsStatus::Other(_) => Recovery::Reinitialize,
        }
    }
}

#[derive(Debug, Default)]
pub struct SurfaceManager {
    display: bool,
    config: Option<ConfigId>,
    context: Option<ContextId>,
    surface: Option<SurfaceId>,
    /// The embedder has been told about the current context.
    announced: bool,
    state: SurfaceState,
    events: Vec<SurfaceEvent>,
}

impl SurfaceManager {
    pub fn new(scale: f64) -> Self {
        Self {
            state: SurfaceState {
                scale,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn state(&self) -> &SurfaceState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SurfaceState {
        &mut self.state
    }

    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    pub fn is_current(&self) -> bool {
        self.state.context_current
    }

    /// Takes the queued context notifications, oldest first.
    pub fn drain_events(&mut self) -> Vec<SurfaceEvent> {
        std::mem::take(&mut self.events)
    }

    /// Brings the display, surface and context up and binds them.
    ///
    /// With a display already open only the missing surface and context are
    /// created. Returns the achieved API tier.
    pub fn initialize(
        &mut self,
        graphics: &mut dyn GraphicsBackend,
        window: &mut dyn WindowProvider,
        config: &ShellConfig,
    ) -> SurfaceResult<ApiTier> {
        profile_function!();

        if self.display {
            self.init_surface(graphics, window, config)?;
            return self.init_context(graphics, config);
        }

        if !graphics.initialize() {
            return Err(SurfaceError::DisplayUnavailable);
        }
        self.display = true;

        let chosen = match choose_config(graphics, config.pixel_format_request()) {
            Ok(chosen) => chosen,
            Err(err) => {
                graphics.terminate();
                self.display = false;
                return Err(err);
            }
        };
        self.config = Some(chosen);

        self.init_surface(graphics, window, config)?;
        if let Some(surface) = self.surface {
            if let Some(size) = graphics.surface_size(surface) {
                self.state.width = size.width;
                self.state.height = size.height;
            }
        }
        if let Some(visual) = graphics.native_visual_id(chosen) {
            window.set_buffers_format(visual);
        }

        self.init_context(graphics, config)
    }

    fn init_surface(
        &mut self,
        graphics: &mut dyn GraphicsBackend,
        window: &mut dyn WindowProvider,
        config: &ShellConfig,
    ) -> SurfaceResult<()> {
        if self.surface.is_some() {
            return Ok(());
        }
        let chosen = self.config.ok_or(SurfaceError::DisplayUnavailable)?;
        let native = window.native_window().ok_or(SurfaceError::NoWindow)?;
        let surface = graphics
            .create_window_surface(chosen, native)
            .ok_or(SurfaceError::SurfaceCreationFailed)?;
        if config.swap_behavior != SwapBehavior::PlatformDefault
            && !graphics.set_swap_behavior(surface, config.swap_behavior)
        {
            tracing::warn!(
                behavior = ?config.swap_behavior,
                "Swap behavior rejected, using platform default"
            );
        }
        tracing::debug!(?surface, "Window surface created");
        self.surface = Some(surface);
        Ok(())
    }

    fn init_context(
        &mut self,
        graphics: &mut dyn GraphicsBackend,
        config: &ShellConfig,
    ) -> SurfaceResult<ApiTier> {
        if self.context.is_none() {
            let chosen = self.config.ok_or(SurfaceError::DisplayUnavailable)?;
            let (context, tier) = create_context(graphics, chosen, config.preferred_api)?;
            tracing::info!(?tier, preferred = ?config.preferred_api, "Graphics context created");
            self.context = Some(context);
            self.state.tier = tier;
            self.announced = false;
        }

        if !self.make_current(graphics) {
            return Err(SurfaceError::BindFailed(graphics.last_error()));
        }

        if !self.announced {
            self.announced = true;
            self.events.push(SurfaceEvent::Created {
                width: self.state.width,
                height: self.state.height,
            });
        }
        Ok(self.state.tier)
    }

    /// Binds the context to the surface. On failure the context is marked not
    /// current and nothing may be rendered.
    pub fn make_current(&mut self, graphics: &mut dyn GraphicsBackend) -> bool {
        let (Some(surface), Some(context)) = (self.surface, self.context) else {
            self.state.context_current = false;
            return false;
        };
        let bound = graphics.make_current(Some(Binding { surface, context }));
        if !bound {
            tracing::warn!("Failed to make context current");
        }
        self.state.context_current = bound;
        bound
    }

    /// Unbinds the context, keeping every handle alive.
    pub fn release_current(&mut self, graphics: &mut dyn GraphicsBackend) {
        if self.display && self.state.context_current {
            graphics.make_current(None);
        }
        self.state.context_current = false;
    }

    /// Tears down the surface only. The context survives for the next window.
    pub fn destroy_surface(&mut self, graphics: &mut dyn GraphicsBackend) {
        self.release_current(graphics);
        if let Some(surface) = self.surface.take() {
            graphics.destroy_surface(surface);
            tracing::debug!(?surface, "Window surface destroyed");
        }
    }

    /// Repairs the stack after a failed bind or swap.
    pub fn recover(
        &mut self,
        graphics: &mut dyn GraphicsBackend,
        window: &mut dyn WindowProvider,
        config: &ShellConfig,
        status: GraphicsStatus,
    ) -> SurfaceResult<()> {
        profile_function!();
        let recovery = Recovery::classify(status);
        tracing::warn!(?status, ?recovery, "Recovering from graphics error");

        match recovery {
            Recovery::RecreateSurface => {
                self.destroy_surface(graphics);
                self.init_surface(graphics, window, config)?;
                // Rebinding announces a context whose first bind never succeeded.
                if self.context.is_some() {
                    self.init_context(graphics, config)?;
                }
                Ok(())
            }
            Recovery::RecreateContext => {
                // A lost context is abandoned; its handle is no longer valid.
                if self.context.take().is_some() {
                    self.state.context_current = false;
                    if self.announced {
                        self.announced = false;
                        self.events.push(SurfaceEvent::Destroyed);
                    }
                }
                self.init_context(graphics, config).map(|_| ())
            }
            Recovery::Reinitialize => {
                self.destroy(graphics);
                self.initialize(graphics, window, config).map(|_| ())
            }
        }
    }

    /// Releases context, surface and display. Safe to call repeatedly.
    pub fn destroy(&mut self, graphics: &mut dyn GraphicsBackend) {
        if self.display {
            graphics.make_current(None);
            if let Some(context) = self.context.take() {
                graphics.destroy_context(context);
                tracing::info!("Graphics context destroyed");
            }
            if let Some(surface) = self.surface.take() {
                graphics.destroy_surface(surface);
            }
            graphics.terminate();
        }
        if self.announced {
            self.events.push(SurfaceEvent::Destroyed);
        }

        self.display = false;
        self.config = None;
        self.context = None;
        self.surface = None;
        self.announced = false;
        self.state.context_current = false;
    }

    /// Presents the back buffer. The error status is returned for recovery.
    pub fn swap_buffers(&mut self, graphics: &mut dyn GraphicsBackend) -> Result<(), GraphicsStatus> {
        let Some(surface) = self.surface else {
            return Err(GraphicsStatus::BadSurface);
        };
        if graphics.swap_buffers(surface) {
            Ok(())
        } else {
            Err(graphics.last_error())
        }
    }

    /// Current pixel size of the surface as the backend sees it.
    pub fn live_size(&self, graphics: &dyn GraphicsBackend) -> Option<Size<u32>> {
        self.surface.and_then(|surface| graphics.surface_size(surface))
    }
}

fn choose_config(
    graphics: &mut dyn GraphicsBackend,
    requested: PixelFormatRequest,
) -> SurfaceResult<ConfigId> {
    let mut request = requested;
    loop {
        if let Some(config) = graphics.choose_config(&request) {
            if request != requested {
                tracing::debug!(
                    depth = request.depth,
                    samples = request.samples,
                    "Using relaxed pixel format"
                );
            }
            return Ok(config);
        }
        match request.relaxed() {
            Some(next) => request = next,
            None => return Err(SurfaceError::ConfigurationExhausted { requested }),
        }
    }
}

fn create_context(
    graphics: &mut dyn GraphicsBackend,
    config: ConfigId,
    preferred: ApiTier,
) -> SurfaceResult<(ContextId, ApiTier)> {
    for tier in ApiTier::fallback_chain(preferred) {
        let Some(context) = graphics.create_context(config, tier) else {
            tracing::debug!(?tier, "Context tier unavailable");
            continue;
        };
        let achieved = match graphics.context_version(context) {
            Some(version) => {
                ApiTier::from_version(version.major, version.minor.unwrap_or(tier.minor()))
            }
            None => tier,
        };
        return Ok((context, achieved));
    }
    Err(SurfaceError::ContextCreationFailed)
}
