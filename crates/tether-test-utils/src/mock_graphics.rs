//! Mock implementation of GraphicsBackend for testing.
//!
//! Handles are plain counters; nothing touches a real display. Every call is
//! recorded so tests can assert on the exact sequence the shell issued.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tether_core::geometry::Size;
use tether_shell::config::{ApiTier, SwapBehavior};
use tether_shell::platform::{
    Binding, ConfigId, ContextId, ContextVersion, GraphicsBackend, GraphicsStatus, NativeWindow,
    PixelFormatRequest, SurfaceId,
};

/// Records a graphics call for verification in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphicsCall {
    Initialize,
    Terminate,
    ChooseConfig(PixelFormatRequest),
    CreateContext(ApiTier),
    DestroyContext(ContextId),
    CreateSurface(NativeWindow),
    SetSwapBehavior(SwapBehavior),
    DestroySurface(SurfaceId),
    MakeCurrent(Option<Binding>),
    SwapBuffers(SurfaceId),
}

type ConfigFilter = Box<dyn Fn(&PixelFormatRequest) -> bool + Send>;

struct GraphicsState {
    calls: Vec<GraphicsCall>,
    display_available: bool,
    display_open: bool,
    config_filter: Option<ConfigFilter>,
    max_tier: ApiTier,
    report_minor: bool,
    surface_size: Size<u32>,
    make_current_failures: VecDeque<GraphicsStatus>,
    swap_failures: VecDeque<GraphicsStatus>,
    error: GraphicsStatus,
    next_handle: u64,
    contexts: Vec<(ContextId, ApiTier)>,
    surfaces: Vec<SurfaceId>,
    current: Option<Binding>,
}

impl GraphicsState {
    fn next_handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

/// Mock graphics backend.
///
/// Cloning yields another handle to the same state, so a test can keep one
/// clone while the shell owns another.
///
/// # Example
///
/// ```rust
/// # #[cfg(feature = "mock")]
/// # {
/// use tether_shell::platform::{GraphicsBackend, PixelFormatRequest};
/// use tether_test_utils::{GraphicsCall, MockGraphics};
///
/// let mock = MockGraphics::new();
/// let mut backend = mock.clone();
/// assert!(backend.initialize());
///
/// assert_eq!(mock.calls(), vec![GraphicsCall::Initialize]);
/// assert!(mock.is_display_open());
/// # }
/// ```
#[derive(Clone)]
pub struct MockGraphics {
    state: Arc<Mutex<GraphicsState>>,
}

impl MockGraphics {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(GraphicsState {
                calls: Vec::new(),
                display_available: true,
                display_open: false,
                config_filter: None,
                max_tier: ApiTier::Gles32,
                report_minor: true,
                surface_size: Size::new(1080, 1920),
                make_current_failures: VecDeque::new(),
                swap_failures: VecDeque::new(),
                error: GraphicsStatus::Success,
                next_handle: 0,
                contexts: Vec::new(),
                surfaces: Vec::new(),
                current: None,
            })),
        }
    }

    /// Get a copy of all recorded calls (for test assertions).
    pub fn calls(&self) -> Vec<GraphicsCall> {
        self.state.lock().calls.clone()
    }

    /// Count calls matching a predicate.
    pub fn count(&self, predicate: impl Fn(&GraphicsCall) -> bool) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| predicate(call))
            .count()
    }

    /// Clear recorded calls (useful between test steps).
    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub fn set_display_available(&self, available: bool) {
        self.state.lock().display_available = available;
    }

    /// Only configs accepted by `filter` exist.
    pub fn set_config_filter(&self, filter: impl Fn(&PixelFormatRequest) -> bool + Send + 'static) {
        self.state.lock().config_filter = Some(Box::new(filter));
    }

    /// Highest tier a context can be created at.
    pub fn set_max_tier(&self, tier: ApiTier) {
        self.state.lock().max_tier = tier;
    }

    /// Whether the context minor version query succeeds.
    pub fn set_report_minor(&self, report: bool) {
        self.state.lock().report_minor = report;
    }

    /// Size reported for every live surface.
    pub fn set_surface_size(&self, width: u32, height: u32) {
        self.state.lock().surface_size = Size::new(width, height);
    }

    /// The next bind fails with `status`.
    pub fn fail_next_make_current(&self, status: GraphicsStatus) {
        self.state.lock().make_current_failures.push_back(status);
    }

    /// The next swap fails with `status`.
    pub fn fail_next_swap(&self, status: GraphicsStatus) {
        self.state.lock().swap_failures.push_back(status);
    }

    pub fn is_display_open(&self) -> bool {
        self.state.lock().display_open
    }

    pub fn live_contexts(&self) -> usize {
        self.state.lock().contexts.len()
    }

    pub fn live_surfaces(&self) -> usize {
        self.state.lock().surfaces.len()
    }

    pub fn current(&self) -> Option<Binding> {
        self.state.lock().current
    }
}

impl std::fmt::Debug for MockGraphics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MockGraphics")
            .field("calls", &state.calls.len())
            .field("display_open", &state.display_open)
            .field("current", &state.current)
            .finish_non_exhaustive()
    }
}

impl Default for MockGraphics {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsBackend for MockGraphics {
    fn initialize(&mut self) -> bool {
        let mut state = self.state.lock();
        state.calls.push(GraphicsCall::Initialize);
        if state.display_available {
            state.display_open = true;
        } else {
            state.error = GraphicsStatus::Other(0x3001);
        }
        state.display_open
    }

    fn terminate(&mut self) {
        let mut state = self.state.lock();
        state.calls.push(GraphicsCall::Terminate);
        state.display_open = false;
        state.current = None;
    }

    fn choose_config(&mut self, request: &PixelFormatRequest) -> Option<ConfigId> {
        let mut state = self.state.lock();
        state.calls.push(GraphicsCall::ChooseConfig(*request));
        let accepted = state
            .config_filter
            .as_ref()
            .is_none_or(|filter| filter(request));
        accepted.then(|| ConfigId(state.next_handle()))
    }

    fn native_visual_id(&self, _config: ConfigId) -> Option<i32> {
        Some(1)
    }

    fn create_context(&mut self, _config: ConfigId, tier: ApiTier) -> Option<ContextId> {
        let mut state = self.state.lock();
        state.calls.push(GraphicsCall::CreateContext(tier));
        if tier > state.max_tier {
            return None;
        }
        let context = ContextId(state.next_handle());
        state.contexts.push((context, tier));
        Some(context)
    }

    fn context_version(&self, context: ContextId) -> Option<ContextVersion> {
        let state = self.state.lock();
        let (_, tier) = state.contexts.iter().find(|(id, _)| *id == context)?;
        Some(ContextVersion {
            major: tier.major(),
            minor: state.report_minor.then(|| tier.minor()),
        })
    }

    fn destroy_context(&mut self, context: ContextId) {
        let mut state = self.state.lock();
        state.calls.push(GraphicsCall::DestroyContext(context));
        state.contexts.retain(|(id, _)| *id != context);
    }

    fn create_window_surface(
        &mut self,
        _config: ConfigId,
        window: NativeWindow,
    ) -> Option<SurfaceId> {
        let mut state = self.state.lock();
        state.calls.push(GraphicsCall::CreateSurface(window));
        let surface = SurfaceId(state.next_handle());
        state.surfaces.push(surface);
        Some(surface)
    }

    fn set_swap_behavior(&mut self, _surface: SurfaceId, behavior: SwapBehavior) -> bool {
        self.state
            .lock()
            .calls
            .push(GraphicsCall::SetSwapBehavior(behavior));
        true
    }

    fn destroy_surface(&mut self, surface: SurfaceId) {
        let mut state = self.state.lock();
        state.calls.push(GraphicsCall::DestroySurface(surface));
        state.surfaces.retain(|id| *id != surface);
        if state.current.is_some_and(|binding| binding.surface == surface) {
            state.current = None;
        }
    }

    fn make_current(&mut self, binding: Option<Binding>) -> bool {
        let mut state = self.state.lock();
        state.calls.push(GraphicsCall::MakeCurrent(binding));
        let Some(binding) = binding else {
            state.current = None;
            return true;
        };
        if let Some(status) = state.make_current_failures.pop_front() {
            state.error = status;
            return false;
        }
        if !state.contexts.iter().any(|(id, _)| *id == binding.context) {
            state.error = GraphicsStatus::BadContext;
            return false;
        }
        if !state.surfaces.contains(&binding.surface) {
            state.error = GraphicsStatus::BadSurface;
            return false;
        }
        state.current = Some(binding);
        true
    }

    fn swap_buffers(&mut self, surface: SurfaceId) -> bool {
        let mut state = self.state.lock();
        state.calls.push(GraphicsCall::SwapBuffers(surface));
        if let Some(status) = state.swap_failures.pop_front() {
            state.error = status;
            return false;
        }
        if !state.surfaces.contains(&surface) {
            state.error = GraphicsStatus::BadSurface;
            return false;
        }
        true
    }

    fn surface_size(&self, surface: SurfaceId) -> Option<Size<u32>> {
        let state = self.state.lock();
        state
            .surfaces
            .contains(&surface)
            .then_some(state.surface_size)
    }

    fn last_error(&mut self) -> GraphicsStatus {
        std::mem::take(&mut self.state.lock().error)
    }
}
