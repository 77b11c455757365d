//! Declared configuration read by the surface manager and lifecycle.

use bitflags::bitflags;

use crate::platform::PixelFormatRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorFormat {
    #[default]
    Rgba8888,
    Rgb565,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DepthFormat {
    #[default]
    None,
    Depth16,
    Depth24,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StencilFormat {
    #[default]
    None,
    Stencil8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Multisample {
    #[default]
    None,
    X4,
}

/// Whether the back buffer survives a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SwapBehavior {
    #[default]
    PlatformDefault,
    BufferPreserved,
    BufferDestroyed,
}

/// System UI visible around the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChromeMode {
    /// Navigation bar only.
    #[default]
    Navigation,
    NavigationAndStatusBar,
    Fullscreen,
}

/// Graphics API capability tier, ordered from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum ApiTier {
    Gles2,
    Gles3,
    Gles31,
    #[default]
    Gles32,
}

impl ApiTier {
    /// Tiers from strongest to weakest.
    pub const DESCENDING: [ApiTier; 4] = [
        ApiTier::Gles32,
        ApiTier::Gles31,
        ApiTier::Gles3,
        ApiTier::Gles2,
    ];

    pub const fn major(self) -> u32 {
        match self {
            ApiTier::Gles2 => 2,
            _ => 3,
        }
    }

    pub const fn minor(self) -> u32 {
        match self {
            ApiTier::Gles2 | ApiTier::Gles3 => 0,
            ApiTier::Gles31 => 1,
            ApiTier::Gles32 => 2,
        }
    }

    /// Maps a reported context version onto the closest tier at or below it.
    pub fn from_version(major: u32, minor: u32) -> Self {
        match (major, minor) {
            (0..=2, _) => ApiTier::Gles2,
            (3, 0) => ApiTier::Gles3,
            (3, 1) => ApiTier::Gles31,
            _ => ApiTier::Gles32,
        }
    }

    /// Tiers to attempt for a preferred tier, strongest first. The baseline
    /// tier is always included.
    pub fn fallback_chain(preferred: ApiTier) -> impl Iterator<Item = ApiTier> {
        Self::DESCENDING
            .into_iter()
            .filter(move |tier| *tier <= preferred)
    }
}

bitflags! {
    /// Interface orientations the application supports.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SupportedOrientations: u8 {
        const PORTRAIT = 1 << 0;
        const PORTRAIT_UPSIDE_DOWN = 1 << 1;
        const LANDSCAPE_LEFT = 1 << 2;
        const LANDSCAPE_RIGHT = 1 << 3;
        const LANDSCAPE = Self::LANDSCAPE_LEFT.bits() | Self::LANDSCAPE_RIGHT.bits();
        const ALL = Self::PORTRAIT.bits() | Self::PORTRAIT_UPSIDE_DOWN.bits() | Self::LANDSCAPE.bits();
    }
}

impl Default for SupportedOrientations {
    fn default() -> Self {
        Self::ALL
    }
}

/// Orientation lock requested from the window manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrientationLock {
    Sensor,
    SensorLandscape,
    SensorPortrait,
}

impl OrientationLock {
    /// Platform screen-orientation constant for this lock.
    pub const fn code(self) -> i32 {
        match self {
            OrientationLock::Sensor => 4,
            OrientationLock::SensorLandscape => 6,
            OrientationLock::SensorPortrait => 7,
        }
    }
}

impl SupportedOrientations {
    pub fn lock(self) -> OrientationLock {
        let portrait = self.intersects(Self::PORTRAIT | Self::PORTRAIT_UPSIDE_DOWN);
        let landscape = self.intersects(Self::LANDSCAPE);
        match (portrait, landscape) {
            (true, true) => OrientationLock::Sensor,
            (false, true) => OrientationLock::SensorLandscape,
            _ => OrientationLock::SensorPortrait,
        }
    }
}

/// Host policy choices baked into lifecycle handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecyclePolicy {
    /// Report the very first focus gain through `App::focus_changed`.
    pub report_initial_focus: bool,
    /// Send the task to the background when a back key release goes unhandled.
    pub background_on_back: bool,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self {
            report_initial_focus: false,
            background_on_back: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShellConfig {
    pub color_format: ColorFormat,
    pub depth_format: DepthFormat,
    pub stencil_format: StencilFormat,
    pub multisample: Multisample,
    pub preferred_api: ApiTier,
    pub swap_behavior: SwapBehavior,
    pub supported_orientations: SupportedOrientations,
    pub chrome: ChromeMode,
    pub multitouch: bool,
    pub policy: LifecyclePolicy,
}

impl ShellConfig {
    pub fn with_color_format(mut self, format: ColorFormat) -> Self {
        self.color_format = format;
        self
    }

    pub fn with_depth_format(mut self, format: DepthFormat) -> Self {
        self.depth_format = format;
        self
    }

    pub fn with_stencil_format(mut self, format: StencilFormat) -> Self {
        self.stencil_format = format;
        self
    }

    pub fn with_multisample(mut self, multisample: Multisample) -> Self {
        self.multisample = multisample;
        self
    }

    pub fn with_preferred_api(mut self, tier: ApiTier) -> Self {
        self.preferred_api = tier;
        self
    }

    pub fn with_swap_behavior(mut self, behavior: SwapBehavior) -> Self {
        self.swap_behavior = behavior;
        self
    }

    pub fn with_supported_orientations(mut self, orientations: SupportedOrientations) -> Self {
        self.supported_orientations = orientations;
        self
    }

    pub fn with_chrome(mut self, chrome: ChromeMode) -> Self {
        self.chrome = chrome;
        self
    }

    pub fn with_multitouch(mut self, enabled: bool) -> Self {
        self.multitouch = enabled;
        self
    }

    pub fn with_policy(mut self, policy: LifecyclePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The initial attribute request handed to config selection.
    pub fn pixel_format_request(&self) -> PixelFormatRequest {
        let (red, green, blue, alpha) = match self.color_format {
            ColorFormat::Rgb565 => (5, 6, 5, 0),
            ColorFormat::Rgba8888 => (8, 8, 8, 8),
        };
        let mut depth = match self.depth_format {
            DepthFormat::None => 0,
            DepthFormat::Depth16 => 16,
            DepthFormat::Depth24 => 24,
        };
        let stencil = match self.stencil_format {
            StencilFormat::None => 0,
            StencilFormat::Stencil8 => 8,
        };
        // Packed depth-stencil formats only pair stencil with 24-bit depth.
        if stencil > 0 && depth > 0 {
            depth = 24;
        }
        let samples = match self.multisample {
            Multisample::None => 0,
            Multisample::X4 => 4,
        };
        PixelFormatRequest {
            red,
            green,
            blue,
            alpha,
            depth,
            stencil,
            samples,
        }
    }
}
