use crate::platform::{GraphicsStatus, PixelFormatRequest};

/// Errors raised while bringing up or repairing the rendering surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The display connection could not be opened.
    DisplayUnavailable,

    /// No pixel format matched, even after relaxing samples and depth.
    ConfigurationExhausted { requested: PixelFormatRequest },

    /// No native window is attached.
    NoWindow,

    /// The backend refused to create a window surface.
    SurfaceCreationFailed,

    /// Every API tier down to the baseline failed.
    ContextCreationFailed,

    /// The context could not be bound to the surface.
    BindFailed(GraphicsStatus),
}

impl SurfaceError {
    /// Backend status captured when the error was raised, if any.
    pub fn status(&self) -> Option<GraphicsStatus> {
        match self {
            SurfaceError::BindFailed(status) => Some(*status),
            _ => None,
        }
    }
}

impl std::fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceError::DisplayUnavailable => write!(f, "Display connection unavailable"),
            SurfaceError::ConfigurationExhausted { requested } => write!(
                f,
                "No pixel format matched r{}g{}b{}a{} depth {} stencil {} samples {} or any relaxation of it",
                requested.red,
                requested.green,
                requested.blue,
                requested.alpha,
                requested.depth,
                requested.stencil,
                requested.samples
            ),
            SurfaceError::NoWindow => write!(f, "No native window attached"),
            SurfaceError::SurfaceCreationFailed => write!(f, "Window surface creation failed"),
            SurfaceError::ContextCreationFailed => {
                write!(f, "Context creation failed for every API tier")
            }
            SurfaceError::BindFailed(status) => {
                write!(f, "Failed to make context current: {:?}", status)
            }
        }
    }
}

impl std::error::Error for SurfaceError {}

/// Result type for surface operations.
pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Errors returned by a [`RuntimeBridge`](crate::platform::RuntimeBridge) call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// The runtime does not offer this call (old OS version, detached thread).
    Unavailable(&'static str),

    /// The call was made but raised an error on the runtime side.
    CallFailed { call: &'static str, reason: String },
}

impl std::fmt::Display for BridgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BridgeError::Unavailable(call) => write!(f, "Runtime call unavailable: {}", call),
            BridgeError::CallFailed { call, reason } => {
                write!(f, "Runtime call {} failed: {}", call, reason)
            }
        }
    }
}

impl std::error::Error for BridgeError {}
