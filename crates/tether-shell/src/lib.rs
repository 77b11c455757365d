//! Tether Shell - app-shell lifecycle and rendering-surface controller for
//! native mobile windows.
//!
//! The shell runs on a dedicated render thread. The OS event thread posts
//! lifecycle commands and input through a [`CommandSender`]; the [`Shell`]
//! consumes them, keeps a graphics context bound to the current window, and
//! calls back into the embedder's [`App`].
//!
//! # Example
//!
//! ```no_run
//! use tether_shell::{App, Platform, Shell, ShellConfig, ShellCtx, channel};
//!
//! struct Clear;
//!
//! impl App for Clear {
//!     fn render(&mut self, ctx: &mut ShellCtx) {
//!         // issue draw calls, then present
//!         ctx.swap_buffers();
//!     }
//! }
//!
//! fn render_thread(platform: Platform) {
//!     let (sender, receiver) = channel();
//!     // hand `sender` to the OS event thread
//!     std::thread::spawn(move || drop(sender));
//!     let mut shell = Shell::new(Clear, ShellConfig::default(), platform, receiver);
//!     shell.run();
//! }
//! ```

pub mod app;
pub mod channel;
pub mod chrome;
pub mod command;
pub mod config;
pub mod error;
pub mod input;
pub mod lifecycle;
pub mod pacing;
pub mod platform;
pub mod sensor;
pub mod shell;
pub mod surface;
pub mod time;

pub use app::{App, ShellCtx};
pub use channel::{CommandReceiver, CommandSender, HostMessage, channel};
pub use chrome::{KeyboardState, Orientation};
pub use command::Command;
pub use config::{
    ApiTier, ChromeMode, ColorFormat, DepthFormat, LifecyclePolicy, Multisample, ShellConfig,
    StencilFormat, SupportedOrientations, SwapBehavior,
};
pub use error::{BridgeError, SurfaceError, SurfaceResult};
pub use input::{Key, KeyAction, Modifiers, RawKeyEvent, RawMotionEvent, RawPointer, TouchPhase};
pub use lifecycle::LifecycleState;
pub use platform::{
    Clock, GraphicsBackend, GraphicsStatus, Platform, RuntimeBridge, SensorService, SystemClock,
    WindowProvider,
};
pub use sensor::{SensorEvent, SensorKind, SensorValue};
pub use shell::{ExitReason, Shell};
pub use time::FrameTime;
