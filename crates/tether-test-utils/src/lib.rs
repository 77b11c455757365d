//! Test utilities for Tether shells.
//!
//! This crate provides recording stand-ins for every platform collaborator a
//! [`Shell`](tether_shell::Shell) drives, plus an embedder that logs its
//! callbacks.
//!
//! # Overview
//!
//! - [`RecordingApp`] / [`AppLog`] - an `App` that records every callback
//! - `MockPlatform` - graphics, window, bridge, sensors and clock mocks (requires `mock` feature)
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "mock")]
//! # {
//! use tether_shell::{Command, Shell, ShellConfig, channel};
//! use tether_test_utils::{AppEvent, MockPlatform, RecordingApp};
//!
//! let mocks = MockPlatform::new();
//! let (app, log) = RecordingApp::new();
//! let (sender, receiver) = channel();
//! let mut shell = Shell::new(app, ShellConfig::default(), mocks.platform(), receiver);
//!
//! sender.post(Command::InitWindow);
//! shell.pump();
//!
//! assert_eq!(log.events()[0], AppEvent::Start);
//! assert!(log.events().contains(&AppEvent::Render));
//! # }
//! ```
//!
//! # Design
//!
//! Mocks are cheap handles over shared state (`Arc<Mutex<_>>`): hand one
//! clone to the shell inside a [`Platform`](tether_shell::Platform) and keep
//! another to script failures and inspect recorded calls.

#[cfg(feature = "mock")]
pub mod mock_graphics;
#[cfg(feature = "mock")]
pub mod mock_platform;
pub mod recording_app;

#[cfg(feature = "mock")]
pub use mock_graphics::*;
#[cfg(feature = "mock")]
pub use mock_platform::*;
pub use recording_app::*;
