//! Tether Core
//!
//! Shared geometry, logging and profiling utilities for the Tether app shell.

pub mod geometry;
pub mod logging;
pub mod profiling;
