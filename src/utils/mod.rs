//! Utility functions and helpers for fluxcache.
//!
//! # Submodules
//!
//! - `logging`: Tracing subscriber initialization.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod logging;
