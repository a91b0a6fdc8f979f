//! frameintro common utilities
//!
//! Shared infrastructure for all frameintro crates:
//! - Error types and result aliases
//! - Clock abstractions (monotonic and manually driven) and frame pacing
//! - Tracing/logging initialization
//! - Configuration loading and the intro timing tables

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
