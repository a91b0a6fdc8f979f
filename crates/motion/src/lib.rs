//! frameintro motion
//!
//! Time-to-value curves for the intro:
//! - **Shutter:** Two-phase eased drive angle and its per-frame driver
//! - **Sinks:** Write targets that bypass the host's reactive updates
//! - **Pointer path:** The simulated pointer's walk to the dock anchor
//! - **Pulse:** The activation acknowledgement scale motion
//!
//! The curves are pure functions of elapsed time. Only the driver holds
//! state, and it measures time from a captured start timestamp so the
//! run length does not depend on the frame rate.

pub mod ease;
pub mod pointer_path;
pub mod pulse;
pub mod shutter;
pub mod sink;

pub use ease::Ease;
pub use pointer_path::PointerPath;
pub use pulse::AckPulse;
pub use shutter::{FrameEasingDriver, FrameStatus};
pub use sink::DriveSink;
