//! frameintro model
//!
//! Defines the data contracts shared by the timing core and its host:
//! - **Events:** Timestamped input events (pointer, scroll, key, activation)
//! - **Viewport:** Pointer coordinates and the derived RGB meter levels
//! - **State:** Shutter phases and the orchestration snapshot
//!
//! Pointer coordinates are CSS pixels relative to the viewport's top-left.

pub mod event;
pub mod state;
pub mod viewport;

pub use event::*;
pub use state::*;
pub use viewport::*;
