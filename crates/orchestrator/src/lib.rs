//! frameintro orchestrator
//!
//! Sequences the first-visit intro and tracks idleness afterwards:
//! - **Timers:** A cancellable timer table evaluated against one clock
//! - **Listeners:** Paired registration/removal of global input listeners
//! - **Idle watchdog:** Re-armed countdown over qualifying input
//! - **Orchestrator:** The intro state machine and its timer table
//! - **Timecode:** The HUD's wall-clock and frame-counter intervals
//! - **Session:** The host lifecycle tying the driver and orchestrator together
//!
//! Everything runs on the caller's thread. The host pumps time in with
//! [`IntroSession::tick`] and events with [`IntroSession::dispatch`].

pub mod idle;
pub mod listeners;
pub mod orchestrator;
pub mod session;
pub mod timecode;
pub mod timers;

pub use idle::IdleWatchdog;
pub use listeners::{ListenerId, ListenerRegistry};
pub use orchestrator::{Cue, PhaseOrchestrator};
pub use session::{IntroSession, SessionSnapshot, TickReport};
pub use timecode::{Timecode, TimecodeTicker};
pub use timers::{TimerId, TimerQueue};
