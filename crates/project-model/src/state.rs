//! Snapshots of the two timing state machines.
//!
//! These are read-only views handed to the rendering collaborator; the
//! driver and orchestrator are the only writers of the state behind them.

use serde::{Deserialize, Serialize};

/// Phase of the shutter easing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationPhase {
    /// Blades closing from the target angle to zero.
    RunningDown,
    /// Blades reopening from zero back to the target.
    RunningUp,
    /// Target reached and held.
    Settled,
}

/// One evaluated point of the drive curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriveFrame {
    pub phase: AnimationPhase,
    pub elapsed_ms: f64,
    pub drive_angle_deg: f64,
}

/// Idle classification from recent input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdleState {
    #[default]
    Active,
    Idle,
}

/// Flags owned by the orchestrator.
///
/// Several timers race, so this is a record of independent flags rather
/// than a single linear state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestrationState {
    /// True until the loader-dismiss timer fires.
    pub loader_visible: bool,
    /// Set once the micro-motion delay elapses; never reset.
    pub intro_started: bool,
    /// Set once app assets are ready; gates the dock anchor.
    pub assets_ready: bool,
    /// Set by the first real or simulated activation; never reset.
    pub activation_consumed: bool,
    /// Set when the activation acknowledgement ends, cleared by the
    /// pre-entry collapse.
    pub content_expanded: bool,
    /// Terminal; once set the expansion timers are not re-armed.
    pub has_entered_content: bool,
    pub idle: IdleState,
}

impl Default for OrchestrationState {
    fn default() -> Self {
        Self {
            loader_visible: true,
            intro_started: false,
            assets_ready: false,
            activation_consumed: false,
            content_expanded: false,
            has_entered_content: false,
            idle: IdleState::Active,
        }
    }
}

impl OrchestrationState {
    /// Whether the dock anchor should be shown.
    pub fn dock_visible(&self) -> bool {
        self.assets_ready && !self.has_entered_content
    }

    pub fn is_idle(&self) -> bool {
        self.idle == IdleState::Idle
    }
}
