//! Input event types consumed by the intro core.
//!
//! Hosts feed live events straight into a session; scripted runs read the
//! same events from JSONL, one object per line, ordered by timestamp.

use serde::{Deserialize, Serialize};

use frameintro_common::error::{IntroError, IntroResult};

/// Milliseconds since session mount.
pub type TimestampMs = u64;

/// Classes of global listener the orchestrator registers at mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    PointerMove,
    Scroll,
    KeyDown,
}

impl InputKind {
    /// All listener kinds, in registration order.
    pub const ALL: [InputKind; 3] = [InputKind::PointerMove, InputKind::Scroll, InputKind::KeyDown];
}

/// A single input event with timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    /// Milliseconds since mount.
    #[serde(rename = "t")]
    pub timestamp_ms: TimestampMs,

    /// The event payload.
    #[serde(flatten)]
    pub kind: EventKind,
}

/// Discriminated union of event types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// Pointer position update in CSS pixels.
    PointerMove { x: f64, y: f64 },

    /// Page scroll; `progress` is the scrolled fraction of the document.
    Scroll { progress: f64 },

    /// Key press.
    Key { code: String },

    /// A real activation gesture on the dock anchor.
    Activate,

    /// Viewport size change in CSS pixels.
    Resize { width: f64, height: f64 },
}

impl EventKind {
    /// The listener this event is delivered through, if any.
    ///
    /// Only these events count as activity for the idle watchdog.
    pub fn listener_kind(&self) -> Option<InputKind> {
        match self {
            EventKind::PointerMove { .. } => Some(InputKind::PointerMove),
            EventKind::Scroll { .. } => Some(InputKind::Scroll),
            EventKind::Key { .. } => Some(InputKind::KeyDown),
            EventKind::Activate | EventKind::Resize { .. } => None,
        }
    }
}

impl InputEvent {
    pub fn pointer_move(timestamp_ms: TimestampMs, x: f64, y: f64) -> Self {
        Self {
            timestamp_ms,
            kind: EventKind::PointerMove { x, y },
        }
    }

    pub fn scroll(timestamp_ms: TimestampMs, progress: f64) -> Self {
        Self {
            timestamp_ms,
            kind: EventKind::Scroll { progress },
        }
    }

    pub fn key(timestamp_ms: TimestampMs, code: impl Into<String>) -> Self {
        Self {
            timestamp_ms,
            kind: EventKind::Key { code: code.into() },
        }
    }

    pub fn activate(timestamp_ms: TimestampMs) -> Self {
        Self {
            timestamp_ms,
            kind: EventKind::Activate,
        }
    }

    pub fn resize(timestamp_ms: TimestampMs, width: f64, height: f64) -> Self {
        Self {
            timestamp_ms,
            kind: EventKind::Resize { width, height },
        }
    }
}

/// Parse an input script from JSONL content (one JSON object per line).
///
/// Blank lines and `#` comments are skipped. Timestamps must not go
/// backwards.
pub fn parse_events(jsonl: &str) -> IntroResult<Vec<InputEvent>> {
    let mut events: Vec<InputEvent> = Vec::new();
    for (index, line) in jsonl.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let event: InputEvent = serde_json::from_str(line)
            .map_err(|e| IntroError::script(index + 1, e.to_string()))?;
        if let Some(prev) = events.last() {
            if event.timestamp_ms < prev.timestamp_ms {
                return Err(IntroError::script(
                    index + 1,
                    format!(
                        "timestamp {} ms is earlier than the previous event at {} ms",
                        event.timestamp_ms, prev.timestamp_ms
                    ),
                ));
            }
        }
        events.push(event);
    }
    Ok(events)
}

/// Serialize events to JSONL format.
pub fn serialize_events(events: &[InputEvent]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for event in events {
        output.push_str(&serde_json::to_string(event)?);
        output.push('\n');
    }
    Ok(output)
}
