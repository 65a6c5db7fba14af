//! Notifications from the canvas to the application shell.

use serde::{Deserialize, Serialize};

/// Display time of most status messages.
pub const STATUS_DURATION_MS: u32 = 5000;
/// Display time of the partial copy failure message.
pub const SHORT_STATUS_DURATION_MS: u32 = 1000;

/// Outbound event, drained by the shell after each call into the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CanvasEvent {
    /// A mutation was committed. Carries the number of items on the board.
    ContentChanged { item_count: usize },
    /// Transient status-bar text.
    Status { text: String, duration_ms: u32 },
    /// A user error that should be shown as a blocking warning.
    Warning(String),
    /// Calibration collected all samples. The mean should be persisted.
    CalibrationFinished { mean: f64 },
}

impl CanvasEvent {
    pub fn status(text: impl Into<String>, duration_ms: u32) -> Self {
        CanvasEvent::Status {
            text: text.into(),
            duration_ms,
        }
    }
}
