//! Extraction-task state.
//!
//! Area vegetation-index retrieval is an asynchronous workflow: a task is
//! submitted, polled to completion, and its result bundle downloaded. The
//! types here model the polled state; the transitions are driven solely by
//! the provider's status endpoint.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Task Status
// ============================================================================

/// Status of an asynchronous extraction task.
///
/// `Done` and `Error` are terminal. A task that never leaves `Processing`
/// within the poll budget is treated as failed by the poll driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Accepted by the provider, not yet picked up.
    Submitted,
    /// Being processed upstream.
    Processing,
    /// Finished successfully; the result bundle is downloadable.
    Done,
    /// Failed upstream.
    Error,
}

impl TaskStatus {
    /// Returns true if the task has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }

    /// Returns the display name for this status.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Processing => "processing",
            Self::Done => "done",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Task Snapshot
// ============================================================================

/// The polled state of one extraction task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSnapshot {
    /// Provider-assigned task identifier.
    pub task_id: String,
    /// Current status.
    pub status: TaskStatus,
    /// Progress percentage when the provider reports one.
    pub progress_percent: Option<f64>,
}

impl TaskSnapshot {
    /// Creates a snapshot.
    pub fn new(task_id: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            task_id: task_id.into(),
            status,
            progress_percent: None,
        }
    }

    /// Attaches a progress percentage.
    pub fn with_progress(mut self, percent: f64) -> Self {
        self.progress_percent = Some(percent);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
