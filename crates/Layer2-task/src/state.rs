//! Task lifecycle state machine

use serde::{Deserialize, Serialize};

/// Lifecycle of one request on a `TaskController`
///
/// `Idle -> Running -> {Completed | Cancelled | Failed}`. A new request
/// starts from any non-running state and moves back to `Running`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskLifecycleState {
    /// No request has been started yet
    #[default]
    Idle,

    /// A worker is computing
    Running,

    /// The result event was applied
    Completed,

    /// The running task was cancelled before producing a result
    Cancelled,

    /// The worker terminated without a result
    Failed,
}

impl TaskLifecycleState {
    /// Check if this is a terminal state for the current request
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskLifecycleState::Completed
                | TaskLifecycleState::Cancelled
                | TaskLifecycleState::Failed
        )
    }

    /// Check if a task is currently running
    pub fn is_running(&self) -> bool {
        matches!(self, TaskLifecycleState::Running)
    }

    /// Check if a new request may be started
    pub fn can_start(&self) -> bool {
        !self.is_running()
    }

    /// Get display name for the state
    pub fn display_name(&self) -> &'static str {
        match self {
            TaskLifecycleState::Idle => "Idle",
            TaskLifecycleState::Running => "Running",
            TaskLifecycleState::Completed => "Completed",
            TaskLifecycleState::Cancelled => "Cancelled",
            TaskLifecycleState::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for TaskLifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
