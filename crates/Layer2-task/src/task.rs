//! Task definition and types
//!
//! A `Task` is a unit of blocking work parameterised by its input, progress
//! and output types. It runs on a worker thread and talks to its owner only
//! through a `TaskContext`, which forwards progress into a bounded channel.

use longcalc_foundation::{Error, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

/// Unique identifier for a launched task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub Uuid);

impl TaskId {
    /// Generate a new random TaskId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Event delivered from a running task to its owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent<P, O> {
    /// Intermediate progress
    Progress(P),

    /// Final output; nothing follows
    Completed(O),

    /// The task observed cancellation and stopped; nothing follows
    Cancelled,

    /// The task returned an error; nothing follows
    Failed(String),
}

impl<P, O> TaskEvent<P, O> {
    /// Check if no further events follow this one
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskEvent::Progress(_))
    }
}

/// Blocking unit of work run off the interactive context
pub trait Task: Send + Sync + 'static {
    type Input: Send + 'static;
    type Progress: Send + 'static;
    type Output: Send + 'static;

    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Run to completion on the calling (worker) thread.
    ///
    /// Return `Err(Error::Cancelled)` after observing `ctx.is_cancelled()`.
    fn run(
        &self,
        input: Self::Input,
        ctx: &TaskContext<Self::Progress, Self::Output>,
    ) -> Result<Self::Output>;
}

/// Worker-side half of a task's event channel
pub struct TaskContext<P, O> {
    task_id: TaskId,
    tx: mpsc::Sender<TaskEvent<P, O>>,
    cancel: CancellationToken,
}

impl<P, O> TaskContext<P, O> {
    pub(crate) fn new(
        task_id: TaskId,
        tx: mpsc::Sender<TaskEvent<P, O>>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            task_id,
            tx,
            cancel,
        }
    }

    /// True once the owner cancelled or dropped its handle
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled() || self.tx.is_closed()
    }

    /// Send a progress event, waiting while the channel is full.
    ///
    /// Must be called from a blocking thread, never from async code.
    pub fn publish_progress(&self, progress: P) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        self.tx
            .blocking_send(TaskEvent::Progress(progress))
            .map_err(|_| Error::Cancelled)
    }

    /// Send the terminal event for `result`
    pub(crate) fn finish(self, result: Result<O>) {
        let event = match result {
            Ok(output) => TaskEvent::Completed(output),
            Err(Error::Cancelled) => TaskEvent::Cancelled,
            Err(e) => TaskEvent::Failed(e.to_string()),
        };

        if self.tx.blocking_send(event).is_err() {
            debug!("Task {} finished after its receiver was dropped", self.task_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_id_display_is_short() {
        let id = TaskId::new();
        assert_eq!(id.to_string().len(), 8);
        assert_ne!(id, TaskId::new());
    }

    #[test]
    fn test_terminal_events() {
        assert!(!TaskEvent::<u8, u64>::Progress(1).is_terminal());
        assert!(TaskEvent::<u8, u64>::Completed(1).is_terminal());
        assert!(TaskEvent::<u8, u64>::Cancelled.is_terminal());
        assert!(TaskEvent::<u8, u64>::Failed("x".into()).is_terminal());
    }

    #[test]
    fn test_publish_after_cancel_fails() {
        let (tx, mut rx) = mpsc::channel::<TaskEvent<u8, u64>>(4);
        let cancel = CancellationToken::new();
        let ctx = TaskContext::new(TaskId::new(), tx, cancel.clone());

        ctx.publish_progress(1).unwrap();
        cancel.cancel();
        assert!(ctx.is_cancelled());
        assert!(matches!(ctx.publish_progress(2), Err(Error::Cancelled)));

        assert_eq!(rx.try_recv().unwrap(), TaskEvent::Progress(1));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_finish_maps_result_to_terminal_event() {
        let (tx, mut rx) = mpsc::channel::<TaskEvent<u8, u64>>(4);
        let ctx = TaskContext::new(TaskId::new(), tx.clone(), CancellationToken::new());
        ctx.finish(Ok(8));
        assert_eq!(rx.try_recv().unwrap(), TaskEvent::Completed(8));

        let ctx = TaskContext::new(TaskId::new(), tx.clone(), CancellationToken::new());
        ctx.finish(Err(Error::Cancelled));
        assert_eq!(rx.try_recv().unwrap(), TaskEvent::Cancelled);

        let ctx = TaskContext::new(TaskId::new(), tx, CancellationToken::new());
        ctx.finish(Err(Error::Task("boom".into())));
        assert_eq!(
            rx.try_recv().unwrap(),
            TaskEvent::Failed("Task failed: boom".into())
        );
    }
}
