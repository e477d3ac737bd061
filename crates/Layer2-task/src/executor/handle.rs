//! Owner-side handle of a spawned task

use crate::task::{TaskEvent, TaskId};
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Handle to a task running on the blocking pool
///
/// Events come out in the order the worker sent them. After a terminal
/// event (or a closed channel) `next_event` keeps returning `None`.
/// Dropping the handle cancels the task.
pub struct TaskHandle<P, O> {
    id: TaskId,
    rx: mpsc::Receiver<TaskEvent<P, O>>,
    cancel: CancellationToken,
    started_at: DateTime<Utc>,
    finished: bool,
}

impl<P, O> TaskHandle<P, O> {
    pub(crate) fn new(
        id: TaskId,
        rx: mpsc::Receiver<TaskEvent<P, O>>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            id,
            rx,
            cancel,
            started_at: Utc::now(),
            finished: false,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// True once a terminal event was received or the channel closed
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Wait for the next event
    pub async fn next_event(&mut self) -> Option<TaskEvent<P, O>> {
        if self.finished {
            return None;
        }
        let event = self.rx.recv().await;
        self.observe(event)
    }

    /// Take the next event if one is already queued
    pub fn try_next_event(&mut self) -> Option<TaskEvent<P, O>> {
        if self.finished {
            return None;
        }
        match self.rx.try_recv() {
            Ok(event) => self.observe(Some(event)),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => self.observe(None),
        }
    }

    fn observe(&mut self, event: Option<TaskEvent<P, O>>) -> Option<TaskEvent<P, O>> {
        match &event {
            Some(e) if e.is_terminal() => self.finished = true,
            None => self.finished = true,
            _ => {}
        }
        event
    }

    /// Request cancellation; the worker stops at its next check
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl<P, O> Drop for TaskHandle<P, O> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl<P, O> std::fmt::Debug for TaskHandle<P, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.id)
            .field("started_at", &self.started_at)
            .field("finished", &self.finished)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}
