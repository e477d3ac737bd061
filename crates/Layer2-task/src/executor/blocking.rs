//! Blocking executor - runs CPU-bound tasks off the interactive context
//!
//! Features:
//! - One `spawn_blocking` worker per task
//! - Bounded FIFO event channel (progress waits instead of dropping)
//! - Cooperative cancellation through a `CancellationToken`

use crate::executor::TaskHandle;
use crate::task::{Task, TaskContext, TaskId};
use longcalc_foundation::{Error, Result, DEFAULT_CHANNEL_CAPACITY};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Launches tasks on the current tokio runtime's blocking pool
#[derive(Debug, Clone)]
pub struct BlockingExecutor {
    /// Event channel capacity per task
    capacity: usize,
}

impl Default for BlockingExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl BlockingExecutor {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Launch `task` with `input` and return immediately.
    ///
    /// Fails with `Error::Internal` when called outside a tokio runtime.
    pub fn spawn<T: Task>(
        &self,
        task: T,
        input: T::Input,
    ) -> Result<TaskHandle<T::Progress, T::Output>> {
        let runtime = Handle::try_current()
            .map_err(|e| Error::Internal(format!("No tokio runtime available: {}", e)))?;

        let task_id = TaskId::new();
        let (tx, rx) = mpsc::channel(self.capacity);
        let cancel = CancellationToken::new();
        let ctx = TaskContext::new(task_id, tx, cancel.clone());
        let name = task.name();

        info!("Spawning task {}: {}", task_id, name);

        runtime.spawn_blocking(move || {
            debug!("Task {} running on worker thread", task_id);
            let result = task.run(input, &ctx);
            debug!(
                "Task {} returned ({})",
                task_id,
                if result.is_ok() { "ok" } else { "err" }
            );
            ctx.finish(result);
        });

        Ok(TaskHandle::new(task_id, rx, cancel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskEvent;

    /// Emits `0..count` as progress and returns their sum
    struct CountTask;

    impl Task for CountTask {
        type Input = u32;
        type Progress = u32;
        type Output = u32;

        fn name(&self) -> &'static str {
            "count"
        }

        fn run(&self, count: u32, ctx: &TaskContext<u32, u32>) -> Result<u32> {
            let mut sum = 0;
            for i in 0..count {
                if ctx.is_cancelled() {
                    return Err(Error::Cancelled);
                }
                ctx.publish_progress(i)?;
                sum += i;
            }
            Ok(sum)
        }
    }

    #[test]
    fn test_spawn_outside_runtime_fails() {
        let executor = BlockingExecutor::default();
        let err = executor.spawn(CountTask, 3).unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }

    #[tokio::test]
    async fn test_events_arrive_in_order_with_small_channel() {
        let executor = BlockingExecutor::new(1);
        let mut handle = executor.spawn(CountTask, 50).unwrap();

        let mut seen = Vec::new();
        let mut terminal = None;
        while let Some(event) = handle.next_event().await {
            match event {
                TaskEvent::Progress(i) => seen.push(i),
                other => terminal = Some(other),
            }
        }

        assert_eq!(seen, (0..50).collect::<Vec<_>>());
        assert_eq!(terminal, Some(TaskEvent::Completed((0..50).sum())));
    }

    #[tokio::test]
    async fn test_zero_capacity_is_clamped() {
        assert_eq!(BlockingExecutor::new(0).capacity(), 1);
    }

    struct PanicTask;

    impl Task for PanicTask {
        type Input = ();
        type Progress = u32;
        type Output = u32;

        fn name(&self) -> &'static str {
            "panic"
        }

        fn run(&self, _input: (), ctx: &TaskContext<u32, u32>) -> Result<u32> {
            ctx.publish_progress(1)?;
            panic!("worker crashed");
        }
    }

    #[tokio::test]
    async fn test_panicking_worker_closes_channel() {
        let executor = BlockingExecutor::default();
        let mut handle = executor.spawn(PanicTask, ()).unwrap();

        assert_eq!(handle.next_event().await, Some(TaskEvent::Progress(1)));
        assert_eq!(handle.next_event().await, None);
        assert!(handle.is_finished());
        assert_eq!(handle.try_next_event(), None);
    }
}
