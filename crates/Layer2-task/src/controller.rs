//! Task Controller - runs one cube computation at a time for a display
//!
//! Features:
//! - Re-entrancy guard: a second start while running is rejected
//! - Trigger identity check for unexpected callers
//! - Event relay from the worker to the `DisplaySurface`, in order
//! - Cancellation that drops the stale task's event stream

use crate::executor::{BlockingExecutor, TaskHandle};
use crate::state::TaskLifecycleState;
use crate::task::{TaskEvent, TaskId};
use crate::worker::{ComputationRequest, CubeResult, CubeTask, ProgressEvent, ProgressPolicy};
use chrono::{DateTime, Utc};
use longcalc_foundation::strings::{MSG_CANCELLED, MSG_INTERNAL_ERROR};
use longcalc_foundation::{CalcConfig, DisplaySurface, Error, ProgressMode, Result};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Identity of the trigger control a controller is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TriggerId(Uuid);

impl TriggerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TriggerId {
    fn default() -> Self {
        Self::new()
    }
}

/// What `next_event` applied to the display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    Progress(ProgressEvent),
    Completed(CubeResult),
    Cancelled,
    Failed(String),
}

impl ControllerEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ControllerEvent::Progress(_))
    }
}

/// Summary of the most recent request
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub task_id: TaskId,
    pub n: u64,
    pub state: TaskLifecycleState,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub result: Option<CubeResult>,
}

/// Owns the display surface and at most one running cube task
///
/// All display mutation happens through `&mut self`, i.e. on whatever
/// context drives the controller. The worker only sends events.
pub struct TaskController<D: DisplaySurface> {
    display: D,
    trigger: TriggerId,
    trigger_enabled: bool,
    state: TaskLifecycleState,
    policy: ProgressPolicy,
    executor: BlockingExecutor,
    active: Option<TaskHandle<ProgressEvent, CubeResult>>,
    last_run: Option<RunSummary>,
}

impl<D: DisplaySurface> TaskController<D> {
    /// Create a controller bound to a fresh trigger
    pub fn new(display: D, config: &CalcConfig) -> Self {
        Self::with_trigger(display, config, TriggerId::new())
    }

    /// Create a controller bound to `trigger`
    pub fn with_trigger(display: D, config: &CalcConfig, trigger: TriggerId) -> Self {
        Self {
            display,
            trigger,
            trigger_enabled: true,
            state: TaskLifecycleState::Idle,
            policy: ProgressPolicy::from_config(config),
            executor: BlockingExecutor::new(config.channel_capacity()),
            active: None,
            last_run: None,
        }
    }

    pub fn trigger(&self) -> TriggerId {
        self.trigger
    }

    pub fn is_trigger_enabled(&self) -> bool {
        self.trigger_enabled
    }

    pub fn state(&self) -> TaskLifecycleState {
        self.state
    }

    /// Id of the running task, if any
    pub fn active_task(&self) -> Option<TaskId> {
        self.active.as_ref().map(|h| h.id())
    }

    pub fn last_run(&self) -> Option<&RunSummary> {
        self.last_run.as_ref()
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    // ========================================================================
    // Start
    // ========================================================================

    /// Launch a computation for `n` fired by `source`.
    ///
    /// Returns as soon as the worker is spawned. Events are applied by
    /// `next_event` / `run_to_completion`.
    pub fn start(&mut self, source: &TriggerId, n: u64) -> Result<TaskId> {
        if *source != self.trigger {
            error!("Start requested by unexpected trigger {:?}", source);
            self.display.on_error(MSG_INTERNAL_ERROR);
            return Err(Error::InternalInvariant(
                "start invoked from a foreign trigger".to_string(),
            ));
        }

        if !self.state.can_start() {
            let running = self
                .active_task()
                .map(|id| id.to_string())
                .unwrap_or_default();
            warn!("Start for n={} ignored: task {} still running", n, running);
            return Err(Error::TaskAlreadyRunning(running));
        }

        let request = ComputationRequest::new(n)?;
        debug!(
            "Expected result for n={}: {}",
            n,
            request.expected_result()
        );

        let handle = match self
            .executor
            .spawn(CubeTask::new(self.policy.clone()), request)
        {
            Ok(handle) => handle,
            Err(e) => {
                error!("Failed to spawn worker: {}", e);
                self.display.on_error(MSG_INTERNAL_ERROR);
                return Err(e);
            }
        };
        let task_id = handle.id();

        if self.policy.mode == ProgressMode::Percent {
            self.display.on_progress_percent(0);
        }
        self.set_trigger_enabled(false);
        self.state = TaskLifecycleState::Running;
        self.last_run = Some(RunSummary {
            task_id,
            n,
            state: TaskLifecycleState::Running,
            started_at: handle.started_at(),
            finished_at: None,
            result: None,
        });
        self.active = Some(handle);

        info!("Task {} started for n={}", task_id, n);
        Ok(task_id)
    }

    // ========================================================================
    // Event pump
    // ========================================================================

    /// Wait for the next event of the running task and apply it.
    ///
    /// Returns `None` when no task is running.
    pub async fn next_event(&mut self) -> Option<ControllerEvent> {
        let handle = self.active.as_mut()?;
        let event = handle.next_event().await;
        Some(self.apply(event))
    }

    /// Apply an already-queued event without waiting
    pub fn try_next_event(&mut self) -> Option<ControllerEvent> {
        let handle = self.active.as_mut()?;
        let event = handle.try_next_event();
        let finished = handle.is_finished();
        match event {
            Some(event) => Some(self.apply(Some(event))),
            None if finished => Some(self.apply(None)),
            None => None,
        }
    }

    /// Apply events until the running task terminates
    pub async fn run_to_completion(&mut self) -> Option<CubeResult> {
        while let Some(event) = self.next_event().await {
            match event {
                ControllerEvent::Completed(result) => return Some(result),
                ControllerEvent::Progress(_) => continue,
                ControllerEvent::Cancelled | ControllerEvent::Failed(_) => return None,
            }
        }
        None
    }

    fn apply(&mut self, event: Option<TaskEvent<ProgressEvent, CubeResult>>) -> ControllerEvent {
        match event {
            Some(TaskEvent::Progress(progress)) => {
                match &progress {
                    ProgressEvent::Percent(percent) => self.display.on_progress_percent(*percent),
                    ProgressEvent::Message(text) => self.display.on_progress_message(text),
                }
                ControllerEvent::Progress(progress)
            }
            Some(TaskEvent::Completed(result)) => {
                if self.policy.mode == ProgressMode::Percent {
                    self.display.on_progress_percent(100);
                }
                self.display.on_result(&result.to_string());
                self.finish(TaskLifecycleState::Completed, Some(result));
                info!(
                    "Task completed: result={} elapsed={}s",
                    result.result_value, result.elapsed_seconds
                );
                ControllerEvent::Completed(result)
            }
            Some(TaskEvent::Cancelled) => {
                self.display.on_progress_message(MSG_CANCELLED);
                self.finish(TaskLifecycleState::Cancelled, None);
                ControllerEvent::Cancelled
            }
            Some(TaskEvent::Failed(message)) => {
                error!("Task failed: {}", message);
                self.display.on_error(MSG_INTERNAL_ERROR);
                self.finish(TaskLifecycleState::Failed, None);
                ControllerEvent::Failed(message)
            }
            None => {
                let message = "worker exited without a result".to_string();
                error!("Task failed: {}", message);
                self.display.on_error(MSG_INTERNAL_ERROR);
                self.finish(TaskLifecycleState::Failed, None);
                ControllerEvent::Failed(message)
            }
        }
    }

    // ========================================================================
    // Cancel
    // ========================================================================

    /// Cancel the running task. Returns false when nothing was running.
    ///
    /// The task's receiver is dropped here, so none of its queued events
    /// reach the display afterwards.
    pub fn cancel(&mut self) -> bool {
        let Some(handle) = self.active.as_ref() else {
            return false;
        };
        info!("Cancelling task {}", handle.id());
        handle.cancel();
        self.display.on_progress_message(MSG_CANCELLED);
        self.finish(TaskLifecycleState::Cancelled, None);
        true
    }

    fn finish(&mut self, state: TaskLifecycleState, result: Option<CubeResult>) {
        self.active = None;
        self.state = state;
        if let Some(run) = self.last_run.as_mut() {
            run.state = state;
            run.finished_at = Some(Utc::now());
            run.result = result;
        }
        self.set_trigger_enabled(true);
    }

    fn set_trigger_enabled(&mut self, enabled: bool) {
        self.trigger_enabled = enabled;
        self.display.set_trigger_enabled(enabled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::task::{Task, TaskContext};
    use std::time::Duration;

    /// Stand-in worker that fails without producing a result
    enum BrokenTask {
        Fails,
        Panics,
    }

    impl Task for BrokenTask {
        type Input = ComputationRequest;
        type Progress = ProgressEvent;
        type Output = CubeResult;

        fn name(&self) -> &'static str {
            "broken"
        }

        fn run(
            &self,
            _request: ComputationRequest,
            _ctx: &TaskContext<ProgressEvent, CubeResult>,
        ) -> Result<CubeResult> {
            match self {
                BrokenTask::Fails => Err(Error::Task("overflow".to_string())),
                BrokenTask::Panics => panic!("worker crashed"),
            }
        }
    }

    /// Put `task` in place of a started cube computation
    fn start_broken(controller: &mut TaskController<NullDisplay>, task: BrokenTask) {
        let request = ComputationRequest::new(3).unwrap();
        let handle = controller.executor.spawn(task, request).unwrap();
        controller.set_trigger_enabled(false);
        controller.state = TaskLifecycleState::Running;
        controller.active = Some(handle);
    }

    #[derive(Default)]
    struct NullDisplay {
        trigger: Option<bool>,
        errors: usize,
    }

    impl DisplaySurface for NullDisplay {
        fn on_progress_percent(&mut self, _percent: u8) {}
        fn on_progress_message(&mut self, _text: &str) {}
        fn on_result(&mut self, _text: &str) {}
        fn set_trigger_enabled(&mut self, enabled: bool) {
            self.trigger = Some(enabled);
        }
        fn on_error(&mut self, _text: &str) {
            self.errors += 1;
        }
    }

    #[tokio::test]
    async fn test_controller_creation() {
        let controller = TaskController::new(NullDisplay::default(), &CalcConfig::default());
        assert_eq!(controller.state(), TaskLifecycleState::Idle);
        assert!(controller.is_trigger_enabled());
        assert!(controller.active_task().is_none());
    }

    #[tokio::test]
    async fn test_next_event_without_task() {
        let mut controller = TaskController::new(NullDisplay::default(), &CalcConfig::default());
        assert!(controller.next_event().await.is_none());
        assert!(controller.try_next_event().is_none());
        assert!(!controller.cancel());
    }

    #[tokio::test]
    async fn test_invalid_input_has_no_effect() {
        let mut controller = TaskController::new(NullDisplay::default(), &CalcConfig::default());
        let trigger = controller.trigger();

        let err = controller
            .start(&trigger, crate::worker::MAX_INPUT + 1)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(controller.state(), TaskLifecycleState::Idle);
        assert!(controller.display().trigger.is_none());
    }

    #[tokio::test]
    async fn test_last_run_summary() {
        let mut controller = TaskController::new(NullDisplay::default(), &CalcConfig::default());
        let trigger = controller.trigger();

        let task_id = controller.start(&trigger, 4).unwrap();
        let result = controller.run_to_completion().await.unwrap();

        let run = controller.last_run().unwrap();
        assert_eq!(run.task_id, task_id);
        assert_eq!(run.n, 4);
        assert_eq!(run.state, TaskLifecycleState::Completed);
        assert_eq!(run.result, Some(result));
        assert!(run.finished_at.unwrap() >= run.started_at);
        assert_eq!(controller.display().errors, 0);
    }

    #[tokio::test]
    async fn test_failed_task_reports_internal_error() {
        let mut controller = TaskController::new(NullDisplay::default(), &CalcConfig::default());
        start_broken(&mut controller, BrokenTask::Fails);
        assert_eq!(controller.display().trigger, Some(false));

        let event = controller.next_event().await;
        assert!(matches!(event, Some(ControllerEvent::Failed(ref m)) if m.contains("overflow")));
        assert_eq!(controller.state(), TaskLifecycleState::Failed);
        assert_eq!(controller.display().errors, 1);
        assert_eq!(controller.display().trigger, Some(true));
        assert!(controller.active_task().is_none());
        assert!(controller.next_event().await.is_none());
    }

    #[tokio::test]
    async fn test_worker_exit_without_result_is_failure() {
        let mut controller = TaskController::new(NullDisplay::default(), &CalcConfig::default());
        start_broken(&mut controller, BrokenTask::Panics);

        // The panic drops the sender; polling sees the closed channel
        let mut event = None;
        for _ in 0..1_000 {
            event = controller.try_next_event();
            if event.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        assert!(matches!(event, Some(ControllerEvent::Failed(_))));
        assert_eq!(controller.state(), TaskLifecycleState::Failed);
        assert_eq!(controller.display().errors, 1);
        assert_eq!(controller.display().trigger, Some(true));

        // The controller accepts a new request afterwards
        let trigger = controller.trigger();
        controller.start(&trigger, 2).unwrap();
        let result = controller.run_to_completion().await.unwrap();
        assert_eq!(result.result_value, 8);
    }
}
