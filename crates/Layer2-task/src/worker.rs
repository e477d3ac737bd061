//! Cube worker - the long-running computation
//!
//! Computes `n³` by counting through three nested loops `1..=n`. The loop
//! is deliberately O(n³); the accumulator goes through `black_box` so the
//! optimizer cannot fold it into a multiplication.
//!
//! Progress cadence (defaults from `CalcConfig`):
//! - `n < threshold`: no progress, optionally one startup message
//! - `n >= threshold`: startup message, then one event on every outer
//!   index `i` with `i % step == step - 1`, carrying `floor(i * 100 / n)`

use crate::task::{Task, TaskContext};
use longcalc_foundation::strings::{
    progress_message, result_text, MSG_STARTED, MSG_STARTED_NO_PROGRESS,
};
use longcalc_foundation::{CalcConfig, Error, ProgressMode, Result};
use serde::{Deserialize, Serialize};
use std::hint::black_box;
use std::time::Instant;
use tracing::debug;

/// Largest `n` whose cube fits in `u64`
pub const MAX_INPUT: u64 = 2_642_245;

// ============================================================================
// Request / Events
// ============================================================================

/// Validated input for one computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputationRequest {
    n: u64,
}

impl ComputationRequest {
    pub fn new(n: u64) -> Result<Self> {
        if n > MAX_INPUT {
            return Err(Error::InvalidInput(format!(
                "n = {} exceeds maximum {}",
                n, MAX_INPUT
            )));
        }
        Ok(Self { n })
    }

    pub fn n(&self) -> u64 {
        self.n
    }

    /// The value the computation must arrive at
    pub fn expected_result(&self) -> u64 {
        self.n * self.n * self.n
    }
}

/// Intermediate notification from the worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressEvent {
    /// Percent of outer iterations done (0..=100)
    Percent(u8),
    /// Free text
    Message(String),
}

/// Terminal output of one computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CubeResult {
    /// Accumulated count, equal to n³
    pub result_value: u64,
    /// Loop runtime in whole seconds (truncated)
    pub elapsed_seconds: u64,
}

impl std::fmt::Display for CubeResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&result_text(self.result_value, self.elapsed_seconds))
    }
}

// ============================================================================
// Progress Policy
// ============================================================================

/// When and in which shape progress is reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressPolicy {
    pub mode: ProgressMode,
    pub threshold: u64,
    pub step: u64,
    pub emit_startup_notification_when_disabled: bool,
}

impl Default for ProgressPolicy {
    fn default() -> Self {
        Self::from_config(&CalcConfig::default())
    }
}

impl ProgressPolicy {
    pub fn from_config(config: &CalcConfig) -> Self {
        Self {
            mode: config.progress_mode(),
            threshold: config.progress_threshold(),
            step: config.progress_step(),
            emit_startup_notification_when_disabled: config
                .emit_startup_notification_when_disabled(),
        }
    }

    /// Progress is reported only for `n >= threshold`
    pub fn is_enabled_for(&self, n: u64) -> bool {
        n >= self.threshold
    }

    /// Whether outer index `i` (1-based) emits a progress event
    pub fn is_report_step(&self, i: u64) -> bool {
        let step = self.step.max(1);
        i % step == step - 1
    }

    /// Startup notification for `n`, if any
    pub fn startup_event(&self, n: u64) -> Option<ProgressEvent> {
        if self.is_enabled_for(n) {
            Some(ProgressEvent::Message(MSG_STARTED.to_string()))
        } else if self.emit_startup_notification_when_disabled {
            Some(ProgressEvent::Message(MSG_STARTED_NO_PROGRESS.to_string()))
        } else {
            None
        }
    }

    /// Wrap a percent value in the configured payload shape
    pub fn progress_event(&self, percent: u8) -> ProgressEvent {
        match self.mode {
            ProgressMode::Percent => ProgressEvent::Percent(percent),
            ProgressMode::Message => ProgressEvent::Message(progress_message(percent)),
        }
    }
}

/// `floor(i * 100 / n)`, clamped to 100
pub fn percent_for(i: u64, n: u64) -> u8 {
    if n == 0 {
        return 100;
    }
    let percent = (u128::from(i) * 100) / u128::from(n);
    percent.min(100) as u8
}

// ============================================================================
// Cube Task
// ============================================================================

/// The worker: counts to n³ and reports progress per `ProgressPolicy`
#[derive(Debug, Clone, Default)]
pub struct CubeTask {
    policy: ProgressPolicy,
}

impl CubeTask {
    pub fn new(policy: ProgressPolicy) -> Self {
        Self { policy }
    }

    /// Run the computation on the calling thread.
    ///
    /// `on_progress` receives every event in emission order; an error from
    /// it aborts the run. `is_cancelled` is polled once per outer iteration.
    pub fn compute<F, C>(
        &self,
        request: ComputationRequest,
        mut on_progress: F,
        is_cancelled: C,
    ) -> Result<CubeResult>
    where
        F: FnMut(ProgressEvent) -> Result<()>,
        C: Fn() -> bool,
    {
        let n = request.n();
        let with_progress = self.policy.is_enabled_for(n);

        if let Some(event) = self.policy.startup_event(n) {
            on_progress(event)?;
        }

        let start = Instant::now();
        let mut sum: u64 = 0;

        for i1 in 1..=n {
            if is_cancelled() {
                debug!("Computation for n={} cancelled at i={}", n, i1);
                return Err(Error::Cancelled);
            }

            for _i2 in 1..=n {
                for _i3 in 1..=n {
                    sum = black_box(sum) + 1;
                }
            }

            if with_progress && self.policy.is_report_step(i1) {
                on_progress(self.policy.progress_event(percent_for(i1, n)))?;
            }
        }

        let elapsed_seconds = start.elapsed().as_secs();

        Ok(CubeResult {
            result_value: sum,
            elapsed_seconds,
        })
    }
}

impl Task for CubeTask {
    type Input = ComputationRequest;
    type Progress = ProgressEvent;
    type Output = CubeResult;

    fn name(&self) -> &'static str {
        "cube"
    }

    fn run(
        &self,
        request: ComputationRequest,
        ctx: &TaskContext<ProgressEvent, CubeResult>,
    ) -> Result<CubeResult> {
        self.compute(
            request,
            |event| ctx.publish_progress(event),
            || ctx.is_cancelled(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(task: &CubeTask, n: u64) -> (Vec<ProgressEvent>, CubeResult) {
        let mut events = Vec::new();
        let result = task
            .compute(
                ComputationRequest::new(n).unwrap(),
                |e| {
                    events.push(e);
                    Ok(())
                },
                || false,
            )
            .unwrap();
        (events, result)
    }

    fn percents(events: &[ProgressEvent]) -> Vec<u8> {
        events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Percent(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_result_is_cube() {
        let task = CubeTask::default();
        for n in [0, 1, 2, 5, 17, 64] {
            let (_, result) = collect(&task, n);
            assert_eq!(result.result_value, n * n * n, "n = {}", n);
        }
    }

    #[test]
    fn test_small_n_has_no_progress_by_default() {
        let task = CubeTask::default();
        let (events, result) = collect(&task, 5);
        assert!(events.is_empty());
        assert_eq!(result.result_value, 125);
    }

    #[test]
    fn test_small_n_startup_notification_flag() {
        let config = CalcConfig::new().startup_notification_when_disabled(true);
        let task = CubeTask::new(ProgressPolicy::from_config(&config));

        let (events, _) = collect(&task, 5);
        assert_eq!(
            events,
            vec![ProgressEvent::Message(MSG_STARTED_NO_PROGRESS.to_string())]
        );

        let (events, result) = collect(&task, 0);
        assert_eq!(events.len(), 1);
        assert_eq!(result.result_value, 0);
    }

    #[test]
    fn test_large_n_progress_cadence() {
        let task = CubeTask::default();
        let (events, result) = collect(&task, 300);

        assert_eq!(events[0], ProgressEvent::Message(MSG_STARTED.to_string()));

        let percents = percents(&events);
        // i = 9, 19, ..., 299
        assert_eq!(percents.len(), 30);
        assert_eq!(percents[0], 3);
        assert_eq!(*percents.last().unwrap(), 99);
        assert!(percents.windows(2).all(|w| w[0] <= w[1]));
        assert!(percents.iter().all(|p| *p <= 100));

        assert_eq!(result.result_value, 27_000_000);
    }

    #[test]
    fn test_message_mode_payload() {
        let config = CalcConfig::new().mode(ProgressMode::Message).threshold(20);
        let task = CubeTask::new(ProgressPolicy::from_config(&config));

        let (events, _) = collect(&task, 20);
        assert_eq!(
            events,
            vec![
                ProgressEvent::Message(MSG_STARTED.to_string()),
                ProgressEvent::Message("Fortschritt: 45%".to_string()),
                ProgressEvent::Message("Fortschritt: 95%".to_string()),
            ]
        );
    }

    #[test]
    fn test_cancel_stops_before_next_outer_iteration() {
        let task = CubeTask::default();
        let polls = std::cell::Cell::new(0);
        let result = task.compute(
            ComputationRequest::new(50).unwrap(),
            |_| Ok(()),
            || {
                polls.set(polls.get() + 1);
                polls.get() > 3
            },
        );
        assert!(matches!(result, Err(Error::Cancelled)));
        assert_eq!(polls.get(), 4);
    }

    #[test]
    fn test_progress_error_aborts() {
        let task = CubeTask::default();
        let result = task.compute(
            ComputationRequest::new(260).unwrap(),
            |_| Err(Error::Cancelled),
            || false,
        );
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[test]
    fn test_percent_for() {
        assert_eq!(percent_for(9, 300), 3);
        assert_eq!(percent_for(299, 300), 99);
        assert_eq!(percent_for(300, 300), 100);
        assert_eq!(percent_for(0, 0), 100);
    }

    #[test]
    fn test_report_step() {
        let policy = ProgressPolicy::default();
        assert!(policy.is_report_step(9));
        assert!(policy.is_report_step(19));
        assert!(!policy.is_report_step(10));
        assert!(!policy.is_report_step(0));
    }

    #[test]
    fn test_request_rejects_overflowing_n() {
        assert!(ComputationRequest::new(MAX_INPUT).is_ok());
        assert!(matches!(
            ComputationRequest::new(MAX_INPUT + 1),
            Err(Error::InvalidInput(_))
        ));
        assert_eq!(ComputationRequest::new(7).unwrap().expected_result(), 343);
    }

    #[test]
    fn test_result_display() {
        let result = CubeResult {
            result_value: 125,
            elapsed_seconds: 0,
        };
        assert_eq!(result.to_string(), "Ergebnis: 125\nLaufzeit: 0 Sekunden");
    }
}
