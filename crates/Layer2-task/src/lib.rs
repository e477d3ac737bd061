//! # longcalc-task
//!
//! Background execution of a long CPU-bound computation with in-order
//! progress delivery back to the interactive context.
//!
//! ## Features
//!
//! - Generic `Task` abstraction (input, progress and output types)
//! - `BlockingExecutor` running tasks on tokio's blocking pool
//! - Bounded FIFO event channel with cooperative cancellation
//! - `CubeTask`: the O(n³) counting worker with configurable progress cadence
//! - `TaskController`: re-entrancy guard, trigger state and display relay
//!
//! ## Flow
//!
//! ```text
//! start(trigger, n) ──▶ BlockingExecutor::spawn(CubeTask)
//!                              │ spawn_blocking
//!                              ▼
//!                    Progress* ─▶ Completed     (mpsc, FIFO)
//!                              │
//! next_event().await ◀─────────┘ ──▶ DisplaySurface
//! ```

pub mod controller;
pub mod executor;
pub mod state;
pub mod task;
pub mod worker;

pub use controller::{ControllerEvent, RunSummary, TaskController, TriggerId};
pub use executor::{BlockingExecutor, TaskHandle};
pub use state::TaskLifecycleState;
pub use task::{Task, TaskContext, TaskEvent, TaskId};
pub use worker::{
    percent_for, ComputationRequest, CubeResult, CubeTask, ProgressEvent, ProgressPolicy,
    MAX_INPUT,
};
