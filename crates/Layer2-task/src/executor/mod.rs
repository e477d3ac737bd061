//! Task executors
//!
//! - `BlockingExecutor` - runs a `Task` on tokio's blocking pool and streams
//!   its events back through a bounded channel
//! - `TaskHandle` - owner-side half: event receiver, cancellation, join

pub mod blocking;
pub mod handle;

pub use blocking::BlockingExecutor;
pub use handle::TaskHandle;
