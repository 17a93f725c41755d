//! Generic bounded-parallelism task execution
//!
//! This module runs heterogeneous units of work on a fixed number of worker
//! threads and blocks until every one of them has finished.
//!
//! # Responsibilities
//!
//! ## What This Module Does:
//! - **Resource Discovery**: Detects available CPU cores using `num_cpus::get()`
//! - **Bounded Execution**: Never runs more than `max_parallel` tasks at once
//! - **Ordering**: Starts tasks in the order they were queued
//! - **Containment**: A panicking task is caught and counted; siblings keep running
//!
//! ## What This Module Does NOT Do:
//! - **Shared State**: Tasks that share data bring their own synchronization
//! - **Retries, Timeouts, Cancellation**: A started task runs to completion
//!
//! # Example Usage
//!
//! ```rust
//! use jarcompat::parallel::{FnTask, TaskScheduler};
//!
//! let mut scheduler = TaskScheduler::new(4);
//! for i in 0..10 {
//!     scheduler.add_task(Box::new(FnTask::new(format!("job-{i}"), move || {
//!         let _ = i * 2;
//!     })));
//! }
//!
//! let summary = scheduler.execute_all().unwrap();
//! assert_eq!(summary.completed, 10);
//! scheduler.finalize();
//! ```

pub mod scheduler;

// Re-export main types for easier access
pub use scheduler::{ExecutionSummary, FnTask, ProgressFn, Task, TaskScheduler};

/// Default worker count: one per logical CPU
pub fn default_parallelism() -> usize {
    num_cpus::get().max(1)
}
