use anyhow::Result;
use crossbeam::channel::{Receiver, Sender, bounded, unbounded};
use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Ready-queue buffer size multiplier (buffer = workers * multiplier)
const CHANNEL_BUFFER_MULTIPLIER: usize = 2;

/// A unit of work run by the [`TaskScheduler`]
///
/// Tasks are consumed by execution, so a task can never run twice. Errors
/// must be handled inside `execute`; a panic is caught and counted by the
/// scheduler but the task's work is lost.
pub trait Task: Send {
    /// Descriptive name used in logs and progress output
    fn name(&self) -> &str;

    fn execute(self: Box<Self>);
}

/// Adapter running a closure as a [`Task`]
pub struct FnTask<F> {
    name: String,
    work: F,
}

impl<F> FnTask<F>
where
    F: FnOnce() + Send,
{
    pub fn new(name: impl Into<String>, work: F) -> Self {
        Self {
            name: name.into(),
            work,
        }
    }
}

impl<F> Task for FnTask<F>
where
    F: FnOnce() + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(self: Box<Self>) {
        let work = self.work;
        work()
    }
}

/// Progress callback: (finished, total, name of the task that just finished)
pub type ProgressFn = dyn Fn(usize, usize, &str) + Send + Sync;

/// Outcome of one [`TaskScheduler::execute_all`] call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionSummary {
    /// Tasks taken from the queue
    pub total: usize,
    /// Tasks that returned normally
    pub completed: usize,
    /// Tasks that panicked
    pub panicked: usize,
    /// Highest number of tasks observed running at the same time
    pub peak_parallel: usize,
    pub elapsed: Duration,
}

/// Message sent by a worker when a task finishes
struct Completion {
    name: String,
    panicked: bool,
}

/// Bounded-parallelism executor for heterogeneous tasks
///
/// Tasks queue in FIFO order and start in that order; at most `max_parallel`
/// run at once, each on its own worker thread. Completion order is whatever
/// the work dictates.
pub struct TaskScheduler {
    max_parallel: usize,
    queue: VecDeque<Box<dyn Task>>,
    progress: Option<Box<ProgressFn>>,
}

impl TaskScheduler {
    /// Create a scheduler; `max_parallel` below 1 is treated as 1
    pub fn new(max_parallel: usize) -> Self {
        Self {
            max_parallel: max_parallel.max(1),
            queue: VecDeque::new(),
            progress: None,
        }
    }

    /// Report every completion to `progress`
    pub fn with_progress<P>(mut self, progress: P) -> Self
    where
        P: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        self.progress = Some(Box::new(progress));
        self
    }

    pub fn max_parallel(&self) -> usize {
        self.max_parallel
    }

    /// Number of tasks waiting to run
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn add_task(&mut self, task: Box<dyn Task>) {
        self.queue.push_back(task);
    }

    /// Run every queued task and block until all of them have finished
    pub fn execute_all(&mut self) -> Result<ExecutionSummary> {
        let start_time = Instant::now();
        let tasks: Vec<Box<dyn Task>> = self.queue.drain(..).collect();
        let total = tasks.len();

        if total == 0 {
            return Ok(ExecutionSummary::default());
        }

        let workers = std::cmp::min(self.max_parallel, total);
        tracing::debug!("Running {} tasks on {} workers", total, workers);

        let (work_tx, work_rx): (Sender<Box<dyn Task>>, Receiver<Box<dyn Task>>) =
            bounded(workers * CHANNEL_BUFFER_MULTIPLIER);
        let (done_tx, done_rx): (Sender<Completion>, Receiver<Completion>) = unbounded();

        let active = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);

        // Use crossbeam::thread::scope so workers can borrow the counters
        let (completed, panicked) = crossbeam::thread::scope(|s| {
            for worker_id in 0..workers {
                let work_rx = work_rx.clone();
                let done_tx = done_tx.clone();
                let active = &active;
                let peak = &peak;

                s.spawn(move |_| {
                    while let Ok(task) = work_rx.recv() {
                        let name = task.name().to_string();
                        let running = active.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(running, Ordering::SeqCst);
                        tracing::debug!("[worker-{}] started {}", worker_id, name);

                        let outcome = catch_unwind(AssertUnwindSafe(|| task.execute()));
                        active.fetch_sub(1, Ordering::SeqCst);

                        let completion = Completion {
                            name,
                            panicked: outcome.is_err(),
                        };
                        if done_tx.send(completion).is_err() {
                            break; // Collector dropped
                        }
                    }
                });
            }

            // Producer thread: feed the ready queue in order
            s.spawn(move |_| {
                for task in tasks {
                    if work_tx.send(task).is_err() {
                        break; // Workers dropped
                    }
                }
            });

            // Drop the originals so the channels close once the threads finish
            drop(work_rx);
            drop(done_tx);

            self.collect_completions(done_rx, total)
        })
        .map_err(|_| anyhow::anyhow!("Thread panic occurred during task execution"))?;

        let summary = ExecutionSummary {
            total,
            completed,
            panicked,
            peak_parallel: peak.load(Ordering::SeqCst),
            elapsed: start_time.elapsed(),
        };

        tracing::info!(
            "Executed {} tasks in {:.2}s ({} panicked, peak parallelism {})",
            summary.total,
            summary.elapsed.as_secs_f64(),
            summary.panicked,
            summary.peak_parallel
        );

        Ok(summary)
    }

    /// Collect completions until every worker has hung up
    fn collect_completions(&self, done_rx: Receiver<Completion>, total: usize) -> (usize, usize) {
        let mut completed = 0;
        let mut panicked = 0;

        for completion in done_rx.iter() {
            if completion.panicked {
                panicked += 1;
                tracing::error!("Task panicked: {}", completion.name);
            } else {
                completed += 1;
                tracing::debug!("Task finished: {}", completion.name);
            }

            if let Some(progress) = &self.progress {
                progress(completed + panicked, total, &completion.name);
            }
        }

        (completed, panicked)
    }

    /// Release the scheduler. Tasks queued after the last `execute_all` are
    /// reported, not run.
    pub fn finalize(self) {
        if !self.queue.is_empty() {
            tracing::warn!(
                "Scheduler finalized with {} tasks never executed",
                self.queue.len()
            );
        }
    }
}
