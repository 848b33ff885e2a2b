//! Bounded worker pool.
//!
//! A producer pushes tasks into a bounded channel; a fixed set of workers on
//! a private rayon pool drain it in no particular order and send one
//! `TaskOutcome` per task back to the caller. The producer ends the run with
//! one `Shutdown` per worker.
//!
//! Cancellation is coarse: once the flag is set the producer stops queueing
//! and workers discard whatever is still queued. Tasks already running finish
//! normally.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, warn};

use sigbench_core::BacktestResult;

use crate::config::PoolConfig;
use crate::market::MarketData;
use crate::memo::SignalMemo;
use crate::task::{run_task, TaskDescriptor, TaskError};

/// What travels through the task queue.
#[derive(Debug)]
pub enum PoolMessage {
    Task(TaskDescriptor),
    Shutdown,
}

/// Result of one task, successful or not.
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    pub descriptor: TaskDescriptor,
    pub result: Result<BacktestResult, TaskError>,
    pub elapsed: Duration,
}

/// Counts for a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub queued: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Tasks never started because the run was cancelled.
    pub skipped: usize,
}

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("failed to build worker pool: {0}")]
    Build(#[from] rayon::ThreadPoolBuildError),
}

pub struct WorkerPool {
    workers: usize,
    queue_capacity: usize,
    pool: rayon::ThreadPool,
    cancel: Arc<AtomicBool>,
}

impl WorkerPool {
    pub fn new(config: &PoolConfig) -> Result<Self, PoolError> {
        let workers = config.workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("sigbench-worker-{i}"))
            .build()?;
        Ok(Self {
            workers,
            queue_capacity: config.queue_capacity.max(1),
            pool,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Set this flag to stop queueing new tasks.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run every task, handing each outcome to `on_outcome` as it arrives.
    /// Returns once all workers have exited.
    pub fn run<F>(
        &self,
        tasks: Vec<TaskDescriptor>,
        data: Arc<MarketData>,
        memo: Arc<SignalMemo>,
        mut on_outcome: F,
    ) -> RunSummary
    where
        F: FnMut(TaskOutcome),
    {
        let total = tasks.len();
        info!(tasks = total, workers = self.workers, queue = self.queue_capacity, "pool starting");
        let started = Instant::now();

        let (task_tx, task_rx) = mpsc::sync_channel::<PoolMessage>(self.queue_capacity);
        let task_rx = Arc::new(Mutex::new(task_rx));
        let (outcome_tx, outcome_rx) = mpsc::channel::<WorkerEvent>();

        for id in 0..self.workers {
            let rx = Arc::clone(&task_rx);
            let tx = outcome_tx.clone();
            let data = Arc::clone(&data);
            let memo = Arc::clone(&memo);
            let cancel = Arc::clone(&self.cancel);
            self.pool.spawn(move || worker_loop(id, rx, tx, data, memo, cancel));
        }
        // workers hold the only senders, so the receive loop ends when they exit
        drop(outcome_tx);

        let mut summary = RunSummary::default();
        thread::scope(|scope| {
            let cancel = &self.cancel;
            let workers = self.workers;
            let producer = scope.spawn(move || produce(tasks, task_tx, cancel, workers));

            for event in outcome_rx {
                match event {
                    WorkerEvent::Finished(outcome) => {
                        match &outcome.result {
                            Ok(_) => summary.succeeded += 1,
                            Err(e) => {
                                summary.failed += 1;
                                warn!(task = %outcome.descriptor.label(), error = %e, "task failed");
                            }
                        }
                        on_outcome(outcome);
                    }
                    WorkerEvent::Skipped => summary.skipped += 1,
                }
            }

            // the producer returns before the last worker exits
            summary.queued = producer.join().unwrap_or(0);
        });
        summary.skipped += total - summary.queued;

        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pool finished"
        );
        summary
    }
}

enum WorkerEvent {
    Finished(TaskOutcome),
    Skipped,
}

/// Queue tasks until done or cancelled, then one sentinel per worker.
/// Returns the number of tasks queued.
fn produce(
    tasks: Vec<TaskDescriptor>,
    tx: SyncSender<PoolMessage>,
    cancel: &AtomicBool,
    workers: usize,
) -> usize {
    let mut queued = 0;
    for task in tasks {
        if cancel.load(Ordering::Relaxed) {
            info!(queued, "cancelled; no further tasks queued");
            break;
        }
        if tx.send(PoolMessage::Task(task)).is_err() {
            break;
        }
        queued += 1;
    }
    for _ in 0..workers {
        if tx.send(PoolMessage::Shutdown).is_err() {
            break;
        }
    }
    queued
}

fn worker_loop(
    id: usize,
    rx: Arc<Mutex<Receiver<PoolMessage>>>,
    tx: Sender<WorkerEvent>,
    data: Arc<MarketData>,
    memo: Arc<SignalMemo>,
    cancel: Arc<AtomicBool>,
) {
    loop {
        let message = match rx.lock() {
            Ok(guard) => guard.recv(),
            Err(_) => break,
        };
        let task = match message {
            Ok(PoolMessage::Task(task)) => task,
            Ok(PoolMessage::Shutdown) | Err(_) => break,
        };

        if cancel.load(Ordering::Relaxed) {
            if tx.send(WorkerEvent::Skipped).is_err() {
                break;
            }
            continue;
        }

        let started = Instant::now();
        let result = catch_unwind(AssertUnwindSafe(|| run_task(&task, &data, &memo)))
            .unwrap_or_else(|payload| Err(TaskError::Panicked(panic_message(&*payload))));
        let elapsed = started.elapsed();
        debug!(worker = id, task = %task.label(), elapsed_us = elapsed.as_micros() as u64, "task done");

        let outcome = TaskOutcome {
            descriptor: task,
            result,
            elapsed,
        };
        if tx.send(WorkerEvent::Finished(outcome)).is_err() {
            break;
        }
    }
    debug!(worker = id, "worker exiting");
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunnerConfig;
    use crate::task::expand_tasks;
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use sigbench_core::domain::Bar;

    fn bars(n: usize, phase: f64) -> Vec<Bar> {
        let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        (0..n)
            .map(|i| {
                let close = 100.0 + (i as f64 * 0.2 + phase).sin() * 10.0;
                Bar {
                    timestamp: base + ChronoDuration::days(i as i64),
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1_000.0 + i as f64,
                }
            })
            .collect()
    }

    fn market() -> Arc<MarketData> {
        Arc::new(
            [("AAA".to_string(), bars(150, 0.0)), ("BBB".to_string(), bars(150, 1.0))]
                .into_iter()
                .collect(),
        )
    }

    fn pool(workers: usize, queue_capacity: usize) -> WorkerPool {
        WorkerPool::new(&PoolConfig {
            workers,
            queue_capacity,
        })
        .unwrap()
    }

    #[test]
    fn every_task_yields_one_outcome() {
        let tasks = expand_tasks(&["AAA".into(), "BBB".into()], &RunnerConfig::default()).unwrap();
        let expected = tasks.len();
        let mut outcomes = Vec::new();
        let summary = pool(3, 2).run(tasks, market(), Arc::new(SignalMemo::new()), |o| outcomes.push(o));

        assert_eq!(outcomes.len(), expected);
        assert_eq!(summary.queued, expected);
        assert_eq!(summary.succeeded, expected);
        assert_eq!(summary.failed + summary.skipped, 0);
    }

    #[test]
    fn failures_are_scoped_to_their_task() {
        let mut tasks = expand_tasks(&["AAA".into()], &RunnerConfig::default()).unwrap();
        let mut orphan = tasks[0].clone();
        orphan.ticker = "ZZZ".into();
        tasks.push(orphan);
        let total = tasks.len();

        let mut failed = Vec::new();
        let summary = pool(2, 4).run(tasks, market(), Arc::new(SignalMemo::new()), |o| {
            if let Err(e) = o.result {
                failed.push(e);
            }
        });
        assert_eq!(summary.succeeded, total - 1);
        assert_eq!(failed, vec![TaskError::MissingBars("ZZZ".into())]);
    }

    #[test]
    fn parallel_run_matches_single_worker() {
        let tickers = ["AAA".to_string(), "BBB".to_string()];
        let tasks = expand_tasks(&tickers, &RunnerConfig::default()).unwrap();

        let collect = |workers| {
            let mut results: Vec<(String, f64)> = Vec::new();
            pool(workers, 1).run(tasks.clone(), market(), Arc::new(SignalMemo::new()), |o| {
                results.push((o.descriptor.label(), o.result.unwrap().final_portfolio_value))
            });
            results.sort_by(|a, b| a.0.cmp(&b.0));
            results
        };
        assert_eq!(collect(1), collect(4));
    }

    #[test]
    fn cancelled_before_start_runs_nothing() {
        let tasks = expand_tasks(&["AAA".into()], &RunnerConfig::default()).unwrap();
        let total = tasks.len();
        let p = pool(2, 2);
        p.cancel_handle().store(true, Ordering::Relaxed);

        let mut ran = 0;
        let summary = p.run(tasks, market(), Arc::new(SignalMemo::new()), |_| ran += 1);
        assert_eq!(ran, 0);
        assert_eq!(summary.queued, 0);
        assert_eq!(summary.skipped, total);
    }

    #[test]
    fn cancel_mid_run_stops_queueing() {
        let tasks = expand_tasks(&["AAA".into(), "BBB".into()], &RunnerConfig::default()).unwrap();
        let total = tasks.len();
        let p = pool(1, 1);
        let cancel = p.cancel_handle();

        let mut seen = 0;
        let summary = p.run(tasks, market(), Arc::new(SignalMemo::new()), |_| {
            seen += 1;
            if seen == 3 {
                cancel.store(true, Ordering::Relaxed);
            }
        });
        assert!(summary.succeeded >= 3);
        assert_eq!(summary.succeeded + summary.failed + summary.skipped, total);
    }
}
