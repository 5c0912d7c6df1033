//! Fixed-size thread pool backed by a [`ConcurrentQueue`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread::{self, JoinHandle, ThreadId};
use std::time::{Duration, Instant};

use tokio::sync::oneshot;

use super::error::{PoolError, PoolResult};
use super::handle::TaskHandle;
use super::{PoolState, PoolStats};
use crate::config::PoolConfig;
use crate::queue::ConcurrentQueue;

/// A unit of work waiting for a worker.
struct Job {
    run: Box<dyn FnOnce(&Counters) + Send + 'static>,
    queued_at: Instant,
}

/// What a worker finds at the front of the queue.
enum Message {
    Run(Job),
    /// One per worker, pushed by `shutdown` behind all accepted jobs.
    Terminate,
}

/// Counters shared between the pool and its workers.
#[derive(Default)]
struct Counters {
    submitted: AtomicU64,
    completed: AtomicU64,
    panicked: AtomicU64,
    pending: AtomicUsize,
    queue_wait_us: AtomicU64,
    exec_time_us: AtomicU64,
}

/// A fixed-size pool of OS threads executing submitted closures.
///
/// Workers pull jobs from one shared queue. Each submission returns a
/// [`TaskHandle`] that resolves to the closure's return value, or to the
/// captured panic if the closure panicked. A panicking job never takes its
/// worker down.
///
/// Shutdown drains: every job accepted before [`shutdown`] runs to completion
/// before the workers exit. Dropping the pool shuts it down.
///
/// [`shutdown`]: ThreadPool::shutdown
pub struct ThreadPool {
    queue: Arc<ConcurrentQueue<Message>>,
    /// Submissions hold the read side while enqueueing; shutdown takes the
    /// write side, so no job can land behind the terminate messages.
    state: RwLock<PoolState>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    worker_ids: Vec<ThreadId>,
    worker_count: usize,
    counters: Arc<Counters>,
    name: String,
}

impl ThreadPool {
    /// Create a pool with `num_workers` threads (0 = use CPU count).
    ///
    /// Threads are named `<name>-<id>`.
    pub fn new(num_workers: usize, name: impl Into<String>) -> PoolResult<Self> {
        let num_workers = if num_workers == 0 {
            num_cpus::get()
        } else {
            num_workers
        };
        let name = name.into();
        let queue = Arc::new(ConcurrentQueue::new());
        let counters = Arc::new(Counters::default());

        let mut workers = Vec::with_capacity(num_workers);
        for id in 0..num_workers {
            let queue_ref = Arc::clone(&queue);
            let counters_ref = Arc::clone(&counters);
            let pool_name = name.clone();

            let spawned = thread::Builder::new()
                .name(format!("{}-{}", name, id))
                .spawn(move || worker_loop(id, &pool_name, &queue_ref, &counters_ref));

            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    // Release the workers that did start before reporting.
                    for _ in 0..workers.len() {
                        queue.push(Message::Terminate);
                    }
                    for worker in workers {
                        let _ = worker.join();
                    }
                    tracing::error!(pool = %name, worker = id, error = %e, "failed to spawn worker");
                    return Err(PoolError::Spawn(e.to_string()));
                }
            }
        }

        tracing::info!(pool = %name, workers = num_workers, "thread pool created");

        let worker_ids = workers.iter().map(|w| w.thread().id()).collect();

        Ok(Self {
            queue,
            state: RwLock::new(PoolState::Running),
            workers: Mutex::new(workers),
            worker_ids,
            worker_count: num_workers,
            counters,
            name,
        })
    }

    /// Create a pool from loaded configuration.
    pub fn from_config(config: &PoolConfig) -> PoolResult<Self> {
        Self::new(config.worker_count(), config.name.clone())
    }

    /// Queue `work` for execution and return a handle to its result.
    ///
    /// Fails with [`PoolError::Stopped`] once shutdown has been requested.
    pub fn submit<F, R>(&self, work: F) -> PoolResult<TaskHandle<R>>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        if *state != PoolState::Running {
            return Err(PoolError::Stopped);
        }

        let (result_tx, result_rx) = oneshot::channel();
        let job = Job {
            run: Box::new(move |counters: &Counters| {
                let outcome = panic::catch_unwind(AssertUnwindSafe(work))
                    .map_err(|payload| PoolError::TaskPanicked(panic_message(payload.as_ref())));

                // Counted before the result is visible to the submitter.
                let counter = if outcome.is_ok() {
                    &counters.completed
                } else {
                    &counters.panicked
                };
                counter.fetch_add(1, Ordering::Relaxed);

                // The submitter may have dropped its handle.
                let _ = result_tx.send(outcome);
            }),
            queued_at: Instant::now(),
        };

        self.counters.submitted.fetch_add(1, Ordering::Relaxed);
        self.counters.pending.fetch_add(1, Ordering::SeqCst);
        self.queue.push(Message::Run(job));
        drop(state);

        Ok(TaskHandle::new(result_rx))
    }

    /// Submit `work` and await its result.
    pub async fn execute<F, R>(&self, work: F) -> PoolResult<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        self.submit(work)?.await
    }

    /// Submit `work` and await its result for at most `timeout`.
    ///
    /// Returns [`PoolError::Timeout`] if the deadline passes first. The job
    /// itself is not interrupted.
    pub async fn execute_with_timeout<F, R>(&self, work: F, timeout: Duration) -> PoolResult<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        self.submit(work)?.get_timeout(timeout).await
    }

    /// Get the number of workers.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Get the number of jobs accepted but not yet picked up by a worker.
    pub fn pending_count(&self) -> usize {
        self.counters.pending.load(Ordering::SeqCst)
    }

    /// Get the pool name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the current lifecycle state.
    pub fn state(&self) -> PoolState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the pool counters.
    pub fn stats(&self) -> PoolStats {
        let c = &self.counters;
        let completed = c.completed.load(Ordering::Relaxed);
        let panicked = c.panicked.load(Ordering::Relaxed);
        let finished = completed + panicked;

        let (avg_queue_wait_us, avg_exec_time_us) = if finished == 0 {
            (0, 0)
        } else {
            (
                c.queue_wait_us.load(Ordering::Relaxed) / finished,
                c.exec_time_us.load(Ordering::Relaxed) / finished,
            )
        };

        PoolStats {
            submitted: c.submitted.load(Ordering::Relaxed),
            completed,
            panicked,
            pending: c.pending.load(Ordering::SeqCst),
            avg_queue_wait_us,
            avg_exec_time_us,
        }
    }

    /// Stop accepting work, run everything already queued, and wait for all
    /// workers to exit.
    ///
    /// Idempotent. A concurrent second caller blocks until the first one has
    /// joined the workers. Called from inside a job, it only requests the stop
    /// and returns: a worker cannot wait for itself, so the pool stays in
    /// `Stopping` until `shutdown` runs again from outside (drop does this).
    pub fn shutdown(&self) {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            if *state == PoolState::Running {
                *state = PoolState::Stopping;
                tracing::info!(pool = %self.name, "shutting down thread pool");

                // FIFO puts these behind every accepted job.
                for _ in 0..self.worker_count {
                    self.queue.push(Message::Terminate);
                }
            }
        }

        if self.worker_ids.contains(&thread::current().id()) {
            return;
        }

        let mut workers = self.workers.lock().unwrap_or_else(PoisonError::into_inner);
        for worker in workers.drain(..) {
            if worker.join().is_err() {
                tracing::warn!(pool = %self.name, "worker thread exited abnormally");
            }
        }

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if *state != PoolState::Stopped {
            *state = PoolState::Stopped;
            tracing::debug!(pool = %self.name, "thread pool stopped");
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Worker thread main loop.
fn worker_loop(id: usize, pool: &str, queue: &ConcurrentQueue<Message>, counters: &Counters) {
    tracing::debug!(pool = %pool, worker = id, "worker started");

    loop {
        match queue.pop_blocking() {
            Message::Run(job) => {
                counters.pending.fetch_sub(1, Ordering::SeqCst);
                let waited = job.queued_at.elapsed();
                let started = Instant::now();

                // Panics are caught inside the job and delivered to its handle.
                (job.run)(counters);

                counters
                    .queue_wait_us
                    .fetch_add(waited.as_micros() as u64, Ordering::Relaxed);
                counters
                    .exec_time_us
                    .fetch_add(started.elapsed().as_micros() as u64, Ordering::Relaxed);
            }
            Message::Terminate => break,
        }
    }

    tracing::debug!(pool = %pool, worker = id, "worker stopped");
}

/// Extract a readable message from a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
