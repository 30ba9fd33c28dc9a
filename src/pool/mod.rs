//! Fixed-size thread pool with drain-on-shutdown semantics.
//!
//! Workers block on a condition variable until a task arrives or the pool
//! shuts down. Shutdown (on drop) is cooperative: every task already queued
//! is executed before any worker exits. Submissions come in four shapes
//! (with/without a result future, with/without a barrier); all of them erase
//! to the same "void task" in the FIFO queue.
//!
//! When the `profiling` feature is on, workers register themselves with the
//! thread registry as `PoolWorkerN` and both submission and task acquisition
//! are profiled scopes, so pool behavior shows up in captures alongside
//! application scopes.
//!
//! ```no_run
//! use std::sync::Arc;
//! use stint::pool::{Barrier, ThreadPool};
//!
//! # fn main() -> Result<(), stint::domain::PoolError> {
//! let pool = ThreadPool::new(4, |_total, _index| {})?;
//!
//! let barrier = Arc::new(Barrier::new(2)?);
//! pool.add_task_with_barrier(&barrier, || { /* work */ })?;
//! pool.add_task_with_barrier(&barrier, || { /* work */ })?;
//! barrier.wait_for_all();
//!
//! let answer = pool.add_task_with_result(|| 6 * 7)?;
//! assert_eq!(answer.join().unwrap(), 42);
//! # Ok(())
//! # }
//! ```

mod barrier;
mod task;

pub use barrier::Barrier;
pub use task::TaskHandle;

use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

use log::warn;

use crate::domain::PoolError;

use task::Task;

struct TaskQueue {
    tasks: VecDeque<Task>,
    running: bool,
}

struct PoolShared {
    queue: Mutex<TaskQueue>,
    new_task: Condvar,
    in_flight: AtomicUsize,
}

/// A fixed set of worker threads consuming a shared FIFO task queue.
pub struct ThreadPool {
    shared: Arc<PoolShared>,
    workers: Vec<JoinHandle<()>>,
}

impl ThreadPool {
    /// Creates a pool with `worker_count` workers (must be >= 1).
    ///
    /// `setup` runs exactly once on each worker thread before its loop,
    /// receiving `(total_workers, worker_index)`. Use it to set thread
    /// names, priorities or core affinities.
    pub fn new<S>(worker_count: usize, setup: S) -> Result<Self, PoolError>
    where
        S: Fn(usize, usize) + Send + Sync + 'static,
    {
        if worker_count == 0 {
            return Err(PoolError::InvalidArgument("worker count must be at least 1"));
        }

        let shared = Arc::new(PoolShared {
            queue: Mutex::new(TaskQueue { tasks: VecDeque::new(), running: true }),
            new_task: Condvar::new(),
            in_flight: AtomicUsize::new(0),
        });

        let setup = Arc::new(setup);
        let mut workers = Vec::with_capacity(worker_count);
        for index in 0..worker_count {
            let shared = Arc::clone(&shared);
            let setup = Arc::clone(&setup);
            let handle = std::thread::Builder::new()
                .name(format!("stint-pool-{index}"))
                .spawn(move || worker_loop(&shared, worker_count, index, setup.as_ref()))?;
            workers.push(handle);
        }

        Ok(Self { shared, workers })
    }

    /// Creates a pool sized for a process whose spawning thread also does
    /// work: `max(1, available_parallelism - 1)` workers.
    pub fn with_default_workers<S>(setup: S) -> Result<Self, PoolError>
    where
        S: Fn(usize, usize) + Send + Sync + 'static,
    {
        let parallelism =
            std::thread::available_parallelism().map(|count| count.get()).unwrap_or(1);
        Self::new(parallelism.saturating_sub(1).max(1), setup)
    }

    /// Number of worker threads in the pool.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Number of tasks waiting in the queue (not counting executing ones).
    pub fn remaining_task_count(&self) -> usize {
        self.shared.queue.lock().unwrap().tasks.len()
    }

    /// Enqueues a task with no result.
    ///
    /// A panic inside `f` is contained and logged; the worker resumes.
    pub fn add_task<F>(&self, f: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        crate::profile_scope!("pool_add_task");
        self.submit(Box::new(move || run_contained(f)))
    }

    /// Enqueues a task with no result that notifies `barrier` on completion.
    ///
    /// The barrier is notified even if the task body panics; completion
    /// means "the task ran", so one failed task cannot deadlock the group.
    pub fn add_task_with_barrier<F>(&self, barrier: &Arc<Barrier>, f: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        crate::profile_scope!("pool_add_task_with_barrier");
        let barrier = Arc::clone(barrier);
        self.submit(Box::new(move || {
            run_contained(f);
            notify(&barrier);
        }))
    }

    /// Enqueues a task and returns the future delivering its return value.
    pub fn add_task_with_result<R, F>(&self, f: F) -> Result<TaskHandle<R>, PoolError>
    where
        R: Send + 'static,
        F: FnOnce() -> R + Send + 'static,
    {
        crate::profile_scope!("pool_add_task_with_result");
        let (task, handle) = task::wrap_with_result(f);
        self.submit(task)?;
        Ok(handle)
    }

    /// Enqueues a task, returns its result future and notifies `barrier` on
    /// completion (even a panicked one; the panic still reaches the handle).
    pub fn add_task_with_result_and_barrier<R, F>(
        &self,
        barrier: &Arc<Barrier>,
        f: F,
    ) -> Result<TaskHandle<R>, PoolError>
    where
        R: Send + 'static,
        F: FnOnce() -> R + Send + 'static,
    {
        crate::profile_scope!("pool_add_task_with_result_and_barrier");
        let (task, handle) = task::wrap_with_result(f);
        let barrier = Arc::clone(barrier);
        self.submit(Box::new(move || {
            task();
            notify(&barrier);
        }))?;
        Ok(handle)
    }

    /// Busily waits until no task is executing.
    ///
    /// Known limitation: this observes only the in-flight counter, not the
    /// queue. A task that is submitted but not yet picked up by a worker can
    /// be missed.
    pub fn wait_for_all(&self) {
        while self.shared.in_flight.load(Ordering::Acquire) != 0 {
            std::hint::spin_loop();
        }
    }

    fn submit(&self, task: Task) -> Result<(), PoolError> {
        {
            let mut queue = self.shared.queue.lock().unwrap();
            if !queue.running {
                return Err(PoolError::ShuttingDown);
            }
            queue.tasks.push_back(task);
        }
        self.shared.new_task.notify_one();
        Ok(())
    }
}

impl Drop for ThreadPool {
    /// Drains the queue: every task submitted before the drop is executed
    /// before the workers exit.
    fn drop(&mut self) {
        {
            let mut queue = self.shared.queue.lock().unwrap();
            queue.running = false;
        }
        self.shared.new_task.notify_all();

        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn worker_loop<S>(shared: &PoolShared, total: usize, index: usize, setup: &S)
where
    S: Fn(usize, usize),
{
    setup(total, index);

    // Does nothing if the setup function already named this thread.
    #[cfg(feature = "profiling")]
    {
        let _ = crate::profiling::assign_thread_name(&format!("PoolWorker{index}"));
    }

    while let Some(task) = next_task(shared) {
        shared.in_flight.fetch_add(1, Ordering::AcqRel);
        task();
        shared.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Blocks until a task is available; `None` tells the worker to exit, which
/// only happens once the pool is shutting down AND the queue is empty.
fn next_task(shared: &PoolShared) -> Option<Task> {
    crate::profile_scope!("pool_acquire_task");

    let mut queue = shared.queue.lock().unwrap();
    loop {
        if let Some(task) = queue.tasks.pop_front() {
            return Some(task);
        }
        if !queue.running {
            return None;
        }
        queue = shared.new_task.wait(queue).unwrap();
    }
}

fn run_contained<F: FnOnce()>(f: F) {
    if let Err(payload) = catch_unwind(AssertUnwindSafe(f)) {
        warn!("pool task panicked: {}", task::panic_message(payload.as_ref()));
    }
}

fn notify(barrier: &Barrier) {
    if let Err(err) = barrier.notify_completed() {
        warn!("barrier notification failed: {err}");
    }
}
