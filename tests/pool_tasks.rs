//! Thread pool behavior: parallelism, barriers, result futures, panic
//! containment and drain-on-shutdown.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::sleep;
use std::time::{Duration, Instant};

use stint::domain::TaskError;
use stint::pool::{Barrier, ThreadPool};

#[test]
fn four_sleeps_finish_in_two_batches_on_two_workers() {
    let pool = ThreadPool::new(2, |_, _| {}).unwrap();
    let barrier = Arc::new(Barrier::new(4).unwrap());

    let started = Instant::now();
    for _ in 0..4 {
        pool.add_task_with_barrier(&barrier, || sleep(Duration::from_millis(20))).unwrap();
    }
    barrier.wait_for_all();
    let elapsed = started.elapsed();

    // Two workers × two sequential 20 ms tasks each: at least 40 ms, and
    // well under the 80 ms a serial run would need.
    assert!(elapsed >= Duration::from_millis(40), "finished too early: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(78), "no parallelism observed: {elapsed:?}");
}

#[test]
fn barrier_releases_once_all_three_tasks_notified() {
    let pool = ThreadPool::new(3, |_, _| {}).unwrap();
    let barrier = Arc::new(Barrier::new(3).unwrap());

    let started = Instant::now();
    for millis in [5u64, 10, 15] {
        pool.add_task_with_barrier(&barrier, move || sleep(Duration::from_millis(millis)))
            .unwrap();
    }
    barrier.wait_for_all();
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(15), "released before the slowest task: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(100), "barrier released far too late: {elapsed:?}");
}

#[test]
fn result_future_delivers_the_return_value() {
    let pool = ThreadPool::new(1, |_, _| {}).unwrap();

    let handle = pool.add_task_with_result(|| 42).unwrap();
    assert_eq!(handle.join().unwrap(), 42);
}

#[test]
fn result_and_barrier_compose() {
    let pool = ThreadPool::new(2, |_, _| {}).unwrap();
    let barrier = Arc::new(Barrier::new(2).unwrap());

    let first = pool.add_task_with_result_and_barrier(&barrier, || "left").unwrap();
    let second = pool.add_task_with_result_and_barrier(&barrier, || "right").unwrap();

    barrier.wait_for_all();
    assert_eq!(first.join().unwrap(), "left");
    assert_eq!(second.join().unwrap(), "right");
}

#[test]
fn task_panic_reaches_the_caller_and_the_worker_survives() {
    let pool = ThreadPool::new(1, |_, _| {}).unwrap();

    let failing = pool
        .add_task_with_result(|| 1u32 / std::hint::black_box(0u32))
        .unwrap();
    match failing.join() {
        Err(TaskError::Panicked(_)) => {}
        other => panic!("expected a panic error, got {other:?}"),
    }

    // The single worker absorbed the panic and keeps processing the queue.
    let healthy = pool.add_task_with_result(|| 7).unwrap();
    assert_eq!(healthy.join().unwrap(), 7);
}

#[test]
fn panicking_barrier_task_still_notifies() {
    let pool = ThreadPool::new(1, |_, _| {}).unwrap();
    let barrier = Arc::new(Barrier::new(2).unwrap());

    pool.add_task_with_barrier(&barrier, || panic!("task failure")).unwrap();
    pool.add_task_with_barrier(&barrier, || {}).unwrap();

    // Must not deadlock: the panicked task counts as completed.
    barrier.wait_for_all();
}

#[test]
fn shutdown_drains_every_queued_task() {
    let executed = Arc::new(AtomicUsize::new(0));
    {
        let pool = ThreadPool::new(2, |_, _| {}).unwrap();
        for _ in 0..16 {
            let executed = Arc::clone(&executed);
            pool.add_task(move || {
                sleep(Duration::from_millis(1));
                executed.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
        // Dropping the pool joins the workers after the queue is empty.
    }
    assert_eq!(executed.load(Ordering::SeqCst), 16);
}

#[test]
fn queue_and_worker_counts_are_observable() {
    let pool = ThreadPool::new(1, |_, _| {}).unwrap();
    assert_eq!(pool.worker_count(), 1);

    let (entered_tx, entered_rx) = std::sync::mpsc::channel();
    let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();

    pool.add_task(move || {
        entered_tx.send(()).unwrap();
        let _ = release_rx.recv();
    })
    .unwrap();
    entered_rx.recv().unwrap();

    for _ in 0..3 {
        pool.add_task(|| {}).unwrap();
    }

    // Observe the queue before unblocking the worker, so a failed assertion
    // cannot leave the pool's destructor waiting on the blocked task.
    let remaining = pool.remaining_task_count();
    release_tx.send(()).unwrap();
    assert_eq!(remaining, 3);
}

#[test]
fn wait_for_all_returns_once_nothing_is_executing() {
    let pool = ThreadPool::new(2, |_, _| {}).unwrap();
    let finished = Arc::new(AtomicUsize::new(0));

    for _ in 0..4 {
        let finished = Arc::clone(&finished);
        pool.add_task(move || {
            sleep(Duration::from_millis(5));
            finished.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }

    // wait_for_all observes only the in-flight counter, so give the tasks a
    // chance to run to completion first, then assert it does not hang.
    while finished.load(Ordering::SeqCst) < 4 {
        sleep(Duration::from_millis(1));
    }
    pool.wait_for_all();
}

#[test]
fn zero_workers_is_rejected() {
    assert!(ThreadPool::new(0, |_, _| {}).is_err());
}

#[test]
fn default_pool_has_at_least_one_worker() {
    let pool = ThreadPool::with_default_workers(|_, _| {}).unwrap();
    assert!(pool.worker_count() >= 1);
}

#[test]
fn setup_runs_once_per_worker_with_total_and_index() {
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);

    let _pool = ThreadPool::new(3, move |total, index| {
        recorder.lock().unwrap().push((total, index));
    })
    .unwrap();

    // Setup runs on each worker thread before its loop; poll until all three
    // have reported in.
    let deadline = Instant::now() + Duration::from_secs(2);
    while seen.lock().unwrap().len() < 3 {
        assert!(Instant::now() < deadline, "workers never finished setup");
        sleep(Duration::from_millis(1));
    }

    let mut calls = seen.lock().unwrap().clone();
    calls.sort();
    assert_eq!(calls, vec![(3, 0), (3, 1), (3, 2)]);
}
