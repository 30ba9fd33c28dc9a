//! Thread registry: dense id assignment, naming and the registration limit.
//!
//! Runs in its own process so id assignment starts from zero. A single test
//! keeps the assignment order deterministic.

use std::thread;

use stint::domain::{ProfilerError, ThreadId};
use stint::profiling::{self, MAX_PROFILED_THREADS};

#[test]
fn ids_are_dense_names_stick_and_the_limit_holds() {
    // Register three named threads strictly one after another.
    for (expected_id, name) in ["A", "B", "C"].into_iter().enumerate() {
        thread::spawn(move || {
            assert!(profiling::assign_thread_name(name));
            assert_eq!(profiling::current_thread_id().unwrap(), ThreadId(expected_id));
            assert_eq!(profiling::current_thread_name().unwrap(), name);

            // A second naming attempt on the same thread is ignored.
            assert!(!profiling::assign_thread_name("other"));
        })
        .join()
        .unwrap();
    }
    assert_eq!(profiling::registered_thread_count(), 3);

    // This thread never interacted with the profiler, so it lazily takes
    // the next id and the default name.
    assert_eq!(profiling::current_thread_id().unwrap(), ThreadId(3));
    assert_eq!(profiling::current_thread_name().unwrap(), "Thread3");
    assert_eq!(profiling::registered_thread_count(), 4);

    // The snapshot carries the registered names.
    let results = profiling::get_results();
    assert_eq!(results.thread_count(), 4);
    assert_eq!(results.thread_name(ThreadId(0)), "A");
    assert_eq!(results.thread_name(ThreadId(1)), "B");
    assert_eq!(results.thread_name(ThreadId(2)), "C");
    assert_eq!(results.thread_name(ThreadId(3)), "Thread3");

    // Fill the registry, then confirm the next registration fails.
    for _ in profiling::registered_thread_count()..MAX_PROFILED_THREADS {
        thread::spawn(|| {
            profiling::current_thread_id().unwrap();
        })
        .join()
        .unwrap();
    }
    assert_eq!(profiling::registered_thread_count(), MAX_PROFILED_THREADS);

    thread::spawn(|| {
        assert!(matches!(
            profiling::current_thread_id(),
            Err(ProfilerError::TooManyThreads)
        ));
        assert!(!profiling::assign_thread_name("overflow"));
    })
    .join()
    .unwrap();
    assert_eq!(profiling::registered_thread_count(), MAX_PROFILED_THREADS);
}
