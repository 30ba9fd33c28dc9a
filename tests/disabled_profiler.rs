//! The master-enable contract: built without the `profiling` feature the
//! capture surface is a no-op, while the pool, loading, reporting and
//! exporting keep working.
//!
//! Active only under `cargo test --no-default-features`; with the default
//! features this file compiles to nothing.

#![cfg(not(feature = "profiling"))]

use std::sync::Arc;

use stint::domain::ProfilerError;
use stint::pool::{Barrier, ThreadPool};
use stint::profiling::{self, ProfilerStatus};
use stint::trace_data::ProfilerResults;

#[test]
fn capture_surface_is_inert() {
    assert_eq!(profiling::get_status(), ProfilerStatus::Disabled);

    profiling::set_recording(true);
    assert_eq!(profiling::get_status(), ProfilerStatus::Disabled);

    assert!(matches!(profiling::current_thread_id(), Err(ProfilerError::Disabled)));
    assert!(matches!(profiling::current_thread_name(), Err(ProfilerError::Disabled)));
    assert!(!profiling::assign_thread_name("Main"));
    assert_eq!(profiling::registered_thread_count(), 0);

    // Same call site hit repeatedly, plus distinct identifiers: everything
    // resolves to the shared placeholder, nothing is interned or recorded.
    for _ in 0..3 {
        stint::profile_scope!("inert");
    }
    let first = profiling::insert_scope_info("a", "off.rs:1", "a", "off.rs", 1, stint::Tag::NONE);
    let second = profiling::insert_scope_info("b", "off.rs:2", "b", "off.rs", 2, stint::Tag::NONE);
    assert!(std::ptr::eq(first, second));

    profiling::mark_next_frame();

    let results = profiling::get_results();
    assert!(!results.has_any_records());
    assert!(results.is_frame_data_missing());
    assert_eq!(results.thread_count(), 0);
    assert_eq!(results.frames().len(), 1);
    assert_eq!(results.frames()[0].start_ns, 0);
    assert_eq!(results.frames()[0].end_ns, 1);
}

#[test]
fn synthetic_bundle_round_trips_and_renders() {
    let results = profiling::get_results();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("disabled.stint");
    assert!(results.write_to_file(&path));

    let restored = ProfilerResults::load_from_file(&path).expect("file should load");
    assert_eq!(restored, results);

    // The report walks frames per thread, so a zero-thread bundle renders
    // as an empty document rather than an error.
    assert!(restored.write_to_string().is_empty());
}

#[test]
fn pool_works_without_the_profiler() {
    let pool = ThreadPool::new(2, |_, _| {}).unwrap();
    let barrier = Arc::new(Barrier::new(2).unwrap());

    pool.add_task_with_barrier(&barrier, || {}).unwrap();
    pool.add_task_with_barrier(&barrier, || {}).unwrap();
    barrier.wait_for_all();

    let answer = pool.add_task_with_result(|| 6 * 7).unwrap();
    assert_eq!(answer.join().unwrap(), 42);
}
