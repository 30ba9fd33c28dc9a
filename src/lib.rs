//! # Stint - Scope Timing Profiler and Thread Pool
//!
//! Stint is a concurrent execution and in-process measurement toolkit for
//! applications that dispatch short-lived tasks across a fixed set of
//! threads and want to know where the time went, one frame at a time.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Application Threads                     │
//! │        profile_scope! / scope_enter / mark_next_frame    │
//! └──────────────┬──────────────────────────┬────────────────┘
//!                │ intervals                │ tasks
//!                ▼                          ▼
//! ┌──────────────────────────┐  ┌──────────────────────────┐
//! │        Profiler          │  │       ThreadPool         │
//! │  registry  catalog       │◀─│  workers register and    │
//! │  per-thread recorder     │  │  profile task acquisition│
//! │  frame ledger            │  │  barriers, result futures│
//! └──────────────┬───────────┘  └──────────────────────────┘
//!                │ get_results()
//!                ▼
//! ┌──────────────────────────┐
//! │     ProfilerResults      │──▶ binary file (IYFR)
//! │   (immutable bundle)     │──▶ text report
//! │                          │──▶ Chrome trace JSON
//! └──────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`profiling`]: capture: thread registry, interned scope catalog,
//!   per-thread recorder with frame ledger, snapshot extraction
//! - [`pool`]: fixed-size worker pool with drain-on-shutdown, group
//!   barriers and result futures
//! - [`trace_data`]: the immutable results bundle
//! - [`export`]: binary format, text report, Chrome trace JSON
//! - [`domain`]: core types (ids, events, frames) and structured errors
//! - [`clock`] / [`sync`]: monotonic timestamps and the short-hold spinlock
//!
//! ## Typical Usage
//!
//! ```no_run
//! use stint::pool::ThreadPool;
//! use stint::profiling;
//!
//! # fn main() -> Result<(), stint::domain::PoolError> {
//! profiling::assign_thread_name("Main");
//! profiling::set_recording(true);
//!
//! let pool = ThreadPool::with_default_workers(|_total, _index| {})?;
//! for _ in 0..5 {
//!     let result = pool.add_task_with_result(|| {
//!         stint::profile_scope!("simulate");
//!         6 * 7
//!     })?;
//!     assert_eq!(result.join().unwrap(), 42);
//!     profiling::mark_next_frame();
//! }
//!
//! let results = profiling::get_results();
//! results.write_to_file("run.stint");
//! println!("{}", results.write_to_string());
//! # Ok(())
//! # }
//! ```
//!
//! Captured files can be inspected offline with the bundled `stint-report`
//! binary, which prints the text report and can re-export a capture as a
//! Chrome trace.

pub mod cli;
pub mod clock;
pub mod domain;
pub mod export;
pub mod pool;
pub mod profiling;
pub mod sync;
pub mod trace_data;

pub use domain::{
    FrameData, PoolError, ProfilerError, RecordedEvent, ScopeInfo, ScopeKey, Tag, TagColor,
    TagEntry, TaskError, ThreadId,
};
pub use export::{ChromeTraceExporter, DurationUnit};
pub use pool::{Barrier, TaskHandle, ThreadPool};
pub use profiling::{ProfilerStatus, ScopeGuard, TagPalette, MAX_PROFILED_THREADS};
pub use trace_data::ProfilerResults;
