//! Domain model for stint
//!
//! Core data types and errors shared by the profiler, the pool and the
//! export surfaces:
//! - Newtype ids that keep thread indices, scope keys and tags apart
//! - The timed records that flow from capture to serialization
//! - Structured errors via thiserror

pub mod errors;
pub mod types;

pub use types::{
    FrameData, RecordedEvent, ScopeInfo, ScopeKey, Tag, TagColor, TagEntry, ThreadId,
};

pub use errors::{ExportError, PoolError, ProfilerError, ReadError, TaskError};
