//! Structured error types for stint
//!
//! Using thiserror for automatic Display implementation and error chaining.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfilerError {
    #[error("profiling support is disabled in this build")]
    Disabled,

    #[error("thread limit reached: only MAX_PROFILED_THREADS threads can register")]
    TooManyThreads,
}

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("cannot add tasks to a pool that is shutting down")]
    ShuttingDown,

    #[error("too many completed-task notifications for this barrier")]
    OverCompletion,

    #[error("failed to spawn worker thread")]
    Spawn(#[from] std::io::Error),
}

/// Delivered through a [`TaskHandle`](crate::pool::TaskHandle) when the task
/// body did not produce a value.
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("task panicked: {0}")]
    Panicked(String),

    #[error("task result not available within the timeout")]
    Timeout,

    #[error("task was dropped before completing")]
    Canceled,
}

/// Why a results file could not be read. Internal detail: the public loading
/// surface collapses these into "no result", logging the cause.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("results file is truncated")]
    Truncated,

    #[error("bad magic bytes")]
    BadMagic,

    #[error("unsupported results version {0}")]
    UnsupportedVersion(u8),

    #[error("malformed results data: {0}")]
    Malformed(&'static str),

    #[error(transparent)]
    Io(std::io::Error),
}

impl From<std::io::Error> for ReadError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            ReadError::Truncated
        } else {
            ReadError::Io(err)
        }
    }
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to serialize trace data: {0}")]
    SerializationFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
