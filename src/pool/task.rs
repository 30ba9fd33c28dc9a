//! Task wrappers and result futures.
//!
//! The pool queue holds uniform "void" tasks. Result-bearing submissions are
//! erased into that shape here: the task body runs under `catch_unwind` and
//! sends its outcome through a one-shot channel whose receive end is handed
//! to the caller as a [`TaskHandle`].

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};

use crate::domain::TaskError;

/// The uniform shape of everything in the pool queue.
pub(crate) type Task = Box<dyn FnOnce() + Send + 'static>;

/// Receive end of a result-bearing task.
///
/// A panic inside the task body surfaces here as [`TaskError::Panicked`];
/// the worker that ran the task is unaffected.
pub struct TaskHandle<R> {
    result: Receiver<Result<R, TaskError>>,
}

impl<R> TaskHandle<R> {
    /// Blocks until the task delivers its value or fails.
    pub fn join(self) -> Result<R, TaskError> {
        self.result.recv().unwrap_or(Err(TaskError::Canceled))
    }

    /// Blocks for at most `timeout`.
    pub fn join_timeout(self, timeout: Duration) -> Result<R, TaskError> {
        match self.result.recv_timeout(timeout) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => Err(TaskError::Timeout),
            Err(RecvTimeoutError::Disconnected) => Err(TaskError::Canceled),
        }
    }
}

/// Erases a result-bearing closure into a queue task plus the handle that
/// will receive its outcome.
pub(crate) fn wrap_with_result<R, F>(f: F) -> (Task, TaskHandle<R>)
where
    R: Send + 'static,
    F: FnOnce() -> R + Send + 'static,
{
    let (sender, receiver) = bounded(1);
    let task: Task = Box::new(move || {
        let outcome = catch_unwind(AssertUnwindSafe(f))
            .map_err(|payload| TaskError::Panicked(panic_message(payload.as_ref())));
        let _ = sender.send(outcome);
    });
    (task, TaskHandle { result: receiver })
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "opaque panic payload".to_string()
    }
}
