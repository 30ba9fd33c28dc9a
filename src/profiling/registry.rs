//! Thread registry: dense ids and names for participating threads.
//!
//! The first interaction from a thread assigns it the next free id, which is
//! then cached in thread-local storage so later lookups take no lock. Ids are
//! issued in assignment order and never recycled.

use std::cell::Cell;
use std::sync::{Mutex, OnceLock};

use crate::domain::{ProfilerError, ThreadId};

/// How many threads the profiler tracks. Compile-time constant, must be >= 1.
pub const MAX_PROFILED_THREADS: usize = 16;

const _: () = assert!(MAX_PROFILED_THREADS >= 1);

struct RegistryInner {
    counter: usize,
    names: Vec<String>,
}

struct Registry {
    inner: Mutex<RegistryInner>,
}

impl Registry {
    fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                counter: 0,
                names: (0..MAX_PROFILED_THREADS).map(|i| format!("Thread{i}")).collect(),
            }),
        }
    }

    fn assign_next(&self, name: Option<&str>) -> Result<ThreadId, ProfilerError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.counter >= MAX_PROFILED_THREADS {
            return Err(ProfilerError::TooManyThreads);
        }

        let id = ThreadId(inner.counter);
        inner.counter += 1;

        match name {
            Some(name) if !name.is_empty() => inner.names[id.0] = name.to_string(),
            _ => {} // keep the prefilled "ThreadN" default
        }

        CACHED_ID.with(|cache| cache.set(Some(id)));
        Ok(id)
    }
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

thread_local! {
    static CACHED_ID: Cell<Option<ThreadId>> = const { Cell::new(None) };
}

fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

/// Returns this thread's id, assigning the next free one on first call.
pub fn current_thread_id() -> Result<ThreadId, ProfilerError> {
    if let Some(id) = CACHED_ID.with(Cell::get) {
        return Ok(id);
    }
    registry().assign_next(None)
}

/// Returns this thread's registered name, assigning an id (and the default
/// name) on first call.
pub fn current_thread_name() -> Result<String, ProfilerError> {
    let id = current_thread_id()?;
    Ok(name_of(id))
}

/// Assigns an id and the given name to this thread.
///
/// Returns false (and ignores the name) if the thread already has an id, or
/// if no more threads can register.
pub fn assign_thread_name(name: &str) -> bool {
    if CACHED_ID.with(Cell::get).is_some() {
        return false;
    }
    match registry().assign_next(Some(name)) {
        Ok(_) => true,
        Err(err) => {
            log::warn!("could not name thread {name:?}: {err}");
            false
        }
    }
}

/// Number of threads that have registered so far.
pub fn registered_thread_count() -> usize {
    registry().inner.lock().unwrap().counter
}

/// Name of a registered thread; default "ThreadN" when none was assigned.
pub fn name_of(id: ThreadId) -> String {
    let inner = registry().inner.lock().unwrap();
    inner
        .names
        .get(id.0)
        .cloned()
        .unwrap_or_else(|| format!("Thread{}", id.0))
}
