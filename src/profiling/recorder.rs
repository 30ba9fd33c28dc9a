//! Per-thread interval capture, frame ledger and snapshot extraction.
//!
//! The hot path (`enter`/`exit`) touches only thread-local state plus an
//! acquire-load of the recording flag; committing a completed event takes the
//! owning thread's record spinlock for a single queue append. Cross-thread
//! coordination happens only in `collect`, which stops recording and drains
//! everything under the catalog, frame and record locks.
//!
//! The active stack is maintained even while recording is off so that call
//! depth stays correct if recording is enabled mid-run.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use log::warn;

use crate::clock;
use crate::domain::{FrameData, RecordedEvent, ScopeInfo, ThreadId};
use crate::sync::SpinLock;
use crate::trace_data::ProfilerResults;

use super::{catalog, registry};

/// Pre-reserved capacity of each thread's active stack; keeps the hot path
/// free of reallocation for any sane nesting depth.
const ACTIVE_STACK_RESERVE: usize = 256;

struct ThreadSlot {
    records: SpinLock<VecDeque<RecordedEvent>>,
}

struct FrameLedger {
    number: u64,
    frames: VecDeque<FrameData>,
}

struct ProfilerCore {
    recording: AtomicBool,
    frames: SpinLock<FrameLedger>,
    threads: Vec<ThreadSlot>,
}

static CORE: OnceLock<ProfilerCore> = OnceLock::new();

fn core() -> &'static ProfilerCore {
    CORE.get_or_init(|| ProfilerCore {
        recording: AtomicBool::new(false),
        frames: SpinLock::new(FrameLedger { number: 0, frames: VecDeque::new() }),
        threads: (0..registry::MAX_PROFILED_THREADS)
            .map(|_| ThreadSlot { records: SpinLock::new(VecDeque::new()) })
            .collect(),
    })
}

struct ActiveState {
    /// Current open-scope count minus one, so the first enter lands at 0.
    depth: i32,
    stack: Vec<RecordedEvent>,
    #[cfg(feature = "cookie")]
    next_cookie: u64,
    registry_warned: bool,
}

impl ActiveState {
    fn new() -> Self {
        Self {
            depth: -1,
            stack: Vec::with_capacity(ACTIVE_STACK_RESERVE),
            #[cfg(feature = "cookie")]
            next_cookie: 0,
            registry_warned: false,
        }
    }
}

thread_local! {
    static ACTIVE: RefCell<ActiveState> = RefCell::new(ActiveState::new());
}

pub(super) fn set_recording(state: bool) {
    core().recording.store(state, Ordering::Release);
}

pub(super) fn is_recording() -> bool {
    core().recording.load(Ordering::Acquire)
}

/// Opens a scope on the current thread.
pub(super) fn enter(info: &'static ScopeInfo) {
    let start = clock::now_ns();

    // try_with: a guard may drop during thread teardown, after this slot's
    // destructor already ran.
    let _ = ACTIVE.try_with(|state| {
        let mut state = state.borrow_mut();
        state.depth += 1;
        let event = RecordedEvent::started(info.key, state.depth, start);
        #[cfg(feature = "cookie")]
        let event = {
            let mut event = event;
            event.cookie = Some(state.next_cookie);
            state.next_cookie += 1;
            event
        };
        state.stack.push(event);
    });

    // Register lazily so the snapshot lists this thread even before any of
    // its scopes complete.
    let _ = registry::current_thread_id();
}

/// Closes the most recently opened scope on the current thread.
pub(super) fn exit(info: &'static ScopeInfo) {
    let _ = ACTIVE.try_with(|state| {
        let mut state = state.borrow_mut();

        let Some(mut event) = state.stack.pop() else {
            debug_assert!(false, "scope exit without a matching enter");
            warn!("scope exit without a matching enter for {:?}", info.name);
            return;
        };
        debug_assert_eq!(event.key, info.key, "scope enter/exit must be strictly LIFO");
        if event.key != info.key {
            warn!(
                "scope enter/exit mismatch: exiting {:?} but {} is on top of the stack",
                info.name, event.key
            );
        }
        state.depth -= 1;

        if is_recording() && event.is_valid() {
            event.end_ns = clock::now_ns();
            match registry::current_thread_id() {
                Ok(id) => {
                    let mut records = core().threads[id.0].records.lock();
                    records.push_back(event);
                }
                Err(err) => {
                    if !state.registry_warned {
                        state.registry_warned = true;
                        warn!("dropping recorded events on unregistered thread: {err}");
                    }
                }
            }
        }
    });
}

/// Closes the current frame and, while recording, opens the next one.
pub(super) fn next_frame() {
    let core = core();
    let mut ledger = core.frames.lock();

    let closed_number = ledger.number;
    ledger.number += 1;
    let now = clock::now_ns();

    if let Some(last) = ledger.frames.back_mut() {
        if last.number == closed_number {
            last.end_ns = now;
        }
    }

    if core.recording.load(Ordering::Acquire) {
        let number = ledger.number;
        ledger.frames.push_back(FrameData::started(number, now));
    }
}

/// The single atomic dump: stops recording, drains every queue and returns
/// an immutable, self-consistent bundle. After this returns the profiler is
/// empty; re-enabling recording starts a fresh session.
pub(super) fn collect() -> ProfilerResults {
    let core = core();
    set_recording(false);

    let mut frames;
    let scopes: HashMap<_, _>;
    let mut events = Vec::new();
    let mut thread_names = Vec::new();
    {
        // Lock order: catalog, then frames, then each thread's record lock.
        // Holding the first two across the whole drain keeps a concurrent
        // re-enable from interleaving fresh data into a half-drained dump.
        let catalog_map = catalog::global().lock();
        let mut ledger = core.frames.lock();

        frames = std::mem::take(&mut ledger.frames);
        scopes = catalog_map.iter().map(|(key, info)| (*key, (*info).clone())).collect();

        let thread_count = registry::registered_thread_count();
        events.reserve(thread_count);
        thread_names.reserve(thread_count);
        for index in 0..thread_count {
            let mut records = core.threads[index].records.lock();
            events.push(std::mem::take(&mut *records));
            thread_names.push(registry::name_of(ThreadId(index)));
        }
    }

    let tags = super::collect_tag_table();

    let any_records = events.iter().any(|queue| !queue.is_empty());

    let frame_data_missing = if frames.is_empty() && !any_records {
        frames.push_back(FrameData { number: 0, start_ns: 0, end_ns: 1 });
        true
    } else if frames.is_empty() {
        let mut first = i64::MAX;
        let mut last = i64::MIN;
        for queue in &events {
            for event in queue {
                first = first.min(event.start_ns);
                last = last.max(event.start_ns);
            }
        }
        debug_assert!(first != i64::MAX && last != i64::MIN);
        frames.push_back(FrameData { number: 0, start_ns: first, end_ns: last });
        true
    } else {
        if let Some(last) = frames.back_mut() {
            if !last.is_complete() {
                last.end_ns = clock::now_ns();
            }
        }
        false
    };

    for queue in &mut events {
        if queue.len() > 1 {
            queue.make_contiguous().sort_by_key(|event| event.start_ns);
        }
    }

    ProfilerResults {
        frames,
        scopes,
        tags,
        events,
        thread_names,
        frame_data_missing,
        any_records,
        with_cookie: cfg!(feature = "cookie"),
    }
}
