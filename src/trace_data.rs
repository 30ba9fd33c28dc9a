//! The immutable results bundle produced by the snapshot extractor.
//!
//! A `ProfilerResults` owns everything a viewer needs: the frame ledger, the
//! deduplicated scope table, the tag table and one sorted event queue per
//! registered thread. Bundles round-trip through the binary results format
//! and render as a text report or a Chrome trace.

use std::collections::{HashMap, VecDeque};
use std::path::Path;

use crate::domain::{FrameData, RecordedEvent, ScopeInfo, ScopeKey, TagEntry, ThreadId};
use crate::export::{binary, text_report};
use crate::export::text_report::DurationUnit;

/// Everything recorded between `set_recording(true)` and the snapshot,
/// immutable once returned.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfilerResults {
    pub(crate) frames: VecDeque<FrameData>,
    pub(crate) scopes: HashMap<ScopeKey, ScopeInfo>,
    pub(crate) tags: Vec<TagEntry>,
    pub(crate) events: Vec<VecDeque<RecordedEvent>>,
    pub(crate) thread_names: Vec<String>,
    pub(crate) frame_data_missing: bool,
    pub(crate) any_records: bool,
    pub(crate) with_cookie: bool,
}

impl ProfilerResults {
    /// The bundle a disabled profiler produces: no threads, no events, a
    /// single synthetic `[0, 1)` frame.
    #[cfg(not(feature = "profiling"))]
    pub(crate) fn synthetic_empty(tags: Vec<TagEntry>, with_cookie: bool) -> Self {
        let mut frames = VecDeque::new();
        frames.push_back(FrameData { number: 0, start_ns: 0, end_ns: 1 });
        Self {
            frames,
            scopes: HashMap::new(),
            tags,
            events: Vec::new(),
            thread_names: Vec::new(),
            frame_data_missing: true,
            any_records: false,
            with_cookie,
        }
    }

    /// The recorded frames, in order, with strictly increasing numbers.
    pub fn frames(&self) -> &VecDeque<FrameData> {
        &self.frames
    }

    /// Events of one thread, sorted by start time.
    ///
    /// `thread` must be below [`thread_count`](Self::thread_count).
    pub fn events(&self, thread: ThreadId) -> &VecDeque<RecordedEvent> {
        &self.events[thread.0]
    }

    /// Metadata for every scope key referenced by any event in the bundle.
    pub fn scopes(&self) -> &HashMap<ScopeKey, ScopeInfo> {
        &self.scopes
    }

    /// Tag table, indexed by tag value.
    pub fn tags(&self) -> &[TagEntry] {
        &self.tags
    }

    /// Number of threads captured in the bundle.
    pub fn thread_count(&self) -> usize {
        self.thread_names.len()
    }

    /// Registered name of a captured thread.
    ///
    /// `thread` must be below [`thread_count`](Self::thread_count).
    pub fn thread_name(&self, thread: ThreadId) -> &str {
        &self.thread_names[thread.0]
    }

    /// True when no frame boundaries were recorded and the single frame in
    /// the bundle is synthetic.
    pub fn is_frame_data_missing(&self) -> bool {
        self.frame_data_missing
    }

    /// True when at least one thread recorded at least one event.
    pub fn has_any_records(&self) -> bool {
        self.any_records
    }

    /// Whether events carry cookies (and the file format includes them).
    pub fn with_cookie(&self) -> bool {
        self.with_cookie
    }

    /// Serializes the bundle to `path` in the binary results format.
    ///
    /// Returns false on any I/O error; the cause is logged.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> bool {
        binary::write_to_file(self, path.as_ref())
    }

    /// Reads a bundle back from the binary results format.
    ///
    /// Returns `None` if the file cannot be opened, the magic bytes or
    /// version do not match, or the data is truncated; the cause is logged.
    pub fn load_from_file(path: impl AsRef<Path>) -> Option<ProfilerResults> {
        binary::load_from_file(path.as_ref())
    }

    /// Renders the human-readable report with millisecond durations.
    pub fn write_to_string(&self) -> String {
        text_report::render(self, DurationUnit::Millis)
    }

    /// Renders the human-readable report in the given duration unit.
    pub fn write_report(&self, unit: DurationUnit) -> String {
        text_report::render(self, unit)
    }
}
