//! Scope-timing profiler: public facade
//!
//! Capture is organized around four pieces:
//! - `registry`: dense thread ids + names, cached in TLS after first use
//! - `catalog`: interned scope metadata, deduplicated by 32-bit key
//! - `recorder`: per-thread interval capture, frame ledger, snapshot dump
//! - this module: the stable API surface plus the [`profile_scope!`] sugar
//!
//! The `profiling` cargo feature is the master enable. Without it the
//! functions here compile to no-ops: the guard is an empty token,
//! enter/exit are free, `insert_scope_info` hands back a shared placeholder
//! without interning anything, and `get_status` reports
//! [`ProfilerStatus::Disabled`]. Loading, reporting and exporting
//! previously captured results keep working.
//!
//! ```no_run
//! use stint::profiling;
//!
//! profiling::set_recording(true);
//! {
//!     stint::profile_scope!("load_assets");
//!     // work...
//! }
//! profiling::mark_next_frame();
//! let results = profiling::get_results();
//! println!("{}", results.write_to_string());
//! ```

#[cfg(feature = "profiling")]
pub(crate) mod catalog;
#[cfg(feature = "profiling")]
mod recorder;
#[cfg(feature = "profiling")]
mod registry;

use std::marker::PhantomData;
use std::sync::OnceLock;

use crate::domain::{ProfilerError, Tag, TagColor, TagEntry, ThreadId};
use crate::trace_data::ProfilerResults;

pub use crate::domain::ScopeInfo;

#[cfg(feature = "profiling")]
pub use registry::MAX_PROFILED_THREADS;
/// How many threads the profiler tracks. Compile-time constant, must be >= 1.
#[cfg(not(feature = "profiling"))]
pub const MAX_PROFILED_THREADS: usize = 16;

/// Answer of [`get_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfilerStatus {
    /// The crate was built without the `profiling` feature.
    Disabled,
    EnabledAndNotRecording,
    EnabledAndRecording,
}

/// Application-supplied tag table: a closed enumeration `0..count()` where
/// index 0 is the untagged sentinel. The profiler only stores, serializes and
/// returns what the palette reports.
pub trait TagPalette: Send + Sync {
    /// Exclusive upper bound of valid tag values.
    fn count(&self) -> u32;
    fn name(&self, tag: Tag) -> &str;
    fn color(&self, tag: Tag) -> TagColor;
}

struct DefaultPalette;

impl TagPalette for DefaultPalette {
    fn count(&self) -> u32 {
        1
    }

    fn name(&self, _tag: Tag) -> &str {
        "Untagged"
    }

    fn color(&self, _tag: Tag) -> TagColor {
        TagColor::WHITE
    }
}

static TAG_PALETTE: OnceLock<Box<dyn TagPalette>> = OnceLock::new();
static DEFAULT_PALETTE: DefaultPalette = DefaultPalette;

/// Installs the application's tag palette. Returns false if one was already
/// installed (the first installation wins).
pub fn set_tag_palette(palette: Box<dyn TagPalette>) -> bool {
    TAG_PALETTE.set(palette).is_ok()
}

fn tag_palette() -> &'static dyn TagPalette {
    match TAG_PALETTE.get() {
        Some(palette) => palette.as_ref(),
        None => &DEFAULT_PALETTE,
    }
}

pub(crate) fn collect_tag_table() -> Vec<TagEntry> {
    let palette = tag_palette();
    (0..palette.count())
        .map(|value| {
            let tag = Tag(value);
            TagEntry { name: palette.name(tag).to_string(), color: palette.color(tag) }
        })
        .collect()
}

/// The single entry handed out while profiling is compiled out, so the
/// disabled path never locks a catalog or allocates metadata.
#[cfg(not(feature = "profiling"))]
static DISABLED_SCOPE_INFO: ScopeInfo = ScopeInfo {
    key: crate::domain::ScopeKey(0),
    tag: Tag::NONE,
    name: String::new(),
    function: String::new(),
    file: String::new(),
    line: 0,
};

/// Interns scope metadata, returning a reference that is valid for the rest
/// of the process. Call sites cache it (see [`profile_scope!`]); repeated
/// inserts with the same `identifier` return the original entry.
///
/// Without the `profiling` feature this interns nothing and returns a shared
/// placeholder.
pub fn insert_scope_info(
    name: &str,
    identifier: &str,
    function: &str,
    file: &str,
    line: u32,
    tag: Tag,
) -> &'static ScopeInfo {
    #[cfg(feature = "profiling")]
    {
        catalog::global().insert(name, identifier, function, file, line, tag)
    }
    #[cfg(not(feature = "profiling"))]
    {
        let _ = (name, identifier, function, file, line, tag);
        &DISABLED_SCOPE_INFO
    }
}

/// Closes its scope when dropped. Not `Send`: the exit must happen on the
/// thread that entered. Without the `profiling` feature this is an empty
/// token whose drop does nothing.
#[must_use = "the scope closes when the guard is dropped"]
pub struct ScopeGuard {
    #[cfg(feature = "profiling")]
    info: &'static ScopeInfo,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        #[cfg(feature = "profiling")]
        recorder::exit(self.info);
    }
}

/// Opens a scope on the current thread and returns the guard that closes it.
pub fn scope_enter(info: &'static ScopeInfo) -> ScopeGuard {
    #[cfg(feature = "profiling")]
    recorder::enter(info);
    #[cfg(not(feature = "profiling"))]
    let _ = info;
    ScopeGuard {
        #[cfg(feature = "profiling")]
        info,
        _not_send: PhantomData,
    }
}

/// Returns this thread's profiler id, assigning the next free one on first
/// call from this thread.
pub fn current_thread_id() -> Result<ThreadId, ProfilerError> {
    #[cfg(feature = "profiling")]
    {
        registry::current_thread_id()
    }
    #[cfg(not(feature = "profiling"))]
    {
        Err(ProfilerError::Disabled)
    }
}

/// Returns this thread's registered name, registering the thread first if
/// needed.
pub fn current_thread_name() -> Result<String, ProfilerError> {
    #[cfg(feature = "profiling")]
    {
        registry::current_thread_name()
    }
    #[cfg(not(feature = "profiling"))]
    {
        Err(ProfilerError::Disabled)
    }
}

/// Assigns an id and a name to the current thread. Returns false if the
/// thread already registered (the name is ignored, not an error).
pub fn assign_thread_name(name: &str) -> bool {
    #[cfg(feature = "profiling")]
    {
        registry::assign_thread_name(name)
    }
    #[cfg(not(feature = "profiling"))]
    {
        let _ = name;
        false
    }
}

/// Number of threads that have registered with the profiler.
pub fn registered_thread_count() -> usize {
    #[cfg(feature = "profiling")]
    {
        registry::registered_thread_count()
    }
    #[cfg(not(feature = "profiling"))]
    {
        0
    }
}

/// Enables or disables recording. Toggling never blocks; the flag is read
/// with acquire ordering by every thread on scope exit.
pub fn set_recording(state: bool) {
    #[cfg(feature = "profiling")]
    recorder::set_recording(state);
    #[cfg(not(feature = "profiling"))]
    let _ = state;
}

pub fn get_status() -> ProfilerStatus {
    #[cfg(feature = "profiling")]
    {
        if recorder::is_recording() {
            ProfilerStatus::EnabledAndRecording
        } else {
            ProfilerStatus::EnabledAndNotRecording
        }
    }
    #[cfg(not(feature = "profiling"))]
    {
        ProfilerStatus::Disabled
    }
}

/// Closes the current frame and, while recording, opens the next one.
pub fn mark_next_frame() {
    #[cfg(feature = "profiling")]
    recorder::next_frame();
}

/// Stops recording, drains all captured data and returns it as an immutable
/// bundle. Do not re-enable recording concurrently with this call.
pub fn get_results() -> ProfilerResults {
    #[cfg(feature = "profiling")]
    {
        recorder::collect()
    }
    #[cfg(not(feature = "profiling"))]
    {
        ProfilerResults::synthetic_empty(collect_tag_table(), cfg!(feature = "cookie"))
    }
}

/// Profiles the lexical scope it appears in.
///
/// Interns the scope metadata once per call site (keyed by `file:line`),
/// caches the reference in a hidden `static` and binds a [`ScopeGuard`] that
/// records the interval when the surrounding scope ends on any exit path.
///
/// ```no_run
/// fn simulate() {
///     stint::profile_scope!("simulate");
///     // ...
/// }
/// ```
#[macro_export]
macro_rules! profile_scope {
    ($name:expr) => {
        $crate::profile_scope!($name, $crate::domain::Tag::NONE);
    };
    ($name:expr, $tag:expr) => {
        let _stint_scope_guard = {
            static SCOPE_INFO: ::std::sync::OnceLock<&'static $crate::profiling::ScopeInfo> =
                ::std::sync::OnceLock::new();
            let info = *SCOPE_INFO.get_or_init(|| {
                $crate::profiling::insert_scope_info(
                    $name,
                    concat!(file!(), ":", line!()),
                    module_path!(),
                    file!(),
                    line!(),
                    $tag,
                )
            });
            $crate::profiling::scope_enter(info)
        };
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_palette_is_a_single_untagged_entry() {
        let palette = DefaultPalette;
        assert_eq!(palette.count(), 1);
        assert_eq!(palette.name(Tag::NONE), "Untagged");
        assert_eq!(palette.color(Tag::NONE), TagColor::WHITE);
    }

    #[cfg(feature = "profiling")]
    #[test]
    fn insert_scope_info_dedups_by_identifier() {
        let first = insert_scope_info("update", "facade.rs:1", "update", "facade.rs", 1, Tag::NONE);
        let second = insert_scope_info("update", "facade.rs:1", "update", "facade.rs", 1, Tag::NONE);
        assert!(std::ptr::eq(first, second));
    }
}
