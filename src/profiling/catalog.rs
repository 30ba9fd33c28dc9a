//! Scope catalog: interned, deduplicated scope metadata.
//!
//! Call sites cache the `&'static ScopeInfo` returned by the first insert, so
//! entries must stay at a stable address for the rest of the process. The
//! catalog leaks each record on first insert (there is no teardown; the OS
//! reclaims the memory at exit) and hands out references to the leaked value.

use std::collections::HashMap;
use std::sync::OnceLock;

use log::warn;

use crate::domain::{ScopeInfo, ScopeKey, Tag};
use crate::sync::{SpinLock, SpinLockGuard};

/// FNV-1a, 32 bit. The scope key must be stable across runs and platforms
/// because it is written into the results format; `std::hash` gives no such
/// guarantee. This function is the single place to swap the key hash.
pub(crate) fn scope_key_hash(identifier: &str) -> u32 {
    const OFFSET_BASIS: u32 = 0x811c_9dc5;
    const PRIME: u32 = 16_777_619;

    let mut hash = OFFSET_BASIS;
    for byte in identifier.as_bytes() {
        hash ^= u32::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

pub(crate) struct ScopeCatalog {
    map: SpinLock<HashMap<ScopeKey, &'static ScopeInfo>>,
}

impl ScopeCatalog {
    pub(crate) fn new() -> Self {
        Self { map: SpinLock::new(HashMap::new()) }
    }

    /// Interns scope metadata, returning a stable reference.
    ///
    /// Repeated inserts with the same identifier return the original entry
    /// without copying the strings again; the metadata of the first insert
    /// wins.
    pub(crate) fn insert(
        &self,
        name: &str,
        identifier: &str,
        function: &str,
        file: &str,
        line: u32,
        tag: Tag,
    ) -> &'static ScopeInfo {
        let key = ScopeKey(scope_key_hash(identifier));

        let mut map = self.map.lock();
        if let Some(existing) = map.get(&key) {
            if existing.line != line || existing.file != file {
                // Two distinct call sites hashed to the same key. First
                // insertion wins, matching the on-disk dedup semantics.
                warn!(
                    "scope key collision: {} ({}:{}) already registered as {}:{}",
                    key, file, line, existing.file, existing.line
                );
            }
            return existing;
        }

        let info: &'static ScopeInfo = Box::leak(Box::new(ScopeInfo {
            key,
            tag,
            name: name.to_string(),
            function: function.to_string(),
            file: file.to_string(),
            line,
        }));
        map.insert(key, info);
        info
    }

    /// Exposes the underlying map for the snapshot extractor, which must
    /// hold this lock while it drains the frame ledger and thread queues.
    pub(crate) fn lock(&self) -> SpinLockGuard<'_, HashMap<ScopeKey, &'static ScopeInfo>> {
        self.map.lock()
    }
}

static CATALOG: OnceLock<ScopeCatalog> = OnceLock::new();

pub(crate) fn global() -> &'static ScopeCatalog {
    CATALOG.get_or_init(ScopeCatalog::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_of_empty_string_is_the_offset_basis() {
        assert_eq!(scope_key_hash(""), 0x811c_9dc5);
    }

    #[test]
    fn hash_is_deterministic_and_spreads() {
        assert_eq!(scope_key_hash("a.rs:10"), scope_key_hash("a.rs:10"));
        assert_ne!(scope_key_hash("a.rs:10"), scope_key_hash("a.rs:11"));
    }

    #[test]
    fn repeated_insert_returns_the_same_entry() {
        let catalog = ScopeCatalog::new();
        let first = catalog.insert("tick", "game.rs:42", "tick", "game.rs", 42, Tag::NONE);
        let second = catalog.insert("tick", "game.rs:42", "tick", "game.rs", 42, Tag::NONE);

        assert!(std::ptr::eq(first, second));
        assert_eq!(first.key, second.key);
        assert_eq!(first.name, "tick");
    }

    #[test]
    fn distinct_identifiers_get_distinct_keys() {
        let catalog = ScopeCatalog::new();
        let a = catalog.insert("a", "x.rs:1", "f", "x.rs", 1, Tag::NONE);
        let b = catalog.insert("b", "x.rs:2", "g", "x.rs", 2, Tag(1));

        assert_ne!(a.key, b.key);
        assert_eq!(catalog.lock().len(), 2);
    }
}
