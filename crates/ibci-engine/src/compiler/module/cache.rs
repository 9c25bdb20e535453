//! Compilation caches.
//!
//! [`ScopeCache`] is the registry of compiled module scopes, addressable
//! both by source path and by dotted module name. [`BuildCache`] holds
//! the modification timestamp recorded at the last successful compile of
//! each file and drives the skip decision on subsequent runs.

use crate::parser::scope::ScopeId;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Scope registry for compiled modules.
///
/// Recompiling a module re-inserts under the same keys, so lookups always
/// see the newest scope.
#[derive(Debug, Default)]
pub struct ScopeCache {
    by_path: FxHashMap<PathBuf, ScopeId>,
    by_name: FxHashMap<String, ScopeId>,
}

impl ScopeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module scope under its source path and dotted name.
    pub fn insert(&mut self, path: PathBuf, name: String, scope: ScopeId) {
        self.by_path.insert(path, scope);
        self.by_name.insert(name, scope);
    }

    pub fn get_by_path(&self, path: &Path) -> Option<ScopeId> {
        self.by_path.get(path).copied()
    }

    pub fn get_by_name(&self, name: &str) -> Option<ScopeId> {
        self.by_name.get(name).copied()
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_path.clear();
        self.by_name.clear();
    }
}

/// Per-file timestamp ledger for recompilation skips.
///
/// A file is fresh when its current modification time equals the recorded
/// one exactly. Equality rather than ordering: a file restored from
/// backup may move its mtime backwards and still needs a rebuild.
#[derive(Debug, Default)]
pub struct BuildCache {
    timestamps: FxHashMap<PathBuf, SystemTime>,
    hits: u64,
    misses: u64,
}

impl BuildCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the file at `path` is unchanged since its last recorded
    /// compile. Counts a hit or miss either way.
    pub fn is_fresh(&mut self, path: &Path, mtime: SystemTime) -> bool {
        match self.timestamps.get(path) {
            Some(recorded) if *recorded == mtime => {
                self.hits += 1;
                true
            }
            _ => {
                self.misses += 1;
                false
            }
        }
    }

    /// Record a successful compile of `path` at `mtime`. Callers skip
    /// this on failure so the file stays stale for the next run.
    pub fn record(&mut self, path: PathBuf, mtime: SystemTime) {
        self.timestamps.insert(path, mtime);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.timestamps.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}

/// Snapshot of build cache effectiveness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64
    }
}
