//! Module discovery, resolution, and scheduling.
//!
//! This is the multi-file half of the front end: resolving import names
//! to files inside the project sandbox, scanning leading imports,
//! building the dependency graph, and driving per-file compilation in
//! topological order with incremental skipping.

pub mod cache;
pub mod graph;
pub mod resolver;
pub mod scanner;
pub mod scheduler;

pub use cache::{BuildCache, CacheStats, ScopeCache};
pub use graph::{GraphError, ModuleGraph};
pub use resolver::{ModuleResolver, ResolveError, SOURCE_EXTENSIONS};
pub use scanner::ImportScanner;
pub use scheduler::{CompileError, CompileReport, CompiledUnit, Scheduler};

use std::path::PathBuf;
use std::time::SystemTime;

/// How an import was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// `import a.b [as c]`
    Plain,
    /// `from [.]*a.b import name, ...`
    From,
}

/// One import statement as the dependency scanner saw it.
///
/// `resolved` starts empty and is filled in exactly once by the
/// scheduler's resolution step; imports that fail to resolve keep `None`
/// and are excluded from the dependency graph (the failure is reported
/// separately).
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRecord {
    /// The module name as written, leading dots included.
    pub module: String,
    pub kind: ImportKind,
    /// 1-indexed source line of the statement.
    pub line: u32,
    pub resolved: Option<PathBuf>,
}

impl ImportRecord {
    pub fn new(module: impl Into<String>, kind: ImportKind, line: u32) -> Self {
        Self {
            module: module.into(),
            kind,
            line,
            resolved: None,
        }
    }
}

/// Everything the scheduler knows about one discovered file.
///
/// Replaced wholesale (never patched) when a rescan sees a newer
/// timestamp.
#[derive(Debug, Clone)]
pub struct ModuleRecord {
    /// Absolute canonical path.
    pub path: PathBuf,
    /// Imports in source order.
    pub imports: Vec<ImportRecord>,
    /// Raw source text.
    pub source: String,
    /// Last-modified time at scan.
    pub mtime: SystemTime,
}
