//! The compilation scheduler.
//!
//! `compile(entry)` drives the whole front end: breadth-first import
//! discovery from the entry file, cycle detection over the resulting
//! graph, then per-file parse and semantic analysis in topological
//! order with timestamp-based skipping. All cross-module state (symbol
//! arena, scope cache, build cache, diagnostics) lives here and
//! persists across calls, so a second run only redoes stale files.

use super::cache::{BuildCache, CacheStats, ScopeCache};
use super::graph::{GraphError, ModuleGraph};
use super::resolver::{ModuleResolver, ResolveError};
use super::scanner::ImportScanner;
use super::ModuleRecord;
use crate::diagnostics::{code, Diagnostic, IssueTracker, Location};
use crate::parser::ast;
use crate::parser::checker::SemanticAnalyzer;
use crate::parser::interner::Interner;
use crate::parser::lexer::Lexer;
use crate::parser::scope::{ScopeId, SymbolTable};
use crate::parser::token::{Span, Token};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure of a whole `compile()` run.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Discovery hit unreadable files or unresolvable imports.
    #[error("Discovery failed with {count} error(s)")]
    DiscoveryFailed {
        count: usize,
        diagnostics: Vec<Diagnostic>,
    },

    /// The import graph contains a cycle.
    #[error(transparent)]
    Cycle(#[from] GraphError),

    /// One or more files failed to parse or check.
    #[error("Compilation failed with {count} error(s)")]
    CompilationFailed {
        count: usize,
        diagnostics: Vec<Diagnostic>,
    },
}

impl CompileError {
    /// The diagnostics behind the failure, sorted by file, line, column.
    /// Empty for cycle errors, which carry the path instead.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            CompileError::DiscoveryFailed { diagnostics, .. }
            | CompileError::CompilationFailed { diagnostics, .. } => diagnostics,
            CompileError::Cycle(_) => &[],
        }
    }
}

/// The artifacts of one compiled module.
#[derive(Debug)]
pub struct CompiledUnit {
    /// Absolute canonical path.
    pub path: PathBuf,
    /// Dotted module name relative to the project root.
    pub name: String,
    pub ast: ast::Module,
    /// The module-level scope.
    pub scope: ScopeId,
}

/// Per-run counters returned by a successful [`Scheduler::compile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileReport {
    /// Modules reachable from the entry point.
    pub discovered: usize,
    /// Files parsed and checked this run.
    pub compiled: usize,
    /// Files skipped as fresh in the build cache.
    pub skipped: usize,
}

/// Drives multi-file compilation from an entry point.
pub struct Scheduler {
    resolver: ModuleResolver,
    symbols: SymbolTable,
    scopes: ScopeCache,
    modules: FxHashMap<PathBuf, ModuleRecord>,
    tokens: FxHashMap<PathBuf, (Vec<(Token, Span)>, Interner)>,
    units: FxHashMap<PathBuf, CompiledUnit>,
    build: BuildCache,
    tracker: IssueTracker,
}

impl Scheduler {
    pub fn new(resolver: ModuleResolver) -> Self {
        Self {
            resolver,
            symbols: SymbolTable::new(),
            scopes: ScopeCache::new(),
            modules: FxHashMap::default(),
            tokens: FxHashMap::default(),
            units: FxHashMap::default(),
            build: BuildCache::new(),
            tracker: IssueTracker::new(),
        }
    }

    /// Build a scheduler sandboxed to the given project root.
    pub fn with_root(root: impl AsRef<Path>) -> Result<Self, ResolveError> {
        Ok(Self::new(ModuleResolver::new(root)?))
    }

    /// Compile everything reachable from `entry`.
    ///
    /// Discovery failures abort before any file compiles. A cycle aborts
    /// with its exact path. Per-file compile failures do not stop the
    /// pass; they aggregate into one error after every file was
    /// attempted. A fatal diagnostic stops the pass at that file.
    pub fn compile(&mut self, entry: impl AsRef<Path>) -> Result<CompileReport, CompileError> {
        self.tracker.clear();

        let discovered = self.discover(entry.as_ref());
        if self.tracker.has_errors() {
            return Err(self.discovery_failure());
        }

        let graph = self.build_graph(&discovered);
        self.check_cycles(&graph)?;
        let order = graph.topological_order();

        let mut compiled = 0;
        let mut skipped = 0;
        for path in &order {
            let mtime = match self.modules.get(path) {
                Some(record) => record.mtime,
                None => continue,
            };
            if self.units.contains_key(path) && self.build.is_fresh(path, mtime) {
                skipped += 1;
                continue;
            }

            let before = self.tracker.error_count();
            self.compile_module(path);
            compiled += 1;
            // A failed file keeps its stale cache entry so the next run
            // retries it
            if self.tracker.error_count() == before {
                self.build.record(path.clone(), mtime);
            }
            if self.tracker.has_fatal() {
                break;
            }
        }

        if self.tracker.has_errors() {
            return Err(CompileError::CompilationFailed {
                count: self.tracker.error_count(),
                diagnostics: self.tracker.sorted(),
            });
        }

        Ok(CompileReport {
            discovered: discovered.len(),
            compiled,
            skipped,
        })
    }

    /// Discover from `entry` and return the topological compilation
    /// order without compiling anything.
    pub fn compilation_order(
        &mut self,
        entry: impl AsRef<Path>,
    ) -> Result<Vec<PathBuf>, CompileError> {
        self.tracker.clear();
        let discovered = self.discover(entry.as_ref());
        if self.tracker.has_errors() {
            return Err(self.discovery_failure());
        }
        let graph = self.build_graph(&discovered);
        self.check_cycles(&graph)?;
        Ok(graph.topological_order())
    }

    /// Every unit compiled so far, keyed by canonical path.
    pub fn units(&self) -> &FxHashMap<PathBuf, CompiledUnit> {
        &self.units
    }

    pub fn unit(&self, path: &Path) -> Option<&CompiledUnit> {
        self.units.get(path)
    }

    /// Diagnostics recorded by the most recent run.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.tracker.diagnostics()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.build.stats()
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    pub fn scopes(&self) -> &ScopeCache {
        &self.scopes
    }

    pub fn resolver(&self) -> &ModuleResolver {
        &self.resolver
    }

    /// Breadth-first walk of the import closure. Every failure becomes a
    /// diagnostic; the walk itself never aborts.
    fn discover(&mut self, entry: &Path) -> Vec<PathBuf> {
        let entry = match self.resolver.admit_file(entry) {
            Ok(entry) => entry,
            Err(err) => {
                self.tracker
                    .error(resolve_error_code(&err), err.to_string(), None);
                return Vec::new();
            }
        };

        let mut queue = VecDeque::from([entry]);
        let mut visited = FxHashSet::default();
        let mut discovered = Vec::new();

        while let Some(path) = queue.pop_front() {
            if !visited.insert(path.clone()) {
                continue;
            }
            if let Some(targets) = self.scan_module(&path) {
                discovered.push(path);
                queue.extend(targets);
            }
        }
        discovered
    }

    /// Read, tokenize, and scan one file, resolving its imports. Returns
    /// the resolved dependency paths to keep walking, or `None` when the
    /// file could not be read or tokenized.
    fn scan_module(&mut self, path: &Path) -> Option<Vec<PathBuf>> {
        let mtime = match fs::metadata(path).and_then(|meta| meta.modified()) {
            Ok(mtime) => mtime,
            Err(err) => {
                self.tracker.error(
                    code::DEP_FILE_NOT_FOUND,
                    format!("Failed to access '{}': {}", path.display(), err),
                    None,
                );
                return None;
            }
        };

        // An unchanged file keeps its record and tokens from the last run
        if let Some(record) = self.modules.get(path) {
            if record.mtime == mtime && self.tokens.contains_key(path) {
                return Some(
                    record
                        .imports
                        .iter()
                        .filter_map(|import| import.resolved.clone())
                        .collect(),
                );
            }
        }

        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                self.tracker.error(
                    code::DEP_FILE_NOT_FOUND,
                    format!("Failed to read '{}': {}", path.display(), err),
                    None,
                );
                return None;
            }
        };

        let (tokens, interner) = match Lexer::new(&source).tokenize() {
            Ok(result) => result,
            Err(errors) => {
                for err in &errors {
                    let span = err.span();
                    self.tracker.error(
                        err.code(),
                        err.message(),
                        Some(Location::new(path, span.line, span.column)),
                    );
                }
                return None;
            }
        };

        let mut imports =
            ImportScanner::new(&tokens, &interner, path, &mut self.tracker).scan();
        let mut targets = Vec::new();
        for import in &mut imports {
            match self.resolver.resolve(&import.module, path) {
                Ok(target) => {
                    targets.push(target.clone());
                    import.resolved = Some(target);
                }
                // A directory with no init file is a namespace package,
                // not a missing module; it brings no file to compile
                Err(ResolveError::ModuleNotFound { .. })
                    if self.resolver.is_package_directory(&import.module, path) => {}
                Err(err) => {
                    self.tracker.error(
                        resolve_error_code(&err),
                        err.to_string(),
                        Some(Location::new(path, import.line, 0)),
                    );
                }
            }
        }

        self.modules.insert(
            path.to_path_buf(),
            ModuleRecord {
                path: path.to_path_buf(),
                imports,
                source,
                mtime,
            },
        );
        self.tokens.insert(path.to_path_buf(), (tokens, interner));
        Some(targets)
    }

    fn build_graph(&self, discovered: &[PathBuf]) -> ModuleGraph {
        let mut graph = ModuleGraph::new();
        for path in discovered {
            graph.add_node(path.clone());
        }
        for path in discovered {
            if let Some(record) = self.modules.get(path) {
                for import in &record.imports {
                    if let Some(target) = &import.resolved {
                        graph.add_edge(path, target);
                    }
                }
            }
        }
        graph
    }

    fn check_cycles(&mut self, graph: &ModuleGraph) -> Result<(), GraphError> {
        if let Err(err) = graph.detect_cycles() {
            self.tracker.error(code::DEP_CYCLE, err.to_string(), None);
            return Err(err);
        }
        Ok(())
    }

    /// Parse and semantic-check one file, then register its scope in the
    /// cache under both its path and its dotted name.
    fn compile_module(&mut self, path: &Path) {
        let Some((tokens, interner)) = self.tokens.get(path) else {
            return;
        };
        let name = self.module_name(path);
        let package = package_name(path, &name);

        let module = crate::parser::parse(
            tokens,
            interner,
            &mut self.symbols,
            &self.scopes,
            &self.resolver,
            &mut self.tracker,
            path,
            &package,
        );
        SemanticAnalyzer::new(&mut self.symbols, &mut self.tracker, path).check_module(&module);

        let scope = module.scope;
        self.scopes.insert(path.to_path_buf(), name.clone(), scope);
        self.units.insert(
            path.to_path_buf(),
            CompiledUnit {
                path: path.to_path_buf(),
                name,
                ast: module,
                scope,
            },
        );
    }

    /// Dotted module name for a path: relative to the project root with
    /// separators as dots; an `__init__` file names its directory.
    fn module_name(&self, path: &Path) -> String {
        let relative = path
            .strip_prefix(self.resolver.project_root())
            .unwrap_or(path);
        let mut parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if let Some(last) = parts.last_mut() {
            if let Some(stem) = Path::new(last.as_str()).file_stem() {
                *last = stem.to_string_lossy().into_owned();
            }
        }
        if parts.last().map(String::as_str) == Some("__init__") {
            parts.pop();
        }
        parts.join(".")
    }

    fn discovery_failure(&self) -> CompileError {
        CompileError::DiscoveryFailed {
            count: self.tracker.error_count(),
            diagnostics: self.tracker.sorted(),
        }
    }
}

/// The package a module belongs to: its dotted name minus the last
/// segment. A package `__init__` belongs to the package it names.
fn package_name(path: &Path, name: &str) -> String {
    let is_init = path
        .file_stem()
        .map(|stem| stem == "__init__")
        .unwrap_or(false);
    if is_init {
        return name.to_string();
    }
    match name.rfind('.') {
        Some(dot) => name[..dot].to_string(),
        None => String::new(),
    }
}

fn resolve_error_code(err: &ResolveError) -> &'static str {
    match err {
        ResolveError::ModuleNotFound { .. } => code::DEP_MODULE_NOT_FOUND,
        ResolveError::SecurityViolation { .. } => code::DEP_SECURITY_VIOLATION,
        ResolveError::Io { .. } => code::DEP_FILE_NOT_FOUND,
    }
}
