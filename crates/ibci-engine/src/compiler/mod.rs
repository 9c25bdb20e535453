//! Multi-file compilation.
//!
//! Everything above the single-file parser lives here: resolving import
//! names to files, scanning dependencies, ordering the build, and the
//! scheduler that drives per-file compilation.

pub mod module;

pub use module::{
    BuildCache, CacheStats, CompileError, CompileReport, CompiledUnit, GraphError, ImportKind,
    ImportRecord, ModuleGraph, ModuleRecord, ModuleResolver, ResolveError, ScopeCache, Scheduler,
    SOURCE_EXTENSIONS,
};
