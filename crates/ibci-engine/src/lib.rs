//! IBCI Language Engine
//!
//! This crate provides the IBCI language front end:
//! - **Parser**: Lexer, parser, scope tree, and type checker (`parser` module)
//! - **Compiler**: Module resolution, dependency analysis, and the
//!   multi-file compilation scheduler (`compiler` module)
//! - **Diagnostics**: Structured issue tracking shared by every stage
//!   (`diagnostics` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use ibci_engine::compiler::Scheduler;
//!
//! let mut scheduler = Scheduler::with_root("/path/to/project")?;
//! scheduler.compile("/path/to/project/main.ibci")?;
//! for (path, unit) in scheduler.units() {
//!     println!("{} -> module '{}'", path.display(), unit.name);
//! }
//! ```

#![warn(rust_2018_idioms)]

/// Diagnostics module: severities, locations, and the shared issue tracker
pub mod diagnostics;

/// Parser module: lexer, AST, scope tree, parser, and type checker
pub mod parser;

/// Compiler module: module resolution, dependency graph, and scheduler
pub mod compiler;

// Re-exports for convenience
pub use compiler::{CompileError, CompiledUnit, ModuleResolver, Scheduler};
pub use diagnostics::{Diagnostic, IssueTracker, Location, Severity};
