//! IBCI parser - lexical and syntactic analysis for IBCI source code.
//!
//! This module provides tokenization of the indentation-based surface
//! syntax, parsing into an AST with scope binding, and the semantic
//! checker that runs after a module has parsed.
//!
//! # Example
//!
//! ```ignore
//! use ibci_engine::parser::Lexer;
//!
//! let source = "\
//! func add(int a, int b) -> int:
//!     return a + b
//! ";
//!
//! let lexer = Lexer::new(source);
//! match lexer.tokenize() {
//!     Ok((tokens, _interner)) => {
//!         for (token, span) in tokens {
//!             println!("{:?} at {}:{}", token, span.line, span.column);
//!         }
//!     }
//!     Err(errors) => {
//!         for err in errors {
//!             eprintln!("{}", err);
//!         }
//!     }
//! }
//! ```

pub mod token;
pub mod lexer;
pub mod ast;
pub mod parser;
pub mod interner;

// Scopes and the type system shared by the parser and the checker
pub mod scope;
pub mod types;

pub mod checker;

// Re-exports for convenience
pub use token::{Token, Span};
pub use lexer::{Lexer, LexError};
pub use parser::{parse, Parser, ParseError};
pub use interner::{Interner, Symbol};

pub use scope::{ScopeId, SymbolId, SymbolKind, SymbolTable};
pub use types::Type;

pub use checker::SemanticAnalyzer;
