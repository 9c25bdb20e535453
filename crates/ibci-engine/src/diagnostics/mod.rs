//! Diagnostic infrastructure shared by every compilation stage.
//!
//! All stages (lexer, scanner, resolver, parser, checker, scheduler)
//! report through one [`IssueTracker`]. Severities `Error` and above feed
//! the aggregated compile failure; `Fatal` aborts the current phase.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Stable diagnostic codes.
///
/// Codes are grouped by stage: `LEX_*` lexer, `PAR_*` parser,
/// `DEP_*` dependency analysis, `SEM_*` semantic analysis.
pub mod code {
    /// Unrecognized character in the input.
    pub const LEX_INVALID_CHAR: &str = "LEX_INVALID_CHAR";
    /// String literal not closed before end of line.
    pub const LEX_UNTERMINATED_STRING: &str = "LEX_UNTERMINATED_STRING";
    /// Malformed numeric literal.
    pub const LEX_INVALID_NUMBER: &str = "LEX_INVALID_NUMBER";
    /// Unexpected token during parsing.
    pub const PAR_EXPECTED_TOKEN: &str = "PAR_EXPECTED_TOKEN";
    /// Dedent to a column that matches no enclosing block.
    pub const PAR_INDENTATION_ERROR: &str = "PAR_INDENTATION_ERROR";
    /// Source file missing or unreadable.
    pub const DEP_FILE_NOT_FOUND: &str = "DEP_FILE_NOT_FOUND";
    /// Import names a module no probe candidate matches.
    pub const DEP_MODULE_NOT_FOUND: &str = "DEP_MODULE_NOT_FOUND";
    /// Import statement after non-import code.
    pub const DEP_INVALID_IMPORT_POSITION: &str = "DEP_INVALID_IMPORT_POSITION";
    /// Relative import level exceeds the package depth.
    pub const DEP_RELATIVE_LEVEL: &str = "DEP_RELATIVE_LEVEL";
    /// Resolved path escapes the project root.
    pub const DEP_SECURITY_VIOLATION: &str = "DEP_SECURITY_VIOLATION";
    /// Circular dependency between modules.
    pub const DEP_CYCLE: &str = "DEP_CYCLE";
    /// Name not found in any visible scope.
    pub const SEM_UNDEFINED_SYMBOL: &str = "SEM_UNDEFINED_SYMBOL";
    /// Value used where its type is not acceptable.
    pub const SEM_TYPE_MISMATCH: &str = "SEM_TYPE_MISMATCH";
}

/// Severity of a diagnostic.
///
/// Ordered: `Hint < Info < Warning < Error < Fatal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Hint,
    Info,
    Warning,
    Error,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Hint => write!(f, "hint"),
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
            Severity::Fatal => write!(f, "fatal"),
        }
    }
}

/// A position in a source file. Lines are 1-indexed, columns 0-indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Path of the file the diagnostic refers to.
    pub file: PathBuf,
    /// 1-indexed line number.
    pub line: u32,
    /// 0-indexed column number.
    pub column: u32,
}

impl Location {
    /// Create a location.
    pub fn new(file: impl Into<PathBuf>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// A single diagnostic produced by a compilation stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// How severe the problem is.
    pub severity: Severity,
    /// Stable code from [`code`].
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Where the problem was found, when attributable to a file.
    pub location: Option<Location>,
}

impl Diagnostic {
    /// Create a diagnostic with the given severity.
    pub fn new(severity: Severity, code: &str, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: code.to_string(),
            message: message.into(),
            location: None,
        }
    }

    /// Create an error diagnostic.
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(code: &str, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    /// Attach a source location.
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(
                f,
                "{}[{}]: {} ({})",
                self.severity, self.code, self.message, loc
            ),
            None => write!(f, "{}[{}]: {}", self.severity, self.code, self.message),
        }
    }
}

/// Collects diagnostics across files and stages.
///
/// The tracker never drops a diagnostic; callers snapshot counts before a
/// phase and diff afterwards to attribute new errors to that phase.
#[derive(Debug, Default, Clone)]
pub struct IssueTracker {
    diagnostics: Vec<Diagnostic>,
}

impl IssueTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Record an error with an optional location.
    pub fn error(&mut self, code: &str, message: impl Into<String>, location: Option<Location>) {
        let mut diag = Diagnostic::error(code, message);
        diag.location = location;
        self.report(diag);
    }

    /// Record a warning with an optional location.
    pub fn warning(&mut self, code: &str, message: impl Into<String>, location: Option<Location>) {
        let mut diag = Diagnostic::warning(code, message);
        diag.location = location;
        self.report(diag);
    }

    /// True when any diagnostic is `Error` or above.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity >= Severity::Error)
    }

    /// True when any diagnostic is `Fatal`.
    pub fn has_fatal(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Fatal)
    }

    /// Number of diagnostics at `Error` severity or above.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity >= Severity::Error)
            .count()
    }

    /// All diagnostics in insertion order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Diagnostics sorted by file, then line, then column.
    ///
    /// Unlocated diagnostics sort last. The sort is stable, so repeated
    /// runs over unchanged sources emit identical output.
    pub fn sorted(&self) -> Vec<Diagnostic> {
        let mut out = self.diagnostics.clone();
        out.sort_by(|a, b| match (&a.location, &b.location) {
            (Some(la), Some(lb)) => la
                .file
                .cmp(&lb.file)
                .then(la.line.cmp(&lb.line))
                .then(la.column.cmp(&lb.column)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        out
    }

    /// Number of diagnostics recorded.
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// True when nothing has been reported.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Drop all recorded diagnostics.
    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }
}
