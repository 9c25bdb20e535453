//! Leading-import scanning over a raw token stream.
//!
//! Discovery needs each file's imports before anything parses, so the
//! scanner walks the token stream directly and reuses the parser's
//! import grammar ([`parse_import_clause`]) to read each statement. No
//! AST is built and no symbols are bound.

use super::{ImportKind, ImportRecord};
use crate::diagnostics::{code, IssueTracker, Location};
use crate::parser::interner::Interner;
use crate::parser::parser::import::{parse_import_clause, ImportClause, TokenCursor};
use crate::parser::token::{Span, Token};
use std::path::Path;

/// Extracts [`ImportRecord`]s from one file's token stream.
///
/// Imports are only legal before the first non-import statement; a later
/// import is reported and skipped. Malformed imports are skipped without
/// a report here since the full parse of the same file will diagnose
/// them.
pub struct ImportScanner<'a> {
    cursor: TokenCursor<'a>,
    file: &'a Path,
    tracker: &'a mut IssueTracker,
}

impl<'a> ImportScanner<'a> {
    pub fn new(
        tokens: &'a [(Token, Span)],
        interner: &'a Interner,
        file: &'a Path,
        tracker: &'a mut IssueTracker,
    ) -> Self {
        Self {
            cursor: TokenCursor::new(tokens, interner),
            file,
            tracker,
        }
    }

    /// Scan the whole stream and return the import records in source
    /// order. Every arm advances the cursor, so the walk terminates.
    pub fn scan(mut self) -> Vec<ImportRecord> {
        let mut records = Vec::new();
        let mut imports_allowed = true;

        while !self.cursor.at_eof() {
            match self.cursor.current() {
                Token::Newline | Token::Indent | Token::Dedent => {
                    self.cursor.advance();
                }
                Token::Import | Token::From => {
                    if !imports_allowed {
                        self.report_position(self.cursor.current_span());
                        self.skip_line();
                        continue;
                    }
                    match parse_import_clause(&mut self.cursor) {
                        Ok(clause) => append_records(&mut records, clause),
                        Err(_) => self.skip_line(),
                    }
                }
                _ => {
                    imports_allowed = false;
                    self.cursor.advance();
                }
            }
        }
        records
    }

    /// Skip to the next line break, consuming it.
    fn skip_line(&mut self) {
        while !self.cursor.at_eof() {
            if self.cursor.eat(&Token::Newline) {
                return;
            }
            self.cursor.advance();
        }
    }

    fn report_position(&mut self, span: Span) {
        self.tracker.error(
            code::DEP_INVALID_IMPORT_POSITION,
            "Imports must appear before any other statement",
            Some(Location::new(self.file, span.line, span.column)),
        );
    }
}

/// Turn one clause into records: plain imports yield one record per
/// dotted name, from-imports a single record with the dot prefix
/// reconstructed.
fn append_records(records: &mut Vec<ImportRecord>, clause: ImportClause) {
    match clause {
        ImportClause::Plain { names, .. } => {
            for alias in names {
                records.push(ImportRecord::new(
                    alias.name,
                    ImportKind::Plain,
                    alias.span.line,
                ));
            }
        }
        ImportClause::From {
            module,
            level,
            span,
            ..
        } => {
            let mut name = ".".repeat(level as usize);
            name.push_str(&module);
            records.push(ImportRecord::new(name, ImportKind::From, span.line));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::Lexer;
    use std::path::PathBuf;

    fn scan(source: &str) -> (Vec<ImportRecord>, IssueTracker) {
        let (tokens, interner) = Lexer::new(source).tokenize().unwrap();
        let mut tracker = IssueTracker::new();
        let file = PathBuf::from("main.ibci");
        let records = ImportScanner::new(&tokens, &interner, &file, &mut tracker).scan();
        (records, tracker)
    }

    #[test]
    fn test_scans_leading_imports() {
        let (records, tracker) = scan("import alpha\nimport beta.gamma\nvar x = 1\n");
        assert!(!tracker.has_errors());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].module, "alpha");
        assert_eq!(records[0].kind, ImportKind::Plain);
        assert_eq!(records[0].line, 1);
        assert_eq!(records[1].module, "beta.gamma");
        assert_eq!(records[1].line, 2);
    }

    #[test]
    fn test_plain_import_yields_record_per_name() {
        let (records, _) = scan("import a, b.c as bc\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].module, "a");
        assert_eq!(records[1].module, "b.c");
    }

    #[test]
    fn test_from_import_reconstructs_dot_prefix() {
        let (records, _) = scan("from ..pkg.geo import area, perimeter\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].module, "..pkg.geo");
        assert_eq!(records[0].kind, ImportKind::From);
    }

    #[test]
    fn test_from_dot_only() {
        let (records, _) = scan("from . import helper\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].module, ".");
    }

    #[test]
    fn test_star_import_records_module() {
        let (records, _) = scan("from utils import *\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].module, "utils");
    }

    #[test]
    fn test_import_after_code_is_reported_and_skipped() {
        let (records, tracker) = scan("var x = 1\nimport late\n");
        assert!(records.is_empty());
        assert_eq!(tracker.error_count(), 1);
        let diagnostic = &tracker.diagnostics()[0];
        assert_eq!(diagnostic.code, code::DEP_INVALID_IMPORT_POSITION);
        assert_eq!(diagnostic.location.as_ref().unwrap().line, 2);
    }

    #[test]
    fn test_import_inside_block_is_reported() {
        let (records, tracker) = scan("if x:\n    import hidden\n");
        assert!(records.is_empty());
        assert_eq!(tracker.error_count(), 1);
    }

    #[test]
    fn test_malformed_import_recovers_silently() {
        // The broken first line is the parser's to report; scanning just
        // moves past it and keeps the rest
        let (records, tracker) = scan("import \nimport fine\n");
        assert!(!tracker.has_errors());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].module, "fine");
    }

    #[test]
    fn test_blank_lines_do_not_end_import_block() {
        let (records, tracker) = scan("import a\n\n\nimport b\n");
        assert!(!tracker.has_errors());
        assert_eq!(records.len(), 2);
    }
}
