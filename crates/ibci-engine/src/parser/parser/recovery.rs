//! Error recovery for the parser.
//!
//! After a parse error the cursor is left wherever parsing stopped;
//! these routines skip ahead to a point where statement parsing can
//! resume, so one broken statement does not hide errors in the rest of
//! the file.

use super::guards::LoopGuard;
use super::Parser;
use crate::parser::token::Token;

/// Skip to the next statement boundary.
///
/// A boundary is a line end at the indentation depth where the error
/// occurred, or a statement-starting keyword at that depth. Indented
/// suites belonging to the broken statement are skipped whole.
pub fn sync_to_statement_boundary(parser: &mut Parser<'_>) {
    let mut guard = LoopGuard::new("statement_recovery");
    let mut depth: usize = 0;

    while !parser.at_eof() {
        if guard.check().is_err() {
            return;
        }

        match parser.current() {
            Token::Newline if depth == 0 => {
                parser.advance();
                // A suite opening here belongs to the broken statement
                if !parser.check(&Token::Indent) {
                    return;
                }
            }
            Token::Indent => {
                depth += 1;
                parser.advance();
            }
            Token::Dedent => {
                depth = depth.saturating_sub(1);
                parser.advance();
            }
            Token::Func
            | Token::Var
            | Token::If
            | Token::While
            | Token::For
            | Token::Return
            | Token::Pass
            | Token::Break
            | Token::Continue
            | Token::Import
            | Token::From
                if depth == 0 =>
            {
                return;
            }
            _ => {
                parser.advance();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::module::{ModuleResolver, ScopeCache};
    use crate::diagnostics::IssueTracker;
    use crate::parser::interner::Interner;
    use crate::parser::lexer::Lexer;
    use crate::parser::scope::SymbolTable;
    use crate::parser::token::Span;
    use tempfile::TempDir;

    fn lex(source: &str) -> (Vec<(Token, Span)>, Interner) {
        Lexer::new(source).tokenize().unwrap()
    }

    #[test]
    fn test_sync_stops_at_next_line() {
        let dir = TempDir::new().unwrap();
        let resolver = ModuleResolver::new(dir.path()).unwrap();
        let scopes = ScopeCache::new();
        let mut symbols = SymbolTable::new();
        let mut tracker = IssueTracker::new();
        let (tokens, interner) = lex("= + =\nvar x = 1\n");
        let file = dir.path().join("t.ibci");

        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            depth: 0,
            interner: &interner,
            symbols: &mut symbols,
            scopes: &scopes,
            resolver: &resolver,
            tracker: &mut tracker,
            file: &file,
            package: "",
        };

        sync_to_statement_boundary(&mut parser);
        assert!(matches!(parser.current(), Token::Var));
    }

    #[test]
    fn test_sync_skips_indented_suite() {
        let dir = TempDir::new().unwrap();
        let resolver = ModuleResolver::new(dir.path()).unwrap();
        let scopes = ScopeCache::new();
        let mut symbols = SymbolTable::new();
        let mut tracker = IssueTracker::new();
        // Simulates recovery from a broken block header: the indented
        // body must be skipped whole
        let (tokens, interner) = lex("if x +\n    pass\n    pass\nreturn 1\n");
        let file = dir.path().join("t.ibci");

        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            depth: 0,
            interner: &interner,
            symbols: &mut symbols,
            scopes: &scopes,
            resolver: &resolver,
            tracker: &mut tracker,
            file: &file,
            package: "",
        };

        // Step past the broken header tokens the way a failed parse
        // would have
        parser.advance();
        parser.advance();
        parser.advance();

        sync_to_statement_boundary(&mut parser);
        assert!(matches!(parser.current(), Token::Return));
    }
}
