//! Recursive-descent parser for the offside-rule token stream.
//!
//! Statements, expressions, and import handling live in their own
//! submodules as free functions over the shared [`Parser`] state. The
//! parser defines symbols while it walks: declarations land in the
//! current scope, imports wire module symbols to scopes already
//! registered in the scope cache.

pub mod expr;
pub mod guards;
pub mod import;
pub mod recovery;
pub mod stmt;

use crate::compiler::module::{ModuleResolver, ScopeCache};
use crate::diagnostics::{code, IssueTracker, Location};
use crate::parser::ast::Module;
use crate::parser::interner::Interner;
use crate::parser::scope::SymbolTable;
use crate::parser::token::{Span, Token};
use std::path::Path;
use thiserror::Error;

/// A parse failure local to one statement or expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("{message}")]
    UnexpectedToken { message: String, span: Span },

    #[error("{message}")]
    Invalid { message: String, span: Span },

    #[error("{message}")]
    LimitExceeded { message: String, span: Span },
}

impl ParseError {
    pub fn unexpected(message: impl Into<String>, span: Span) -> Self {
        Self::UnexpectedToken {
            message: message.into(),
            span,
        }
    }

    pub fn invalid(message: impl Into<String>, span: Span) -> Self {
        Self::Invalid {
            message: message.into(),
            span,
        }
    }

    pub fn parser_limit_exceeded(message: String, span: Span) -> Self {
        Self::LimitExceeded { message, span }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::UnexpectedToken { span, .. }
            | Self::Invalid { span, .. }
            | Self::LimitExceeded { span, .. } => *span,
        }
    }
}

/// Parser state shared by the statement, expression, and import
/// submodules.
pub struct Parser<'a> {
    tokens: &'a [(Token, Span)],
    pos: usize,
    pub(crate) depth: usize,
    pub(crate) interner: &'a Interner,
    pub(crate) symbols: &'a mut SymbolTable,
    pub(crate) scopes: &'a ScopeCache,
    pub(crate) resolver: &'a ModuleResolver,
    pub(crate) tracker: &'a mut IssueTracker,
    pub(crate) file: &'a Path,
    /// Dotted name of the containing package, empty for root modules.
    /// Relative imports are resolved against this.
    pub(crate) package: &'a str,
}

/// Parse one module's token stream into an AST.
///
/// Symbol definitions happen during the walk: declarations land in the
/// module scope (or the enclosing function scope), imports bind module
/// symbols against the scope cache. Parse errors are reported to the
/// tracker and recovery resumes at the next statement boundary, so one
/// bad statement does not hide errors in the rest of the file.
#[allow(clippy::too_many_arguments)]
pub fn parse<'a>(
    tokens: &'a [(Token, Span)],
    interner: &'a Interner,
    symbols: &'a mut SymbolTable,
    scopes: &'a ScopeCache,
    resolver: &'a ModuleResolver,
    tracker: &'a mut IssueTracker,
    file: &'a Path,
    package: &'a str,
) -> Module {
    let scope = symbols.new_module_scope();
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        interner,
        symbols,
        scopes,
        resolver,
        tracker,
        file,
        package,
    };

    let start = parser.current_span();
    let mut statements = Vec::new();
    while !parser.at_eof() {
        match parser.current() {
            Token::Newline => {
                parser.advance();
            }
            Token::Indent => {
                // Post-error recovery leaves layout tokens behind; a
                // clean stream only indents after a block header
                if !parser.tracker.has_errors() {
                    let span = parser.current_span();
                    let location = Location::new(file.to_path_buf(), span.line, span.column);
                    parser.tracker.error(
                        code::PAR_INDENTATION_ERROR,
                        "Unexpected indent",
                        Some(location),
                    );
                }
                parser.advance();
            }
            Token::Dedent => {
                parser.advance();
            }
            _ => match stmt::parse_statement(&mut parser) {
                Ok(statement) => statements.push(statement),
                Err(error) => {
                    parser.report(&error);
                    // A failure inside a nested block can leave the
                    // scope stack mid-descent
                    parser.symbols.set_current(scope);
                    recovery::sync_to_statement_boundary(&mut parser);
                }
            },
        }
    }

    let span = start.merge(&parser.current_span());
    Module::new(statements, scope, span)
}

impl<'a> Parser<'a> {
    /// The token at the cursor. Past the end this is `Eof`.
    pub fn current(&self) -> Token {
        self.tokens.get(self.pos).map(|(t, _)| *t).unwrap_or(Token::Eof)
    }

    pub fn current_span(&self) -> Span {
        self.tokens.get(self.pos).map(|(_, s)| *s).unwrap_or_default()
    }

    /// The token after the cursor.
    pub fn peek(&self) -> Token {
        self.peek_at(1)
    }

    pub fn peek_at(&self, offset: usize) -> Token {
        self.tokens
            .get(self.pos + offset)
            .map(|(t, _)| *t)
            .unwrap_or(Token::Eof)
    }

    /// Consume the current token and return it.
    pub fn advance(&mut self) -> Token {
        let token = self.current();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    pub fn check(&self, token: &Token) -> bool {
        self.current() == *token
    }

    /// Consume the current token if it matches.
    pub fn eat(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            return true;
        }
        false
    }

    /// Require `token`, consuming it, or fail naming `what`.
    pub fn expect(&mut self, token: &Token, what: &str) -> Result<Span, ParseError> {
        if self.check(token) {
            let span = self.current_span();
            self.advance();
            return Ok(span);
        }
        Err(self.unexpected_token(what))
    }

    /// Require an identifier and return its text.
    pub fn expect_identifier(&mut self, what: &str) -> Result<(String, Span), ParseError> {
        match self.current() {
            Token::Identifier(sym) => {
                let span = self.current_span();
                self.advance();
                Ok((self.interner.resolve(sym).to_string(), span))
            }
            other => Err(ParseError::unexpected(
                format!("Expected {}, found '{}'", what, other),
                self.current_span(),
            )),
        }
    }

    pub fn at_eof(&self) -> bool {
        matches!(self.current(), Token::Eof)
    }

    pub fn unexpected_token(&self, expected: &str) -> ParseError {
        ParseError::unexpected(
            format!("Expected {}, found '{}'", expected, self.current()),
            self.current_span(),
        )
    }

    /// Consume the newline ending a simple statement. `Eof` ends a
    /// statement too, and a pending `Dedent` is left for the block
    /// parser.
    pub fn consume_end_of_statement(&mut self) -> Result<(), ParseError> {
        match self.current() {
            Token::Newline => {
                self.advance();
                Ok(())
            }
            Token::Eof | Token::Dedent => Ok(()),
            _ => Err(self.unexpected_token("end of statement")),
        }
    }

    fn report(&mut self, error: &ParseError) {
        let span = error.span();
        let location = Location::new(self.file.to_path_buf(), span.line, span.column);
        self.tracker
            .error(code::PAR_EXPECTED_TOKEN, error.to_string(), Some(location));
    }
}
