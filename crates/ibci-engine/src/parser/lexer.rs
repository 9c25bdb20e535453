//! Lexer for the IBCI language.
//!
//! Lexing runs in two layers. A logos-derived scanner produces raw
//! tokens, with whitespace, newlines, and comments kept as real tokens.
//! A layout pass then applies the offside rule: it measures leading
//! whitespace per logical line, emits `Indent`/`Dedent` pairs, suppresses
//! newlines inside brackets and after explicit continuations, and drops
//! blank and comment-only lines.

use crate::parser::interner::Interner;
use crate::parser::token::{Span, Token};
use logos::Logos;

/// Logos-based raw token enum.
///
/// Converted to the public [`Token`] stream by the layout pass; layout
/// tokens (`Whitespace`, `Newline`, `Comment`, `Backslash`) never reach
/// the parser directly.
#[derive(Logos, Debug, Clone, PartialEq)]
enum RawToken {
    #[regex(r"[ \t]+")]
    Whitespace,

    #[regex(r"\r?\n")]
    Newline,

    #[regex(r"#[^\n]*")]
    Comment,

    // Explicit line continuation; only valid right before a newline
    #[token("\\")]
    Backslash,

    // Keywords (must come before identifiers)
    #[token("import")]
    Import,

    #[token("from")]
    From,

    #[token("as")]
    As,

    #[token("func")]
    Func,

    #[token("var")]
    Var,

    #[token("return")]
    Return,

    #[token("if")]
    If,

    #[token("elif")]
    Elif,

    #[token("else")]
    Else,

    #[token("for")]
    For,

    #[token("while")]
    While,

    #[token("in")]
    In,

    #[token("pass")]
    Pass,

    #[token("break")]
    Break,

    #[token("continue")]
    Continue,

    #[token("and")]
    And,

    #[token("or")]
    Or,

    #[token("not")]
    Not,

    #[token("is")]
    Is,

    #[token("True")]
    True,

    #[token("False")]
    False,

    #[token("None")]
    None,

    // Literals
    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+")]
    Float,

    #[regex(r"0[xX][0-9a-fA-F]+")]
    HexInt,

    #[regex(r"0[bB][01]+")]
    BinaryInt,

    #[regex(r"[0-9]+")]
    Int,

    #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
    #[regex(r"'([^'\\\n]|\\[^\n])*'")]
    Str,

    #[regex(r#"r"[^"\n]*""#)]
    #[regex(r"r'[^'\n]*'")]
    RawStr,

    // Identifiers: ASCII plus CJK ideographs
    #[regex(r"[A-Za-z_\u{4E00}-\u{9FFF}][A-Za-z0-9_\u{4E00}-\u{9FFF}]*")]
    Identifier,

    // Operators
    #[token("==")]
    EqualEqual,

    #[token("!=")]
    BangEqual,

    #[token("<=")]
    LessEqual,

    #[token(">=")]
    GreaterEqual,

    #[token("<<")]
    LessLess,

    #[token(">>")]
    GreaterGreater,

    #[token("+=")]
    PlusEqual,

    #[token("-=")]
    MinusEqual,

    #[token("*=")]
    StarEqual,

    #[token("/=")]
    SlashEqual,

    #[token("->")]
    Arrow,

    #[token("=")]
    Equal,

    #[token("<")]
    Less,

    #[token(">")]
    Greater,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("%")]
    Percent,

    #[token("&")]
    Amp,

    #[token("|")]
    Pipe,

    #[token("^")]
    Caret,

    #[token("~")]
    Tilde,

    #[token("(")]
    LeftParen,

    #[token(")")]
    RightParen,

    #[token("[")]
    LeftBracket,

    #[token("]")]
    RightBracket,

    #[token("{")]
    LeftBrace,

    #[token("}")]
    RightBrace,

    #[token(".")]
    Dot,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,
}

/// A lexical error with its source location.
#[derive(Debug, Clone, PartialEq)]
pub enum LexError {
    UnexpectedCharacter { char: char, span: Span },
    UnterminatedString { span: Span },
    InvalidNumber { text: String, span: Span },
    IndentationMismatch { span: Span },
}

impl LexError {
    /// Location of the error.
    pub fn span(&self) -> &Span {
        match self {
            LexError::UnexpectedCharacter { span, .. }
            | LexError::UnterminatedString { span }
            | LexError::InvalidNumber { span, .. }
            | LexError::IndentationMismatch { span } => span,
        }
    }

    /// Diagnostic code for the tracker.
    pub fn code(&self) -> &'static str {
        match self {
            LexError::UnexpectedCharacter { .. } => crate::diagnostics::code::LEX_INVALID_CHAR,
            LexError::UnterminatedString { .. } => {
                crate::diagnostics::code::LEX_UNTERMINATED_STRING
            }
            LexError::InvalidNumber { .. } => crate::diagnostics::code::LEX_INVALID_NUMBER,
            LexError::IndentationMismatch { .. } => {
                crate::diagnostics::code::PAR_INDENTATION_ERROR
            }
        }
    }

    /// Human-readable message without location.
    pub fn message(&self) -> String {
        match self {
            LexError::UnexpectedCharacter { char, .. } => {
                format!("Unexpected character '{}'", char)
            }
            LexError::UnterminatedString { .. } => "Unterminated string literal".to_string(),
            LexError::InvalidNumber { text, .. } => format!("Invalid number literal '{}'", text),
            LexError::IndentationMismatch { .. } => {
                "Unindent does not match any outer indentation level".to_string()
            }
        }
    }
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let span = self.span();
        write!(f, "{} at {}:{}", self.message(), span.line, span.column)
    }
}

impl std::error::Error for LexError {}

/// Lexer state for one source file.
pub struct Lexer<'a> {
    source: &'a str,
    tokens: Vec<(Token, Span)>,
    errors: Vec<LexError>,
    interner: Interner,
    indents: Vec<u32>,
    paren_level: u32,
    at_line_start: bool,
    line_has_tokens: bool,
    backslash_pending: bool,
    indent_width: u32,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over the given source text.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            errors: Vec::new(),
            interner: Interner::new(),
            indents: vec![0],
            paren_level: 0,
            at_line_start: true,
            line_has_tokens: false,
            backslash_pending: false,
            indent_width: 0,
        }
    }

    /// Tokenize the source into a layout-structured token stream.
    ///
    /// On success returns the tokens (ending in `Eof`) and the interner
    /// holding identifier and string text. All lexical errors found are
    /// returned together; lexing does not stop at the first one.
    pub fn tokenize(mut self) -> Result<(Vec<(Token, Span)>, Interner), Vec<LexError>> {
        let mut lex = RawToken::lexer(self.source);
        let mut line = 1u32;
        let mut col = 0u32;

        while let Some(result) = lex.next() {
            let range = lex.span();
            let slice = lex.slice();
            let span = Span::new(range.start, range.end, line, col);
            let width = slice.chars().count() as u32;

            match result {
                Err(()) => {
                    let first = slice.chars().next().unwrap_or('\0');
                    if first == '"' || first == '\'' {
                        // Unterminated string: report once and skip the rest
                        // of the line so each character is not re-flagged
                        let rest = lex.remainder();
                        let eol = rest.find('\n').unwrap_or(rest.len());
                        let end = range.end + eol;
                        self.errors.push(LexError::UnterminatedString {
                            span: Span::new(range.start, end, line, col),
                        });
                        let skipped = rest[..eol].chars().count() as u32;
                        lex.bump(eol);
                        col += width + skipped;
                        continue;
                    }
                    self.errors
                        .push(LexError::UnexpectedCharacter { char: first, span });
                }
                Ok(RawToken::Whitespace) => {
                    if self.at_line_start && self.paren_level == 0 {
                        self.indent_width += width;
                    }
                }
                Ok(RawToken::Comment) => {}
                Ok(RawToken::Newline) => {
                    self.handle_newline(range.start, line);
                    line += 1;
                    col = 0;
                    continue;
                }
                Ok(RawToken::Backslash) => {
                    self.backslash_pending = true;
                }
                Ok(raw) => {
                    if self.backslash_pending {
                        // Backslash not followed by a line break
                        self.errors.push(LexError::UnexpectedCharacter {
                            char: '\\',
                            span: Span::new(range.start, range.start, line, col),
                        });
                        self.backslash_pending = false;
                    }
                    if self.at_line_start && self.paren_level == 0 {
                        self.apply_indentation(span);
                    }
                    self.at_line_start = false;
                    self.indent_width = 0;
                    if let Some(token) = self.convert(raw, slice, span) {
                        self.emit(token, span);
                    }
                }
            }

            col += width;
        }

        let len = self.source.len();
        let eof_span = Span::new(len, len, line, col);
        if self.line_has_tokens {
            self.tokens.push((Token::Newline, eof_span));
        }
        while self.indents.len() > 1 {
            self.indents.pop();
            self.tokens.push((Token::Dedent, eof_span));
        }
        self.tokens.push((Token::Eof, eof_span));

        if self.errors.is_empty() {
            Ok((self.tokens, self.interner))
        } else {
            Err(self.errors)
        }
    }

    /// Decide what a physical line break means for the token stream.
    fn handle_newline(&mut self, offset: usize, line: u32) {
        let continued = self.backslash_pending;
        self.backslash_pending = false;
        if self.paren_level > 0 {
            // Implicit joining inside brackets
            return;
        }
        if self.at_line_start {
            // Blank or comment-only line
            self.indent_width = 0;
            return;
        }
        if continued {
            return;
        }
        if matches!(
            self.tokens.last(),
            Some((Token::And, _)) | Some((Token::Or, _))
        ) {
            // A trailing logical operator continues the expression
            return;
        }
        let span = Span::new(offset, offset + 1, line, 0);
        self.tokens.push((Token::Newline, span));
        self.at_line_start = true;
        self.indent_width = 0;
        self.line_has_tokens = false;
    }

    /// Compare the measured leading whitespace against the indent stack.
    fn apply_indentation(&mut self, token_span: Span) {
        let width = self.indent_width;
        let line_start = token_span.start - width as usize;
        let span = Span::new(line_start, token_span.start, token_span.line, 0);

        let current = *self.indents.last().unwrap_or(&0);
        if width > current {
            self.indents.push(width);
            self.tokens.push((Token::Indent, span));
            return;
        }
        while let Some(&top) = self.indents.last() {
            if top <= width || self.indents.len() == 1 {
                break;
            }
            self.indents.pop();
            self.tokens.push((Token::Dedent, span));
        }
        if *self.indents.last().unwrap_or(&0) != width {
            self.errors.push(LexError::IndentationMismatch { span });
            // Recover by treating this as a fresh level
            self.indents.push(width);
            self.tokens.push((Token::Indent, span));
        }
    }

    fn emit(&mut self, token: Token, span: Span) {
        match token {
            Token::LeftParen | Token::LeftBracket | Token::LeftBrace => {
                self.paren_level += 1;
            }
            Token::RightParen | Token::RightBracket | Token::RightBrace => {
                self.paren_level = self.paren_level.saturating_sub(1);
            }
            _ => {}
        }
        self.line_has_tokens = true;
        self.tokens.push((token, span));
    }

    /// Convert a raw token to a public token, interning names and
    /// decoding literals. Returns `None` when the literal is invalid
    /// (the error has already been recorded).
    fn convert(&mut self, raw: RawToken, slice: &str, span: Span) -> Option<Token> {
        let token = match raw {
            RawToken::Import => Token::Import,
            RawToken::From => Token::From,
            RawToken::As => Token::As,
            RawToken::Func => Token::Func,
            RawToken::Var => Token::Var,
            RawToken::Return => Token::Return,
            RawToken::If => Token::If,
            RawToken::Elif => Token::Elif,
            RawToken::Else => Token::Else,
            RawToken::For => Token::For,
            RawToken::While => Token::While,
            RawToken::In => Token::In,
            RawToken::Pass => Token::Pass,
            RawToken::Break => Token::Break,
            RawToken::Continue => Token::Continue,
            RawToken::And => Token::And,
            RawToken::Or => Token::Or,
            RawToken::Not => Token::Not,
            RawToken::Is => Token::Is,
            RawToken::True => Token::True,
            RawToken::False => Token::False,
            RawToken::None => Token::None,
            RawToken::Int => match slice.parse::<i64>() {
                Ok(n) => Token::IntLiteral(n),
                Err(_) => {
                    self.errors.push(LexError::InvalidNumber {
                        text: slice.to_string(),
                        span,
                    });
                    return None;
                }
            },
            RawToken::HexInt => match i64::from_str_radix(&slice[2..], 16) {
                Ok(n) => Token::IntLiteral(n),
                Err(_) => {
                    self.errors.push(LexError::InvalidNumber {
                        text: slice.to_string(),
                        span,
                    });
                    return None;
                }
            },
            RawToken::BinaryInt => match i64::from_str_radix(&slice[2..], 2) {
                Ok(n) => Token::IntLiteral(n),
                Err(_) => {
                    self.errors.push(LexError::InvalidNumber {
                        text: slice.to_string(),
                        span,
                    });
                    return None;
                }
            },
            RawToken::Float => match slice.parse::<f64>() {
                Ok(n) => Token::FloatLiteral(n),
                Err(_) => {
                    self.errors.push(LexError::InvalidNumber {
                        text: slice.to_string(),
                        span,
                    });
                    return None;
                }
            },
            RawToken::Str => {
                let decoded = decode_string(&slice[1..slice.len() - 1]);
                Token::StringLiteral(self.interner.intern(&decoded))
            }
            RawToken::RawStr => {
                // Strip the r prefix and quotes; no escape processing
                Token::StringLiteral(self.interner.intern(&slice[2..slice.len() - 1]))
            }
            RawToken::Identifier => Token::Identifier(self.interner.intern(slice)),
            RawToken::EqualEqual => Token::EqualEqual,
            RawToken::BangEqual => Token::BangEqual,
            RawToken::LessEqual => Token::LessEqual,
            RawToken::GreaterEqual => Token::GreaterEqual,
            RawToken::LessLess => Token::LessLess,
            RawToken::GreaterGreater => Token::GreaterGreater,
            RawToken::PlusEqual => Token::PlusEqual,
            RawToken::MinusEqual => Token::MinusEqual,
            RawToken::StarEqual => Token::StarEqual,
            RawToken::SlashEqual => Token::SlashEqual,
            RawToken::Arrow => Token::Arrow,
            RawToken::Equal => Token::Equal,
            RawToken::Less => Token::Less,
            RawToken::Greater => Token::Greater,
            RawToken::Plus => Token::Plus,
            RawToken::Minus => Token::Minus,
            RawToken::Star => Token::Star,
            RawToken::Slash => Token::Slash,
            RawToken::Percent => Token::Percent,
            RawToken::Amp => Token::Amp,
            RawToken::Pipe => Token::Pipe,
            RawToken::Caret => Token::Caret,
            RawToken::Tilde => Token::Tilde,
            RawToken::LeftParen => Token::LeftParen,
            RawToken::RightParen => Token::RightParen,
            RawToken::LeftBracket => Token::LeftBracket,
            RawToken::RightBracket => Token::RightBracket,
            RawToken::LeftBrace => Token::LeftBrace,
            RawToken::RightBrace => Token::RightBrace,
            RawToken::Dot => Token::Dot,
            RawToken::Colon => Token::Colon,
            RawToken::Comma => Token::Comma,
            RawToken::Whitespace
            | RawToken::Newline
            | RawToken::Comment
            | RawToken::Backslash => unreachable!("layout tokens handled before conversion"),
        };
        Some(token)
    }
}

/// Decode escape sequences in a quoted string body.
///
/// Unknown escapes are kept verbatim, backslash included.
fn decode_string(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('b') => out.push('\u{0008}'),
            Some('f') => out.push('\u{000C}'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
