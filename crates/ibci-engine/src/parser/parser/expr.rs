//! Expression parsing.
//!
//! A Pratt parser over binding powers. Every precedence step funnels
//! through [`parse_binary`], which carries the recursion-depth guard, so
//! pathological nesting fails with a parse error instead of a stack
//! overflow.

use super::guards::{LoopGuard, MAX_PARSE_DEPTH};
use super::{ParseError, Parser};
use crate::parser::ast::*;
use crate::parser::token::Token;

/// Binding power of `not`; its operand starts at the comparison level.
const NOT_BP: u8 = 3;
/// Binding power of prefix `-` and `~`.
const UNARY_BP: u8 = 11;

/// Parse an expression.
pub fn parse_expression(parser: &mut Parser<'_>) -> Result<Expression, ParseError> {
    parse_binary(parser, 0)
}

/// Binding power and AST operator for an infix token.
fn infix_binding(token: &Token) -> Option<(u8, BinaryOperator)> {
    let pair = match token {
        Token::Or => (1, BinaryOperator::Or),
        Token::And => (2, BinaryOperator::And),
        Token::EqualEqual => (4, BinaryOperator::Equal),
        Token::BangEqual => (4, BinaryOperator::NotEqual),
        Token::Less => (4, BinaryOperator::LessThan),
        Token::LessEqual => (4, BinaryOperator::LessEqual),
        Token::Greater => (4, BinaryOperator::GreaterThan),
        Token::GreaterEqual => (4, BinaryOperator::GreaterEqual),
        Token::Is => (4, BinaryOperator::Is),
        Token::Pipe => (5, BinaryOperator::BitwiseOr),
        Token::Caret => (6, BinaryOperator::BitwiseXor),
        Token::Amp => (7, BinaryOperator::BitwiseAnd),
        Token::LessLess => (8, BinaryOperator::LeftShift),
        Token::GreaterGreater => (8, BinaryOperator::RightShift),
        Token::Plus => (9, BinaryOperator::Add),
        Token::Minus => (9, BinaryOperator::Subtract),
        Token::Star => (10, BinaryOperator::Multiply),
        Token::Slash => (10, BinaryOperator::Divide),
        Token::Percent => (10, BinaryOperator::Modulo),
        _ => return None,
    };
    Some(pair)
}

fn parse_binary(parser: &mut Parser<'_>, min_bp: u8) -> Result<Expression, ParseError> {
    parser.depth += 1;
    if parser.depth > MAX_PARSE_DEPTH {
        parser.depth -= 1;
        return Err(ParseError::parser_limit_exceeded(
            format!(
                "Maximum nesting depth ({}) exceeded in expression",
                MAX_PARSE_DEPTH
            ),
            parser.current_span(),
        ));
    }
    let result = parse_binary_inner(parser, min_bp);
    parser.depth -= 1;
    result
}

fn parse_binary_inner(parser: &mut Parser<'_>, min_bp: u8) -> Result<Expression, ParseError> {
    let mut left = if parser.check(&Token::Not) {
        let start = parser.current_span();
        parser.advance();
        let operand = parse_binary(parser, NOT_BP + 1)?;
        let span = start.merge(&operand.span());
        Expression::Unary(UnaryExpression {
            operator: UnaryOperator::Not,
            operand: Box::new(operand),
            span,
        })
    } else {
        parse_unary(parser)?
    };

    loop {
        let Some((bp, operator)) = infix_binding(&parser.current()) else {
            break;
        };
        if bp < min_bp {
            break;
        }
        parser.advance();
        // bp + 1 keeps same-power operators left-associative
        let right = parse_binary(parser, bp + 1)?;
        let span = left.span().merge(&right.span());
        left = Expression::Binary(BinaryExpression {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            span,
        });
    }

    Ok(left)
}

fn parse_unary(parser: &mut Parser<'_>) -> Result<Expression, ParseError> {
    let operator = match parser.current() {
        Token::Minus => UnaryOperator::Negate,
        Token::Tilde => UnaryOperator::BitwiseNot,
        _ => return parse_postfix(parser),
    };
    let start = parser.current_span();
    parser.advance();
    let operand = parse_binary(parser, UNARY_BP)?;
    let span = start.merge(&operand.span());
    Ok(Expression::Unary(UnaryExpression {
        operator,
        operand: Box::new(operand),
        span,
    }))
}

/// Attribute access, calls, and indexing, applied left to right.
fn parse_postfix(parser: &mut Parser<'_>) -> Result<Expression, ParseError> {
    let mut expr = parse_primary(parser)?;
    let mut guard = LoopGuard::new("postfix");

    loop {
        guard.check()?;
        match parser.current() {
            Token::Dot => {
                parser.advance();
                let (attr, attr_span) = parser.expect_identifier("attribute name")?;
                let span = expr.span().merge(&attr_span);
                expr = Expression::Attribute(AttributeExpression {
                    object: Box::new(expr),
                    attr,
                    span,
                });
            }
            Token::LeftParen => {
                parser.advance();
                let mut args = Vec::new();
                if !parser.check(&Token::RightParen) {
                    let mut arg_guard = LoopGuard::new("call_arguments");
                    loop {
                        arg_guard.check()?;
                        args.push(parse_expression(parser)?);
                        if !parser.eat(&Token::Comma) {
                            break;
                        }
                    }
                }
                let end = parser.expect(&Token::RightParen, "')'")?;
                let span = expr.span().merge(&end);
                expr = Expression::Call(CallExpression {
                    callee: Box::new(expr),
                    args,
                    span,
                });
            }
            Token::LeftBracket => {
                parser.advance();
                let index = parse_expression(parser)?;
                let end = parser.expect(&Token::RightBracket, "']'")?;
                let span = expr.span().merge(&end);
                expr = Expression::Index(IndexExpression {
                    object: Box::new(expr),
                    index: Box::new(index),
                    span,
                });
            }
            _ => break,
        }
    }

    Ok(expr)
}

fn parse_primary(parser: &mut Parser<'_>) -> Result<Expression, ParseError> {
    let span = parser.current_span();
    match parser.current() {
        Token::IntLiteral(value) => {
            parser.advance();
            Ok(Expression::IntLiteral(IntLiteral { value, span }))
        }
        Token::FloatLiteral(value) => {
            parser.advance();
            Ok(Expression::FloatLiteral(FloatLiteral { value, span }))
        }
        Token::StringLiteral(sym) => {
            parser.advance();
            Ok(Expression::StringLiteral(StringLiteral {
                value: parser.interner.resolve(sym).to_string(),
                span,
            }))
        }
        Token::True => {
            parser.advance();
            Ok(Expression::BooleanLiteral(BooleanLiteral { value: true, span }))
        }
        Token::False => {
            parser.advance();
            Ok(Expression::BooleanLiteral(BooleanLiteral {
                value: false,
                span,
            }))
        }
        Token::None => {
            parser.advance();
            Ok(Expression::NoneLiteral(span))
        }
        Token::Identifier(sym) => {
            parser.advance();
            Ok(Expression::Identifier(Identifier::new(
                parser.interner.resolve(sym),
                span,
            )))
        }
        Token::LeftParen => {
            parser.advance();
            let inner = parse_expression(parser)?;
            parser.expect(&Token::RightParen, "')'")?;
            Ok(inner)
        }
        Token::LeftBracket => parse_list_literal(parser),
        Token::LeftBrace => parse_dict_literal(parser),
        _ => Err(parser.unexpected_token("expression")),
    }
}

fn parse_list_literal(parser: &mut Parser<'_>) -> Result<Expression, ParseError> {
    let start = parser.expect(&Token::LeftBracket, "'['")?;
    let mut items = Vec::new();
    let mut guard = LoopGuard::new("list_literal");

    while !parser.check(&Token::RightBracket) {
        guard.check()?;
        items.push(parse_expression(parser)?);
        if !parser.eat(&Token::Comma) {
            break;
        }
    }
    let end = parser.expect(&Token::RightBracket, "']'")?;
    Ok(Expression::List(ListExpression {
        items,
        span: start.merge(&end),
    }))
}

fn parse_dict_literal(parser: &mut Parser<'_>) -> Result<Expression, ParseError> {
    let start = parser.expect(&Token::LeftBrace, "'{'")?;
    let mut entries = Vec::new();
    let mut guard = LoopGuard::new("dict_literal");

    while !parser.check(&Token::RightBrace) {
        guard.check()?;
        let key = parse_expression(parser)?;
        parser.expect(&Token::Colon, "':'")?;
        let value = parse_expression(parser)?;
        entries.push((key, value));
        if !parser.eat(&Token::Comma) {
            break;
        }
    }
    let end = parser.expect(&Token::RightBrace, "'}'")?;
    Ok(Expression::Dict(DictExpression {
        entries,
        span: start.merge(&end),
    }))
}
