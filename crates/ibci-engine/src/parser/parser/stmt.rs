//! Statement parsing.

use super::guards::{LoopGuard, MAX_PARSE_DEPTH};
use super::{expr, import, ParseError, Parser};
use crate::parser::ast::*;
use crate::parser::scope::{ScopeKind, SymbolKind};
use crate::parser::token::{Span, Token};

/// Parse a statement.
pub fn parse_statement(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    parser.depth += 1;
    if parser.depth > MAX_PARSE_DEPTH {
        parser.depth -= 1;
        return Err(ParseError::parser_limit_exceeded(
            format!(
                "Maximum nesting depth ({}) exceeded in statement",
                MAX_PARSE_DEPTH
            ),
            parser.current_span(),
        ));
    }

    let result = parse_statement_inner(parser);
    parser.depth -= 1;
    result
}

fn parse_statement_inner(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    match parser.current() {
        Token::Var => parse_variable_declaration(parser),
        Token::Func => parse_function_declaration(parser),
        Token::Return => parse_return_statement(parser),
        Token::If => parse_if_statement(parser),
        Token::While => parse_while_statement(parser),
        Token::For => parse_for_statement(parser),
        Token::Pass => parse_marker(parser, Statement::Pass),
        Token::Break => parse_marker(parser, Statement::Break),
        Token::Continue => parse_marker(parser, Statement::Continue),
        Token::Import | Token::From => import::parse_import_statement(parser),
        Token::Identifier(_) if is_typed_declaration(parser) => parse_typed_declaration(parser),
        _ => parse_expression_statement(parser),
    }
}

/// `pass`, `break`, `continue`.
fn parse_marker(
    parser: &mut Parser<'_>,
    build: fn(Span) -> Statement,
) -> Result<Statement, ParseError> {
    let span = parser.current_span();
    parser.advance();
    parser.consume_end_of_statement()?;
    Ok(build(span))
}

/// Decide whether an identifier starts a typed declaration
/// (`int x = ...`, `list[int] xs = ...`) rather than an expression.
///
/// A typed declaration is an identifier followed directly by another
/// identifier, or by a bracketed argument list whose closing bracket is
/// followed by an identifier. `xs[0] = 1` lands on `=` after the
/// bracket and stays an expression statement.
fn is_typed_declaration(parser: &Parser<'_>) -> bool {
    match parser.peek() {
        Token::Identifier(_) => true,
        Token::LeftBracket => {
            let mut offset = 2;
            let mut depth = 1usize;
            while depth > 0 {
                match parser.peek_at(offset) {
                    Token::LeftBracket => depth += 1,
                    Token::RightBracket => depth -= 1,
                    Token::Newline | Token::Eof => return false,
                    _ => {}
                }
                offset += 1;
            }
            matches!(parser.peek_at(offset), Token::Identifier(_))
        }
        _ => false,
    }
}

/// `var name [= value]`
fn parse_variable_declaration(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let start = parser.expect(&Token::Var, "'var'")?;
    let (name, name_span) = parser.expect_identifier("variable name")?;

    let value = if parser.eat(&Token::Equal) {
        Some(expr::parse_expression(parser)?)
    } else {
        None
    };
    let end = value.as_ref().map(|v| v.span()).unwrap_or(name_span);
    parser.consume_end_of_statement()?;

    let scope = parser.symbols.current_scope();
    parser.symbols.define(scope, &name, SymbolKind::Variable);

    Ok(Statement::VarDecl(VarDecl {
        name,
        declared_type: None,
        value,
        span: start.merge(&end),
    }))
}

/// `type name [= value]`, e.g. `int count = 0` or `list[str] names`.
fn parse_typed_declaration(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let annotation = parse_type_annotation(parser)?;
    let (name, name_span) = parser.expect_identifier("variable name")?;

    let value = if parser.eat(&Token::Equal) {
        Some(expr::parse_expression(parser)?)
    } else {
        None
    };
    let end = value.as_ref().map(|v| v.span()).unwrap_or(name_span);
    parser.consume_end_of_statement()?;

    let scope = parser.symbols.current_scope();
    parser.symbols.define(scope, &name, SymbolKind::Variable);

    let span = annotation.span.merge(&end);
    Ok(Statement::VarDecl(VarDecl {
        name,
        declared_type: Some(annotation),
        value,
        span,
    }))
}

/// A type annotation: a name with optional bracketed arguments.
pub(super) fn parse_type_annotation(parser: &mut Parser<'_>) -> Result<TypeAnnotation, ParseError> {
    let (name, span) = parser.expect_identifier("type name")?;
    let mut args = Vec::new();
    let mut end = span;

    if parser.eat(&Token::LeftBracket) {
        let mut guard = LoopGuard::new("type_arguments");
        loop {
            guard.check()?;
            args.push(parse_type_annotation(parser)?);
            if !parser.eat(&Token::Comma) {
                break;
            }
        }
        end = parser.expect(&Token::RightBracket, "']'")?;
    }

    Ok(TypeAnnotation {
        name,
        args,
        span: span.merge(&end),
    })
}

/// `func name(type param, ...) [-> type]:` suite
fn parse_function_declaration(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let start = parser.expect(&Token::Func, "'func'")?;
    let (name, _) = parser.expect_identifier("function name")?;

    // The function's symbol lands in the enclosing scope; the checker
    // fills its type in once annotations are resolved
    let outer = parser.symbols.current_scope();
    parser.symbols.define(outer, &name, SymbolKind::Function);

    parser.expect(&Token::LeftParen, "'('")?;
    let scope = parser.symbols.enter_scope(ScopeKind::Function);

    // On a parse failure anywhere past this point the scope is left
    // entered; top-level recovery resets it
    let params = parse_parameters(parser, scope)?;
    parser.expect(&Token::RightParen, "')'")?;
    let return_type = if parser.eat(&Token::Arrow) {
        Some(parse_type_annotation(parser)?)
    } else {
        None
    };
    parser.expect(&Token::Colon, "':'")?;
    let body = parse_block(parser)?;
    parser.symbols.exit_scope();

    let end = body.last().map(|s| s.span()).unwrap_or(start);
    Ok(Statement::FuncDecl(FuncDecl {
        name,
        params,
        return_type,
        body,
        scope,
        span: start.merge(&end),
    }))
}

fn parse_parameters(
    parser: &mut Parser<'_>,
    scope: crate::parser::scope::ScopeId,
) -> Result<Vec<Param>, ParseError> {
    let mut params = Vec::new();
    if parser.check(&Token::RightParen) {
        return Ok(params);
    }

    let mut guard = LoopGuard::new("parameters");
    loop {
        guard.check()?;
        let annotation = parse_type_annotation(parser)?;
        let (name, name_span) = parser.expect_identifier("parameter name")?;
        parser.symbols.define(scope, &name, SymbolKind::Variable);
        let span = annotation.span.merge(&name_span);
        params.push(Param {
            name,
            annotation,
            span,
        });
        if !parser.eat(&Token::Comma) {
            break;
        }
    }
    Ok(params)
}

/// An indented suite: newline, indent, statements, dedent.
fn parse_block(parser: &mut Parser<'_>) -> Result<Vec<Statement>, ParseError> {
    parser.expect(&Token::Newline, "newline after ':'")?;
    parser.expect(&Token::Indent, "an indented block")?;

    let mut statements = Vec::new();
    let mut guard = LoopGuard::new("block");
    while !parser.check(&Token::Dedent) && !parser.at_eof() {
        guard.check()?;
        if parser.eat(&Token::Newline) {
            continue;
        }
        statements.push(parse_statement(parser)?);
    }
    parser.expect(&Token::Dedent, "end of block")?;
    Ok(statements)
}

/// `return [value]`
fn parse_return_statement(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let start = parser.expect(&Token::Return, "'return'")?;
    let value = match parser.current() {
        Token::Newline | Token::Dedent | Token::Eof => None,
        _ => Some(expr::parse_expression(parser)?),
    };
    let end = value.as_ref().map(|v| v.span()).unwrap_or(start);
    parser.consume_end_of_statement()?;
    Ok(Statement::Return(ReturnStmt {
        value,
        span: start.merge(&end),
    }))
}

/// `if`/`elif`/`else` chain. Branch bodies share the enclosing scope.
fn parse_if_statement(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let start = parser.expect(&Token::If, "'if'")?;
    let mut branches = Vec::new();

    let test = expr::parse_expression(parser)?;
    parser.expect(&Token::Colon, "':'")?;
    let body = parse_block(parser)?;
    let mut end = body.last().map(|s| s.span()).unwrap_or(start);
    branches.push(IfBranch { test, body });

    let mut guard = LoopGuard::new("elif_chain");
    while parser.check(&Token::Elif) {
        guard.check()?;
        parser.advance();
        let test = expr::parse_expression(parser)?;
        parser.expect(&Token::Colon, "':'")?;
        let body = parse_block(parser)?;
        end = body.last().map(|s| s.span()).unwrap_or(end);
        branches.push(IfBranch { test, body });
    }

    let else_body = if parser.eat(&Token::Else) {
        parser.expect(&Token::Colon, "':'")?;
        let body = parse_block(parser)?;
        end = body.last().map(|s| s.span()).unwrap_or(end);
        Some(body)
    } else {
        None
    };

    Ok(Statement::If(IfStmt {
        branches,
        else_body,
        span: start.merge(&end),
    }))
}

/// `while test:` suite. The body shares the enclosing scope.
fn parse_while_statement(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let start = parser.expect(&Token::While, "'while'")?;
    let test = expr::parse_expression(parser)?;
    parser.expect(&Token::Colon, "':'")?;
    let body = parse_block(parser)?;
    let end = body.last().map(|s| s.span()).unwrap_or(start);
    Ok(Statement::While(WhileStmt {
        test,
        body,
        span: start.merge(&end),
    }))
}

/// `for target in iter:` suite. The loop variable lives in a block
/// scope of its own.
fn parse_for_statement(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let start = parser.expect(&Token::For, "'for'")?;
    let (target, _) = parser.expect_identifier("loop variable")?;
    parser.expect(&Token::In, "'in'")?;
    let iter = expr::parse_expression(parser)?;
    parser.expect(&Token::Colon, "':'")?;

    let scope = parser.symbols.enter_scope(ScopeKind::Block);
    parser.symbols.define(scope, &target, SymbolKind::Variable);
    let body = parse_block(parser)?;
    parser.symbols.exit_scope();

    let end = body.last().map(|s| s.span()).unwrap_or(start);
    Ok(Statement::For(ForStmt {
        target,
        iter,
        body,
        scope,
        span: start.merge(&end),
    }))
}

/// Expression, assignment, or augmented assignment.
fn parse_expression_statement(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let target = expr::parse_expression(parser)?;

    let augmented = match parser.current() {
        Token::PlusEqual => Some(BinaryOperator::Add),
        Token::MinusEqual => Some(BinaryOperator::Subtract),
        Token::StarEqual => Some(BinaryOperator::Multiply),
        Token::SlashEqual => Some(BinaryOperator::Divide),
        _ => None,
    };

    if let Some(operator) = augmented {
        parser.advance();
        validate_assignment_target(&target)?;
        let value = expr::parse_expression(parser)?;
        let span = target.span().merge(&value.span());
        parser.consume_end_of_statement()?;
        return Ok(Statement::AugAssign(AugAssignStmt {
            target,
            operator,
            value,
            span,
        }));
    }

    if parser.eat(&Token::Equal) {
        validate_assignment_target(&target)?;
        let value = expr::parse_expression(parser)?;
        let span = target.span().merge(&value.span());
        parser.consume_end_of_statement()?;
        return Ok(Statement::Assign(AssignStmt {
            target,
            value,
            span,
        }));
    }

    parser.consume_end_of_statement()?;
    Ok(Statement::Expression(target))
}

fn validate_assignment_target(target: &Expression) -> Result<(), ParseError> {
    match target {
        Expression::Identifier(_) | Expression::Attribute(_) | Expression::Index(_) => Ok(()),
        other => Err(ParseError::invalid(
            "Invalid assignment target",
            other.span(),
        )),
    }
}
