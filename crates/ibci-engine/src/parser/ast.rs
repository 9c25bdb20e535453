//! Abstract Syntax Tree (AST) for the IBCI language.
//!
//! Every node carries a `Span`. Function bodies and `for` loops carry the
//! `ScopeId` the parser opened for them; the module root carries the
//! module-level scope. Scopes themselves live in the shared
//! [`SymbolTable`](crate::parser::scope::SymbolTable) arena, so the AST
//! holds only ids.

use crate::parser::scope::ScopeId;
use crate::parser::token::Span;

/// Root node: one IBCI source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    /// Top-level statements in source order.
    pub statements: Vec<Statement>,
    /// The module-level scope populated during parsing.
    pub scope: ScopeId,
    /// Span covering the entire module.
    pub span: Span,
}

impl Module {
    pub fn new(statements: Vec<Statement>, scope: ScopeId, span: Span) -> Self {
        Self {
            statements,
            scope,
            span,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }
}

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `var x = e` or `int x = e`
    VarDecl(VarDecl),

    /// `func name(params) -> ret:` block
    FuncDecl(FuncDecl),

    /// `return [e]`
    Return(ReturnStmt),

    /// `if`/`elif`/`else` chain
    If(IfStmt),

    /// `while test:` block
    While(WhileStmt),

    /// `for target in iter:` block
    For(ForStmt),

    /// `pass`
    Pass(Span),

    /// `break`
    Break(Span),

    /// `continue`
    Continue(Span),

    /// Bare expression used as a statement
    Expression(Expression),

    /// `target = value`
    Assign(AssignStmt),

    /// `target += value` and friends
    AugAssign(AugAssignStmt),

    /// `import a.b [as c], d`
    Import(ImportStmt),

    /// `from [.]*mod import name [as alias], ...` or `import *`
    FromImport(FromImportStmt),
}

impl Statement {
    /// Span of the statement.
    pub fn span(&self) -> Span {
        match self {
            Statement::VarDecl(s) => s.span,
            Statement::FuncDecl(s) => s.span,
            Statement::Return(s) => s.span,
            Statement::If(s) => s.span,
            Statement::While(s) => s.span,
            Statement::For(s) => s.span,
            Statement::Pass(span) | Statement::Break(span) | Statement::Continue(span) => *span,
            Statement::Expression(e) => e.span(),
            Statement::Assign(s) => s.span,
            Statement::AugAssign(s) => s.span,
            Statement::Import(s) => s.span,
            Statement::FromImport(s) => s.span,
        }
    }
}

/// Variable declaration, either `var` (inferred) or explicitly typed.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: String,
    /// Present for `int x = ...` style declarations, absent for `var`.
    pub declared_type: Option<TypeAnnotation>,
    pub value: Option<Expression>,
    pub span: Span,
}

/// Function declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Option<TypeAnnotation>,
    pub body: Vec<Statement>,
    /// The function scope holding the parameters and locals.
    pub scope: ScopeId,
    pub span: Span,
}

/// One function parameter: `int x`.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub annotation: TypeAnnotation,
    pub span: Span,
}

/// A type annotation: a name plus optional bracketed arguments,
/// e.g. `int`, `list[int]`, `dict[str, int]`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotation {
    pub name: String,
    pub args: Vec<TypeAnnotation>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expression>,
    pub span: Span,
}

/// `if`/`elif` branches plus an optional `else` body.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub branches: Vec<IfBranch>,
    pub else_body: Option<Vec<Statement>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfBranch {
    pub test: Expression,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub test: Expression,
    pub body: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub target: String,
    pub iter: Expression,
    pub body: Vec<Statement>,
    /// Block scope holding the loop variable.
    pub scope: ScopeId,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub target: Expression,
    pub value: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AugAssignStmt {
    pub target: Expression,
    pub operator: BinaryOperator,
    pub value: Expression,
    pub span: Span,
}

/// `import a.b [as c], d.e [as f]`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportStmt {
    pub names: Vec<ImportAlias>,
    pub span: Span,
}

/// `from [.]*module import names` (or `*`).
#[derive(Debug, Clone, PartialEq)]
pub struct FromImportStmt {
    /// Module name without the leading dots; may be empty for `from . import x`.
    pub module: String,
    /// Number of leading dots (0 for absolute imports).
    pub level: u32,
    pub names: Vec<ImportAlias>,
    pub star: bool,
    pub span: Span,
}

/// One imported name with its optional alias.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportAlias {
    pub name: String,
    pub alias: Option<String>,
    pub span: Span,
}

impl ImportAlias {
    /// The name the import binds locally.
    pub fn bound_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Integer literal: `42`, `0xFF`, `0b1010`
    IntLiteral(IntLiteral),

    /// Float literal: `3.14`, `1e10`
    FloatLiteral(FloatLiteral),

    /// String literal: `"hello"`
    StringLiteral(StringLiteral),

    /// Boolean literal: `True`, `False`
    BooleanLiteral(BooleanLiteral),

    /// `None`
    NoneLiteral(Span),

    /// Identifier
    Identifier(Identifier),

    /// Attribute access: `obj.attr`
    Attribute(AttributeExpression),

    /// Function call: `f(1, 2)`
    Call(CallExpression),

    /// Index access: `xs[0]`
    Index(IndexExpression),

    /// Unary expression: `-x`, `not x`, `~x`
    Unary(UnaryExpression),

    /// Binary expression: `x + y`, `a == b`, `p and q`
    Binary(BinaryExpression),

    /// List literal: `[1, 2, 3]`
    List(ListExpression),

    /// Dict literal: `{"a": 1}`
    Dict(DictExpression),
}

impl Expression {
    /// Span of the expression.
    pub fn span(&self) -> Span {
        match self {
            Expression::IntLiteral(n) => n.span,
            Expression::FloatLiteral(n) => n.span,
            Expression::StringLiteral(s) => s.span,
            Expression::BooleanLiteral(b) => b.span,
            Expression::NoneLiteral(span) => *span,
            Expression::Identifier(id) => id.span,
            Expression::Attribute(a) => a.span,
            Expression::Call(c) => c.span,
            Expression::Index(i) => i.span,
            Expression::Unary(u) => u.span,
            Expression::Binary(b) => b.span,
            Expression::List(l) => l.span,
            Expression::Dict(d) => d.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntLiteral {
    pub value: i64,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FloatLiteral {
    pub value: f64,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanLiteral {
    pub value: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

impl Identifier {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeExpression {
    pub object: Box<Expression>,
    pub attr: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    pub callee: Box<Expression>,
    pub args: Vec<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpression {
    pub object: Box<Expression>,
    pub index: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpression {
    pub operator: UnaryOperator,
    pub operand: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpression {
    pub operator: BinaryOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListExpression {
    pub items: Vec<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DictExpression {
    pub entries: Vec<(Expression, Expression)>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,     // -
    Not,        // not
    BitwiseNot, // ~
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Arithmetic
    Add,      // +
    Subtract, // -
    Multiply, // *
    Divide,   // /
    Modulo,   // %

    // Comparison
    Equal,        // ==
    NotEqual,     // !=
    LessThan,     // <
    LessEqual,    // <=
    GreaterThan,  // >
    GreaterEqual, // >=

    // Logical
    And, // and
    Or,  // or
    Is,  // is

    // Bitwise
    BitwiseAnd, // &
    BitwiseOr,  // |
    BitwiseXor, // ^
    LeftShift,  // <<
    RightShift, // >>
}

impl BinaryOperator {
    /// Source-level spelling, used in diagnostics.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
            BinaryOperator::Is => "is",
            BinaryOperator::BitwiseAnd => "&",
            BinaryOperator::BitwiseOr => "|",
            BinaryOperator::BitwiseXor => "^",
            BinaryOperator::LeftShift => "<<",
            BinaryOperator::RightShift => ">>",
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Equal
                | BinaryOperator::NotEqual
                | BinaryOperator::LessThan
                | BinaryOperator::LessEqual
                | BinaryOperator::GreaterThan
                | BinaryOperator::GreaterEqual
        )
    }
}

impl UnaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOperator::Negate => "-",
            UnaryOperator::Not => "not",
            UnaryOperator::BitwiseNot => "~",
        }
    }
}
