//! Semantic analysis over a parsed module.
//!
//! The analyzer walks the AST after parsing, resolving names against the
//! symbol table, inferring types for `var` declarations, and checking
//! every operation against the type rules. Findings go to the issue
//! tracker; analysis always runs to the end of the module.

use crate::diagnostics::{code, IssueTracker, Location};
use crate::parser::ast::{
    AssignStmt, AttributeExpression, AugAssignStmt, BinaryExpression, BinaryOperator,
    CallExpression, DictExpression, Expression, ForStmt, FuncDecl, Identifier, IfStmt,
    IndexExpression, ListExpression, Module, ReturnStmt, Statement, TypeAnnotation,
    UnaryExpression, UnaryOperator, VarDecl, WhileStmt,
};
use crate::parser::scope::{ScopeId, SymbolId, SymbolKind, SymbolTable};
use crate::parser::token::Span;
use crate::parser::types::{builtin_type, promoted_type, Type};
use std::path::Path;

/// Walks a module resolving names and checking types.
///
/// The analyzer is deliberately permissive where knowledge is missing:
/// unresolved symbols read as `any`, and `any` satisfies every check, so
/// a single missing import does not cascade into follow-on errors.
pub struct SemanticAnalyzer<'a> {
    symbols: &'a mut SymbolTable,
    tracker: &'a mut IssueTracker,
    file: &'a Path,
    /// Declared return type of the function currently being checked.
    current_return: Option<Type>,
}

impl<'a> SemanticAnalyzer<'a> {
    pub fn new(
        symbols: &'a mut SymbolTable,
        tracker: &'a mut IssueTracker,
        file: &'a Path,
    ) -> Self {
        Self {
            symbols,
            tracker,
            file,
            current_return: None,
        }
    }

    /// Check every statement in the module.
    pub fn check_module(mut self, module: &Module) {
        for stmt in &module.statements {
            self.check_stmt(stmt, module.scope);
        }
    }

    /// Check a statement.
    fn check_stmt(&mut self, stmt: &Statement, scope: ScopeId) {
        match stmt {
            Statement::VarDecl(decl) => self.check_var_decl(decl, scope),
            Statement::FuncDecl(func) => self.check_function(func, scope),
            Statement::Return(ret) => self.check_return(ret, scope),
            Statement::If(if_stmt) => self.check_if(if_stmt, scope),
            Statement::While(while_stmt) => self.check_while(while_stmt, scope),
            Statement::For(for_stmt) => self.check_for(for_stmt, scope),
            Statement::Pass(_) | Statement::Break(_) | Statement::Continue(_) => {}
            Statement::Expression(expr) => {
                self.check_expr(expr, scope);
            }
            Statement::Assign(assign) => self.check_assign(assign, scope),
            Statement::AugAssign(assign) => self.check_aug_assign(assign, scope),
            // Import bindings were created while parsing; nothing left to
            // check on the statement itself
            Statement::Import(_) | Statement::FromImport(_) => {}
        }
    }

    /// Check a variable declaration and record the variable's type.
    fn check_var_decl(&mut self, decl: &VarDecl, scope: ScopeId) {
        let declared = decl
            .declared_type
            .as_ref()
            .map(|annotation| self.annotation_type(annotation));
        let value = decl
            .value
            .as_ref()
            .map(|value| (self.check_expr(value, scope), value.span()));

        let ty = match (declared, value) {
            (Some(declared), Some((value, span))) => {
                self.check_assignable(&value, &declared, span);
                declared
            }
            (Some(declared), None) => declared,
            // `var` adopts the value's type; a void value stays dynamic
            (None, Some((Type::Void, _))) => Type::Any,
            (None, Some((value, _))) => value,
            (None, None) => Type::Any,
        };

        if let Some(id) = self.symbols.resolve_local(scope, &decl.name) {
            self.symbols.set_type(id, ty);
        }
    }

    /// Check a function declaration: record its signature on the symbol
    /// the parser defined, type the parameters, then check the body.
    fn check_function(&mut self, func: &FuncDecl, scope: ScopeId) {
        let params: Vec<Type> = func
            .params
            .iter()
            .map(|param| self.annotation_type(&param.annotation))
            .collect();
        let ret = match &func.return_type {
            Some(annotation) => self.annotation_type(annotation),
            None => Type::Void,
        };

        // The signature lands before the body is checked so recursive
        // calls resolve
        if let Some(id) = self.symbols.resolve_local(scope, &func.name) {
            self.symbols.set_type(
                id,
                Type::Function {
                    params: params.clone(),
                    ret: Box::new(ret.clone()),
                },
            );
        }
        for (param, ty) in func.params.iter().zip(params) {
            if let Some(id) = self.symbols.resolve_local(func.scope, &param.name) {
                self.symbols.set_type(id, ty);
            }
        }

        let previous = self.current_return.replace(ret);
        for stmt in &func.body {
            self.check_stmt(stmt, func.scope);
        }
        self.current_return = previous;
    }

    /// Check a return statement against the enclosing function signature.
    fn check_return(&mut self, ret: &ReturnStmt, scope: ScopeId) {
        let ty = match &ret.value {
            Some(value) => self.check_expr(value, scope),
            None => Type::Void,
        };
        let span = ret.value.as_ref().map(|v| v.span()).unwrap_or(ret.span);
        match self.current_return.clone() {
            Some(expected) => self.check_assignable(&ty, &expected, span),
            None => self.error(
                code::SEM_TYPE_MISMATCH,
                "Return outside of a function".to_string(),
                ret.span,
            ),
        }
    }

    /// Check an if/elif/else chain. Conditions follow truthiness, so any
    /// type is accepted.
    fn check_if(&mut self, if_stmt: &IfStmt, scope: ScopeId) {
        for branch in &if_stmt.branches {
            self.check_expr(&branch.test, scope);
            for stmt in &branch.body {
                self.check_stmt(stmt, scope);
            }
        }
        if let Some(else_body) = &if_stmt.else_body {
            for stmt in else_body {
                self.check_stmt(stmt, scope);
            }
        }
    }

    fn check_while(&mut self, while_stmt: &WhileStmt, scope: ScopeId) {
        self.check_expr(&while_stmt.test, scope);
        for stmt in &while_stmt.body {
            self.check_stmt(stmt, scope);
        }
    }

    /// Check a for loop. Iterating a known container narrows the loop
    /// variable to the element type; anything unknown leaves it `any`.
    fn check_for(&mut self, for_stmt: &ForStmt, scope: ScopeId) {
        let iter = self.check_expr(&for_stmt.iter, scope);
        let element = match iter {
            Type::List(element) => *element,
            Type::Dict(key, _) => *key,
            Type::Str => Type::Str,
            Type::Any => Type::Any,
            other => {
                self.error(
                    code::SEM_TYPE_MISMATCH,
                    format!("Type '{}' is not iterable", other),
                    for_stmt.iter.span(),
                );
                Type::Any
            }
        };
        if let Some(id) = self.symbols.resolve_local(for_stmt.scope, &for_stmt.target) {
            self.symbols.set_type(id, element);
        }
        for stmt in &for_stmt.body {
            self.check_stmt(stmt, for_stmt.scope);
        }
    }

    /// Check an assignment statement.
    fn check_assign(&mut self, assign: &AssignStmt, scope: ScopeId) {
        let value = self.check_expr(&assign.value, scope);

        if let Expression::Identifier(target) = &assign.target {
            let Some(id) = self.symbols.resolve(scope, &target.name) else {
                self.undefined(&target.name, target.span);
                return;
            };
            match self.symbols.resolved_type(id) {
                // The first concrete assignment pins an untyped slot
                None | Some(Type::Any) => {
                    let ty = if value == Type::Void { Type::Any } else { value };
                    self.symbols.set_type(id, ty);
                }
                Some(current) => {
                    self.check_assignable(&value, &current, assign.value.span())
                }
            }
            return;
        }

        // Attribute and index targets: the slot type is the type of the
        // target expression itself
        let target = self.check_expr(&assign.target, scope);
        self.check_assignable(&value, &target, assign.value.span());
    }

    /// Check an augmented assignment such as `x += 1`.
    fn check_aug_assign(&mut self, assign: &AugAssignStmt, scope: ScopeId) {
        let target = self.check_expr(&assign.target, scope);
        let value = self.check_expr(&assign.value, scope);
        match promoted_type(assign.operator, &target, &value) {
            // `x += 0.5` promotes to float, which an int slot cannot hold
            Some(result) => self.check_assignable(&result, &target, assign.span),
            None => self.operand_mismatch(assign.operator, &target, &value, assign.span),
        }
    }

    /// Check an expression and return its type.
    fn check_expr(&mut self, expr: &Expression, scope: ScopeId) -> Type {
        match expr {
            Expression::IntLiteral(_) => Type::Int,
            Expression::FloatLiteral(_) => Type::Float,
            Expression::StringLiteral(_) => Type::Str,
            Expression::BooleanLiteral(_) => Type::Bool,
            Expression::NoneLiteral(_) => Type::Void,
            Expression::Identifier(ident) => self.check_identifier(ident, scope),
            Expression::Attribute(attr) => self.check_attribute(attr, scope),
            Expression::Call(call) => self.check_call(call, scope),
            Expression::Index(index) => self.check_index(index, scope),
            Expression::Unary(unary) => self.check_unary(unary, scope),
            Expression::Binary(binary) => self.check_binary(binary, scope),
            Expression::List(list) => self.check_list(list, scope),
            Expression::Dict(dict) => self.check_dict(dict, scope),
        }
    }

    fn check_identifier(&mut self, ident: &Identifier, scope: ScopeId) -> Type {
        match self.symbols.resolve(scope, &ident.name) {
            Some(id) => self.symbol_value_type(id),
            None => {
                self.undefined(&ident.name, ident.span);
                Type::Any
            }
        }
    }

    /// Check attribute access. Module values expose their exported scope;
    /// other types have no attributes.
    fn check_attribute(&mut self, attr: &AttributeExpression, scope: ScopeId) -> Type {
        let object = self.check_expr(&attr.object, scope);
        match object {
            Type::Module(exported) => {
                match self.symbols.resolve_local(exported, &attr.attr) {
                    Some(id) => self.symbol_value_type(id),
                    None => {
                        let message = match attr.object.as_ref() {
                            Expression::Identifier(ident) => format!(
                                "Module '{}' has no attribute '{}'",
                                ident.name, attr.attr
                            ),
                            _ => format!("Module has no attribute '{}'", attr.attr),
                        };
                        self.error(code::SEM_UNDEFINED_SYMBOL, message, attr.span);
                        Type::Any
                    }
                }
            }
            Type::Any => Type::Any,
            other => {
                self.error(
                    code::SEM_TYPE_MISMATCH,
                    format!("Type '{}' has no attribute '{}'", other, attr.attr),
                    attr.span,
                );
                Type::Any
            }
        }
    }

    /// Check a function call: arity, then per-argument assignability.
    fn check_call(&mut self, call: &CallExpression, scope: ScopeId) -> Type {
        let callee = self.check_expr(&call.callee, scope);
        let args: Vec<Type> = call
            .args
            .iter()
            .map(|arg| self.check_expr(arg, scope))
            .collect();

        match callee {
            Type::Function { params, ret } => {
                if args.len() != params.len() {
                    self.error(
                        code::SEM_TYPE_MISMATCH,
                        format!(
                            "Expected {} argument(s), found {}",
                            params.len(),
                            args.len()
                        ),
                        call.span,
                    );
                    return *ret;
                }
                for ((arg, param), expr) in args.iter().zip(&params).zip(&call.args) {
                    self.check_assignable(arg, param, expr.span());
                }
                *ret
            }
            Type::Any => Type::Any,
            other => {
                self.error(
                    code::SEM_TYPE_MISMATCH,
                    format!("Type '{}' is not callable", other),
                    call.span,
                );
                Type::Any
            }
        }
    }

    fn check_index(&mut self, index: &IndexExpression, scope: ScopeId) -> Type {
        let object = self.check_expr(&index.object, scope);
        let key = self.check_expr(&index.index, scope);
        match object {
            Type::List(element) => {
                self.check_assignable(&key, &Type::Int, index.index.span());
                *element
            }
            Type::Dict(dict_key, value) => {
                self.check_assignable(&key, &dict_key, index.index.span());
                *value
            }
            Type::Str => {
                self.check_assignable(&key, &Type::Int, index.index.span());
                Type::Str
            }
            Type::Any => Type::Any,
            other => {
                self.error(
                    code::SEM_TYPE_MISMATCH,
                    format!("Type '{}' is not indexable", other),
                    index.span,
                );
                Type::Any
            }
        }
    }

    fn check_unary(&mut self, unary: &UnaryExpression, scope: ScopeId) -> Type {
        let operand = self.check_expr(&unary.operand, scope);
        match unary.operator {
            // `not` applies truthiness, so any operand works
            UnaryOperator::Not => Type::Bool,
            UnaryOperator::Negate => match operand {
                Type::Int => Type::Int,
                Type::Float => Type::Float,
                Type::Any => Type::Any,
                other => {
                    self.unary_mismatch("-", &other, unary.span);
                    Type::Any
                }
            },
            UnaryOperator::BitwiseNot => match operand {
                Type::Int => Type::Int,
                Type::Any => Type::Any,
                other => {
                    self.unary_mismatch("~", &other, unary.span);
                    Type::Any
                }
            },
        }
    }

    fn check_binary(&mut self, binary: &BinaryExpression, scope: ScopeId) -> Type {
        let left = self.check_expr(&binary.left, scope);
        let right = self.check_expr(&binary.right, scope);
        match promoted_type(binary.operator, &left, &right) {
            Some(ty) => ty,
            None => {
                self.operand_mismatch(binary.operator, &left, &right, binary.span);
                Type::Any
            }
        }
    }

    /// Infer a list literal's element type. Mixed elements widen to `any`.
    fn check_list(&mut self, list: &ListExpression, scope: ScopeId) -> Type {
        let mut element = None;
        for item in &list.items {
            let ty = self.check_expr(item, scope);
            merge(&mut element, ty);
        }
        Type::List(Box::new(element.unwrap_or(Type::Any)))
    }

    fn check_dict(&mut self, dict: &DictExpression, scope: ScopeId) -> Type {
        let mut key = None;
        let mut value = None;
        for (k, v) in &dict.entries {
            let key_ty = self.check_expr(k, scope);
            let value_ty = self.check_expr(v, scope);
            merge(&mut key, key_ty);
            merge(&mut value, value_ty);
        }
        Type::Dict(
            Box::new(key.unwrap_or(Type::Any)),
            Box::new(value.unwrap_or(Type::Any)),
        )
    }

    /// Resolve a type annotation. Annotation names go through the builtin
    /// type table rather than the scope chain, so `str` and `int` keep
    /// naming types here even though the conversion functions shadow them
    /// as values.
    fn annotation_type(&mut self, annotation: &TypeAnnotation) -> Type {
        let args: Vec<Type> = annotation
            .args
            .iter()
            .map(|arg| self.annotation_type(arg))
            .collect();
        match builtin_type(&annotation.name, &args) {
            Some(ty) => ty,
            None => {
                self.error(
                    code::SEM_UNDEFINED_SYMBOL,
                    format!("Unknown type '{}'", annotation.name),
                    annotation.span,
                );
                Type::Any
            }
        }
    }

    /// The type a symbol has when read as a value. Modules read as module
    /// values; anything without a known type reads as `any`.
    fn symbol_value_type(&mut self, id: SymbolId) -> Type {
        let symbol = self.symbols.symbol(id);
        if symbol.kind == SymbolKind::Module {
            return match symbol.exported_scope {
                Some(exported) => Type::Module(exported),
                None => Type::Any,
            };
        }
        self.symbols.resolved_type(id).unwrap_or(Type::Any)
    }

    fn check_assignable(&mut self, source: &Type, target: &Type, span: Span) {
        if !source.is_assignable_to(target) {
            self.error(
                code::SEM_TYPE_MISMATCH,
                format!("Type '{}' is not assignable to '{}'", source, target),
                span,
            );
        }
    }

    fn operand_mismatch(&mut self, op: BinaryOperator, left: &Type, right: &Type, span: Span) {
        self.error(
            code::SEM_TYPE_MISMATCH,
            format!(
                "Unsupported operand types for '{}': '{}' and '{}'",
                op.symbol(),
                left,
                right
            ),
            span,
        );
    }

    fn unary_mismatch(&mut self, op: &str, operand: &Type, span: Span) {
        self.error(
            code::SEM_TYPE_MISMATCH,
            format!("Unsupported operand type for '{}': '{}'", op, operand),
            span,
        );
    }

    fn undefined(&mut self, name: &str, span: Span) {
        self.error(
            code::SEM_UNDEFINED_SYMBOL,
            format!("Undefined variable '{}'", name),
            span,
        );
    }

    fn error(&mut self, code: &str, message: String, span: Span) {
        let location = Location::new(self.file, span.line, span.column);
        self.tracker.error(code, message, Some(location));
    }
}

/// Fold element types together: equal types keep, mixed widen to `any`.
fn merge(slot: &mut Option<Type>, ty: Type) {
    match slot {
        None => *slot = Some(ty),
        Some(current) if *current != ty => *slot = Some(Type::Any),
        Some(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::module::{ModuleResolver, ScopeCache};
    use crate::parser::lexer::Lexer;
    use crate::parser::parser::parse;
    use tempfile::TempDir;

    fn check_in(source: &str, symbols: &mut SymbolTable, scopes: &ScopeCache) -> IssueTracker {
        let dir = TempDir::new().unwrap();
        let resolver = ModuleResolver::new(dir.path()).unwrap();
        let mut tracker = IssueTracker::new();
        let (tokens, interner) = Lexer::new(source).tokenize().unwrap();
        let file = dir.path().join("main.ibci");
        let module = parse(
            &tokens,
            &interner,
            symbols,
            scopes,
            &resolver,
            &mut tracker,
            &file,
            "",
        );
        assert!(
            !tracker.has_errors(),
            "parse errors: {:?}",
            tracker.diagnostics()
        );
        SemanticAnalyzer::new(symbols, &mut tracker, &file).check_module(&module);
        tracker
    }

    fn check_source(source: &str) -> IssueTracker {
        let mut symbols = SymbolTable::new();
        let scopes = ScopeCache::new();
        check_in(source, &mut symbols, &scopes)
    }

    fn codes(tracker: &IssueTracker) -> Vec<&str> {
        tracker
            .diagnostics()
            .iter()
            .map(|d| d.code.as_str())
            .collect()
    }

    #[test]
    fn test_typed_declaration_mismatch() {
        let tracker = check_source("int x = \"hello\"\n");
        assert_eq!(codes(&tracker), vec![code::SEM_TYPE_MISMATCH]);
        assert!(tracker.diagnostics()[0].message.contains("'str'"));
    }

    #[test]
    fn test_var_infers_value_type() {
        let tracker = check_source("var x = 1\nx = 2\n");
        assert!(!tracker.has_errors());

        let tracker = check_source("var x = 1\nx = 2.5\n");
        assert_eq!(codes(&tracker), vec![code::SEM_TYPE_MISMATCH]);
    }

    #[test]
    fn test_undefined_variable() {
        let tracker = check_source("print(missing)\n");
        assert_eq!(codes(&tracker), vec![code::SEM_UNDEFINED_SYMBOL]);
        assert!(tracker.diagnostics()[0].message.contains("missing"));
    }

    #[test]
    fn test_assignment_to_undefined() {
        let tracker = check_source("y = 1\n");
        assert_eq!(codes(&tracker), vec![code::SEM_UNDEFINED_SYMBOL]);
    }

    #[test]
    fn test_function_call_checks_signature() {
        let source = "\
func add(int a, int b) -> int:
    return a + b
var total = add(1, 2)
int t = total
";
        assert!(!check_source(source).has_errors());

        let bad_arg = "\
func add(int a, int b) -> int:
    return a + b
add(1, \"two\")
";
        let tracker = check_source(bad_arg);
        assert_eq!(codes(&tracker), vec![code::SEM_TYPE_MISMATCH]);

        let bad_arity = "\
func add(int a, int b) -> int:
    return a + b
add(1)
";
        let tracker = check_source(bad_arity);
        assert!(tracker.diagnostics()[0].message.contains("2 argument(s)"));
    }

    #[test]
    fn test_return_type_checked() {
        let tracker = check_source("func f() -> int:\n    return \"s\"\n");
        assert_eq!(codes(&tracker), vec![code::SEM_TYPE_MISMATCH]);
    }

    #[test]
    fn test_return_without_annotation_means_void() {
        let tracker = check_source("func f():\n    return 5\n");
        assert_eq!(codes(&tracker), vec![code::SEM_TYPE_MISMATCH]);

        assert!(!check_source("func f():\n    return\n").has_errors());
    }

    #[test]
    fn test_return_outside_function() {
        let tracker = check_source("return 1\n");
        assert!(tracker.diagnostics()[0].message.contains("outside"));
    }

    #[test]
    fn test_arithmetic_promotes_to_float() {
        assert!(!check_source("var x = 1 + 2.5\nfloat y = x\n").has_errors());
    }

    #[test]
    fn test_unsupported_operands_reported() {
        let tracker = check_source("var x = 1 + \"s\"\n");
        assert_eq!(codes(&tracker), vec![code::SEM_TYPE_MISMATCH]);
        assert!(tracker.diagnostics()[0]
            .message
            .contains("Unsupported operand types for '+'"));
    }

    #[test]
    fn test_builtin_signatures_available() {
        let source = "\
var n = len([1, 2])
int m = n
var s = str(3.5)
str t = s
";
        assert!(!check_source(source).has_errors());
    }

    #[test]
    fn test_for_narrows_loop_variable() {
        let source = "\
for i in range(3):
    int x = i
";
        assert!(!check_source(source).has_errors());
    }

    #[test]
    fn test_for_over_non_iterable() {
        let tracker = check_source("for i in 5:\n    pass\n");
        assert!(tracker.diagnostics()[0].message.contains("not iterable"));
    }

    #[test]
    fn test_index_typing() {
        let source = "\
var xs = [1, 2]
int first = xs[0]
";
        assert!(!check_source(source).has_errors());

        let tracker = check_source("var xs = [1, 2]\nxs[\"a\"]\n");
        assert_eq!(codes(&tracker), vec![code::SEM_TYPE_MISMATCH]);
    }

    #[test]
    fn test_mixed_list_widens_to_any() {
        let source = "\
var xs = [1, \"a\"]
str s = xs[0]
";
        assert!(!check_source(source).has_errors());
    }

    #[test]
    fn test_not_callable() {
        let tracker = check_source("var x = 1\nx(2)\n");
        assert!(tracker.diagnostics()[0].message.contains("not callable"));
    }

    #[test]
    fn test_attribute_on_primitive() {
        let tracker = check_source("var x = 1\nx.field\n");
        assert!(tracker.diagnostics()[0]
            .message
            .contains("has no attribute 'field'"));
    }

    #[test]
    fn test_unknown_annotation() {
        let tracker = check_source("wibble x = 1\n");
        assert_eq!(codes(&tracker), vec![code::SEM_UNDEFINED_SYMBOL]);
        assert!(tracker.diagnostics()[0].message.contains("Unknown type"));
    }

    #[test]
    fn test_aug_assign_promotion() {
        assert!(!check_source("var x = 1\nx += 2\n").has_errors());

        let tracker = check_source("var x = 1\nx += 2.5\n");
        assert_eq!(codes(&tracker), vec![code::SEM_TYPE_MISMATCH]);
    }

    fn geometry_fixture() -> (SymbolTable, ScopeCache) {
        let mut symbols = SymbolTable::new();
        let mut scopes = ScopeCache::new();
        let geometry = symbols.new_module_scope();
        symbols.define_typed(
            geometry,
            "area",
            SymbolKind::Function,
            Type::Function {
                params: vec![Type::Float],
                ret: Box::new(Type::Float),
            },
        );
        scopes.insert(
            std::path::PathBuf::from("geometry.ibci"),
            "geometry".to_string(),
            geometry,
        );
        (symbols, scopes)
    }

    #[test]
    fn test_module_attribute_types_flow() {
        let (mut symbols, scopes) = geometry_fixture();
        let source = "\
import geometry
var a = geometry.area(1.5)
int bad = a
";
        let tracker = check_in(source, &mut symbols, &scopes);
        // One error proves `a` was inferred as float from the module
        assert_eq!(codes(&tracker), vec![code::SEM_TYPE_MISMATCH]);
        assert!(tracker.diagnostics()[0].message.contains("'float'"));
    }

    #[test]
    fn test_module_missing_attribute() {
        let (mut symbols, scopes) = geometry_fixture();
        let source = "import geometry\ngeometry.missing\n";
        let tracker = check_in(source, &mut symbols, &scopes);
        assert_eq!(codes(&tracker), vec![code::SEM_UNDEFINED_SYMBOL]);
        assert!(tracker.diagnostics()[0]
            .message
            .contains("Module 'geometry' has no attribute 'missing'"));
    }
}
