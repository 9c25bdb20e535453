//! Import parsing and cross-module symbol binding.
//!
//! Import clauses are parsed twice in a module's life: once by the
//! import scanner during dependency discovery (straight off the token
//! stream, before anything compiles) and once here during the real
//! parse, when the names get bound. [`TokenCursor`] and
//! [`parse_import_clause`] are the shared machinery for both.
//!
//! Binding gives every imported name a symbol immediately, whatever the
//! compile state of the source module. Plain imports build chains of
//! module symbols whose exported scopes are the real module scopes when
//! compiled and empty placeholders when not. From-imports defer each
//! name's type to the origin symbol, so types flow once the source
//! module is compiled.

use super::guards::LoopGuard;
use super::{ParseError, Parser};
use crate::compiler::module::ResolveError;
use crate::diagnostics::{code, Location};
use crate::parser::ast::*;
use crate::parser::interner::Interner;
use crate::parser::scope::{ScopeId, SymbolKind, TypeSlot};
use crate::parser::token::{Span, Token};

/// Minimal cursor over a token stream, shared with the import scanner.
pub struct TokenCursor<'a> {
    tokens: &'a [(Token, Span)],
    pub pos: usize,
    interner: &'a Interner,
}

impl<'a> TokenCursor<'a> {
    pub fn new(tokens: &'a [(Token, Span)], interner: &'a Interner) -> Self {
        Self::at(tokens, interner, 0)
    }

    pub fn at(tokens: &'a [(Token, Span)], interner: &'a Interner, pos: usize) -> Self {
        Self {
            tokens,
            pos,
            interner,
        }
    }

    pub fn current(&self) -> Token {
        self.tokens.get(self.pos).map(|(t, _)| *t).unwrap_or(Token::Eof)
    }

    pub fn current_span(&self) -> Span {
        self.tokens.get(self.pos).map(|(_, s)| *s).unwrap_or_default()
    }

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

    pub fn eat(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            return true;
        }
        false
    }

    pub fn at_eof(&self) -> bool {
        matches!(self.current(), Token::Eof)
    }

    fn expect_identifier(&mut self, what: &str) -> Result<(String, Span), ParseError> {
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
}

/// One parsed import clause, before any symbol binding.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportClause {
    /// `import a.b [as c], d [as e]`
    Plain { names: Vec<ImportAlias>, span: Span },
    /// `from [.]*module import x [as y], ...` or `import *`
    From {
        module: String,
        level: u32,
        names: Vec<ImportAlias>,
        star: bool,
        span: Span,
    },
}

impl ImportClause {
    pub fn span(&self) -> Span {
        match self {
            ImportClause::Plain { span, .. } | ImportClause::From { span, .. } => *span,
        }
    }
}

/// Parse an import clause starting at the `import` or `from` keyword.
/// Stops before the statement's newline.
pub fn parse_import_clause(cursor: &mut TokenCursor<'_>) -> Result<ImportClause, ParseError> {
    match cursor.current() {
        Token::Import => parse_plain_clause(cursor),
        Token::From => parse_from_clause(cursor),
        other => Err(ParseError::unexpected(
            format!("Expected 'import' or 'from', found '{}'", other),
            cursor.current_span(),
        )),
    }
}

fn parse_plain_clause(cursor: &mut TokenCursor<'_>) -> Result<ImportClause, ParseError> {
    let start = cursor.current_span();
    cursor.advance();

    let mut names = Vec::new();
    let mut end = start;
    let mut guard = LoopGuard::new("import_names");
    loop {
        guard.check()?;
        let (name, name_span) = parse_dotted_name(cursor)?;
        end = name_span;
        let alias = if cursor.eat(&Token::As) {
            let (alias, alias_span) = cursor.expect_identifier("import alias")?;
            end = alias_span;
            Some(alias)
        } else {
            None
        };
        names.push(ImportAlias {
            name,
            alias,
            span: name_span,
        });
        if !cursor.eat(&Token::Comma) {
            break;
        }
    }

    Ok(ImportClause::Plain {
        names,
        span: start.merge(&end),
    })
}

fn parse_from_clause(cursor: &mut TokenCursor<'_>) -> Result<ImportClause, ParseError> {
    let start = cursor.current_span();
    cursor.advance();

    let mut level = 0u32;
    while cursor.check(&Token::Dot) {
        level += 1;
        cursor.advance();
    }

    let module = if matches!(cursor.current(), Token::Identifier(_)) {
        parse_dotted_name(cursor)?.0
    } else {
        String::new()
    };
    if level == 0 && module.is_empty() {
        return Err(ParseError::unexpected(
            format!("Expected module name after 'from', found '{}'", cursor.current()),
            cursor.current_span(),
        ));
    }

    if !cursor.eat(&Token::Import) {
        return Err(ParseError::unexpected(
            format!("Expected 'import', found '{}'", cursor.current()),
            cursor.current_span(),
        ));
    }

    if cursor.check(&Token::Star) {
        let end = cursor.current_span();
        cursor.advance();
        return Ok(ImportClause::From {
            module,
            level,
            names: Vec::new(),
            star: true,
            span: start.merge(&end),
        });
    }

    let mut names = Vec::new();
    let mut end = start;
    let mut guard = LoopGuard::new("from_import_names");
    loop {
        guard.check()?;
        let (name, name_span) = cursor.expect_identifier("imported name")?;
        end = name_span;
        let alias = if cursor.eat(&Token::As) {
            let (alias, alias_span) = cursor.expect_identifier("import alias")?;
            end = alias_span;
            Some(alias)
        } else {
            None
        };
        names.push(ImportAlias {
            name,
            alias,
            span: name_span,
        });
        if !cursor.eat(&Token::Comma) {
            break;
        }
    }

    Ok(ImportClause::From {
        module,
        level,
        names,
        star: false,
        span: start.merge(&end),
    })
}

/// `a.b.c` as one dotted name.
fn parse_dotted_name(cursor: &mut TokenCursor<'_>) -> Result<(String, Span), ParseError> {
    let (mut name, mut span) = cursor.expect_identifier("module name")?;
    while cursor.check(&Token::Dot) {
        cursor.advance();
        let (part, part_span) = cursor.expect_identifier("module name")?;
        name.push('.');
        name.push_str(&part);
        span = span.merge(&part_span);
    }
    Ok((name, span))
}

/// Parse an `import` or `from` statement and bind the imported names.
pub fn parse_import_statement(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let clause = {
        let mut cursor = TokenCursor::at(parser.tokens, parser.interner, parser.pos);
        let result = parse_import_clause(&mut cursor);
        parser.pos = cursor.pos;
        result?
    };
    parser.consume_end_of_statement()?;

    match clause {
        ImportClause::Plain { names, span } => {
            for alias in &names {
                bind_plain_import(parser, alias);
            }
            Ok(Statement::Import(ImportStmt { names, span }))
        }
        ImportClause::From {
            module,
            level,
            names,
            star,
            span,
        } => {
            bind_from_import(parser, &module, level, &names, star, span);
            Ok(Statement::FromImport(FromImportStmt {
                module,
                level,
                names,
                star,
                span,
            }))
        }
    }
}

/// Bind `import a.b.c [as m]`.
///
/// With an alias only the alias is defined. Without one, the dotted
/// chain becomes nested module symbols: `a` in the importing scope, `b`
/// inside `a`'s exported scope, `c` inside `b`'s. A chain link whose
/// module is compiled gets the real module scope; otherwise it gets an
/// empty placeholder so attribute chains stay navigable.
fn bind_plain_import(parser: &mut Parser<'_>, alias: &ImportAlias) {
    let importing_scope = parser.symbols.current_scope();

    if let Some(bound) = &alias.alias {
        let scope = lookup_module_scope(parser, &alias.name, &alias.name, alias.span);
        let sym = parser.symbols.define(importing_scope, bound, SymbolKind::Module);
        if let Some(scope) = scope {
            parser.symbols.set_exported_scope(sym, scope);
        }
        return;
    }

    let target_scope = lookup_module_scope(parser, &alias.name, &alias.name, alias.span);

    let parts: Vec<&str> = alias.name.split('.').collect();
    let mut container = importing_scope;
    let mut prefix = String::new();
    for (i, part) in parts.iter().enumerate() {
        if !prefix.is_empty() {
            prefix.push('.');
        }
        prefix.push_str(part);
        let last = i + 1 == parts.len();

        // Reuse this link's module symbol if an earlier import made one
        let existing = parser
            .symbols
            .resolve_local(container, part)
            .filter(|s| parser.symbols.symbol(*s).kind == SymbolKind::Module);
        let sym = match existing {
            Some(sym) => sym,
            None => parser.symbols.define(container, part, SymbolKind::Module),
        };

        // Intermediate links upgrade from the registry when their
        // module has compiled since the placeholder was made
        let scope = if last {
            target_scope
        } else {
            parser.scopes.get_by_name(&prefix)
        };
        match scope {
            Some(scope) => parser.symbols.set_exported_scope(sym, scope),
            None if !last && parser.symbols.symbol(sym).exported_scope.is_none() => {
                let placeholder = parser.symbols.new_placeholder_scope();
                parser.symbols.set_exported_scope(sym, placeholder);
            }
            None => {}
        }

        container = match parser.symbols.symbol(sym).exported_scope {
            Some(scope) => scope,
            None => return,
        };
    }
}

/// Bind `from [.]*module import names` (or `*`).
fn bind_from_import(
    parser: &mut Parser<'_>,
    module: &str,
    level: u32,
    names: &[ImportAlias],
    star: bool,
    span: Span,
) {
    let importing_scope = parser.symbols.current_scope();
    let origin_scope = from_import_origin(parser, module, level, span);

    if star {
        let Some(origin) = origin_scope else { return };
        // Exported names are copied with their current type; no origin
        // link is kept, a later recompile of the source module does not
        // flow through
        for (name, origin_id) in parser.symbols.exported_names(origin) {
            let (kind, slot, exported) = {
                let symbol = parser.symbols.symbol(origin_id);
                (symbol.kind, symbol.ty.clone(), symbol.exported_scope)
            };
            let sym = match slot {
                TypeSlot::Resolved(ty) => {
                    parser.symbols.define_typed(importing_scope, &name, kind, ty)
                }
                _ => parser.symbols.define(importing_scope, &name, kind),
            };
            if let Some(exported) = exported {
                parser.symbols.set_exported_scope(sym, exported);
            }
        }
        return;
    }

    for alias in names {
        let bound = alias.bound_name();
        let origin = origin_scope.and_then(|scope| parser.symbols.resolve_local(scope, &alias.name));
        match origin {
            Some(origin_id) => {
                let (kind, exported) = {
                    let symbol = parser.symbols.symbol(origin_id);
                    (symbol.kind, symbol.exported_scope)
                };
                let sym = parser.symbols.define(importing_scope, bound, kind);
                parser.symbols.set_deferred(sym, origin_id);
                if let Some(exported) = exported {
                    parser.symbols.set_exported_scope(sym, exported);
                }
            }
            None => {
                // Unknown origin: bind an untyped variable so uses stay
                // permissive instead of cascading errors
                parser.symbols.define(importing_scope, bound, SymbolKind::Variable);
            }
        }
    }
}

/// Locate the scope a from-import pulls names out of.
fn from_import_origin(
    parser: &mut Parser<'_>,
    module: &str,
    level: u32,
    span: Span,
) -> Option<ScopeId> {
    if level == 0 {
        return lookup_module_scope(parser, module, module, span);
    }

    // Name arithmetic before touching the filesystem: a level deeper
    // than the containing package has no absolute spelling
    let absolute = match absolute_from_relative(parser.package, module, level) {
        Some(name) => name,
        None => {
            report(
                parser,
                code::DEP_RELATIVE_LEVEL,
                "Attempted relative import beyond top-level package".to_string(),
                span,
            );
            return None;
        }
    };

    let dotted = format!("{}{}", ".".repeat(level as usize), module);
    lookup_module_scope(parser, &dotted, &absolute, span)
}

/// Convert a relative import to an absolute dotted name against the
/// containing package. One dot stays inside the package, each further
/// dot drops one trailing segment. `None` when the walk leaves the
/// top-level package.
fn absolute_from_relative(package: &str, module: &str, level: u32) -> Option<String> {
    let segments: Vec<&str> = if package.is_empty() {
        Vec::new()
    } else {
        package.split('.').collect()
    };
    let drop = level.saturating_sub(1) as usize;
    if drop > segments.len() {
        return None;
    }

    let mut name = segments[..segments.len() - drop].join(".");
    if !module.is_empty() {
        if !name.is_empty() {
            name.push('.');
        }
        name.push_str(module);
    }
    Some(name)
}

/// Find the exported scope of a module, reporting resolution problems
/// as diagnostics.
///
/// `resolver_name` is the dotted form the resolver understands (leading
/// dots included); `registry_name` is the absolute dotted name modules
/// are registered under. Namespace packages legitimately have no scope
/// and stay silent.
fn lookup_module_scope(
    parser: &mut Parser<'_>,
    resolver_name: &str,
    registry_name: &str,
    span: Span,
) -> Option<ScopeId> {
    match parser.resolver.resolve(resolver_name, parser.file) {
        Ok(path) => {
            if let Some(scope) = parser.scopes.get_by_path(&path) {
                return Some(scope);
            }
            parser.scopes.get_by_name(registry_name)
        }
        Err(err @ ResolveError::ModuleNotFound { .. }) => {
            if parser.resolver.is_package_directory(resolver_name, parser.file) {
                return None;
            }
            // The registry may still know the name: single-file runs
            // register scopes without files behind them
            if let Some(scope) = parser.scopes.get_by_name(registry_name) {
                return Some(scope);
            }
            report(parser, code::DEP_MODULE_NOT_FOUND, err.to_string(), span);
            None
        }
        Err(err @ ResolveError::SecurityViolation { .. }) => {
            report(parser, code::DEP_SECURITY_VIOLATION, err.to_string(), span);
            None
        }
        Err(err @ ResolveError::Io { .. }) => {
            report(parser, code::DEP_FILE_NOT_FOUND, err.to_string(), span);
            None
        }
    }
}

fn report(parser: &mut Parser<'_>, code: &str, message: String, span: Span) {
    let location = Location::new(parser.file.to_path_buf(), span.line, span.column);
    parser.tracker.error(code, message, Some(location));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::module::{ModuleResolver, ScopeCache};
    use crate::diagnostics::IssueTracker;
    use crate::parser::ast::Module;
    use crate::parser::lexer::Lexer;
    use crate::parser::parser::parse;
    use crate::parser::scope::SymbolTable;
    use crate::parser::types::Type;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn clause(source: &str) -> Result<ImportClause, ParseError> {
        let (tokens, interner) = Lexer::new(source).tokenize().unwrap();
        let mut cursor = TokenCursor::new(&tokens, &interner);
        parse_import_clause(&mut cursor)
    }

    #[test]
    fn test_plain_clause_single_name() {
        match clause("import utils\n").unwrap() {
            ImportClause::Plain { names, .. } => {
                assert_eq!(names.len(), 1);
                assert_eq!(names[0].name, "utils");
                assert!(names[0].alias.is_none());
            }
            other => panic!("expected plain clause, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_clause_dotted_with_aliases() {
        match clause("import utils.math as m, core\n").unwrap() {
            ImportClause::Plain { names, .. } => {
                assert_eq!(names.len(), 2);
                assert_eq!(names[0].name, "utils.math");
                assert_eq!(names[0].alias.as_deref(), Some("m"));
                assert_eq!(names[1].name, "core");
            }
            other => panic!("expected plain clause, got {:?}", other),
        }
    }

    #[test]
    fn test_from_clause_counts_level() {
        match clause("from ..shared.geo import area as a, perimeter\n").unwrap() {
            ImportClause::From {
                module,
                level,
                names,
                star,
                ..
            } => {
                assert_eq!(module, "shared.geo");
                assert_eq!(level, 2);
                assert!(!star);
                assert_eq!(names.len(), 2);
                assert_eq!(names[0].bound_name(), "a");
                assert_eq!(names[1].bound_name(), "perimeter");
            }
            other => panic!("expected from clause, got {:?}", other),
        }
    }

    #[test]
    fn test_from_clause_dot_only() {
        match clause("from . import helper\n").unwrap() {
            ImportClause::From { module, level, .. } => {
                assert_eq!(module, "");
                assert_eq!(level, 1);
            }
            other => panic!("expected from clause, got {:?}", other),
        }
    }

    #[test]
    fn test_from_clause_star() {
        match clause("from utils import *\n").unwrap() {
            ImportClause::From { star, names, .. } => {
                assert!(star);
                assert!(names.is_empty());
            }
            other => panic!("expected from clause, got {:?}", other),
        }
    }

    #[test]
    fn test_from_clause_requires_module() {
        assert!(clause("from import x\n").is_err());
    }

    #[test]
    fn test_plain_clause_rejects_trailing_dot() {
        assert!(clause("import utils.\n").is_err());
    }

    #[test]
    fn test_relative_arithmetic() {
        assert_eq!(
            absolute_from_relative("pkg.sub", "shared", 2).as_deref(),
            Some("pkg.shared")
        );
        assert_eq!(
            absolute_from_relative("pkg.sub", "x", 1).as_deref(),
            Some("pkg.sub.x")
        );
        assert_eq!(
            absolute_from_relative("pkg.sub", "x", 3).as_deref(),
            Some("x")
        );
        assert_eq!(absolute_from_relative("pkg.sub", "x", 4), None);
        assert_eq!(absolute_from_relative("", "x", 2), None);
        assert_eq!(absolute_from_relative("pkg", "", 1).as_deref(), Some("pkg"));
    }

    struct Fixture {
        dir: TempDir,
        symbols: SymbolTable,
        scopes: ScopeCache,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
                symbols: SymbolTable::new(),
                scopes: ScopeCache::new(),
            }
        }

        /// Register a compiled module under `name` with the given typed
        /// symbols.
        fn register(&mut self, name: &str, entries: &[(&str, Type)]) -> ScopeId {
            let scope = self.symbols.new_module_scope();
            for (entry, ty) in entries {
                self.symbols
                    .define_typed(scope, entry, SymbolKind::Function, ty.clone());
            }
            let path = self.dir.path().join(format!(
                "{}.ibci",
                name.replace('.', std::path::MAIN_SEPARATOR_STR)
            ));
            self.scopes.insert(path, name.to_string(), scope);
            scope
        }

        fn parse(&mut self, source: &str, package: &str) -> (Module, IssueTracker) {
            let resolver = ModuleResolver::new(self.dir.path()).unwrap();
            let mut tracker = IssueTracker::new();
            let (tokens, interner) = Lexer::new(source).tokenize().unwrap();
            let file: PathBuf = self.dir.path().join("main.ibci");
            let module = parse(
                &tokens,
                &interner,
                &mut self.symbols,
                &self.scopes,
                &resolver,
                &mut tracker,
                &file,
                package,
            );
            (module, tracker)
        }
    }

    #[test]
    fn test_plain_import_builds_module_chain() {
        let mut fx = Fixture::new();
        let math_scope = fx.register("utils.math", &[("area", Type::Float)]);

        let (module, tracker) = fx.parse("import utils.math\n", "");
        assert!(!tracker.has_errors(), "{:?}", tracker.diagnostics());

        // 'utils' is a module symbol in the importing scope
        let utils = fx.symbols.resolve_local(module.scope, "utils").unwrap();
        let utils_sym = fx.symbols.symbol(utils);
        assert_eq!(utils_sym.kind, SymbolKind::Module);
        // 'math' lives inside utils' (placeholder) scope and exports
        // the real module scope
        let utils_scope = utils_sym.exported_scope.unwrap();
        let math = fx.symbols.resolve_local(utils_scope, "math").unwrap();
        assert_eq!(fx.symbols.symbol(math).exported_scope, Some(math_scope));
    }

    #[test]
    fn test_aliased_import_binds_only_alias() {
        let mut fx = Fixture::new();
        let math_scope = fx.register("utils.math", &[("area", Type::Float)]);

        let (module, tracker) = fx.parse("import utils.math as m\n", "");
        assert!(!tracker.has_errors());

        let m = fx.symbols.resolve_local(module.scope, "m").unwrap();
        assert_eq!(fx.symbols.symbol(m).exported_scope, Some(math_scope));
        assert!(fx.symbols.resolve_local(module.scope, "utils").is_none());
    }

    #[test]
    fn test_from_import_defers_to_origin() {
        let mut fx = Fixture::new();
        let scope = fx.register("geometry", &[("area", Type::Float)]);
        let origin = fx.symbols.resolve_local(scope, "area").unwrap();

        let (module, tracker) = fx.parse("from geometry import area as f\n", "");
        assert!(!tracker.has_errors());

        let f = fx.symbols.resolve_local(module.scope, "f").unwrap();
        assert_eq!(fx.symbols.symbol(f).ty, TypeSlot::Deferred(origin));
        assert_eq!(fx.symbols.resolved_type(f), Some(Type::Float));
    }

    #[test]
    fn test_from_import_unknown_name_binds_untyped() {
        let mut fx = Fixture::new();
        fx.register("geometry", &[("area", Type::Float)]);

        let (module, tracker) = fx.parse("from geometry import ghost\n", "");
        assert!(!tracker.has_errors());

        let ghost = fx.symbols.resolve_local(module.scope, "ghost").unwrap();
        assert_eq!(fx.symbols.symbol(ghost).kind, SymbolKind::Variable);
        assert_eq!(fx.symbols.symbol(ghost).ty, TypeSlot::Unresolved);
    }

    #[test]
    fn test_star_import_copies_public_names() {
        let mut fx = Fixture::new();
        fx.register("geometry", &[("area", Type::Float), ("_internal", Type::Int)]);

        let (module, tracker) = fx.parse("from geometry import *\n", "");
        assert!(!tracker.has_errors());

        let area = fx.symbols.resolve_local(module.scope, "area").unwrap();
        assert_eq!(fx.symbols.resolved_type(area), Some(Type::Float));
        assert!(fx.symbols.resolve_local(module.scope, "_internal").is_none());
    }

    #[test]
    fn test_missing_module_reports_diagnostic() {
        let mut fx = Fixture::new();
        let (_, tracker) = fx.parse("import ghost\n", "");
        assert!(tracker.has_errors());
        assert_eq!(tracker.diagnostics()[0].code, code::DEP_MODULE_NOT_FOUND);
    }

    #[test]
    fn test_relative_beyond_top_level_reports_dedicated_code() {
        let mut fx = Fixture::new();
        fx.register("pkg.helper", &[]);

        let (_, tracker) = fx.parse("from ...helper import x\n", "pkg");
        assert!(tracker.has_errors());
        assert_eq!(tracker.diagnostics()[0].code, code::DEP_RELATIVE_LEVEL);
    }

    #[test]
    fn test_namespace_package_import_is_silent() {
        let mut fx = Fixture::new();
        std::fs::create_dir(fx.dir.path().join("plugins")).unwrap();

        let (module, tracker) = fx.parse("import plugins\n", "");
        assert!(!tracker.has_errors(), "{:?}", tracker.diagnostics());

        let plugins = fx.symbols.resolve_local(module.scope, "plugins").unwrap();
        assert_eq!(fx.symbols.symbol(plugins).exported_scope, None);
    }

    #[test]
    fn test_repeated_import_reuses_chain_symbol() {
        let mut fx = Fixture::new();
        fx.register("utils.math", &[("area", Type::Float)]);
        fx.register("utils.strings", &[("join", Type::Str)]);

        let (module, tracker) = fx.parse("import utils.math\nimport utils.strings\n", "");
        assert!(!tracker.has_errors());

        // One 'utils' symbol carrying both submodules
        let utils = fx.symbols.resolve_local(module.scope, "utils").unwrap();
        let utils_scope = fx.symbols.symbol(utils).exported_scope.unwrap();
        assert!(fx.symbols.resolve_local(utils_scope, "math").is_some());
        assert!(fx.symbols.resolve_local(utils_scope, "strings").is_some());
    }

    #[test]
    fn test_import_position_not_enforced_by_parser() {
        // Position checks belong to the scanner; the parser itself
        // accepts imports anywhere
        let mut fx = Fixture::new();
        fx.register("geometry", &[("area", Type::Float)]);
        let (_, tracker) = fx.parse("var x = 1\nimport geometry\n", "");
        assert!(!tracker.has_errors());
    }

    #[test]
    fn test_lookup_falls_back_to_registry_name() {
        // No file on disk, but the registry knows the name
        let mut fx = Fixture::new();
        let scope = fx.symbols.new_module_scope();
        fx.symbols
            .define_typed(scope, "val", SymbolKind::Variable, Type::Int);
        fx.scopes.insert(
            Path::new("/virtual/memory.ibci").to_path_buf(),
            "memory".to_string(),
            scope,
        );

        let (module, tracker) = fx.parse("import memory\n", "");
        assert!(!tracker.has_errors(), "{:?}", tracker.diagnostics());
        let sym = fx.symbols.resolve_local(module.scope, "memory").unwrap();
        assert_eq!(fx.symbols.symbol(sym).exported_scope, Some(scope));
    }
}
