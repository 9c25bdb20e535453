//! Scope tree and symbol arena.
//!
//! Scopes and symbols live in two arenas inside [`SymbolTable`] and are
//! addressed by stable ids. Parent links, exported-scope references, and
//! deferred-type origins are all ids, never owning handles, so the
//! reference graph may contain cycles (mutual imports, re-export chains)
//! while ownership stays strictly top-down in the arena.
//!
//! A symbol may exist before its type is known. Importing `f` from a
//! not-yet-compiled module defines a symbol whose [`TypeSlot`] defers to
//! the origin symbol; readers call [`SymbolTable::resolved_type`], which
//! walks the origin chain with a cycle guard and memoizes on success.

use crate::parser::types::{Type, BUILTIN_FUNCTIONS, BUILTIN_TYPES};
use rustc_hash::FxHashMap;

/// Stable id of a scope in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Stable id of a symbol in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(u32);

impl SymbolId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// What kind of region a scope covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// The single shared root scope holding builtin names.
    Builtin,
    /// A module's top-level scope.
    Global,
    Function,
    Class,
    Block,
}

/// What kind of entity a symbol names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    BuiltinType,
    UserType,
    Function,
    Variable,
    Module,
}

/// Type knowledge about a symbol.
///
/// `Deferred` points at the symbol this one was imported from; the type
/// becomes known once that module compiles.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TypeSlot {
    #[default]
    Unresolved,
    Deferred(SymbolId),
    Resolved(Type),
}

/// One lexical or module scope.
#[derive(Debug)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    pub depth: u32,
    symbols: FxHashMap<String, SymbolId>,
}

impl Scope {
    /// Look a name up in this scope only.
    pub fn get(&self, name: &str) -> Option<SymbolId> {
        self.symbols.get(name).copied()
    }

    /// Number of symbols defined directly in this scope.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// A named entity registered in a scope.
#[derive(Debug)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Depth of the defining scope.
    pub depth: u32,
    pub ty: TypeSlot,
    /// For module symbols: the scope the module exposes to importers.
    pub exported_scope: Option<ScopeId>,
    /// The scope this symbol is defined in.
    pub scope: ScopeId,
}

/// Arena of scopes and symbols shared by every module in a compile run.
///
/// Scope 0 is the builtin scope; every module scope is created as its
/// child, so builtin names resolve from anywhere without being copied
/// into module scopes.
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
    current: ScopeId,
}

impl SymbolTable {
    /// Create a table with a populated builtin scope.
    pub fn new() -> Self {
        let mut table = Self {
            scopes: Vec::new(),
            symbols: Vec::new(),
            current: ScopeId(0),
        };
        let builtin = table.alloc_scope(ScopeKind::Builtin, None);
        table.current = builtin;
        for (name, ty) in BUILTIN_TYPES.iter() {
            table.define_typed(builtin, name, SymbolKind::BuiltinType, ty.clone());
        }
        // Conversion functions shadow the matching type names
        for (name, ty) in BUILTIN_FUNCTIONS.iter() {
            table.define_typed(builtin, name, SymbolKind::Function, ty.clone());
        }
        table
    }

    /// The shared builtin scope.
    pub fn builtin_scope(&self) -> ScopeId {
        ScopeId(0)
    }

    /// The scope the parser is currently defining names in.
    pub fn current_scope(&self) -> ScopeId {
        self.current
    }

    /// Make `scope` the current scope.
    pub fn set_current(&mut self, scope: ScopeId) {
        self.current = scope;
    }

    /// Create a fresh module scope under the builtin scope and make it
    /// current.
    pub fn new_module_scope(&mut self) -> ScopeId {
        let scope = self.alloc_scope(ScopeKind::Global, Some(self.builtin_scope()));
        self.current = scope;
        scope
    }

    /// Enter a child scope of the current scope.
    pub fn enter_scope(&mut self, kind: ScopeKind) -> ScopeId {
        let scope = self.alloc_scope(kind, Some(self.current));
        self.current = scope;
        scope
    }

    /// Return to the parent of the current scope.
    pub fn exit_scope(&mut self) {
        if let Some(parent) = self.scopes[self.current.index()].parent {
            self.current = parent;
        }
    }

    /// Create a detached empty scope.
    ///
    /// Used as the exported scope of a module symbol whose target has
    /// not been compiled yet, so chained attribute access stays
    /// structurally valid.
    pub fn new_placeholder_scope(&mut self) -> ScopeId {
        self.alloc_scope(ScopeKind::Global, None)
    }

    fn alloc_scope(&mut self, kind: ScopeKind, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        let depth = parent.map_or(0, |p| self.scopes[p.index()].depth + 1);
        self.scopes.push(Scope {
            id,
            kind,
            parent,
            children: Vec::new(),
            depth,
            symbols: FxHashMap::default(),
        });
        if let Some(parent) = parent {
            self.scopes[parent.index()].children.push(id);
        }
        id
    }

    /// Define a name in `scope` with an unresolved type.
    ///
    /// Redefinition allocates a fresh symbol and rebinds the name; the
    /// old symbol stays in the arena so origin links through it keep
    /// resolving.
    pub fn define(&mut self, scope: ScopeId, name: &str, kind: SymbolKind) -> SymbolId {
        let depth = self.scopes[scope.index()].depth;
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            name: name.to_string(),
            kind,
            depth,
            ty: TypeSlot::Unresolved,
            exported_scope: None,
            scope,
        });
        self.scopes[scope.index()].symbols.insert(name.to_string(), id);
        id
    }

    /// Define a name with a known type.
    pub fn define_typed(
        &mut self,
        scope: ScopeId,
        name: &str,
        kind: SymbolKind,
        ty: Type,
    ) -> SymbolId {
        let id = self.define(scope, name, kind);
        self.symbols[id.index()].ty = TypeSlot::Resolved(ty);
        id
    }

    /// Resolve a name by walking from `scope` up through its parents.
    pub fn resolve(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let mut cursor = Some(scope);
        while let Some(id) = cursor {
            let scope = &self.scopes[id.index()];
            if let Some(sym) = scope.get(name) {
                return Some(sym);
            }
            cursor = scope.parent;
        }
        None
    }

    /// Resolve a name in `scope` only, ignoring parents.
    ///
    /// Module attribute access uses this so a module's attributes never
    /// leak from the builtin scope or an importer's scope.
    pub fn resolve_local(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.scopes[scope.index()].get(name)
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.index()]
    }

    /// Set a symbol's type to a known value.
    pub fn set_type(&mut self, id: SymbolId, ty: Type) {
        self.symbols[id.index()].ty = TypeSlot::Resolved(ty);
    }

    /// Defer a symbol's type to the symbol it was imported from.
    pub fn set_deferred(&mut self, id: SymbolId, origin: SymbolId) {
        self.symbols[id.index()].ty = TypeSlot::Deferred(origin);
    }

    /// Set the scope a module symbol exposes to importers.
    pub fn set_exported_scope(&mut self, id: SymbolId, scope: ScopeId) {
        self.symbols[id.index()].exported_scope = Some(scope);
    }

    /// The symbol's type, following deferred links.
    ///
    /// Walks the origin chain until a resolved type or a dead end; a
    /// visited set guards against re-export cycles. A successful walk is
    /// memoized on the queried symbol. Returns `None` when the type is
    /// genuinely unknown (not yet compiled, or cyclic).
    pub fn resolved_type(&mut self, id: SymbolId) -> Option<Type> {
        let mut visited = vec![id];
        let mut cursor = id;
        loop {
            match &self.symbols[cursor.index()].ty {
                TypeSlot::Resolved(ty) => {
                    let ty = ty.clone();
                    if cursor != id {
                        self.symbols[id.index()].ty = TypeSlot::Resolved(ty.clone());
                    }
                    return Some(ty);
                }
                TypeSlot::Unresolved => return None,
                TypeSlot::Deferred(origin) => {
                    let origin = *origin;
                    if visited.contains(&origin) {
                        return None;
                    }
                    visited.push(origin);
                    cursor = origin;
                }
            }
        }
    }

    /// Names a `from module import *` would bind: every non-private
    /// symbol defined directly in `scope`, sorted for deterministic
    /// import order.
    pub fn exported_names(&self, scope: ScopeId) -> Vec<(String, SymbolId)> {
        let mut names: Vec<(String, SymbolId)> = self.scopes[scope.index()]
            .symbols
            .iter()
            .filter(|(name, _)| !name.starts_with('_'))
            .map(|(name, id)| (name.clone(), *id))
            .collect();
        names.sort_by(|a, b| a.0.cmp(&b.0));
        names
    }

    /// Number of scopes allocated.
    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
