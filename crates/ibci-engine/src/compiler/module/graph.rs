//! Import graph over discovered modules.

use rustc_hash::{FxHashMap, FxHashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Cycle detection failure carrying the exact cycle path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The cycle as walked, with the first module repeated at the end.
    #[error("Circular dependency detected: {}", format_cycle(.0))]
    Cycle(Vec<PathBuf>),
}

fn format_cycle(cycle: &[PathBuf]) -> String {
    cycle
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Dependency graph keyed by module path.
///
/// Nodes keep insertion order and traversal follows it, so identical
/// inputs produce identical topological output.
#[derive(Debug, Default)]
pub struct ModuleGraph {
    nodes: Vec<PathBuf>,
    edges: FxHashMap<PathBuf, Vec<PathBuf>>,
}

enum Visit {
    Active,
    Done,
}

impl ModuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module node. Idempotent; the first insertion fixes its
    /// position in the traversal order.
    pub fn add_node(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.edges.contains_key(&path) {
            self.nodes.push(path.clone());
            self.edges.insert(path, Vec::new());
        }
    }

    /// Add an edge from `importer` to the module it imports. Edges to
    /// paths that are not nodes are dropped; their resolution failures
    /// were already reported during discovery.
    pub fn add_edge(&mut self, importer: &Path, imported: &Path) {
        if !self.edges.contains_key(imported) {
            return;
        }
        if let Some(deps) = self.edges.get_mut(importer) {
            if !deps.iter().any(|d| d == imported) {
                deps.push(imported.to_path_buf());
            }
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Direct dependencies of a module, in import order.
    pub fn dependencies(&self, path: &Path) -> &[PathBuf] {
        self.edges.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Depth-first cycle check. Fails on the first cycle found, with the
    /// path reconstructed from the first occurrence of the repeated node.
    pub fn detect_cycles(&self) -> Result<(), GraphError> {
        let mut state: FxHashMap<&Path, Visit> = FxHashMap::default();
        let mut path = Vec::new();
        for node in &self.nodes {
            if !state.contains_key(node.as_path()) {
                self.visit(node, &mut state, &mut path)?;
            }
        }
        Ok(())
    }

    fn visit<'g>(
        &'g self,
        node: &'g Path,
        state: &mut FxHashMap<&'g Path, Visit>,
        path: &mut Vec<&'g Path>,
    ) -> Result<(), GraphError> {
        state.insert(node, Visit::Active);
        path.push(node);
        for dep in self.dependencies(node) {
            match state.get(dep.as_path()) {
                Some(Visit::Done) => {}
                Some(Visit::Active) => {
                    let start = path
                        .iter()
                        .position(|p| *p == dep.as_path())
                        .unwrap_or(0);
                    let mut cycle: Vec<PathBuf> =
                        path[start..].iter().map(|p| p.to_path_buf()).collect();
                    cycle.push(dep.clone());
                    return Err(GraphError::Cycle(cycle));
                }
                None => self.visit(dep, state, path)?,
            }
        }
        path.pop();
        state.insert(node, Visit::Done);
        Ok(())
    }

    /// Topological order, dependencies first. Covers every node,
    /// disconnected ones included. Call only after [`detect_cycles`]
    /// passed; on a cyclic graph the order would silently drop back
    /// edges.
    ///
    /// [`detect_cycles`]: ModuleGraph::detect_cycles
    pub fn topological_order(&self) -> Vec<PathBuf> {
        let mut visited = FxHashSet::default();
        let mut order = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            self.post_order(node, &mut visited, &mut order);
        }
        order
    }

    fn post_order<'g>(
        &'g self,
        node: &'g Path,
        visited: &mut FxHashSet<&'g Path>,
        order: &mut Vec<PathBuf>,
    ) {
        if !visited.insert(node) {
            return;
        }
        for dep in self.dependencies(node) {
            self.post_order(dep, visited, order);
        }
        order.push(node.to_path_buf());
    }
}
