//! Integration tests for import discovery and resolution
//!
//! Drives the scheduler against real project layouts on disk: nested
//! packages, relative imports, namespace packages, and the discovery
//! failures that must stop a run before anything compiles.

use ibci_engine::compiler::{CompileError, Scheduler};
use ibci_engine::diagnostics::code;
use ibci_engine::parser::{SymbolKind, Type};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(dir: &TempDir, rel: &str, content: &str) -> PathBuf {
    let path = dir.path().join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path.canonicalize().unwrap()
}

fn type_of(scheduler: &mut Scheduler, path: &Path, name: &str) -> Option<Type> {
    let scope = scheduler
        .unit(path)
        .unwrap_or_else(|| panic!("no unit for {}", path.display()))
        .scope;
    let sym = scheduler
        .symbols()
        .resolve_local(scope, name)
        .unwrap_or_else(|| panic!("'{}' not defined in {}", name, path.display()));
    scheduler.symbols_mut().resolved_type(sym)
}

#[test]
fn test_deep_package_chain_compiles() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a/b/c/leaf.ibci", "var DEPTH = 3\n");
    let main = write(&dir, "main.ibci", "import a.b.c.leaf\n\nvar d = a.b.c.leaf.DEPTH\n");
    let mut scheduler = Scheduler::with_root(dir.path()).unwrap();

    let report = scheduler.compile(&main).unwrap();
    assert_eq!(report.discovered, 2);

    // Attribute access walks the whole module chain
    assert_eq!(type_of(&mut scheduler, &main, "d"), Some(Type::Int));
}

#[test]
fn test_relative_import_same_package() {
    let dir = TempDir::new().unwrap();
    write(&dir, "pkg/helper.ibci", "var H = 5\n");
    let entry = write(&dir, "pkg/main.ibci", "from .helper import H\n\nvar doubled = H * 2\n");
    let mut scheduler = Scheduler::with_root(dir.path()).unwrap();

    let report = scheduler.compile(&entry).unwrap();
    assert_eq!(report.discovered, 2);
    assert_eq!(type_of(&mut scheduler, &entry, "doubled"), Some(Type::Int));
}

#[test]
fn test_relative_import_parent_package() {
    let dir = TempDir::new().unwrap();
    write(&dir, "pkg/shared.ibci", "var S = 10\n");
    let entry = write(
        &dir,
        "pkg/sub/calc.ibci",
        "from ..shared import S\n\nvar total = S + 1\n",
    );
    let mut scheduler = Scheduler::with_root(dir.path()).unwrap();

    let report = scheduler.compile(&entry).unwrap();
    assert_eq!(report.discovered, 2);
    assert_eq!(type_of(&mut scheduler, &entry, "total"), Some(Type::Int));
}

#[test]
fn test_package_init_named_after_package() {
    let dir = TempDir::new().unwrap();
    let init = write(&dir, "pkg/__init__.ibci", "var VERSION = 2\n");
    let main = write(&dir, "main.ibci", "import pkg\n\nvar v = pkg.VERSION\n");
    let mut scheduler = Scheduler::with_root(dir.path()).unwrap();

    scheduler.compile(&main).unwrap();
    assert_eq!(scheduler.unit(&init).unwrap().name, "pkg");
    assert_eq!(type_of(&mut scheduler, &main, "v"), Some(Type::Int));
}

#[test]
fn test_extensionless_script_resolves() {
    let dir = TempDir::new().unwrap();
    let tool = write(&dir, "scripts/tool", "var T = 1\n");
    let main = write(&dir, "main.ibci", "import scripts.tool\n\nvar q = scripts.tool.T\n");
    let mut scheduler = Scheduler::with_root(dir.path()).unwrap();

    scheduler.compile(&main).unwrap();
    assert_eq!(scheduler.unit(&tool).unwrap().name, "scripts.tool");
    assert_eq!(type_of(&mut scheduler, &main, "q"), Some(Type::Int));
}

#[test]
fn test_duplicate_import_discovered_once() {
    let dir = TempDir::new().unwrap();
    write(&dir, "util.ibci", "var V = 1\n");
    let main = write(&dir, "main.ibci", "import util\nimport util\n\nvar x = util.V\n");
    let mut scheduler = Scheduler::with_root(dir.path()).unwrap();

    let report = scheduler.compile(&main).unwrap();
    assert_eq!(report.discovered, 2);
    assert_eq!(report.compiled, 2);
}

#[test]
fn test_namespace_package_import_is_silent() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("plugins")).unwrap();
    let main = write(&dir, "main.ibci", "import plugins\n\nvar ok = 1\n");
    let mut scheduler = Scheduler::with_root(dir.path()).unwrap();

    let report = scheduler.compile(&main).unwrap();
    // The namespace directory brings no file to compile
    assert_eq!(report.discovered, 1);

    let scope = scheduler.unit(&main).unwrap().scope;
    let plugins = scheduler.symbols().resolve_local(scope, "plugins").unwrap();
    assert_eq!(scheduler.symbols().symbol(plugins).kind, SymbolKind::Module);
    assert!(scheduler.symbols().symbol(plugins).exported_scope.is_none());
}

#[test]
fn test_late_import_fails_discovery() {
    let dir = TempDir::new().unwrap();
    let main = write(&dir, "main.ibci", "var x = 1\nimport tardy\n");
    let mut scheduler = Scheduler::with_root(dir.path()).unwrap();

    let err = scheduler.compile(&main).unwrap_err();
    let CompileError::DiscoveryFailed { count, diagnostics } = err else {
        panic!("expected discovery failure");
    };
    assert_eq!(count, 1);
    assert_eq!(diagnostics[0].code, code::DEP_INVALID_IMPORT_POSITION);
    assert_eq!(diagnostics[0].location.as_ref().unwrap().line, 2);
    assert!(scheduler.units().is_empty());
}

#[test]
fn test_missing_module_location_points_at_import() {
    let dir = TempDir::new().unwrap();
    let main = write(&dir, "main.ibci", "import ghost\n");
    let mut scheduler = Scheduler::with_root(dir.path()).unwrap();

    let err = scheduler.compile(&main).unwrap_err();
    let CompileError::DiscoveryFailed { diagnostics, .. } = err else {
        panic!("expected discovery failure");
    };
    assert_eq!(diagnostics[0].code, code::DEP_MODULE_NOT_FOUND);

    let location = diagnostics[0].location.as_ref().unwrap();
    assert_eq!(location.file, main);
    assert_eq!(location.line, 1);
}

#[test]
fn test_lex_error_in_dependency_fails_discovery() {
    let dir = TempDir::new().unwrap();
    let dep = write(&dir, "dep.ibci", "var s = \"unterminated\n");
    let main = write(&dir, "main.ibci", "import dep\n");
    let mut scheduler = Scheduler::with_root(dir.path()).unwrap();

    let err = scheduler.compile(&main).unwrap_err();
    let CompileError::DiscoveryFailed { diagnostics, .. } = err else {
        panic!("expected discovery failure");
    };
    assert_eq!(diagnostics[0].code, code::LEX_UNTERMINATED_STRING);
    assert_eq!(diagnostics[0].location.as_ref().unwrap().file, dep);
}

#[test]
fn test_one_discovery_pass_collects_every_failure() {
    let dir = TempDir::new().unwrap();
    let main = write(&dir, "main.ibci", "import first_ghost\nimport second_ghost\n");
    let mut scheduler = Scheduler::with_root(dir.path()).unwrap();

    let err = scheduler.compile(&main).unwrap_err();
    let CompileError::DiscoveryFailed { count, diagnostics } = err else {
        panic!("expected discovery failure");
    };
    // Both unresolvable imports are reported in one run
    assert_eq!(count, 2);
    assert_eq!(diagnostics[0].location.as_ref().unwrap().line, 1);
    assert_eq!(diagnostics[1].location.as_ref().unwrap().line, 2);
}
