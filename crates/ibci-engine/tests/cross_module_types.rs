//! Integration tests for cross-module symbol and type resolution
//!
//! Checks that types declared in one module are enforced at use sites in
//! another: function signatures, re-export chains, star imports, and
//! module attribute access.

use ibci_engine::compiler::{CompileError, Scheduler};
use ibci_engine::diagnostics::code;
use ibci_engine::parser::Type;
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

fn failure_diagnostics(err: CompileError) -> Vec<ibci_engine::Diagnostic> {
    match err {
        CompileError::CompilationFailed { diagnostics, .. } => diagnostics,
        other => panic!("expected compilation failure, got {:?}", other),
    }
}

#[test]
fn test_imported_function_return_type_flows() {
    let dir = TempDir::new().unwrap();
    write(&dir, "geometry.ibci", "func area(r: float) -> float:\n    return r * r\n");
    let main = write(&dir, "main.ibci", "import geometry\n\nvar a = geometry.area(2.0)\n");
    let mut scheduler = Scheduler::with_root(dir.path()).unwrap();

    scheduler.compile(&main).unwrap();
    assert_eq!(type_of(&mut scheduler, &main, "a"), Some(Type::Float));
}

#[test]
fn test_imported_function_signature_enforced() {
    let dir = TempDir::new().unwrap();
    write(&dir, "geometry.ibci", "func area(r: float) -> float:\n    return r * r\n");
    let main = write(&dir, "main.ibci", "import geometry\n\nvar a = geometry.area(2)\n");
    let mut scheduler = Scheduler::with_root(dir.path()).unwrap();

    // No implicit int-to-float conversion at call sites
    let diagnostics = failure_diagnostics(scheduler.compile(&main).unwrap_err());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, code::SEM_TYPE_MISMATCH);
    assert!(diagnostics[0].message.contains("not assignable to 'float'"));
    assert_eq!(
        diagnostics[0].location.as_ref().unwrap().file.file_name().unwrap(),
        "main.ibci"
    );
}

#[test]
fn test_reexport_alias_chain_preserves_type() {
    let dir = TempDir::new().unwrap();
    write(&dir, "mod1.ibci", "func flag() -> bool:\n    return True\n");
    write(&dir, "mod2.ibci", "from mod1 import flag as still_flag\n");
    let mod3 = write(
        &dir,
        "mod3.ibci",
        "from mod2 import still_flag as check_flag\n\nvar check = check_flag()\n",
    );
    let mut scheduler = Scheduler::with_root(dir.path()).unwrap();

    scheduler.compile(&mod3).unwrap();
    assert_eq!(type_of(&mut scheduler, &mod3, "check"), Some(Type::Bool));
}

#[test]
fn test_star_import_copies_public_names_with_types() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "shapes.ibci",
        "var PI = 3.14\nvar _cache = 1\n\nfunc area(r: float) -> float:\n    return PI * r * r\n",
    );
    let main = write(&dir, "main.ibci", "from shapes import *\n\nvar a = area(PI)\n");
    let mut scheduler = Scheduler::with_root(dir.path()).unwrap();

    scheduler.compile(&main).unwrap();
    assert_eq!(type_of(&mut scheduler, &main, "a"), Some(Type::Float));
    assert_eq!(type_of(&mut scheduler, &main, "PI"), Some(Type::Float));

    // Underscore names stay private to their module
    let scope = scheduler.unit(&main).unwrap().scope;
    assert!(scheduler.symbols().resolve_local(scope, "_cache").is_none());
}

#[test]
fn test_module_attribute_miss_is_reported() {
    let dir = TempDir::new().unwrap();
    write(&dir, "util.ibci", "var VALUE = 7\n");
    let main = write(&dir, "main.ibci", "import util\n\nvar x = util.missing\n");
    let mut scheduler = Scheduler::with_root(dir.path()).unwrap();

    let diagnostics = failure_diagnostics(scheduler.compile(&main).unwrap_err());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, code::SEM_UNDEFINED_SYMBOL);
    assert!(diagnostics[0]
        .message
        .contains("Module 'util' has no attribute 'missing'"));
}

#[test]
fn test_module_value_is_not_callable() {
    let dir = TempDir::new().unwrap();
    write(&dir, "util.ibci", "var VALUE = 7\n");
    let main = write(&dir, "main.ibci", "import util\n\nvar x = util()\n");
    let mut scheduler = Scheduler::with_root(dir.path()).unwrap();

    let diagnostics = failure_diagnostics(scheduler.compile(&main).unwrap_err());
    assert_eq!(diagnostics[0].code, code::SEM_TYPE_MISMATCH);
    assert!(diagnostics[0].message.contains("not callable"));
}

#[test]
fn test_imported_name_reassignment_typechecks() {
    let dir = TempDir::new().unwrap();
    write(&dir, "counter.ibci", "var COUNT = 1\n");
    let main = write(&dir, "main.ibci", "from counter import COUNT\n\nCOUNT = \"zero\"\n");
    let mut scheduler = Scheduler::with_root(dir.path()).unwrap();

    // The imported binding carries the origin's type into assignments
    let diagnostics = failure_diagnostics(scheduler.compile(&main).unwrap_err());
    assert_eq!(diagnostics[0].code, code::SEM_TYPE_MISMATCH);
    assert!(diagnostics[0].message.contains("'str' is not assignable to 'int'"));
}

#[test]
fn test_container_types_flow_across_modules() {
    let dir = TempDir::new().unwrap();
    write(&dir, "shapes.ibci", "var NAMES = [\"circle\", \"square\"]\n");
    let main = write(
        &dir,
        "main.ibci",
        "import shapes\n\nvar all_names = shapes.NAMES + [\"triangle\"]\n",
    );
    let mut scheduler = Scheduler::with_root(dir.path()).unwrap();

    scheduler.compile(&main).unwrap();
    assert_eq!(
        type_of(&mut scheduler, &main, "all_names"),
        Some(Type::List(Box::new(Type::Str)))
    );
}

#[test]
fn test_unknown_origin_name_stays_permissive() {
    let dir = TempDir::new().unwrap();
    write(&dir, "util.ibci", "var VALUE = 7\n");
    let main = write(
        &dir,
        "main.ibci",
        "from util import nonexistent\n\nvar x = nonexistent + 1\n",
    );
    let mut scheduler = Scheduler::with_root(dir.path()).unwrap();

    // A name the origin does not define binds untyped rather than
    // cascading errors through every use
    scheduler.compile(&main).unwrap();
    assert_eq!(type_of(&mut scheduler, &main, "x"), Some(Type::Any));
}
