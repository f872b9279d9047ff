#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::loader::Resolved;
use super::*;
use crate::environment::{ScopeOwner, Variable};
use crate::interpreter::{Interpreter, InterpreterBuilder};
use pretty_assertions::assert_eq;

fn module_in(key: &str, scope: ScopeId) -> ModuleData {
    ModuleData::new(
        key.to_string(),
        scope,
        Arc::new(SourceFile::new(key, "")),
        Origin::working_dir(),
    )
}

fn module(key: &str) -> ModuleData {
    module_in(key, ScopeArena::new().global())
}

fn fixed(value: Value) -> Export {
    Export::Fixed(value)
}

fn interpreter() -> Interpreter {
    InterpreterBuilder::new()
        .parser(Arc::new(goose_parse::GooseParser))
        .build(goose_parse::parse_module("").unwrap(), SourceFile::new("main.goose", ""))
        .unwrap()
}

#[test]
fn exports_keep_declaration_order() {
    let m = module("file:/tmp/a.goose");
    assert!(m.add_export("b".into(), fixed(Value::from(1))).is_ok());
    assert!(m.add_export("a".into(), fixed(Value::from(2))).is_ok());
    let names: Vec<String> = m.exports().iter().map(|(n, _)| n.to_string()).collect();
    assert_eq!(names, vec!["b".to_string(), "a".to_string()]);
    assert!(m.export("a").is_some());
    assert!(m.export("c").is_none());
}

#[test]
fn duplicate_export_is_rejected() {
    let m = module("file:/tmp/a.goose");
    assert!(m.add_export("x".into(), fixed(Value::Null)).is_ok());
    let err = m.add_export("x".into(), fixed(Value::Null)).err().map(|e| e.message);
    assert_eq!(err.as_deref(), Some("duplicate export x"));
}

#[test]
fn snapshot_is_frozen() {
    let arena = ScopeArena::new();
    let m = module_in("std:math.goose", arena.global());
    assert!(m.add_export("PI".into(), fixed(Value::Float(3.0))).is_ok());
    let snapshot = m.snapshot(&arena);
    assert!(snapshot.is_frozen());
    let Value::Composite(object) = &snapshot else {
        panic!("snapshot should be a composite");
    };
    assert_eq!(object.len(), 1);
    assert!(object
        .set(PropertyKey::string("PI"), Value::Null)
        .is_err());
}

#[test]
fn live_exports_read_the_current_value() {
    let mut arena = ScopeArena::new();
    let scope = arena.fork(arena.global(), ScopeOwner::Module).unwrap();
    arena.set(scope, "level".into(), Variable::mutable(Value::from(1))).unwrap();
    let m = module_in("file:/tmp/cfg.goose", scope);
    let binding = Binding {
        scope,
        name: "level".into(),
    };
    assert!(m.add_export("level".into(), Export::Live(binding)).is_ok());

    arena.update(scope, "level", Value::from(2)).unwrap();
    let level = m.export("level").unwrap().value(&arena);
    assert_eq!(level.as_f64(), Some(2.0));
    let Value::Composite(object) = m.snapshot(&arena) else {
        panic!("snapshot should be a composite");
    };
    assert_eq!(object.get_own(&PropertyKey::string("level")).and_then(|v| v.as_f64()), Some(2.0));
}

#[test]
fn relative_specifiers_keep_the_importer_scheme() {
    let interp = interpreter();
    let spec = Specifier::parse("./math").unwrap();

    let from_std = Origin::Asset { dir: String::new() };
    let (key, resolved) = interp.resolve(&spec, &from_std).unwrap();
    assert_eq!(key, "std:math.goose");
    assert!(matches!(resolved, Resolved::Asset { path: "math.goose", .. }));

    let escape = Specifier::parse("../math").unwrap();
    assert!(interp.resolve(&escape, &from_std).is_err());

    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("math.goose"), "export let x = 1").unwrap();
    let from_pkg = Origin::Dir {
        scheme: Scheme::Pkg,
        dir: root.path().to_path_buf(),
    };
    let (key, resolved) = interp.resolve(&spec, &from_pkg).unwrap();
    assert!(key.starts_with("pkg:"), "{key}");
    assert!(matches!(resolved, Resolved::File { scheme: Scheme::Pkg, .. }));
}

#[test]
fn native_name_drops_extension_and_index() {
    assert_eq!(module("std:math.goose").native_name(), "std:math");
    assert_eq!(module("std:json/index.goose").native_name(), "std:json");
    assert_eq!(module("pkg:/root/pkg/x").native_name(), "pkg:/root/pkg/x");
}

#[test]
fn cache_round_trip() {
    let mut cache = ModuleCache::default();
    assert!(cache.is_empty());
    cache.insert("std:fs.goose".to_string(), Arc::new(module("std:fs.goose")));
    assert_eq!(cache.len(), 1);
    assert!(cache.get("std:fs.goose").is_some());
    assert!(cache.remove("std:fs.goose").is_some());
    assert!(cache.get("std:fs.goose").is_none());
}
