use super::*;
use pretty_assertions::assert_eq;

fn keys(registry: &NativeRegistry, module: &str, wanted: &[&str]) -> Vec<bool> {
    wanted
        .iter()
        .map(|key| registry.get(module, key).is_some())
        .collect()
}

#[test]
fn std_modules_are_registered() {
    let registry = NativeRegistry::with_std();
    let mut names: Vec<&str> = registry.modules().collect();
    names.sort_unstable();
    assert_eq!(names, vec!["std:fs", "std:json", "std:math", "std:platform"]);
}

#[test]
fn keys_follow_declaration_shape() {
    let registry = NativeRegistry::with_std();
    assert_eq!(
        keys(&registry, "std:math", &["C/PI", "F/sin", "F/clamp", "F/PI", "C/sin"]),
        vec![true, true, true, false, false]
    );
    assert!(registry.get("std:nope", "F/sin").is_none());
}

#[test]
fn register_merges_tables() {
    let mut registry = NativeRegistry::new();
    registry.register(NativeModule::new("m").constant("A", Value::from(1)));
    registry.register(
        NativeModule::new("m")
            .method("Point", "len", |_| Ok(Value::Null))
            .operator("Point", Op::Add, |_| Ok(Value::Null))
            .structure("Point", Value::Null),
    );
    assert_eq!(
        keys(&registry, "m", &["C/A", "F/Point.len", "O/Point.+", "S/Point"]),
        vec![true, true, true, true]
    );
}
