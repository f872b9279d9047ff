#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use pretty_assertions::assert_eq;

fn int_of(var: &Variable) -> i64 {
    match &var.value {
        Value::Integer(n) => i64::try_from(n).unwrap(),
        other => panic!("expected integer, got {other:?}"),
    }
}

#[test]
fn test_get_from_descendant() {
    let mut arena = ScopeArena::new();
    let outer = arena.fork(arena.global(), ScopeOwner::Function).unwrap();
    arena
        .set(outer, "x".into(), Variable::mutable(Value::from(1)))
        .unwrap();
    let inner = arena.fork(outer, ScopeOwner::Block).unwrap();
    let deepest = arena.fork(inner, ScopeOwner::If).unwrap();
    assert_eq!(int_of(arena.get(deepest, "x").unwrap()), 1);
}

#[test]
fn test_update_from_descendant_mutates_ancestor() {
    let mut arena = ScopeArena::new();
    let outer = arena.fork(arena.global(), ScopeOwner::Function).unwrap();
    arena
        .set(outer, "x".into(), Variable::mutable(Value::from(1)))
        .unwrap();
    let inner = arena.fork(outer, ScopeOwner::Repeat).unwrap();
    arena.update(inner, "x", Value::from(2)).unwrap();
    assert_eq!(int_of(arena.get(outer, "x").unwrap()), 2);
    assert!(!arena.is_defined_in_current_scope(inner, "x"));
}

#[test]
fn test_shadowing_in_child_frame() {
    let mut arena = ScopeArena::new();
    let outer = arena.fork(arena.global(), ScopeOwner::Function).unwrap();
    arena
        .set(outer, "x".into(), Variable::constant(Value::from(1)))
        .unwrap();
    let inner = arena.fork(outer, ScopeOwner::Block).unwrap();
    arena
        .set(inner, "x".into(), Variable::mutable(Value::from(2)))
        .unwrap();
    assert_eq!(int_of(arena.get(inner, "x").unwrap()), 2);
    assert_eq!(int_of(arena.get(outer, "x").unwrap()), 1);
}

#[test]
fn test_set_on_constant_fails() {
    let mut arena = ScopeArena::new();
    let scope = arena.global();
    arena
        .set(scope, "k".into(), Variable::constant(Value::from(1)))
        .unwrap();
    assert_eq!(
        arena.set(scope, "k".into(), Variable::mutable(Value::from(2))),
        Err(AssignError::Constant("k".into()))
    );
    assert_eq!(
        arena.update(scope, "k", Value::from(2)),
        Err(AssignError::Constant("k".into()))
    );
}

#[test]
fn test_builtins_cannot_be_shadowed() {
    let mut arena = ScopeArena::new();
    let builtins = arena.builtins();
    arena
        .set(builtins, "true".into(), Variable::constant(Value::Bool(true)))
        .unwrap();
    let scope = arena.fork(arena.global(), ScopeOwner::Module).unwrap();
    let err = arena
        .set(scope, "true".into(), Variable::mutable(Value::Null))
        .unwrap_err();
    assert_eq!(err.to_string(), "cannot redefine builtin true");
    assert!(arena.update(scope, "true", Value::Null).is_err());
}

#[test]
fn test_update_undefined() {
    let mut arena = ScopeArena::new();
    let scope = arena.global();
    let err: EvalError = arena.update(scope, "nope", Value::Null).unwrap_err().into();
    assert_eq!(err.message, "nope is not defined");
}

#[test]
fn test_release_invalidates_id_and_reuses_slot() {
    let mut arena = ScopeArena::new();
    let before = arena.live_count();
    let scope = arena.fork(arena.global(), ScopeOwner::Do).unwrap();
    assert_eq!(arena.live_count(), before + 1);
    arena.release(scope);
    assert_eq!(arena.live_count(), before);
    assert_eq!(
        arena.get(scope, "x").unwrap_err(),
        AssignError::StaleScope(scope)
    );

    let reused = arena.fork(arena.global(), ScopeOwner::Do).unwrap();
    assert_ne!(reused, scope);
    assert!(arena.get(scope, "x").is_err());
}

#[test]
fn test_pinned_scope_survives_release() {
    let mut arena = ScopeArena::new();
    let outer = arena.fork(arena.global(), ScopeOwner::Function).unwrap();
    let inner = arena.fork(outer, ScopeOwner::Block).unwrap();
    arena
        .set(outer, "captured".into(), Variable::mutable(Value::from(7)))
        .unwrap();
    arena.pin(inner);
    arena.release(inner);
    arena.release(outer);
    assert_eq!(int_of(arena.get(inner, "captured").unwrap()), 7);
}

#[test]
fn test_module_scope_lookup() {
    let mut arena = ScopeArena::new();
    let module = arena.fork(arena.global(), ScopeOwner::Module).unwrap();
    let func = arena.fork(module, ScopeOwner::Function).unwrap();
    let block = arena.fork(func, ScopeOwner::For).unwrap();
    assert_eq!(arena.module_scope(block), Some(module));
    assert_eq!(arena.module_scope(arena.global()), None);
    assert_eq!(arena.owner(block), Some(ScopeOwner::For));
    assert_eq!(arena.parent(block), Some(func));
}

#[test]
fn test_captured_frame_lives_until_capture_drops() {
    let mut arena = ScopeArena::new();
    let before = arena.live_count();
    let outer = arena.fork(arena.global(), ScopeOwner::Function).unwrap();
    let captured = arena.capture(outer).unwrap();
    assert!(arena.release(outer).is_empty());
    assert_eq!(arena.live_count(), before + 1);

    drop(captured);
    // Dropped captures are settled by the next release.
    let scratch = arena.fork(arena.global(), ScopeOwner::Block).unwrap();
    assert_eq!(arena.release(scratch).len(), 2);
    assert_eq!(arena.live_count(), before);
    assert!(arena.get(outer, "x").is_err());
}

#[test]
fn test_parent_outlives_released_children_only_while_they_live() {
    let mut arena = ScopeArena::new();
    let before = arena.live_count();
    let outer = arena.fork(arena.global(), ScopeOwner::Function).unwrap();
    let inner = arena.fork(outer, ScopeOwner::Block).unwrap();
    let captured = arena.capture(inner).unwrap();
    arena.release(inner);
    arena.release(outer);
    assert_eq!(arena.live_count(), before + 2);

    drop(captured);
    let scratch = arena.fork(arena.global(), ScopeOwner::Do).unwrap();
    assert_eq!(arena.release(scratch).len(), 3);
    assert_eq!(arena.live_count(), before);
}

#[test]
fn test_linked_variable_reads_through() {
    let mut arena = ScopeArena::new();
    let module = arena.fork(arena.global(), ScopeOwner::Module).unwrap();
    arena
        .set(module, "level".into(), Variable::mutable(Value::from(1)))
        .unwrap();
    let importer = arena.fork(arena.global(), ScopeOwner::Module).unwrap();
    let link = Binding {
        scope: module,
        name: "level".into(),
    };
    arena
        .set(importer, "level".into(), Variable::linked(link.clone()))
        .unwrap();

    arena.update(module, "level", Value::from(2)).unwrap();
    assert_eq!(int_of(arena.get(importer, "level").unwrap()), 2);
    assert_eq!(int_of(arena.get_local(importer, "level").unwrap()), 2);
    assert!(matches!(arena.binding_value(&link), Some(Value::Integer(_))));
    assert_eq!(
        arena.update(importer, "level", Value::Null),
        Err(AssignError::Constant("level".into()))
    );
}
