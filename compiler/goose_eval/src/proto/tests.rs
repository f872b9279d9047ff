use super::*;
use pretty_assertions::assert_eq;
use std::sync::Arc;

#[test]
fn builtin_prototypes_are_frozen_and_chain_to_object() {
    let protos = prototypes();
    for proto in [
        &protos.integer,
        &protos.float,
        &protos.string,
        &protos.bool,
        &protos.null,
        &protos.symbol,
        &protos.array,
        &protos.func,
        &protos.range,
        &protos.generator,
    ] {
        assert!(proto.is_frozen(), "{} should be frozen", proto.name());
        let parent = proto.proto().map(Arc::clone);
        assert!(parent.is_some_and(|p| Arc::ptr_eq(&p, &protos.object)));
    }
    assert!(protos.object.proto().is_none());
}

#[test]
fn prototypes_are_built_once() {
    assert!(std::ptr::eq(prototypes(), prototypes()));
}

#[test]
fn methods_and_operators_are_registered() {
    let protos = prototypes();
    assert!(protos.string.has_own(&PropertyKey::string("split")));
    assert!(protos.array.has_own(&PropertyKey::string("map")));
    assert!(protos.integer.operator(Op::Add).is_some());
    assert!(protos.integer.operator(Op::Lt).is_none());
    assert!(protos.generator.has_own(&PropertyKey::string("next")));
}

#[test]
fn bounds_clamp_and_count_from_the_end() {
    assert_eq!(clamp_bounds(5, None, None), (0, 5));
    assert_eq!(clamp_bounds(5, Some(1), Some(3)), (1, 3));
    assert_eq!(clamp_bounds(5, Some(-2), None), (3, 5));
    assert_eq!(clamp_bounds(5, Some(10), Some(20)), (5, 5));
    assert_eq!(clamp_bounds(5, Some(4), Some(1)), (4, 4));
    assert_eq!(clamp_bounds(0, Some(-1), Some(-1)), (0, 0));
}

#[test]
fn char_slice_counts_characters() {
    assert_eq!(char_slice("héllo", Some(1), Some(3)), "él");
    assert_eq!(char_slice("héllo", Some(-2), None), "lo");
    assert_eq!(char_slice("", None, None), "");
}
