use super::*;
use pretty_assertions::assert_eq;

#[test]
fn truthiness() {
    let falsy = [
        Value::Null,
        Value::Bool(false),
        Value::from(0),
        Value::Float(0.0),
        Value::from(""),
        Value::array(Vec::new()),
        Value::object([]),
    ];
    for value in &falsy {
        assert!(!value.is_truthy(), "{value:?} should be falsy");
    }
    let truthy = [
        Value::Bool(true),
        Value::from(-1),
        Value::Float(0.5),
        Value::from("0"),
        Value::array(vec![Value::Null]),
        Value::Symbol(Symbol::new("s")),
        Value::IntRange(Arc::new(IntRange::new(BigInt::from(0), BigInt::from(0)))),
    ];
    for value in &truthy {
        assert!(value.is_truthy(), "{value:?} should be truthy");
    }
}

#[test]
fn hash_key_is_structural_for_primitives_and_identity_for_containers() {
    assert_eq!(Value::from(12).hash_key(), Value::from(12).hash_key());
    assert_eq!(Value::from("ab").hash_key(), "ab");
    let a = Value::array(vec![Value::from(1)]);
    let b = Value::array(vec![Value::from(1)]);
    assert_eq!(a.hash_key(), a.clone().hash_key());
    assert!(a.hash_key() != b.hash_key());
}

#[test]
fn shallow_clone_of_composite_shares_properties() {
    let original = Value::object([(PropertyKey::string("x"), Value::from(1))]);
    let copy = original.clone_shallow();
    assert!(!copy.is_identical(&original));

    let (Value::Composite(a), Value::Composite(b)) = (&original, &copy) else {
        panic!("expected composites");
    };
    assert!(b.set(PropertyKey::string("x"), Value::from(2)).is_ok());
    assert!(a
        .get_own(&PropertyKey::string("x"))
        .is_some_and(|v| v.is_identical(&Value::from(2))));
}

#[test]
fn shallow_clone_keeps_array_identity() {
    let array = Value::array(vec![Value::from(1)]);
    assert!(array.clone_shallow().is_identical(&array));
}

#[test]
fn freeze_and_unfreeze() {
    let array = Value::array(vec![Value::from(1)]);
    array.freeze();
    assert!(array.is_frozen());
    let Value::Array(items) = &array else {
        panic!("expected array");
    };
    assert!(items.set(0, Value::from(2)).is_err());
    array.unfreeze();
    assert!(items.set(0, Value::from(2)).is_ok());
    assert!(!Value::from(1).is_frozen());
}

#[test]
fn property_keys() {
    assert_eq!(
        Value::from("k").to_property_key().ok(),
        Some(PropertyKey::string("k"))
    );
    assert_eq!(
        Value::from(3).to_property_key().ok(),
        Some(PropertyKey::Integer(BigInt::from(3)))
    );
    let err = Value::Float(1.5).to_property_key().err().map(|e| e.message);
    assert_eq!(err.as_deref(), Some("cannot use Float as a property key"));
}

#[test]
fn symbols_with_the_same_name_differ() {
    let a = Symbol::new("tag");
    let b = Symbol::new("tag");
    assert!(a != b);
    assert_eq!(a.name(), b.name());
    assert_eq!(a.canonical(), format!("@tag#{}", a.id()));
}

#[test]
fn int_range_len_and_values() {
    let up = IntRange::new(BigInt::from(0), BigInt::from(5));
    assert_eq!(up.len(), BigInt::from(5));
    let mut down = IntRange::new(BigInt::from(5), BigInt::from(0));
    down.step = BigInt::from(-2);
    let values: Vec<String> = down.values().map(|v| v.hash_key()).collect();
    assert_eq!(values, vec!["5", "3", "1"]);
    assert_eq!(down.len(), BigInt::from(3));
    assert!(down.contains(&BigInt::from(5)));
    assert!(!down.contains(&BigInt::from(0)));
}

#[test]
fn float_range_len_matches_values() {
    let mut range = FloatRange::new(0.0, 1.0);
    range.step = 0.25;
    assert_eq!(range.len(), 4);
    assert_eq!(range.values().count(), 4);
    range.step = 0.0;
    assert!(range.is_empty());
}
