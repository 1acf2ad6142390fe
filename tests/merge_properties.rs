//! Property-based tests for the schema merge.
//!
//! Inputs are arbitrary JSON trees whose object keys are drawn from a pool
//! that mixes real document field names with unknown ones, so generated
//! values regularly hit known fields with the wrong type.

use codexdb::document::{merge, Shape};
use codexdb::{Document, Preferences};
use proptest::prelude::*;
use serde_json::{Map, Value};

const KEY_POOL: &[&str] = &[
    "treasury",
    "habits",
    "gym",
    "study",
    "journal",
    "categories",
    "transactions",
    "bankBalance",
    "cachedGoldPrice",
    "sessions",
    "workoutTypes",
    "activeTimer",
    "entries",
    "display",
    "currency",
    "legacyField",
    "x",
];

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::from),
        "[a-z0-9 ]{0,8}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::vec((prop::sample::select(KEY_POOL), inner), 0..6).prop_map(
                |pairs| {
                    Value::Object(
                        pairs
                            .into_iter()
                            .map(|(k, v)| (k.to_string(), v))
                            .collect::<Map<String, Value>>(),
                    )
                }
            ),
        ]
    })
}

/// Asserts that `value` has exactly the object keys of `shape` at every
/// object level of the shape.
fn assert_covers(shape: &Shape, value: &Value) -> Result<(), TestCaseError> {
    match shape {
        Shape::Object(fields) => {
            let map = value
                .as_object()
                .ok_or_else(|| TestCaseError::fail(format!("Expected object, got: {}", value)))?;
            prop_assert_eq!(map.len(), fields.len());
            for (key, child) in fields {
                let child_value = map
                    .get(key)
                    .ok_or_else(|| TestCaseError::fail(format!("Missing key {}", key)))?;
                assert_covers(child, child_value)?;
            }
        }
        Shape::Array(_) => prop_assert!(value.is_array()),
        Shape::Scalar(_) => {}
    }
    Ok(())
}

fn document_shape() -> Shape {
    Shape::of::<Document>().unwrap()
}

proptest! {
    #[test]
    fn merge_is_idempotent(loaded in arb_json()) {
        let shape = document_shape();
        let once = merge(&shape, &loaded);
        let twice = merge(&shape, &once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn merge_result_has_exactly_the_schema_keys(loaded in arb_json()) {
        let shape = document_shape();
        assert_covers(&shape, &merge(&shape, &loaded))?;
    }

    #[test]
    fn decoded_document_is_stable_across_save_and_load(loaded in arb_json()) {
        let shape = document_shape();
        let doc = Document::from_merged(merge(&shape, &loaded));
        let saved = serde_json::to_value(&doc).unwrap();
        let reloaded = Document::from_merged(merge(&shape, &saved));
        prop_assert_eq!(reloaded, doc);
    }

    #[test]
    fn stored_document_round_trips_through_merge(count in 0usize..5) {
        let mut doc = Document::default();
        for i in 0..count {
            doc.gym.workout_types.push(format!("extra-{}", i));
        }
        let stored = serde_json::to_value(&doc).unwrap();
        let loaded = Document::from_merged(merge(&document_shape(), &stored));
        prop_assert_eq!(loaded, doc);
    }

    #[test]
    fn preferences_merge_covers_every_setting(loaded in arb_json()) {
        let shape = Shape::of::<Preferences>().unwrap();
        let merged = merge(&shape, &loaded);
        assert_covers(&shape, &merged)?;
        let _ = Preferences::from_merged(merged);
    }
}
