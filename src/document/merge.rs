//! Default-merge of a persisted document against the current schema.
//!
//! A persisted document may predate fields added to the schema since it was
//! written. [`merge`] fills those in from the defaults while keeping every
//! value the user stored. Rules, per field of the default shape:
//!
//! | Default field | Loaded value                 | Result                  |
//! |---------------|------------------------------|-------------------------|
//! | array         | array (even empty)           | loaded array, verbatim  |
//! | array         | absent / not an array        | default array           |
//! | object        | object                       | recursive merge         |
//! | object        | absent / not an object       | default object          |
//! | scalar / null | present (any value, `null`)  | loaded value            |
//! | scalar / null | absent                       | default value           |
//!
//! Keys present in the loaded document but not in the defaults are dropped.
//! Arrays are never merged element-wise, so seeded defaults (categories,
//! workout types) only appear on fresh installs.

use serde_json::{Map, Value};

use super::shape::Shape;

/// Merges `loaded` onto the defaults described by `shape`.
///
/// The result has exactly the keys of the shape at every object level.
/// Merging is idempotent: `merge(s, &merge(s, x)) == merge(s, x)`.
pub fn merge(shape: &Shape, loaded: &Value) -> Value {
    merge_node(shape, Some(loaded))
}

/// Merges `loaded` onto `defaults` directly.
///
/// Convenience for one-off merges; repeated merges should derive the
/// [`Shape`] once and call [`merge`].
pub fn merge_values(defaults: &Value, loaded: &Value) -> Value {
    merge(&Shape::from_value(defaults), loaded)
}

fn merge_node(shape: &Shape, loaded: Option<&Value>) -> Value {
    match shape {
        Shape::Array(default) => match loaded {
            Some(Value::Array(items)) => Value::Array(items.clone()),
            _ => Value::Array(default.clone()),
        },
        Shape::Object(fields) => {
            let source = match loaded {
                Some(Value::Object(map)) => Some(map),
                _ => None,
            };
            let merged: Map<String, Value> = fields
                .iter()
                .map(|(key, child)| {
                    let value = merge_node(child, source.and_then(|map| map.get(key)));
                    (key.clone(), value)
                })
                .collect();
            Value::Object(merged)
        }
        Shape::Scalar(default) => loaded.cloned().unwrap_or_else(|| default.clone()),
    }
}
