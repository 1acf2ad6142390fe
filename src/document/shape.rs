//! Structural description of a default document.
//!
//! A [`Shape`] is derived once from a schema default and then drives every
//! merge. Only three kinds of node exist:
//!
//! ```text
//! Shape::Object  ─ named fields, each with its own Shape   (recursed into)
//! Shape::Array   ─ default items                           (replaced whole)
//! Shape::Scalar  ─ default value, including null           (replaced whole)
//! ```

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Result, StorageError};

/// Structural description of a default value.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// A leaf: string, number, bool or null. Carries its default.
    Scalar(Value),
    /// An array field. Carries its default items.
    Array(Vec<Value>),
    /// An object with named fields.
    Object(BTreeMap<String, Shape>),
}

impl Shape {
    /// Derives the shape of `T::default()`.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the default cannot be represented as
    /// JSON (never the case for the document types in this crate).
    pub fn of<T: Serialize + Default>() -> Result<Self> {
        let value = serde_json::to_value(T::default()).map_err(StorageError::from)?;
        Ok(Self::from_value(&value))
    }

    /// Derives the shape of an arbitrary JSON value.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self::Object(
                map.iter()
                    .map(|(key, child)| (key.clone(), Self::from_value(child)))
                    .collect(),
            ),
            Value::Array(items) => Self::Array(items.clone()),
            other => Self::Scalar(other.clone()),
        }
    }

    /// Rebuilds the default value this shape was derived from.
    pub fn default_value(&self) -> Value {
        match self {
            Self::Scalar(value) => value.clone(),
            Self::Array(items) => Value::Array(items.clone()),
            Self::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(key, shape)| (key.clone(), shape.default_value()))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }

    /// Returns the shape of a named field, if this is an object.
    pub fn field(&self, name: &str) -> Option<&Shape> {
        match self {
            Self::Object(fields) => fields.get(name),
            _ => None,
        }
    }

    /// Field names of an object shape, sorted. Empty for other kinds.
    pub fn field_names(&self) -> Vec<&str> {
        match self {
            Self::Object(fields) => fields.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Returns true for object shapes.
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Returns true for array shapes.
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }
}
