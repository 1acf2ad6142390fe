//! Tolerant field decoders for stored records.
//!
//! Earlier app generations wrote whatever their form inputs produced:
//! `null` for a blank field, negative or fractional counts, numbers as
//! strings. These decoders repair such values in place so one odd field
//! never costs the record, and [`records`] drops only the record that
//! cannot be read at all.
//!
//! Every decoder is stable on its own output: a repaired value re-reads
//! as itself after a save.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// Decodes an array record by record, skipping items that fail.
///
/// A non-array value yields an empty list.
pub fn records<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => {
            warn!(found = %kind(&other), "Expected a list of records, using an empty list");
            return Ok(Vec::new());
        }
    };

    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(index, error = %err, "Dropping record that failed to decode");
                None
            }
        })
        .collect();

    if decoded.len() < total {
        warn!(kept = decoded.len(), total, "Some stored records were dropped");
    }
    Ok(decoded)
}

/// Decodes an optional nested object, using `None` if it does not fit.
pub fn optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(value) {
        Ok(inner) => Ok(Some(inner)),
        Err(err) => {
            warn!(error = %err, "Dropping nested value that failed to decode");
            Ok(None)
        }
    }
}

/// Free text. `null` reads as empty; numbers and booleans as their text.
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    })
}

/// A non-negative whole count. Negatives read as 0, fractions truncate.
pub fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(number(&Value::deserialize(deserializer)?).map_or(0, to_count))
}

/// An optional count. `null`, non-numeric and negative values read as `None`.
pub fn optional_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(number(&Value::deserialize(deserializer)?)
        .filter(|n| *n >= 0.0)
        .map(to_count))
}

/// An amount. Anything non-numeric reads as 0.
pub fn amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(number(&Value::deserialize(deserializer)?).unwrap_or(0.0))
}

/// An optional amount. Anything non-numeric reads as `None`.
pub fn optional_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(number(&Value::deserialize(deserializer)?))
}

/// A switch. `null` reads as off; `0`/`1` and `"true"`/`"false"` are accepted.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    })
}

/// A finite number from a JSON number or a numeric string.
fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn to_count(n: f64) -> u32 {
    if n <= 0.0 {
        0
    } else if n >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        n.trunc() as u32
    }
}

pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use serde_json::json;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Row {
        #[serde(deserialize_with = "text")]
        label: String,
        #[serde(deserialize_with = "count")]
        reps: u32,
        #[serde(deserialize_with = "optional_count")]
        minutes: Option<u32>,
        #[serde(deserialize_with = "amount")]
        weight: f64,
        #[serde(deserialize_with = "optional_amount")]
        balance: Option<f64>,
        #[serde(deserialize_with = "flag")]
        on: bool,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Table {
        #[serde(deserialize_with = "records")]
        rows: Vec<Row>,
    }

    fn row(value: Value) -> Row {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_null_fields_read_as_empty() {
        let r = row(json!({
            "label": null, "reps": null, "minutes": null,
            "weight": null, "balance": null, "on": null
        }));
        assert_eq!(r, Row::default());
    }

    #[test]
    fn test_negative_and_fractional_counts() {
        let r = row(json!({ "reps": -5, "minutes": -30 }));
        assert_eq!(r.reps, 0);
        assert_eq!(r.minutes, None);

        let r = row(json!({ "reps": 7.9, "minutes": 45.5 }));
        assert_eq!(r.reps, 7);
        assert_eq!(r.minutes, Some(45));
    }

    #[test]
    fn test_numeric_strings_are_parsed() {
        let r = row(json!({ "reps": "12", "weight": " 80.5 ", "balance": "1500", "on": "true" }));
        assert_eq!(r.reps, 12);
        assert_eq!(r.weight, 80.5);
        assert_eq!(r.balance, Some(1500.0));
        assert!(r.on);

        let r = row(json!({ "weight": "heavy", "balance": "n/a" }));
        assert_eq!(r.weight, 0.0);
        assert_eq!(r.balance, None);
    }

    #[test]
    fn test_overflowing_numeric_string_is_not_infinite() {
        let r = row(json!({ "weight": "1e400", "balance": "1e400" }));
        assert_eq!(r.weight, 0.0);
        assert_eq!(r.balance, None);
    }

    #[test]
    fn test_text_from_scalars() {
        assert_eq!(row(json!({ "label": 42 })).label, "42");
        assert_eq!(row(json!({ "label": false })).label, "false");
        assert_eq!(row(json!({ "label": ["a"] })).label, "");
    }

    #[test]
    fn test_records_skip_only_the_unreadable_item() {
        let table: Table = serde_json::from_value(json!({
            "rows": [{ "label": "a" }, 42, "oops", { "label": "b", "reps": -1 }]
        }))
        .unwrap();
        let labels: Vec<&str> = table.rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "b"]);
    }

    #[test]
    fn test_records_from_non_array() {
        let table: Table = serde_json::from_value(json!({ "rows": "not a list" })).unwrap();
        assert!(table.rows.is_empty());
        let table: Table = serde_json::from_value(json!({ "rows": null })).unwrap();
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_repaired_values_are_stable() {
        let first = row(json!({ "label": 3, "reps": -2.5, "minutes": "20", "weight": "7" }));
        let again = row(serde_json::to_value(&first).unwrap());
        assert_eq!(again, first);
    }
}
