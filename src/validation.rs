//! Input validation shared by the module mutators.
//!
//! Every mutator validates its whole input before touching the document, so
//! a validation error always means nothing changed. Limits live in
//! [`crate::storage::schema`].

use crate::error::ValidationError;
use crate::storage::schema::{MAX_CONTENT_SIZE, MAX_LABEL_LENGTH};
use crate::types::parse_date;

/// Requires a finite amount strictly greater than zero.
pub(crate) fn positive_amount(field: &str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::invalid_field(
            field,
            format!("must be a positive number, got {value}"),
        ));
    }
    Ok(value)
}

/// Requires a finite amount greater than or equal to zero.
pub(crate) fn non_negative_amount(field: &str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::invalid_field(
            field,
            format!("must be zero or more, got {value}"),
        ));
    }
    Ok(value)
}

/// Requires any finite amount (balances may be negative).
pub(crate) fn finite_amount(field: &str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::invalid_field(field, "must be a finite number"));
    }
    Ok(value)
}

/// Requires non-empty text after trimming, at most [`MAX_LABEL_LENGTH`] bytes.
///
/// Returns the trimmed text.
pub(crate) fn required_label(field: &str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::required_field(field));
    }
    optional_label(field, trimmed)
}

/// Trims optional text and enforces [`MAX_LABEL_LENGTH`]. Empty is allowed.
pub(crate) fn optional_label(field: &str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.len() > MAX_LABEL_LENGTH {
        return Err(ValidationError::invalid_field(
            field,
            format!(
                "must be at most {} bytes, got {}",
                MAX_LABEL_LENGTH,
                trimmed.len()
            ),
        ));
    }
    Ok(trimmed.to_string())
}

/// Trims free text (notes, journal content) and enforces
/// [`MAX_CONTENT_SIZE`]. Empty is allowed.
pub(crate) fn optional_text(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.len() > MAX_CONTENT_SIZE {
        return Err(ValidationError::content_too_large(
            trimmed.len(),
            MAX_CONTENT_SIZE,
        ));
    }
    Ok(trimmed.to_string())
}

/// Requires a `YYYY-MM-DD` date. Returns it trimmed.
pub(crate) fn required_date(field: &str, value: &str) -> Result<String, ValidationError> {
    parse_date(field, value)?;
    Ok(value.trim().to_string())
}

/// Validates an optional date; blank counts as absent.
pub(crate) fn optional_date(
    field: &str,
    value: Option<&str>,
) -> Result<Option<String>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(date) => required_date(field, date).map(Some),
    }
}
