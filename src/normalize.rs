//! Field normalization
//!
//! Pre-validation rewrites that coerce tolerant and legacy input shapes into
//! the canonical strict shape. All transforms are deterministic, pure
//! functions of the raw input: they consult no external state, either fully
//! apply or fail the record, and leave already-canonical input untouched, so
//! normalizing twice equals normalizing once.

use serde_json::{json, Map, Value};

use crate::error::{FieldPath, Result, ValidationError};

/// Collapse a one-element sequence to its single element.
///
/// Values that are not sequences pass through unchanged. A sequence of any
/// other length fails with [`ValidationError::CardinalityViolation`].
pub fn collapse_singleton(path: &FieldPath, value: Value) -> Result<Value> {
    match value {
        Value::Array(mut elems) => {
            if elems.len() == 1 {
                Ok(elems.remove(0))
            } else {
                Err(ValidationError::CardinalityViolation {
                    path: path.to_string(),
                    expected: 1,
                    actual: elems.len(),
                })
            }
        }
        other => Ok(other),
    }
}

/// Promote bare strings in a parts sequence to tagged text objects.
///
/// `"hello"` becomes `{"content_type": "text", "text": "hello"}`; elements
/// that are not strings pass through unchanged. Never fails.
pub fn promote_text_parts(parts: Vec<Value>) -> Vec<Value> {
    parts
        .into_iter()
        .map(|part| match part {
            Value::String(text) => json!({"content_type": "text", "text": text}),
            other => other,
        })
        .collect()
}

/// Remap a legacy field name onto its canonical name.
///
/// When both keys are present the alias is the source of truth and the value
/// under the canonical key is discarded; an absent alias leaves the object
/// untouched.
pub fn remap_alias(obj: &mut Map<String, Value>, alias: &str, canonical: &str) {
    if let Some(value) = obj.remove(alias) {
        obj.insert(canonical.to_string(), value);
    }
}
