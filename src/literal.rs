//! Literal-constrained values
//!
//! Large parts of the export format are pinned: a field is valid only if it
//! holds exactly one of a fixed, closed set of values known at schema-design
//! time (`recipient` is always `"all"`, `channel` is always `null`, a tool
//! author's `metadata` is always the empty object). A [`LiteralSet`] carries
//! the permitted set and performs the exact-match check in one place, so
//! validators never duplicate equality logic at call sites.

use serde_json::Value;

use crate::error::{FieldPath, Result, ValidationError};

/// A single permitted literal value.
///
/// `EmptySeq` and `EmptyMap` are pseudo-literals: they match exactly the
/// empty sequence / empty object and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    Null,
    Bool(bool),
    Str(&'static str),
    EmptySeq,
    EmptyMap,
}

impl Literal {
    fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Literal::Null, Value::Null) => true,
            (Literal::Bool(b), Value::Bool(v)) => b == v,
            (Literal::Str(s), Value::String(v)) => *s == v,
            (Literal::EmptySeq, Value::Array(v)) => v.is_empty(),
            (Literal::EmptyMap, Value::Object(v)) => v.is_empty(),
            _ => false,
        }
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Null => write!(f, "null"),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Str(s) => write!(f, "\"{}\"", s),
            Literal::EmptySeq => write!(f, "[]"),
            Literal::EmptyMap => write!(f, "{{}}"),
        }
    }
}

/// A closed set of permitted literal values for one field.
///
/// Sets are `const`-constructible so the schema's permitted values live in
/// static tables next to the validators that use them.
#[derive(Debug, Clone, Copy)]
pub struct LiteralSet {
    permitted: &'static [Literal],
}

/// Fields pinned to `null`.
pub const NULL: LiteralSet = LiteralSet::new(&[Literal::Null]);

/// Fields pinned to `true`.
pub const TRUE: LiteralSet = LiteralSet::new(&[Literal::Bool(true)]);

/// Fields pinned to the empty object.
pub const EMPTY_MAP: LiteralSet = LiteralSet::new(&[Literal::EmptyMap]);

/// Fields pinned to the empty sequence or `null`.
pub const EMPTY_SEQ_OR_NULL: LiteralSet = LiteralSet::new(&[Literal::EmptySeq, Literal::Null]);

impl LiteralSet {
    pub const fn new(permitted: &'static [Literal]) -> Self {
        Self { permitted }
    }

    /// Check `value` against the permitted set.
    ///
    /// Matching is exact, including type: `1` does not satisfy `"1"` and
    /// `true` does not satisfy `"true"`. No coercion is ever applied.
    pub fn check(&self, path: &FieldPath, value: &Value) -> Result<()> {
        if self.permitted.iter().any(|lit| lit.matches(value)) {
            return Ok(());
        }
        Err(ValidationError::LiteralViolation {
            path: path.to_string(),
            permitted: self.describe(),
            actual: value.to_string(),
        })
    }

    /// Render the permitted set for diagnostics, e.g. `{"all"}`.
    pub fn describe(&self) -> String {
        let rendered: Vec<String> = self.permitted.iter().map(|l| l.to_string()).collect();
        format!("{{{}}}", rendered.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    const ALL: LiteralSet = LiteralSet::new(&[Literal::Str("all")]);

    #[test]
    fn test_declared_literal_succeeds() {
        let path = FieldPath::root().child("recipient");
        assert!(ALL.check(&path, &json!("all")).is_ok());
    }

    #[test]
    fn test_other_value_fails_with_permitted_set() {
        let path = FieldPath::root().child("recipient");
        let err = ALL.check(&path, &json!("someone")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LiteralViolation);
        match err {
            ValidationError::LiteralViolation {
                path,
                permitted,
                actual,
            } => {
                assert_eq!(path, "recipient");
                assert_eq!(permitted, "{\"all\"}");
                assert_eq!(actual, "\"someone\"");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_no_cross_type_coercion() {
        const ONE: LiteralSet = LiteralSet::new(&[Literal::Str("1")]);
        let path = FieldPath::root().child("version");
        assert!(ONE.check(&path, &json!(1)).is_err());
        assert!(ONE.check(&path, &json!("1")).is_ok());

        let path = FieldPath::root().child("sanitized");
        assert!(TRUE.check(&path, &json!("true")).is_err());
        assert!(TRUE.check(&path, &json!(true)).is_ok());
    }

    #[test]
    fn test_null_pin() {
        let path = FieldPath::root().child("channel");
        assert!(NULL.check(&path, &json!(null)).is_ok());
        assert!(NULL.check(&path, &json!("default")).is_err());
        assert!(NULL.check(&path, &json!(0)).is_err());
    }

    #[test]
    fn test_empty_pseudo_literals() {
        let path = FieldPath::root().child("metadata");
        assert!(EMPTY_MAP.check(&path, &json!({})).is_ok());
        assert!(EMPTY_MAP.check(&path, &json!({"k": 1})).is_err());
        assert!(EMPTY_MAP.check(&path, &json!([])).is_err());

        let path = FieldPath::root().child("assets");
        assert!(EMPTY_SEQ_OR_NULL.check(&path, &json!([])).is_ok());
        assert!(EMPTY_SEQ_OR_NULL.check(&path, &json!(null)).is_ok());
        assert!(EMPTY_SEQ_OR_NULL.check(&path, &json!(["a"])).is_err());
    }

    #[test]
    fn test_multi_member_set() {
        const STATUS: LiteralSet = LiteralSet::new(&[
            Literal::Str("finished_successfully"),
            Literal::Str("in_progress"),
        ]);
        let path = FieldPath::root().child("status");
        assert!(STATUS.check(&path, &json!("in_progress")).is_ok());
        assert!(STATUS.check(&path, &json!("finished_successfully")).is_ok());
        assert!(STATUS.check(&path, &json!("queued")).is_err());
    }
}
