//! Record validation
//!
//! This module turns one raw export record into a typed [`Message`], or
//! fails with a structured error naming the exact field path.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────────┐     ┌──────────────────┐
//! │  Raw record  │ ──► │ validate_message│ ──► │  Typed Message   │
//! │ (serde_json) │     │  (role dispatch)│     │ (User / Tool)    │
//! └──────────────┘     └─────────────────┘     └──────────────────┘
//!                             │
//!                             ▼
//!                  ┌──────────────────────┐
//!                  │  Role validators     │
//!                  │  ├─ user::validate_* │
//!                  │  └─ tool::validate_* │
//!                  └──────────────────────┘
//! ```
//!
//! ## Design Principles
//!
//! 1. **All-or-nothing**: a record either fully validates or no value is
//!    produced; there is no partially-typed record.
//! 2. **Path-attributed errors**: every failure names the full dot/bracket
//!    path from the record root.
//! 3. **Errors propagate unchanged**: sub-validator failures are never
//!    downgraded or defaulted away on the way up.

mod content;
mod tool;
mod user;

pub use content::{registered_content_types, validate_tool_content, validate_user_content};
pub use tool::validate_tool_message;
pub use user::validate_user_message;

use serde_json::{Map, Value};
use tracing::trace;

use crate::error::{FieldPath, Result, ValidationError};
use crate::literal::{Literal, LiteralSet};
use crate::types::{Message, Role};

/// Validate one raw record, dispatching on its role discriminator.
pub fn validate_message(record: &Value) -> Result<Message> {
    let role = detect_role(record)?;
    trace!(role = %role, "dispatching record validation");
    match role {
        Role::User => Ok(Message::User(validate_user_message(record)?)),
        Role::Tool => Ok(Message::Tool(validate_tool_message(record)?)),
    }
}

/// Read the role discriminator from a raw record.
///
/// User records carry `role` at the top level; tool records nest it under
/// `author.role`. A value outside the closed role set is a literal
/// violation on the role field.
pub fn detect_role(record: &Value) -> Result<Role> {
    const ROLES: LiteralSet = LiteralSet::new(&[Literal::Str("user"), Literal::Str("tool")]);

    let raw = RawObject::of(FieldPath::root(), record)?;
    let (value, path) = if let Some(value) = raw.optional("role") {
        (value, raw.field_path("role"))
    } else if let Some(author) = raw.optional("author") {
        let author = RawObject::of(raw.field_path("author"), author)?;
        (author.require("role")?, author.field_path("role"))
    } else {
        return Err(ValidationError::MissingRequiredField {
            path: raw.field_path("role").to_string(),
        });
    };

    ROLES.check(&path, value)?;
    let name = as_str(&path, value)?;
    name.parse::<Role>()
        .map_err(|_| ValidationError::LiteralViolation {
            path: path.to_string(),
            permitted: ROLES.describe(),
            actual: value.to_string(),
        })
}

// ============================================
// Raw-field cursor
// ============================================

/// Cursor over a raw object that pairs the map with its field path.
///
/// All field extraction goes through here so every failure is attributed to
/// the full path from the record root: absent required fields become
/// `MissingRequiredField`, wrong-typed values become `TypeCoercionFailure`.
pub(crate) struct RawObject<'a> {
    path: FieldPath,
    map: &'a Map<String, Value>,
}

impl<'a> RawObject<'a> {
    /// Interpret `value` as an object rooted at `path`.
    pub(crate) fn of(path: FieldPath, value: &'a Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self { path, map }),
            other => Err(coercion(&path, "object", other)),
        }
    }

    /// Wrap an already-extracted map rooted at `path`.
    pub(crate) fn from_map(path: FieldPath, map: &'a Map<String, Value>) -> Self {
        Self { path, map }
    }

    pub(crate) fn field_path(&self, name: &str) -> FieldPath {
        self.path.child(name)
    }

    /// A required field; absence fails.
    pub(crate) fn require(&self, name: &str) -> Result<&'a Value> {
        self.map
            .get(name)
            .ok_or_else(|| ValidationError::MissingRequiredField {
                path: self.field_path(name).to_string(),
            })
    }

    /// An optional field; absence and explicit null are both `None`.
    pub(crate) fn optional(&self, name: &str) -> Option<&'a Value> {
        match self.map.get(name) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value),
        }
    }

    pub(crate) fn require_str(&self, name: &str) -> Result<String> {
        as_str(&self.field_path(name), self.require(name)?)
    }

    pub(crate) fn require_f64(&self, name: &str) -> Result<f64> {
        as_f64(&self.field_path(name), self.require(name)?)
    }

    pub(crate) fn require_u64(&self, name: &str) -> Result<u64> {
        as_u64(&self.field_path(name), self.require(name)?)
    }

    pub(crate) fn require_i64(&self, name: &str) -> Result<i64> {
        as_i64(&self.field_path(name), self.require(name)?)
    }

    pub(crate) fn require_array(&self, name: &str) -> Result<&'a Vec<Value>> {
        as_array(&self.field_path(name), self.require(name)?)
    }

    /// A required sequence of strings, with per-element error paths.
    pub(crate) fn require_str_array(&self, name: &str) -> Result<Vec<String>> {
        let path = self.field_path(name);
        let elems = self.require_array(name)?;
        let mut out = Vec::with_capacity(elems.len());
        for (idx, elem) in elems.iter().enumerate() {
            out.push(as_str(&path.index(idx), elem)?);
        }
        Ok(out)
    }

    /// A required field whose value may be null.
    pub(crate) fn nullable_str(&self, name: &str) -> Result<Option<String>> {
        match self.require(name)? {
            Value::Null => Ok(None),
            value => Ok(Some(as_str(&self.field_path(name), value)?)),
        }
    }

    /// A required field whose value may be null.
    pub(crate) fn nullable_f64(&self, name: &str) -> Result<Option<f64>> {
        match self.require(name)? {
            Value::Null => Ok(None),
            value => Ok(Some(as_f64(&self.field_path(name), value)?)),
        }
    }

    pub(crate) fn optional_str(&self, name: &str) -> Result<Option<String>> {
        self.optional(name)
            .map(|value| as_str(&self.field_path(name), value))
            .transpose()
    }

    pub(crate) fn optional_i64(&self, name: &str) -> Result<Option<i64>> {
        self.optional(name)
            .map(|value| as_i64(&self.field_path(name), value))
            .transpose()
    }

    pub(crate) fn optional_bool(&self, name: &str) -> Result<Option<bool>> {
        self.optional(name)
            .map(|value| as_bool(&self.field_path(name), value))
            .transpose()
    }

    pub(crate) fn optional_array(&self, name: &str) -> Result<Option<&'a Vec<Value>>> {
        self.optional(name)
            .map(|value| as_array(&self.field_path(name), value))
            .transpose()
    }

    pub(crate) fn optional_object(&self, name: &str) -> Result<Option<&'a Map<String, Value>>> {
        self.optional(name)
            .map(|value| as_object(&self.field_path(name), value))
            .transpose()
    }

    /// Check a required field against a literal set.
    pub(crate) fn require_literal(&self, name: &str, set: LiteralSet) -> Result<()> {
        set.check(&self.field_path(name), self.require(name)?)
    }

    /// Check an optional field against a literal set; absence passes.
    pub(crate) fn pinned_optional(&self, name: &str, set: LiteralSet) -> Result<()> {
        if let Some(value) = self.map.get(name) {
            set.check(&self.field_path(name), value)?;
        }
        Ok(())
    }
}

// ============================================
// Typed readers over raw values
// ============================================

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "object",
    }
}

fn coercion(path: &FieldPath, expected: &'static str, actual: &Value) -> ValidationError {
    ValidationError::TypeCoercionFailure {
        path: path.to_string(),
        expected,
        actual: type_name(actual).to_string(),
    }
}

pub(crate) fn as_str(path: &FieldPath, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(coercion(path, "string", other)),
    }
}

pub(crate) fn as_f64(path: &FieldPath, value: &Value) -> Result<f64> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| coercion(path, "number", value)),
        other => Err(coercion(path, "number", other)),
    }
}

pub(crate) fn as_u64(path: &FieldPath, value: &Value) -> Result<u64> {
    value
        .as_u64()
        .ok_or_else(|| coercion(path, "non-negative integer", value))
}

pub(crate) fn as_i64(path: &FieldPath, value: &Value) -> Result<i64> {
    value
        .as_i64()
        .ok_or_else(|| coercion(path, "integer", value))
}

pub(crate) fn as_bool(path: &FieldPath, value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        other => Err(coercion(path, "boolean", other)),
    }
}

pub(crate) fn as_array<'a>(path: &FieldPath, value: &'a Value) -> Result<&'a Vec<Value>> {
    match value {
        Value::Array(elems) => Ok(elems),
        other => Err(coercion(path, "sequence", other)),
    }
}

pub(crate) fn as_object<'a>(path: &FieldPath, value: &'a Value) -> Result<&'a Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(coercion(path, "object", other)),
    }
}
