//! Error types for chatvet
//!
//! Every failure a validator can produce is one of the six
//! [`ValidationError`] variants. Errors are raised by the smallest validation
//! unit that detects them and propagate unchanged through composing
//! validators; the field path is the only context that grows on the way up.

use thiserror::Error;

use crate::types::Role;

/// Dot/bracket field path from the record root, e.g. `content.parts[0]`.
///
/// Paths are built top-down as validation descends into sub-objects, so an
/// error raised deep inside a record is attributed to its full location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(String);

impl FieldPath {
    /// Path of the record root.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Path of a named field under this one.
    pub fn child(&self, name: &str) -> Self {
        if self.0.is_empty() {
            Self(name.to_string())
        } else {
            Self(format!("{}.{}", self.0, name))
        }
    }

    /// Path of a sequence element under this one.
    pub fn index(&self, idx: usize) -> Self {
        Self(format!("{}[{}]", self.0, idx))
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            f.write_str("$")
        } else {
            f.write_str(&self.0)
        }
    }
}

/// Which link of the conversation tree a dangling reference came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// The `parent` pointer on a message
    Parent,
    /// An entry in a message's `children` list
    Child,
    /// The key a message is stored under in the conversation mapping
    MappingKey,
}

impl LinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::Parent => "parent",
            LinkKind::Child => "child",
            LinkKind::MappingKey => "mapping key",
        }
    }
}

impl std::fmt::Display for LinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind discriminant for [`ValidationError`], for programmatic matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    SchemaMismatch,
    LiteralViolation,
    CardinalityViolation,
    MissingRequiredField,
    TypeCoercionFailure,
    DanglingReference,
}

/// A validation failure for a single record or conversation mapping.
///
/// Each variant carries enough context to produce a human-readable
/// diagnostic: the field path from the record root in dot/bracket notation,
/// plus the permitted set, expected cardinality, or offending value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// No content shape is registered for this (role, discriminator) pair
    #[error("{path}: no `{role}` content shape registered for content_type `{content_type}`")]
    SchemaMismatch {
        path: String,
        role: Role,
        content_type: String,
    },

    /// A literal-constrained field holds a value outside its permitted set
    #[error("{path}: value {actual} is not in the permitted set {permitted}")]
    LiteralViolation {
        path: String,
        permitted: String,
        actual: String,
    },

    /// A sequence field has an unexpected length
    #[error("{path}: expected a sequence of length {expected}, found length {actual}")]
    CardinalityViolation {
        path: String,
        expected: usize,
        actual: usize,
    },

    /// A required field is absent from the raw input
    #[error("{path}: missing required field")]
    MissingRequiredField { path: String },

    /// A field's raw value cannot be read as its declared type
    #[error("{path}: expected {expected}, found {actual}")]
    TypeCoercionFailure {
        path: String,
        expected: &'static str,
        actual: String,
    },

    /// A parent/child id reference with no matching record in the mapping
    #[error("message `{id}`: {link} reference `{target}` not found in conversation mapping")]
    DanglingReference {
        id: String,
        link: LinkKind,
        target: String,
    },
}

impl ValidationError {
    /// The taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::SchemaMismatch { .. } => ErrorKind::SchemaMismatch,
            ValidationError::LiteralViolation { .. } => ErrorKind::LiteralViolation,
            ValidationError::CardinalityViolation { .. } => ErrorKind::CardinalityViolation,
            ValidationError::MissingRequiredField { .. } => ErrorKind::MissingRequiredField,
            ValidationError::TypeCoercionFailure { .. } => ErrorKind::TypeCoercionFailure,
            ValidationError::DanglingReference { .. } => ErrorKind::DanglingReference,
        }
    }

    /// The field path the error is attributed to, for record-level errors.
    pub fn path(&self) -> Option<&str> {
        match self {
            ValidationError::SchemaMismatch { path, .. }
            | ValidationError::LiteralViolation { path, .. }
            | ValidationError::CardinalityViolation { path, .. }
            | ValidationError::MissingRequiredField { path }
            | ValidationError::TypeCoercionFailure { path, .. } => Some(path),
            ValidationError::DanglingReference { .. } => None,
        }
    }
}

/// Result type alias for chatvet validators
pub type Result<T> = std::result::Result<T, ValidationError>;
