use alloc::string::String;
use core::fmt;

use thiserror::Error;

use crate::info::Shape;

// -----------------------------------------------------------------------------
// PersistError

/// Every way a read, write or clone session can fail.
///
/// All variants are fatal to the operation that produced them: no partially
/// built object is ever returned.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PersistError {
    /// The input is malformed or incompatible with the local types.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A concrete type appeared that has no registered handler.
    #[error("no handler registered for type `{type_path}`")]
    Dispatch { type_path: String },

    /// A shared resource could not be resolved by its cloner.
    #[error("shared resource `{type_path}` could not be resolved: {reason}")]
    Resource { type_path: String, reason: String },

    #[error("i/o failure")]
    Io(#[from] std::io::Error),
}

impl PersistError {
    /// Shorthand used by custom resource cloners.
    pub fn resource(type_path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resource {
            type_path: type_path.into(),
            reason: reason.into(),
        }
    }

    /// Returns the decode error kind, if this is a decode error.
    pub fn decode_kind(&self) -> Option<&DecodeErrorKind> {
        match self {
            Self::Decode(err) => Some(&err.kind),
            _ => None,
        }
    }
}

impl From<DecodeErrorKind> for PersistError {
    #[inline]
    fn from(kind: DecodeErrorKind) -> Self {
        Self::Decode(DecodeError::from(kind))
    }
}

// -----------------------------------------------------------------------------
// DecodeError

/// A malformed stream, with the byte offset where it was detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    pub kind: DecodeErrorKind,
    /// Offset into the input, `None` when position reporting is disabled.
    pub position: Option<usize>,
}

impl DecodeError {
    #[inline]
    pub const fn at(kind: DecodeErrorKind, position: usize) -> Self {
        Self {
            kind,
            position: Some(position),
        }
    }
}

impl From<DecodeErrorKind> for DecodeError {
    #[inline]
    fn from(kind: DecodeErrorKind) -> Self {
        Self {
            kind,
            position: None,
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(position) => write!(f, "{} at byte {position}", self.kind),
            None => fmt::Display::fmt(&self.kind, f),
        }
    }
}

impl core::error::Error for DecodeError {}

/// What went wrong while decoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeErrorKind {
    #[error("unexpected end of input, {needed} more byte(s) needed")]
    UnexpectedEof { needed: usize },

    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    #[error("invalid `{shape}` value")]
    InvalidValue { shape: Shape },

    #[error("malformed length prefix")]
    BadLength,

    #[error("collection count {count} is inconsistent with the remaining input")]
    BadCount { count: i64 },

    #[error("class id {class_id} is out of range, {known} class(es) defined so far")]
    BadClassId { class_id: i16, known: usize },

    #[error("unknown shape tag {0}")]
    UnknownShape(u8),

    #[error("value or shape nesting exceeds {limit} levels")]
    NestingTooDeep { limit: usize },

    #[error("missing required field `{field}` of `{class}`")]
    MissingField { class: String, field: String },

    #[error("new field `{field}` of `{class}` is unknown to this reader")]
    UnknownField { class: String, field: String },

    #[error("field `{field}` of `{class}` is stored as `{found}`, expected `{expected}`")]
    IncompatibleField {
        class: String,
        field: String,
        expected: Shape,
        found: Shape,
    },

    #[error("stored layout of compact class `{class}` differs from the local one")]
    LayoutMismatch { class: String },

    #[error("ordinal {ordinal} of `{class}` is out of order after {previous}")]
    OrdinalOutOfOrder {
        class: String,
        ordinal: i16,
        previous: usize,
    },

    #[error("unfinished object `{class}`, expected zero but got {ordinal}")]
    UnfinishedObject { class: String, ordinal: i16 },

    #[error("expected `{expected}`, found `{found}`")]
    TypeMismatch { expected: String, found: String },

    #[error("unexpected null for `{expected}`")]
    UnexpectedNull { expected: String },

    #[error("signature mismatch")]
    BadSignature,

    #[error("field index {index} is out of range for `{class}`")]
    BadFieldIndex { class: String, index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn position_is_rendered_when_known() {
        let err = DecodeError::at(DecodeErrorKind::UnexpectedEof { needed: 4 }, 10);
        assert_eq!(
            err.to_string(),
            "unexpected end of input, 4 more byte(s) needed at byte 10"
        );

        let err = DecodeError::from(DecodeErrorKind::BadSignature);
        assert_eq!(err.to_string(), "signature mismatch");
    }

    #[test]
    fn errors_name_type_and_field() {
        let err = PersistError::from(DecodeErrorKind::MissingField {
            class: "scene::Node".into(),
            field: "id".into(),
        });
        assert_eq!(err.to_string(), "missing required field `id` of `scene::Node`");
        assert!(matches!(
            err.decode_kind(),
            Some(DecodeErrorKind::MissingField { .. })
        ));
    }
}
