//! Error types for decoding.

use alloc::string::String;
use core::fmt::{self, Display};

use shapeql_core::{ScalarError, Shape};

use crate::tokenizer::SyntaxErrorKind;

/// A location in the source document, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Byte offset of the first byte
    pub offset: usize,
    /// Length in bytes
    pub len: usize,
}

impl Span {
    /// Creates a span.
    pub const fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// Offset one past the last byte.
    pub const fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Error returned when a document can't be decoded.
///
/// Any error aborts the decode. Whatever was written to the target before
/// the error is left in place and should not be relied upon.
#[derive(Debug)]
pub struct DecodeError {
    /// The specific kind of error
    pub kind: DecodeErrorKind,
    /// Source span of the token being processed, when known
    pub span: Option<Span>,
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl core::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match &self.kind {
            DecodeErrorKind::Scalar(err) => Some(err),
            _ => None,
        }
    }
}

impl DecodeError {
    /// Create a new error with span information
    pub const fn new(kind: DecodeErrorKind, span: Span) -> Self {
        DecodeError {
            kind,
            span: Some(span),
        }
    }

    /// Create an error without span information
    pub const fn without_span(kind: DecodeErrorKind) -> Self {
        DecodeError { kind, span: None }
    }

    /// Stable identifier of the error kind.
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }
}

/// Specific error kinds for decoding
#[derive(Debug)]
pub enum DecodeErrorKind {
    /// The document is not well-formed JSON
    Syntax(SyntaxErrorKind),
    /// Input ended in the middle of a value
    UnexpectedEof {
        /// What was expected before EOF
        expected: &'static str,
    },
    /// The token source produced a token that is not valid at this point
    UnexpectedToken {
        /// The token that was found
        got: String,
        /// What was expected instead
        expected: &'static str,
    },
    /// Containers are nested deeper than `DecodeOptions::max_depth`
    DepthLimitExceeded {
        /// The configured limit
        max: usize,
    },
    /// A key matched no field in any active branch
    UnknownField {
        /// The key, as found in the document
        field: String,
        /// Number of branches the key was looked up in
        branches: usize,
    },
    /// An array where no active branch has a sequence
    NoSequence {
        /// Number of branches that were tried
        branches: usize,
    },
    /// A scalar where the destination is a struct or a sequence
    TypeMismatch {
        /// Shape of the destination
        expected: &'static Shape,
        /// JSON type of the value found
        got: &'static str,
    },
    /// A leaf could not be converted to the destination type
    Scalar(ScalarError),
    /// Another value follows the top-level value
    TrailingData {
        /// The first token after the top-level value
        token: String,
    },
}

impl Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeErrorKind::Syntax(e) => write!(f, "syntax error: {e}"),
            DecodeErrorKind::UnexpectedEof { expected } => {
                write!(f, "unexpected end of input, expected {expected}")
            }
            DecodeErrorKind::UnexpectedToken { got, expected } => {
                write!(f, "unexpected token: got {got}, expected {expected}")
            }
            DecodeErrorKind::DepthLimitExceeded { max } => {
                write!(f, "nesting depth exceeds the limit of {max}")
            }
            DecodeErrorKind::UnknownField { field, branches } => {
                write!(f, "unknown field `{field}` (looked up in {branches} branch")?;
                if *branches != 1 {
                    f.write_str("es")?;
                }
                f.write_str(")")
            }
            DecodeErrorKind::NoSequence { branches } => {
                write!(f, "found an array, but none of {branches} branches is a sequence")
            }
            DecodeErrorKind::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }
            DecodeErrorKind::Scalar(e) => write!(f, "invalid value: {e}"),
            DecodeErrorKind::TrailingData { token } => {
                write!(f, "trailing data after top-level value: {token}")
            }
        }
    }
}

impl DecodeErrorKind {
    /// Get an error code for this kind of error.
    pub const fn code(&self) -> &'static str {
        match self {
            DecodeErrorKind::Syntax(_) => "shapeql::syntax",
            DecodeErrorKind::UnexpectedEof { .. } => "shapeql::unexpected_eof",
            DecodeErrorKind::UnexpectedToken { .. } => "shapeql::unexpected_token",
            DecodeErrorKind::DepthLimitExceeded { .. } => "shapeql::depth_limit_exceeded",
            DecodeErrorKind::UnknownField { .. } => "shapeql::unknown_field",
            DecodeErrorKind::NoSequence { .. } => "shapeql::no_sequence",
            DecodeErrorKind::TypeMismatch { .. } => "shapeql::type_mismatch",
            DecodeErrorKind::Scalar(_) => "shapeql::scalar",
            DecodeErrorKind::TrailingData { .. } => "shapeql::trailing_data",
        }
    }
}

impl From<ScalarError> for DecodeErrorKind {
    fn from(err: ScalarError) -> Self {
        DecodeErrorKind::Scalar(err)
    }
}

impl From<SyntaxErrorKind> for DecodeErrorKind {
    fn from(err: SyntaxErrorKind) -> Self {
        DecodeErrorKind::Syntax(err)
    }
}

/// Result type for decoding
pub type Result<T> = core::result::Result<T, DecodeError>;
