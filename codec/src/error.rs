//! Error types for codec operations.

use std::fmt;

use bytestream::ByteError;
pub use wire::LimitKind;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during map encoding/decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Wire layout error while decoding.
    Decode(wire::DecodeError),

    /// Wire layout error while encoding.
    Encode(wire::EncodeError),

    /// A string table index points past the end of the table.
    StringIndexOutOfRange { index: i16, len: usize },

    /// Limits exceeded.
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },

    /// An XML map export is not well-formed.
    Xml(String),
}

impl CodecError {
    /// Returns `true` if the input ended mid-structure.
    #[must_use]
    pub const fn is_truncated(&self) -> bool {
        matches!(self, Self::Decode(err) if err.is_truncated())
    }

    /// Returns `true` if the input violates the map format.
    #[must_use]
    pub const fn is_corrupt(&self) -> bool {
        matches!(self, Self::Decode(err) if err.is_corrupt())
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(e) => write!(f, "decode error: {e}"),
            Self::Encode(e) => write!(f, "encode error: {e}"),
            Self::StringIndexOutOfRange { index, len } => {
                write!(f, "string index {index} out of range (table has {len})")
            }
            Self::LimitsExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} limit exceeded: {actual} > {limit}")
            }
            Self::Xml(msg) => write!(f, "xml error: {msg}"),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode(e) => Some(e),
            Self::Encode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wire::DecodeError> for CodecError {
    fn from(err: wire::DecodeError) -> Self {
        Self::Decode(err)
    }
}

impl From<wire::EncodeError> for CodecError {
    fn from(err: wire::EncodeError) -> Self {
        Self::Encode(err)
    }
}

impl From<quick_xml::Error> for CodecError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for CodecError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(err.to_string())
    }
}

/// Reader errors only surface while decoding.
impl From<ByteError> for CodecError {
    fn from(err: ByteError) -> Self {
        Self::Decode(err.into())
    }
}
