//! Error types for byte stream operations.

use std::fmt;

/// Result type for byte stream operations.
pub type ByteResult<T> = Result<T, ByteError>;

/// Errors that can occur while reading or writing the byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ByteError {
    /// Attempted to read past the end of the buffer.
    UnexpectedEof {
        /// Number of bytes requested.
        requested: usize,
        /// Number of bytes available.
        available: usize,
    },

    /// A 7-bit encoded integer ran past five bytes.
    InvalidVarint,

    /// A length-prefixed string did not contain valid UTF-8.
    InvalidUtf8 {
        /// Byte offset where the string payload starts.
        position: usize,
    },

    /// A string length prefix is above the caller's limit.
    StringTooLong {
        /// The declared length.
        length: usize,
        /// The largest accepted length.
        limit: usize,
    },

    /// A length does not fit the prefix used to store it.
    LengthOverflow {
        /// The length that was rejected.
        length: usize,
    },
}

impl fmt::Display for ByteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof {
                requested,
                available,
            } => {
                write!(
                    f,
                    "attempted to read {requested} bytes but only {available} bytes available"
                )
            }
            Self::InvalidVarint => write!(f, "7-bit encoded integer is longer than 5 bytes"),
            Self::InvalidUtf8 { position } => {
                write!(f, "invalid UTF-8 in string at byte {position}")
            }
            Self::StringTooLong { length, limit } => {
                write!(f, "string of {length} bytes exceeds limit of {limit}")
            }
            Self::LengthOverflow { length } => {
                write!(f, "length {length} does not fit its prefix")
            }
        }
    }
}

impl std::error::Error for ByteError {}
