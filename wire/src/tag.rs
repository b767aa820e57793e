//! Attribute value tags.

use crate::error::{CorruptReason, DecodeError};

/// Type tag written before every attribute payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ValueTag {
    /// One byte, non-zero is `true`.
    Bool = 0,
    /// Unsigned byte.
    Byte = 1,
    /// Little-endian `i16`.
    Int16 = 2,
    /// Little-endian `i32`.
    Int32 = 3,
    /// Little-endian `f32`.
    Float32 = 4,
    /// `i16` index into the header string table.
    InternedString = 5,
    /// Length-prefixed UTF-8 string.
    RawString = 6,
    /// `i16` byte count followed by run-length pairs.
    RleString = 7,
}

impl ValueTag {
    /// Parses a tag byte.
    pub fn parse(raw: u8) -> Result<Self, DecodeError> {
        Ok(match raw {
            0 => Self::Bool,
            1 => Self::Byte,
            2 => Self::Int16,
            3 => Self::Int32,
            4 => Self::Float32,
            5 => Self::InternedString,
            6 => Self::RawString,
            7 => Self::RleString,
            tag => {
                return Err(DecodeError::CorruptData(CorruptReason::UnknownValueTag {
                    tag,
                }))
            }
        })
    }

    /// Returns the raw tag byte.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self as u8
    }

    /// Fixed payload size in bytes, or `None` for variable-length payloads.
    #[must_use]
    pub const fn fixed_size(self) -> Option<usize> {
        match self {
            Self::Bool | Self::Byte => Some(1),
            Self::Int16 | Self::InternedString => Some(2),
            Self::Int32 | Self::Float32 => Some(4),
            Self::RawString | Self::RleString => None,
        }
    }
}
