//! Error types for map file layout operations.

use std::fmt;

use bytestream::ByteError;

/// Result type for wire-level decoding.
pub type WireResult<T> = Result<T, DecodeError>;

/// High-level decode errors for the map file layout.
///
/// `Truncated` means the input ended mid-structure (it is most likely not a map
/// file at all). `CorruptData` means the bytes were there but violate the format.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    /// Ran out of bytes mid-structure.
    Truncated { requested: usize, available: usize },

    /// The structure violates a format invariant.
    CorruptData(CorruptReason),

    /// Limits exceeded.
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },
}

/// Why a structurally complete input was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorruptReason {
    /// Attribute tag byte outside `0..=7`.
    UnknownValueTag { tag: u8 },
    /// Run-length payload with an odd number of bytes.
    OddRleLength { len: usize },
    /// A signed count field holds a negative value.
    NegativeCount { kind: CountKind, value: i32 },
    /// A 7-bit encoded length ran past five bytes.
    InvalidVarint,
    /// A string payload is not UTF-8.
    InvalidUtf8 { position: usize },
}

/// Count fields in the map layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountKind {
    StringTable,
    Children,
    RlePayload,
}

/// Specific wire limits that can be exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    StringTableEntries,
    AttributesPerElement,
    ChildrenPerElement,
    RlePayloadBytes,
    ElementDepth,
    StringBytes,
}

/// Errors that can occur during encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// A count does not fit the width the format stores it in.
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },
    /// Run-length payloads store one byte per character.
    NonAsciiRle { position: usize, found: char },
}

impl DecodeError {
    /// Returns `true` for errors caused by running out of input.
    #[must_use]
    pub const fn is_truncated(&self) -> bool {
        matches!(self, Self::Truncated { .. })
    }

    /// Returns `true` for errors caused by a format violation.
    #[must_use]
    pub const fn is_corrupt(&self) -> bool {
        matches!(self, Self::CorruptData(_))
    }
}

impl From<ByteError> for DecodeError {
    fn from(err: ByteError) -> Self {
        match err {
            ByteError::UnexpectedEof {
                requested,
                available,
            } => Self::Truncated {
                requested,
                available,
            },
            ByteError::InvalidVarint => Self::CorruptData(CorruptReason::InvalidVarint),
            ByteError::InvalidUtf8 { position } => {
                Self::CorruptData(CorruptReason::InvalidUtf8 { position })
            }
            ByteError::StringTooLong { length, limit } => Self::LimitsExceeded {
                kind: LimitKind::StringBytes,
                limit,
                actual: length,
            },
            ByteError::LengthOverflow { length } => Self::LimitsExceeded {
                kind: LimitKind::StringBytes,
                limit: u32::MAX as usize,
                actual: length,
            },
        }
    }
}

impl From<ByteError> for EncodeError {
    fn from(err: ByteError) -> Self {
        let actual = match err {
            ByteError::LengthOverflow { length } => length,
            _ => 0,
        };
        Self::LimitsExceeded {
            kind: LimitKind::StringBytes,
            limit: u32::MAX as usize,
            actual,
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated {
                requested,
                available,
            } => {
                write!(
                    f,
                    "truncated map data: need {requested} bytes, have {available}"
                )
            }
            Self::CorruptData(reason) => write!(f, "corrupt map data: {reason}"),
            Self::LimitsExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} limit exceeded: {actual} > {limit}")
            }
        }
    }
}

impl fmt::Display for CorruptReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownValueTag { tag } => write!(f, "unknown value tag {tag}"),
            Self::OddRleLength { len } => {
                write!(f, "run-length payload has odd length {len}")
            }
            Self::NegativeCount { kind, value } => {
                write!(f, "negative {kind} count {value}")
            }
            Self::InvalidVarint => write!(f, "invalid 7-bit encoded length"),
            Self::InvalidUtf8 { position } => {
                write!(f, "invalid UTF-8 string at byte {position}")
            }
        }
    }
}

impl fmt::Display for CountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StringTable => "string table",
            Self::Children => "child",
            Self::RlePayload => "run-length payload",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StringTableEntries => "string table entries",
            Self::AttributesPerElement => "attributes per element",
            Self::ChildrenPerElement => "children per element",
            Self::RlePayloadBytes => "run-length payload bytes",
            Self::ElementDepth => "element depth",
            Self::StringBytes => "string bytes",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LimitsExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} limit exceeded: {actual} > {limit}")
            }
            Self::NonAsciiRle { position, found } => {
                write!(
                    f,
                    "run-length text must be ASCII, found {found:?} at {position}"
                )
            }
        }
    }
}

impl std::error::Error for DecodeError {}

impl std::error::Error for EncodeError {}
