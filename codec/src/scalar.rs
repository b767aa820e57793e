//! Attribute values and their wire payloads.

use std::fmt;

use bytestream::{ByteReader, ByteWriter};
use wire::{rle, CorruptReason, CountKind, DecodeError, LimitKind, Limits, ValueTag};

use crate::error::{CodecError, CodecResult};
use crate::string_table::StringTable;

/// A single attribute value.
///
/// The variant decides the tag written on the wire. Decoded values carry the
/// tag they were read with, so `decode(encode(v)) == v` for every variant.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", content = "value"))]
pub enum ScalarValue {
    Bool(bool),
    Byte(u8),
    Int16(i16),
    Int32(i32),
    Float32(f32),
    /// String stored once in the header table and referenced by index.
    InternedString(String),
    /// String stored inline.
    RawString(String),
    /// Tile grid text stored as run-length pairs.
    RleBlob(String),
}

impl ScalarValue {
    /// Infers the narrowest value for attribute text.
    ///
    /// Tries, in order: bool, byte, `i16`, `i32`, float, and falls back to an
    /// interned string.
    ///
    /// ```
    /// use codec::ScalarValue;
    ///
    /// assert_eq!(ScalarValue::infer("5"), ScalarValue::Byte(5));
    /// assert_eq!(ScalarValue::infer("-5"), ScalarValue::Int16(-5));
    /// assert_eq!(ScalarValue::infer("5.0"), ScalarValue::Float32(5.0));
    /// assert_eq!(ScalarValue::infer("True"), ScalarValue::Bool(true));
    /// ```
    #[must_use]
    pub fn infer(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.eq_ignore_ascii_case("true") {
            return Self::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Self::Bool(false);
        }
        if let Some(value) = parse_integer(trimmed) {
            if let Ok(byte) = u8::try_from(value) {
                return Self::Byte(byte);
            }
            if let Ok(short) = i16::try_from(value) {
                return Self::Int16(short);
            }
            if let Ok(int) = i32::try_from(value) {
                return Self::Int32(int);
            }
        }
        if let Some(float) = parse_float(trimmed) {
            return Self::Float32(float);
        }
        Self::InternedString(text.to_owned())
    }

    /// Returns the wire tag for this value.
    #[must_use]
    pub const fn tag(&self) -> ValueTag {
        match self {
            Self::Bool(_) => ValueTag::Bool,
            Self::Byte(_) => ValueTag::Byte,
            Self::Int16(_) => ValueTag::Int16,
            Self::Int32(_) => ValueTag::Int32,
            Self::Float32(_) => ValueTag::Float32,
            Self::InternedString(_) => ValueTag::InternedString,
            Self::RawString(_) => ValueTag::RawString,
            Self::RleBlob(_) => ValueTag::RleString,
        }
    }

    /// Returns `true` if the payload is a string table index.
    #[must_use]
    pub const fn needs_interning(&self) -> bool {
        matches!(self, Self::InternedString(_))
    }

    /// Returns the text of string-like values.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::InternedString(s) | Self::RawString(s) | Self::RleBlob(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an `i32` if it is an integer.
    #[must_use]
    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            Self::Byte(v) => Some(i32::from(v)),
            Self::Int16(v) => Some(i32::from(v)),
            Self::Int32(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the value as an `f32` if it is numeric.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            Self::Float32(v) => Some(v),
            _ => self.as_i32().map(|v| v as f32),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Byte(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Float32(v) => write!(f, "{v}"),
            Self::InternedString(s) | Self::RawString(s) | Self::RleBlob(s) => f.write_str(s),
        }
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<u8> for ScalarValue {
    fn from(value: u8) -> Self {
        Self::Byte(value)
    }
}

impl From<i16> for ScalarValue {
    fn from(value: i16) -> Self {
        Self::Int16(value)
    }
}

impl From<i32> for ScalarValue {
    fn from(value: i32) -> Self {
        Self::Int32(value)
    }
}

impl From<f32> for ScalarValue {
    fn from(value: f32) -> Self {
        Self::Float32(value)
    }
}

/// Writes the payload of `value` (without its tag).
///
/// Interned strings must already be in `table`.
pub fn encode_scalar(
    value: &ScalarValue,
    writer: &mut ByteWriter,
    table: &StringTable,
) -> CodecResult<()> {
    match value {
        ScalarValue::Bool(v) => writer.write_bool(*v),
        ScalarValue::Byte(v) => writer.write_u8(*v),
        ScalarValue::Int16(v) => writer.write_i16(*v),
        ScalarValue::Int32(v) => writer.write_i32(*v),
        ScalarValue::Float32(v) => writer.write_f32(*v),
        ScalarValue::InternedString(s) => writer.write_i16(table.index_of(s)?),
        ScalarValue::RawString(s) => writer.write_string(s).map_err(wire::EncodeError::from)?,
        ScalarValue::RleBlob(s) => {
            let payload = rle::encode(s)?;
            let len = i16::try_from(payload.len()).map_err(|_| CodecError::LimitsExceeded {
                kind: LimitKind::RlePayloadBytes,
                limit: i16::MAX as usize,
                actual: payload.len(),
            })?;
            writer.write_i16(len);
            writer.write_bytes(&payload);
        }
    }
    Ok(())
}

/// Reads one payload for `tag`, resolving interned strings through `table`.
pub fn decode_scalar(
    tag: ValueTag,
    reader: &mut ByteReader<'_>,
    table: &StringTable,
    limits: &Limits,
) -> CodecResult<ScalarValue> {
    Ok(match tag {
        ValueTag::Bool => ScalarValue::Bool(reader.read_bool()?),
        ValueTag::Byte => ScalarValue::Byte(reader.read_u8()?),
        ValueTag::Int16 => ScalarValue::Int16(reader.read_i16()?),
        ValueTag::Int32 => ScalarValue::Int32(reader.read_i32()?),
        ValueTag::Float32 => ScalarValue::Float32(reader.read_f32()?),
        ValueTag::InternedString => {
            let index = reader.read_i16()?;
            ScalarValue::InternedString(table.resolve(index)?.to_owned())
        }
        ValueTag::RawString => ScalarValue::RawString(wire::read_limited_string(reader, limits)?),
        ValueTag::RleString => {
            let count = reader.read_i16()?;
            let len = usize::try_from(count).map_err(|_| {
                DecodeError::CorruptData(CorruptReason::NegativeCount {
                    kind: CountKind::RlePayload,
                    value: i32::from(count),
                })
            })?;
            let payload = reader.read_bytes(len)?;
            ScalarValue::RleBlob(rle::decode(payload)?)
        }
    })
}

fn parse_integer(text: &str) -> Option<i64> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn parse_float(text: &str) -> Option<f32> {
    let body = text.strip_prefix(['+', '-']).unwrap_or(text);
    let mut digits = 0usize;
    let mut points = 0usize;
    for b in body.bytes() {
        match b {
            b'0'..=b'9' => digits += 1,
            b'.' => points += 1,
            _ => return None,
        }
    }
    if digits == 0 || points > 1 {
        return None;
    }
    text.parse().ok()
}
