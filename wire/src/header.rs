//! Map file header: magic, package name and string table.

use bytestream::{ByteReader, ByteWriter};

use crate::error::{CorruptReason, CountKind, DecodeError, EncodeError, LimitKind, WireResult};
use crate::limits::Limits;

/// Magic string at the start of every map file.
pub const MAGIC: &str = "CELESTE MAP";

/// Width of the string table length field.
///
/// Readers of the format expect an `i16`. Some writers emitted a 4-byte count;
/// `Wide` reads and writes that variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TableLenWidth {
    #[default]
    Short,
    Wide,
}

/// Decoded map header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapHeader {
    /// Magic string as found in the file.
    pub magic: String,
    /// Map identifier (package name).
    pub package: String,
    /// Interned strings in index order.
    pub strings: Vec<String>,
}

impl MapHeader {
    /// Returns `true` if the magic string is the expected one.
    #[must_use]
    pub fn magic_matches(&self) -> bool {
        self.magic == MAGIC
    }
}

/// Decodes a map header from the front of `reader`.
///
/// A wrong magic string is not an error. It is logged and left for the caller
/// to inspect through [`MapHeader::magic_matches`].
pub fn decode_header(
    reader: &mut ByteReader<'_>,
    width: TableLenWidth,
    limits: &Limits,
) -> WireResult<MapHeader> {
    let magic = read_limited_string(reader, limits)?;
    if magic != MAGIC {
        tracing::warn!(found = %magic, expected = MAGIC, "map header magic mismatch");
    }
    let package = read_limited_string(reader, limits)?;

    let raw_len = match width {
        TableLenWidth::Short => i32::from(reader.read_i16()?),
        TableLenWidth::Wide => reader.read_i32()?,
    };
    let len = usize::try_from(raw_len).map_err(|_| {
        DecodeError::CorruptData(CorruptReason::NegativeCount {
            kind: CountKind::StringTable,
            value: raw_len,
        })
    })?;
    if len > limits.max_string_table_len {
        return Err(DecodeError::LimitsExceeded {
            kind: LimitKind::StringTableEntries,
            limit: limits.max_string_table_len,
            actual: len,
        });
    }

    // Each entry takes at least one byte, so a count larger than the input is truncation.
    let mut strings = Vec::with_capacity(len.min(reader.remaining()));
    for _ in 0..len {
        strings.push(read_limited_string(reader, limits)?);
    }

    Ok(MapHeader {
        magic,
        package,
        strings,
    })
}

/// Encodes a map header with the standard magic string.
pub fn encode_header(
    writer: &mut ByteWriter,
    package: &str,
    strings: &[String],
    width: TableLenWidth,
) -> Result<(), EncodeError> {
    let too_many = || EncodeError::LimitsExceeded {
        kind: LimitKind::StringTableEntries,
        limit: i16::MAX as usize,
        actual: strings.len(),
    };

    writer.write_string(MAGIC)?;
    writer.write_string(package)?;
    match width {
        TableLenWidth::Short => {
            writer.write_i16(i16::try_from(strings.len()).map_err(|_| too_many())?);
        }
        TableLenWidth::Wide => {
            // Indices into the table are still i16 on the wire.
            if strings.len() > i16::MAX as usize {
                return Err(too_many());
            }
            writer.write_i32(i32::try_from(strings.len()).map_err(|_| too_many())?);
        }
    }
    for s in strings {
        writer.write_string(s)?;
    }
    Ok(())
}

/// Reads a length-prefixed string, enforcing `max_string_bytes` before allocating.
pub fn read_limited_string(reader: &mut ByteReader<'_>, limits: &Limits) -> WireResult<String> {
    Ok(reader.read_string(limits.max_string_bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn header_roundtrip_short() {
        let table = strings(&["Map", "levels", "name"]);
        let mut writer = ByteWriter::new();
        encode_header(&mut writer, "Celeste/1-ForsakenCity", &table, TableLenWidth::Short)
            .unwrap();
        let bytes = writer.finish();

        let mut reader = ByteReader::new(&bytes);
        let header = decode_header(&mut reader, TableLenWidth::Short, &Limits::default()).unwrap();
        assert!(header.magic_matches());
        assert_eq!(header.package, "Celeste/1-ForsakenCity");
        assert_eq!(header.strings, table);
        assert!(reader.is_empty());
    }

    #[test]
    fn header_roundtrip_wide() {
        let table = strings(&["Map"]);
        let mut writer = ByteWriter::new();
        encode_header(&mut writer, "pkg", &table, TableLenWidth::Wide).unwrap();
        let bytes = writer.finish();

        // magic (1 + 11) + package (1 + 3) + count (4) + "Map" (1 + 3)
        assert_eq!(bytes.len(), 12 + 4 + 4 + 4);

        let mut reader = ByteReader::new(&bytes);
        let header = decode_header(&mut reader, TableLenWidth::Wide, &Limits::default()).unwrap();
        assert_eq!(header.strings, table);
    }

    #[test]
    fn short_count_layout() {
        let mut writer = ByteWriter::new();
        encode_header(&mut writer, "", &strings(&["a", "b"]), TableLenWidth::Short).unwrap();
        let bytes = writer.finish();
        // magic (12) + empty package (1), then the i16 count
        assert_eq!(&bytes[13..15], &[2, 0]);
    }

    #[test]
    fn magic_mismatch_is_not_fatal() {
        let mut writer = ByteWriter::new();
        writer.write_string("NOT A MAP").unwrap();
        writer.write_string("pkg").unwrap();
        writer.write_i16(0);
        let bytes = writer.finish();

        let mut reader = ByteReader::new(&bytes);
        let header = decode_header(&mut reader, TableLenWidth::Short, &Limits::default()).unwrap();
        assert!(!header.magic_matches());
        assert_eq!(header.magic, "NOT A MAP");
        assert_eq!(header.package, "pkg");
    }

    #[test]
    fn negative_table_len_is_corrupt() {
        let mut writer = ByteWriter::new();
        writer.write_string(MAGIC).unwrap();
        writer.write_string("pkg").unwrap();
        writer.write_i16(-1);
        let bytes = writer.finish();

        let mut reader = ByteReader::new(&bytes);
        let err = decode_header(&mut reader, TableLenWidth::Short, &Limits::default()).unwrap_err();
        assert_eq!(
            err,
            DecodeError::CorruptData(CorruptReason::NegativeCount {
                kind: CountKind::StringTable,
                value: -1
            })
        );
    }

    #[test]
    fn table_len_over_limit() {
        let mut writer = ByteWriter::new();
        writer.write_string(MAGIC).unwrap();
        writer.write_string("pkg").unwrap();
        writer.write_i16(1000);
        let bytes = writer.finish();

        let mut reader = ByteReader::new(&bytes);
        let err =
            decode_header(&mut reader, TableLenWidth::Short, &Limits::for_testing()).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::LimitsExceeded {
                kind: LimitKind::StringTableEntries,
                limit: 256,
                actual: 1000
            }
        ));
    }

    #[test]
    fn truncated_table_is_truncated() {
        let mut writer = ByteWriter::new();
        writer.write_string(MAGIC).unwrap();
        writer.write_string("pkg").unwrap();
        writer.write_i16(3);
        writer.write_string("only-one").unwrap();
        let bytes = writer.finish();

        let mut reader = ByteReader::new(&bytes);
        let err = decode_header(&mut reader, TableLenWidth::Short, &Limits::default()).unwrap_err();
        assert!(err.is_truncated());
    }

    #[test]
    fn long_string_over_limit() {
        let mut writer = ByteWriter::new();
        writer.write_string(&"x".repeat(5000)).unwrap();
        let bytes = writer.finish();

        let mut reader = ByteReader::new(&bytes);
        let err = read_limited_string(&mut reader, &Limits::for_testing()).unwrap_err();
        assert_eq!(
            err,
            DecodeError::LimitsExceeded {
                kind: LimitKind::StringBytes,
                limit: 4096,
                actual: 5000,
            }
        );
        // The payload is never consumed.
        assert_eq!(reader.position(), 2);
    }

    #[test]
    fn limited_string_reads_within_limit() {
        let mut writer = ByteWriter::new();
        writer.write_string("Map").unwrap();
        writer.write_string("").unwrap();
        let bytes = writer.finish();

        let mut reader = ByteReader::new(&bytes);
        let limits = Limits::for_testing();
        assert_eq!(read_limited_string(&mut reader, &limits).unwrap(), "Map");
        assert_eq!(read_limited_string(&mut reader, &limits).unwrap(), "");
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn encode_rejects_oversized_table() {
        let table = vec![String::new(); i16::MAX as usize + 1];
        let mut writer = ByteWriter::new();
        let err = encode_header(&mut writer, "pkg", &table, TableLenWidth::Wide).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::LimitsExceeded {
                kind: LimitKind::StringTableEntries,
                ..
            }
        ));
    }
}
