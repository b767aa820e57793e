//! Whole-map encoding and decoding.

use std::borrow::Cow;

use bytestream::{ByteReader, ByteWriter};
use wire::{CorruptReason, CountKind, DecodeError, Limits, MapHeader, ValueTag};

use crate::element::{Element, INNER_TEXT};
use crate::error::{CodecError, CodecResult, LimitKind};
use crate::options::{DecodeOptions, EncodeOptions};
use crate::scalar::{decode_scalar, encode_scalar, ScalarValue};
use crate::string_table::StringTable;

/// A decoded map file.
#[derive(Debug, Clone, PartialEq)]
pub struct MapFile {
    /// Map identifier from the header.
    pub package: String,
    /// Root element (its `package` is set as well).
    pub root: Element,
    /// `false` if the header did not start with the map magic.
    pub magic_matched: bool,
    /// Bytes left over after the root element.
    pub trailing_bytes: usize,
}

/// Encodes `root` as a complete map file.
///
/// # Errors
///
/// Fails if a count does not fit its wire width or a run-length payload
/// holds non-ASCII text.
pub fn encode_map(root: &Element, map_id: &str, options: &EncodeOptions) -> CodecResult<Vec<u8>> {
    let mut table = StringTable::new();
    collect_strings(root, options, &mut table)?;
    table.intern(INNER_TEXT)?;

    let mut writer = ByteWriter::with_capacity(4096);
    wire::encode_header(&mut writer, map_id, table.as_slice(), options.table_len_width)?;
    write_element(&mut writer, root, &table, options)?;
    let bytes = writer.finish();

    tracing::debug!(
        map_id,
        strings = table.len(),
        elements = root.count_elements(),
        bytes = bytes.len(),
        "encoded map"
    );
    Ok(bytes)
}

/// Decodes a complete map file.
///
/// A wrong magic string is logged and reported through
/// [`MapFile::magic_matched`]; bytes after the root element are reported
/// through [`MapFile::trailing_bytes`].
pub fn decode_map(bytes: &[u8], options: &DecodeOptions) -> CodecResult<MapFile> {
    let mut reader = ByteReader::new(bytes);
    let header = wire::decode_header(&mut reader, options.table_len_width, &options.limits)?;
    let magic_matched = header.magic_matches();
    let table = StringTable::from_strings(header.strings);

    let mut root = read_element(&mut reader, &table, &options.limits, 1)?;
    root.package = Some(header.package.clone());

    let trailing_bytes = reader.remaining();
    if trailing_bytes > 0 {
        tracing::debug!(trailing_bytes, "ignoring data after root element");
    }
    tracing::debug!(
        package = %header.package,
        strings = table.len(),
        elements = root.count_elements(),
        "decoded map"
    );

    Ok(MapFile {
        package: header.package,
        root,
        magic_matched,
        trailing_bytes,
    })
}

/// Decodes only the header and string table.
pub fn read_header(bytes: &[u8], options: &DecodeOptions) -> CodecResult<MapHeader> {
    let mut reader = ByteReader::new(bytes);
    Ok(wire::decode_header(
        &mut reader,
        options.table_len_width,
        &options.limits,
    )?)
}

/// The value written for the synthetic inner text attribute.
///
/// Leaf text is stored run-length encoded for `solids`/`bg` and as a raw
/// string elsewhere, whatever string variant the tree holds. Empty leaf text
/// is not written at all.
fn inner_text_value<'a>(
    element: &'a Element,
    options: &EncodeOptions,
) -> Option<Cow<'a, ScalarValue>> {
    if options.is_ignored(INNER_TEXT) {
        return None;
    }
    let value = element.attributes.get(INNER_TEXT)?;
    match value.as_str() {
        Some("") if element.children.is_empty() => None,
        Some(text) if element.children.is_empty() => {
            let stored = if wire::uses_rle(&element.name) {
                ScalarValue::RleBlob(text.to_owned())
            } else {
                ScalarValue::RawString(text.to_owned())
            };
            if &stored == value {
                Some(Cow::Borrowed(value))
            } else {
                Some(Cow::Owned(stored))
            }
        }
        _ => Some(Cow::Borrowed(value)),
    }
}

fn plain_attributes<'a>(
    element: &'a Element,
    options: &'a EncodeOptions,
) -> impl Iterator<Item = (&'a String, &'a ScalarValue)> + 'a {
    element
        .attributes
        .iter()
        .filter(move |(key, _)| key.as_str() != INNER_TEXT && !options.is_ignored(key))
}

fn collect_strings(
    element: &Element,
    options: &EncodeOptions,
    table: &mut StringTable,
) -> CodecResult<()> {
    table.intern(&element.name)?;
    for (key, value) in plain_attributes(element, options) {
        table.intern(key)?;
        if let ScalarValue::InternedString(s) = value {
            table.intern(s)?;
        }
    }
    if let Some(value) = inner_text_value(element, options) {
        if let ScalarValue::InternedString(s) = value.as_ref() {
            table.intern(s)?;
        }
    }
    for child in &element.children {
        collect_strings(child, options, table)?;
    }
    Ok(())
}

fn write_element(
    writer: &mut ByteWriter,
    element: &Element,
    table: &StringTable,
    options: &EncodeOptions,
) -> CodecResult<()> {
    let inner = inner_text_value(element, options);
    let attr_count = plain_attributes(element, options).count() + usize::from(inner.is_some());
    let attr_count = u8::try_from(attr_count).map_err(|_| CodecError::LimitsExceeded {
        kind: LimitKind::AttributesPerElement,
        limit: u8::MAX as usize,
        actual: attr_count,
    })?;
    let child_count =
        i16::try_from(element.children.len()).map_err(|_| CodecError::LimitsExceeded {
            kind: LimitKind::ChildrenPerElement,
            limit: i16::MAX as usize,
            actual: element.children.len(),
        })?;

    writer.write_i16(table.index_of(&element.name)?);
    writer.write_u8(attr_count);
    for (key, value) in plain_attributes(element, options) {
        write_attribute(writer, key, value, table)?;
    }
    if let Some(value) = inner {
        write_attribute(writer, INNER_TEXT, &value, table)?;
    }

    writer.write_i16(child_count);
    for child in &element.children {
        write_element(writer, child, table, options)?;
    }
    Ok(())
}

fn write_attribute(
    writer: &mut ByteWriter,
    key: &str,
    value: &ScalarValue,
    table: &StringTable,
) -> CodecResult<()> {
    writer.write_i16(table.index_of(key)?);
    writer.write_u8(value.tag().raw());
    encode_scalar(value, writer, table)
}

fn read_element(
    reader: &mut ByteReader<'_>,
    table: &StringTable,
    limits: &Limits,
    depth: usize,
) -> CodecResult<Element> {
    if depth > limits.max_depth {
        return Err(CodecError::LimitsExceeded {
            kind: LimitKind::ElementDepth,
            limit: limits.max_depth,
            actual: depth,
        });
    }

    let mut element = Element::new(table.resolve(reader.read_i16()?)?);

    let attr_count = reader.read_u8()?;
    for _ in 0..attr_count {
        let key = table.resolve(reader.read_i16()?)?;
        let tag = ValueTag::parse(reader.read_u8()?)?;
        let value = decode_scalar(tag, reader, table, limits)?;
        element.attributes.insert(key.to_owned(), value);
    }

    let raw_count = reader.read_i16()?;
    let child_count = usize::try_from(raw_count).map_err(|_| {
        DecodeError::CorruptData(CorruptReason::NegativeCount {
            kind: CountKind::Children,
            value: i32::from(raw_count),
        })
    })?;
    // Every child takes at least five bytes.
    element.children = Vec::with_capacity(child_count.min(reader.remaining() / 5));
    for _ in 0..child_count {
        element
            .children
            .push(read_element(reader, table, limits, depth + 1)?);
    }
    Ok(element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wire::{TableLenWidth, MAGIC};

    fn sample_map() -> Element {
        Element::new("Map")
            .with_child(
                Element::new("levels").with_child(
                    Element::new("level")
                        .with_text_attr("name", "lvl_1")
                        .with_text_attr("x", "0")
                        .with_text_attr("y", "-184")
                        .with_child(Element::new("solids").with_text("0011\n0011"))
                        .with_child(Element::new("bg").with_text(""))
                        .with_child(
                            Element::new("entities").with_child(
                                Element::new("player")
                                    .with_text_attr("id", "1")
                                    .with_text_attr("_eid", "99"),
                            ),
                        ),
                ),
            )
            .with_child(Element::new("Style"))
    }

    #[test]
    fn encode_decode_roundtrip() {
        let map = sample_map();
        let bytes = encode_map(&map, "lvl", &EncodeOptions::default()).unwrap();
        let decoded = decode_map(&bytes, &DecodeOptions::default()).unwrap();

        assert!(decoded.magic_matched);
        assert_eq!(decoded.package, "lvl");
        assert_eq!(decoded.trailing_bytes, 0);
        assert_eq!(decoded.root.package.as_deref(), Some("lvl"));

        let player = &decoded.root.children[0].children[0].children[2].children[0];
        assert_eq!(player.name, "player");
        assert!(!player.has_attr("_eid"));
        assert_eq!(player.attr_value("id"), Some(&ScalarValue::Byte(1)));
    }

    #[test]
    fn encode_is_deterministic() {
        let map = sample_map();
        let a = encode_map(&map, "lvl", &EncodeOptions::default()).unwrap();
        let b = encode_map(&map, "lvl", &EncodeOptions::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn string_table_order_is_first_seen_with_inner_text_last() {
        let map = Element::new("Map")
            .with_text_attr("b", "word")
            .with_child(Element::new("solids").with_text("1"));
        let bytes = encode_map(&map, "", &EncodeOptions::default()).unwrap();
        let header = read_header(&bytes, &DecodeOptions::default()).unwrap();
        assert_eq!(header.strings, vec!["Map", "b", "word", "solids", "innerText"]);
    }

    #[test]
    fn inner_text_is_interned_even_without_text() {
        let bytes = encode_map(&Element::new("Map"), "", &EncodeOptions::default()).unwrap();
        let header = read_header(&bytes, &DecodeOptions::default()).unwrap();
        assert_eq!(header.strings, vec!["Map", "innerText"]);
    }

    #[test]
    fn empty_leaf_text_is_not_written() {
        let decal =
            Element::new("decal").with_attr(INNER_TEXT, ScalarValue::RawString(String::new()));
        let bytes = encode_map(&decal, "", &EncodeOptions::default()).unwrap();
        // name index, zero attributes, zero children
        assert_eq!(bytes[bytes.len() - 5..], [0, 0, 0, 0, 0]);

        let decoded = decode_map(&bytes, &DecodeOptions::default()).unwrap();
        assert!(decoded.root.attributes.is_empty());
        assert_eq!(decoded.root.inner_text(), None);

        // Empty text on a parent is an ordinary attribute.
        let parent = decal.with_child(Element::new("child"));
        let bytes = encode_map(&parent, "", &EncodeOptions::default()).unwrap();
        let decoded = decode_map(&bytes, &DecodeOptions::default()).unwrap();
        assert_eq!(
            decoded.root.attr_value(INNER_TEXT),
            Some(&ScalarValue::RawString(String::new()))
        );
    }

    #[test]
    fn golden_bytes_single_leaf() {
        let map = Element::new("solids").with_text("000");
        let bytes = encode_map(&map, "m", &EncodeOptions::default()).unwrap();

        let mut expected = vec![11u8];
        expected.extend_from_slice(MAGIC.as_bytes());
        expected.extend_from_slice(&[1, b'm']);
        expected.extend_from_slice(&[2, 0]);
        expected.push(6);
        expected.extend_from_slice(b"solids");
        expected.push(9);
        expected.extend_from_slice(b"innerText");
        // name, one attribute: key 1, tag 7, two payload bytes, then zero children
        expected.extend_from_slice(&[0, 0, 1, 1, 0, 7, 2, 0, 3, b'0', 0, 0]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn leaf_text_storage_follows_element_name() {
        let map = Element::new("Map")
            .with_child(
                Element::new("solids").with_attr(INNER_TEXT, ScalarValue::RawString("11".into())),
            )
            .with_child(
                Element::new("fgtiles").with_attr(INNER_TEXT, ScalarValue::RleBlob("22".into())),
            );
        let bytes = encode_map(&map, "", &EncodeOptions::default()).unwrap();
        let root = decode_map(&bytes, &DecodeOptions::default()).unwrap().root;
        assert_eq!(
            root.children[0].attr_value(INNER_TEXT),
            Some(&ScalarValue::RleBlob("11".into()))
        );
        assert_eq!(
            root.children[1].attr_value(INNER_TEXT),
            Some(&ScalarValue::RawString("22".into()))
        );
    }

    #[test]
    fn wide_table_width_roundtrip() {
        let map = sample_map();
        let options = EncodeOptions::default().with_table_len_width(TableLenWidth::Wide);
        let bytes = encode_map(&map, "lvl", &options).unwrap();

        let decoded = decode_map(
            &bytes,
            &DecodeOptions::default().with_table_len_width(TableLenWidth::Wide),
        )
        .unwrap();
        assert_eq!(decoded.root.children.len(), 2);

        let short = encode_map(&map, "lvl", &EncodeOptions::default()).unwrap();
        assert_eq!(bytes.len(), short.len() + 2);
    }

    #[test]
    fn magic_mismatch_still_decodes() {
        let mut bytes = encode_map(&sample_map(), "lvl", &EncodeOptions::default()).unwrap();
        bytes[1] = b'K';
        let decoded = decode_map(&bytes, &DecodeOptions::default()).unwrap();
        assert!(!decoded.magic_matched);
        assert_eq!(decoded.root.name, "Map");
    }

    #[test]
    fn trailing_bytes_are_reported() {
        let mut bytes = encode_map(&sample_map(), "lvl", &EncodeOptions::default()).unwrap();
        bytes.extend_from_slice(&[0xAA, 0xBB, 0xCC]);
        let decoded = decode_map(&bytes, &DecodeOptions::default()).unwrap();
        assert_eq!(decoded.trailing_bytes, 3);
    }

    #[test]
    fn decode_rejects_truncated_prefixes() {
        let bytes = encode_map(&sample_map(), "lvl", &EncodeOptions::default()).unwrap();
        for len in 0..bytes.len() {
            let err = decode_map(&bytes[..len], &DecodeOptions::default()).unwrap_err();
            assert!(err.is_truncated(), "prefix {len}: {err}");
        }
    }

    #[test]
    fn decode_rejects_deep_nesting() {
        let mut el = Element::new("n");
        for _ in 0..10 {
            el = Element::new("n").with_child(el);
        }
        let bytes = encode_map(&el, "", &EncodeOptions::default()).unwrap();
        let err = decode_map(&bytes, &DecodeOptions::default().with_max_depth(5)).unwrap_err();
        assert_eq!(
            err,
            CodecError::LimitsExceeded {
                kind: LimitKind::ElementDepth,
                limit: 5,
                actual: 6
            }
        );
        assert!(decode_map(&bytes, &DecodeOptions::default()).is_ok());
    }

    #[test]
    fn decode_rejects_unknown_tag() {
        let map = Element::new("e").with_attr("k", true);
        let mut bytes = encode_map(&map, "", &EncodeOptions::default()).unwrap();
        // header then: name (2), attr count (1), key (2), tag
        let header_len = bytes.len() - 2 - 1 - 2 - 1 - 1 - 2;
        assert_eq!(bytes[header_len + 5], ValueTag::Bool.raw());
        bytes[header_len + 5] = 42;
        let err = decode_map(&bytes, &DecodeOptions::default()).unwrap_err();
        assert_eq!(
            err,
            CodecError::Decode(DecodeError::CorruptData(CorruptReason::UnknownValueTag {
                tag: 42
            }))
        );
    }

    #[test]
    fn decode_rejects_bad_name_index() {
        let map = Element::new("e");
        let mut bytes = encode_map(&map, "", &EncodeOptions::default()).unwrap();
        let name_at = bytes.len() - 5;
        bytes[name_at] = 9;
        let err = decode_map(&bytes, &DecodeOptions::default()).unwrap_err();
        assert_eq!(err, CodecError::StringIndexOutOfRange { index: 9, len: 2 });
    }

    #[test]
    fn decode_rejects_negative_child_count() {
        let map = Element::new("e");
        let mut bytes = encode_map(&map, "", &EncodeOptions::default()).unwrap();
        let n = bytes.len();
        bytes[n - 2] = 0xFF;
        bytes[n - 1] = 0xFF;
        let err = decode_map(&bytes, &DecodeOptions::default()).unwrap_err();
        assert!(err.is_corrupt());
    }

    #[test]
    fn encode_rejects_too_many_attributes() {
        let mut el = Element::new("e");
        for i in 0..256 {
            el = el.with_attr(format!("a{i}"), true);
        }
        let err = encode_map(&el, "", &EncodeOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            CodecError::LimitsExceeded {
                kind: LimitKind::AttributesPerElement,
                ..
            }
        ));
    }

    #[test]
    fn encode_rejects_non_ascii_tiles() {
        let el = Element::new("solids").with_text("1\u{e9}");
        let err = encode_map(&el, "", &EncodeOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Encode(wire::EncodeError::NonAsciiRle { .. })
        ));
    }

    #[test]
    fn keep_all_attributes_keeps_eid() {
        let el = Element::new("e").with_text_attr("_eid", "4");
        let bytes = encode_map(&el, "", &EncodeOptions::keep_all_attributes()).unwrap();
        let root = decode_map(&bytes, &DecodeOptions::default()).unwrap().root;
        assert_eq!(root.attr_int("_eid", 0), 4);
    }
}
