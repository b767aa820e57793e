//! Element tree encoding/decoding for cmap map files.
//!
//! This is the main codec crate that ties together bytestream and wire to turn
//! a map tree into the binary map format and back.
//!
//! # Features
//!
//! - String-interned binary encoding of element trees
//! - Narrowest-type inference for attribute text
//! - Run-length coded tile grids for `solids` and `bg`
//! - Header-only reads for quick inspection
//! - XML map exports as an encode source
//!
//! # Design Principles
//!
//! - **Lossless** - `decode(encode(tree))` reproduces the tree.
//! - **Bounded** - Decoding is limited by [`DecodeOptions`].
//! - **Deterministic** - Same inputs produce same outputs.
//!
//! # Example
//!
//! ```
//! use codec::{decode_map, encode_map, DecodeOptions, Element, EncodeOptions, ScalarValue};
//!
//! let level = Element::new("level")
//!     .with_text_attr("x", "0")
//!     .with_child(Element::new("solids").with_text("111\n111"));
//!
//! let bytes = encode_map(&level, "my-map", &EncodeOptions::default()).unwrap();
//! let map = decode_map(&bytes, &DecodeOptions::default()).unwrap();
//!
//! assert_eq!(map.root.attr_value("x"), Some(&ScalarValue::Byte(0)));
//! assert_eq!(map.root.child("solids").and_then(|s| s.inner_text()), Some("111\n111"));
//! ```

mod element;
mod error;
mod map;
mod options;
mod scalar;
mod string_table;
mod xml;

pub use element::{Element, INNER_TEXT};
pub use error::{CodecError, CodecResult, LimitKind};
pub use map::{decode_map, encode_map, read_header, MapFile};
pub use options::{DecodeOptions, EncodeOptions, DEFAULT_IGNORED_ATTRIBUTES};
pub use scalar::{decode_scalar, encode_scalar, ScalarValue};
pub use string_table::StringTable;
pub use xml::element_from_xml;
pub use wire::{Limits as WireLimits, MapHeader, TableLenWidth};
