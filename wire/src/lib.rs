//! Binary layout of cmap map files.
//!
//! This crate handles the pieces of the map format that do not depend on the
//! element tree: the file header and string table, attribute value tags,
//! run-length payloads, and limit enforcement. It knows nothing about
//! elements or how attribute values are inferred.
//!
//! # Design Principles
//!
//! - **Compatible layout** - Byte-for-byte compatible with existing map files.
//! - **Bounded decoding** - Counts and lengths are validated against limits before iteration.
//! - **No domain knowledge** - Element trees live in the codec crate.
//!
//! # Layout
//!
//! ```text
//! magic:            string   ("CELESTE MAP")
//! map_id:           string
//! string_table_len: i16      (i32 with TableLenWidth::Wide)
//! string_table:     string_table_len x string
//! root_element:     Element
//! ```

mod error;
mod header;
mod limits;
pub mod rle;
mod tag;

pub use error::{CorruptReason, CountKind, DecodeError, EncodeError, LimitKind, WireResult};
pub use header::{
    decode_header, encode_header, read_limited_string, MapHeader, TableLenWidth, MAGIC,
};
pub use limits::Limits;
pub use rle::{uses_rle, RLE_ELEMENT_NAMES};
pub use tag::ValueTag;
