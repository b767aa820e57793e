//! Bounded byte reader and writer for the cmap map format.
//!
//! This crate provides [`ByteWriter`] and [`ByteReader`] for the little-endian
//! primitives and 7-bit length-prefixed strings that map files are built from.
//! It is designed for bounded, panic-free operation with explicit error handling.
//!
//! # Design Principles
//!
//! - **No unsafe code**
//! - **Bounded operations** - All reads are bounds-checked.
//! - **No domain knowledge** - This crate knows nothing about elements, tags, or tiles.
//! - **Explicit errors** - All failures return structured errors, never panic.
//!
//! # Example
//!
//! ```
//! use bytestream::{ByteReader, ByteWriter};
//!
//! let mut writer = ByteWriter::new();
//! writer.write_string("CELESTE MAP").unwrap();
//! writer.write_i16(42);
//!
//! let bytes = writer.finish();
//!
//! let mut reader = ByteReader::new(&bytes);
//! assert_eq!(reader.read_string(64).unwrap(), "CELESTE MAP");
//! assert_eq!(reader.read_i16().unwrap(), 42);
//! ```

mod error;
mod reader;
mod writer;

pub use error::{ByteError, ByteResult};
pub use reader::ByteReader;
pub use writer::ByteWriter;
