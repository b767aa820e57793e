//! Options for map encoding and decoding.

use wire::{Limits, TableLenWidth};

/// Attributes the editor adds at runtime and never persists.
pub const DEFAULT_IGNORED_ATTRIBUTES: [&str; 1] = ["_eid"];

/// Options controlling [`encode_map`](crate::encode_map).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Width of the string table count in the header.
    pub table_len_width: TableLenWidth,
    /// Attribute keys that are dropped on encode.
    pub ignored_attributes: Vec<String>,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            table_len_width: TableLenWidth::Short,
            ignored_attributes: DEFAULT_IGNORED_ATTRIBUTES
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
        }
    }
}

impl EncodeOptions {
    /// Encodes every attribute, including editor-only ones.
    #[must_use]
    pub fn keep_all_attributes() -> Self {
        Self {
            ignored_attributes: Vec::new(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_table_len_width(mut self, width: TableLenWidth) -> Self {
        self.table_len_width = width;
        self
    }

    pub(crate) fn is_ignored(&self, key: &str) -> bool {
        self.ignored_attributes.iter().any(|k| k == key)
    }
}

/// Options controlling [`decode_map`](crate::decode_map).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    /// Width of the string table count in the header.
    pub table_len_width: TableLenWidth,
    /// Bounds on table size, string length and nesting depth.
    pub limits: Limits,
}

impl DecodeOptions {
    /// Creates options with small limits for tests.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            table_len_width: TableLenWidth::Short,
            limits: Limits::for_testing(),
        }
    }

    /// Creates options with no limits beyond the format's own widths.
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            table_len_width: TableLenWidth::Short,
            limits: Limits::unlimited(),
        }
    }

    #[must_use]
    pub fn with_table_len_width(mut self, width: TableLenWidth) -> Self {
        self.table_len_width = width;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.limits.max_depth = max_depth;
        self
    }
}
