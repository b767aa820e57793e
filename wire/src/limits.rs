//! Configurable limits for bounded decoding.

/// Wire-level limits for map decoding.
///
/// These limits are enforced during decoding to keep hostile or damaged input
/// from exhausting memory or the stack. The format itself caps most counts at
/// `i16::MAX`; these limits can only tighten that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of strings in the header string table.
    pub max_string_table_len: usize,

    /// Maximum nesting depth of the element tree (the root is depth 1).
    pub max_depth: usize,

    /// Maximum length of any single length-prefixed string in bytes.
    pub max_string_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_string_table_len: i16::MAX as usize,

            // Real maps nest Map > levels > level > entities > entity > node
            max_depth: 64,

            // Tile grids of large levels are stored as raw strings in `bg`-less maps
            max_string_bytes: 16 * 1024 * 1024,
        }
    }
}

impl Limits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_string_table_len: 256,
            max_depth: 16,
            max_string_bytes: 4096,
        }
    }

    /// Creates limits with no restrictions beyond the format's own widths.
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_string_table_len: usize::MAX,
            max_depth: usize::MAX,
            max_string_bytes: usize::MAX,
        }
    }
}
