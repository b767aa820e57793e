//! Per-call string interning.

use std::collections::HashMap;

use crate::error::{CodecError, CodecResult, LimitKind};

/// Maps strings to `i16` indices in first-seen order.
///
/// Built fresh for every encode and decode; there is no shared table.
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    strings: Vec<String>,
    indices: HashMap<String, i16>,
}

impl StringTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from decoded header strings.
    ///
    /// Duplicate entries keep their first index for lookups; every position
    /// still resolves.
    #[must_use]
    pub fn from_strings(strings: Vec<String>) -> Self {
        let mut indices = HashMap::with_capacity(strings.len());
        for (i, s) in strings.iter().enumerate() {
            if let Ok(index) = i16::try_from(i) {
                indices.entry(s.clone()).or_insert(index);
            }
        }
        Self { strings, indices }
    }

    /// Returns the index of `s`, appending it if unseen.
    pub fn intern(&mut self, s: &str) -> CodecResult<i16> {
        if let Some(&index) = self.indices.get(s) {
            return Ok(index);
        }
        // The table length itself is stored as an i16.
        let index = i16::try_from(self.strings.len())
            .ok()
            .filter(|&i| i < i16::MAX)
            .ok_or(CodecError::LimitsExceeded {
                kind: LimitKind::StringTableEntries,
                limit: i16::MAX as usize,
                actual: self.strings.len() + 1,
            })?;
        self.strings.push(s.to_owned());
        self.indices.insert(s.to_owned(), index);
        Ok(index)
    }

    /// Returns the index of an already interned string.
    pub fn index_of(&self, s: &str) -> CodecResult<i16> {
        self.indices
            .get(s)
            .copied()
            .ok_or(CodecError::StringIndexOutOfRange {
                index: -1,
                len: self.strings.len(),
            })
    }

    /// Resolves an index read from the wire.
    pub fn resolve(&self, index: i16) -> CodecResult<&str> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.strings.get(i))
            .map(String::as_str)
            .ok_or(CodecError::StringIndexOutOfRange {
                index,
                len: self.strings.len(),
            })
    }

    /// Number of interned strings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Strings in index order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.strings
    }
}
