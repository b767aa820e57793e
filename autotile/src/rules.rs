//! Terrain rules: connectivity masks and candidate tiles.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{AutotileError, AutotileResult, RuleSetReason};

/// Wildcard entry in an ignore list: ignore every other terrain.
pub const IGNORE_ALL: char = '*';

/// Returns `true` for cells that hold no terrain.
#[must_use]
pub const fn is_empty_cell(id: char) -> bool {
    matches!(id, '0' | '\0')
}

/// One cell of a 3x3 connectivity mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MaskCell {
    Disconnected,
    Connected,
    DontCare,
}

impl MaskCell {
    #[must_use]
    pub const fn matches(self, connected: bool) -> bool {
        match self {
            Self::Disconnected => !connected,
            Self::Connected => connected,
            Self::DontCare => true,
        }
    }
}

/// A 3x3 neighbourhood pattern in row-major order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mask(pub [MaskCell; 9]);

impl Mask {
    /// Parses a mask such as `"x0x-111-x1x"`.
    ///
    /// `0`, `1` and `x`/`X`/`*` define cells; any other character is a
    /// separator. Returns `None` unless exactly nine cells are defined.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let mut cells = [MaskCell::DontCare; 9];
        let mut len = 0;
        for ch in text.chars() {
            let cell = match ch {
                '0' => MaskCell::Disconnected,
                '1' => MaskCell::Connected,
                'x' | 'X' | '*' => MaskCell::DontCare,
                _ => continue,
            };
            *cells.get_mut(len)? = cell;
            len += 1;
        }
        (len == 9).then_some(Self(cells))
    }

    /// Returns `true` if every cell agrees with the sampled neighbourhood.
    #[must_use]
    pub fn matches(&self, neighbourhood: &[bool; 9]) -> bool {
        self.0
            .iter()
            .zip(neighbourhood)
            .all(|(cell, &connected)| cell.matches(connected))
    }
}

/// Tile coordinates within a terrain's tileset sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileRef {
    pub x: u16,
    pub y: u16,
}

impl TileRef {
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

/// Candidate tiles for one classification, plus overlay sprites.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rule {
    pub tiles: Vec<TileRef>,
    pub sprites: Vec<String>,
}

impl Rule {
    #[must_use]
    pub fn new(tiles: impl IntoIterator<Item = TileRef>) -> Self {
        Self {
            tiles: tiles.into_iter().collect(),
            sprites: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_sprites(mut self, sprites: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.sprites.extend(sprites.into_iter().map(Into::into));
        self
    }

    pub(crate) fn extend(&mut self, other: Self) {
        self.tiles.extend(other.tiles);
        self.sprites.extend(other.sprites);
    }
}

/// Which of a terrain's rules classified a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RuleMatch {
    /// Index into [`TerrainType::masked`].
    Masked(usize),
    Padded,
    Center,
}

/// A rule that applies when the 3x3 neighbourhood matches its mask.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaskedRule {
    pub mask: Mask,
    pub rule: Rule,
}

/// All rules for one terrain id.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TerrainType {
    pub id: char,
    /// Tileset sheet the tile coordinates refer to.
    pub path: String,
    pub ignores: BTreeSet<char>,
    /// Checked in order; the last match wins.
    pub masked: Vec<MaskedRule>,
    pub center: Rule,
    pub padded: Rule,
}

impl TerrainType {
    #[must_use]
    pub fn new(id: char, path: impl Into<String>) -> Self {
        Self {
            id,
            path: path.into(),
            ignores: BTreeSet::new(),
            masked: Vec::new(),
            center: Rule::default(),
            padded: Rule::default(),
        }
    }

    #[must_use]
    pub fn with_ignores(mut self, ignores: impl IntoIterator<Item = char>) -> Self {
        self.ignores.extend(ignores);
        self
    }

    #[must_use]
    pub fn with_center(mut self, rule: Rule) -> Self {
        self.center = rule;
        self
    }

    #[must_use]
    pub fn with_padded(mut self, rule: Rule) -> Self {
        self.padded = rule;
        self
    }

    #[must_use]
    pub fn with_rule(mut self, mask: Mask, rule: Rule) -> Self {
        self.push_rule(mask, rule);
        self
    }

    pub fn push_rule(&mut self, mask: Mask, rule: Rule) {
        self.masked.push(MaskedRule { mask, rule });
    }

    /// Resolves a classification to its rule.
    #[must_use]
    pub fn rule(&self, matched: RuleMatch) -> Option<&Rule> {
        match matched {
            RuleMatch::Masked(index) => self.masked.get(index).map(|m| &m.rule),
            RuleMatch::Padded => Some(&self.padded),
            RuleMatch::Center => Some(&self.center),
        }
    }

    /// Returns `true` if a neighbour holding `other` counts as connected.
    #[must_use]
    pub fn connects_to(&self, other: char) -> bool {
        if is_empty_cell(other) {
            return false;
        }
        if other == self.id {
            return true;
        }
        !(self.ignores.contains(&IGNORE_ALL) || self.ignores.contains(&other))
    }
}

/// Rules for every terrain id, keyed by id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleSet {
    terrains: BTreeMap<char, TerrainType>,
}

impl RuleSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a terrain. Ids must be unique.
    pub fn insert(&mut self, terrain: TerrainType) -> AutotileResult<()> {
        let id = terrain.id;
        if self.terrains.contains_key(&id) {
            return Err(AutotileError::invalid(
                Some(id),
                RuleSetReason::DuplicateTerrain,
            ));
        }
        self.terrains.insert(id, terrain);
        Ok(())
    }

    pub fn with_terrain(mut self, terrain: TerrainType) -> AutotileResult<Self> {
        self.insert(terrain)?;
        Ok(self)
    }

    #[must_use]
    pub fn get(&self, id: char) -> Option<&TerrainType> {
        self.terrains.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: char) -> bool {
        self.terrains.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TerrainType> {
        self.terrains.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.terrains.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terrains.is_empty()
    }
}
