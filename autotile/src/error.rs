//! Error types for rule loading and tile generation.

use std::fmt;

/// Result type for autotile operations.
pub type AutotileResult<T> = Result<T, AutotileError>;

/// Errors raised while loading rules or generating a tile grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutotileError {
    /// The grid holds a terrain id with no rules.
    UnknownTerrain { id: char, x: usize, y: usize },

    /// A terrain copies rules from an id that is not defined before it.
    MissingCopyTarget { terrain: char, target: char },

    /// The rule set is malformed.
    InvalidRuleSet {
        terrain: Option<char>,
        reason: RuleSetReason,
    },

    /// The rule document is not well-formed XML.
    Xml(String),

    /// `width * height` cells cannot be allocated.
    GridTooLarge { width: usize, height: usize },
}

/// Why a rule set was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSetReason {
    /// Two terrains share an id.
    DuplicateTerrain,
    /// A required attribute is absent or empty.
    MissingAttribute { name: &'static str },
    /// A mask does not describe exactly nine cells.
    BadMask { mask: String },
    /// A tile list entry is not an `x,y` pair of integers.
    BadTiles { tiles: String },
}

impl AutotileError {
    pub(crate) const fn invalid(terrain: Option<char>, reason: RuleSetReason) -> Self {
        Self::InvalidRuleSet { terrain, reason }
    }
}

impl fmt::Display for AutotileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTerrain { id, x, y } => {
                write!(f, "no rules for terrain {id:?} at ({x}, {y})")
            }
            Self::MissingCopyTarget { terrain, target } => {
                write!(
                    f,
                    "terrain {terrain:?} copies {target:?}, which is not defined before it"
                )
            }
            Self::InvalidRuleSet {
                terrain: Some(id),
                reason,
            } => write!(f, "invalid rules for terrain {id:?}: {reason}"),
            Self::InvalidRuleSet {
                terrain: None,
                reason,
            } => write!(f, "invalid rule set: {reason}"),
            Self::Xml(msg) => write!(f, "rule set XML error: {msg}"),
            Self::GridTooLarge { width, height } => {
                write!(f, "grid of {width}x{height} cells is too large")
            }
        }
    }
}

impl fmt::Display for RuleSetReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateTerrain => write!(f, "terrain defined twice"),
            Self::MissingAttribute { name } => write!(f, "missing attribute `{name}`"),
            Self::BadMask { mask } => write!(f, "mask {mask:?} must define 9 cells"),
            Self::BadTiles { tiles } => write!(f, "malformed tile list {tiles:?}"),
        }
    }
}

impl std::error::Error for AutotileError {}

impl From<quick_xml::Error> for AutotileError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for AutotileError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(err.to_string())
    }
}
