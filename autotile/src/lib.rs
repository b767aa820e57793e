//! Rule-based autotiling for cmap tile grids.
//!
//! A level's `solids` or `bg` text is a grid of terrain ids, one character
//! per cell, with `0` for empty space. The autotiler looks at each occupied
//! cell's neighbourhood, picks the matching rule of that cell's terrain and
//! draws one of the rule's tiles.
//!
//! # Example
//!
//! ```
//! use autotile::{Autotiler, Rule, RuleMatch, RuleSet, TerrainType, TileRef};
//!
//! let rules = RuleSet::new()
//!     .with_terrain(
//!         TerrainType::new('1', "dirt")
//!             .with_center(Rule::new([TileRef::new(0, 0)]))
//!             .with_padded(Rule::new([TileRef::new(1, 0)])),
//!     )
//!     .unwrap();
//!
//! let grid = Autotiler::new(rules).generate(2, 2, "11\n11").unwrap();
//! assert_eq!(grid.occupied(), 4);
//! assert_eq!(grid.get(0, 0).map(|t| t.rule), Some(RuleMatch::Center));
//! ```

mod autotiler;
mod error;
mod grid;
mod loader;
mod rules;

pub use autotiler::{Autotiler, Classification};
pub use error::{AutotileError, AutotileResult, RuleSetReason};
pub use grid::{CharGrid, Tile, TileGrid, EMPTY_CELL};
pub use rules::{
    is_empty_cell, Mask, MaskCell, MaskedRule, Rule, RuleMatch, RuleSet, TerrainType, TileRef,
    IGNORE_ALL,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        let _ = RuleSet::new();
        let _ = TerrainType::new('1', "dirt");
        assert!(CharGrid::parse(0, 0, "").is_ok());
        let _ = TileGrid::empty(0, 0);
        let _: AutotileResult<()> = Ok(());
    }

    #[test]
    fn empty_grid_generates_nothing() {
        let grid = Autotiler::new(RuleSet::new()).generate(0, 0, "").unwrap();
        assert!(grid.cells.is_empty());
    }
}
