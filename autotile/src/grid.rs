//! Character grids in and tile grids out.

use crate::error::{AutotileError, AutotileResult};
use crate::rules::{RuleMatch, TileRef};

/// Character written for cells outside the text.
pub const EMPTY_CELL: char = '0';

/// Most cells a `Vec<char>` can hold.
const MAX_CELLS: usize = isize::MAX as usize / std::mem::size_of::<char>();

/// A fixed-size grid of terrain ids, parsed from tile text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharGrid {
    width: usize,
    height: usize,
    cells: Vec<char>,
}

impl CharGrid {
    /// Parses `text` into a `width` x `height` grid.
    ///
    /// Rows end at `\n`, `\r`, `\r\n` or `\n\r`. Characters past `width` and
    /// rows past `height` are dropped; missing cells are [`EMPTY_CELL`].
    ///
    /// Fails with [`AutotileError::GridTooLarge`] when the cell count
    /// overflows.
    pub fn parse(width: usize, height: usize, text: &str) -> AutotileResult<Self> {
        let len = width
            .checked_mul(height)
            .filter(|&len| len <= MAX_CELLS)
            .ok_or(AutotileError::GridTooLarge { width, height })?;
        let mut cells = vec![EMPTY_CELL; len];
        let (mut x, mut y) = (0, 0);
        let mut chars = text.chars().peekable();
        while let Some(ch) = chars.next() {
            if y >= height {
                break;
            }
            match ch {
                '\n' | '\r' => {
                    let pair = if ch == '\n' { '\r' } else { '\n' };
                    chars.next_if_eq(&pair);
                    x = 0;
                    y += 1;
                }
                _ => {
                    if x < width {
                        cells[y * width + x] = ch;
                    }
                    x += 1;
                }
            }
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.cells[y * self.width + x])
    }

    /// Reads the cell at `(x + dx, y + dy)`, clamped to the grid edge.
    ///
    /// Returns [`EMPTY_CELL`] only for a zero-sized grid.
    #[must_use]
    pub fn get_clamped(&self, x: usize, y: usize, dx: isize, dy: isize) -> char {
        if self.cells.is_empty() {
            return EMPTY_CELL;
        }
        let cx = x.saturating_add_signed(dx).min(self.width - 1);
        let cy = y.saturating_add_signed(dy).min(self.height - 1);
        self.cells[cy * self.width + cx]
    }

    /// Iterates `(x, y, id)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, char)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &id)| (i % width, i / width, id))
    }
}

/// The tile chosen for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tile {
    pub terrain: char,
    pub tile: TileRef,
    pub rule: RuleMatch,
}

/// Output of tile generation: one optional tile per cell, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileGrid {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<Option<Tile>>,
}

impl TileGrid {
    #[must_use]
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
        }
    }

    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<&Tile> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells[y * self.width + x].as_ref()
    }

    /// Iterates the occupied cells as `(x, y, tile)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &Tile)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(i, tile)| tile.as_ref().map(|t| (i % width, i / width, t)))
    }

    /// Number of cells holding a tile.
    #[must_use]
    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}
