//! Tile selection.
//!
//! Generation runs in two passes. Classification picks a rule for every
//! occupied cell from the read-only character grid and is fully
//! deterministic. Texture choice then draws one candidate per cell from the
//! caller's RNG.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::{AutotileError, AutotileResult};
use crate::grid::{CharGrid, Tile, TileGrid};
use crate::rules::{is_empty_cell, RuleMatch, RuleSet, TerrainType};

const WINDOW: usize = 5;
const WINDOW_RADIUS: isize = 2;

/// Window cells two steps away orthogonally: up, left, right, down.
const PADDING_CELLS: [usize; 4] = [2, 10, 14, 22];

/// The rule each occupied cell resolved to, before textures are drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub width: usize,
    pub height: usize,
    /// Row-major; `None` for empty cells.
    pub cells: Vec<Option<(char, RuleMatch)>>,
}

/// Chooses tiles for character grids using a [`RuleSet`].
#[derive(Debug, Clone)]
pub struct Autotiler {
    rules: RuleSet,
}

impl Autotiler {
    #[must_use]
    pub const fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn from_xml(xml: &str) -> AutotileResult<Self> {
        RuleSet::from_xml(xml).map(Self::new)
    }

    #[must_use]
    pub const fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Generates a tile grid with an entropy-seeded RNG.
    pub fn generate(&self, width: usize, height: usize, text: &str) -> AutotileResult<TileGrid> {
        self.generate_with_rng(width, height, text, &mut SmallRng::from_entropy())
    }

    /// Generates a tile grid, drawing textures from `rng`.
    ///
    /// Fails with [`AutotileError::UnknownTerrain`] for the first cell, in
    /// row-major order, whose id has no rules, and with
    /// [`AutotileError::GridTooLarge`] when `width * height` overflows.
    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        width: usize,
        height: usize,
        text: &str,
        rng: &mut R,
    ) -> AutotileResult<TileGrid> {
        let classification = self.classify(&CharGrid::parse(width, height, text)?)?;
        Ok(self.choose_tiles(&classification, rng))
    }

    /// Picks a rule for every occupied cell of `grid`.
    pub fn classify(&self, grid: &CharGrid) -> AutotileResult<Classification> {
        let mut cells = Vec::with_capacity(grid.width() * grid.height());
        for (x, y, id) in grid.iter() {
            if is_empty_cell(id) {
                cells.push(None);
                continue;
            }
            let terrain = self
                .rules
                .get(id)
                .ok_or(AutotileError::UnknownTerrain { id, x, y })?;
            cells.push(Some((id, classify_cell(terrain, grid, x, y))));
        }

        tracing::debug!(
            width = grid.width(),
            height = grid.height(),
            occupied = cells.iter().filter(|c| c.is_some()).count(),
            "classified grid"
        );
        Ok(Classification {
            width: grid.width(),
            height: grid.height(),
            cells,
        })
    }

    /// Draws one texture per classified cell. Rules without textures leave
    /// the cell empty.
    pub fn choose_tiles<R: Rng + ?Sized>(
        &self,
        classification: &Classification,
        rng: &mut R,
    ) -> TileGrid {
        let cells = classification
            .cells
            .iter()
            .map(|cell| {
                let &(terrain, rule) = cell.as_ref()?;
                let tile = *self
                    .rules
                    .get(terrain)?
                    .rule(rule)?
                    .tiles
                    .choose(&mut *rng)?;
                Some(Tile {
                    terrain,
                    tile,
                    rule,
                })
            })
            .collect();
        TileGrid {
            width: classification.width,
            height: classification.height,
            cells,
        }
    }
}

/// Samples the clamped 5x5 window around `(x, y)` as connected flags.
fn sample_window(
    terrain: &TerrainType,
    grid: &CharGrid,
    x: usize,
    y: usize,
) -> [bool; WINDOW * WINDOW] {
    let mut window = [false; WINDOW * WINDOW];
    let offsets = -WINDOW_RADIUS..=WINDOW_RADIUS;
    for (row, dy) in offsets.clone().enumerate() {
        for (col, dx) in offsets.clone().enumerate() {
            window[row * WINDOW + col] = terrain.connects_to(grid.get_clamped(x, y, dx, dy));
        }
    }
    window
}

/// Index of inner 3x3 cell `k` within the 5x5 window.
const fn inner_index(k: usize) -> usize {
    (k / 3 + 1) * WINDOW + k % 3 + 1
}

fn classify_cell(terrain: &TerrainType, grid: &CharGrid, x: usize, y: usize) -> RuleMatch {
    let window = sample_window(terrain, grid, x, y);
    let inner: [bool; 9] = std::array::from_fn(|k| window[inner_index(k)]);

    if inner.contains(&false) {
        let matched = terrain
            .masked
            .iter()
            .rposition(|rule| rule.mask.matches(&inner));
        if let Some(index) = matched {
            return RuleMatch::Masked(index);
        }
    }

    if PADDING_CELLS.iter().any(|&i| !window[i]) {
        RuleMatch::Padded
    } else {
        RuleMatch::Center
    }
}
