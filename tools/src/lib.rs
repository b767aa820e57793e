//! Inspection, conversion and autotiling tools for cmap map files.
//!
//! This crate backs the `cmap-tools` binary:
//!
//! - Summarize map files (header, string table, tree size)
//! - Convert maps to JSON and back, and encode XML map exports
//! - Run the autotiler over a level's tile layer
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Human-readable output** - Make it easy to see what a map file holds.

use std::fmt::Write as _;

use anyhow::{anyhow, bail, Context, Result};
use autotile::{Autotiler, RuleMatch, TileGrid};
use codec::{
    decode_map, element_from_xml, encode_map, read_header, DecodeOptions, Element, EncodeOptions,
    INNER_TEXT,
};

/// Pixels per tile along each axis of a level.
pub const TILE_SIZE: i32 = 8;

/// Largest tile grid `autotile_level` will build.
pub const MAX_LEVEL_TILES: usize = 1 << 24;

/// Longest inner text shown in full by [`format_tree_pretty`].
const PRETTY_TEXT_LIMIT: usize = 32;

/// Summary of one map file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectReport {
    pub byte_len: usize,
    pub package: String,
    pub magic_matched: bool,
    pub string_count: usize,
    pub element_count: usize,
    pub level_count: usize,
    pub trailing_bytes: usize,
}

/// Decodes `bytes` and summarizes the result.
pub fn inspect_map(bytes: &[u8], options: &DecodeOptions) -> Result<InspectReport> {
    let header = read_header(bytes, options).context("read header")?;
    let map = decode_map(bytes, options).context("decode map")?;
    let level_count = map
        .root
        .child("levels")
        .map_or(0, |levels| levels.children_named("level").count());
    Ok(InspectReport {
        byte_len: bytes.len(),
        package: map.package,
        magic_matched: map.magic_matched,
        string_count: header.strings.len(),
        element_count: map.root.count_elements(),
        level_count,
        trailing_bytes: map.trailing_bytes,
    })
}

/// Decodes `bytes` into the JSON form accepted by [`encode_map_json`].
pub fn decode_map_json(bytes: &[u8], options: &DecodeOptions) -> Result<serde_json::Value> {
    let map = decode_map(bytes, options).context("decode map")?;
    serde_json::to_value(&map.root).context("serialize map tree")
}

/// Encodes a JSON map tree. `package` overrides the one stored on the root.
pub fn encode_map_json(
    json: &str,
    package: Option<&str>,
    options: &EncodeOptions,
) -> Result<Vec<u8>> {
    let root: Element = serde_json::from_str(json).context("parse map json")?;
    let package = package
        .map(str::to_owned)
        .or_else(|| root.package.clone())
        .unwrap_or_default();
    encode_map(&root, &package, options).context("encode map")
}

/// Encodes an XML map export under `package`.
pub fn encode_map_xml(xml: &str, package: &str, options: &EncodeOptions) -> Result<Vec<u8>> {
    let root = element_from_xml(xml).context("parse map xml")?;
    encode_map(&root, package, options).context("encode map")
}

/// Renders a tree one element per line, attributes inline.
pub fn format_tree_pretty(root: &Element) -> String {
    let mut out = String::new();
    write_pretty(&mut out, root, 0);
    out
}

fn write_pretty(out: &mut String, el: &Element, depth: usize) {
    let _ = write!(out, "{:indent$}{}", "", el.name, indent = depth * 2);
    for (key, value) in el.attributes.iter().filter(|(k, _)| k.as_str() != INNER_TEXT) {
        let _ = write!(out, " {key}={value}");
    }
    if let Some(text) = el.inner_text() {
        let lines = text.lines().count();
        if text.len() > PRETTY_TEXT_LIMIT || lines > 1 {
            let _ = write!(out, " [{} chars, {lines} lines]", text.len());
        } else {
            let _ = write!(out, " {text:?}");
        }
    }
    out.push('\n');
    for child in &el.children {
        write_pretty(out, child, depth + 1);
    }
}

/// Finds a level by name, or the first level when `name` is `None`.
pub fn find_level<'a>(root: &'a Element, name: Option<&str>) -> Result<&'a Element> {
    let mut levels = root
        .child("levels")
        .ok_or_else(|| anyhow!("map has no levels"))?
        .children_named("level");
    match name {
        Some(name) => levels
            .find(|level| level.attr("name", "") == name)
            .ok_or_else(|| anyhow!("no level named {name:?}")),
        None => levels.next().ok_or_else(|| anyhow!("map has no levels")),
    }
}

/// Runs the autotiler over one tile layer (`solids` or `bg`) of a level.
///
/// The grid size comes from the level's pixel `width` and `height`.
pub fn autotile_level(level: &Element, layer: &str, autotiler: &Autotiler) -> Result<TileGrid> {
    let (width, height) = level_tiles(level)?;
    tracing::debug!(layer, width, height, "autotiling level");
    let text = level
        .child(layer)
        .and_then(Element::inner_text)
        .unwrap_or_default();
    autotiler
        .generate(width, height, text)
        .with_context(|| format!("autotile {layer} of level {:?}", level.attr("name", "")))
}

fn level_tiles(level: &Element) -> Result<(usize, usize)> {
    let tiles = |attr: &str| -> Result<usize> {
        let pixels = level.attr_int(attr, 0);
        if pixels < 0 {
            bail!("level {attr} is negative: {pixels}");
        }
        Ok(usize::try_from(pixels / TILE_SIZE)?)
    };
    let (width, height) = (tiles("width")?, tiles("height")?);
    match width.checked_mul(height) {
        Some(cells) if cells <= MAX_LEVEL_TILES => Ok((width, height)),
        _ => bail!("level of {width}x{height} tiles exceeds {MAX_LEVEL_TILES} tiles"),
    }
}

/// Renders a tile grid as text: `C` center, `P` padded, `M` masked, `.` empty.
pub fn format_tile_grid(grid: &TileGrid) -> String {
    let mut out = String::with_capacity((grid.width + 1) * grid.height);
    for row in grid.cells.chunks(grid.width.max(1)) {
        for cell in row {
            out.push(match cell.map(|t| t.rule) {
                None => '.',
                Some(RuleMatch::Center) => 'C',
                Some(RuleMatch::Padded) => 'P',
                Some(RuleMatch::Masked(_)) => 'M',
            });
        }
        out.push('\n');
    }
    out
}
