//! Loading rule sets from tileset XML.
//!
//! ```xml
//! <Data>
//!   <Tileset id="1" path="dirt" ignores="3,*" copy="2">
//!     <set mask="center" tiles="0,0;1,0" />
//!     <set mask="padding" tiles="2,0" />
//!     <set mask="x0x-111-x1x" tiles="0,1" sprites="a,b" />
//!   </Tileset>
//! </Data>
//! ```

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{AutotileError, AutotileResult, RuleSetReason};
use crate::rules::{Mask, Rule, RuleSet, TerrainType, TileRef};

const MASK_CENTER: &str = "center";
const MASK_PADDING: &str = "padding";

/// One `<Tileset>` element as written.
#[derive(Debug, Default)]
struct TilesetDecl {
    attrs: HashMap<String, String>,
    sets: Vec<HashMap<String, String>>,
}

impl TilesetDecl {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    fn char_attr(&self, name: &str) -> Option<char> {
        self.attr(name).and_then(|v| v.chars().next())
    }
}

impl RuleSet {
    /// Parses a rule set from tileset XML.
    ///
    /// A terrain may `copy` only terrains declared above it; the copied sets
    /// are appended after its own.
    pub fn from_xml(xml: &str) -> AutotileResult<Self> {
        let decls = read_tilesets(xml)?;

        let mut rules = Self::new();
        let mut loaded: HashMap<char, usize> = HashMap::new();
        for (index, decl) in decls.iter().enumerate() {
            let id = decl.char_attr("id").ok_or_else(|| {
                AutotileError::invalid(None, RuleSetReason::MissingAttribute { name: "id" })
            })?;
            let path = decl.attr("path").filter(|p| !p.is_empty()).ok_or_else(|| {
                AutotileError::invalid(Some(id), RuleSetReason::MissingAttribute { name: "path" })
            })?;

            let mut terrain = TerrainType::new(id, path);
            read_sets(&mut terrain, &decl.sets)?;

            if let Some(target) = decl.char_attr("copy") {
                let source = loaded
                    .get(&target)
                    .map(|&i| &decls[i])
                    .ok_or(AutotileError::MissingCopyTarget {
                        terrain: id,
                        target,
                    })?;
                read_sets(&mut terrain, &source.sets)?;
            }

            if let Some(ignores) = decl.attr("ignores") {
                terrain
                    .ignores
                    .extend(ignores.split(',').filter_map(|s| s.chars().next()));
            }

            rules.insert(terrain)?;
            loaded.insert(id, index);
        }

        tracing::debug!(terrains = rules.len(), "loaded autotile rules");
        Ok(rules)
    }
}

fn read_sets(terrain: &mut TerrainType, sets: &[HashMap<String, String>]) -> AutotileResult<()> {
    let id = terrain.id;
    for set in sets {
        let mut rule = Rule::new(parse_tiles(id, set.get("tiles").map_or("", String::as_str))?);
        if let Some(sprites) = set.get("sprites") {
            rule = rule.with_sprites(sprites.split(',').filter(|s| !s.is_empty()));
        }

        match set.get("mask").map(String::as_str) {
            Some(MASK_CENTER) => terrain.center.extend(rule),
            Some(MASK_PADDING) => terrain.padded.extend(rule),
            Some(text) => {
                let mask = Mask::parse(text).ok_or_else(|| {
                    AutotileError::invalid(
                        Some(id),
                        RuleSetReason::BadMask {
                            mask: text.to_owned(),
                        },
                    )
                })?;
                terrain.push_rule(mask, rule);
            }
            None => {
                return Err(AutotileError::invalid(
                    Some(id),
                    RuleSetReason::MissingAttribute { name: "mask" },
                ))
            }
        }
    }
    Ok(())
}

/// Parses `x,y;x,y;...`. Empty entries are skipped.
fn parse_tiles(id: char, text: &str) -> AutotileResult<Vec<TileRef>> {
    let bad = || {
        AutotileError::invalid(
            Some(id),
            RuleSetReason::BadTiles {
                tiles: text.to_owned(),
            },
        )
    };
    text.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (x, y) = entry.split_once(',').ok_or_else(bad)?;
            let x = x.trim().parse().map_err(|_| bad())?;
            let y = y.trim().parse().map_err(|_| bad())?;
            Ok(TileRef::new(x, y))
        })
        .collect()
}

fn read_tilesets(xml: &str) -> AutotileResult<Vec<TilesetDecl>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut decls = Vec::new();
    let mut current: Option<TilesetDecl> = None;
    loop {
        match reader.read_event()? {
            Event::Start(ref e) if e.name().as_ref() == b"Tileset" => {
                current = Some(TilesetDecl {
                    attrs: parse_attributes(e)?,
                    sets: Vec::new(),
                });
            }
            Event::Empty(ref e) if e.name().as_ref() == b"Tileset" => {
                decls.push(TilesetDecl {
                    attrs: parse_attributes(e)?,
                    sets: Vec::new(),
                });
            }
            Event::Start(ref e) | Event::Empty(ref e) if e.name().as_ref() == b"set" => {
                if let Some(decl) = current.as_mut() {
                    decl.sets.push(parse_attributes(e)?);
                }
            }
            Event::End(ref e) if e.name().as_ref() == b"Tileset" => {
                decls.extend(current.take());
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(decls)
}

fn parse_attributes(elem: &BytesStart<'_>) -> AutotileResult<HashMap<String, String>> {
    let mut attrs = HashMap::new();
    for attr in elem.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attrs.insert(key, value);
    }
    Ok(attrs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::MaskCell;

    const RULES: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Data>
  <!-- base terrain -->
  <Tileset id="2" path="snow">
    <set mask="center" tiles="0,0" />
    <set mask="padding" tiles="1,0" />
    <set mask="x0x-111-x1x" tiles="0,1;1,1" sprites="ice" />
  </Tileset>
  <Tileset id="1" path="dirt" ignores="3,*" copy="2">
    <set mask="center" tiles="5,5;6,5" />
    <set mask="111-111-110" tiles="2,2" />
  </Tileset>
</Data>"#;

    #[test]
    fn load_terrains() {
        let rules = RuleSet::from_xml(RULES).unwrap();
        assert_eq!(rules.len(), 2);

        let snow = rules.get('2').unwrap();
        assert_eq!(snow.path, "snow");
        assert_eq!(snow.center.tiles, vec![TileRef::new(0, 0)]);
        assert_eq!(snow.padded.tiles, vec![TileRef::new(1, 0)]);
        assert_eq!(snow.masked.len(), 1);
        assert_eq!(snow.masked[0].rule.sprites, vec!["ice".to_string()]);
        assert!(snow.ignores.is_empty());
    }

    #[test]
    fn copy_appends_after_own_sets() {
        let rules = RuleSet::from_xml(RULES).unwrap();
        let dirt = rules.get('1').unwrap();

        assert_eq!(dirt.path, "dirt");
        assert_eq!(
            dirt.center.tiles,
            vec![TileRef::new(5, 5), TileRef::new(6, 5), TileRef::new(0, 0)]
        );
        assert_eq!(dirt.padded.tiles, vec![TileRef::new(1, 0)]);
        assert_eq!(dirt.masked.len(), 2);
        assert_eq!(dirt.masked[0].mask.0[8], MaskCell::Disconnected);
        assert_eq!(dirt.masked[1].rule.tiles.len(), 2);
        assert_eq!(dirt.ignores.iter().copied().collect::<String>(), "*3");
    }

    #[test]
    fn copy_of_later_terrain_is_an_error() {
        let xml = r#"<Data>
            <Tileset id="1" path="dirt" copy="2"><set mask="center" tiles="0,0"/></Tileset>
            <Tileset id="2" path="snow"><set mask="center" tiles="0,0"/></Tileset>
        </Data>"#;
        assert_eq!(
            RuleSet::from_xml(xml).unwrap_err(),
            AutotileError::MissingCopyTarget {
                terrain: '1',
                target: '2'
            }
        );
    }

    #[test]
    fn duplicate_terrain_is_an_error() {
        let xml = r#"<Data>
            <Tileset id="1" path="dirt"/>
            <Tileset id="1" path="snow"/>
        </Data>"#;
        assert!(matches!(
            RuleSet::from_xml(xml).unwrap_err(),
            AutotileError::InvalidRuleSet {
                terrain: Some('1'),
                reason: RuleSetReason::DuplicateTerrain
            }
        ));
    }

    #[test]
    fn missing_path_is_an_error() {
        let xml = r#"<Data><Tileset id="1"/></Data>"#;
        assert_eq!(
            RuleSet::from_xml(xml).unwrap_err(),
            AutotileError::invalid(Some('1'), RuleSetReason::MissingAttribute { name: "path" })
        );
    }

    #[test]
    fn bad_mask_is_an_error() {
        let xml = r#"<Data><Tileset id="1" path="dirt"><set mask="01x" tiles="0,0"/></Tileset></Data>"#;
        assert!(matches!(
            RuleSet::from_xml(xml).unwrap_err(),
            AutotileError::InvalidRuleSet {
                reason: RuleSetReason::BadMask { .. },
                ..
            }
        ));
    }

    #[test]
    fn bad_tiles_are_an_error() {
        for tiles in ["0", "a,b", "1,2,3", "-1,0"] {
            let xml = format!(
                r#"<Data><Tileset id="1" path="dirt"><set mask="center" tiles="{tiles}"/></Tileset></Data>"#
            );
            assert!(
                matches!(
                    RuleSet::from_xml(&xml).unwrap_err(),
                    AutotileError::InvalidRuleSet {
                        reason: RuleSetReason::BadTiles { .. },
                        ..
                    }
                ),
                "{tiles}"
            );
        }
    }

    #[test]
    fn empty_tiles_give_an_empty_rule() {
        let xml = r#"<Data><Tileset id="1" path="dirt"><set mask="padding" tiles=""/></Tileset></Data>"#;
        let rules = RuleSet::from_xml(xml).unwrap();
        assert!(rules.get('1').unwrap().padded.tiles.is_empty());
    }

    #[test]
    fn malformed_xml_is_an_error() {
        let xml = r#"<Data><Tileset id="1" path="dirt"></Data>"#;
        assert!(matches!(
            RuleSet::from_xml(xml).unwrap_err(),
            AutotileError::Xml(_)
        ));
    }

    #[test]
    fn parse_tiles_tolerates_whitespace() {
        assert_eq!(
            parse_tiles('1', " 0, 1 ; 2,3;").unwrap(),
            vec![TileRef::new(0, 1), TileRef::new(2, 3)]
        );
    }
}
