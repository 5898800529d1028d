//! Color Scales Loader
//!
//! Reads the color scales document into a per-scheme lookup table.
//! Loading never fails: anything wrong with the file yields an empty
//! table plus a warning, and the diagram keeps its default colors.

use super::model::{ColorEffect, EffectKind, NamedColor};
use super::palette::{hex_or_white, parse_hex};
use crate::error::{DiagramWarning, TableError};
use eframe::egui::Color32;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// File name looked up in the working directory and the config directory
pub const COLOR_SCALES_FILE: &str = "color_scales.yaml";

/// The five selectable color schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum ColorScheme {
    /// Built-in defaults, no effects
    #[default]
    #[serde(rename = "PLAIN")]
    Plain,
    #[serde(rename = "KING_SCALE")]
    King,
    #[serde(rename = "QUEEN_SCALE")]
    Queen,
    #[serde(rename = "PRINCE_SCALE")]
    Prince,
    #[serde(rename = "PRINCESS_SCALE")]
    Princess,
}

impl ColorScheme {
    pub const ALL: [ColorScheme; 5] = [
        ColorScheme::Plain,
        ColorScheme::King,
        ColorScheme::Queen,
        ColorScheme::Prince,
        ColorScheme::Princess,
    ];

    /// Key under `scales:` in the color scales document
    pub fn table_key(&self) -> &'static str {
        match self {
            ColorScheme::Plain => "plain",
            ColorScheme::King => "king",
            ColorScheme::Queen => "queen",
            ColorScheme::Prince => "prince",
            ColorScheme::Princess => "princess",
        }
    }

    /// Key used in configuration documents
    pub fn config_key(&self) -> &'static str {
        match self {
            ColorScheme::Plain => "PLAIN",
            ColorScheme::King => "KING_SCALE",
            ColorScheme::Queen => "QUEEN_SCALE",
            ColorScheme::Prince => "PRINCE_SCALE",
            ColorScheme::Princess => "PRINCESS_SCALE",
        }
    }

    /// Accepts table keys (`king`), config keys (`KING_SCALE`) and display names
    pub fn from_str(s: &str) -> Option<Self> {
        let key = s.trim().to_lowercase();
        let key = key.strip_suffix("_scale").unwrap_or(&key);
        let key = key.strip_suffix(" scale").unwrap_or(key);
        Self::ALL.into_iter().find(|scheme| scheme.table_key() == key)
    }

    /// Whether colors come from the loaded table
    pub fn is_symbolic(&self) -> bool {
        *self != ColorScheme::Plain
    }

    /// Human readable label for menus
    pub fn label(&self) -> &'static str {
        match self {
            ColorScheme::Plain => "Plain",
            ColorScheme::King => "King Scale",
            ColorScheme::Queen => "Queen Scale",
            ColorScheme::Prince => "Prince Scale",
            ColorScheme::Princess => "Princess Scale",
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Color and optional effect for one element
#[derive(Debug, Clone, PartialEq)]
pub struct ColorEntry {
    pub color: Color32,
    pub effect: Option<ColorEffect>,
}

/// Entries of one scheme
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemeColors {
    /// Keyed by sephirah number, Da'ath at 0
    pub sephiroth: BTreeMap<u8, ColorEntry>,

    /// Keyed by path number
    pub paths: BTreeMap<u8, ColorEntry>,
}

/// Parsed color scales. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorTable {
    schemes: BTreeMap<ColorScheme, SchemeColors>,
}

impl ColorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a color scales file. Problems are absorbed into an empty table
    /// and reported as a warning.
    pub fn load(path: impl AsRef<Path>) -> (Self, Option<DiagramWarning>) {
        let path = path.as_ref();

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Self::recover(DiagramWarning::ColorTableMissing {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => {
                return Self::recover(DiagramWarning::ColorTableUnreadable {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        };

        match Self::from_yaml_str(&content) {
            Ok(table) => {
                log::info!(
                    "Loaded {} color scheme(s) from {}",
                    table.schemes.len(),
                    path.display()
                );
                (table, None)
            }
            Err(e) => Self::recover(DiagramWarning::ColorTableMalformed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }),
        }
    }

    /// Load from the first existing default location
    pub fn load_default(explicit: Option<&Path>) -> (Self, Option<DiagramWarning>) {
        Self::load(Self::locate(explicit))
    }

    /// Resolve the color scales file: the explicit path, then the working
    /// directory, then `<config dir>/tree-of-life/`.
    pub fn locate(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }

        let local = PathBuf::from(COLOR_SCALES_FILE);
        if local.exists() {
            return local;
        }

        if let Some(config_dir) = dirs::config_dir() {
            let candidate = config_dir.join("tree-of-life").join(COLOR_SCALES_FILE);
            if candidate.exists() {
                return candidate;
            }
        }

        local
    }

    /// Parse a color scales document
    pub fn from_yaml_str(source: &str) -> Result<Self, TableError> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }

        let document: RawDocument = serde_yml::from_str(source)?;
        let mut table = Self::default();

        for (name, raw) in document.scales.unwrap_or_default() {
            let scheme = match ColorScheme::from_str(&name) {
                Some(scheme) if scheme.is_symbolic() => scheme,
                _ => {
                    log::debug!("Ignoring unknown color scale '{}'", name);
                    continue;
                }
            };

            let colors = SchemeColors {
                sephiroth: convert_entries(raw.sephiroth),
                paths: convert_entries(raw.paths),
            };
            table.schemes.insert(scheme, colors);
        }

        Ok(table)
    }

    pub fn scheme(&self, scheme: ColorScheme) -> Option<&SchemeColors> {
        self.schemes.get(&scheme)
    }

    pub fn contains(&self, scheme: ColorScheme) -> bool {
        self.schemes.contains_key(&scheme)
    }

    /// Schemes present in the document
    pub fn schemes(&self) -> impl Iterator<Item = ColorScheme> + '_ {
        self.schemes.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }

    // The caller reports the returned warning
    fn recover(warning: DiagramWarning) -> (Self, Option<DiagramWarning>) {
        log::debug!("{}", warning);
        (Self::default(), Some(warning))
    }
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    scales: Option<BTreeMap<String, RawScale>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawScale {
    sephiroth: Vec<RawEntry>,
    paths: Vec<RawEntry>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    number: Option<serde_yml::Value>,
    #[serde(default)]
    hex: Option<serde_yml::Value>,
    #[serde(default)]
    effect: Option<RawEffect>,
}

#[derive(Debug, Deserialize)]
struct RawEffect {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    hex: Option<serde_yml::Value>,
    #[serde(default)]
    colors: Option<Vec<RawNamedColor>>,
}

#[derive(Debug, Deserialize)]
struct RawNamedColor {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    hex: Option<serde_yml::Value>,
}

/// Element number of an entry; anything that is not an integer in `u8`
/// range skips just that entry
fn entry_number(value: Option<&serde_yml::Value>) -> Option<u8> {
    value
        .and_then(|v| v.as_u64())
        .and_then(|n| u8::try_from(n).ok())
}

fn convert_entries(entries: Vec<RawEntry>) -> BTreeMap<u8, ColorEntry> {
    entries
        .into_iter()
        .filter_map(|entry| {
            let Some(number) = entry_number(entry.number.as_ref()) else {
                log::warn!("Skipping color entry with invalid number {:?}", entry.number);
                return None;
            };
            let color = hex_or_white(entry.hex.as_ref().and_then(|v| v.as_str()));
            let effect = entry.effect.and_then(|raw| convert_effect(number, raw));
            Some((number, ColorEntry { color, effect }))
        })
        .collect()
}

fn convert_effect(number: u8, raw: RawEffect) -> Option<ColorEffect> {
    let kind_name = raw.kind?;
    let Some(kind) = EffectKind::from_str(&kind_name) else {
        log::debug!("Dropping unknown effect '{}' on element {}", kind_name, number);
        return None;
    };

    let mut effect = ColorEffect::new(kind);

    match (raw.color, raw.hex) {
        (Some(name), Some(hex)) => {
            effect.secondary = Some(NamedColor {
                name: Some(name),
                hex: hex.as_str().and_then(parse_hex),
            });
        }
        _ => {
            effect.colors = raw
                .colors
                .unwrap_or_default()
                .into_iter()
                .map(|c| NamedColor {
                    name: c.name,
                    hex: c.hex.as_ref().and_then(|v| v.as_str()).and_then(parse_hex),
                })
                .collect();
        }
    }

    Some(effect)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
scales:
  king:
    sephiroth:
      - number: 1
        name: Kether
        hex: "#FFFFFF"
      - number: 10
        hex: "#FFFF00"
        effect:
          type: flecked
          colors:
            - { name: gold, hex: "#FFD700" }
            - { name: black, hex: "#000000" }
    paths:
      - number: 11
        hex: "#FFFFC0"
        effect: { type: rayed, color: gold, hex: "#FFD700" }
      - number: 12
        hex: "not a color"
  queen:
    sephiroth:
      - number: 2
        hex: "#808080"
        effect: { type: sparkled, color: red, hex: "#FF0000" }
  emperor:
    sephiroth:
      - number: 1
        hex: "#123456"
"##;

    #[test]
    fn test_parse_known_scales() {
        let table = ColorTable::from_yaml_str(SAMPLE).unwrap();
        let schemes: Vec<_> = table.schemes().collect();
        assert_eq!(schemes, vec![ColorScheme::King, ColorScheme::Queen]);

        let king = table.scheme(ColorScheme::King).unwrap();
        assert_eq!(king.sephiroth[&1].color, Color32::WHITE);
        assert_eq!(king.sephiroth[&10].color, Color32::from_rgb(0xFF, 0xFF, 0x00));
        assert_eq!(king.paths[&11].color, Color32::from_rgb(0xFF, 0xFF, 0xC0));
    }

    #[test]
    fn test_bad_hex_is_white() {
        let table = ColorTable::from_yaml_str(SAMPLE).unwrap();
        let king = table.scheme(ColorScheme::King).unwrap();
        assert_eq!(king.paths[&12].color, Color32::WHITE);
        assert!(king.paths[&12].effect.is_none());
    }

    #[test]
    fn test_effect_secondary_forms() {
        let table = ColorTable::from_yaml_str(SAMPLE).unwrap();
        let king = table.scheme(ColorScheme::King).unwrap();

        let listed = king.sephiroth[&10].effect.as_ref().unwrap();
        assert_eq!(listed.kind, EffectKind::Speckle);
        assert!(listed.secondary.is_none());
        assert_eq!(listed.colors.len(), 2);
        assert_eq!(listed.secondary_color(), Color32::from_rgb(0xFF, 0xD7, 0x00));

        let single = king.paths[&11].effect.as_ref().unwrap();
        assert_eq!(single.kind, EffectKind::Radiate);
        let secondary = single.secondary.as_ref().unwrap();
        assert_eq!(secondary.name.as_deref(), Some("gold"));
        assert_eq!(secondary.hex, Some(Color32::from_rgb(0xFF, 0xD7, 0x00)));
    }

    #[test]
    fn test_unknown_effect_type_dropped() {
        let table = ColorTable::from_yaml_str(SAMPLE).unwrap();
        let queen = table.scheme(ColorScheme::Queen).unwrap();
        assert_eq!(queen.sephiroth[&2].color, Color32::from_rgb(0x80, 0x80, 0x80));
        assert!(queen.sephiroth[&2].effect.is_none());
    }

    #[test]
    fn test_color_without_hex_falls_back_to_list() {
        let source = r##"
scales:
  prince:
    paths:
      - number: 20
        hex: "#00FF00"
        effect:
          type: tinged
          color: olive
          colors: [{ name: olive, hex: "#808000" }]
"##;
        let table = ColorTable::from_yaml_str(source).unwrap();
        let effect = table.scheme(ColorScheme::Prince).unwrap().paths[&20]
            .effect
            .clone()
            .unwrap();
        assert_eq!(effect.kind, EffectKind::BlendTint);
        assert!(effect.secondary.is_none());
        assert_eq!(effect.colors[0].hex, Some(Color32::from_rgb(0x80, 0x80, 0x00)));
    }

    #[test]
    fn test_bad_numbers_skip_only_their_entry() {
        let source = r##"
scales:
  king:
    sephiroth:
      - { number: 1, hex: "#FFFFFF" }
      - { number: 300, hex: "#000000" }
      - { number: six, hex: "#000000" }
      - { number: -2, hex: "#000000" }
      - { hex: "#000000" }
      - { number: 2, hex: "#808080" }
"##;
        let table = ColorTable::from_yaml_str(source).unwrap();
        let king = table.scheme(ColorScheme::King).unwrap();
        assert_eq!(king.sephiroth.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(king.sephiroth[&2].color, Color32::from_rgb(0x80, 0x80, 0x80));
    }

    #[test]
    fn test_empty_and_scaleless_documents() {
        assert!(ColorTable::from_yaml_str("").unwrap().is_empty());
        assert!(ColorTable::from_yaml_str("title: nothing here\n").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_document_is_error() {
        assert!(ColorTable::from_yaml_str("scales: [1, 2").is_err());
        assert!(ColorTable::from_yaml_str("scales:\n  king:\n    sephiroth: 7\n").is_err());
    }

    #[test]
    fn test_load_missing_file_warns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");

        let (table, warning) = ColorTable::load(&path);
        assert!(table.is_empty());
        assert_eq!(warning, Some(DiagramWarning::ColorTableMissing { path }));
    }

    #[test]
    fn test_load_malformed_file_warns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "scales: {king: [").unwrap();

        let (table, warning) = ColorTable::load(&path);
        assert!(table.is_empty());
        assert!(matches!(warning, Some(DiagramWarning::ColorTableMalformed { .. })));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(COLOR_SCALES_FILE);
        std::fs::write(&path, SAMPLE).unwrap();

        let (table, warning) = ColorTable::load(&path);
        assert!(warning.is_none());
        assert!(table.contains(ColorScheme::King));
        assert!(!table.contains(ColorScheme::Princess));
    }

    #[test]
    fn test_scheme_names() {
        assert_eq!(ColorScheme::from_str("king"), Some(ColorScheme::King));
        assert_eq!(ColorScheme::from_str("QUEEN_SCALE"), Some(ColorScheme::Queen));
        assert_eq!(ColorScheme::from_str("Princess Scale"), Some(ColorScheme::Princess));
        assert_eq!(ColorScheme::from_str("plain"), Some(ColorScheme::Plain));
        assert_eq!(ColorScheme::from_str("emperor"), None);
        assert_eq!(ColorScheme::King.config_key(), "KING_SCALE");
    }
}
