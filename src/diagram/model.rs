//! Tree of Life Data Structures
//!
//! The fixed topology: ten sephiroth, the hidden sephirah Da'ath and the
//! twenty-two paths joining them. Positions are derived from two scale
//! parameters; only colors and effects change after construction.

use eframe::egui::{Color32, Pos2};
use std::collections::BTreeMap;

/// Number of the hidden sephirah
pub const DAATH: u8 = 0;

/// Radius of a sephirah before `sphere_scale` is applied
pub const BASE_RADIUS: f32 = 0.5;

/// Canonical names, indexed by sephirah number (Da'ath at 0)
pub const SEPHIRAH_NAMES: [&str; 11] = [
    "Da'ath",
    "Kether",
    "Chokmah",
    "Binah",
    "Chesed",
    "Geburah",
    "Tiphereth",
    "Netzach",
    "Hod",
    "Yesod",
    "Malkuth",
];

/// Position coefficients `(x, y)` multiplied by `spacing`. Every sephirah
/// except Kether is additionally shifted down by half a spacing unit.
const SEPHIRAH_COEFFICIENTS: [(f32, f32); 10] = [
    (0.0, 9.0),
    (2.0, 8.0),
    (-2.0, 8.0),
    (2.0, 5.5),
    (-2.0, 5.5),
    (0.0, 4.25),
    (2.0, 3.0),
    (-2.0, 3.0),
    (0.0, 1.75),
    (0.0, -0.7),
];

/// Sephiroth whose centroid places Da'ath
const DAATH_ANCHORS: [u8; 4] = [2, 3, 4, 5];

/// Path number and the two sephiroth it joins
pub const PATH_CONNECTIONS: [(u8, (u8, u8)); 22] = [
    (11, (1, 2)),
    (12, (1, 3)),
    (13, (1, 6)),
    (14, (2, 3)),
    (15, (2, 6)),
    (16, (2, 4)),
    (17, (3, 6)),
    (18, (3, 5)),
    (19, (4, 5)),
    (20, (4, 6)),
    (21, (4, 7)),
    (22, (5, 6)),
    (23, (5, 8)),
    (24, (6, 7)),
    (25, (6, 9)),
    (26, (6, 8)),
    (27, (7, 8)),
    (28, (7, 9)),
    (29, (7, 10)),
    (30, (8, 9)),
    (31, (8, 10)),
    (32, (9, 10)),
];

/// Kind of special coloring an element carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Small dots of a second color scattered over the element
    Speckle,
    /// Straight rays of a second color
    Radiate,
    /// The base color slightly blended with a second color
    BlendTint,
}

impl EffectKind {
    /// Parse from the color scales `type` string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "flecked" | "speckle" => Some(EffectKind::Speckle),
            "rayed" | "radiate" => Some(EffectKind::Radiate),
            "tinged" | "blend-tint" => Some(EffectKind::BlendTint),
            _ => None,
        }
    }
}

/// A named secondary color
#[derive(Debug, Clone, PartialEq)]
pub struct NamedColor {
    pub name: Option<String>,
    /// `None` when the source gave no usable hex value
    pub hex: Option<Color32>,
}

/// Special coloring attached to a sephirah or path
#[derive(Debug, Clone, PartialEq)]
pub struct ColorEffect {
    pub kind: EffectKind,

    /// Single secondary color, present only when both name and hex were given
    pub secondary: Option<NamedColor>,

    /// Secondary colors given as a list
    pub colors: Vec<NamedColor>,
}

impl ColorEffect {
    pub fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            secondary: None,
            colors: Vec::new(),
        }
    }

    /// Secondary color: the single hex, else the first listed color, else white
    pub fn secondary_color(&self) -> Color32 {
        if let Some(hex) = self.secondary.as_ref().and_then(|c| c.hex) {
            return hex;
        }

        match self.colors.first() {
            Some(first) => first.hex.unwrap_or(Color32::WHITE),
            None => Color32::WHITE,
        }
    }
}

/// A sphere on the tree
#[derive(Debug, Clone, PartialEq)]
pub struct Sephirah {
    /// 1-10, or 0 for Da'ath
    pub number: u8,

    pub name: &'static str,

    /// Center in diagram units (y grows upward)
    pub position: Pos2,

    pub color: Color32,

    pub effect: Option<ColorEffect>,
}

/// A path joining two sephiroth
#[derive(Debug, Clone, PartialEq)]
pub struct TreePath {
    /// 11-32
    pub number: u8,

    /// Sephirah numbers of both ends
    pub from: u8,
    pub to: u8,

    pub color: Color32,

    pub effect: Option<ColorEffect>,
}

impl TreePath {
    /// 0-based indices of both ends
    pub fn connects(&self) -> (usize, usize) {
        (self.from as usize - 1, self.to as usize - 1)
    }

    /// Whether this path ends at the given sephirah
    pub fn touches(&self, sephirah: u8) -> bool {
        self.from == sephirah || self.to == sephirah
    }

    /// The end opposite `sephirah`, if this path touches it
    pub fn other_end(&self, sephirah: u8) -> Option<u8> {
        if self.from == sephirah {
            Some(self.to)
        } else if self.to == sephirah {
            Some(self.from)
        } else {
            None
        }
    }
}

/// Built-in colors the plain scheme resets to
#[derive(Debug, Clone, Copy)]
pub struct DefaultColors {
    /// Indexed by sephirah number, Da'ath at 0
    pub sephiroth: &'static [Color32; 11],

    /// Indexed by `path number - 11`
    pub paths: &'static [Color32; 22],
}

static DEFAULT_SEPHIROTH_COLORS: [Color32; 11] = [Color32::WHITE; 11];
static DEFAULT_PATH_COLORS: [Color32; 22] = [Color32::WHITE; 22];

/// Shared default color tables
pub static DEFAULT_COLORS: DefaultColors = DefaultColors {
    sephiroth: &DEFAULT_SEPHIROTH_COLORS,
    paths: &DEFAULT_PATH_COLORS,
};

impl Default for DefaultColors {
    fn default() -> Self {
        DEFAULT_COLORS
    }
}

impl DefaultColors {
    pub fn sephirah(&self, number: u8) -> Color32 {
        self.sephiroth
            .get(number as usize)
            .copied()
            .unwrap_or(Color32::WHITE)
    }

    pub fn path(&self, number: u8) -> Color32 {
        number
            .checked_sub(11)
            .and_then(|i| self.paths.get(i as usize))
            .copied()
            .unwrap_or(Color32::WHITE)
    }
}

/// The tree: nodes, hidden node and paths
#[derive(Debug, Clone, PartialEq)]
pub struct TreeModel {
    /// Sephiroth 1-10
    pub sephiroth: BTreeMap<u8, Sephirah>,

    /// Paths 11-32
    pub paths: BTreeMap<u8, TreePath>,

    /// The hidden sephirah
    pub daath: Sephirah,

    sphere_scale: f32,
    spacing: f32,
}

impl TreeModel {
    /// Build the tree with default colors
    pub fn build(sphere_scale: f32, spacing: f32) -> Self {
        let defaults = DefaultColors::default();

        let sephiroth = (1..=10u8)
            .map(|number| {
                let sephirah = Sephirah {
                    number,
                    name: SEPHIRAH_NAMES[number as usize],
                    position: sephirah_position(number, spacing),
                    color: defaults.sephirah(number),
                    effect: None,
                };
                (number, sephirah)
            })
            .collect();

        let paths = PATH_CONNECTIONS
            .iter()
            .map(|&(number, (from, to))| {
                let path = TreePath {
                    number,
                    from,
                    to,
                    color: defaults.path(number),
                    effect: None,
                };
                (number, path)
            })
            .collect();

        let daath = Sephirah {
            number: DAATH,
            name: SEPHIRAH_NAMES[DAATH as usize],
            position: daath_position(spacing),
            color: defaults.sephirah(DAATH),
            effect: None,
        };

        Self {
            sephiroth,
            paths,
            daath,
            sphere_scale,
            spacing,
        }
    }

    /// Rebuild geometry for new scale parameters, keeping colors and effects
    pub fn rescale(&mut self, sphere_scale: f32, spacing: f32) {
        self.sphere_scale = sphere_scale;
        self.spacing = spacing;
        for (number, sephirah) in self.sephiroth.iter_mut() {
            sephirah.position = sephirah_position(*number, spacing);
        }
        self.daath.position = daath_position(spacing);
    }

    pub fn sphere_scale(&self) -> f32 {
        self.sphere_scale
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    /// Radius of every sphere
    pub fn radius(&self) -> f32 {
        BASE_RADIUS * self.sphere_scale
    }

    /// Look up a sephirah; 0 returns Da'ath
    pub fn sephirah(&self, number: u8) -> Option<&Sephirah> {
        if number == DAATH {
            Some(&self.daath)
        } else {
            self.sephiroth.get(&number)
        }
    }

    pub fn path(&self, number: u8) -> Option<&TreePath> {
        self.paths.get(&number)
    }

    /// Current positions of both ends of a path
    pub fn endpoints(&self, path: &TreePath) -> Option<(Pos2, Pos2)> {
        let from = self.sephiroth.get(&path.from)?.position;
        let to = self.sephiroth.get(&path.to)?.position;
        Some((from, to))
    }

    /// Midpoint of a path
    pub fn midpoint(&self, path: &TreePath) -> Option<Pos2> {
        let (from, to) = self.endpoints(path)?;
        Some(from.lerp(to, 0.5))
    }

    /// Number of paths ending at a sephirah
    pub fn degree(&self, sephirah: u8) -> usize {
        self.paths.values().filter(|p| p.touches(sephirah)).count()
    }

    /// Sephirah whose sphere contains `point`, Da'ath included
    pub fn sephirah_at(&self, point: Pos2) -> Option<u8> {
        let radius = self.radius();
        self.sephiroth
            .values()
            .chain(std::iter::once(&self.daath))
            .find(|s| s.position.distance(point) <= radius)
            .map(|s| s.number)
    }
}

fn vertical_shift(spacing: f32) -> f32 {
    -0.5 * spacing
}

fn sephirah_position(number: u8, spacing: f32) -> Pos2 {
    let (cx, cy) = SEPHIRAH_COEFFICIENTS[number as usize - 1];
    let shift = if number == 1 { 0.0 } else { vertical_shift(spacing) };
    Pos2::new(cx * spacing, cy * spacing + shift)
}

fn daath_position(spacing: f32) -> Pos2 {
    let (sum_x, sum_y) = DAATH_ANCHORS
        .iter()
        .map(|&n| SEPHIRAH_COEFFICIENTS[n as usize - 1])
        .fold((0.0, 0.0), |(ax, ay), (x, y)| (ax + x, ay + y));
    let count = DAATH_ANCHORS.len() as f32;
    Pos2::new(
        sum_x / count * spacing,
        sum_y / count * spacing + vertical_shift(spacing),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn assert_close(a: Pos2, b: Pos2) {
        assert!((a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4, "{a:?} != {b:?}");
    }

    #[test]
    fn test_node_counts() {
        let model = TreeModel::build(1.75, 1.5);
        assert_eq!(model.sephiroth.len(), 10);
        assert_eq!(model.paths.len(), 22);
        assert_eq!(model.daath.number, DAATH);
        assert!(model.sephiroth.keys().copied().eq(1..=10));
        assert!(model.paths.keys().copied().eq(11..=32));
    }

    #[test]
    fn test_topology_invariants() {
        let model = TreeModel::build(1.0, 1.0);
        let mut pairs = HashSet::new();
        for path in model.paths.values() {
            assert!((1..=10).contains(&path.from) && (1..=10).contains(&path.to));
            let pair = (path.from.min(path.to), path.from.max(path.to));
            assert!(pairs.insert(pair), "duplicate pair {pair:?}");
        }
        for number in 1..=10 {
            assert!(model.degree(number) >= 1);
        }
        assert_eq!(model.degree(DAATH), 0);
    }

    #[test]
    fn test_reference_positions() {
        let model = TreeModel::build(1.75, 1.5);
        assert_close(model.sephiroth[&1].position, Pos2::new(0.0, 9.0 * 1.5));
        assert_close(model.sephiroth[&2].position, Pos2::new(3.0, 12.0 - 0.75));
        assert_close(model.sephiroth[&10].position, Pos2::new(0.0, -0.7 * 1.5 - 0.75));
        assert_close(model.daath.position, Pos2::new(0.0, 6.75 * 1.5 - 0.75));
        assert!((model.radius() - 0.875).abs() < 1e-6);
    }

    #[test]
    fn test_rescale_moves_paths_with_nodes() {
        let mut model = TreeModel::build(1.0, 1.0);
        model.sephiroth.get_mut(&6).unwrap().color = Color32::RED;
        let path = model.paths[&25].clone();
        let before = model.midpoint(&path).unwrap();

        model.rescale(2.0, 2.0);
        let after = model.midpoint(&path).unwrap();

        assert_close(after, Pos2::new(before.x * 2.0, (before.y + 0.5) * 2.0 - 1.0));
        assert_eq!(model.sephiroth[&6].color, Color32::RED);
        assert_eq!(model, {
            let mut fresh = TreeModel::build(2.0, 2.0);
            fresh.sephiroth.get_mut(&6).unwrap().color = Color32::RED;
            fresh
        });
    }

    #[test]
    fn test_connects_is_zero_based() {
        let model = TreeModel::build(1.0, 1.0);
        assert_eq!(model.paths[&11].connects(), (0, 1));
        assert_eq!(model.paths[&32].connects(), (8, 9));
        assert_eq!(model.paths[&32].other_end(10), Some(9));
        assert_eq!(model.paths[&32].other_end(1), None);
    }

    #[test]
    fn test_secondary_color_fallback_order() {
        let gold = Color32::from_rgb(0xFF, 0xD7, 0x00);
        let red = Color32::RED;

        let mut effect = ColorEffect::new(EffectKind::Speckle);
        assert_eq!(effect.secondary_color(), Color32::WHITE);

        effect.colors = vec![
            NamedColor { name: Some("red".into()), hex: Some(red) },
            NamedColor { name: Some("gold".into()), hex: Some(gold) },
        ];
        assert_eq!(effect.secondary_color(), red);

        effect.secondary = Some(NamedColor { name: Some("gold".into()), hex: Some(gold) });
        assert_eq!(effect.secondary_color(), gold);

        let listed_without_hex = ColorEffect {
            kind: EffectKind::Radiate,
            secondary: None,
            colors: vec![NamedColor { name: Some("azure".into()), hex: None }],
        };
        assert_eq!(listed_without_hex.secondary_color(), Color32::WHITE);
    }

    #[test]
    fn test_sephirah_at() {
        let model = TreeModel::build(1.75, 1.5);
        let kether = model.sephiroth[&1].position;
        assert_eq!(model.sephirah_at(kether), Some(1));
        assert_eq!(model.sephirah_at(model.daath.position), Some(DAATH));
        assert_eq!(model.sephirah_at(Pos2::new(10.0, 10.0)), None);
    }
}
