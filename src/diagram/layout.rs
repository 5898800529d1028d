//! Compositing Rules for the Tree of Life
//!
//! Fixed layering of the paths, focus selection, path label geometry and
//! the viewport of a zoomed view:
//! - Underneath paths sit one layer lower so the middle pillar reads whole
//! - Focus keeps only the paths touching one sephirah and their far ends
//! - Labels follow the path angle unless the path is nearly axis aligned

use super::draw::{CirclePrimitive, DrawCommand};
use super::model::{TreeModel, TreePath};
use eframe::egui::{Color32, Pos2, Rect, Vec2};
use std::collections::BTreeSet;

/// Outer ribbon stroke of every path
pub const PATH_OUTER_Z: f32 = 1.0;
/// Colored inner stroke of every path
pub const PATH_INNER_Z: f32 = 2.0;
/// Sephirah discs
pub const SEPHIRAH_Z: f32 = 3.0;
/// Text inside a sephirah
pub const SEPHIRAH_TEXT_Z: f32 = 4.0;
/// Da'ath sits between the path strokes and the sephiroth
pub const DAATH_Z: f32 = 2.0;
pub const DAATH_TEXT_Z: f32 = 3.0;
/// Path numbers and glyphs
pub const PATH_LABEL_Z: f32 = 4.0;
/// Kether's glow stays under its disc
pub const GLOW_Z: f32 = 1.0;

/// Paths drawn one layer lower than the rest
pub const UNDERNEATH_PATHS: [u8; 4] = [13, 15, 17, 25];

/// Near-horizontal paths, drawn after all others at the normal layer
pub const SPECIAL_PATHS: [u8; 3] = [14, 19, 27];

/// Paths whose label reads upside down under the angle rule
pub const ORIENTATION_FIX_PATHS: [u8; 6] = [12, 15, 20, 26, 28, 29];

/// Sephiroth whose focus view also shows Da'ath
pub const DAATH_FOCUS: [u8; 2] = [1, 6];

/// Stacking group of a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PathLayer {
    Normal,
    Underneath,
    Special,
}

impl PathLayer {
    pub fn of(number: u8) -> Self {
        if UNDERNEATH_PATHS.contains(&number) {
            PathLayer::Underneath
        } else if SPECIAL_PATHS.contains(&number) {
            PathLayer::Special
        } else {
            PathLayer::Normal
        }
    }

    /// Added to both path stroke layers
    pub fn z_shift(&self) -> f32 {
        match self {
            PathLayer::Underneath => -1.0,
            PathLayer::Normal | PathLayer::Special => 0.0,
        }
    }
}

/// Stroke and spacing parameters, before `sphere_scale` is applied
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Outer path stroke, points
    pub path_outer_width: f32,
    /// Inner path stroke, points
    pub path_inner_width: f32,
    /// Sephirah border, points
    pub border_width: f32,
    /// Da'ath border relative to a sephirah border
    pub daath_border_ratio: f32,
    /// Da'ath disc and text opacity
    pub daath_alpha: f32,
    /// Path label font size, points
    pub path_label_size: f32,
    /// Focus padding in sphere radii
    pub focus_padding: f32,
    /// Degrees from an axis within which a label is kept upright
    pub axis_tolerance: f32,
    /// Viewport of the full diagram
    pub full_viewport: Rect,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            path_outer_width: 14.0 * 0.7,
            path_inner_width: 10.0 * 0.7,
            border_width: 3.0 * 0.6,
            daath_border_ratio: 0.7,
            daath_alpha: 0.8,
            path_label_size: 9.0 * 0.55,
            focus_padding: 2.5,
            axis_tolerance: 5.0,
            full_viewport: Rect::from_min_max(Pos2::new(-4.0, -3.5), Pos2::new(4.0, 15.0)),
        }
    }
}

/// Elements shown when the view is focused on one sephirah
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusSet {
    pub focus: u8,

    /// The focus and every sephirah across one of its paths
    pub sephiroth: BTreeSet<u8>,

    /// Paths touching the focus
    pub paths: BTreeSet<u8>,

    pub include_daath: bool,
}

impl FocusSet {
    /// `None` unless `number` is 1-10
    pub fn for_sephirah(model: &TreeModel, number: u8) -> Option<Self> {
        if !(1..=10).contains(&number) {
            log::debug!("Focus {} out of range, rendering full view", number);
            return None;
        }

        let touching: Vec<&TreePath> = model.paths.values().filter(|p| p.touches(number)).collect();

        let mut sephiroth: BTreeSet<u8> = touching.iter().filter_map(|p| p.other_end(number)).collect();
        sephiroth.insert(number);

        Some(Self {
            focus: number,
            sephiroth,
            paths: touching.iter().map(|p| p.number).collect(),
            include_daath: DAATH_FOCUS.contains(&number),
        })
    }

    pub fn shows_sephirah(&self, number: u8) -> bool {
        self.sephiroth.contains(&number)
    }

    pub fn shows_path(&self, number: u8) -> bool {
        self.paths.contains(&number)
    }

    /// Shown paths that do not touch the focus are grayed
    pub fn is_grayed(&self, path: &TreePath) -> bool {
        !path.touches(self.focus)
    }

    /// Number of shown nodes, Da'ath included
    pub fn node_count(&self) -> usize {
        self.sephiroth.len() + usize::from(self.include_daath)
    }
}

/// How a path label is oriented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelOrientation {
    Vertical,
    Horizontal,
    Diagonal,
}

/// Placement of a path's number and glyph
#[derive(Debug, Clone, PartialEq)]
pub struct PathLabel {
    pub anchor: Pos2,
    pub text: String,
    /// Counter-clockwise degrees
    pub rotation: f32,
    pub orientation: LabelOrientation,
}

/// Astrological or elemental glyph of a path
pub fn path_symbol(number: u8) -> &'static str {
    match number {
        11 => "△̵",
        12 => "☿",
        13 => "☽",
        14 => "♀",
        15 => "♒",
        16 => "♉",
        17 => "♊",
        18 => "♋",
        19 => "♌",
        20 => "♍",
        21 => "♃",
        22 => "♎",
        23 => "▽",
        24 => "♏",
        25 => "♐",
        26 => "♑",
        27 => "♂",
        28 => "♈",
        29 => "♓",
        30 => "☉",
        31 => "△ ⊙",
        32 => "♄\n▽̵",
        _ => "",
    }
}

/// Vertical lift of a label that would otherwise sit on another element
pub fn label_offset(number: u8, spacing: f32) -> f32 {
    match number {
        13 => 1.6 * spacing,
        25 => 0.38 * spacing,
        _ => 0.0,
    }
}

/// Label anchor: path midpoint plus the fixed offset
pub fn label_anchor(model: &TreeModel, path: &TreePath) -> Option<Pos2> {
    let mid = model.midpoint(path)?;
    Some(mid + Vec2::new(0.0, label_offset(path.number, model.spacing())))
}

/// Compute the label of path `number` running from `from` to `to`
pub fn path_label(config: &LayoutConfig, number: u8, from: Pos2, to: Pos2, spacing: f32) -> PathLabel {
    let delta = to - from;
    let mut angle = delta.y.atan2(delta.x).to_degrees();

    if angle > 90.0 && angle < 270.0 {
        angle -= 180.0;
    }
    if ORIENTATION_FIX_PATHS.contains(&number) {
        angle += 180.0;
    }

    let tolerance = config.axis_tolerance;
    let orientation = if (angle.abs() - 90.0).abs() < tolerance {
        LabelOrientation::Vertical
    } else if angle.abs() < tolerance || (angle.abs() - 180.0).abs() < tolerance {
        LabelOrientation::Horizontal
    } else {
        LabelOrientation::Diagonal
    };

    let rotation = match orientation {
        LabelOrientation::Diagonal => angle,
        LabelOrientation::Vertical | LabelOrientation::Horizontal => 0.0,
    };

    let symbol = path_symbol(number);
    let text = if number == 32 || orientation == LabelOrientation::Vertical {
        format!("{}\n{}", number, symbol)
    } else {
        format!("{} {}", number, symbol)
    };

    PathLabel {
        anchor: from.lerp(to, 0.5) + Vec2::new(0.0, label_offset(number, spacing)),
        text,
        rotation,
        orientation,
    }
}

/// Viewport of a focused view: covers the shown sephiroth, Da'ath when
/// shown and every shown label anchor, squared up and padded
pub fn focus_bounds(model: &TreeModel, focus: &FocusSet, config: &LayoutConfig) -> Rect {
    let mut bounds = Rect::NOTHING;

    for sephirah in focus.sephiroth.iter().filter_map(|&n| model.sephirah(n)) {
        bounds.extend_with(sephirah.position);
    }
    if focus.include_daath {
        bounds.extend_with(model.daath.position);
    }
    for path in focus.paths.iter().filter_map(|&n| model.path(n)) {
        if let Some(anchor) = label_anchor(model, path) {
            bounds.extend_with(anchor);
        }
    }

    let padding = model.radius() * config.focus_padding;
    let width = bounds.width() + padding * 2.0;
    let height = bounds.height() + padding * 2.0;

    if width > height {
        let grow = (width - height) / 2.0;
        bounds.min.y -= grow;
        bounds.max.y += grow;
    } else {
        let grow = (height - width) / 2.0;
        bounds.min.x -= grow;
        bounds.max.x += grow;
    }

    bounds.expand(padding)
}

/// Figure size for `viewport`: same area as `figsize`, matching aspect
/// ratio, no side longer than the longer side of `figsize`
pub fn canvas_size(viewport: Rect, figsize: [f32; 2]) -> Vec2 {
    let aspect = if viewport.height() != 0.0 {
        viewport.width() / viewport.height()
    } else {
        1.0
    };
    let area = figsize[0] * figsize[1];

    let (mut width, mut height) = if aspect > 1.0 {
        let height = (area / aspect).sqrt();
        (height * aspect, height)
    } else {
        let width = (area * aspect).sqrt();
        (width, width / aspect)
    };

    let max_side = figsize[0].max(figsize[1]);
    if width > max_side || height > max_side {
        let scale = max_side / width.max(height);
        width *= scale;
        height *= scale;
    }

    Vec2::new(width, height)
}

/// Concentric fading discs around Kether
pub fn radiant_glow(center: Pos2, radius: f32, color: Color32) -> Vec<DrawCommand> {
    (1..=10)
        .rev()
        .map(|step| {
            let i = (step * 2) as f32;
            let alpha = i / 40.0;
            let size = radius * (1.0 + (20.0 - i) / 10.0);
            CirclePrimitive::disc(center, size, color, alpha, GLOW_Z).into()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(model: &TreeModel, number: u8) -> PathLabel {
        let path = model.path(number).unwrap();
        let (from, to) = model.endpoints(path).unwrap();
        path_label(&LayoutConfig::default(), number, from, to, model.spacing())
    }

    #[test]
    fn test_path_layers() {
        assert_eq!(PathLayer::of(13), PathLayer::Underneath);
        assert_eq!(PathLayer::of(25), PathLayer::Underneath);
        assert_eq!(PathLayer::of(19), PathLayer::Special);
        assert_eq!(PathLayer::of(32), PathLayer::Normal);
        assert_eq!(PathLayer::of(17).z_shift(), -1.0);
    }

    #[test]
    fn test_focus_sets() {
        let model = TreeModel::build(1.75, 1.5);

        let kether = FocusSet::for_sephirah(&model, 1).unwrap();
        assert_eq!(kether.paths, BTreeSet::from([11, 12, 13]));
        assert_eq!(kether.sephiroth, BTreeSet::from([1, 2, 3, 6]));
        assert!(kether.include_daath);
        assert_eq!(kether.node_count(), 5);

        let binah = FocusSet::for_sephirah(&model, 3).unwrap();
        assert!(!binah.include_daath);
        assert!(FocusSet::for_sephirah(&model, 6).unwrap().include_daath);

        assert!(FocusSet::for_sephirah(&model, 0).is_none());
        assert!(FocusSet::for_sephirah(&model, 11).is_none());
    }

    #[test]
    fn test_focus_paths_touch_focus() {
        let model = TreeModel::build(1.0, 1.0);
        for n in 1..=10u8 {
            let set = FocusSet::for_sephirah(&model, n).unwrap();
            for p in &set.paths {
                let path = model.path(*p).unwrap();
                let (a, b) = path.connects();
                assert!(a == n as usize - 1 || b == n as usize - 1);
                assert!(!set.is_grayed(path));
            }
            assert_eq!(set.sephiroth.len(), set.paths.len() + 1);
        }
    }

    #[test]
    fn test_vertical_and_horizontal_labels() {
        let model = TreeModel::build(1.75, 1.5);

        let thirteen = label(&model, 13);
        assert_eq!(thirteen.orientation, LabelOrientation::Vertical);
        assert_eq!(thirteen.rotation, 0.0);
        assert_eq!(thirteen.text, "13\n☽");
        let mid = model.midpoint(model.path(13).unwrap()).unwrap();
        assert!((thirteen.anchor.y - (mid.y + 1.6 * 1.5)).abs() < 1e-5);

        let fourteen = label(&model, 14);
        assert_eq!(fourteen.orientation, LabelOrientation::Horizontal);
        assert_eq!(fourteen.text, "14 ♀");

        let last = label(&model, 32);
        assert_eq!(last.text, "32\n♄\n▽̵");
    }

    #[test]
    fn test_diagonal_labels_mirror() {
        let model = TreeModel::build(1.0, 1.0);
        let eleven = label(&model, 11);
        let twelve = label(&model, 12);

        assert_eq!(eleven.orientation, LabelOrientation::Diagonal);
        assert!((eleven.rotation + 36.869_9).abs() < 1e-3);
        // 12 is flipped back upright
        assert!((twelve.rotation - 36.869_9).abs() < 1e-3);
        assert_eq!(twelve.text, "12 ☿");
    }

    #[test]
    fn test_focus_bounds_are_square_and_cover() {
        let model = TreeModel::build(1.75, 1.5);
        let config = LayoutConfig::default();

        for n in 1..=10u8 {
            let set = FocusSet::for_sephirah(&model, n).unwrap();
            let bounds = focus_bounds(&model, &set, &config);
            assert!((bounds.width() - bounds.height()).abs() < 1e-3, "focus {n}");
            for s in &set.sephiroth {
                assert!(bounds.contains(model.sephirah(*s).unwrap().position));
            }
            if set.include_daath {
                assert!(bounds.contains(model.daath.position));
            }
        }
    }

    #[test]
    fn test_focus_bounds_padding_and_offset_labels() {
        let model = TreeModel::build(1.75, 1.5);
        let config = LayoutConfig::default();
        let padding = 2.5 * model.radius();

        for n in 1..=10u8 {
            let set = FocusSet::for_sephirah(&model, n).unwrap();
            let bounds = focus_bounds(&model, &set, &config);

            let mut content = Rect::NOTHING;
            for s in &set.sephiroth {
                content.extend_with(model.sephirah(*s).unwrap().position);
            }
            if set.include_daath {
                content.extend_with(model.daath.position);
            }
            for p in &set.paths {
                content.extend_with(label_anchor(&model, model.path(*p).unwrap()).unwrap());
            }

            // Squaring only widens the shorter axis
            if content.width() >= content.height() {
                assert!((content.min.x - bounds.min.x - padding).abs() < 1e-4, "focus {n}");
                assert!((bounds.max.x - content.max.x - padding).abs() < 1e-4, "focus {n}");
            } else {
                assert!((content.min.y - bounds.min.y - padding).abs() < 1e-4, "focus {n}");
                assert!((bounds.max.y - content.max.y - padding).abs() < 1e-4, "focus {n}");
            }
            assert!(bounds.min.x <= content.min.x - padding + 1e-4);
            assert!(bounds.min.y <= content.min.y - padding + 1e-4);

            for offset_path in [13, 25] {
                if set.shows_path(offset_path) {
                    let anchor = label_anchor(&model, model.path(offset_path).unwrap()).unwrap();
                    assert!(bounds.contains(anchor), "focus {n} path {offset_path}");
                }
            }
        }

        // 13 joins 1 and 6, 25 joins 6 and 9
        let tiphereth = FocusSet::for_sephirah(&model, 6).unwrap();
        assert!(tiphereth.shows_path(13) && tiphereth.shows_path(25));
    }

    #[test]
    fn test_canvas_size() {
        let square = Rect::from_min_max(Pos2::ZERO, Pos2::new(4.0, 4.0));
        let canvas = canvas_size(square, [7.5, 11.0]);
        assert!((canvas.x - canvas.y).abs() < 1e-4);
        assert!((canvas.x * canvas.y - 82.5).abs() < 1e-2);

        let wide = Rect::from_min_max(Pos2::ZERO, Pos2::new(100.0, 1.0));
        let capped = canvas_size(wide, [7.5, 11.0]);
        assert!((capped.x - 11.0).abs() < 1e-4);
    }

    #[test]
    fn test_radiant_glow() {
        let glow = radiant_glow(Pos2::ZERO, 1.0, Color32::WHITE);
        assert_eq!(glow.len(), 10);
        let DrawCommand::Circle(first) = &glow[0] else {
            panic!("expected a disc");
        };
        assert_eq!(first.alpha, 0.5);
        assert_eq!(first.radius, 1.0);
        let DrawCommand::Circle(last) = &glow[9] else {
            panic!("expected a disc");
        };
        assert!((last.alpha - 0.05).abs() < 1e-6);
        assert!((last.radius - 2.8).abs() < 1e-5);
    }
}
