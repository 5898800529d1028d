//! Property tests for the diagram engine

use eframe::egui::{Color32, Pos2};
use proptest::prelude::*;
use tree_of_life::diagram::color_table::{ColorScheme, ColorTable};
use tree_of_life::diagram::draw::{DrawCommand, LineCap, StrokeStyle};
use tree_of_life::diagram::effects::render_sephirah_effect;
use tree_of_life::diagram::layout::{FocusSet, PathLayer, DAATH_FOCUS, SEPHIRAH_Z};
use tree_of_life::diagram::model::{ColorEffect, EffectKind, NamedColor, TreeModel, DEFAULT_COLORS};
use tree_of_life::diagram::resolver::{apply_scheme, ColorTarget};
use tree_of_life::diagram::tree::{RenderOptions, TreeOfLife};

const KING_ONLY: &str = r##"
scales:
  king:
    sephiroth:
      - { number: 1, hex: "#FFFFFF" }
      - number: 6
        hex: "#FFB6C1"
        effect: { type: rayed, color: gold, hex: "#FFD700" }
    paths:
      - { number: 11, hex: "#FFFF99" }
      - number: 25
        hex: "#0000FF"
        effect: { type: flecked, color: gold, hex: "#FFD700" }
"##;

fn king_table() -> ColorTable {
    ColorTable::from_yaml_str(KING_ONLY).unwrap()
}

fn absent_scheme() -> impl Strategy<Value = ColorScheme> {
    prop_oneof![
        Just(ColorScheme::Queen),
        Just(ColorScheme::Prince),
        Just(ColorScheme::Princess),
    ]
}

fn target() -> impl Strategy<Value = ColorTarget> {
    prop_oneof![Just(ColorTarget::Sephiroth), Just(ColorTarget::Paths)]
}

fn any_scheme() -> impl Strategy<Value = ColorScheme> {
    prop_oneof![Just(ColorScheme::Plain), Just(ColorScheme::King), absent_scheme()]
}

/// Stacking position and layer of each path stroke, plus the position of
/// the first sephirah or Da'ath disc
fn paint_order(tree: &TreeOfLife, options: &RenderOptions) -> (Vec<(usize, PathLayer, bool)>, Option<usize>) {
    let model = tree.model();
    let outer_width = tree.layout_config().path_outer_width * tree.sphere_scale();
    let radius = model.radius();
    let scene = tree.compose(options);

    let mut strokes = Vec::new();
    let mut first_disc = None;
    for (i, command) in scene.commands.sorted().into_iter().enumerate() {
        match command {
            DrawCommand::Line(line) if line.cap == LineCap::Round => {
                if let Some(path) = model
                    .paths
                    .values()
                    .find(|p| model.endpoints(p) == Some((line.p1, line.p2)))
                {
                    strokes.push((i, PathLayer::of(path.number), line.width == outer_width));
                }
            }
            DrawCommand::Circle(c) if (c.z == SEPHIRAH_Z && c.radius == radius) || c.style == StrokeStyle::Dashed => {
                first_disc.get_or_insert(i);
            }
            _ => {}
        }
    }
    (strokes, first_disc)
}

proptest! {
    #[test]
    fn model_build_is_deterministic(scale in 0.1f32..5.0, spacing in 0.1f32..5.0) {
        let a = TreeModel::build(scale, spacing);
        let b = TreeModel::build(scale, spacing);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn plain_scheme_is_idempotent(target in target(), first in prop_oneof![Just(ColorScheme::Plain), Just(ColorScheme::King)]) {
        let table = king_table();
        let mut model = TreeModel::build(1.75, 1.5);
        apply_scheme(&mut model, target, first, &table, &DEFAULT_COLORS);

        prop_assert!(apply_scheme(&mut model, target, ColorScheme::Plain, &table, &DEFAULT_COLORS).is_none());
        let once = model.clone();
        apply_scheme(&mut model, target, ColorScheme::Plain, &table, &DEFAULT_COLORS);
        prop_assert_eq!(&once, &model);

        match target {
            ColorTarget::Sephiroth => {
                for s in model.sephiroth.values() {
                    prop_assert_eq!(s.color, DEFAULT_COLORS.sephirah(s.number));
                    prop_assert!(s.effect.is_none());
                }
            }
            ColorTarget::Paths => {
                for p in model.paths.values() {
                    prop_assert_eq!(p.color, DEFAULT_COLORS.path(p.number));
                    prop_assert!(p.effect.is_none());
                }
            }
        }
    }

    #[test]
    fn absent_scheme_is_a_no_op(scheme in absent_scheme(), target in target()) {
        let table = king_table();
        let mut model = TreeModel::build(1.75, 1.5);
        apply_scheme(&mut model, ColorTarget::Sephiroth, ColorScheme::King, &table, &DEFAULT_COLORS);
        apply_scheme(&mut model, ColorTarget::Paths, ColorScheme::King, &table, &DEFAULT_COLORS);
        let before = model.clone();

        let warning = apply_scheme(&mut model, target, scheme, &table, &DEFAULT_COLORS);
        prop_assert!(warning.is_some());
        prop_assert_eq!(before, model);
    }

    #[test]
    fn speckle_is_deterministic(number in 1u8..=10, r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
        let effect = ColorEffect {
            kind: EffectKind::Speckle,
            secondary: Some(NamedColor { name: None, hex: Some(Color32::from_rgb(r, g, b)) }),
            colors: Vec::new(),
        };
        let center = Pos2::new(0.0, number as f32);
        let first = render_sephirah_effect(number, center, 0.875, Color32::WHITE, &effect);
        let second = render_sephirah_effect(number, center, 0.875, Color32::WHITE, &effect);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn paths_paint_under_sephiroth_in_layer_order(
        sephiroth in any_scheme(),
        paths in any_scheme(),
        focus in prop::option::of(0u8..=11),
    ) {
        let mut tree = TreeOfLife::new(1.75, 1.5, king_table());
        tree.set_sephiroth_scheme(sephiroth);
        tree.set_path_scheme(paths);
        let options = RenderOptions { focus, ..RenderOptions::default() };

        let (strokes, first_disc) = paint_order(&tree, &options);
        let last_stroke = strokes.iter().map(|(i, _, _)| *i).max();
        prop_assert!(last_stroke.is_some());
        prop_assert!(first_disc.is_some());
        prop_assert!(last_stroke < first_disc);

        let positions = |layer: PathLayer, outer: Option<bool>| -> Vec<usize> {
            strokes
                .iter()
                .filter(|(_, l, o)| *l == layer && outer.map_or(true, |want| *o == want))
                .map(|(i, _, _)| *i)
                .collect()
        };

        let underneath = positions(PathLayer::Underneath, None);
        let normal = positions(PathLayer::Normal, None);
        if !underneath.is_empty() && !normal.is_empty() {
            prop_assert!(underneath.iter().max() < normal.iter().min());
        }
        for outer in [true, false] {
            let special = positions(PathLayer::Special, Some(outer));
            let normal = positions(PathLayer::Normal, Some(outer));
            if !special.is_empty() && !normal.is_empty() {
                prop_assert!(special.iter().min() > normal.iter().max());
            }
        }
    }

    #[test]
    fn focus_set_follows_connections(focus in 1u8..=10) {
        let model = TreeModel::build(1.75, 1.5);
        let set = FocusSet::for_sephirah(&model, focus).unwrap();
        let index = focus as usize - 1;

        for number in &set.paths {
            let (a, b) = model.path(*number).unwrap().connects();
            prop_assert!(a == index || b == index);
        }
        prop_assert_eq!(set.paths.len(), model.degree(focus));

        // Every path leads to a distinct neighbour
        prop_assert_eq!(set.sephiroth.len(), set.paths.len() + 1);
        let daath = usize::from(DAATH_FOCUS.contains(&focus));
        prop_assert_eq!(set.node_count(), set.paths.len() + 1 + daath);
    }
}
