//! Color Resolver
//!
//! Applies a color scheme to the sephiroth or the paths of a model.
//!
//! Two missing-data rules apply at different granularities: a scheme that
//! is absent from the table leaves everything untouched and warns, while an
//! element absent from a present scheme silently keeps what it had.

use super::color_table::{ColorScheme, ColorTable};
use super::model::{DefaultColors, TreeModel, DAATH};
use crate::error::DiagramWarning;

/// Which collection a scheme is applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTarget {
    Sephiroth,
    Paths,
}

/// Apply `scheme` to one collection of `model`
pub fn apply_scheme(
    model: &mut TreeModel,
    target: ColorTarget,
    scheme: ColorScheme,
    table: &ColorTable,
    defaults: &DefaultColors,
) -> Option<DiagramWarning> {
    if !scheme.is_symbolic() {
        reset_to_defaults(model, target, defaults);
        return None;
    }

    let Some(colors) = table.scheme(scheme) else {
        let warning = DiagramWarning::UnknownScheme {
            scheme: scheme.table_key().to_string(),
        };
        log::debug!("{}", warning);
        return Some(warning);
    };

    match target {
        ColorTarget::Sephiroth => {
            for (number, sephirah) in model.sephiroth.iter_mut() {
                if let Some(entry) = colors.sephiroth.get(number) {
                    sephirah.color = entry.color;
                    sephirah.effect = entry.effect.clone();
                }
            }
            if let Some(entry) = colors.sephiroth.get(&DAATH) {
                model.daath.color = entry.color;
                model.daath.effect = entry.effect.clone();
            }
        }
        ColorTarget::Paths => {
            for (number, path) in model.paths.iter_mut() {
                if let Some(entry) = colors.paths.get(number) {
                    path.color = entry.color;
                    path.effect = entry.effect.clone();
                }
            }
        }
    }

    log::debug!("Applied {} to {:?}", scheme, target);
    None
}

fn reset_to_defaults(model: &mut TreeModel, target: ColorTarget, defaults: &DefaultColors) {
    match target {
        ColorTarget::Sephiroth => {
            for (number, sephirah) in model.sephiroth.iter_mut() {
                sephirah.color = defaults.sephirah(*number);
                sephirah.effect = None;
            }
            model.daath.color = defaults.sephirah(DAATH);
            model.daath.effect = None;
        }
        ColorTarget::Paths => {
            for (number, path) in model.paths.iter_mut() {
                path.color = defaults.path(*number);
                path.effect = None;
            }
        }
    }
}
