//! Tree of Life Diagram
//!
//! [`TreeOfLife`] owns the model, the loaded color table and the display
//! settings. `compose` turns them into a [`Scene`]; `render` replays that
//! scene on any [`DrawSurface`].

use super::color_table::{ColorScheme, ColorTable};
use super::draw::{CirclePrimitive, DrawList, DrawSurface, Frame, LineCap, LinePrimitive, StrokeStyle, TextPrimitive};
use super::effects::{render_path_effect, render_sephirah_effect, EffectOutput};
use super::layout::{
    canvas_size, focus_bounds, path_label, radiant_glow, FocusSet, LayoutConfig, PathLayer, DAATH_TEXT_Z,
    DAATH_Z, PATH_INNER_Z, PATH_LABEL_Z, PATH_OUTER_Z, SEPHIRAH_TEXT_Z, SEPHIRAH_Z,
};
use super::model::{DefaultColors, Sephirah, TreeModel, DAATH};
use super::palette::{contrasting_text_color, DiagramTheme};
use super::resolver::{apply_scheme, ColorTarget};
use crate::error::{DiagramWarning, Result};
use eframe::egui::{Align2, Color32, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Default sphere scale
pub const DEFAULT_SPHERE_SCALE: f32 = 1.75;

/// Default spacing between sephiroth
pub const DEFAULT_SPACING: f32 = 1.5;

/// What is written inside each sephirah
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SephirahTextMode {
    /// The sephirah number; Da'ath stays blank
    #[default]
    Number,
    /// I Ching trigram
    Trigram,
    /// Hebrew name
    Hebrew,
    /// Planetary glyph
    Planet,
}

impl SephirahTextMode {
    pub const ALL: [SephirahTextMode; 4] = [
        SephirahTextMode::Number,
        SephirahTextMode::Trigram,
        SephirahTextMode::Hebrew,
        SephirahTextMode::Planet,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "number" | "numbers" => Some(SephirahTextMode::Number),
            "trigram" | "trigrams" => Some(SephirahTextMode::Trigram),
            "hebrew" => Some(SephirahTextMode::Hebrew),
            "planet" | "planets" => Some(SephirahTextMode::Planet),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SephirahTextMode::Number => "Number",
            SephirahTextMode::Trigram => "Trigram",
            SephirahTextMode::Hebrew => "Hebrew",
            SephirahTextMode::Planet => "Planet",
        }
    }

    /// Text for sephirah `number` (0 is Da'ath), `None` when blank
    pub fn text(&self, number: u8) -> Option<String> {
        let glyph = match self {
            SephirahTextMode::Number => {
                return (number != DAATH).then(|| number.to_string());
            }
            SephirahTextMode::Trigram => trigram(number),
            SephirahTextMode::Hebrew => hebrew(number),
            SephirahTextMode::Planet => planet(number),
        };
        glyph.map(str::to_string)
    }

    /// Font size in points
    pub fn font_size(&self, sphere_scale: f32) -> f32 {
        let base = match self {
            SephirahTextMode::Number => 12.0,
            SephirahTextMode::Trigram | SephirahTextMode::Planet => 14.0,
            SephirahTextMode::Hebrew => 10.0,
        };
        base * sphere_scale
    }
}

impl fmt::Display for SephirahTextMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn trigram(number: u8) -> Option<&'static str> {
    Some(match number {
        0 => "☰",
        1 => "☯",
        2 => "⚊",
        3 => "⚋",
        4 => "☱",
        5 => "☳",
        6 => "☲",
        7 => "☶",
        8 => "☴",
        9 => "☵",
        10 => "☷",
        _ => return None,
    })
}

// Stored reversed; the surfaces lay text out left to right
fn hebrew(number: u8) -> Option<&'static str> {
    Some(match number {
        0 => "תעד",
        1 => "רתכ",
        2 => "המכח",
        3 => "הניב",
        4 => "דסח",
        5 => "הרובג",
        6 => "תראפת",
        7 => "חצנ",
        8 => "דוה",
        9 => "דוסי",
        10 => "תוכלמ",
        _ => return None,
    })
}

fn planet(number: u8) -> Option<&'static str> {
    Some(match number {
        0 => "♆",
        1 => "♇",
        2 => "♅",
        3 => "♄",
        4 => "♃",
        5 => "♂",
        6 => "☉",
        7 => "♀",
        8 => "☿",
        9 => "☽",
        10 => "⊕",
        _ => return None,
    })
}

/// Parameters of one render call
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Sephirah to zoom on; anything outside 1-10 renders the full tree
    pub focus: Option<u8>,

    /// Figure size in inches (width, height)
    pub figsize: [f32; 2],

    pub dpi: u32,

    pub show_title: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            focus: None,
            figsize: [7.5, 11.0],
            dpi: 300,
            show_title: false,
        }
    }
}

impl RenderOptions {
    pub fn focused(number: u8) -> Self {
        Self {
            focus: Some(number),
            ..Self::default()
        }
    }
}

/// A composed diagram, ready to replay
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Visible region in diagram units
    pub viewport: Rect,

    /// Figure size in inches
    pub canvas: Vec2,

    pub dpi: u32,

    pub background: Color32,

    pub title: Option<String>,

    pub commands: DrawList,
}

impl Scene {
    pub fn frame(&self) -> Frame {
        Frame {
            viewport: self.viewport,
            canvas: self.canvas,
            dpi: self.dpi,
            background: self.background,
            title: self.title.clone(),
        }
    }
}

/// A diagram instance
#[derive(Debug, Clone)]
pub struct TreeOfLife {
    model: TreeModel,
    color_table: ColorTable,
    defaults: DefaultColors,
    theme: DiagramTheme,
    layout: LayoutConfig,
    sephiroth_scheme: ColorScheme,
    path_scheme: ColorScheme,
    text_mode: SephirahTextMode,
    show_sephirah_text: bool,
    show_path_text: bool,
    warnings: Vec<DiagramWarning>,
}

impl Default for TreeOfLife {
    fn default() -> Self {
        Self::new(DEFAULT_SPHERE_SCALE, DEFAULT_SPACING, ColorTable::new())
    }
}

impl TreeOfLife {
    /// Create a diagram in the plain scheme
    pub fn new(sphere_scale: f32, spacing: f32, color_table: ColorTable) -> Self {
        Self {
            model: TreeModel::build(sphere_scale, spacing),
            color_table,
            defaults: DefaultColors::default(),
            theme: DiagramTheme::default(),
            layout: LayoutConfig::default(),
            sephiroth_scheme: ColorScheme::Plain,
            path_scheme: ColorScheme::Plain,
            text_mode: SephirahTextMode::Number,
            show_sephirah_text: true,
            show_path_text: true,
            warnings: Vec::new(),
        }
    }

    /// Create a diagram with colors loaded from `path`. A load problem is
    /// kept in [`TreeOfLife::warnings`].
    pub fn with_color_scales(sphere_scale: f32, spacing: f32, path: impl AsRef<Path>) -> Self {
        let (table, warning) = ColorTable::load(path);
        let mut tree = Self::new(sphere_scale, spacing, table);
        tree.warnings.extend(warning);
        tree
    }

    pub fn model(&self) -> &TreeModel {
        &self.model
    }

    pub fn color_table(&self) -> &ColorTable {
        &self.color_table
    }

    pub fn theme(&self) -> &DiagramTheme {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: DiagramTheme) {
        self.theme = theme;
    }

    pub fn layout_config(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn sphere_scale(&self) -> f32 {
        self.model.sphere_scale()
    }

    pub fn spacing(&self) -> f32 {
        self.model.spacing()
    }

    pub fn sephiroth_scheme(&self) -> ColorScheme {
        self.sephiroth_scheme
    }

    pub fn path_scheme(&self) -> ColorScheme {
        self.path_scheme
    }

    pub fn text_mode(&self) -> SephirahTextMode {
        self.text_mode
    }

    pub fn sephirah_text_visible(&self) -> bool {
        self.show_sephirah_text
    }

    pub fn path_text_visible(&self) -> bool {
        self.show_path_text
    }

    /// Warnings collected since construction
    pub fn warnings(&self) -> &[DiagramWarning] {
        &self.warnings
    }

    /// Keep a warning raised outside the diagram, such as a table load
    pub fn record_warning(&mut self, warning: Option<DiagramWarning>) {
        self.warnings.extend(warning);
    }

    /// Plain plus every scheme the table provides
    pub fn available_schemes(&self) -> Vec<ColorScheme> {
        std::iter::once(ColorScheme::Plain)
            .chain(self.color_table.schemes())
            .collect()
    }

    pub fn set_sephiroth_scheme(&mut self, scheme: ColorScheme) -> Option<DiagramWarning> {
        self.sephiroth_scheme = scheme;
        self.apply(ColorTarget::Sephiroth, scheme)
    }

    pub fn set_path_scheme(&mut self, scheme: ColorScheme) -> Option<DiagramWarning> {
        self.path_scheme = scheme;
        self.apply(ColorTarget::Paths, scheme)
    }

    fn apply(&mut self, target: ColorTarget, scheme: ColorScheme) -> Option<DiagramWarning> {
        let warning = apply_scheme(&mut self.model, target, scheme, &self.color_table, &self.defaults);
        if let Some(ref w) = warning {
            self.warnings.push(w.clone());
        }
        warning
    }

    pub fn set_sephiroth_text_mode(&mut self, mode: SephirahTextMode) {
        self.text_mode = mode;
    }

    pub fn set_sephiroth_text_visible(&mut self, visible: bool) {
        self.show_sephirah_text = visible;
    }

    pub fn set_path_text_visible(&mut self, visible: bool) {
        self.show_path_text = visible;
    }

    /// Recompute geometry for new scale parameters. Colors are kept.
    pub fn rebuild(&mut self, sphere_scale: f32, spacing: f32) {
        self.model.rescale(sphere_scale, spacing);
    }

    /// Build the draw list for one render. Does not touch the model.
    pub fn compose(&self, options: &RenderOptions) -> Scene {
        let focus = options
            .focus
            .and_then(|n| FocusSet::for_sephirah(&self.model, n));

        let (viewport, canvas) = match &focus {
            Some(set) => {
                let viewport = focus_bounds(&self.model, set, &self.layout);
                (viewport, canvas_size(viewport, options.figsize))
            }
            None => (self.layout.full_viewport, Vec2::from(options.figsize)),
        };

        let mut commands = DrawList::new();
        self.compose_paths(&mut commands, focus.as_ref());
        self.compose_sephiroth(&mut commands, focus.as_ref());
        self.compose_daath(&mut commands, focus.as_ref());

        let title = match (&focus, options.show_title) {
            (Some(set), true) => self
                .model
                .sephirah(set.focus)
                .map(|s| format!("Focus on {} (Sephirah {})", s.name, s.number)),
            _ => None,
        };

        log::debug!(
            "Composed {} commands (focus: {:?})",
            commands.len(),
            focus.as_ref().map(|f| f.focus)
        );

        Scene {
            viewport,
            canvas,
            dpi: options.dpi,
            background: self.theme.canvas_bg,
            title,
            commands,
        }
    }

    /// Compose and paint on `surface`
    pub fn render<S: DrawSurface>(&self, options: &RenderOptions, surface: &mut S) -> Result<()> {
        let scene = self.compose(options);
        scene.commands.replay(&scene.frame(), surface)?;
        Ok(())
    }

    fn compose_paths(&self, commands: &mut DrawList, focus: Option<&FocusSet>) {
        let scale = self.model.sphere_scale();

        // Underneath inner strokes share z with normal outer strokes, so
        // emission order settles the tie
        for layer in [PathLayer::Underneath, PathLayer::Normal, PathLayer::Special] {
            let paths = self
                .model
                .paths
                .values()
                .filter(|p| PathLayer::of(p.number) == layer)
                .filter(|p| focus.map_or(true, |f| f.shows_path(p.number)));

            for path in paths {
                let Some((from, to)) = self.model.endpoints(path) else {
                    continue;
                };
                let grayed = focus.map_or(false, |f| f.is_grayed(path));

                let effect = match (&path.effect, grayed) {
                    (Some(effect), false) => {
                        render_path_effect(path.number, from, to, path.color, effect, scale)
                    }
                    _ => EffectOutput::default(),
                };

                let (inner, label_color) = if grayed {
                    (self.theme.muted_path_inner, self.theme.muted_label)
                } else {
                    let fill = effect.fill.unwrap_or(path.color);
                    (fill, contrasting_text_color(fill))
                };

                let shift = layer.z_shift();
                commands.push(LinePrimitive {
                    p1: from,
                    p2: to,
                    color: self.theme.outline,
                    width: self.layout.path_outer_width * scale,
                    cap: LineCap::Round,
                    alpha: 1.0,
                    z: PATH_OUTER_Z + shift,
                });
                commands.push(LinePrimitive {
                    p1: from,
                    p2: to,
                    color: inner,
                    width: self.layout.path_inner_width * scale,
                    cap: LineCap::Round,
                    alpha: 1.0,
                    z: PATH_INNER_Z + shift,
                });
                commands.extend(effect.commands);

                if self.show_path_text {
                    let label = path_label(&self.layout, path.number, from, to, self.model.spacing());
                    commands.push(TextPrimitive {
                        pos: label.anchor,
                        text: label.text,
                        color: label_color,
                        size: self.layout.path_label_size * scale,
                        align: Align2::CENTER_CENTER,
                        rotation: label.rotation,
                        bold: true,
                        alpha: 1.0,
                        z: PATH_LABEL_Z,
                    });
                }
            }
        }
    }

    fn compose_sephiroth(&self, commands: &mut DrawList, focus: Option<&FocusSet>) {
        let scale = self.model.sphere_scale();
        let radius = self.model.radius();

        for sephirah in self.model.sephiroth.values() {
            if !focus.map_or(true, |f| f.shows_sephirah(sephirah.number)) {
                continue;
            }
            let full_color = focus.map_or(true, |f| f.focus == sephirah.number);

            let text_color = if full_color {
                let effect = self.sephirah_effect(sephirah);
                let fill = effect.fill.unwrap_or(sephirah.color);
                commands.push(CirclePrimitive {
                    center: sephirah.position,
                    radius,
                    fill: Some(fill),
                    edge: Some(self.theme.outline),
                    edge_width: self.layout.border_width * scale,
                    alpha: 1.0,
                    style: StrokeStyle::Solid,
                    z: SEPHIRAH_Z,
                });
                commands.extend(effect.commands);
                contrasting_text_color(fill)
            } else {
                commands.push(CirclePrimitive {
                    center: sephirah.position,
                    radius,
                    fill: Some(self.theme.muted_fill),
                    edge: Some(self.theme.muted_stroke),
                    edge_width: self.layout.border_width * scale,
                    alpha: 1.0,
                    style: StrokeStyle::Solid,
                    z: SEPHIRAH_Z,
                });
                self.theme.muted_stroke
            };

            if self.show_sephirah_text {
                if let Some(text) = self.text_mode.text(sephirah.number) {
                    commands.push(TextPrimitive {
                        pos: sephirah.position,
                        text,
                        color: text_color,
                        size: self.text_mode.font_size(scale),
                        align: Align2::CENTER_CENTER,
                        rotation: 0.0,
                        bold: true,
                        alpha: 1.0,
                        z: SEPHIRAH_TEXT_Z,
                    });
                }
            }

            if sephirah.number == 1 && full_color {
                commands.extend(radiant_glow(sephirah.position, radius, self.theme.glow));
            }
        }
    }

    fn compose_daath(&self, commands: &mut DrawList, focus: Option<&FocusSet>) {
        if !focus.map_or(true, |f| f.include_daath) {
            return;
        }

        let daath = &self.model.daath;
        let scale = self.model.sphere_scale();
        let effect = self.sephirah_effect(daath);
        let fill = effect.fill.unwrap_or(daath.color);
        let (edge, text_color) = match focus {
            Some(_) => (self.theme.muted_stroke, self.theme.muted_stroke),
            None => (self.theme.outline, contrasting_text_color(fill)),
        };

        commands.push(CirclePrimitive {
            center: daath.position,
            radius: self.model.radius(),
            fill: Some(fill),
            edge: Some(edge),
            edge_width: self.layout.border_width * self.layout.daath_border_ratio * scale,
            alpha: self.layout.daath_alpha,
            style: StrokeStyle::Dashed,
            z: DAATH_Z,
        });
        commands.extend(effect.commands);

        if self.show_sephirah_text {
            if let Some(text) = self.text_mode.text(DAATH) {
                commands.push(TextPrimitive {
                    pos: daath.position,
                    text,
                    color: text_color,
                    size: self.text_mode.font_size(scale),
                    align: Align2::CENTER_CENTER,
                    rotation: 0.0,
                    bold: true,
                    alpha: self.layout.daath_alpha,
                    z: DAATH_TEXT_Z,
                });
            }
        }
    }

    fn sephirah_effect(&self, sephirah: &Sephirah) -> EffectOutput {
        match &sephirah.effect {
            Some(effect) => render_sephirah_effect(
                sephirah.number,
                sephirah.position,
                self.model.radius(),
                sephirah.color,
                effect,
            ),
            None => EffectOutput::default(),
        }
    }
}
