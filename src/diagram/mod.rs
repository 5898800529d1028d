//! Tree of Life Diagram Module
//!
//! Diagram engine for the Tree of Life with:
//! - Fixed geometry of ten sephiroth, Da'ath and 22 paths
//! - Liber 777 style color scales loaded from YAML
//! - Speckle, radiate and tint color effects
//! - Focus views on a single sephirah and its neighbours
//! - SVG export and an interactive egui viewer

pub mod color_table;
pub mod draw;
pub mod effects;
pub mod layout;
pub mod model;
pub mod palette;
pub mod resolver;
pub mod svg;
pub mod tree;
pub mod viewer;

pub use color_table::{ColorEntry, ColorScheme, ColorTable, SchemeColors, COLOR_SCALES_FILE};
pub use draw::{CirclePrimitive, DrawCommand, DrawList, DrawSurface, Frame, LinePrimitive, TextPrimitive};
pub use layout::{FocusSet, LayoutConfig, PathLayer};
pub use model::{ColorEffect, EffectKind, NamedColor, Sephirah, TreeModel, TreePath};
pub use palette::DiagramTheme;
pub use resolver::{apply_scheme, ColorTarget};
pub use svg::SvgSurface;
pub use tree::{RenderOptions, Scene, SephirahTextMode, TreeOfLife, DEFAULT_SPACING, DEFAULT_SPHERE_SCALE};
pub use viewer::{EguiSurface, TreeViewer, ViewTransform};
