//! Tree of Life - Kabbalistic Tree of Life diagram engine
//!
//! Provides the diagram model, color scales, SVG export and an egui viewer.

pub mod app;
pub mod config;
pub mod diagram;
pub mod error;

// Re-export commonly used types
pub use config::TreeConfig;
pub use diagram::{
    ColorScheme, ColorTable, DrawList, DrawSurface, RenderOptions, Scene, SephirahTextMode, SvgSurface,
    TreeOfLife, TreeViewer,
};
pub use error::{DiagramWarning, RenderError, SurfaceError, TableError};
