//! Error and warning types for the diagram engine

use std::path::PathBuf;
use thiserror::Error;

/// Recoverable conditions. The engine keeps going with defaults and hands
/// one of these back so the caller can surface it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiagramWarning {
    #[error("Color scales file '{}' not found, using default colors", path.display())]
    ColorTableMissing { path: PathBuf },

    #[error("Color scales file '{}' could not be read: {reason}", path.display())]
    ColorTableUnreadable { path: PathBuf, reason: String },

    #[error("Color scales file '{}' is malformed: {reason}", path.display())]
    ColorTableMalformed { path: PathBuf, reason: String },

    #[error("Color scheme '{scheme}' not found, colors left unchanged")]
    UnknownScheme { scheme: String },
}

/// Failure to parse a color scales document
#[derive(Error, Debug)]
pub enum TableError {
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),
}

/// Failure reported by a drawing surface
#[derive(Error, Debug)]
pub enum SurfaceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    #[error("Surface error: {0}")]
    Backend(String),
}

/// Fatal error for a single render call
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing surface failed: {0}")]
    Surface(#[from] SurfaceError),
}

pub type Result<T> = std::result::Result<T, RenderError>;
