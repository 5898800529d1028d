//! Diagram Configuration
//!
//! A YAML document with four sections. Every section and field falls back to
//! its default when missing, so a partial file is valid. Files ending in
//! `.toml` are read and written as TOML instead.

use crate::diagram::color_table::{ColorScheme, ColorTable};
use crate::diagram::tree::{RenderOptions, SephirahTextMode, TreeOfLife, DEFAULT_SPACING, DEFAULT_SPHERE_SCALE};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name
pub const CONFIG_FILE: &str = "tree_config.yaml";

const HEADER: &str = "# Tree of Life configuration\n# Missing sections and fields take their defaults\n";

/// Complete diagram configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub basic: BasicConfig,
    pub color_schemes: ColorSchemeConfig,
    pub text_display: TextDisplayConfig,
    pub rendering: RenderingConfig,
}

/// Geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicConfig {
    pub sphere_scale_factor: f32,
    pub spacing_factor: f32,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            sphere_scale_factor: DEFAULT_SPHERE_SCALE,
            spacing_factor: DEFAULT_SPACING,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorSchemeConfig {
    pub sephiroth: ColorScheme,
    pub path: ColorScheme,
}

impl Default for ColorSchemeConfig {
    fn default() -> Self {
        Self {
            sephiroth: ColorScheme::King,
            path: ColorScheme::King,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextDisplayConfig {
    pub sephiroth_mode: SephirahTextMode,
    pub sephiroth_visible: bool,
    pub path_visible: bool,
}

impl Default for TextDisplayConfig {
    fn default() -> Self {
        Self {
            sephiroth_mode: SephirahTextMode::Number,
            sephiroth_visible: true,
            path_visible: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderingConfig {
    /// Sephirah to zoom on, 1-10
    pub focus_sephirah: Option<u8>,

    /// Figure size in inches
    pub figsize: [f32; 2],

    pub dpi: u32,

    pub show_title: bool,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        let options = RenderOptions::default();
        Self {
            focus_sephirah: options.focus,
            figsize: options.figsize,
            dpi: options.dpi,
            show_title: options.show_title,
        }
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

impl TreeConfig {
    /// Load a config document
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;

        let config = if is_toml(path) {
            toml::from_str(&content).with_context(|| format!("Invalid TOML in {}", path.display()))?
        } else {
            Self::from_yaml_str(&content).with_context(|| format!("Invalid YAML in {}", path.display()))?
        };

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse a YAML document. An empty document gives the defaults.
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(source)?)
    }

    /// Save with a short comment header
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let body = if is_toml(path) {
            toml::to_string_pretty(self)?
        } else {
            serde_yml::to_string(self)?
        };

        std::fs::write(path, format!("{}{}", HEADER, body))
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        log::info!("Config saved to {}", path.display());
        Ok(())
    }

    /// `<config_dir>/tree-of-life/tree_config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("tree-of-life").join(CONFIG_FILE))
    }

    /// Capture the settings of a live diagram
    pub fn from_tree(tree: &TreeOfLife, options: &RenderOptions) -> Self {
        Self {
            basic: BasicConfig {
                sphere_scale_factor: tree.sphere_scale(),
                spacing_factor: tree.spacing(),
            },
            color_schemes: ColorSchemeConfig {
                sephiroth: tree.sephiroth_scheme(),
                path: tree.path_scheme(),
            },
            text_display: TextDisplayConfig {
                sephiroth_mode: tree.text_mode(),
                sephiroth_visible: tree.sephirah_text_visible(),
                path_visible: tree.path_text_visible(),
            },
            rendering: RenderingConfig {
                focus_sephirah: options.focus,
                figsize: options.figsize,
                dpi: options.dpi,
                show_title: options.show_title,
            },
        }
    }

    /// Build a diagram from this config. Scheme warnings end up in
    /// [`TreeOfLife::warnings`].
    pub fn build_tree(&self, color_table: ColorTable) -> TreeOfLife {
        let mut tree = TreeOfLife::new(
            self.basic.sphere_scale_factor,
            self.basic.spacing_factor,
            color_table,
        );

        tree.set_sephiroth_scheme(self.color_schemes.sephiroth);
        tree.set_path_scheme(self.color_schemes.path);
        tree.set_sephiroth_text_mode(self.text_display.sephiroth_mode);
        tree.set_sephiroth_text_visible(self.text_display.sephiroth_visible);
        tree.set_path_text_visible(self.text_display.path_visible);
        tree
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            focus: self.rendering.focus_sephirah,
            figsize: self.rendering.figsize,
            dpi: self.rendering.dpi,
            show_title: self.rendering.show_title,
        }
    }
}
