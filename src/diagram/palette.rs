//! Palette for Tree of Life Diagrams
//!
//! Hex parsing, blending and contrast rules shared by the loader, the
//! effect renderer and the compositor.

use eframe::egui::Color32;

/// Brightness at or below which labels are drawn in white
pub const TEXT_CONTRAST_THRESHOLD: f32 = 150.0;

/// Weight of the base color when a tinge is blended in
pub const TINGE_RATIO: f32 = 0.7;

/// Fixed colors used by the compositor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiagramTheme {
    /// Figure background
    pub canvas_bg: Color32,

    /// Outer stroke of every path ribbon and sephirah border
    pub outline: Color32,

    /// Inner stroke used for a grayed path
    pub muted_path_inner: Color32,

    /// Fill of a sephirah that is shown but not focused
    pub muted_fill: Color32,

    /// Border and text of a sephirah that is shown but not focused
    pub muted_stroke: Color32,

    /// Kether's radiant glow
    pub glow: Color32,

    /// Label color on grayed paths
    pub muted_label: Color32,

    /// Hover ring in the interactive viewer
    pub highlight: Color32,

    /// Error banner in the interactive viewer
    pub error: Color32,
}

impl Default for DiagramTheme {
    fn default() -> Self {
        Self::classic()
    }
}

impl DiagramTheme {
    /// The light parchment look of the printed diagrams
    pub const fn classic() -> Self {
        Self {
            canvas_bg: Color32::from_rgb(0xEA, 0xEA, 0xEA),
            outline: Color32::BLACK,
            muted_path_inner: Color32::WHITE,
            muted_fill: Color32::from_rgb(0xE0, 0xE0, 0xE0),
            muted_stroke: Color32::from_rgb(0xAA, 0xAA, 0xAA),
            glow: Color32::WHITE,
            muted_label: Color32::BLACK,
            highlight: Color32::from_rgb(0x4A, 0x90, 0xD9),
            error: Color32::from_rgb(0xF4, 0x47, 0x47),
        }
    }
}

/// Parse a `#RRGGBB` hex string
pub fn parse_hex(color_str: &str) -> Option<Color32> {
    let hex = color_str.trim().trim_start_matches('#');

    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color32::from_rgb(r, g, b))
}

/// Parse a hex string, normalizing anything missing or malformed to white
pub fn hex_or_white(color_str: Option<&str>) -> Color32 {
    color_str.and_then(parse_hex).unwrap_or(Color32::WHITE)
}

/// Format as `#RRGGBB`
pub fn to_hex(color: Color32) -> String {
    format!("#{:02X}{:02X}{:02X}", color.r(), color.g(), color.b())
}

/// Blend two colors; `ratio` is the share of `base`
pub fn blend(base: Color32, other: Color32, ratio: f32) -> Color32 {
    let ratio = ratio.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f32 * ratio + b as f32 * (1.0 - ratio)).round() as u8;
    Color32::from_rgb(
        mix(base.r(), other.r()),
        mix(base.g(), other.g()),
        mix(base.b(), other.b()),
    )
}

/// Perceived brightness (0.299R + 0.587G + 0.114B), 0..=255
pub fn perceived_brightness(color: Color32) -> f32 {
    0.299 * color.r() as f32 + 0.587 * color.g() as f32 + 0.114 * color.b() as f32
}

/// White or black, whichever reads better on `background`
pub fn contrasting_text_color(background: Color32) -> Color32 {
    // Pure bright green reads dark enough by the formula but is not
    if background.r() == 0 && background.g() > 240 && background.b() == 0 {
        return Color32::BLACK;
    }

    if perceived_brightness(background) <= TEXT_CONTRAST_THRESHOLD {
        Color32::WHITE
    } else {
        Color32::BLACK
    }
}

/// Scale a color's alpha by `alpha` (0.0 - 1.0)
pub fn with_alpha(color: Color32, alpha: f32) -> Color32 {
    Color32::from_rgba_unmultiplied(
        color.r(),
        color.g(),
        color.b(),
        (color.a() as f32 * alpha.clamp(0.0, 1.0)).round() as u8,
    )
}
