//! SVG Surface
//!
//! Writes draw commands as a standalone SVG document. Diagram units are
//! mapped into the canvas with equal x/y scale (the viewport is centered
//! when aspect ratios differ) and y flipped to grow downward. Widths and
//! font sizes given in points are converted with `dpi / 72`.

use super::draw::{CirclePrimitive, DrawSurface, Frame, LineCap, LinePrimitive, StrokeStyle, TextPrimitive};
use super::palette::to_hex;
use crate::error::SurfaceError;
use eframe::egui::{Color32, Pos2, Rect, Vec2};
use std::fmt::Write;
use std::path::{Path, PathBuf};

const TITLE_SIZE_PT: f32 = 14.0;

/// Collects SVG markup and optionally writes it to a file on `finish`
#[derive(Debug, Default)]
pub struct SvgSurface {
    path: Option<PathBuf>,
    svg: String,
    mapping: Option<Mapping>,
    elements: usize,
}

#[derive(Debug, Clone, Copy)]
struct Mapping {
    viewport: Rect,
    offset: Vec2,
    /// Pixels per diagram unit
    scale: f32,
    /// Pixels per point
    point: f32,
}

impl Mapping {
    fn new(frame: &Frame) -> Self {
        let size = frame.pixel_size();
        let viewport = frame.viewport;
        let scale = if viewport.width() > 0.0 && viewport.height() > 0.0 {
            (size.x / viewport.width()).min(size.y / viewport.height())
        } else {
            1.0
        };
        let offset = (size - viewport.size() * scale) / 2.0;

        Self {
            viewport,
            offset,
            scale,
            point: frame.point_scale(),
        }
    }

    fn to_px(&self, p: Pos2) -> Pos2 {
        Pos2::new(
            self.offset.x + (p.x - self.viewport.min.x) * self.scale,
            self.offset.y + (self.viewport.max.y - p.y) * self.scale,
        )
    }
}

impl SvgSurface {
    /// Surface that writes `path` when the render finishes
    pub fn create(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Surface that only keeps the markup
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Markup written so far
    pub fn contents(&self) -> &str {
        &self.svg
    }

    /// Primitives drawn since `begin`
    pub fn element_count(&self) -> usize {
        self.elements
    }

    fn mapping(&self) -> Result<Mapping, SurfaceError> {
        self.mapping
            .ok_or_else(|| SurfaceError::Backend("SVG surface used before begin".to_string()))
    }
}

fn opacity(color: Color32, alpha: f32) -> f32 {
    alpha.clamp(0.0, 1.0) * color.a() as f32 / 255.0
}

fn escape_xml(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

impl DrawSurface for SvgSurface {
    fn begin(&mut self, frame: &Frame) -> Result<(), SurfaceError> {
        let size = frame.pixel_size();
        let mapping = Mapping::new(frame);
        self.svg.clear();
        self.elements = 0;

        write!(
            self.svg,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{:.0}\" height=\"{:.0}\" viewBox=\"0 0 {:.0} {:.0}\" font-family=\"DejaVu Sans, sans-serif\">\n",
            size.x, size.y, size.x, size.y,
        )?;
        write!(
            self.svg,
            "  <rect width=\"100%\" height=\"100%\" fill=\"{}\" />\n",
            to_hex(frame.background)
        )?;

        if let Some(ref title) = frame.title {
            let font = TITLE_SIZE_PT * mapping.point;
            write!(
                self.svg,
                "  <text x=\"{:.1}\" y=\"{:.1}\" fill=\"#000000\" font-size=\"{:.1}\" text-anchor=\"middle\" dominant-baseline=\"hanging\">{}</text>\n",
                size.x / 2.0,
                font * 0.5,
                font,
                escape_xml(title)
            )?;
        }

        self.mapping = Some(mapping);
        Ok(())
    }

    fn draw_line(&mut self, line: &LinePrimitive) -> Result<(), SurfaceError> {
        let mapping = self.mapping()?;
        let p1 = mapping.to_px(line.p1);
        let p2 = mapping.to_px(line.p2);
        let cap = match line.cap {
            LineCap::Round => "round",
            LineCap::Butt => "butt",
        };

        write!(
            self.svg,
            "  <line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{:.2}\" stroke-linecap=\"{}\" stroke-opacity=\"{:.3}\" />\n",
            p1.x,
            p1.y,
            p2.x,
            p2.y,
            to_hex(line.color),
            line.width * mapping.point,
            cap,
            opacity(line.color, line.alpha)
        )?;
        self.elements += 1;
        Ok(())
    }

    fn draw_circle(&mut self, circle: &CirclePrimitive) -> Result<(), SurfaceError> {
        let mapping = self.mapping()?;
        let center = mapping.to_px(circle.center);

        let fill = match circle.fill {
            Some(color) => format!(
                "fill=\"{}\" fill-opacity=\"{:.3}\"",
                to_hex(color),
                opacity(color, circle.alpha)
            ),
            None => "fill=\"none\"".to_string(),
        };
        let stroke = match circle.edge {
            Some(color) if circle.edge_width > 0.0 => {
                let width = circle.edge_width * mapping.point;
                let dash = match circle.style {
                    StrokeStyle::Solid => String::new(),
                    StrokeStyle::Dashed => format!(" stroke-dasharray=\"{:.1} {:.1}\"", width * 3.7, width * 1.6),
                };
                format!(
                    "stroke=\"{}\" stroke-width=\"{:.2}\" stroke-opacity=\"{:.3}\"{}",
                    to_hex(color),
                    width,
                    opacity(color, circle.alpha),
                    dash
                )
            }
            _ => "stroke=\"none\"".to_string(),
        };

        write!(
            self.svg,
            "  <circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" {} {} />\n",
            center.x,
            center.y,
            circle.radius * mapping.scale,
            fill,
            stroke
        )?;
        self.elements += 1;
        Ok(())
    }

    fn draw_text(&mut self, text: &TextPrimitive) -> Result<(), SurfaceError> {
        let mapping = self.mapping()?;
        let pos = mapping.to_px(text.pos);
        let size = text.size * mapping.point;
        let lines: Vec<&str> = text.text.split('\n').collect();
        let line_height = size * 1.2;
        let start_y = pos.y - line_height * (lines.len() as f32 - 1.0) / 2.0;

        let rotate = if text.rotation != 0.0 {
            format!(" transform=\"rotate({:.2} {:.2} {:.2})\"", -text.rotation, pos.x, pos.y)
        } else {
            String::new()
        };

        write!(
            self.svg,
            "  <text x=\"{:.2}\" fill=\"{}\" fill-opacity=\"{:.3}\" font-size=\"{:.2}\" font-weight=\"{}\" text-anchor=\"middle\"{}>\n",
            pos.x,
            to_hex(text.color),
            opacity(text.color, text.alpha),
            size,
            if text.bold { "bold" } else { "normal" },
            rotate
        )?;
        for (idx, line) in lines.iter().enumerate() {
            write!(
                self.svg,
                "    <tspan x=\"{:.2}\" y=\"{:.2}\" dominant-baseline=\"middle\">{}</tspan>\n",
                pos.x,
                start_y + line_height * idx as f32,
                escape_xml(line)
            )?;
        }
        self.svg.push_str("  </text>\n");
        self.elements += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SurfaceError> {
        self.svg.push_str("</svg>\n");

        if let Some(ref path) = self.path {
            std::fs::write(path, &self.svg)?;
            log::info!("Diagram saved to {}", path.display());
        }
        Ok(())
    }
}
