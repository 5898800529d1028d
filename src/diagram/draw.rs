//! Draw Commands
//!
//! The compositor produces an explicit list of primitives tagged with a
//! stacking order. Backends implement [`DrawSurface`] and only replay the
//! list; they never make layout or color decisions.
//!
//! Coordinates are diagram units with y growing upward. Line widths, edge
//! widths and font sizes are in points.

use crate::error::SurfaceError;
use eframe::egui::{Align2, Color32, Pos2, Rect, Vec2};

/// End cap of a stroked line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCap {
    Round,
    Butt,
}

/// Stroke pattern of a circle's edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeStyle {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinePrimitive {
    pub p1: Pos2,
    pub p2: Pos2,
    pub color: Color32,
    /// Stroke width in points
    pub width: f32,
    pub cap: LineCap,
    pub alpha: f32,
    pub z: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CirclePrimitive {
    pub center: Pos2,
    /// Radius in diagram units
    pub radius: f32,
    /// `None` leaves the disc unfilled
    pub fill: Option<Color32>,
    /// `None` draws no edge
    pub edge: Option<Color32>,
    /// Edge width in points
    pub edge_width: f32,
    pub alpha: f32,
    pub style: StrokeStyle,
    pub z: f32,
}

impl CirclePrimitive {
    /// A filled disc without an edge
    pub fn disc(center: Pos2, radius: f32, fill: Color32, alpha: f32, z: f32) -> Self {
        Self {
            center,
            radius,
            fill: Some(fill),
            edge: None,
            edge_width: 0.0,
            alpha,
            style: StrokeStyle::Solid,
            z,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextPrimitive {
    pub pos: Pos2,
    /// May contain `\n` for stacked labels
    pub text: String,
    pub color: Color32,
    /// Font size in points
    pub size: f32,
    pub align: Align2,
    /// Counter-clockwise rotation in degrees
    pub rotation: f32,
    pub bold: bool,
    pub alpha: f32,
    pub z: f32,
}

/// One drawing instruction
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Line(LinePrimitive),
    Circle(CirclePrimitive),
    Text(TextPrimitive),
}

impl DrawCommand {
    /// Stacking order; higher draws on top
    pub fn z(&self) -> f32 {
        match self {
            DrawCommand::Line(line) => line.z,
            DrawCommand::Circle(circle) => circle.z,
            DrawCommand::Text(text) => text.z,
        }
    }

    /// Send this command to a surface
    pub fn draw_on(&self, surface: &mut dyn DrawSurface) -> Result<(), SurfaceError> {
        match self {
            DrawCommand::Line(line) => surface.draw_line(line),
            DrawCommand::Circle(circle) => surface.draw_circle(circle),
            DrawCommand::Text(text) => surface.draw_text(text),
        }
    }
}

impl From<LinePrimitive> for DrawCommand {
    fn from(line: LinePrimitive) -> Self {
        DrawCommand::Line(line)
    }
}

impl From<CirclePrimitive> for DrawCommand {
    fn from(circle: CirclePrimitive) -> Self {
        DrawCommand::Circle(circle)
    }
}

impl From<TextPrimitive> for DrawCommand {
    fn from(text: TextPrimitive) -> Self {
        DrawCommand::Text(text)
    }
}

/// Commands in emission order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: impl Into<DrawCommand>) {
        self.commands.push(command.into());
    }

    pub fn extend(&mut self, commands: impl IntoIterator<Item = DrawCommand>) {
        self.commands.extend(commands);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Commands in emission order
    pub fn iter(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter()
    }

    /// Commands in paint order: ascending z, ties kept in emission order
    pub fn sorted(&self) -> Vec<&DrawCommand> {
        let mut ordered: Vec<&DrawCommand> = self.commands.iter().collect();
        ordered.sort_by(|a, b| a.z().total_cmp(&b.z()));
        ordered
    }

    /// Paint every command on `surface` in stacking order
    pub fn replay(&self, frame: &Frame, surface: &mut dyn DrawSurface) -> Result<(), SurfaceError> {
        surface.begin(frame)?;
        for command in self.sorted() {
            command.draw_on(surface)?;
        }
        surface.finish()
    }
}

impl<'a> IntoIterator for &'a DrawList {
    type Item = &'a DrawCommand;
    type IntoIter = std::slice::Iter<'a, DrawCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

/// Everything a surface needs before the first primitive
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Visible region in diagram units
    pub viewport: Rect,

    /// Figure size in inches
    pub canvas: Vec2,

    pub dpi: u32,

    pub background: Color32,

    pub title: Option<String>,
}

impl Frame {
    /// Canvas size in pixels
    pub fn pixel_size(&self) -> Vec2 {
        self.canvas * self.dpi as f32
    }

    /// Pixels per point
    pub fn point_scale(&self) -> f32 {
        self.dpi as f32 / 72.0
    }
}

/// A backend that can paint primitives
pub trait DrawSurface {
    fn begin(&mut self, frame: &Frame) -> Result<(), SurfaceError>;

    fn draw_line(&mut self, line: &LinePrimitive) -> Result<(), SurfaceError>;

    fn draw_circle(&mut self, circle: &CirclePrimitive) -> Result<(), SurfaceError>;

    fn draw_text(&mut self, text: &TextPrimitive) -> Result<(), SurfaceError>;

    fn finish(&mut self) -> Result<(), SurfaceError>;
}
