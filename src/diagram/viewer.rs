//! Interactive Tree of Life Viewer
//!
//! Native egui rendering of a composed [`Scene`] with:
//! - Pan and zoom (mouse wheel + secondary/middle drag)
//! - Hover highlight on sephiroth
//! - Click a sephirah to request focus on it

use super::draw::{CirclePrimitive, DrawCommand, DrawSurface, Frame, LineCap, LinePrimitive, StrokeStyle, TextPrimitive};
use super::model::DAATH;
use super::palette::{with_alpha, DiagramTheme};
use super::tree::{RenderOptions, Scene, TreeOfLife};
use crate::error::SurfaceError;
use eframe::egui::{self, emath::Rot2, epaint::TextShape, Align2, FontId, Painter, Pos2, Rect, Sense, Shape, Stroke, Vec2};

const CIRCLE_SEGMENTS: usize = 96;

/// Diagram to screen mapping for one frame
#[derive(Debug, Clone, Copy)]
pub struct ViewTransform {
    /// Diagram point shown at `anchor`
    center: Pos2,
    anchor: Pos2,
    /// Pixels per diagram unit
    scale: f32,
    /// Pixels per point
    point: f32,
}

impl ViewTransform {
    /// Fit `frame` into `rect`, then apply pan and zoom
    pub fn fit(frame: &Frame, rect: Rect, pan: Vec2, zoom: f32) -> Self {
        let viewport = frame.viewport;
        let fit = if viewport.width() > 0.0 && viewport.height() > 0.0 {
            (rect.width() / viewport.width()).min(rect.height() / viewport.height())
        } else {
            1.0
        };
        let scale = fit * zoom;

        // Points per diagram unit at the figure's own size
        let canvas_points = frame.canvas * 72.0;
        let points_per_unit = (canvas_points.x / viewport.width().max(f32::EPSILON))
            .min(canvas_points.y / viewport.height().max(f32::EPSILON));

        Self {
            center: viewport.center(),
            anchor: rect.center() + pan,
            scale,
            point: scale / points_per_unit.max(f32::EPSILON),
        }
    }

    pub fn to_screen(&self, world: Pos2) -> Pos2 {
        Pos2::new(
            self.anchor.x + (world.x - self.center.x) * self.scale,
            self.anchor.y - (world.y - self.center.y) * self.scale,
        )
    }

    pub fn to_world(&self, screen: Pos2) -> Pos2 {
        Pos2::new(
            self.center.x + (screen.x - self.anchor.x) / self.scale,
            self.center.y - (screen.y - self.anchor.y) / self.scale,
        )
    }

    /// Convert a size in points to pixels
    pub fn points(&self, pt: f32) -> f32 {
        pt * self.point
    }
}

/// Paints draw commands onto an egui painter
pub struct EguiSurface<'a> {
    painter: &'a Painter,
    rect: Rect,
    pan: Vec2,
    zoom: f32,
    transform: Option<ViewTransform>,
}

impl<'a> EguiSurface<'a> {
    pub fn new(painter: &'a Painter, rect: Rect, pan: Vec2, zoom: f32) -> Self {
        Self {
            painter,
            rect,
            pan,
            zoom,
            transform: None,
        }
    }

    /// Transform established by `begin`
    pub fn transform(&self) -> Option<ViewTransform> {
        self.transform
    }

    fn active(&self) -> Result<ViewTransform, SurfaceError> {
        self.transform
            .ok_or_else(|| SurfaceError::Backend("egui surface used before begin".to_string()))
    }
}

impl DrawSurface for EguiSurface<'_> {
    fn begin(&mut self, frame: &Frame) -> Result<(), SurfaceError> {
        let transform = ViewTransform::fit(frame, self.rect, self.pan, self.zoom);
        self.painter.rect_filled(self.rect, 0.0, frame.background);

        if let Some(ref title) = frame.title {
            self.painter.text(
                Pos2::new(self.rect.center().x, self.rect.min.y + 8.0),
                Align2::CENTER_TOP,
                title,
                FontId::proportional(16.0),
                egui::Color32::BLACK,
            );
        }

        self.transform = Some(transform);
        Ok(())
    }

    fn draw_line(&mut self, line: &LinePrimitive) -> Result<(), SurfaceError> {
        let t = self.active()?;
        let color = with_alpha(line.color, line.alpha);
        let width = t.points(line.width);
        let (p1, p2) = (t.to_screen(line.p1), t.to_screen(line.p2));

        self.painter.line_segment([p1, p2], Stroke::new(width, color));
        if line.cap == LineCap::Round {
            self.painter.circle_filled(p1, width / 2.0, color);
            self.painter.circle_filled(p2, width / 2.0, color);
        }
        Ok(())
    }

    fn draw_circle(&mut self, circle: &CirclePrimitive) -> Result<(), SurfaceError> {
        let t = self.active()?;
        let center = t.to_screen(circle.center);
        let radius = circle.radius * t.scale;

        if let Some(fill) = circle.fill {
            self.painter.circle_filled(center, radius, with_alpha(fill, circle.alpha));
        }

        if let Some(edge) = circle.edge {
            let stroke = Stroke::new(t.points(circle.edge_width), with_alpha(edge, circle.alpha));
            match circle.style {
                StrokeStyle::Solid => {
                    self.painter.circle_stroke(center, radius, stroke);
                }
                StrokeStyle::Dashed => {
                    let points: Vec<Pos2> = (0..=CIRCLE_SEGMENTS)
                        .map(|i| {
                            let angle = i as f32 * std::f32::consts::TAU / CIRCLE_SEGMENTS as f32;
                            center + Vec2::angled(angle) * radius
                        })
                        .collect();
                    let dash = stroke.width * 3.7;
                    let gap = stroke.width * 1.6;
                    self.painter.extend(Shape::dashed_line(&points, stroke, dash, gap));
                }
            }
        }
        Ok(())
    }

    fn draw_text(&mut self, text: &TextPrimitive) -> Result<(), SurfaceError> {
        let t = self.active()?;
        let color = with_alpha(text.color, text.alpha);
        let font = FontId::proportional(t.points(text.size).max(1.0));
        let galley = self.painter.layout_no_wrap(text.text.clone(), font, color);

        // Screen y points down, so counter-clockwise turns negative
        let angle = -text.rotation.to_radians();
        let anchor = t.to_screen(text.pos);
        let half = galley.size() / 2.0;
        let origin = anchor - Rot2::from_angle(angle) * half;

        self.painter
            .add(TextShape::new(origin, galley, color).with_angle(angle));
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SurfaceError> {
        Ok(())
    }
}

/// Tree of Life viewer widget
pub struct TreeViewer {
    /// Current pan offset
    pub pan: Vec2,

    /// Current zoom level (1.0 = fit)
    pub zoom: f32,

    /// Minimum zoom level
    pub min_zoom: f32,

    /// Maximum zoom level
    pub max_zoom: f32,

    /// Sephirah under the pointer
    pub hovered: Option<u8>,

    /// Render or paint error message
    error: Option<String>,
}

impl Default for TreeViewer {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeViewer {
    pub fn new() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: 0.25,
            max_zoom: 8.0,
            hovered: None,
            error: None,
        }
    }

    /// Reset pan and zoom
    pub fn fit_to_view(&mut self) {
        self.pan = Vec2::ZERO;
        self.zoom = 1.0;
    }

    /// Paint `tree` and return the sephirah clicked this frame, if any
    pub fn ui(&mut self, ui: &mut egui::Ui, tree: &TreeOfLife, options: &RenderOptions) -> Option<u8> {
        let available_size = ui.available_size();
        let (response, painter) = ui.allocate_painter(available_size, Sense::click_and_drag());
        let rect = response.rect;

        self.handle_input(ui, &response);

        let scene = tree.compose(options);
        let frame = scene.frame();
        let mut surface = EguiSurface::new(&painter, rect, self.pan, self.zoom);
        self.error = scene
            .commands
            .replay(&frame, &mut surface)
            .err()
            .map(|e| e.to_string());

        let transform = ViewTransform::fit(&frame, rect, self.pan, self.zoom);
        let mut clicked = None;

        self.hovered = response
            .hover_pos()
            .map(|pos| transform.to_world(pos))
            .and_then(|world| self.visible_sephirah_at(tree, &scene, world));

        if let Some(number) = self.hovered {
            self.draw_hover(&painter, tree, number, &transform);
            if response.clicked() {
                clicked = Some(number);
            }
        }

        painter.text(
            rect.left_bottom() + Vec2::new(8.0, -8.0),
            Align2::LEFT_BOTTOM,
            format!("{:.0}%", self.zoom * 100.0),
            FontId::monospace(11.0),
            tree.theme().muted_stroke,
        );

        if let Some(ref error) = self.error {
            Self::draw_error(&painter, rect, error, tree.theme());
        }

        clicked
    }

    fn handle_input(&mut self, ui: &egui::Ui, response: &egui::Response) {
        let input = ui.input(|i| i.clone());

        if response.hovered() {
            let scroll_delta = input.smooth_scroll_delta.y;
            if scroll_delta != 0.0 {
                let zoom_delta = 1.0 + scroll_delta * 0.001;
                self.zoom = (self.zoom * zoom_delta).clamp(self.min_zoom, self.max_zoom);
            }
        }

        if response.dragged_by(egui::PointerButton::Middle)
            || response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Primary)
        {
            self.pan += response.drag_delta();
        }

        if response.hovered() && input.key_pressed(egui::Key::F) {
            self.fit_to_view();
        }
    }

    /// Only sephiroth present in the scene can be picked
    fn visible_sephirah_at(&self, tree: &TreeOfLife, scene: &Scene, world: Pos2) -> Option<u8> {
        let number = tree.model().sephirah_at(world)?;
        let position = tree.model().sephirah(number)?.position;
        let shown = scene.commands.iter().any(|c| match c {
            DrawCommand::Circle(circle) => circle.center == position,
            _ => false,
        });
        // Da'ath cannot be focused
        (shown && number != DAATH).then_some(number)
    }

    fn draw_hover(&self, painter: &Painter, tree: &TreeOfLife, number: u8, transform: &ViewTransform) {
        let Some(sephirah) = tree.model().sephirah(number) else {
            return;
        };
        let center = transform.to_screen(sephirah.position);
        let radius = tree.model().radius() * transform.scale * 1.08;
        painter.circle_stroke(center, radius, Stroke::new(2.5, tree.theme().highlight));

        painter.text(
            center + Vec2::new(0.0, radius + 4.0),
            Align2::CENTER_TOP,
            sephirah.name,
            FontId::proportional(13.0),
            tree.theme().highlight,
        );
    }

    fn draw_error(painter: &Painter, rect: Rect, error: &str, theme: &DiagramTheme) {
        let error_rect = Rect::from_center_size(rect.center(), Vec2::new(400.0, 60.0));
        painter.rect_filled(error_rect, 8.0, egui::Color32::from_rgb(60, 20, 20));
        painter.rect_stroke(error_rect, 8.0, Stroke::new(2.0, theme.error));

        painter.text(
            error_rect.center(),
            Align2::CENTER_CENTER,
            format!("⚠ {}", error),
            FontId::proportional(14.0),
            theme.error,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Frame {
        Frame {
            viewport: Rect::from_min_max(Pos2::new(-4.0, -3.5), Pos2::new(4.0, 15.0)),
            canvas: Vec2::new(7.5, 11.0),
            dpi: 300,
            background: egui::Color32::WHITE,
            title: None,
        }
    }

    #[test]
    fn test_transform_round_trip() {
        let rect = Rect::from_min_size(Pos2::new(100.0, 50.0), Vec2::new(400.0, 925.0));
        let t = ViewTransform::fit(&frame(), rect, Vec2::new(12.0, -7.0), 1.5);

        let world = Pos2::new(1.25, 9.0);
        let back = t.to_world(t.to_screen(world));
        assert!((back.x - world.x).abs() < 1e-3 && (back.y - world.y).abs() < 1e-3);
    }

    #[test]
    fn test_transform_flips_y() {
        let rect = Rect::from_min_size(Pos2::ZERO, Vec2::new(400.0, 925.0));
        let t = ViewTransform::fit(&frame(), rect, Vec2::ZERO, 1.0);

        let top = t.to_screen(Pos2::new(0.0, 15.0));
        let bottom = t.to_screen(Pos2::new(0.0, -3.5));
        assert!(top.y < bottom.y);
        assert!((top.y - 0.0).abs() < 1e-3);
        assert!((bottom.y - 925.0).abs() < 1e-3);
    }

    #[test]
    fn test_viewer_defaults() {
        let mut viewer = TreeViewer::new();
        viewer.zoom = 3.0;
        viewer.pan = Vec2::new(5.0, 5.0);
        viewer.fit_to_view();
        assert_eq!(viewer.zoom, 1.0);
        assert_eq!(viewer.pan, Vec2::ZERO);
        assert!(viewer.hovered.is_none());
    }
}
