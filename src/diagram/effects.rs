//! Effect Renderer
//!
//! Turns a [`ColorEffect`] into secondary primitives. Speckle scatter is
//! seeded from the element number, so the same element always produces the
//! same dots.

use super::draw::{CirclePrimitive, DrawCommand, LineCap, LinePrimitive};
use super::model::{ColorEffect, EffectKind};
use super::palette::{blend, TINGE_RATIO};
use eframe::egui::{Color32, Pos2, Vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Dots scattered over a sephirah
pub const SEPHIRAH_FLECKS: usize = 50;

/// Dots per diagram unit of path length
pub const PATH_FLECK_DENSITY: f32 = 15.0;

/// Rays around a sephirah
pub const SEPHIRAH_RAYS: usize = 12;

/// Stations along a path that each emit a pair of rays
pub const PATH_RAY_STATIONS: usize = 8;

const FLECK_ALPHA: f32 = 0.8;
const SEPHIRAH_FLECK_Z: f32 = 5.0;
const PATH_FLECK_Z: f32 = 3.0;

const SEPHIRAH_RAY_ALPHA: f32 = 0.6;
const SEPHIRAH_RAY_Z: f32 = 2.0;
const PATH_RAY_ALPHA: f32 = 0.7;
const PATH_RAY_Z: f32 = 2.5;
const PATH_RAY_WIDTH: f32 = 1.5;

/// Secondary primitives plus an optional replacement fill
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectOutput {
    pub commands: Vec<DrawCommand>,

    /// Replaces the base color of the element's own shape
    pub fill: Option<Color32>,
}

/// Effect primitives for a sephirah
pub fn render_sephirah_effect(
    number: u8,
    center: Pos2,
    radius: f32,
    base: Color32,
    effect: &ColorEffect,
) -> EffectOutput {
    let secondary = effect.secondary_color();

    match effect.kind {
        EffectKind::Speckle => EffectOutput {
            commands: speckle_sephirah(number, center, radius, secondary),
            fill: None,
        },
        EffectKind::Radiate => EffectOutput {
            commands: radiate_sephirah(center, radius, secondary),
            fill: None,
        },
        EffectKind::BlendTint => tint(base, secondary),
    }
}

/// Effect primitives for a path between `from` and `to`
pub fn render_path_effect(
    number: u8,
    from: Pos2,
    to: Pos2,
    base: Color32,
    effect: &ColorEffect,
    sphere_scale: f32,
) -> EffectOutput {
    let secondary = effect.secondary_color();

    match effect.kind {
        EffectKind::Speckle => EffectOutput {
            commands: speckle_path(number, from, to, secondary, sphere_scale),
            fill: None,
        },
        EffectKind::Radiate => EffectOutput {
            commands: radiate_path(from, to, secondary, sphere_scale),
            fill: None,
        },
        EffectKind::BlendTint => tint(base, secondary),
    }
}

fn tint(base: Color32, secondary: Color32) -> EffectOutput {
    EffectOutput {
        commands: Vec::new(),
        fill: Some(blend(base, secondary, TINGE_RATIO)),
    }
}

fn uniform(rng: &mut StdRng, low: f32, high: f32) -> f32 {
    low + (high - low) * rng.random::<f32>()
}

fn speckle_sephirah(number: u8, center: Pos2, radius: f32, color: Color32) -> Vec<DrawCommand> {
    let mut rng = StdRng::seed_from_u64(number as u64);

    (0..SEPHIRAH_FLECKS)
        .map(|_| {
            let angle = uniform(&mut rng, 0.0, TAU);
            let distance = uniform(&mut rng, 0.0, radius * 0.9);
            let size = uniform(&mut rng, 0.02, 0.05) * radius;
            let pos = center + Vec2::angled(angle) * distance;
            CirclePrimitive::disc(pos, size, color, FLECK_ALPHA, SEPHIRAH_FLECK_Z).into()
        })
        .collect()
}

fn speckle_path(number: u8, from: Pos2, to: Pos2, color: Color32, sphere_scale: f32) -> Vec<DrawCommand> {
    let delta = to - from;
    let count = (delta.length() * PATH_FLECK_DENSITY).floor() as usize;
    let angle = delta.y.atan2(delta.x);
    let (sin, cos) = angle.sin_cos();
    let mut rng = StdRng::seed_from_u64(number as u64);

    (0..count)
        .map(|_| {
            let t = uniform(&mut rng, 0.1, 0.9);
            let offset = uniform(&mut rng, -0.05, 0.05);
            let size = uniform(&mut rng, 0.01, 0.03) * sphere_scale;
            let pos = Pos2::new(
                from.x + t * delta.x + offset * sin,
                from.y + t * delta.y - offset * cos,
            );
            CirclePrimitive::disc(pos, size, color, FLECK_ALPHA, PATH_FLECK_Z).into()
        })
        .collect()
}

fn radiate_sephirah(center: Pos2, radius: f32, color: Color32) -> Vec<DrawCommand> {
    (0..SEPHIRAH_RAYS)
        .map(|i| {
            let angle = i as f32 * TAU / SEPHIRAH_RAYS as f32;
            LinePrimitive {
                p1: center,
                p2: center + Vec2::angled(angle) * (radius * 1.5),
                color,
                width: radius * 0.1,
                cap: LineCap::Butt,
                alpha: SEPHIRAH_RAY_ALPHA,
                z: SEPHIRAH_RAY_Z,
            }
            .into()
        })
        .collect()
}

fn radiate_path(from: Pos2, to: Pos2, color: Color32, sphere_scale: f32) -> Vec<DrawCommand> {
    let delta = to - from;
    let length = delta.length();
    if length <= f32::EPSILON {
        return Vec::new();
    }

    let normal = Vec2::new(-delta.y, delta.x) / length;
    let ray = normal * (0.2 * sphere_scale);
    let step = 0.6 / (PATH_RAY_STATIONS - 1) as f32;

    (0..PATH_RAY_STATIONS)
        .flat_map(|i| {
            let station = from + delta * (0.2 + step * i as f32);
            [station + ray, station - ray].map(move |end| {
                DrawCommand::from(LinePrimitive {
                    p1: station,
                    p2: end,
                    color,
                    width: PATH_RAY_WIDTH,
                    cap: LineCap::Butt,
                    alpha: PATH_RAY_ALPHA,
                    z: PATH_RAY_Z,
                })
            })
        })
        .collect()
}
