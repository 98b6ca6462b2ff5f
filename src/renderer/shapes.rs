//! Shape generation for 2D primitives

use glam::Vec2;
use std::f32::consts::PI;

use super::frame::{BotView, RenderFrame};
use super::vertex::{Vertex, with_alpha};
use crate::sim::Color;
use crate::sim::particles::colors;

/// Arena outline thickness in pixels
const WALL_THICKNESS: f32 = 4.0;
/// Weak-spot band thickness in pixels
const WEAK_SPOT_THICKNESS: f32 = 5.0;
/// Opacity multiplier while invulnerable
const INVULNERABLE_ALPHA: f32 = 0.5;
/// Arc band segments per radian
const ARC_SEGMENTS_PER_RADIAN: f32 = 8.0;

fn push_quad(vertices: &mut Vec<Vertex>, a: Vec2, b: Vec2, c: Vec2, d: Vec2, color: Color) {
    // a-b on one side, c-d on the other
    vertices.push(Vertex::new(a.x, a.y, color));
    vertices.push(Vertex::new(b.x, b.y, color));
    vertices.push(Vertex::new(c.x, c.y, color));

    vertices.push(Vertex::new(c.x, c.y, color));
    vertices.push(Vertex::new(b.x, b.y, color));
    vertices.push(Vertex::new(d.x, d.y, color));
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: Color, segments: u32) -> Vec<Vertex> {
    ellipse(center, radius, radius, 0.0, color, segments)
}

/// Filled ellipse with semi-axes `rx` (along `rotation`) and `ry`
pub fn ellipse(
    center: Vec2,
    rx: f32,
    ry: f32,
    rotation: f32,
    color: Color,
    segments: u32,
) -> Vec<Vertex> {
    let segments = segments.max(3);
    let mut vertices = Vec::with_capacity((segments * 3) as usize);
    let axes = Vec2::from_angle(rotation);
    let point = |theta: f32| center + axes.rotate(Vec2::new(rx * theta.cos(), ry * theta.sin()));

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;
        let p1 = point(theta1);
        let p2 = point(theta2);

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(p1.x, p1.y, color));
        vertices.push(Vertex::new(p2.x, p2.y, color));
    }

    vertices
}

/// Thick band between two radii, from `start` sweeping `span` radians
pub fn arc_band(
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    start: f32,
    span: f32,
    color: Color,
) -> Vec<Vertex> {
    let num_segments = ((span * ARC_SEGMENTS_PER_RADIAN) as u32).max(4);
    let mut vertices = Vec::with_capacity((num_segments * 6) as usize);

    for i in 0..num_segments {
        let theta1 = start + (i as f32 / num_segments as f32) * span;
        let theta2 = start + ((i + 1) as f32 / num_segments as f32) * span;
        let dir1 = Vec2::from_angle(theta1);
        let dir2 = Vec2::from_angle(theta2);

        push_quad(
            &mut vertices,
            center + dir1 * inner_radius,
            center + dir1 * outer_radius,
            center + dir2 * inner_radius,
            center + dir2 * outer_radius,
            color,
        );
    }

    vertices
}

/// Closed polygon outline, `thickness` pixels wide, drawn inward
pub fn polygon_outline(points: &[Vec2], center: Vec2, thickness: f32, color: Color) -> Vec<Vertex> {
    if points.len() < 2 {
        return Vec::new();
    }

    let mut vertices = Vec::with_capacity(points.len() * 6);
    let inset = |p: Vec2| p + (center - p).normalize_or_zero() * thickness;

    for (i, &a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        push_quad(&mut vertices, a, inset(a), b, inset(b), color);
    }

    vertices
}

fn bot_vertices(bot: &BotView, segments: u32, out: &mut Vec<Vertex>) {
    let mut alpha = bot.alpha;
    if bot.invulnerable {
        alpha *= INVULNERABLE_ALPHA;
    }
    if alpha <= 0.0 {
        return;
    }

    // Compressed along travel, stretched across it
    let along = bot.radius * bot.squash;
    let across = bot.radius / bot.squash.max(f32::EPSILON);
    out.extend(ellipse(
        bot.position,
        along,
        across,
        bot.heading,
        with_alpha(bot.color, alpha),
        segments,
    ));

    if bot.show_weak_spot {
        out.extend(arc_band(
            bot.position,
            bot.radius - WEAK_SPOT_THICKNESS,
            bot.radius,
            bot.arc.start_radians(),
            bot.arc.span_radians(),
            with_alpha(colors::WEAK_SPOT, alpha),
        ));
    }
}

/// Triangle list for a whole frame: arena, particles, then bots on top
pub fn tessellate(frame: &RenderFrame, circle_segments: u32) -> Vec<Vertex> {
    let mut vertices = polygon_outline(
        &frame.arena_vertices,
        frame.arena_center,
        WALL_THICKNESS,
        colors::ARENA_WALL,
    );

    for particle in &frame.particles {
        if particle.size > 0.0 && particle.color[3] > 0.0 {
            vertices.extend(circle(particle.position, particle.size, particle.color, 6));
        }
    }

    for bot in &frame.bots {
        bot_vertices(bot, circle_segments, &mut vertices);
    }

    vertices
}
