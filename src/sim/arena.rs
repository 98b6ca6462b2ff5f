//! Polygon arena geometry
//!
//! The arena is a regular polygon approximating a circle. Vertices are listed
//! in increasing angle order, and each consecutive pair plus the wrap-around
//! pair forms a wall edge.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{ARENA_MARGIN, ARENA_SIDES};
use crate::polar_to_cartesian;

/// Convex regular polygon arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena {
    pub center: Vec2,
    /// Circumradius
    pub radius: f32,
    pub vertices: Vec<Vec2>,
}

impl Arena {
    pub fn new(sides: usize, radius: f32, center: Vec2) -> Self {
        Self {
            center,
            radius,
            vertices: generate_vertices(sides, radius, center),
        }
    }

    /// Arena sized to fit a canvas with a margin on the shorter side
    pub fn for_canvas(width: f32, height: f32, sides: usize) -> Self {
        let center = Vec2::new(width / 2.0, height / 2.0);
        let radius = (width.min(height) / 2.0 - ARENA_MARGIN).max(0.0);
        Self::new(sides, radius, center)
    }

    pub fn sides(&self) -> usize {
        self.vertices.len()
    }

    /// Iterate wall edges in order, including the closing edge
    pub fn edges(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Distance from the center to the middle of each edge
    pub fn inradius(&self) -> f32 {
        let n = self.sides().max(3) as f32;
        self.radius * (std::f32::consts::PI / n).cos()
    }

    /// Whether a point lies inside (or on) the polygon
    pub fn contains(&self, point: Vec2) -> bool {
        // Convex: same side of every edge as the center
        self.edges().all(|(a, b)| {
            let edge = b - a;
            let to_point = point - a;
            let to_center = self.center - a;
            edge.perp_dot(to_point) * edge.perp_dot(to_center) >= 0.0
        })
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::for_canvas(
            crate::consts::CANVAS_WIDTH,
            crate::consts::CANVAS_HEIGHT,
            ARENA_SIDES,
        )
    }
}

/// Vertices of a regular polygon, vertex `i` at angle `2πi/sides`
pub fn generate_vertices(sides: usize, radius: f32, center: Vec2) -> Vec<Vec2> {
    (0..sides)
        .map(|i| {
            let theta = std::f32::consts::TAU * i as f32 / sides as f32;
            center + polar_to_cartesian(radius, theta)
        })
        .collect()
}

/// Closest point to `p` on segment `[a, b]`
///
/// A zero-length segment collapses to `a`.
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.dot(ab);
    if len_sq == 0.0 {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}
