//! Weak-spot arc geometry
//!
//! The weak spot is derived from a bot's body angle every time it is queried:
//! centered opposite the facing (`body_angle + π`), spanning `width` radians.
//! Containment tests run in degrees, normalized to [0, 360).

use serde::{Deserialize, Serialize};

use crate::{normalize_angle, normalize_degrees};

/// Angular window on a bot's perimeter, in normalized degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeakSpotArc {
    /// Start angle (degrees, [0, 360))
    pub start: f32,
    /// End angle (degrees, [0, 360))
    pub end: f32,
}

impl WeakSpotArc {
    pub fn new(start_deg: f32, end_deg: f32) -> Self {
        Self {
            start: normalize_degrees(start_deg),
            end: normalize_degrees(end_deg),
        }
    }

    /// Arc for a body angle and width, both in radians
    pub fn from_body(body_angle: f32, width: f32) -> Self {
        let center = body_angle + std::f32::consts::PI;
        Self::new(
            (center - width / 2.0).to_degrees(),
            (center + width / 2.0).to_degrees(),
        )
    }

    /// Angular span in degrees (handles wraparound)
    pub fn span(&self) -> f32 {
        let mut span = self.end - self.start;
        if span < 0.0 {
            span += 360.0;
        }
        span
    }

    /// Check if an angle (degrees) is within the arc
    pub fn contains_angle(&self, degrees: f32) -> bool {
        let angle = normalize_degrees(degrees);
        if self.start <= self.end {
            angle >= self.start && angle <= self.end
        } else {
            // Wraps through 0°, e.g. 350° → 10°
            angle >= self.start || angle <= self.end
        }
    }

    /// Start angle in radians, [0, 2π)
    pub fn start_radians(&self) -> f32 {
        normalize_angle(self.start.to_radians())
    }

    /// Span in radians
    pub fn span_radians(&self) -> f32 {
        self.span().to_radians()
    }

    /// Mid-arc direction in radians
    pub fn center_radians(&self) -> f32 {
        normalize_angle(self.start_radians() + self.span_radians() / 2.0)
    }
}
