//! Achilles Arena - two bots, one octagon, one weak spot each
//!
//! Core modules:
//! - `sim`: Simulation (arena geometry, bots, collisions, combat, tick pipeline)
//! - `tweaks`: Per-bot gameplay modifiers and their registry
//! - `authoring`: Boundary to the external tweak generator and critic
//! - `controller`: Match lifecycle and fixed-step loop driver
//! - `renderer`: Per-frame render snapshot and tessellation
//! - `platform`: Wall clock abstraction
//! - `settings`: Data-driven match tuning

pub mod authoring;
pub mod controller;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tweaks;

pub use controller::{GameLoop, MatchController};
pub use settings::{QualityPreset, Settings, SettingsError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    use std::f32::consts::PI;

    /// Nominal tick duration in seconds (the host drives ~60 Hz frames)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Nominal tick duration in milliseconds
    pub const TICK_MS: f64 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Canvas defaults
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 600.0;
    /// Gap between the arena and the canvas edge
    pub const ARENA_MARGIN: f32 = 20.0;
    pub const ARENA_SIDES: usize = 8;

    /// Bot defaults (distances in pixels, speeds in pixels per tick)
    pub const BOT_RADIUS: f32 = 30.0;
    pub const BOT_START_SPEED: f32 = 5.0;
    pub const BOT_MAX_SPEED: f32 = 8.0;
    pub const BOT_HEALTH: i32 = 3;
    /// Weak-spot rotation per tick (radians)
    pub const BODY_ROTATION_SPEED: f32 = 0.02;
    /// Weak-spot arc width (radians)
    pub const WEAK_SPOT_ARC_WIDTH: f32 = 0.6 * PI;
    pub const MIN_ARC_WIDTH: f32 = PI / 8.0;
    pub const MAX_ARC_WIDTH: f32 = PI;
    /// Velocity multiplier per tick (1.0 = no decay)
    pub const FRICTION: f32 = 1.0;
    /// Largest multiplier a scripted speed effect may apply
    pub const MAX_SPEED_FACTOR: f32 = 2.0;
    /// Travel per tick is capped at this fraction of the bot radius
    pub const MAX_STEP_RADIUS_RATIO: f32 = 0.5;
    /// Heading only follows velocity above this speed
    pub const HEADING_MIN_SPEED: f32 = 0.1;

    /// Combat
    pub const INVULNERABILITY_MS: f64 = 1000.0;
    pub const HIT_DISTANCE_BUFFER: f32 = 10.0;

    /// Regeneration tweak interval
    pub const REGEN_INTERVAL_MS: f64 = 60_000.0;

    /// Squash animation
    pub const SQUASH_MIN_SCALE: f32 = 0.8;
    pub const SQUASH_RECOVERY: f32 = 0.02;

    /// Particles
    pub const PARTICLE_LIFE_DECAY: f32 = 0.02;
    pub const PARTICLE_SIZE_DECAY: f32 = 0.96;
    pub const WALL_PARTICLES: usize = 5;
    pub const HIT_PARTICLES: usize = 20;
    pub const REGEN_PARTICLES: usize = 10;
}

/// Normalize angle to [0, 2π)
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(std::f32::consts::TAU);
    // rem_euclid can round up to TAU for tiny negative inputs
    if wrapped >= std::f32::consts::TAU {
        0.0
    } else {
        wrapped
    }
}

/// Normalize angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}
