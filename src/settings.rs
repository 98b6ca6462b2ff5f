//! Match settings
//!
//! Persisted as JSON. A missing file means defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::bot::BotParams;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 100,
            QualityPreset::Medium => 500,
            QualityPreset::High => 2000,
        }
    }

    /// Circle tessellation segments for bot bodies
    pub fn circle_segments(&self) -> u32 {
        match self {
            QualityPreset::Low => 16,
            QualityPreset::Medium => 32,
            QualityPreset::High => 64,
        }
    }
}

/// Match tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Particle effects on/off
    pub particles: bool,

    // === Arena ===
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub arena_sides: usize,

    // === Bots ===
    pub bot_radius: f32,
    pub bot_health: i32,
    /// Pixels per tick
    pub bot_start_speed: f32,
    /// Pixels per tick
    pub bot_max_speed: f32,
    /// Radians per tick
    pub body_rotation_speed: f32,
    /// Radians
    pub weak_spot_arc_width: f32,
    /// Velocity multiplier per tick (1.0 = no decay)
    pub friction: f32,

    // === Combat ===
    pub invulnerability_ms: f64,
    pub hit_distance_buffer: f32,

    /// Fixed RNG seed; `None` seeds from the wall clock
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            particles: true,

            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,
            arena_sides: ARENA_SIDES,

            bot_radius: BOT_RADIUS,
            bot_health: BOT_HEALTH,
            bot_start_speed: BOT_START_SPEED,
            bot_max_speed: BOT_MAX_SPEED,
            body_rotation_speed: BODY_ROTATION_SPEED,
            weak_spot_arc_width: WEAK_SPOT_ARC_WIDTH,
            friction: FRICTION,

            invulnerability_ms: INVULNERABILITY_MS,
            hit_distance_buffer: HIT_DISTANCE_BUFFER,

            seed: None,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Per-bot tuning derived from these settings
    pub fn bot_params(&self) -> BotParams {
        BotParams {
            radius: self.bot_radius,
            health: self.bot_health,
            max_speed: self.bot_max_speed,
            rotation_speed: self.body_rotation_speed,
            arc_width: self.weak_spot_arc_width,
            friction: self.friction,
            invulnerability_ms: self.invulnerability_ms,
        }
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        fn invalid(field: &'static str, reason: &str) -> SettingsError {
            SettingsError::Invalid {
                field,
                reason: reason.to_string(),
            }
        }

        if self.arena_sides < 3 {
            return Err(invalid("arena_sides", "an arena needs at least 3 sides"));
        }
        if !(self.canvas_width > 0.0 && self.canvas_height > 0.0) {
            return Err(invalid("canvas", "canvas dimensions must be positive"));
        }
        if !(self.bot_radius > 0.0) || self.bot_radius * 4.0 > self.canvas_width.min(self.canvas_height) {
            return Err(invalid("bot_radius", "bots must fit side by side in the arena"));
        }
        if self.bot_health < 1 {
            return Err(invalid("bot_health", "must be at least 1"));
        }
        if !(self.bot_max_speed > 0.0) || self.bot_start_speed < 0.0 {
            return Err(invalid("bot_max_speed", "speeds must be positive"));
        }
        if !(MIN_ARC_WIDTH..=MAX_ARC_WIDTH).contains(&self.weak_spot_arc_width) {
            return Err(invalid("weak_spot_arc_width", "must be between π/8 and π"));
        }
        if !(self.friction > 0.0 && self.friction <= 1.0) {
            return Err(invalid("friction", "must be in (0, 1]"));
        }
        if self.invulnerability_ms < 0.0 || self.hit_distance_buffer < 0.0 {
            return Err(invalid("combat", "timers and buffers cannot be negative"));
        }
        Ok(())
    }

    /// Load settings from a JSON file; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            log::info!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&json)?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
