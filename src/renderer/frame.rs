//! Per-frame render snapshot

use glam::Vec2;
use serde::Serialize;

use crate::sim::{Color, GameState, Outcome, WeakSpotArc};

/// How a bot should be drawn this frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BotView {
    pub id: usize,
    pub position: Vec2,
    pub radius: f32,
    pub color: Color,
    /// Direction of travel, radians; squash compresses along it
    pub heading: f32,
    pub arc: WeakSpotArc,
    pub invulnerable: bool,
    pub squash: f32,
    /// After the tweak's draw hook
    pub alpha: f32,
    pub show_weak_spot: bool,
    pub health: i32,
    pub max_health: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticleView {
    pub position: Vec2,
    /// Alpha already faded by remaining life
    pub color: Color,
    pub size: f32,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderFrame {
    pub arena_center: Vec2,
    pub arena_vertices: Vec<Vec2>,
    pub bots: Vec<BotView>,
    pub particles: Vec<ParticleView>,
    pub outcome: Option<Outcome>,
    pub elapsed_ms: f64,
}

impl RenderFrame {
    /// Snapshot `state`, running each bot's draw hook at `now_ms`
    pub fn capture(state: &GameState, now_ms: f64) -> Self {
        let bots = state
            .bots
            .iter()
            .map(|bot| {
                let draw = bot.draw_state(now_ms);
                BotView {
                    id: bot.id,
                    position: bot.position,
                    radius: bot.radius,
                    color: bot.color,
                    heading: bot.heading,
                    arc: bot.weak_spot_arc(),
                    invulnerable: bot.is_invulnerable(now_ms),
                    squash: bot.squash_scale,
                    alpha: draw.alpha,
                    show_weak_spot: draw.show_weak_spot,
                    health: bot.health,
                    max_health: bot.max_health,
                }
            })
            .collect();

        let particles = state
            .particles
            .iter()
            .map(|p| ParticleView {
                position: p.pos,
                color: [p.color[0], p.color[1], p.color[2], p.color[3] * p.life.clamp(0.0, 1.0)],
                size: p.size,
            })
            .collect();

        Self {
            arena_center: state.arena.center,
            arena_vertices: state.arena.vertices.clone(),
            bots,
            particles,
            outcome: state.match_state.outcome,
            elapsed_ms: state.match_state.elapsed_ms,
        }
    }
}
