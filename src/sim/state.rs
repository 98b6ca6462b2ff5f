//! Match state and core simulation types

use std::sync::Arc;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::arena::Arena;
use super::bot::Bot;
use super::particles::ParticleSystem;
use crate::settings::Settings;
use crate::tweaks::{TweakContext, TweakPlugin};

/// Maximum number of events kept in the match log
pub const MAX_EVENT_LOG: usize = 256;

/// How a match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Bot id of the survivor
    Winner(usize),
    /// Both bots died in the same tick
    Draw,
}

/// Lifecycle flags and timing for one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    pub running: bool,
    pub outcome: Option<Outcome>,
    /// Wall clock at match start (ms)
    pub start_ms: f64,
    /// Wall clock elapsed since start (ms), frozen once over
    pub elapsed_ms: f64,
}

impl MatchState {
    pub fn new(start_ms: f64) -> Self {
        Self {
            running: true,
            outcome: None,
            start_ms,
            elapsed_ms: 0.0,
        }
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }
}

/// Notable things that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MatchEvent {
    WallBounce { bot: usize },
    BotCollision,
    Hit {
        attacker: usize,
        defender: usize,
        health_left: i32,
    },
    /// Weak spot was struck during the invulnerability window
    HitAbsorbed { attacker: usize, defender: usize },
    Regenerated { bot: usize, health: i32 },
    MatchOver { outcome: Outcome },
}

/// Everything one match needs
#[derive(Debug)]
pub struct GameState {
    pub arena: Arena,
    pub bots: [Bot; 2],
    /// Visual particles (not gameplay-affecting)
    pub particles: ParticleSystem,
    pub rng: Pcg32,
    pub match_state: MatchState,
    /// Recent events, oldest first
    pub events: Vec<MatchEvent>,
    /// Extra reach allowed when testing a weak-spot hit
    pub hit_buffer: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl GameState {
    /// Spawn both bots and run their tweaks' init hooks
    ///
    /// `settings` must already have passed [`Settings::validate`];
    /// `MatchController::new` enforces that.
    pub fn new(
        settings: &Settings,
        tweaks: [Arc<dyn TweakPlugin>; 2],
        seed: u64,
        now_ms: f64,
    ) -> Self {
        debug_assert!(settings.validate().is_ok(), "unvalidated settings");
        let arena = Arena::for_canvas(
            settings.canvas_width,
            settings.canvas_height,
            settings.arena_sides,
        );
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut particles = ParticleSystem::new(settings.max_particles());
        let mut events = Vec::new();
        let params = settings.bot_params();

        let [tweak0, tweak1] = tweaks;
        let offset = Vec2::new(arena.radius / 2.0, 0.0);
        let spawns = [
            (0, arena.center - offset, tweak0),
            (1, arena.center + offset, tweak1),
        ];

        let bots = spawns.map(|(id, position, tweak)| {
            let direction = rng.random_range(0.0..std::f32::consts::TAU);
            let velocity = Vec2::from_angle(direction) * settings.bot_start_speed;
            let body_angle = rng.random_range(0.0..std::f32::consts::TAU);
            let mut ctx = TweakContext {
                now_ms,
                particles: &mut particles,
                rng: &mut rng,
                events: &mut events,
            };
            Bot::spawn(id, position, velocity, body_angle, &params, tweak, &mut ctx)
        });

        Self {
            arena,
            bots,
            particles,
            rng,
            match_state: MatchState::new(now_ms),
            events,
            hit_buffer: settings.hit_distance_buffer,
            time_ticks: 0,
        }
    }

    /// Build a state from explicit bots (for scripted scenarios)
    pub fn from_parts(arena: Arena, bots: [Bot; 2], seed: u64, now_ms: f64) -> Self {
        Self {
            arena,
            bots,
            particles: ParticleSystem::new(Settings::default().max_particles()),
            rng: Pcg32::seed_from_u64(seed),
            match_state: MatchState::new(now_ms),
            events: Vec::new(),
            hit_buffer: crate::consts::HIT_DISTANCE_BUFFER,
            time_ticks: 0,
        }
    }

    pub fn bot(&self, id: usize) -> Option<&Bot> {
        self.bots.get(id)
    }

    /// Append events, dropping the oldest beyond the log cap
    pub fn record_events(&mut self, new_events: impl IntoIterator<Item = MatchEvent>) {
        self.events.extend(new_events);
        if self.events.len() > MAX_EVENT_LOG {
            let excess = self.events.len() - MAX_EVENT_LOG;
            self.events.drain(..excess);
        }
    }
}
