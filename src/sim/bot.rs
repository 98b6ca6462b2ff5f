//! Bot entity
//!
//! A bot is a circle with a rotating weak spot. Its tweak is chosen at
//! construction and never changes; the bot delegates lifecycle hooks to it.

use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec2;

use super::arc::WeakSpotArc;
use super::particles::{Color, colors};
use crate::consts::*;
use crate::normalize_angle;
use crate::tweaks::{DrawState, TweakContext, TweakPlugin};

/// Per-bot tuning, copied from settings at spawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BotParams {
    pub radius: f32,
    pub health: i32,
    pub max_speed: f32,
    /// Body rotation per tick (radians)
    pub rotation_speed: f32,
    pub arc_width: f32,
    /// Velocity multiplier per tick
    pub friction: f32,
    pub invulnerability_ms: f64,
}

impl Default for BotParams {
    fn default() -> Self {
        Self {
            radius: BOT_RADIUS,
            health: BOT_HEALTH,
            max_speed: BOT_MAX_SPEED,
            rotation_speed: BODY_ROTATION_SPEED,
            arc_width: WEAK_SPOT_ARC_WIDTH,
            friction: FRICTION,
            invulnerability_ms: INVULNERABILITY_MS,
        }
    }
}

/// One of the two combatants
#[derive(Debug, Clone)]
pub struct Bot {
    /// 0 or 1
    pub id: usize,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    /// May drop to 0 or below to signal death
    pub health: i32,
    pub max_health: i32,
    /// Drives the weak spot; advances every tick, kept in [0, 2π)
    pub body_angle: f32,
    /// Facing derived from velocity direction
    pub heading: f32,
    /// Weak-spot width in radians
    pub weak_spot_arc_width: f32,
    pub max_speed: f32,
    pub rotation_speed: f32,
    pub friction: f32,
    pub invulnerability_ms: f64,
    /// Wall clock of the last applied hit
    pub last_hit_ms: Option<f64>,
    /// Visual squash, (0, 1]; no gameplay effect
    pub squash_scale: f32,
    pub color: Color,
    /// Hit detection ignores this bot until the given wall clock
    pub unhittable_until: Option<f64>,
    /// Tweak bookkeeping scoped to this bot
    tweak_data: HashMap<String, f64>,
    tweak: Arc<dyn TweakPlugin>,
}

impl Bot {
    /// Construct without running the tweak's init hook
    pub fn new(
        id: usize,
        position: Vec2,
        velocity: Vec2,
        body_angle: f32,
        params: &BotParams,
        tweak: Arc<dyn TweakPlugin>,
    ) -> Self {
        Self {
            id,
            position,
            velocity,
            radius: params.radius,
            health: params.health,
            max_health: params.health,
            body_angle,
            heading: velocity.y.atan2(velocity.x),
            weak_spot_arc_width: params.arc_width,
            max_speed: params.max_speed,
            rotation_speed: params.rotation_speed,
            friction: params.friction,
            invulnerability_ms: params.invulnerability_ms,
            last_hit_ms: None,
            squash_scale: 1.0,
            color: if id == 0 { colors::BOT_0 } else { colors::BOT_1 },
            unhittable_until: None,
            tweak_data: HashMap::new(),
            tweak,
        }
    }

    /// Construct and immediately run the tweak's init hook
    pub fn spawn(
        id: usize,
        position: Vec2,
        velocity: Vec2,
        body_angle: f32,
        params: &BotParams,
        tweak: Arc<dyn TweakPlugin>,
        ctx: &mut TweakContext<'_>,
    ) -> Self {
        let mut bot = Self::new(id, position, velocity, body_angle, params, tweak);
        let tweak = Arc::clone(&bot.tweak);
        tweak.on_init(&mut bot, ctx);
        bot.health = bot.health.min(bot.max_health);
        log::debug!(
            "Bot {} spawned with tweak '{}' (r={:.1}, hp={}/{})",
            id,
            tweak.id(),
            bot.radius,
            bot.health,
            bot.max_health
        );
        bot
    }

    pub fn tweak(&self) -> &Arc<dyn TweakPlugin> {
        &self.tweak
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Weak spot for the current body angle
    pub fn weak_spot_arc(&self) -> WeakSpotArc {
        WeakSpotArc::from_body(self.body_angle, self.weak_spot_arc_width)
    }

    pub fn is_invulnerable(&self, now_ms: f64) -> bool {
        self.last_hit_ms
            .is_some_and(|last| now_ms - last < self.invulnerability_ms)
    }

    pub fn is_unhittable(&self, now_ms: f64) -> bool {
        self.unhittable_until.is_some_and(|until| now_ms < until)
    }

    /// Store a tweak value on this bot
    pub fn stash(&mut self, key: &str, value: f64) {
        self.tweak_data.insert(key.to_string(), value);
    }

    pub fn stashed(&self, key: &str) -> Option<f64> {
        self.tweak_data.get(key).copied()
    }

    /// Heal without exceeding max health
    pub fn heal(&mut self, amount: i32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    /// Start the squash animation
    pub fn squash(&mut self) {
        self.squash_scale = SQUASH_MIN_SCALE;
    }

    /// Fastest this bot may travel in one tick
    ///
    /// Never more than half the radius, so a center cannot step over a wall.
    pub fn speed_limit(&self) -> f32 {
        self.max_speed.min(self.radius * MAX_STEP_RADIUS_RATIO)
    }

    /// Scale velocity down to the speed limit, keeping its direction
    pub fn clamp_speed(&mut self) {
        let limit = self.speed_limit();
        let speed = self.velocity.length();
        if speed > limit {
            self.velocity = self.velocity / speed * limit;
        }
    }

    /// Movement, speed clamp and body rotation for one tick
    pub fn integrate(&mut self) {
        self.position += self.velocity;

        if self.velocity.length() > HEADING_MIN_SPEED {
            self.heading = self.velocity.y.atan2(self.velocity.x);
        }

        self.velocity *= self.friction;
        self.clamp_speed();

        self.body_angle = normalize_angle(self.body_angle + self.rotation_speed);

        if self.squash_scale < 1.0 {
            self.squash_scale = (self.squash_scale + SQUASH_RECOVERY).min(1.0);
        }
    }

    /// Run the tweak's per-tick hook
    pub fn run_update_hook(&mut self, dt: f32, ctx: &mut TweakContext<'_>) {
        let tweak = Arc::clone(&self.tweak);
        tweak.on_update(self, dt, ctx);
    }

    /// Run the tweak's collision hook
    pub fn run_collision_hook(&mut self, other: &Bot, ctx: &mut TweakContext<'_>) {
        let tweak = Arc::clone(&self.tweak);
        tweak.on_collision(self, other, ctx);
    }

    /// Apply one point of damage unless still invulnerable
    ///
    /// Returns whether damage was applied.
    pub fn take_damage(&mut self, ctx: &mut TweakContext<'_>) -> bool {
        if self.is_invulnerable(ctx.now_ms) {
            return false;
        }

        self.health -= 1;
        self.last_hit_ms = Some(ctx.now_ms);
        self.squash();
        ctx.particles
            .burst(ctx.rng, self.position, HIT_PARTICLES, colors::HIT, 4.0);

        let tweak = Arc::clone(&self.tweak);
        tweak.on_damage(self, ctx);
        true
    }

    /// Draw state after the tweak's draw hook
    pub fn draw_state(&self, now_ms: f64) -> DrawState {
        let mut draw = DrawState::default();
        self.tweak.on_draw(self, now_ms, &mut draw);
        draw.alpha = draw.alpha.clamp(0.0, 1.0);
        draw
    }
}
