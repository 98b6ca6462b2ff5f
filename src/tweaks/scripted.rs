//! Declarative tweaks
//!
//! Authored tweaks arrive as a JSON effect script rather than executable
//! code. A script can only touch the bot it is attached to, through the
//! fixed set of effects below, and every number is range-checked at compile
//! time so a bad script is rejected before a match starts.
//!
//! ```json
//! {
//!   "init": [{ "effect": "scale_radius", "factor": 0.8 }],
//!   "update": [{ "rule": "hurt_speed", "below_ratio": 0.5, "factor": 1.5 }],
//!   "collision": [{ "effect": "stealth", "duration_ms": 500 }],
//!   "damage": [{ "effect": "grow_arc", "delta": -0.2 }],
//!   "draw": { "stealth_alpha": 0.3 }
//! }
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{DrawState, TweakContext, TweakPlugin};
use crate::consts::{MAX_ARC_WIDTH, MAX_SPEED_FACTOR, MIN_ARC_WIDTH, REGEN_PARTICLES};
use crate::sim::bot::Bot;
use crate::sim::particles::{Color, Particle, colors};
use crate::sim::state::MatchEvent;

const BASE_SPEED: &str = "script.base_speed";
const REGEN_STAMP: &str = "script.regen_ms";
const TRAIL_TICKS: &str = "script.trail_ticks";

#[derive(Debug, Error)]
pub enum TweakError {
    #[error("tweak script is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("`{field}` is out of range: {reason}")]
    OutOfRange { field: &'static str, reason: String },
    #[error("tweak script has no effects")]
    Empty,
    #[error("tweak id `{0}` is reserved")]
    ReservedId(String),
}

/// Effects applied once at spawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum InitEffect {
    ScaleRadius { factor: f32 },
    SetHealth { health: i32 },
    /// Radians, clamped to [π/8, π]
    SetArcWidth { width: f32 },
    ScaleMaxSpeed { factor: f32 },
}

/// Rules evaluated every tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum UpdateRule {
    /// While health/max is below `below_ratio`, move at `factor` × spawn speed
    HurtSpeed { below_ratio: f32, factor: f32 },
    /// Heal 1 every `interval_ms` while damaged
    Regenerate { interval_ms: f64 },
    /// Drop a particle every `every_ticks` ticks
    Trail { every_ticks: u32, color: Option<Color> },
}

/// Effects after a bot-bot collision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum CollisionEffect {
    SpeedBoost { factor: f32 },
    Stealth { duration_ms: f64 },
}

/// Effects after damage was applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum DamageEffect {
    /// Radians added to the weak-spot width, clamped to [π/8, π]
    GrowArc { delta: f32 },
    Stealth { duration_ms: f64 },
    Burst { count: usize },
}

/// Render adjustments
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DrawEffect {
    /// Opacity while unhittable
    pub stealth_alpha: Option<f32>,
    /// Permanent opacity
    pub alpha: Option<f32>,
}

/// A complete effect script
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TweakScript {
    pub init: Vec<InitEffect>,
    pub update: Vec<UpdateRule>,
    pub collision: Vec<CollisionEffect>,
    pub damage: Vec<DamageEffect>,
    pub draw: Option<DrawEffect>,
}

fn check(ok: bool, field: &'static str, reason: &str) -> Result<(), TweakError> {
    if ok {
        Ok(())
    } else {
        Err(TweakError::OutOfRange {
            field,
            reason: reason.to_string(),
        })
    }
}

fn check_factor(value: f32, field: &'static str) -> Result<(), TweakError> {
    check(
        value.is_finite() && value > 0.0 && value <= MAX_SPEED_FACTOR,
        field,
        "factor must be in (0, 2]",
    )
}

fn check_duration(value: f64, field: &'static str) -> Result<(), TweakError> {
    check(
        value.is_finite() && value > 0.0 && value <= 600_000.0,
        field,
        "duration must be in (0, 600000] ms",
    )
}

fn check_unit(value: f32, field: &'static str) -> Result<(), TweakError> {
    check(
        value.is_finite() && (0.0..=1.0).contains(&value),
        field,
        "must be in [0, 1]",
    )
}

impl TweakScript {
    pub fn parse(code: &str) -> Result<Self, TweakError> {
        let script: Self = serde_json::from_str(code)?;
        script.validate()?;
        Ok(script)
    }

    pub fn is_empty(&self) -> bool {
        self.init.is_empty()
            && self.update.is_empty()
            && self.collision.is_empty()
            && self.damage.is_empty()
            && self.draw.is_none()
    }

    /// Range-check every number in the script
    pub fn validate(&self) -> Result<(), TweakError> {
        if self.is_empty() {
            return Err(TweakError::Empty);
        }

        for effect in &self.init {
            match *effect {
                InitEffect::ScaleRadius { factor } => check(
                    factor.is_finite() && (0.25..=2.0).contains(&factor),
                    "scale_radius.factor",
                    "must be in [0.25, 2]",
                )?,
                InitEffect::SetHealth { health } => check(
                    (1..=20).contains(&health),
                    "set_health.health",
                    "must be in [1, 20]",
                )?,
                InitEffect::SetArcWidth { width } => {
                    check(width.is_finite(), "set_arc_width.width", "must be finite")?
                }
                InitEffect::ScaleMaxSpeed { factor } => {
                    check_factor(factor, "scale_max_speed.factor")?
                }
            }
        }

        for rule in &self.update {
            match *rule {
                UpdateRule::HurtSpeed {
                    below_ratio,
                    factor,
                } => {
                    check_unit(below_ratio, "hurt_speed.below_ratio")?;
                    check_factor(factor, "hurt_speed.factor")?;
                }
                UpdateRule::Regenerate { interval_ms } => {
                    check_duration(interval_ms, "regenerate.interval_ms")?;
                    check(
                        interval_ms >= 1_000.0,
                        "regenerate.interval_ms",
                        "must be at least 1000 ms",
                    )?;
                }
                UpdateRule::Trail { every_ticks, color } => {
                    check(every_ticks >= 1, "trail.every_ticks", "must be at least 1")?;
                    if let Some(color) = color {
                        for channel in color {
                            check_unit(channel, "trail.color")?;
                        }
                    }
                }
            }
        }

        for effect in &self.collision {
            match *effect {
                CollisionEffect::SpeedBoost { factor } => {
                    check_factor(factor, "speed_boost.factor")?
                }
                CollisionEffect::Stealth { duration_ms } => {
                    check_duration(duration_ms, "stealth.duration_ms")?
                }
            }
        }

        for effect in &self.damage {
            match *effect {
                DamageEffect::GrowArc { delta } => check(
                    delta.is_finite() && delta.abs() <= MAX_ARC_WIDTH,
                    "grow_arc.delta",
                    "must be within [-π, π]",
                )?,
                DamageEffect::Stealth { duration_ms } => {
                    check_duration(duration_ms, "stealth.duration_ms")?
                }
                DamageEffect::Burst { count } => {
                    check(count <= 100, "burst.count", "at most 100 particles")?
                }
            }
        }

        if let Some(draw) = &self.draw {
            if let Some(alpha) = draw.stealth_alpha {
                check_unit(alpha, "draw.stealth_alpha")?;
            }
            if let Some(alpha) = draw.alpha {
                check_unit(alpha, "draw.alpha")?;
            }
        }

        Ok(())
    }
}

/// Tweak backed by a validated script
#[derive(Debug, Clone)]
pub struct ScriptedTweak {
    id: String,
    name: String,
    description: String,
    script: TweakScript,
}

impl ScriptedTweak {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        script: TweakScript,
    ) -> Result<Self, TweakError> {
        let id = id.into();
        if id == super::NONE_ID {
            return Err(TweakError::ReservedId(id));
        }
        script.validate()?;
        Ok(Self {
            id,
            name: name.into(),
            description: description.into(),
            script,
        })
    }

    pub fn script(&self) -> &TweakScript {
        &self.script
    }
}

/// Parse and validate authored code into a tweak
pub fn compile_tweak(
    id: &str,
    name: &str,
    description: &str,
    code: &str,
) -> Result<ScriptedTweak, TweakError> {
    let script = TweakScript::parse(code)?;
    ScriptedTweak::new(id, name, description, script)
}

fn clamp_arc(width: f32) -> f32 {
    width.clamp(MIN_ARC_WIDTH, MAX_ARC_WIDTH)
}

fn enter_stealth(bot: &mut Bot, now_ms: f64, duration_ms: f64) {
    let until = now_ms + duration_ms;
    bot.unhittable_until = Some(bot.unhittable_until.map_or(until, |u| u.max(until)));
}

impl TweakPlugin for ScriptedTweak {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn description(&self) -> &str {
        &self.description
    }

    fn on_init(&self, bot: &mut Bot, ctx: &mut TweakContext<'_>) {
        for effect in &self.script.init {
            match *effect {
                InitEffect::ScaleRadius { factor } => bot.radius *= factor,
                InitEffect::SetHealth { health } => {
                    bot.health = health;
                    bot.max_health = health;
                }
                InitEffect::SetArcWidth { width } => bot.weak_spot_arc_width = clamp_arc(width),
                InitEffect::ScaleMaxSpeed { factor } => bot.max_speed *= factor,
            }
        }
        bot.stash(BASE_SPEED, f64::from(bot.speed()));
        bot.stash(REGEN_STAMP, ctx.now_ms);
    }

    fn on_update(&self, bot: &mut Bot, _dt: f32, ctx: &mut TweakContext<'_>) {
        for rule in &self.script.update {
            match *rule {
                UpdateRule::HurtSpeed {
                    below_ratio,
                    factor,
                } => {
                    let ratio = bot.health as f32 / bot.max_health.max(1) as f32;
                    let base = bot.stashed(BASE_SPEED).unwrap_or(0.0) as f32;
                    let target = if ratio < below_ratio { base * factor } else { base };
                    let direction = bot.velocity.normalize_or_zero();
                    if direction != Vec2::ZERO {
                        bot.velocity = direction * target.min(bot.max_speed);
                    }
                }
                UpdateRule::Regenerate { interval_ms } => {
                    if bot.health >= bot.max_health {
                        continue;
                    }
                    let last = bot.stashed(REGEN_STAMP).unwrap_or(ctx.now_ms);
                    if ctx.now_ms - last >= interval_ms {
                        bot.heal(1);
                        bot.stash(REGEN_STAMP, ctx.now_ms);
                        ctx.particles
                            .burst(ctx.rng, bot.position, REGEN_PARTICLES, colors::REGEN, 2.0);
                        ctx.events.push(MatchEvent::Regenerated {
                            bot: bot.id,
                            health: bot.health,
                        });
                    }
                }
                UpdateRule::Trail { every_ticks, color } => {
                    let ticks = bot.stashed(TRAIL_TICKS).unwrap_or(0.0) + 1.0;
                    if ticks >= f64::from(every_ticks) {
                        ctx.particles.push(Particle::new(
                            bot.position,
                            Vec2::ZERO,
                            color.unwrap_or(bot.color),
                            bot.radius * 0.3,
                        ));
                        bot.stash(TRAIL_TICKS, 0.0);
                    } else {
                        bot.stash(TRAIL_TICKS, ticks);
                    }
                }
            }
        }
    }

    fn on_collision(&self, bot: &mut Bot, _other: &Bot, ctx: &mut TweakContext<'_>) {
        for effect in &self.script.collision {
            match *effect {
                CollisionEffect::SpeedBoost { factor } => bot.velocity *= factor,
                CollisionEffect::Stealth { duration_ms } => {
                    enter_stealth(bot, ctx.now_ms, duration_ms)
                }
            }
        }
    }

    fn on_damage(&self, bot: &mut Bot, ctx: &mut TweakContext<'_>) {
        for effect in &self.script.damage {
            match *effect {
                DamageEffect::GrowArc { delta } => {
                    bot.weak_spot_arc_width = clamp_arc(bot.weak_spot_arc_width + delta)
                }
                DamageEffect::Stealth { duration_ms } => {
                    enter_stealth(bot, ctx.now_ms, duration_ms)
                }
                DamageEffect::Burst { count } => {
                    ctx.particles
                        .burst(ctx.rng, bot.position, count, bot.color, 3.0)
                }
            }
        }
    }

    fn on_draw(&self, bot: &Bot, now_ms: f64, draw: &mut DrawState) {
        let Some(effect) = &self.script.draw else {
            return;
        };
        if let Some(alpha) = effect.alpha {
            draw.alpha = alpha;
        }
        if let Some(alpha) = effect.stealth_alpha {
            if bot.is_unhittable(now_ms) {
                draw.alpha = alpha;
                draw.show_weak_spot = false;
            }
        }
    }
}
