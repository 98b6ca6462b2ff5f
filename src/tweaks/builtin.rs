//! Built-in tweaks

use crate::consts::{REGEN_INTERVAL_MS, REGEN_PARTICLES};
use crate::sim::bot::Bot;
use crate::sim::particles::colors;
use crate::sim::state::MatchEvent;

use super::{NONE_ID, TweakContext, TweakPlugin};

/// Key for the regeneration timestamp stashed on the bot
const REGEN_STAMP: &str = "regen.last_ms";

/// No modifier
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTweak;

impl TweakPlugin for NoTweak {
    fn id(&self) -> &str {
        NONE_ID
    }
    fn name(&self) -> &str {
        "None"
    }
    fn description(&self) -> &str {
        "No modifications"
    }
}

/// 30% smaller body
#[derive(Debug, Default, Clone, Copy)]
pub struct SmallerSize;

impl SmallerSize {
    pub const SCALE: f32 = 0.7;
}

impl TweakPlugin for SmallerSize {
    fn id(&self) -> &str {
        "smallerSize"
    }
    fn name(&self) -> &str {
        "Smaller Size"
    }
    fn description(&self) -> &str {
        "Bot is 30% smaller, making it harder to hit"
    }

    fn on_init(&self, bot: &mut Bot, _ctx: &mut TweakContext<'_>) {
        bot.radius *= Self::SCALE;
    }
}

/// Six health instead of three
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtraLife;

impl ExtraLife {
    pub const HEALTH: i32 = 6;
}

impl TweakPlugin for ExtraLife {
    fn id(&self) -> &str {
        "extraLife"
    }
    fn name(&self) -> &str {
        "Extra Life"
    }
    fn description(&self) -> &str {
        "Bot starts with 6 health instead of 3"
    }

    fn on_init(&self, bot: &mut Bot, _ctx: &mut TweakContext<'_>) {
        bot.health = Self::HEALTH;
        bot.max_health = Self::HEALTH;
    }
}

/// Heals one point per minute while damaged
#[derive(Debug, Default, Clone, Copy)]
pub struct Regeneration;

impl TweakPlugin for Regeneration {
    fn id(&self) -> &str {
        "regeneration"
    }
    fn name(&self) -> &str {
        "Regeneration"
    }
    fn description(&self) -> &str {
        "Regenerates 1 health every 60 seconds"
    }

    fn on_init(&self, bot: &mut Bot, ctx: &mut TweakContext<'_>) {
        bot.stash(REGEN_STAMP, ctx.now_ms);
    }

    fn on_update(&self, bot: &mut Bot, _dt: f32, ctx: &mut TweakContext<'_>) {
        if bot.health >= bot.max_health {
            return;
        }
        let last = bot.stashed(REGEN_STAMP).unwrap_or(ctx.now_ms);
        if ctx.now_ms - last >= REGEN_INTERVAL_MS {
            bot.heal(1);
            bot.stash(REGEN_STAMP, ctx.now_ms);
            ctx.particles
                .burst(ctx.rng, bot.position, REGEN_PARTICLES, colors::REGEN, 2.0);
            ctx.events.push(MatchEvent::Regenerated {
                bot: bot.id,
                health: bot.health,
            });
            log::debug!("Bot {} regenerated to {}", bot.id, bot.health);
        }
    }
}
