//! Fixed timestep simulation tick
//!
//! One tick runs, in order: integration and update hooks, wall collisions,
//! the bot-bot collision, weak-spot hit detection (only in a tick with a
//! bot-bot collision), particle cleanup, then the win check. The order
//! decides which collision wins when several happen in one tick.

use super::bot::Bot;
use super::collision::{resolve_bot_collision, resolve_wall_collisions};
use super::particles::colors;
use super::state::{GameState, MatchEvent, Outcome};
use crate::consts::WALL_PARTICLES;
use crate::normalize_degrees;
use crate::tweaks::TweakContext;

/// Advance the match by one fixed timestep
///
/// `now_ms` is the wall clock used by invulnerability and timed tweaks.
/// Does nothing once the match is over.
pub fn tick(state: &mut GameState, now_ms: f64, dt: f32) {
    if state.match_state.is_over() || !state.match_state.running {
        return;
    }

    state.time_ticks += 1;
    state.match_state.elapsed_ms = now_ms - state.match_state.start_ms;

    let GameState {
        arena,
        bots,
        particles,
        rng,
        hit_buffer,
        ..
    } = state;
    let mut events = Vec::new();
    let mut ctx = TweakContext {
        now_ms,
        particles,
        rng,
        events: &mut events,
    };

    // 1. Integrate, then per-tick tweak effects
    for bot in bots.iter_mut() {
        bot.integrate();
        bot.run_update_hook(dt, &mut ctx);
        bot.clamp_speed();
    }

    // 2. Walls
    for bot in bots.iter_mut() {
        for contact in resolve_wall_collisions(bot, arena) {
            ctx.particles
                .burst(ctx.rng, contact, WALL_PARTICLES, colors::WALL_SPARK, 2.0);
            ctx.events.push(MatchEvent::WallBounce { bot: bot.id });
        }
    }

    // 3. Bot-bot, then 4. weak spots
    let [first, second] = bots;
    if resolve_bot_collision(first, second).is_some() {
        ctx.events.push(MatchEvent::BotCollision);
        first.run_collision_hook(second, &mut ctx);
        second.run_collision_hook(first, &mut ctx);
        first.clamp_speed();
        second.clamp_speed();
        first.squash();
        second.squash();

        resolve_weak_spot_hit(second, first, *hit_buffer, &mut ctx);
        resolve_weak_spot_hit(first, second, *hit_buffer, &mut ctx);
    }

    // 5. Particles
    state.particles.update();

    // 6. Win check
    state.record_events(events);
    if let Some(outcome) = evaluate_outcome(&state.bots) {
        state.match_state.outcome = Some(outcome);
        state.match_state.running = false;
        state.record_events([MatchEvent::MatchOver { outcome }]);
        log::info!(
            "Match over after {} ticks ({:.1}s): {:?}",
            state.time_ticks,
            state.match_state.elapsed_ms / 1000.0,
            outcome
        );
    }
}

/// Angle in degrees [0, 360) from `defender` to `attacker`
pub fn attack_angle(attacker: &Bot, defender: &Bot) -> f32 {
    let to_attacker = attacker.position - defender.position;
    normalize_degrees(to_attacker.y.atan2(to_attacker.x).to_degrees())
}

/// Whether `attacker` is touching `defender`'s weak spot right now
///
/// Ignores invulnerability; that is checked when damage is applied.
pub fn weak_spot_struck(attacker: &Bot, defender: &Bot, hit_buffer: f32, now_ms: f64) -> bool {
    if defender.is_unhittable(now_ms) {
        return false;
    }
    let distance = attacker.position.distance(defender.position);
    if distance > defender.radius + attacker.radius + hit_buffer {
        return false;
    }
    defender
        .weak_spot_arc()
        .contains_angle(attack_angle(attacker, defender))
}

/// Test one attacker/defender pair and apply damage on a hit
///
/// Returns whether health changed.
pub fn resolve_weak_spot_hit(
    attacker: &Bot,
    defender: &mut Bot,
    hit_buffer: f32,
    ctx: &mut TweakContext<'_>,
) -> bool {
    if !weak_spot_struck(attacker, defender, hit_buffer, ctx.now_ms) {
        return false;
    }

    if defender.take_damage(ctx) {
        log::debug!(
            "Bot {} hit bot {} (health {})",
            attacker.id,
            defender.id,
            defender.health
        );
        ctx.events.push(MatchEvent::Hit {
            attacker: attacker.id,
            defender: defender.id,
            health_left: defender.health,
        });
        true
    } else {
        log::debug!("Bot {} absorbed a hit (invulnerable)", defender.id);
        ctx.events.push(MatchEvent::HitAbsorbed {
            attacker: attacker.id,
            defender: defender.id,
        });
        false
    }
}

/// Draw when both are dead, the survivor wins when one is
pub fn evaluate_outcome(bots: &[Bot; 2]) -> Option<Outcome> {
    match (bots[0].is_dead(), bots[1].is_dead()) {
        (true, true) => Some(Outcome::Draw),
        (true, false) => Some(Outcome::Winner(bots[1].id)),
        (false, true) => Some(Outcome::Winner(bots[0].id)),
        (false, false) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::arena::Arena;
    use crate::consts::{BOT_MAX_SPEED, WEAK_SPOT_ARC_WIDTH};
    use crate::sim::bot::BotParams;
    use crate::tweaks::{NoTweak, compile_tweak};
    use glam::Vec2;
    use std::f32::consts::PI;
    use std::sync::Arc;

    fn still_bot(id: usize, position: Vec2, body_angle: f32) -> Bot {
        let params = BotParams {
            rotation_speed: 0.0,
            ..BotParams::default()
        };
        Bot::new(id, position, Vec2::ZERO, body_angle, &params, Arc::new(NoTweak))
    }

    fn scripted_bot(id: usize, position: Vec2, body_angle: f32, code: &str) -> Bot {
        let params = BotParams {
            rotation_speed: 0.0,
            ..BotParams::default()
        };
        let tweak = compile_tweak("scripted", "Scripted", "", code).unwrap();
        Bot::new(id, position, Vec2::ZERO, body_angle, &params, Arc::new(tweak))
    }

    /// Bot 1 rams bot 0's weak spot (bot 0 faces +x, spot at 180°)
    fn ram_from_behind(mut target: Bot) -> GameState {
        target.velocity = Vec2::new(0.5, 0.0);
        let mut rammer = still_bot(1, Vec2::new(-62.0, 0.0), PI / 2.0);
        rammer.velocity = Vec2::new(4.0, 0.0);
        let mut state = GameState::from_parts(big_arena(), [target, rammer], 1, 0.0);
        tick(&mut state, 2_000.0, SIM_DT);
        state
    }

    fn big_arena() -> Arena {
        Arena::new(8, 1000.0, Vec2::ZERO)
    }

    #[test]
    fn test_attack_angle() {
        let defender = still_bot(0, Vec2::ZERO, 0.0);
        let attacker = still_bot(1, Vec2::new(0.0, 50.0), 0.0);
        assert!((attack_angle(&attacker, &defender) - 90.0).abs() < 1e-4);
        let attacker = still_bot(1, Vec2::new(0.0, -50.0), 0.0);
        assert!((attack_angle(&attacker, &defender) - 270.0).abs() < 1e-4);
    }

    #[test]
    fn test_weak_spot_struck_requires_arc_and_distance() {
        // Facing +x, weak spot faces -x
        let defender = still_bot(0, Vec2::ZERO, 0.0);
        let behind = still_bot(1, Vec2::new(-60.0, 0.0), 0.0);
        let front = still_bot(1, Vec2::new(60.0, 0.0), 0.0);
        let far_behind = still_bot(1, Vec2::new(-71.0, 0.0), 0.0);

        assert!(weak_spot_struck(&behind, &defender, 10.0, 0.0));
        assert!(!weak_spot_struck(&front, &defender, 10.0, 0.0));
        assert!(!weak_spot_struck(&far_behind, &defender, 10.0, 0.0));
    }

    #[test]
    fn test_unhittable_defender_is_skipped() {
        let mut defender = still_bot(0, Vec2::ZERO, 0.0);
        defender.unhittable_until = Some(500.0);
        let behind = still_bot(1, Vec2::new(-60.0, 0.0), 0.0);
        assert!(!weak_spot_struck(&behind, &defender, 10.0, 499.0));
        assert!(weak_spot_struck(&behind, &defender, 10.0, 500.0));
    }

    #[test]
    fn test_collision_into_weak_spot_deals_damage() {
        let state = ram_from_behind(still_bot(0, Vec2::ZERO, 0.0));

        assert_eq!(state.bots[0].health, 2);
        // Rammer's weak spot faces -y; contact from +x is outside it
        assert_eq!(state.bots[1].health, 3);
        assert!(state.events.contains(&MatchEvent::BotCollision));
        assert!(state.events.contains(&MatchEvent::Hit {
            attacker: 1,
            defender: 0,
            health_left: 2
        }));
        // Velocities forced apart along the contact normal
        assert!(state.bots[0].velocity.x > 0.0);
        assert!(state.bots[1].velocity.x < 0.0);
    }

    #[test]
    fn test_no_damage_without_collision() {
        let target = still_bot(0, Vec2::ZERO, 0.0);
        let near = still_bot(1, Vec2::new(-65.0, 0.0), 0.0);
        let mut state = GameState::from_parts(big_arena(), [target, near], 1, 0.0);
        tick(&mut state, 2_000.0, SIM_DT);
        assert_eq!(state.bots[0].health, 3);
        assert!(!state.events.contains(&MatchEvent::BotCollision));
    }

    #[test]
    fn test_win_condition_and_freeze() {
        let mut a = still_bot(0, Vec2::new(-300.0, 0.0), 0.0);
        let b = still_bot(1, Vec2::new(300.0, 0.0), 0.0);
        a.health = 0;
        let mut state = GameState::from_parts(big_arena(), [a, b], 1, 0.0);

        tick(&mut state, 16.0, SIM_DT);
        assert_eq!(state.match_state.outcome, Some(Outcome::Winner(1)));
        assert!(!state.match_state.running);

        let ticks = state.time_ticks;
        state.bots[1].velocity = Vec2::new(3.0, 0.0);
        let position = state.bots[1].position;
        tick(&mut state, 5_000.0, SIM_DT);
        assert_eq!(state.time_ticks, ticks);
        assert_eq!(state.bots[1].position, position);
        assert_eq!(state.bots[1].health, 3);
    }

    #[test]
    fn test_evaluate_outcome() {
        let mut a = still_bot(0, Vec2::ZERO, 0.0);
        let mut b = still_bot(1, Vec2::ZERO, 0.0);
        assert_eq!(evaluate_outcome(&[a.clone(), b.clone()]), None);
        b.health = -1;
        assert_eq!(evaluate_outcome(&[a.clone(), b.clone()]), Some(Outcome::Winner(0)));
        a.health = 0;
        assert_eq!(evaluate_outcome(&[a, b]), Some(Outcome::Draw));
    }

    #[test]
    fn test_mutual_kill_is_draw() {
        // Both weak spots face each other: a faces -x (spot at 0°), b faces +x (spot at 180°)
        let mut a = still_bot(0, Vec2::new(-29.0, 0.0), PI);
        let mut b = still_bot(1, Vec2::new(29.0, 0.0), 0.0);
        a.health = 1;
        b.health = 1;
        let mut state = GameState::from_parts(big_arena(), [a, b], 1, 0.0);
        tick(&mut state, 10_000.0, SIM_DT);
        assert_eq!(state.match_state.outcome, Some(Outcome::Draw));
    }

    #[test]
    fn test_fast_bot_cannot_leave_the_arena() {
        let arena = Arena::new(8, 300.0, Vec2::ZERO);
        let outward = Vec2::from_angle(PI / 8.0);
        let mut runner = still_bot(0, outward * (arena.inradius() - 31.0), 0.0);
        runner.velocity = outward * 32.0;
        let idle = still_bot(1, outward * -150.0, 0.0);
        let mut state = GameState::from_parts(arena, [runner, idle], 1, 0.0);

        for n in 0..600 {
            tick(&mut state, f64::from(n) * 16.0, SIM_DT);
            let bot = &state.bots[0];
            assert!(state.arena.contains(bot.position), "bot left the arena on tick {n}");
            assert!(bot.speed() <= bot.speed_limit() + 1e-4);
        }
    }

    #[test]
    fn test_collision_boost_is_clamped_in_the_same_tick() {
        let mut boosted = scripted_bot(
            0,
            Vec2::ZERO,
            0.0,
            r#"{ "collision": [{ "effect": "speed_boost", "factor": 2.0 }] }"#,
        );
        boosted.velocity = Vec2::new(7.0, 0.0);
        let other = still_bot(1, Vec2::new(65.0, 0.0), PI);
        let mut state = GameState::from_parts(big_arena(), [boosted, other], 1, 0.0);

        tick(&mut state, 2_000.0, SIM_DT);
        assert!(state.events.contains(&MatchEvent::BotCollision));
        assert!((state.bots[0].speed() - BOT_MAX_SPEED).abs() < 1e-4);
        assert!(state.bots[0].velocity.x < 0.0);
    }

    #[test]
    fn test_collision_stealth_protects_defender_in_same_tick() {
        let target = scripted_bot(
            0,
            Vec2::ZERO,
            0.0,
            r#"{ "collision": [{ "effect": "stealth", "duration_ms": 500 }] }"#,
        );
        let state = ram_from_behind(target);

        assert!(state.events.contains(&MatchEvent::BotCollision));
        assert_eq!(state.bots[0].health, 3);
        assert_eq!(state.bots[0].unhittable_until, Some(2_500.0));
        assert!(!state.events.iter().any(|e| matches!(
            e,
            MatchEvent::Hit { defender: 0, .. } | MatchEvent::HitAbsorbed { defender: 0, .. }
        )));
    }

    #[test]
    fn test_damage_hook_runs_only_when_damage_lands() {
        const GROW: &str = r#"{ "damage": [{ "effect": "grow_arc", "delta": 0.3 }] }"#;

        let mut shielded = scripted_bot(0, Vec2::ZERO, 0.0, GROW);
        shielded.last_hit_ms = Some(1_500.0);
        let absorbed = ram_from_behind(shielded);
        assert_eq!(absorbed.bots[0].health, 3);
        assert!(absorbed.events.contains(&MatchEvent::HitAbsorbed {
            attacker: 1,
            defender: 0
        }));
        assert_eq!(absorbed.bots[0].weak_spot_arc_width, WEAK_SPOT_ARC_WIDTH);

        let landed = ram_from_behind(scripted_bot(0, Vec2::ZERO, 0.0, GROW));
        assert_eq!(landed.bots[0].health, 2);
        assert!((landed.bots[0].weak_spot_arc_width - (WEAK_SPOT_ARC_WIDTH + 0.3)).abs() < 1e-6);
    }
}
