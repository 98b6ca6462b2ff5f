//! Collision detection and response
//!
//! Walls are polygon edges; bots are circles. Both responses keep speed
//! exactly: walls reflect, bot pairs get their speeds pointed apart.

use glam::Vec2;

use super::arena::{Arena, closest_point_on_segment};
use super::bot::Bot;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Contact point (if hit)
    pub point: Vec2,
    /// Surface normal pointing toward the bot center
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check a circle against one wall segment
///
/// A center lying exactly on the segment has no usable normal and is
/// reported as a miss.
pub fn circle_segment_collision(pos: Vec2, radius: f32, a: Vec2, b: Vec2) -> CollisionResult {
    let closest = closest_point_on_segment(pos, a, b);
    let offset = pos - closest;
    let dist = offset.length();

    if dist < radius && dist > 0.0 {
        CollisionResult {
            hit: true,
            point: closest,
            normal: offset / dist,
            penetration: radius - dist,
        }
    } else {
        CollisionResult::miss()
    }
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Check a circle against one arena wall
///
/// `inside` is any point inside the arena. A center that has already
/// reached the wall line is pushed back along the inward normal instead of
/// being treated as a miss or pushed further out.
pub fn wall_collision(pos: Vec2, radius: f32, a: Vec2, b: Vec2, inside: Vec2) -> CollisionResult {
    let mut inward = (b - a).perp().normalize_or_zero();
    if inward.dot(inside - a) < 0.0 {
        inward = -inward;
    }
    let depth = (pos - a).dot(inward);
    if inward == Vec2::ZERO || depth > 0.0 {
        return circle_segment_collision(pos, radius, a, b);
    }
    CollisionResult {
        hit: true,
        point: closest_point_on_segment(pos, a, b),
        normal: inward,
        penetration: radius - depth,
    }
}

/// Resolve a bot against every arena edge, in edge order
///
/// Velocity is only reflected while it still points into the wall. Returns
/// the contact points, one per edge struck.
pub fn resolve_wall_collisions(bot: &mut Bot, arena: &Arena) -> Vec<Vec2> {
    let mut contacts = Vec::new();
    for (a, b) in arena.edges() {
        let result = wall_collision(bot.position, bot.radius, a, b, arena.center);
        if !result.hit {
            continue;
        }
        bot.position += result.normal * result.penetration;
        if bot.velocity.dot(result.normal) < 0.0 {
            bot.velocity = reflect_velocity(bot.velocity, result.normal);
        }
        contacts.push(result.point);
    }
    contacts
}

/// Resolve a bot-bot overlap
///
/// Both bots move half the overlap apart along the center-to-center normal,
/// then keep their speeds but point exactly away from each other along it.
/// Coincident centers fall back to the +x axis. Returns the contact normal
/// (from `a` to `b`) when the bots collided.
pub fn resolve_bot_collision(a: &mut Bot, b: &mut Bot) -> Option<Vec2> {
    let delta = b.position - a.position;
    let distance = delta.length();
    let min_distance = a.radius + b.radius;
    if distance >= min_distance {
        return None;
    }

    let normal = if distance > 0.0 { delta / distance } else { Vec2::X };
    let separation = normal * ((min_distance - distance) / 2.0);
    a.position -= separation;
    b.position += separation;

    let speed_a = a.velocity.length();
    let speed_b = b.velocity.length();
    a.velocity = normal * -speed_a;
    b.velocity = normal * speed_b;

    Some(normal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::bot::BotParams;
    use crate::tweaks::NoTweak;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn bot_at(id: usize, position: Vec2, velocity: Vec2) -> Bot {
        Bot::new(
            id,
            position,
            velocity,
            0.0,
            &BotParams::default(),
            Arc::new(NoTweak),
        )
    }

    #[test]
    fn test_reflect_velocity() {
        let reflected = reflect_velocity(Vec2::new(100.0, 0.0), Vec2::new(-1.0, 0.0));
        assert!((reflected.x + 100.0).abs() < 1e-4);
        assert!(reflected.y.abs() < 1e-4);
    }

    #[test]
    fn test_segment_collision_normal_points_at_center() {
        let result = circle_segment_collision(
            Vec2::new(5.0, 8.0),
            10.0,
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
        );
        assert!(result.hit);
        assert_eq!(result.point, Vec2::new(5.0, 0.0));
        assert!((result.normal - Vec2::Y).length() < 1e-6);
        assert!((result.penetration - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_segment_touching_is_not_collision() {
        let result =
            circle_segment_collision(Vec2::new(5.0, 10.0), 10.0, Vec2::ZERO, Vec2::new(10.0, 0.0));
        assert!(!result.hit);
    }

    #[test]
    fn test_wall_bounce_pushes_out_and_reflects() {
        let arena = Arena::new(8, 100.0, Vec2::ZERO);
        // Edge 0 runs from angle 0 to 45°; approach it head-on along its normal
        let inward = Vec2::from_angle(std::f32::consts::PI / 8.0);
        let mut bot = bot_at(0, inward * (arena.inradius() - 25.0), inward * 6.0);

        let contacts = resolve_wall_collisions(&mut bot, &arena);
        assert_eq!(contacts.len(), 1);
        assert!(bot.velocity.dot(inward) < 0.0);
        assert!((bot.speed() - 6.0).abs() < 1e-4);
        let wall_distance = arena.inradius() - bot.position.dot(inward);
        assert!((wall_distance - bot.radius).abs() < 1e-3);
    }

    #[test]
    fn test_corner_hits_both_edges_in_order() {
        let arena = Arena::new(8, 200.0, Vec2::ZERO);
        // Vertex 1 sits at 45°; 28 px in from it both adjacent edges are within reach
        let corner = Vec2::from_angle(std::f32::consts::FRAC_PI_4);
        let mut bot = bot_at(0, corner * 172.0, corner * 5.0);

        let contacts = resolve_wall_collisions(&mut bot, &arena);
        let edges: Vec<_> = arena.edges().collect();
        assert_eq!(contacts.len(), 2);
        let on_edge =
            |p: Vec2, (a, b): (Vec2, Vec2)| closest_point_on_segment(p, a, b).distance(p) < 1e-3;
        assert!(on_edge(contacts[0], edges[0]));
        assert!(on_edge(contacts[1], edges[1]));
        assert!(arena.contains(bot.position));
        assert!((bot.speed() - 5.0).abs() < 1e-4);
        assert!(bot.velocity.dot(corner) < 0.0);
    }

    #[test]
    fn test_center_past_wall_is_pulled_back_in() {
        let arena = Arena::new(8, 100.0, Vec2::ZERO);
        let outward = Vec2::from_angle(std::f32::consts::PI / 8.0);
        let mut bot = bot_at(0, outward * (arena.inradius() + 2.0), outward * 8.0);

        let contacts = resolve_wall_collisions(&mut bot, &arena);
        assert_eq!(contacts.len(), 1);
        assert!(arena.contains(bot.position));
        let wall_distance = arena.inradius() - bot.position.dot(outward);
        assert!((wall_distance - bot.radius).abs() < 1e-3);
        assert!(bot.velocity.dot(outward) < 0.0);
    }

    #[test]
    fn test_receding_bot_is_not_reflected_back() {
        let arena = Arena::new(8, 100.0, Vec2::ZERO);
        let outward = Vec2::from_angle(std::f32::consts::PI / 8.0);
        let mut bot = bot_at(0, outward * (arena.inradius() - 25.0), outward * -3.0);

        assert_eq!(resolve_wall_collisions(&mut bot, &arena).len(), 1);
        assert_eq!(bot.velocity, outward * -3.0);
    }

    #[test]
    fn test_bot_collision_points_apart() {
        let mut a = bot_at(0, Vec2::new(0.0, 0.0), Vec2::new(4.0, 1.0));
        let mut b = bot_at(1, Vec2::new(50.0, 0.0), Vec2::new(-2.0, 0.0));

        let normal = resolve_bot_collision(&mut a, &mut b).unwrap();
        assert_eq!(normal, Vec2::X);
        assert!((a.position.x + 5.0).abs() < 1e-4);
        assert!((b.position.x - 55.0).abs() < 1e-4);
        assert!((a.velocity - Vec2::new(-(17.0f32).sqrt(), 0.0)).length() < 1e-4);
        assert!((b.velocity - Vec2::new(2.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_bot_collision_coincident_centers() {
        let mut a = bot_at(0, Vec2::splat(10.0), Vec2::new(0.0, 3.0));
        let mut b = bot_at(1, Vec2::splat(10.0), Vec2::new(0.0, -3.0));
        let normal = resolve_bot_collision(&mut a, &mut b).unwrap();
        assert_eq!(normal, Vec2::X);
        assert!(a.position.is_finite() && b.position.is_finite());
        assert!((a.speed() - 3.0).abs() < 1e-5);
        assert!((b.speed() - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_no_collision_when_apart() {
        let mut a = bot_at(0, Vec2::ZERO, Vec2::X);
        let mut b = bot_at(1, Vec2::new(60.0, 0.0), Vec2::X);
        assert!(resolve_bot_collision(&mut a, &mut b).is_none());
        assert_eq!(a.velocity, Vec2::X);
    }

    proptest! {
        #[test]
        fn prop_wall_bounce_conserves_speed(
            angle in 0.0f32..std::f32::consts::TAU,
            heading in 0.0f32..std::f32::consts::TAU,
            speed in 0.5f32..8.0,
        ) {
            let arena = Arena::new(8, 200.0, Vec2::ZERO);
            // Start overlapping the wall somewhere along its length
            let pos = Vec2::from_angle(angle) * (arena.inradius() - 20.0);
            let mut bot = bot_at(0, pos, Vec2::from_angle(heading) * speed);
            resolve_wall_collisions(&mut bot, &arena);
            prop_assert!((bot.speed() - speed).abs() < 1e-3);
        }

        #[test]
        fn prop_bot_collision_conserves_speed(
            offset_angle in 0.0f32..std::f32::consts::TAU,
            gap in 0.0f32..59.0,
            va in (-8.0f32..8.0, -8.0f32..8.0),
            vb in (-8.0f32..8.0, -8.0f32..8.0),
        ) {
            let va = Vec2::new(va.0, va.1);
            let vb = Vec2::new(vb.0, vb.1);
            let mut a = bot_at(0, Vec2::ZERO, va);
            let mut b = bot_at(1, Vec2::from_angle(offset_angle) * gap, vb);
            prop_assert!(resolve_bot_collision(&mut a, &mut b).is_some());
            prop_assert!((a.speed() - va.length()).abs() < 1e-3);
            prop_assert!((b.speed() - vb.length()).abs() < 1e-3);
            prop_assert!(a.position.distance(b.position) >= a.radius + b.radius - 1e-3);
        }
    }
}
