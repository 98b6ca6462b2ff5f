//! Cosmetic particles
//!
//! Nothing in collision or combat reads these.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{PARTICLE_LIFE_DECAY, PARTICLE_SIZE_DECAY};

/// RGBA color
pub type Color = [f32; 4];

/// Colors for game elements
pub mod colors {
    use super::Color;

    pub const BOT_0: Color = [0.3, 0.6, 1.0, 1.0];
    pub const BOT_1: Color = [1.0, 0.35, 0.3, 1.0];
    pub const WALL_SPARK: Color = [0.9, 0.9, 1.0, 1.0];
    pub const HIT: Color = [1.0, 0.8, 0.2, 1.0];
    pub const REGEN: Color = [0.3, 1.0, 0.4, 1.0];
    pub const ARENA_WALL: Color = [0.3, 0.3, 0.4, 1.0];
    pub const WEAK_SPOT: Color = [1.0, 0.1, 0.1, 1.0];
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Color,
    /// 0-1, decreases every tick
    pub life: f32,
    pub size: f32,
}

impl Particle {
    pub fn new(pos: Vec2, vel: Vec2, color: Color, size: f32) -> Self {
        Self {
            pos,
            vel,
            color,
            life: 1.0,
            size,
        }
    }

    /// Advance one tick
    pub fn update(&mut self) {
        self.pos += self.vel;
        self.life -= PARTICLE_LIFE_DECAY;
        self.size *= PARTICLE_SIZE_DECAY;
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Owns every live particle; capped by the quality preset
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    max_particles: usize,
}

impl ParticleSystem {
    pub fn new(max_particles: usize) -> Self {
        Self {
            particles: Vec::new(),
            max_particles,
        }
    }

    /// Spray `count` particles outward from `pos` at random angles
    pub fn burst<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        pos: Vec2,
        count: usize,
        color: Color,
        speed: f32,
    ) {
        for _ in 0..count {
            if self.particles.len() >= self.max_particles {
                break;
            }
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            let spd = speed * rng.random_range(0.3..1.0);
            let size = rng.random_range(2.0..5.0);
            self.particles.push(Particle::new(
                pos,
                Vec2::from_angle(angle) * spd,
                color,
                size,
            ));
        }
    }

    pub fn push(&mut self, particle: Particle) {
        if self.particles.len() < self.max_particles {
            self.particles.push(particle);
        }
    }

    /// Advance all particles and drop the dead ones
    pub fn update(&mut self) {
        for particle in &mut self.particles {
            particle.update();
        }
        self.particles.retain(Particle::is_alive);
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_particle_decays_and_dies() {
        let mut system = ParticleSystem::new(10);
        system.push(Particle::new(Vec2::ZERO, Vec2::new(1.0, 0.0), colors::HIT, 4.0));

        system.update();
        let p = system.iter().next().cloned().unwrap();
        assert_eq!(p.pos, Vec2::new(1.0, 0.0));
        assert!((p.life - (1.0 - PARTICLE_LIFE_DECAY)).abs() < 1e-6);
        assert!((p.size - 4.0 * PARTICLE_SIZE_DECAY).abs() < 1e-6);

        // 1.0 / 0.02 = 50 ticks to die (allow float slack)
        for _ in 0..55 {
            system.update();
        }
        assert!(system.is_empty());
    }

    #[test]
    fn test_burst_respects_cap() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut system = ParticleSystem::new(8);
        system.burst(&mut rng, Vec2::ZERO, 20, colors::WALL_SPARK, 3.0);
        assert_eq!(system.len(), 8);
        assert!(system.iter().all(|p| p.vel.length() <= 3.0 + 1e-4));
    }
}
