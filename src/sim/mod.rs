//! Simulation module
//!
//! All gameplay logic lives here:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Wall clock passed in explicitly, never read
//! - No rendering or platform dependencies

pub mod arc;
pub mod arena;
pub mod bot;
pub mod collision;
pub mod particles;
pub mod state;
pub mod tick;

pub use arc::WeakSpotArc;
pub use arena::Arena;
pub use bot::{Bot, BotParams};
pub use collision::{CollisionResult, circle_segment_collision, reflect_velocity};
pub use particles::{Color, Particle, ParticleSystem};
pub use state::{GameState, MatchEvent, MatchState, Outcome};
pub use tick::tick;
