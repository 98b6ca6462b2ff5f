//! Rendering module
//!
//! The simulation never draws. Each frame the host captures a [`RenderFrame`]
//! and either reads it directly or tessellates it into a flat triangle list
//! for whatever GPU or canvas layer it uses.

pub mod frame;
pub mod shapes;
pub mod vertex;

pub use frame::{BotView, ParticleView, RenderFrame};
pub use shapes::tessellate;
pub use vertex::Vertex;
