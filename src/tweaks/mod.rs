//! Tweak plugins
//!
//! A tweak is a per-match modifier composed into exactly one bot. Every hook
//! has an empty default body, so a tweak only implements what it changes.
//! Per-bot bookkeeping lives on the [`Bot`] (see [`Bot::stash`]), never on
//! the plugin, so one instance can be shared safely by both bots.

pub mod builtin;
pub mod scripted;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use rand_pcg::Pcg32;

use crate::sim::bot::Bot;
use crate::sim::particles::ParticleSystem;
use crate::sim::state::MatchEvent;

pub use builtin::{ExtraLife, NoTweak, Regeneration, SmallerSize};
pub use scripted::{ScriptedTweak, TweakError, TweakScript, compile_tweak};

/// Id of the sentinel no-op tweak
pub const NONE_ID: &str = "none";

/// Everything a hook may touch besides its own bot
pub struct TweakContext<'a> {
    /// Wall clock in milliseconds
    pub now_ms: f64,
    pub particles: &'a mut ParticleSystem,
    pub rng: &'a mut Pcg32,
    pub events: &'a mut Vec<MatchEvent>,
}

/// Render-time state a draw hook may adjust
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawState {
    /// Overall opacity, 0-1
    pub alpha: f32,
    /// Whether the weak-spot arc is drawn
    pub show_weak_spot: bool,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            show_weak_spot: true,
        }
    }
}

/// Lifecycle hooks a tweak may implement
pub trait TweakPlugin: Send + Sync {
    /// Unique registry key
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn description(&self) -> &str;

    /// Once, right after the bot is constructed
    fn on_init(&self, _bot: &mut Bot, _ctx: &mut TweakContext<'_>) {}

    /// Every tick, after physics integration
    fn on_update(&self, _bot: &mut Bot, _dt: f32, _ctx: &mut TweakContext<'_>) {}

    /// After a bot-bot collision has been resolved, before hit detection
    fn on_collision(&self, _bot: &mut Bot, _other: &Bot, _ctx: &mut TweakContext<'_>) {}

    /// After damage was actually applied (not on absorbed hits)
    fn on_damage(&self, _bot: &mut Bot, _ctx: &mut TweakContext<'_>) {}

    /// Every render frame; may alter draw state but not draw the body
    fn on_draw(&self, _bot: &Bot, _now_ms: f64, _draw: &mut DrawState) {}
}

impl fmt::Debug for dyn TweakPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweakPlugin").field("id", &self.id()).finish()
    }
}

/// Summary of a registered tweak for menus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TweakInfo {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Tweaks by id; lookups never fail
#[derive(Debug, Clone)]
pub struct TweakRegistry {
    plugins: HashMap<String, Arc<dyn TweakPlugin>>,
    none: Arc<dyn TweakPlugin>,
}

impl TweakRegistry {
    /// Registry holding only the "none" tweak
    pub fn new() -> Self {
        let none: Arc<dyn TweakPlugin> = Arc::new(NoTweak);
        let mut plugins = HashMap::new();
        plugins.insert(NONE_ID.to_string(), Arc::clone(&none));
        Self { plugins, none }
    }

    /// Registry with every built-in tweak
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(SmallerSize));
        registry.register(Arc::new(ExtraLife));
        registry.register(Arc::new(Regeneration));
        registry
    }

    /// Insert or overwrite by id
    pub fn register(&mut self, plugin: Arc<dyn TweakPlugin>) {
        let id = plugin.id().to_string();
        if id == NONE_ID {
            self.none = Arc::clone(&plugin);
        }
        if self.plugins.insert(id.clone(), plugin).is_some() {
            log::info!("Tweak '{}' replaced", id);
        } else {
            log::info!("Tweak '{}' registered", id);
        }
    }

    /// Remove a tweak; the "none" tweak cannot be removed
    pub fn unregister(&mut self, id: &str) -> bool {
        if id == NONE_ID {
            return false;
        }
        self.plugins.remove(id).is_some()
    }

    /// Registered tweak, or the "none" tweak for unknown ids
    pub fn get(&self, id: &str) -> Arc<dyn TweakPlugin> {
        match self.plugins.get(id) {
            Some(plugin) => Arc::clone(plugin),
            None => {
                log::debug!("Unknown tweak '{}', using '{}'", id, NONE_ID);
                Arc::clone(&self.none)
            }
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.plugins.contains_key(id)
    }

    /// All tweaks sorted by id
    pub fn list(&self) -> Vec<TweakInfo> {
        let mut infos: Vec<_> = self
            .plugins
            .values()
            .map(|p| TweakInfo {
                id: p.id().to_string(),
                name: p.name().to_string(),
                description: p.description().to_string(),
            })
            .collect();
        infos.sort_by(|a, b| a.id.cmp(&b.id));
        infos
    }
}

impl Default for TweakRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
