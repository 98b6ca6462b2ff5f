//! Match lifecycle
//!
//! [`MatchController`] owns the tweak registry, the per-slot tweak selection,
//! the authoring session and the running match. UI code talks only to this.
//! [`GameLoop`] turns variable frame times into fixed simulation ticks.

use std::sync::Arc;
use std::time::Duration;

use crate::authoring::{
    AuthoredSelection, AuthoredTweak, AuthoringError, AuthoringSession, Ticket, TweakAuthor,
    TweakCritic,
};
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::platform::{Clock, time_seed};
use crate::renderer::{RenderFrame, Vertex, tessellate};
use crate::settings::{Settings, SettingsError};
use crate::sim::{GameState, MatchEvent, Outcome, tick};
use crate::tweaks::{NONE_ID, TweakPlugin, TweakRegistry};

/// Owns everything between the pre-match screen and the end of a match
#[derive(Debug)]
pub struct MatchController<C: Clock> {
    clock: C,
    settings: Settings,
    registry: TweakRegistry,
    authoring: AuthoringSession,
    /// Tweak id chosen for each bot slot
    selection: [String; 2],
    /// Ids registered by authoring; removed again on reset
    authored: Vec<String>,
    state: Option<GameState>,
}

impl<C: Clock> MatchController<C> {
    /// Refuses settings that fail [`Settings::validate`]
    pub fn new(settings: Settings, clock: C) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self {
            clock,
            settings,
            registry: TweakRegistry::with_builtins(),
            authoring: AuthoringSession::new(),
            selection: [NONE_ID.to_string(), NONE_ID.to_string()],
            authored: Vec::new(),
            state: None,
        })
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &TweakRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TweakRegistry {
        &mut self.registry
    }

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    /// Direct access for scripted scenarios
    pub fn state_mut(&mut self) -> Option<&mut GameState> {
        self.state.as_mut()
    }

    /// Tweak id currently selected for `slot`
    pub fn selection(&self, slot: usize) -> &str {
        self.selection.get(slot).map_or(NONE_ID, String::as_str)
    }

    /// Choose a tweak for `slot`; ignored for slots other than 0 and 1
    pub fn select_tweak(&mut self, slot: usize, tweak_id: &str) {
        if let Some(selected) = self.selection.get_mut(slot) {
            *selected = tweak_id.to_string();
        }
    }

    // === Authoring (pre-match only) ===

    fn ensure_pre_match(&self) -> Result<(), AuthoringError> {
        if self.state.is_some() {
            return Err(AuthoringError::MatchInProgress);
        }
        Ok(())
    }

    pub fn begin_authoring(&mut self, slot: usize, description: &str) -> Result<Ticket, AuthoringError> {
        self.ensure_pre_match()?;
        Ok(self.authoring.begin(slot, description))
    }

    /// Abandon the pending request; its slot goes back to `"none"`
    pub fn cancel_authoring(&mut self) {
        if let Some(slot) = self.authoring.cancel() {
            self.select_tweak(slot, NONE_ID);
        }
    }

    /// Deliver a generator response
    ///
    /// On success the new tweak becomes the slot's selection. A rejected or
    /// failed response leaves the slot at `"none"`. Stale responses change
    /// nothing.
    pub fn complete_authoring(
        &mut self,
        ticket: Ticket,
        response: Result<AuthoredTweak, AuthoringError>,
        critic: Option<&dyn TweakCritic>,
    ) -> Result<AuthoredSelection, AuthoringError> {
        self.ensure_pre_match()?;
        let slot = self.authoring.pending_slot();
        match self
            .authoring
            .complete(ticket, response, critic, &mut self.registry)
        {
            Ok(selection) => {
                self.select_tweak(selection.slot, &selection.tweak_id);
                self.authored.push(selection.tweak_id.clone());
                Ok(selection)
            }
            Err(e @ (AuthoringError::Stale(_) | AuthoringError::Cancelled)) => Err(e),
            Err(e) => {
                if let Some(slot) = slot {
                    self.select_tweak(slot, NONE_ID);
                }
                Err(e)
            }
        }
    }

    /// Request, await and apply a generated tweak in one call
    pub fn author_tweak(
        &mut self,
        author: &dyn TweakAuthor,
        critic: Option<&dyn TweakCritic>,
        slot: usize,
        description: &str,
    ) -> Result<AuthoredSelection, AuthoringError> {
        let ticket = self.begin_authoring(slot, description)?;
        let response = author.author(description);
        self.complete_authoring(ticket, response, critic)
    }

    // === Match control ===

    /// Start a match; unknown ids fall back to `"none"`
    pub fn start_match(&mut self, tweak1: &str, tweak2: &str) {
        if self.authoring.is_pending() {
            self.cancel_authoring();
        }
        let tweaks: [Arc<dyn TweakPlugin>; 2] =
            [self.registry.get(tweak1), self.registry.get(tweak2)];
        let seed = self.settings.seed.unwrap_or_else(time_seed);
        log::info!(
            "Match started: '{}' vs '{}' (seed {})",
            tweaks[0].id(),
            tweaks[1].id(),
            seed
        );
        self.state = Some(GameState::new(
            &self.settings,
            tweaks,
            seed,
            self.clock.now_ms(),
        ));
    }

    /// Start with the current slot selections
    pub fn start_selected(&mut self) {
        let [t1, t2] = self.selection.clone();
        self.start_match(&t1, &t2);
    }

    /// Drop the match and every tweak authored for it
    pub fn reset_to_pre_match(&mut self) {
        self.state = None;
        for id in self.authored.drain(..) {
            self.registry.unregister(&id);
            for selected in self.selection.iter_mut().filter(|s| **s == id) {
                *selected = NONE_ID.to_string();
            }
        }
        log::info!("Returned to pre-match");
    }

    /// Run one fixed simulation tick at the current wall clock
    pub fn tick(&mut self) {
        let now_ms = self.clock.now_ms();
        if let Some(state) = self.state.as_mut() {
            tick(state, now_ms, SIM_DT);
        }
    }

    pub fn is_running(&self) -> bool {
        self.state
            .as_ref()
            .is_some_and(|s| s.match_state.running)
    }

    pub fn is_over(&self) -> bool {
        self.outcome().is_some()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.state.as_ref().and_then(|s| s.match_state.outcome)
    }

    pub fn health(&self, bot_id: usize) -> Option<i32> {
        self.state.as_ref()?.bot(bot_id).map(|b| b.health)
    }

    /// Wall clock since match start, frozen once the match is over
    pub fn elapsed_time(&self) -> Duration {
        self.state.as_ref().map_or(Duration::ZERO, |s| {
            Duration::from_secs_f64(s.match_state.elapsed_ms.max(0.0) / 1000.0)
        })
    }

    pub fn events(&self) -> &[MatchEvent] {
        self.state
            .as_ref()
            .map(|s| s.events.as_slice())
            .unwrap_or_default()
    }

    /// Render snapshot at the current wall clock
    pub fn frame(&self) -> Option<RenderFrame> {
        let state = self.state.as_ref()?;
        Some(RenderFrame::capture(state, self.clock.now_ms()))
    }

    /// Current frame as a triangle list, tessellated at the quality preset
    pub fn vertices(&self) -> Vec<Vertex> {
        self.frame()
            .map(|frame| tessellate(&frame, self.settings.quality.circle_segments()))
            .unwrap_or_default()
    }
}

/// Fixed-step accumulator
#[derive(Debug, Default, Clone)]
pub struct GameLoop {
    accumulator: f32,
}

impl GameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one frame's duration (seconds); returns the number of ticks run
    ///
    /// At most `MAX_SUBSTEPS` ticks run per frame; leftover time carries over.
    /// A non-finite frame time counts as zero.
    pub fn advance<C: Clock>(&mut self, controller: &mut MatchController<C>, frame_dt: f32) -> u32 {
        let frame_dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, 0.1)
        } else {
            0.0
        };
        self.accumulator += frame_dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            controller.tick();
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        substeps
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
