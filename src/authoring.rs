//! Tweak authoring boundary
//!
//! A remote generator turns a free-text description into a tweak script and a
//! heuristic critic comments on how well the script matches the request.
//! Both live outside this crate; they are modelled as traits. Authoring only
//! happens before a match starts. A cancelled request's late response is
//! discarded by ticket.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tweaks::{ScriptedTweak, TweakError, TweakRegistry, compile_tweak};

#[derive(Debug, Error)]
pub enum AuthoringError {
    #[error("tweak generation failed: {0}")]
    Service(String),
    #[error("authoring request was cancelled")]
    Cancelled,
    #[error("response for request #{0} arrived after it was superseded")]
    Stale(u64),
    #[error("tweaks can only be authored before a match")]
    MatchInProgress,
    #[error("generated tweak was rejected: {0}")]
    Rejected(#[from] TweakError),
}

/// Critic verdict returned alongside a generated tweak
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AiCritique {
    Text {
        #[serde(rename = "rawText")]
        raw_text: String,
    },
    Failed {
        error: String,
    },
}

/// Advisory validation of a generated tweak
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    pub is_valid: bool,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compilation_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_critique: Option<AiCritique>,
}

/// Generator response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthoredTweak {
    pub name: String,
    pub description: String,
    /// Effect script source
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<Validation>,
}

impl AuthoredTweak {
    pub fn from_json(json: &str) -> Result<Self, AuthoringError> {
        serde_json::from_str(json).map_err(|e| AuthoringError::Service(e.to_string()))
    }

    /// Compile the code under the given registry id
    pub fn compile(&self, id: &str) -> Result<ScriptedTweak, TweakError> {
        compile_tweak(id, &self.name, &self.description, &self.code)
    }
}

/// Remote tweak generator
pub trait TweakAuthor {
    fn author(&self, description: &str) -> Result<AuthoredTweak, AuthoringError>;
}

/// Heuristic reviewer comparing a request with the generated tweak
pub trait TweakCritic {
    fn critique(&self, request: &str, tweak: &AuthoredTweak) -> Validation;
}

/// Identifies one in-flight authoring request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

#[derive(Debug, Clone)]
struct PendingRequest {
    ticket: Ticket,
    slot: usize,
    description: String,
}

/// Successful authoring outcome
#[derive(Debug, Clone)]
pub struct AuthoredSelection {
    /// Bot slot the tweak was requested for
    pub slot: usize,
    /// Registry id of the new tweak
    pub tweak_id: String,
    pub validation: Option<Validation>,
}

/// Tracks the single pending authoring request
#[derive(Debug, Default)]
pub struct AuthoringSession {
    next_ticket: u64,
    next_tweak: u32,
    pending: Option<PendingRequest>,
    cancelled: Option<Ticket>,
}

impl AuthoringSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request for `slot`; any earlier pending request is superseded
    pub fn begin(&mut self, slot: usize, description: &str) -> Ticket {
        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        if let Some(old) = self.pending.replace(PendingRequest {
            ticket,
            slot,
            description: description.to_string(),
        }) {
            log::debug!("Authoring request #{} superseded", old.ticket.0);
        }
        log::info!("Authoring request #{} for slot {}: {:?}", ticket.0, slot, description);
        ticket
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Slot of the pending request, if any
    pub fn pending_slot(&self) -> Option<usize> {
        self.pending.as_ref().map(|p| p.slot)
    }

    /// Drop the pending request; returns the slot it was for
    pub fn cancel(&mut self) -> Option<usize> {
        self.pending.take().map(|p| {
            log::info!("Authoring request #{} cancelled", p.ticket.0);
            self.cancelled = Some(p.ticket);
            p.slot
        })
    }

    /// Accept a generator response for `ticket`
    ///
    /// Stale tickets are discarded. On success the compiled tweak is
    /// registered under a fresh `authored-<n>` id.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        response: Result<AuthoredTweak, AuthoringError>,
        critic: Option<&dyn TweakCritic>,
        registry: &mut TweakRegistry,
    ) -> Result<AuthoredSelection, AuthoringError> {
        let current = self.pending.as_ref().is_some_and(|p| p.ticket == ticket);
        let pending = if current { self.pending.take() } else { None };
        let Some(pending) = pending else {
            log::warn!("Discarding response for request #{}", ticket.0);
            if self.cancelled == Some(ticket) {
                return Err(AuthoringError::Cancelled);
            }
            return Err(AuthoringError::Stale(ticket.0));
        };

        let mut authored = response.inspect_err(|e| log::warn!("Authoring failed: {}", e))?;
        if authored.validation.is_none() {
            authored.validation = critic.map(|c| c.critique(&pending.description, &authored));
        }
        if let Some(validation) = &authored.validation {
            for suggestion in &validation.suggestions {
                log::info!("Critic suggestion for '{}': {}", authored.name, suggestion);
            }
        }

        self.next_tweak += 1;
        let tweak_id = format!("authored-{}", self.next_tweak);
        let tweak = authored.compile(&tweak_id).inspect_err(|e| {
            log::warn!("Rejected authored tweak '{}': {}", authored.name, e);
        })?;
        registry.register(Arc::new(tweak));

        Ok(AuthoredSelection {
            slot: pending.slot,
            tweak_id,
            validation: authored.validation,
        })
    }
}
