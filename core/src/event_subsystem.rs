//! Event subsystem: random event selection and resolution.
//!
//! Selection is read-only over the catalog:
//!   1. Drop handled events and events whose conditions are unmet.
//!   2. Run an independent Bernoulli trial per survivor at its probability.
//!   3. Pick one accepted candidate uniformly; discard the rest this turn.
//!
//! RULE: An event fires at most once per session. Once its id is in the
//! handled set it is never selected or resolved again.

use crate::{
    catalog::{EventCatalog, EventEffects, RandomEvent},
    clock::GameDate,
    error::{SimError, SimResult},
    event::{EventDraft, EventType, Impact, Severity},
    ledger::{ResourceKind, ResourceLedger},
    rng::SubsystemRng,
    types::{EntityId, Mutation, Turn},
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An event waiting on the player, with the month it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingChoice {
    pub event: RandomEvent,
    pub date:  GameDate,
}

pub struct EventSubsystem {
    catalog: EventCatalog,
    handled: HashSet<EntityId>,
    /// Handled ids in resolution order, for reporting.
    handled_order: Vec<EntityId>,
    pending: Option<PendingChoice>,
}

impl EventSubsystem {
    pub fn new(catalog: EventCatalog) -> Self {
        Self {
            catalog,
            handled: HashSet::new(),
            handled_order: Vec::new(),
            pending: None,
        }
    }

    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    pub fn pending(&self) -> Option<&PendingChoice> {
        self.pending.as_ref()
    }

    pub fn is_handled(&self, event_id: &str) -> bool {
        self.handled.contains(event_id)
    }

    pub fn handled(&self) -> &[EntityId] {
        &self.handled_order
    }

    /// Events that could fire this turn, before the probability rolls.
    pub fn eligible(&self, ledger: &ResourceLedger, turn: Turn) -> Vec<&RandomEvent> {
        self.catalog
            .iter()
            .filter(|e| e.is_eligible(ledger, turn, &self.handled))
            .collect()
    }

    /// Eligible events that passed their Bernoulli trial.
    pub fn accepted(
        &self,
        ledger: &ResourceLedger,
        turn:   Turn,
        rng:    &mut SubsystemRng,
    ) -> Vec<&RandomEvent> {
        self.eligible(ledger, turn)
            .into_iter()
            .filter(|e| rng.chance(e.probability))
            .collect()
    }

    /// Draw at most one event for this turn.
    pub fn select(
        &self,
        ledger: &ResourceLedger,
        turn:   Turn,
        rng:    &mut SubsystemRng,
    ) -> Option<RandomEvent> {
        let accepted = self.accepted(ledger, turn, rng);
        if accepted.is_empty() {
            log::debug!("turn={turn} events: no event this turn");
            return None;
        }
        let picked = accepted[rng.next_index(accepted.len())];
        log::info!(
            "turn={turn} events: '{}' selected from {} accepted candidate(s)",
            picked.id,
            accepted.len()
        );
        Some(picked.clone())
    }

    /// Report entry announcing a surfaced event.
    pub fn announcement(event: &RandomEvent) -> EventDraft {
        let draft = EventDraft::new(EventType::RandomEvent, event.title.clone(), event.description.clone());
        match &event.immediate_effects {
            Some(effects) => draft.impact(Impact::note(effects.description.clone())),
            None => draft,
        }
    }

    /// Park an event with choices until the player answers it.
    pub fn defer(&mut self, event: RandomEvent, date: GameDate) {
        log::info!("events: '{}' awaiting a choice", event.id);
        self.pending = Some(PendingChoice { event, date });
    }

    /// Apply the player's choice for the pending event.
    ///
    /// Terminal: the event is marked handled and can never be resolved
    /// again. On any error the pending event is left untouched.
    pub fn resolve_choice(
        &mut self,
        ledger:    &mut ResourceLedger,
        event_id:  &str,
        choice_id: &str,
    ) -> SimResult<(PendingChoice, EventDraft)> {
        if self.is_handled(event_id) {
            return Err(SimError::EventAlreadyHandled { event_id: event_id.into() });
        }
        let pending = self.pending.as_ref().ok_or(SimError::NoPendingChoice)?;
        if pending.event.id != event_id {
            return Err(SimError::UnknownEvent { event_id: event_id.into() });
        }
        let choice = pending
            .event
            .choice(choice_id)
            .ok_or_else(|| SimError::UnknownChoice {
                event_id:  event_id.into(),
                choice_id: choice_id.into(),
            })?
            .clone();

        let Some(pending) = self.pending.take() else {
            return Err(SimError::NoPendingChoice);
        };

        apply_effects(ledger, &choice.effects);
        self.mark_handled(&pending.event.id);

        let severity = match choice.effects.support {
            Some(s) if s > 0.0 => Severity::Positive,
            Some(_) => Severity::Negative,
            None => Severity::Neutral,
        };
        let draft = effect_impacts(
            EventDraft::new(
                EventType::RandomEvent,
                format!("Response to {}", pending.event.title),
                choice.text.clone(),
            )
            .impact(Impact::note(choice.effects.description.clone())),
            &choice.effects,
        )
        .severity(severity);

        log::info!("events: '{}' resolved with '{}'", pending.event.id, choice.id);
        Ok((pending, draft))
    }

    /// Apply an event's fixed effects without waiting for the player.
    /// Returns `Unchanged` for an event without immediate effects.
    pub fn resolve_immediate(
        &mut self,
        ledger: &mut ResourceLedger,
        event:  &RandomEvent,
    ) -> SimResult<Mutation> {
        if self.is_handled(&event.id) {
            return Err(SimError::EventAlreadyHandled { event_id: event.id.clone() });
        }
        let Some(effects) = &event.immediate_effects else {
            log::warn!("events: '{}' has no immediate effects", event.id);
            return Ok(Mutation::Unchanged);
        };
        apply_effects(ledger, effects);
        self.mark_handled(&event.id);
        log::info!("events: '{}' applied immediately", event.id);
        Ok(Mutation::Applied)
    }

    fn mark_handled(&mut self, event_id: &str) {
        if self.handled.insert(event_id.to_string()) {
            self.handled_order.push(event_id.to_string());
        }
    }
}

fn apply_effects(ledger: &mut ResourceLedger, effects: &EventEffects) {
    for (kind, amount) in &effects.resources {
        let _ = ledger.update_resource(*kind, *amount);
    }
    if let Some(support) = effects.support {
        let _ = ledger.update_resource(ResourceKind::Support, support);
    }
}

fn effect_impacts(mut draft: EventDraft, effects: &EventEffects) -> EventDraft {
    for (kind, amount) in &effects.resources {
        draft = draft.impact(Impact::on(*kind, *amount, format!("{kind}: {amount:+.0}")));
    }
    if let Some(support) = effects.support {
        draft = draft.impact(Impact::on(ResourceKind::Support, support, format!("support: {support:+.0}")));
    }
    draft
}
