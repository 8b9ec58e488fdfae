//! Random event catalog: static definitions, never mutated.
//!
//! The standard catalog ships as JSON under data/events/ and is embedded
//! at compile time. A catalog is validated whenever it is loaded.

use crate::{
    error::{SimError, SimResult},
    ledger::{ResourceKind, ResourceLedger},
    types::{EntityId, Turn},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

const STANDARD_CATALOG: &str = include_str!("../../data/events/random_events.json");

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    NaturalDisaster,
    Alien,
    Social,
    Facility,
    Discovery,
    Diplomatic,
}

/// Resource deltas plus an optional support delta.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EventEffects {
    #[serde(default)]
    pub resources:   BTreeMap<ResourceKind, f64>,
    #[serde(default)]
    pub support:     Option<f64>,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventChoice {
    pub id:      EntityId,
    pub text:    String,
    pub effects: EventEffects,
}

/// Preconditions for an event to be drawn.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EventCondition {
    /// Minimum current level per resource.
    #[serde(default)]
    pub resources:       BTreeMap<ResourceKind, f64>,
    #[serde(default)]
    pub min_turn:        Option<Turn>,
    /// Events that must already have been handled.
    #[serde(default)]
    pub required_events: Vec<EntityId>,
}

impl EventCondition {
    pub fn is_met(&self, ledger: &ResourceLedger, turn: Turn, handled: &HashSet<EntityId>) -> bool {
        self.resources
            .iter()
            .all(|(kind, level)| ledger.current(*kind) >= *level)
            && self.min_turn.map_or(true, |min| turn >= min)
            && self.required_events.iter().all(|id| handled.contains(id))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RandomEvent {
    pub id:                EntityId,
    pub title:             String,
    pub category:          EventCategory,
    pub description:       String,
    /// Chance in [0, 1] of being accepted on a turn it is eligible.
    pub probability:       f64,
    #[serde(default)]
    pub condition:         Option<EventCondition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices:           Vec<EventChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub immediate_effects: Option<EventEffects>,
}

impl RandomEvent {
    pub fn has_choices(&self) -> bool {
        !self.choices.is_empty()
    }

    pub fn choice(&self, choice_id: &str) -> Option<&EventChoice> {
        self.choices.iter().find(|c| c.id == choice_id)
    }

    pub fn is_eligible(&self, ledger: &ResourceLedger, turn: Turn, handled: &HashSet<EntityId>) -> bool {
        !handled.contains(&self.id)
            && self
                .condition
                .as_ref()
                .map_or(true, |c| c.is_met(ledger, turn, handled))
    }

    fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.probability) {
            return Err(format!("event '{}' has probability {} outside [0, 1]", self.id, self.probability));
        }
        match (self.has_choices(), self.immediate_effects.is_some()) {
            (true, true) => {
                return Err(format!("event '{}' has both choices and immediate effects", self.id));
            }
            (false, false) => {
                return Err(format!("event '{}' has neither choices nor immediate effects", self.id));
            }
            _ => {}
        }
        let mut seen = HashSet::new();
        for choice in &self.choices {
            if !seen.insert(choice.id.as_str()) {
                return Err(format!("event '{}' repeats choice id '{}'", self.id, choice.id));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogFile {
    events: Vec<RandomEvent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventCatalog {
    events: Vec<RandomEvent>,
}

impl EventCatalog {
    /// The catalog compiled into the binary.
    pub fn standard() -> SimResult<Self> {
        Self::from_json(STANDARD_CATALOG)
    }

    pub fn from_json(json: &str) -> SimResult<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.events)
    }

    pub fn new(events: Vec<RandomEvent>) -> SimResult<Self> {
        let mut ids = HashSet::new();
        for event in &events {
            if !ids.insert(event.id.as_str()) {
                return Err(SimError::InvalidCatalog {
                    reason: format!("duplicate event id '{}'", event.id),
                });
            }
            event.validate().map_err(|reason| SimError::InvalidCatalog { reason })?;
        }
        Ok(Self { events })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, event_id: &str) -> Option<&RandomEvent> {
        self.events.iter().find(|e| e.id == event_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RandomEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
