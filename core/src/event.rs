//! The chronicle entry: every report line the simulation produces.
//!
//! RULE: History is append-only. Entries are never edited or removed
//! once written to the store.

use crate::{clock::GameDate, ledger::ResourceKind, types::EntityId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    ResourceChange,
    RandomEvent,
    Milestone,
    Crisis,
    Diplomatic,
    Military,
}

impl EventType {
    /// Stable name used for the `kind` column in the chronicle table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResourceChange => "resource_change",
            Self::RandomEvent    => "random_event",
            Self::Milestone      => "milestone",
            Self::Crisis         => "crisis",
            Self::Diplomatic     => "diplomatic",
            Self::Military       => "military",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "resource_change" => Self::ResourceChange,
            "random_event"    => Self::RandomEvent,
            "milestone"       => Self::Milestone,
            "crisis"          => Self::Crisis,
            "diplomatic"      => Self::Diplomatic,
            "military"        => Self::Military,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Positive,
    Neutral,
    Negative,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral  => "neutral",
            Self::Negative => "negative",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "positive" => Self::Positive,
            "neutral"  => Self::Neutral,
            "negative" => Self::Negative,
            _ => return None,
        })
    }

    /// Positive for gains, Negative for losses and zero.
    pub fn of_signed(amount: f64) -> Self {
        if amount > 0.0 { Self::Positive } else { Self::Negative }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Impact {
    pub resource:    Option<ResourceKind>,
    pub amount:      Option<f64>,
    pub description: String,
}

impl Impact {
    pub fn on(resource: ResourceKind, amount: f64, description: impl Into<String>) -> Self {
        Self { resource: Some(resource), amount: Some(amount), description: description.into() }
    }

    pub fn note(description: impl Into<String>) -> Self {
        Self { resource: None, amount: None, description: description.into() }
    }
}

/// A report line before it has been dated and given an id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventDraft {
    pub kind:        EventType,
    pub title:       String,
    pub description: String,
    pub impacts:     Vec<Impact>,
    pub severity:    Severity,
}

impl EventDraft {
    pub fn new(kind: EventType, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
            impacts: Vec::new(),
            severity: Severity::Neutral,
        }
    }

    pub fn impact(mut self, impact: Impact) -> Self {
        self.impacts.push(impact);
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Stamp the draft with a fresh id and the month it describes.
    pub fn dated(self, date: GameDate) -> MonthlyEvent {
        MonthlyEvent {
            id: uuid::Uuid::new_v4().to_string(),
            kind: self.kind,
            title: self.title,
            description: self.description,
            impacts: self.impacts,
            date,
            severity: self.severity,
        }
    }
}

/// An immutable history entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyEvent {
    pub id:          EntityId,
    pub kind:        EventType,
    pub title:       String,
    pub description: String,
    pub impacts:     Vec<Impact>,
    pub date:        GameDate,
    pub severity:    Severity,
}
