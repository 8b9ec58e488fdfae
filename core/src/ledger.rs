//! Resource ledger: the colony's bounded stockpiles.
//!
//! RULES:
//!   - `min <= current <= max` holds after every mutation. Out-of-range
//!     deltas are clamped, never rejected.
//!   - Alert levels are recomputed by the decay pass only. A bare
//!     `update_resource` leaves the previous level in place.

use crate::types::Mutation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceKind {
    Population,
    Food,
    Energy,
    Military,
    Support,
    Credits,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        Self::Population,
        Self::Food,
        Self::Energy,
        Self::Military,
        Self::Support,
        Self::Credits,
    ];
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Population => "population",
            Self::Food       => "food",
            Self::Energy     => "energy",
            Self::Military   => "military",
            Self::Support    => "support",
            Self::Credits    => "credits",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl AlertLevel {
    /// Critical at or below the critical threshold, High at or below the
    /// warning threshold, None otherwise. Low and Medium are never derived
    /// from thresholds; they are raised by the alert feed only.
    pub fn from_thresholds(current: f64, critical: f64, warning: f64) -> Self {
        if current <= critical {
            Self::Critical
        } else if current <= warning {
            Self::High
        } else {
            Self::None
        }
    }
}

/// Static definition of one resource, as configured at session start.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceSpec {
    pub kind:               ResourceKind,
    pub name:               String,
    pub initial:            f64,
    pub max:                f64,
    pub min:                f64,
    pub critical_threshold: f64,
    pub warning_threshold:  f64,
    pub unit:               String,
    pub decay_rate:         f64,
    /// Turns a critical level may persist before it ends the game.
    #[serde(default)]
    pub grace_turns:        Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Resource {
    pub kind:               ResourceKind,
    pub name:               String,
    pub current:            f64,
    pub max:                f64,
    pub min:                f64,
    pub critical_threshold: f64,
    pub warning_threshold:  f64,
    pub unit:               String,
    pub alert_level:        AlertLevel,
    pub decay_rate:         f64,
    pub grace_turns:        Option<u32>,
    pub grace_remaining:    Option<u32>,
}

impl Resource {
    pub fn from_spec(spec: &ResourceSpec) -> Self {
        let current = spec.initial.clamp(spec.min, spec.max);
        Self {
            kind: spec.kind,
            name: spec.name.clone(),
            current,
            max: spec.max,
            min: spec.min,
            critical_threshold: spec.critical_threshold,
            warning_threshold: spec.warning_threshold,
            unit: spec.unit.clone(),
            alert_level: AlertLevel::from_thresholds(
                current,
                spec.critical_threshold,
                spec.warning_threshold,
            ),
            decay_rate: spec.decay_rate,
            grace_turns: spec.grace_turns,
            grace_remaining: spec.grace_turns,
        }
    }

    fn apply_delta(&mut self, delta: f64) -> Mutation {
        let raw = self.current + delta;
        let clamped = raw.clamp(self.min, self.max);
        self.current = clamped;
        if clamped == raw { Mutation::Applied } else { Mutation::Clamped }
    }

    fn decay(&mut self) {
        self.current = (self.current * (1.0 - self.decay_rate)).max(self.min);
        self.alert_level = AlertLevel::from_thresholds(
            self.current,
            self.critical_threshold,
            self.warning_threshold,
        );

        if let (Some(full), Some(left)) = (self.grace_turns, self.grace_remaining.as_mut()) {
            if self.current <= self.critical_threshold {
                *left = left.saturating_sub(1);
            } else {
                *left = full;
            }
        }
    }

    pub fn is_critical(&self) -> bool {
        self.current <= self.critical_threshold
    }

    /// True once a critical level has outlasted its grace period.
    pub fn grace_exhausted(&self) -> bool {
        self.is_critical() && self.grace_remaining == Some(0)
    }
}

/// Why the colony collapsed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CollapseReason {
    Depopulation,
    Famine,
    Blackout,
    Revolt,
}

impl CollapseReason {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Depopulation => "The last colonists have left or perished.",
            Self::Famine       => "Food reserves stayed critical past the grace period.",
            Self::Blackout     => "Energy stayed critical past the grace period.",
            Self::Revolt       => "Public support stayed critical past the grace period.",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceLedger {
    resources: BTreeMap<ResourceKind, Resource>,
}

impl ResourceLedger {
    /// Build the ledger from its specs. Kinds missing from `specs` are
    /// filled with an inert zero-bounded entry so every kind is present.
    pub fn from_specs(specs: &[ResourceSpec]) -> Self {
        let mut resources: BTreeMap<ResourceKind, Resource> = specs
            .iter()
            .map(|spec| (spec.kind, Resource::from_spec(spec)))
            .collect();
        for kind in ResourceKind::ALL {
            resources.entry(kind).or_insert_with(|| {
                log::warn!("ledger: no spec for {kind}; using an empty resource");
                Resource::from_spec(&ResourceSpec {
                    kind,
                    name: kind.to_string(),
                    initial: 0.0,
                    max: 0.0,
                    min: 0.0,
                    critical_threshold: 0.0,
                    warning_threshold: 0.0,
                    unit: String::new(),
                    decay_rate: 0.0,
                    grace_turns: None,
                })
            });
        }
        Self { resources }
    }

    pub fn get(&self, kind: ResourceKind) -> &Resource {
        // Every kind is inserted at construction.
        &self.resources[&kind]
    }

    pub fn current(&self, kind: ResourceKind) -> f64 {
        self.get(kind).current
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    /// Add `delta` and clamp into `[min, max]`.
    pub fn update_resource(&mut self, kind: ResourceKind, delta: f64) -> Mutation {
        match self.resources.get_mut(&kind) {
            Some(resource) => resource.apply_delta(delta),
            None => Mutation::UnknownId,
        }
    }

    /// One decay pass over every resource, recomputing alert levels and
    /// grace counters from the decayed values.
    pub fn decay(&mut self) {
        for resource in self.resources.values_mut() {
            resource.decay();
        }
    }

    /// The game-over check. Population collapse is immediate; food, energy
    /// and support only end the game once their grace period is spent.
    pub fn collapse_reason(&self) -> Option<CollapseReason> {
        if self.current(ResourceKind::Population) <= 0.0 {
            return Some(CollapseReason::Depopulation);
        }
        [
            (ResourceKind::Food, CollapseReason::Famine),
            (ResourceKind::Energy, CollapseReason::Blackout),
            (ResourceKind::Support, CollapseReason::Revolt),
        ]
        .into_iter()
        .find(|(kind, _)| self.get(*kind).grace_exhausted())
        .map(|(_, reason)| reason)
    }

    /// Resources currently at High or Critical.
    pub fn alerting(&self) -> impl Iterator<Item = &Resource> {
        self.resources
            .values()
            .filter(|r| r.alert_level >= AlertLevel::High)
    }
}
