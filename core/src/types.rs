//! Shared primitive types used across the entire simulation.

use serde::{Deserialize, Serialize};

/// A simulation turn. One turn = one in-game month.
pub type Turn = u32;

/// A stable, unique identifier for any entity in the simulation.
pub type EntityId = String;

/// The canonical run identifier.
pub type RunId = String;

/// What a mutating call did to the state it targeted.
///
/// State-machine violations (advancing mid-turn, resolving a handled
/// event) are errors, not outcomes; see `SimError`.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mutation {
    /// The request was applied as given.
    Applied,
    /// The request was applied but the value was clamped into range.
    Clamped,
    /// The request matched the current state; nothing changed.
    Unchanged,
    /// No entity with the given id exists; nothing changed.
    UnknownId,
}

impl Mutation {
    /// True when the call changed state.
    pub fn took_effect(self) -> bool {
        matches!(self, Self::Applied | Self::Clamped)
    }
}
