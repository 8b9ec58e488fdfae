use thiserror::Error;

use crate::clock::TurnPhase;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Turn already in progress (phase: {phase:?})")]
    TurnInProgress { phase: TurnPhase },

    #[error("Invalid phase: expected {expected:?}, got {actual:?}")]
    InvalidPhase { expected: TurnPhase, actual: TurnPhase },

    #[error("The colony has collapsed; no further turns may be played")]
    GameOver,

    #[error("No event is awaiting a choice")]
    NoPendingChoice,

    #[error("Event '{event_id}' is not the pending event")]
    UnknownEvent { event_id: String },

    #[error("Event '{event_id}' has no choice '{choice_id}'")]
    UnknownChoice { event_id: String, choice_id: String },

    #[error("Event '{event_id}' has already been handled")]
    EventAlreadyHandled { event_id: String },

    #[error("No action points remaining this turn")]
    NoActionsRemaining,

    #[error("Course '{course_id}' requires: {missing}")]
    PrerequisitesNotMet { course_id: String, missing: String },

    #[error("Invalid event catalog: {reason}")]
    InvalidCatalog { reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
