use serde::{Deserialize, Serialize};
use crate::{
    citizenship::{CitizenshipStatus, NewCitizen},
    economics_subsystem::{EconomicPolicy, TaxRateId},
    engine::{SettlementReport, TurnOutcome},
    military::IncidentSeverity,
    types::{EntityId, Mutation},
};

/// All player-issued commands.
/// Variants are only ever appended; the tag names are part of the IPC format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PlayerCommand {
    // ── Turn flow ─────────────────────────────────
    AdvanceMonth,
    ResolveChoice {
        event_id:  String,
        choice_id: String,
    },
    CloseReport,
    UseAction,

    // ── Economy ───────────────────────────────────
    SetTaxRate {
        tax:  TaxRateId,
        rate: f64,
    },
    ActivatePolicy {
        policy: EconomicPolicy,
    },
    DeactivatePolicy {
        policy_id: String,
    },

    // ── Citizenship ───────────────────────────────
    AddCitizen {
        citizen: NewCitizen,
    },
    UpdateCitizenStatus {
        citizen_id: String,
        status:     CitizenshipStatus,
    },
    UpdateMilitaryService {
        citizen_id:   String,
        years_served: u32,
    },
    UpdateRequirement {
        citizen_id:     String,
        requirement_id: String,
        completed:      bool,
    },

    // ── Military training ─────────────────────────
    StartTraining {
        citizen_id: String,
        course_id:  String,
    },
    UpdateTrainingProgress {
        course_id: String,
        progress:  f64,
    },
    CompleteTraining {
        citizen_id:  String,
        course_id:   String,
        performance: f64,
    },
    AddInstructorNote {
        record_id: String,
        note:      String,
    },
    ReportIncident {
        record_id:   String,
        description: String,
        severity:    IncidentSeverity,
    },
}

/// What `SimEngine::apply` hands back for a command.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CommandResult {
    Turn { outcome: TurnOutcome },
    Settled { report: SettlementReport },
    Mutation { mutation: Mutation },
    ActionUsed { granted: bool },
    Created { id: EntityId },
    /// `start_training` against an unknown citizen or course.
    NotCreated,
}
