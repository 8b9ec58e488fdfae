//! Snapshot serialization: the read model handed to front ends.
//!
//! A snapshot captures everything a UI needs to draw the colony at the
//! current turn. The chronicle itself is not copied; only its length.
//! Front ends read it through `SimEngine::history_search`.

use crate::{
    alerts::Alert,
    citizenship::{Citizen, CitizenshipStats},
    clock::TurnClock,
    economics_subsystem::{EconomicPolicy, MonthlyStats},
    event_subsystem::PendingChoice,
    ledger::ResourceLedger,
    military::TrainingProgram,
    types::{EntityId, RunId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimSnapshot {
    pub run_id:            RunId,
    pub seed:              u64,
    pub clock:             TurnClock,
    pub ledger:            ResourceLedger,
    pub monthly_stats:     MonthlyStats,
    pub active_policies:   Vec<EconomicPolicy>,
    pub pending:           Option<PendingChoice>,
    /// Handled event ids in resolution order.
    pub handled_events:    Vec<EntityId>,
    /// Oldest first.
    pub alerts:            Vec<Alert>,
    pub citizenship_stats: CitizenshipStats,
    pub citizens:          Vec<Citizen>,
    /// Courses, records, instructors and facilities.
    pub training:          TrainingProgram,
    pub history_len:       i64,
}
