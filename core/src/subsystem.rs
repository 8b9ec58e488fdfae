//! Settlement subsystem trait.
//!
//! RULE: Every month-end step implements SimSubsystem.
//! The engine calls settle() on each registered subsystem
//! in registration order, once per settlement.
//! Execution order is fixed and documented in engine.rs.
//!
//! Subsystems never mutate the ledger. Each one reads the ledger as it
//! stood when settlement began and returns the deltas it wants applied;
//! the engine applies every subsystem's deltas after all have run.

use crate::{
    clock::GameDate,
    economics_subsystem::{Economy, FinanceSummary},
    error::SimResult,
    event::EventDraft,
    ledger::{ResourceKind, ResourceLedger},
    rng::SubsystemRng,
};

/// Read-only view handed to every subsystem during settlement.
pub struct SettlementContext<'a> {
    pub date:    GameDate,
    pub ledger:  &'a ResourceLedger,
    pub economy: &'a Economy,
}

/// What one subsystem contributes to a settlement.
#[derive(Debug, Clone, Default)]
pub struct SettlementOutput {
    pub entries: Vec<EventDraft>,
    pub deltas:  Vec<(ResourceKind, f64)>,
    /// Set by the economics subsystem only.
    pub finance: Option<FinanceSummary>,
}

impl SettlementOutput {
    pub fn entry(mut self, draft: EventDraft) -> Self {
        self.entries.push(draft);
        self
    }

    pub fn delta(mut self, kind: ResourceKind, amount: f64) -> Self {
        self.deltas.push((kind, amount));
        self
    }
}

/// The contract every settlement step must fulfill.
pub trait SimSubsystem: Send {
    /// Unique stable name for this subsystem.
    fn name(&self) -> &'static str;

    /// Called once per settlement by the engine.
    ///
    /// - `ctx`: the pre-settlement ledger and economy tables
    /// - `rng`: this subsystem's deterministic RNG for this turn
    fn settle(
        &mut self,
        ctx: &SettlementContext<'_>,
        rng: &mut SubsystemRng,
    ) -> SimResult<SettlementOutput>;
}
