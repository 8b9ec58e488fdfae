//! Population subsystem: monthly migration drift.
//!
//! Population moves by a uniform random fraction in
//! [-POPULATION_DRIFT, +POPULATION_DRIFT), floored to whole people.
//! A zero change produces no report entry.

use crate::{
    error::SimResult,
    event::{EventDraft, EventType, Impact, Severity},
    ledger::ResourceKind,
    rng::SubsystemRng,
    subsystem::{SettlementContext, SettlementOutput, SimSubsystem},
};

pub const POPULATION_DRIFT: f64 = 0.01;

pub struct PopulationSubsystem;

impl PopulationSubsystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PopulationSubsystem {
    fn default() -> Self { Self::new() }
}

impl SimSubsystem for PopulationSubsystem {
    fn name(&self) -> &'static str { "population" }

    fn settle(
        &mut self,
        ctx: &SettlementContext<'_>,
        rng: &mut SubsystemRng,
    ) -> SimResult<SettlementOutput> {
        let population = ctx.ledger.current(ResourceKind::Population);
        let change = (population * rng.range_f64(-POPULATION_DRIFT, POPULATION_DRIFT)).floor();

        if change == 0.0 {
            return Ok(SettlementOutput::default());
        }

        log::debug!("month={} population: {change:+.0}", ctx.date);

        let description = if change > 0.0 {
            "New settlers arrived and the population grew."
        } else {
            "Some colonists emigrated to other colonies."
        };
        let entry = EventDraft::new(EventType::ResourceChange, "Population report", description)
            .impact(Impact::on(
                ResourceKind::Population,
                change,
                format!("Population change: {change:+.0} people"),
            ))
            .severity(Severity::of_signed(change));

        Ok(SettlementOutput::default()
            .entry(entry)
            .delta(ResourceKind::Population, change))
    }
}
