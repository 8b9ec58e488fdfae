//! Consumption subsystem: food and energy drawn by the population.
//!
//! Both amounts are fixed per-capita fractions, floored. Each produces
//! a Neutral report entry every month, including zero months.

use crate::{
    error::SimResult,
    event::{EventDraft, EventType, Impact},
    ledger::ResourceKind,
    rng::SubsystemRng,
    subsystem::{SettlementContext, SettlementOutput, SimSubsystem},
};

pub const FOOD_PER_CAPITA: f64 = 0.1;
pub const ENERGY_PER_CAPITA: f64 = 0.2;

pub struct ConsumptionSubsystem;

impl ConsumptionSubsystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsumptionSubsystem {
    fn default() -> Self { Self::new() }
}

impl SimSubsystem for ConsumptionSubsystem {
    fn name(&self) -> &'static str { "consumption" }

    fn settle(
        &mut self,
        ctx:  &SettlementContext<'_>,
        _rng: &mut SubsystemRng,
    ) -> SimResult<SettlementOutput> {
        let population = ctx.ledger.current(ResourceKind::Population);
        let food = (population * FOOD_PER_CAPITA).floor();
        let energy = (population * ENERGY_PER_CAPITA).floor();

        log::debug!("month={} consumption: food={food:.0} energy={energy:.0}", ctx.date);

        let food_unit = &ctx.ledger.get(ResourceKind::Food).unit;
        let energy_unit = &ctx.ledger.get(ResourceKind::Energy).unit;

        Ok(SettlementOutput::default()
            .entry(
                EventDraft::new(
                    EventType::ResourceChange,
                    "Food supply",
                    "Food consumed by the colony this month.",
                )
                .impact(Impact::on(
                    ResourceKind::Food,
                    -food,
                    format!("Food consumed: -{food:.0} {food_unit}"),
                )),
            )
            .entry(
                EventDraft::new(
                    EventType::ResourceChange,
                    "Energy usage",
                    "Energy consumed by the colony this month.",
                )
                .impact(Impact::on(
                    ResourceKind::Energy,
                    -energy,
                    format!("Energy consumed: -{energy:.0} {energy_unit}"),
                )),
            )
            .delta(ResourceKind::Food, -food)
            .delta(ResourceKind::Energy, -energy))
    }
}
