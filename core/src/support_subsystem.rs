//! Support subsystem: small monthly swings in public opinion.
//!
//! The swing is floor(U(0,1) * 5 - 2), an integer in [-2, 2].
//! A zero swing produces no report entry.

use crate::{
    error::SimResult,
    event::{EventDraft, EventType, Impact, Severity},
    ledger::ResourceKind,
    rng::SubsystemRng,
    subsystem::{SettlementContext, SettlementOutput, SimSubsystem},
};

pub struct SupportSubsystem;

impl SupportSubsystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SupportSubsystem {
    fn default() -> Self { Self::new() }
}

impl SimSubsystem for SupportSubsystem {
    fn name(&self) -> &'static str { "support" }

    fn settle(
        &mut self,
        ctx: &SettlementContext<'_>,
        rng: &mut SubsystemRng,
    ) -> SimResult<SettlementOutput> {
        let swing = (rng.next_f64() * 5.0 - 2.0).floor();

        if swing == 0.0 {
            return Ok(SettlementOutput::default());
        }

        log::debug!("month={} support: {swing:+.0}", ctx.date);

        let description = if swing > 0.0 {
            "Recent measures were well received and support rose."
        } else {
            "Discontent with some measures lowered support."
        };
        let entry = EventDraft::new(EventType::ResourceChange, "Public opinion survey", description)
            .impact(Impact::on(
                ResourceKind::Support,
                swing,
                format!("Support change: {swing:+.0}%"),
            ))
            .severity(Severity::of_signed(swing));

        Ok(SettlementOutput::default()
            .entry(entry)
            .delta(ResourceKind::Support, swing))
    }
}
