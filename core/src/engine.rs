//! The simulation engine: the turn controller of the colony.
//!
//! EXECUTION ORDER of a month end (fixed, documented, never reordered):
//!   1. Economics subsystem
//!   2. Population subsystem
//!   3. Consumption subsystem
//!   4. Support subsystem
//!
//! RULES:
//!   - Subsystems execute in registration order, once per settlement.
//!   - Each subsystem reads ONLY the ledger as it stood when settlement
//!     began; the engine applies all deltas afterwards, in order.
//!   - All randomness flows through the RngBank.
//!   - Every report line is written to the chronicle, dated with the
//!     month that just ended.
//!   - Game over is checked once per turn, right after decay.

use crate::{
    alerts::AlertFeed,
    citizenship::{Citizen, CitizenRegistry, CitizenshipStatus, NewCitizen},
    clock::{GameDate, GameStatus, TurnClock, TurnPhase},
    command::{CommandResult, PlayerCommand},
    config::SimConfig,
    consumption_subsystem::ConsumptionSubsystem,
    economics_subsystem::{EconomicPolicy, Economy, EconomicsSubsystem, FinanceSummary, TaxRateId},
    error::{SimError, SimResult},
    event::{EventDraft, EventType, MonthlyEvent, Severity},
    event_subsystem::{EventSubsystem, PendingChoice},
    ledger::{AlertLevel, CollapseReason, ResourceKind, ResourceLedger},
    military::{IncidentSeverity, Instructor, TrainingFacility, TrainingProgram},
    population_subsystem::PopulationSubsystem,
    rng::{RngBank, SubsystemSlot},
    snapshot::SimSnapshot,
    store::{HistoryQuery, SimStore},
    subsystem::{SettlementContext, SettlementOutput, SimSubsystem},
    support_subsystem::SupportSubsystem,
    types::{EntityId, Mutation, RunId},
};
use serde::Serialize;

/// A completed month end.
#[derive(Debug, Clone, Serialize)]
pub struct SettlementReport {
    /// The month the report describes.
    pub date:    GameDate,
    /// Every chronicle entry for `date`, in the order written.
    pub entries: Vec<MonthlyEvent>,
    pub finance: Option<FinanceSummary>,
}

/// What `advance_month` ended in.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TurnOutcome {
    Settled { report: SettlementReport },
    /// Settlement waits on `resolve_choice` for this event.
    AwaitingChoice { event_id: String },
    GameOver { reason: CollapseReason },
}

pub struct SimEngine {
    pub run_id:   RunId,
    pub clock:    TurnClock,
    pub rng_bank: RngBank,
    seed:         u64,
    ledger:       ResourceLedger,
    economy:      Economy,
    events:       EventSubsystem,
    citizens:     CitizenRegistry,
    training:     TrainingProgram,
    alerts:       AlertFeed,
    subsystems:   Vec<(SubsystemSlot, Box<dyn SimSubsystem>)>,
    store:        SimStore,
}

impl SimEngine {
    pub fn new(run_id: RunId, seed: u64, config: SimConfig, store: SimStore) -> Self {
        Self {
            clock:      TurnClock::new(config.start_date, config.actions_per_turn),
            rng_bank:   RngBank::new(seed),
            seed,
            ledger:     ResourceLedger::from_specs(&config.resources),
            economy:    Economy::new(config.economy),
            events:     EventSubsystem::new(config.catalog),
            citizens:   CitizenRegistry::new(config.citizens, config.citizenship_stats),
            training:   TrainingProgram::new(config.courses),
            alerts:     AlertFeed::new(),
            subsystems: Vec::new(),
            store,
            run_id,
        }
    }

    /// Build a fully wired engine with all subsystems registered and a
    /// migrated in-memory chronicle.
    /// Call this instead of new() + manual register() calls.
    pub fn build(run_id: RunId, seed: u64, config: SimConfig) -> SimResult<Self> {
        let store = SimStore::in_memory()?;
        store.migrate()?;

        let mut engine = SimEngine::new(run_id, seed, config, store);

        // EXECUTION ORDER: fixed, documented, never reordered.
        engine.register(SubsystemSlot::Economics, Box::new(EconomicsSubsystem::new()));
        engine.register(SubsystemSlot::Population, Box::new(PopulationSubsystem::new()));
        engine.register(SubsystemSlot::Consumption, Box::new(ConsumptionSubsystem::new()));
        engine.register(SubsystemSlot::Support, Box::new(SupportSubsystem::new()));

        log::info!(
            "run={} seed={seed} starting at {} with {} catalog events",
            engine.run_id,
            engine.clock.current_date,
            engine.events.catalog().len()
        );
        Ok(engine)
    }

    /// Fully wired engine on the standard configuration.
    pub fn build_test(run_id: RunId, seed: u64) -> SimResult<Self> {
        Self::build(run_id, seed, SimConfig::standard()?)
    }

    /// Register a subsystem. Call in the documented execution order.
    pub fn register(&mut self, slot: SubsystemSlot, subsystem: Box<dyn SimSubsystem>) {
        self.subsystems.push((slot, subsystem));
    }

    // ── Turn flow ──────────────────────────────────────────────

    /// Play one month: calendar, decay, collapse check, event draw and,
    /// unless an event needs a choice, settlement.
    ///
    /// Fails without touching any state when the game is over or a turn
    /// is still open.
    pub fn advance_month(&mut self) -> SimResult<TurnOutcome> {
        if self.clock.is_over() {
            return Err(SimError::GameOver);
        }
        if !self.clock.phase.can_advance() {
            return Err(SimError::TurnInProgress { phase: self.clock.phase });
        }

        let ending = self.clock.advance();
        let turn = self.clock.turn;
        log::info!("turn={turn} began; reporting on {ending}");

        self.ledger.decay();
        self.raise_ledger_alerts();

        if let Some(reason) = self.ledger.collapse_reason() {
            return self.collapse(reason, ending);
        }

        let mut rng = self.rng_bank.for_subsystem_at_turn(SubsystemSlot::Events, turn);
        if let Some(event) = self.events.select(&self.ledger, turn, &mut rng) {
            self.record(EventSubsystem::announcement(&event), ending)?;

            if event.has_choices() {
                let event_id = event.id.clone();
                self.events.defer(event, ending);
                self.clock.phase = TurnPhase::AwaitingChoice;
                return Ok(TurnOutcome::AwaitingChoice { event_id });
            }
            let _ = self.events.resolve_immediate(&mut self.ledger, &event)?;
        }

        let report = self.process_month_end()?;
        Ok(TurnOutcome::Settled { report })
    }

    /// Answer the pending event and run the deferred settlement.
    pub fn resolve_choice(&mut self, event_id: &str, choice_id: &str) -> SimResult<SettlementReport> {
        if self.clock.is_over() {
            return Err(SimError::GameOver);
        }
        if self.events.is_handled(event_id) {
            return Err(SimError::EventAlreadyHandled { event_id: event_id.into() });
        }
        if self.clock.phase != TurnPhase::AwaitingChoice {
            return Err(SimError::InvalidPhase {
                expected: TurnPhase::AwaitingChoice,
                actual:   self.clock.phase,
            });
        }

        let (pending, response) = self.events.resolve_choice(&mut self.ledger, event_id, choice_id)?;
        self.record(response, pending.date)?;
        self.process_month_end()
    }

    /// Dismiss the month-end report.
    pub fn close_report(&mut self) -> SimResult<()> {
        if self.clock.phase != TurnPhase::ReportReady {
            return Err(SimError::InvalidPhase {
                expected: TurnPhase::ReportReady,
                actual:   self.clock.phase,
            });
        }
        self.clock.phase = TurnPhase::Idle;
        Ok(())
    }

    /// Spend one action point. False when none are left.
    pub fn use_action(&mut self) -> bool {
        self.clock.use_action()
    }

    /// Advance `n` months, answering every choice with the event's first
    /// option and closing each report. Stops early at game over.
    /// Returns the number of months played. Used by the runner and tests.
    pub fn run_months(&mut self, n: u32) -> SimResult<u32> {
        let mut played = 0;
        for _ in 0..n {
            if self.clock.is_over() {
                break;
            }
            match self.advance_month()? {
                TurnOutcome::Settled { .. } => self.close_report()?,
                TurnOutcome::AwaitingChoice { event_id } => {
                    let choice_id = self
                        .events
                        .pending()
                        .and_then(|p| p.event.choices.first())
                        .map(|c| c.id.clone())
                        .ok_or(SimError::NoPendingChoice)?;
                    self.resolve_choice(&event_id, &choice_id)?;
                    self.close_report()?;
                }
                TurnOutcome::GameOver { .. } => {}
            }
            played += 1;
        }
        Ok(played)
    }

    /// Month-end settlement. Every subsystem settles against the same
    /// pre-settlement ledger; deltas and report lines are applied after
    /// all of them have run.
    fn process_month_end(&mut self) -> SimResult<SettlementReport> {
        let date = self.clock.report_date;
        let turn = self.clock.turn;
        self.clock.phase = TurnPhase::Processing;

        let ctx = SettlementContext {
            date,
            ledger:  &self.ledger,
            economy: &self.economy,
        };
        let mut outputs: Vec<SettlementOutput> = Vec::with_capacity(self.subsystems.len());
        for (slot, subsystem) in &mut self.subsystems {
            let mut rng = self.rng_bank.for_subsystem_at_turn(*slot, turn);
            let output = subsystem.settle(&ctx, &mut rng)?;
            log::debug!(
                "turn={turn} {}: {} entries, {} deltas",
                subsystem.name(),
                output.entries.len(),
                output.deltas.len()
            );
            outputs.push(output);
        }

        let mut finance = None;
        for output in outputs {
            for (kind, amount) in output.deltas {
                let _ = self.ledger.update_resource(kind, amount);
            }
            for draft in output.entries {
                self.record(draft, date)?;
            }
            if output.finance.is_some() {
                finance = output.finance;
            }
        }

        if let Some(summary) = &finance {
            self.economy.record_month(summary);
            let net = summary.net();
            if net >= 0.0 {
                self.alerts.raise(AlertLevel::Low, format!("{date}: budget surplus of {net:.0} Cr"));
            } else {
                self.alerts.raise(AlertLevel::High, format!("{date}: budget deficit of {:.0} Cr", -net));
            }
        }

        self.clock.phase = TurnPhase::ReportReady;
        log::info!(
            "turn={turn} settled {date}; credits={:.0}",
            self.ledger.current(ResourceKind::Credits)
        );

        Ok(SettlementReport {
            date,
            entries: self.store.events_for_date(date)?,
            finance,
        })
    }

    fn collapse(&mut self, reason: CollapseReason, date: GameDate) -> SimResult<TurnOutcome> {
        log::warn!("turn={} colony collapsed: {reason:?}", self.clock.turn);
        self.clock.status = GameStatus::GameOver;
        self.clock.phase = TurnPhase::Idle;
        self.record(
            EventDraft::new(EventType::Crisis, "The colony has fallen", reason.describe())
                .severity(Severity::Negative),
            date,
        )?;
        self.alerts.raise(AlertLevel::Critical, reason.describe());
        Ok(TurnOutcome::GameOver { reason })
    }

    fn raise_ledger_alerts(&mut self) {
        for resource in self.ledger.alerting() {
            let level = if resource.alert_level == AlertLevel::Critical { "critical" } else { "low" };
            self.alerts.raise(
                resource.alert_level,
                format!("{} is {level}: {:.0} {}", resource.name, resource.current, resource.unit),
            );
        }
    }

    fn record(&self, draft: EventDraft, date: GameDate) -> SimResult<()> {
        self.store.append_event(&draft.dated(date))
    }

    /// Fail before anything changes when no action point is left.
    fn require_action(&self) -> SimResult<()> {
        if self.clock.remaining_actions() == 0 {
            return Err(SimError::NoActionsRemaining);
        }
        Ok(())
    }

    // ── Economy ────────────────────────────────────────────────

    pub fn set_tax_rate(&mut self, tax: TaxRateId, rate: f64) -> Mutation {
        self.economy.set_tax_rate(tax, rate)
    }

    /// Activate a policy for one action point. Its support change and
    /// resource effects hit the ledger once, now. Re-activating an
    /// active policy is a free no-op.
    pub fn activate_policy(&mut self, policy: EconomicPolicy) -> SimResult<Mutation> {
        if self.economy.is_active(&policy.id) {
            return Ok(Mutation::Unchanged);
        }
        self.require_action()?;
        let _ = self.clock.use_action();

        if let Some(change) = policy.effects.support_change {
            let _ = self.ledger.update_resource(ResourceKind::Support, change);
        }
        for effect in &policy.effects.resource_effects {
            let _ = self.ledger.update_resource(effect.resource, effect.amount);
        }
        Ok(self.economy.activate_policy(policy))
    }

    pub fn deactivate_policy(&mut self, policy_id: &str) -> Mutation {
        self.economy.deactivate_policy(policy_id)
    }

    // ── Citizenship ────────────────────────────────────────────

    pub fn add_citizen(&mut self, citizen: NewCitizen) -> EntityId {
        self.citizens.add_citizen(citizen)
    }

    pub fn update_citizen_status(&mut self, citizen_id: &str, status: CitizenshipStatus) -> Mutation {
        self.citizens.update_status(citizen_id, status)
    }

    pub fn update_military_service(&mut self, citizen_id: &str, years_served: u32) -> Mutation {
        self.citizens.update_military_service(citizen_id, years_served)
    }

    pub fn update_requirement(&mut self, citizen_id: &str, requirement_id: &str, completed: bool) -> Mutation {
        self.citizens.update_requirement(citizen_id, requirement_id, completed)
    }

    pub fn search_citizens(&self, name: &str, status: Option<CitizenshipStatus>) -> Vec<&Citizen> {
        self.citizens.search(name, status)
    }

    // ── Military training ──────────────────────────────────────

    /// Enrol a known citizen on a course for one action point. Returns
    /// `None`, spending nothing, when the citizen or course is unknown.
    pub fn start_training(&mut self, citizen_id: &str, course_id: &str) -> SimResult<Option<EntityId>> {
        if self.citizens.get(citizen_id).is_none() {
            log::debug!("training: start for unknown citizen '{citizen_id}'");
            return Ok(None);
        }
        self.require_action()?;
        let record = self.training.start_training(citizen_id, course_id)?;
        if record.is_some() {
            let _ = self.clock.use_action();
        }
        Ok(record)
    }

    pub fn update_training_progress(&mut self, course_id: &str, progress: f64) -> Mutation {
        self.training.update_progress(course_id, progress)
    }

    pub fn complete_training(&mut self, citizen_id: &str, course_id: &str, performance: f64) -> Mutation {
        self.training.complete_training(citizen_id, course_id, performance)
    }

    pub fn add_instructor_note(&mut self, record_id: &str, note: impl Into<String>) -> Mutation {
        self.training.add_instructor_note(record_id, note)
    }

    pub fn report_incident(
        &mut self,
        record_id:   &str,
        description: impl Into<String>,
        severity:    IncidentSeverity,
    ) -> Mutation {
        self.training.report_incident(record_id, description, severity)
    }

    pub fn add_instructor(&mut self, instructor: Instructor) {
        self.training.add_instructor(instructor);
    }

    pub fn add_facility(&mut self, facility: TrainingFacility) {
        self.training.add_facility(facility);
    }

    // ── Command dispatch ───────────────────────────────────────

    pub fn apply(&mut self, command: PlayerCommand) -> SimResult<CommandResult> {
        log::debug!("turn={} command: {command:?}", self.clock.turn);
        let result = match command {
            PlayerCommand::AdvanceMonth => CommandResult::Turn { outcome: self.advance_month()? },
            PlayerCommand::ResolveChoice { event_id, choice_id } => CommandResult::Settled {
                report: self.resolve_choice(&event_id, &choice_id)?,
            },
            PlayerCommand::CloseReport => {
                self.close_report()?;
                CommandResult::Mutation { mutation: Mutation::Applied }
            }
            PlayerCommand::UseAction => CommandResult::ActionUsed { granted: self.use_action() },
            PlayerCommand::SetTaxRate { tax, rate } => CommandResult::Mutation {
                mutation: self.set_tax_rate(tax, rate),
            },
            PlayerCommand::ActivatePolicy { policy } => CommandResult::Mutation {
                mutation: self.activate_policy(policy)?,
            },
            PlayerCommand::DeactivatePolicy { policy_id } => CommandResult::Mutation {
                mutation: self.deactivate_policy(&policy_id),
            },
            PlayerCommand::AddCitizen { citizen } => CommandResult::Created { id: self.add_citizen(citizen) },
            PlayerCommand::UpdateCitizenStatus { citizen_id, status } => CommandResult::Mutation {
                mutation: self.update_citizen_status(&citizen_id, status),
            },
            PlayerCommand::UpdateMilitaryService { citizen_id, years_served } => CommandResult::Mutation {
                mutation: self.update_military_service(&citizen_id, years_served),
            },
            PlayerCommand::UpdateRequirement { citizen_id, requirement_id, completed } => {
                CommandResult::Mutation {
                    mutation: self.update_requirement(&citizen_id, &requirement_id, completed),
                }
            }
            PlayerCommand::StartTraining { citizen_id, course_id } => {
                match self.start_training(&citizen_id, &course_id)? {
                    Some(id) => CommandResult::Created { id },
                    None => CommandResult::NotCreated,
                }
            }
            PlayerCommand::UpdateTrainingProgress { course_id, progress } => CommandResult::Mutation {
                mutation: self.update_training_progress(&course_id, progress),
            },
            PlayerCommand::CompleteTraining { citizen_id, course_id, performance } => {
                CommandResult::Mutation {
                    mutation: self.complete_training(&citizen_id, &course_id, performance),
                }
            }
            PlayerCommand::AddInstructorNote { record_id, note } => CommandResult::Mutation {
                mutation: self.add_instructor_note(&record_id, note),
            },
            PlayerCommand::ReportIncident { record_id, description, severity } => {
                CommandResult::Mutation {
                    mutation: self.report_incident(&record_id, description, severity),
                }
            }
        };
        Ok(result)
    }

    // ── Reads ──────────────────────────────────────────────────

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    pub fn economy(&self) -> &Economy {
        &self.economy
    }

    pub fn events(&self) -> &EventSubsystem {
        &self.events
    }

    pub fn pending_choice(&self) -> Option<&PendingChoice> {
        self.events.pending()
    }

    pub fn citizens(&self) -> &CitizenRegistry {
        &self.citizens
    }

    pub fn training(&self) -> &TrainingProgram {
        &self.training
    }

    pub fn alerts(&self) -> &AlertFeed {
        &self.alerts
    }

    /// The latest month-end report: every entry dated with the report date.
    pub fn monthly_report(&self) -> SimResult<Vec<MonthlyEvent>> {
        self.store.events_for_date(self.clock.report_date)
    }

    /// The whole chronicle, oldest first.
    pub fn history(&self) -> SimResult<Vec<MonthlyEvent>> {
        self.store.all_events()
    }

    pub fn history_search(&self, query: &HistoryQuery) -> SimResult<Vec<MonthlyEvent>> {
        self.store.search(query)
    }

    pub fn history_len(&self) -> SimResult<i64> {
        self.store.count()
    }

    pub fn snapshot(&self) -> SimResult<SimSnapshot> {
        Ok(SimSnapshot {
            run_id:            self.run_id.clone(),
            seed:              self.seed,
            clock:             self.clock.clone(),
            ledger:            self.ledger.clone(),
            monthly_stats:     *self.economy.monthly_stats(),
            active_policies:   self.economy.active_policies().to_vec(),
            pending:           self.events.pending().cloned(),
            handled_events:    self.events.handled().to_vec(),
            alerts:            self.alerts.iter().cloned().collect(),
            citizenship_stats: *self.citizens.stats(),
            citizens:          self.citizens.citizens().to_vec(),
            training:          self.training.clone(),
            history_len:       self.store.count()?,
        })
    }
}
