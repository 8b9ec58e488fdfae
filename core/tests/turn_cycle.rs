//! Turn controller tests: calendar, phases, action points and game over.

use colony_core::{
    catalog::EventCatalog,
    clock::{GameDate, GameStatus, TurnPhase},
    command::{CommandResult, PlayerCommand},
    config::SimConfig,
    engine::{SimEngine, TurnOutcome},
    error::SimError,
    event::EventType,
    ledger::{AlertLevel, CollapseReason, ResourceKind},
    store::HistoryQuery,
};

fn quiet_config() -> SimConfig {
    SimConfig::with_catalog(EventCatalog::empty())
}

fn engine_from(run_id: &str, config: SimConfig) -> SimEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    SimEngine::build(run_id.into(), 42, config).expect("engine")
}

#[test]
fn each_advance_moves_exactly_one_month() {
    let mut config = quiet_config();
    config.start_date = GameDate::new(2157, 10);
    // Keep the colony alive long enough to cross a year boundary.
    for kind in [ResourceKind::Food, ResourceKind::Energy] {
        if let Some(spec) = config.resource_spec_mut(kind) {
            spec.initial = spec.max;
            spec.grace_turns = None;
        }
    }
    let mut engine = engine_from("turn-monotonic", config);

    let mut expected = GameDate::new(2157, 10);
    for _ in 0..6 {
        let before = engine.clock.current_date;
        assert_eq!(before, expected);
        engine.advance_month().unwrap();
        expected = before.next();
        assert_eq!(engine.clock.current_date, expected);
    }
    assert_eq!(engine.clock.current_date, GameDate::new(2158, 4));
    assert_eq!(engine.clock.turn, 7);
}

#[test]
fn reports_are_dated_with_the_month_that_ended() {
    let mut engine = engine_from("turn-report-date", quiet_config());
    let TurnOutcome::Settled { report } = engine.advance_month().unwrap() else {
        panic!("expected settlement");
    };

    assert_eq!(engine.clock.report_date, GameDate::new(2157, 3));
    assert_eq!(engine.clock.current_date, GameDate::new(2157, 4));
    assert_eq!(report.date, GameDate::new(2157, 3));
    assert!(report.entries.iter().all(|e| e.date == GameDate::new(2157, 3)));

    let stored: Vec<String> = engine.monthly_report().unwrap().into_iter().map(|e| e.id).collect();
    let returned: Vec<String> = report.entries.iter().map(|e| e.id.clone()).collect();
    assert_eq!(stored, returned);
}

#[test]
fn phases_follow_the_turn() {
    let mut engine = engine_from("turn-phases", quiet_config());
    assert_eq!(engine.clock.phase, TurnPhase::Idle);
    assert!(matches!(
        engine.close_report(),
        Err(SimError::InvalidPhase { expected: TurnPhase::ReportReady, actual: TurnPhase::Idle })
    ));

    engine.advance_month().unwrap();
    assert_eq!(engine.clock.phase, TurnPhase::ReportReady);
    engine.close_report().unwrap();
    assert_eq!(engine.clock.phase, TurnPhase::Idle);

    // Advancing straight from an open report is allowed.
    engine.advance_month().unwrap();
    engine.advance_month().unwrap();
    assert_eq!(engine.clock.turn, 4);
}

#[test]
fn action_points_reset_on_advance() {
    let mut engine = engine_from("turn-actions", quiet_config());
    assert!(engine.use_action());
    assert!(engine.use_action());
    assert!(engine.use_action());
    assert!(!engine.use_action());
    assert_eq!(engine.clock.remaining_actions(), 0);

    engine.advance_month().unwrap();
    assert_eq!(engine.clock.remaining_actions(), 3);
}

#[test]
fn decay_alerts_reach_the_feed() {
    let mut config = quiet_config();
    if let Some(food) = config.resource_spec_mut(ResourceKind::Food) {
        food.initial = 2_000.0;
    }
    let mut engine = engine_from("turn-alerts", config);
    engine.advance_month().unwrap();

    let alerts: Vec<_> = engine.alerts().iter().collect();
    assert!(alerts.iter().any(|a| a.level == AlertLevel::High && a.message.starts_with("Food")));
    assert!(alerts.len() <= 5);
}

#[test]
fn an_empty_colony_ends_the_game_at_once() {
    let mut config = quiet_config();
    if let Some(population) = config.resource_spec_mut(ResourceKind::Population) {
        population.initial = 0.0;
    }
    let mut engine = engine_from("turn-depopulation", config);

    let outcome = engine.advance_month().unwrap();
    assert!(matches!(outcome, TurnOutcome::GameOver { reason: CollapseReason::Depopulation }));
    assert_eq!(engine.clock.status, GameStatus::GameOver);
    assert_eq!(engine.clock.phase, TurnPhase::Idle);

    // Nothing but the collapse entry was written.
    let history = engine.history().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind, EventType::Crisis);
    assert_eq!(history[0].date, GameDate::new(2157, 3));
}

#[test]
fn famine_waits_out_the_grace_period() {
    let mut config = quiet_config();
    if let Some(food) = config.resource_spec_mut(ResourceKind::Food) {
        food.initial = 0.0;
    }
    let mut engine = engine_from("turn-famine", config);

    assert!(matches!(engine.advance_month().unwrap(), TurnOutcome::Settled { .. }));
    assert!(matches!(engine.advance_month().unwrap(), TurnOutcome::Settled { .. }));
    assert!(matches!(
        engine.advance_month().unwrap(),
        TurnOutcome::GameOver { reason: CollapseReason::Famine }
    ));
}

#[test]
fn blackout_waits_out_the_energy_grace_period() {
    let mut config = quiet_config();
    if let Some(energy) = config.resource_spec_mut(ResourceKind::Energy) {
        energy.initial = 0.0;
    }
    let mut engine = engine_from("turn-blackout", config);

    assert!(matches!(engine.advance_month().unwrap(), TurnOutcome::Settled { .. }));
    assert_eq!(engine.ledger().get(ResourceKind::Energy).grace_remaining, Some(1));
    assert!(matches!(
        engine.advance_month().unwrap(),
        TurnOutcome::GameOver { reason: CollapseReason::Blackout }
    ));
    assert_eq!(engine.clock.status, GameStatus::GameOver);
}

#[test]
fn revolt_waits_out_the_support_grace_period() {
    let mut config = quiet_config();
    if let Some(support) = config.resource_spec_mut(ResourceKind::Support) {
        support.initial = 0.0;
    }
    // Enough power to outlast support's five grace turns.
    if let Some(energy) = config.resource_spec_mut(ResourceKind::Energy) {
        energy.initial = 200_000.0;
        energy.max = 200_000.0;
    }
    let mut engine = engine_from("turn-revolt", config);

    for turn in 1..=4 {
        let outcome = engine.advance_month().unwrap();
        assert!(matches!(outcome, TurnOutcome::Settled { .. }), "turn {turn}: {outcome:?}");
    }
    // Monthly swings of at most +2 cannot lift support past its critical line.
    assert_eq!(engine.ledger().get(ResourceKind::Support).grace_remaining, Some(1));
    assert!(matches!(
        engine.advance_month().unwrap(),
        TurnOutcome::GameOver { reason: CollapseReason::Revolt }
    ));

    let crisis = engine.history_search(&HistoryQuery::default().kind(EventType::Crisis)).unwrap();
    assert_eq!(crisis.len(), 1);
}

#[test]
fn game_over_blocks_further_turns() {
    let mut config = quiet_config();
    if let Some(population) = config.resource_spec_mut(ResourceKind::Population) {
        population.initial = 0.0;
    }
    let mut engine = engine_from("turn-blocked", config);
    engine.advance_month().unwrap();

    let date = engine.clock.current_date;
    let turn = engine.clock.turn;
    assert!(matches!(engine.advance_month(), Err(SimError::GameOver)));
    assert!(matches!(engine.resolve_choice("any", "thing"), Err(SimError::GameOver)));
    assert!(matches!(engine.apply(PlayerCommand::AdvanceMonth), Err(SimError::GameOver)));
    assert_eq!(engine.clock.current_date, date);
    assert_eq!(engine.clock.turn, turn);
    assert_eq!(engine.run_months(5).unwrap(), 0);
}

#[test]
fn commands_round_trip_through_json() {
    let mut engine = engine_from("turn-json", quiet_config());

    let command: PlayerCommand = serde_json::from_str(r#"{"cmd":"advance_month"}"#).unwrap();
    let result = engine.apply(command).unwrap();
    assert!(matches!(result, CommandResult::Turn { outcome: TurnOutcome::Settled { .. } }));

    let command: PlayerCommand = serde_json::from_str(r#"{"cmd":"close_report"}"#).unwrap();
    engine.apply(command).unwrap();
    assert_eq!(engine.clock.phase, TurnPhase::Idle);

    let command: PlayerCommand =
        serde_json::from_str(r#"{"cmd":"set_tax_rate","tax":"citizen_tax","rate":12.5}"#).unwrap();
    engine.apply(command).unwrap();
    assert_eq!(engine.economy().config().tax_rates.citizen_tax.rate, 12.5);

    let reply = serde_json::to_value(engine.apply(PlayerCommand::UseAction).unwrap()).unwrap();
    assert_eq!(reply["result"], "action_used");
    assert_eq!(reply["granted"], true);
}

#[test]
fn snapshot_reflects_engine_state() {
    let mut engine = engine_from("turn-snapshot", quiet_config());
    engine.advance_month().unwrap();

    let snapshot = engine.snapshot().unwrap();
    assert_eq!(snapshot.run_id, "turn-snapshot");
    assert_eq!(snapshot.clock, engine.clock);
    assert_eq!(&snapshot.ledger, engine.ledger());
    assert_eq!(snapshot.history_len, engine.history_len().unwrap());
    assert!(snapshot.pending.is_none());

    let json = serde_json::to_string(&snapshot).unwrap();
    assert!(json.contains("\"phase\":\"report_ready\""));
}
