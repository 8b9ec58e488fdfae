//! Resource ledger tests: bounds, decay, alerts and the collapse check.

use colony_core::{
    catalog::EventCatalog,
    config::SimConfig,
    ledger::{AlertLevel, CollapseReason, ResourceKind, ResourceLedger},
    rng::{RngBank, SubsystemSlot},
    types::Mutation,
};

fn ledger() -> ResourceLedger {
    ResourceLedger::from_specs(&SimConfig::with_catalog(EventCatalog::empty()).resources)
}

#[test]
fn bounds_hold_after_every_update() {
    let mut ledger = ledger();
    let mut rng = RngBank::new(0xC0FFEE).for_subsystem_at_turn(SubsystemSlot::Events, 1);

    for step in 0..2_000 {
        let kind = ResourceKind::ALL[rng.next_index(ResourceKind::ALL.len())];
        let delta = rng.range_f64(-2_000_000.0, 2_000_000.0);
        let _ = ledger.update_resource(kind, delta);

        for r in ledger.iter() {
            assert!(
                r.min <= r.current && r.current <= r.max,
                "step {step}: {} out of bounds: {} not in [{}, {}]",
                r.name, r.current, r.min, r.max
            );
        }
    }
}

#[test]
fn out_of_range_updates_report_clamping() {
    let mut ledger = ledger();
    assert_eq!(ledger.update_resource(ResourceKind::Military, 10_000.0), Mutation::Clamped);
    assert_eq!(ledger.current(ResourceKind::Military), 8_000.0);
    assert_eq!(ledger.update_resource(ResourceKind::Population, -1.0), Mutation::Applied);
    assert_eq!(ledger.current(ResourceKind::Population), 19_999.0);
}

#[test]
fn population_decays_one_percent_and_stays_calm() {
    let mut ledger = ledger();
    ledger.decay();

    let population = ledger.get(ResourceKind::Population);
    assert!(
        (population.current - 19_800.0).abs() < 1e-6,
        "expected 19800, got {}",
        population.current
    );
    assert_eq!(population.alert_level, AlertLevel::None);
}

#[test]
fn decay_strictly_decreases_positive_resources() {
    let mut ledger = ledger();
    for pass in 0..30 {
        let before: Vec<(ResourceKind, f64)> =
            ledger.iter().map(|r| (r.kind, r.current)).collect();
        ledger.decay();
        for (kind, old) in before {
            let r = ledger.get(kind);
            if r.decay_rate > 0.0 && old > r.min && old > 0.0 {
                assert!(r.current < old, "pass {pass}: {kind} did not decrease ({old} -> {})", r.current);
            } else {
                assert_eq!(r.current, old.max(r.min));
            }
        }
    }
}

#[test]
fn decay_shrinks_debt_toward_zero() {
    let mut ledger = ledger();
    assert_eq!(ledger.update_resource(ResourceKind::Credits, -110_000.0), Mutation::Applied);
    assert_eq!(ledger.current(ResourceKind::Credits), -10_000.0);

    ledger.decay();
    let credits = ledger.current(ResourceKind::Credits);
    assert!((credits - -9_800.0).abs() < 1e-6, "expected -9800, got {credits}");
}

#[test]
fn decay_holds_a_resource_at_its_minimum() {
    let mut ledger = ledger();
    let _ = ledger.update_resource(ResourceKind::Food, -1_000_000.0);
    ledger.decay();
    assert_eq!(ledger.current(ResourceKind::Food), 0.0);
}

#[test]
fn alert_level_is_a_function_of_value_and_thresholds() {
    let mut ledger = ledger();
    let _ = ledger.update_resource(ResourceKind::Food, -7_500.0); // 2500
    let _ = ledger.update_resource(ResourceKind::Energy, -7_500.0); // 500
    ledger.decay();

    for r in ledger.iter() {
        assert_eq!(
            r.alert_level,
            AlertLevel::from_thresholds(r.current, r.critical_threshold, r.warning_threshold),
            "{} has an inconsistent alert level",
            r.name
        );
    }
    assert_eq!(ledger.get(ResourceKind::Food).alert_level, AlertLevel::High);
    assert_eq!(ledger.get(ResourceKind::Energy).alert_level, AlertLevel::Critical);

    let alerting: Vec<ResourceKind> = ledger.alerting().map(|r| r.kind).collect();
    assert!(alerting.contains(&ResourceKind::Food));
    assert!(alerting.contains(&ResourceKind::Energy));
    assert!(!alerting.contains(&ResourceKind::Population));
}

#[test]
fn famine_only_after_grace_runs_out() {
    let mut ledger = ledger();
    let _ = ledger.update_resource(ResourceKind::Food, -1_000_000.0);

    ledger.decay();
    assert_eq!(ledger.collapse_reason(), None);
    ledger.decay();
    assert_eq!(ledger.collapse_reason(), None);
    ledger.decay();
    assert_eq!(ledger.collapse_reason(), Some(CollapseReason::Famine));
}

#[test]
fn empty_colony_collapses_immediately() {
    let mut ledger = ledger();
    let _ = ledger.update_resource(ResourceKind::Population, -1_000_000.0);
    assert_eq!(ledger.collapse_reason(), Some(CollapseReason::Depopulation));
}
