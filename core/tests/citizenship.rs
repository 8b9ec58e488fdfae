//! Citizenship registry tests: records, status moves and stat bookkeeping.

use colony_core::{
    catalog::EventCatalog,
    citizenship::{Citizen, CitizenshipStats, CitizenshipStatus, NewCitizen},
    command::{CommandResult, PlayerCommand},
    config::SimConfig,
    engine::SimEngine,
    types::Mutation,
};

fn engine() -> SimEngine {
    SimEngine::build("citizens-test".into(), 42, SimConfig::with_catalog(EventCatalog::empty()))
        .expect("engine")
}

fn recruit(name: &str) -> NewCitizen {
    NewCitizen {
        name: name.into(),
        status: CitizenshipStatus::Civilian,
        military_service: Default::default(),
        requirements: Vec::new(),
        voting_rights: false,
        contributions: Default::default(),
    }
}

#[test]
fn seeded_registry_matches_the_colony_breakdown() {
    let engine = engine();
    let stats = *engine.citizens().stats();
    assert_eq!(
        stats,
        CitizenshipStats { total_population: 20_000, citizens: 5_420, trainees: 2_180, civilians: 12_400 }
    );
    assert_eq!(engine.citizens().citizens().len(), 3);
    assert!(engine.citizens().get("1").unwrap().requirements_met());
    assert!(!engine.citizens().get("2").unwrap().requirements_met());
}

#[test]
fn adding_a_citizen_bumps_its_bucket_and_the_total() {
    let mut engine = engine();
    let id = engine.add_citizen(recruit("Dizzy Flores"));

    assert_eq!(id.len(), 36, "expected a UUID, got {id}");
    let stats = engine.citizens().stats();
    assert_eq!(stats.civilians, 12_401);
    assert_eq!(stats.total_population, 20_001);
    assert_eq!(engine.citizens().get(&id).unwrap().name, "Dizzy Flores");
}

#[test]
fn status_changes_move_one_count_between_buckets() {
    let mut engine = engine();
    assert_eq!(engine.update_citizen_status("3", CitizenshipStatus::Trainee), Mutation::Applied);

    let stats = engine.citizens().stats();
    assert_eq!(stats.civilians, 12_399);
    assert_eq!(stats.trainees, 2_181);
    assert_eq!(stats.total_population, 20_000);

    assert_eq!(engine.update_citizen_status("3", CitizenshipStatus::Trainee), Mutation::Unchanged);
    assert_eq!(engine.citizens().stats().trainees, 2_181);
}

#[test]
fn unknown_citizens_are_ignored() {
    let mut engine = engine();
    let before = *engine.citizens().stats();

    assert_eq!(engine.update_citizen_status("nobody", CitizenshipStatus::Citizen), Mutation::UnknownId);
    assert_eq!(engine.update_military_service("nobody", 3), Mutation::UnknownId);
    assert_eq!(engine.update_requirement("nobody", "1", true), Mutation::UnknownId);
    assert_eq!(engine.update_requirement("3", "99", true), Mutation::UnknownId);
    assert_eq!(*engine.citizens().stats(), before);
}

#[test]
fn service_completes_after_two_years() {
    let mut engine = engine();
    assert_eq!(engine.update_military_service("3", 1), Mutation::Applied);
    let service = engine.citizens().get("3").unwrap().military_service;
    assert!(service.started);
    assert!(!service.completed);

    let _ = engine.update_military_service("3", 2);
    let service = engine.citizens().get("3").unwrap().military_service;
    assert!(service.completed);
    assert_eq!(service.years_served, 2);
}

#[test]
fn requirements_can_be_ticked_off() {
    let mut engine = engine();
    assert_eq!(engine.update_requirement("2", "2", true), Mutation::Applied);
    assert_eq!(engine.update_requirement("2", "3", true), Mutation::Applied);
    assert!(engine.citizens().get("2").unwrap().requirements_met());
}

fn names(hits: Vec<&Citizen>) -> Vec<String> {
    hits.into_iter().map(|c| c.name.clone()).collect()
}

#[test]
fn search_matches_name_and_status() {
    let engine = engine();
    assert_eq!(names(engine.search_citizens("RICO", None)), ["Johnny Rico"]);
    assert_eq!(names(engine.search_citizens("", Some(CitizenshipStatus::Citizen))), ["Johnny Rico"]);
    assert_eq!(names(engine.search_citizens("a", Some(CitizenshipStatus::Trainee))), ["Carmen Ibanez"]);
    assert!(engine.search_citizens("zim", None).is_empty());
}

#[test]
fn citizen_commands_dispatch_from_json() {
    let mut engine = engine();

    let add: PlayerCommand = serde_json::from_str(
        r#"{"cmd":"add_citizen","citizen":{"name":"Sugar Watkins","status":"TRAINEE"}}"#,
    )
    .unwrap();
    let CommandResult::Created { id } = engine.apply(add).unwrap() else {
        panic!("add_citizen should create a record");
    };
    assert_eq!(engine.citizens().get(&id).unwrap().status, CitizenshipStatus::Trainee);

    let promote: PlayerCommand = serde_json::from_str(&format!(
        r#"{{"cmd":"update_citizen_status","citizen_id":"{id}","status":"CITIZEN"}}"#
    ))
    .unwrap();
    let result = engine.apply(promote).unwrap();
    assert!(matches!(result, CommandResult::Mutation { mutation: Mutation::Applied }));
    assert_eq!(engine.citizens().stats().citizens, 5_421);
    assert_eq!(engine.citizens().stats().trainees, 2_180);
}

#[test]
fn snapshot_carries_citizens_and_training() {
    let mut engine = engine();
    let id = engine.add_citizen(recruit("Dizzy Flores"));
    let record_id = engine.start_training(&id, "1").unwrap().expect("record");

    let json = serde_json::to_string(&engine.snapshot().unwrap()).unwrap();
    let snapshot: serde_json::Value = serde_json::from_str(&json).unwrap();

    let citizens = snapshot["citizens"].as_array().expect("citizens");
    assert_eq!(citizens.len(), 4);
    assert!(citizens.iter().any(|c| c["id"] == id.as_str()));
    assert_eq!(snapshot["citizenship_stats"]["civilians"], 12_401);

    let records = snapshot["training"]["records"].as_array().expect("records");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], record_id.as_str());
    assert_eq!(snapshot["training"]["courses"].as_array().map(Vec::len), Some(3));
}
