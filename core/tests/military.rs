//! Military training tests: enrolment, prerequisites, progress and records.

use colony_core::{
    catalog::EventCatalog,
    config::SimConfig,
    engine::SimEngine,
    error::SimError,
    military::{IncidentSeverity, Instructor, TrainingLevel, TrainingType},
    types::Mutation,
};

fn engine() -> SimEngine {
    SimEngine::build("training-test".into(), 42, SimConfig::with_catalog(EventCatalog::empty()))
        .expect("engine")
}

fn level(engine: &SimEngine, course_id: &str) -> TrainingLevel {
    engine.training().course(course_id).expect("course").level
}

#[test]
fn starting_a_course_opens_a_record_and_spends_an_action() {
    let mut engine = engine();
    let record_id = engine.start_training("3", "1").unwrap().expect("record");

    assert_eq!(engine.clock.remaining_actions(), 2);
    assert_eq!(level(&engine, "1"), TrainingLevel::InProgress);
    assert_eq!(engine.training().course("1").unwrap().progress, 0.0);

    let record = &engine.training().records()[0];
    assert_eq!(record.id, record_id);
    assert_eq!(record.citizen_id, "3");
    assert!(record.completed_at.is_none());
}

#[test]
fn prerequisites_must_be_finished_first() {
    let mut engine = engine();

    let blocked = engine.start_training("3", "2");
    assert!(matches!(blocked, Err(SimError::PrerequisitesNotMet { ref course_id, .. }) if course_id == "2"));
    assert_eq!(engine.clock.remaining_actions(), 3, "a rejected enrolment costs nothing");
    assert!(engine.training().records().is_empty());

    engine.start_training("3", "1").unwrap();
    let _ = engine.complete_training("3", "1", 88.0);
    assert!(engine.start_training("3", "2").unwrap().is_some());

    // Alien combat needs the powered suit course too.
    assert!(matches!(engine.start_training("3", "3"), Err(SimError::PrerequisitesNotMet { .. })));
}

#[test]
fn unknown_citizen_or_course_creates_nothing() {
    let mut engine = engine();
    assert_eq!(engine.start_training("nobody", "1").unwrap(), None);
    assert_eq!(engine.start_training("3", "99").unwrap(), None);
    assert_eq!(engine.clock.remaining_actions(), 3);
}

#[test]
fn enrolment_needs_an_action_point() {
    let mut engine = engine();
    while engine.use_action() {}
    assert!(matches!(engine.start_training("3", "1"), Err(SimError::NoActionsRemaining)));
    assert_eq!(level(&engine, "1"), TrainingLevel::NotStarted);
}

#[test]
fn progress_is_clamped_to_percent() {
    let mut engine = engine();
    assert_eq!(engine.update_training_progress("1", 40.0), Mutation::Applied);
    assert_eq!(engine.training().course("1").unwrap().progress, 40.0);
    assert_eq!(engine.update_training_progress("1", 150.0), Mutation::Clamped);
    assert_eq!(engine.training().course("1").unwrap().progress, 100.0);
    assert_eq!(engine.update_training_progress("1", -5.0), Mutation::Clamped);
    assert_eq!(engine.training().course("1").unwrap().progress, 0.0);
    assert_eq!(engine.update_training_progress("99", 10.0), Mutation::UnknownId);
}

#[test]
fn completion_closes_the_record() {
    let mut engine = engine();
    engine.start_training("2", "1").unwrap();

    assert_eq!(engine.complete_training("2", "1", 120.0), Mutation::Clamped);
    let course = engine.training().course("1").unwrap();
    assert_eq!(course.level, TrainingLevel::Completed);
    assert_eq!(course.progress, 100.0);

    let record = &engine.training().records()[0];
    assert!(record.completed_at.is_some());
    assert_eq!(record.performance, 100.0);
}

#[test]
fn notes_and_incidents_attach_to_records() {
    let mut engine = engine();
    let record_id = engine.start_training("3", "1").unwrap().expect("record");

    assert_eq!(engine.add_instructor_note(&record_id, "Shows promise"), Mutation::Applied);
    assert_eq!(
        engine.report_incident(&record_id, "Live-fire accident", IncidentSeverity::High),
        Mutation::Applied
    );
    assert_eq!(engine.add_instructor_note("missing", "lost"), Mutation::UnknownId);

    let record = &engine.training().records()[0];
    assert_eq!(record.instructor_notes, ["Shows promise"]);
    assert_eq!(record.incidents.len(), 1);
    assert_eq!(record.incidents[0].severity, IncidentSeverity::High);
}

#[test]
fn instructors_are_found_by_specialty() {
    let mut engine = engine();
    engine.add_instructor(Instructor {
        id: "i1".into(),
        name: "Career Sergeant Zim".into(),
        rank: "Sergeant".into(),
        specialties: vec![TrainingType::BasicTraining, TrainingType::Weapons],
        years_of_experience: 15,
    });
    engine.add_instructor(Instructor {
        id: "i2".into(),
        name: "Lieutenant Rasczak".into(),
        rank: "Lieutenant".into(),
        specialties: vec![TrainingType::PoweredSuit, TrainingType::Tactics],
        years_of_experience: 10,
    });

    let suit: Vec<&str> = engine
        .training()
        .instructors_for(TrainingType::PoweredSuit)
        .into_iter()
        .map(|i| i.id.as_str())
        .collect();
    assert_eq!(suit, ["i2"]);
    assert!(engine.training().instructors_for(TrainingType::AlienCombat).is_empty());
}
