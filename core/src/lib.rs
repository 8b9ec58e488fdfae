//! colony-core: a deterministic, turn-based colony management simulation.
//!
//! One turn is one in-game month. `engine::SimEngine` owns every piece of
//! state and is the only entry point for mutation.

pub mod alerts;
pub mod catalog;
pub mod citizenship;
pub mod clock;
pub mod command;
pub mod config;
pub mod consumption_subsystem;
pub mod economics_subsystem;
pub mod engine;
pub mod error;
pub mod event;
pub mod event_subsystem;
pub mod ledger;
pub mod military;
pub mod population_subsystem;
pub mod rng;
pub mod snapshot;
pub mod store;
pub mod subsystem;
pub mod support_subsystem;
pub mod types;
