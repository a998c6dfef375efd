pub mod types;
pub mod error;
pub mod clock;
pub mod config;
pub mod state;
pub mod snapshot;
pub mod timeseries;
pub mod subsystem;
pub mod policy_subsystem;
pub mod production_subsystem;
pub mod labor_subsystem;
pub mod stability_subsystem;
pub mod treasury_subsystem;
pub mod capital_subsystem;
pub mod model;
pub mod engine;
pub mod scenarios;
pub mod rng;
pub mod stats;
pub mod sensitivity;
pub mod store;
