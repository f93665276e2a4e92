pub mod config;
pub mod error;
pub mod financing;
pub mod indexation;
pub mod ledger;
pub mod telemetry;
