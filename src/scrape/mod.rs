pub mod orchestrator;
pub mod runner;

pub use orchestrator::{CycleReport, Orchestrator};
