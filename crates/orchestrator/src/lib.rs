//! Orchestrator - scan coordination and progress accounting

mod orchestrator;
mod progress;

pub use orchestrator::{OutcomeStream, ScanCoordinator};
pub use progress::ProgressTracker;
