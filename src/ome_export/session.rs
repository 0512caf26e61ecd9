//! Export session module
//!
//! Drives a container writer through one export: open with a model, route
//! plane writes to the right series, close.

mod orchestrator;
mod stats;

#[cfg(test)]
mod tests;

pub use orchestrator::{ExportSession, SessionState};
pub use stats::SessionStats;
