//! Pipeline orchestration module.

mod orchestrator;
mod stats;

pub use orchestrator::{MaskOutput, Pipeline};
pub use stats::RunStats;
