//! Command implementations.

mod segment;

pub use segment::{run_segment, write_t2_report};
