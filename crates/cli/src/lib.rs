//! # kneeseg CLI
//!
//! Argument resolution and pipeline orchestration behind the `kneeseg`
//! binary, exposed as a library so the pipeline can be driven with mock
//! collaborators.

pub mod cli;
pub mod commands;
pub mod error;
pub mod pipeline;
pub mod resolve;

pub use cli::{Cli, LogFormat};
pub use error::{CliError, Result};
pub use pipeline::{MaskOutput, Pipeline, RunStats};
pub use resolve::{resolve_args, selected_tissues, RunPlan};
