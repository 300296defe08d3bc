//! CLI argument definitions using clap.

use clap::{CommandFactory, FromArgMatches, Parser, ValueEnum};
use std::path::PathBuf;

use segmentation::DEFAULT_BATCH_SIZE;

/// kneeseg - knee MRI tissue segmentation
#[derive(Parser, Debug, Clone)]
#[command(
    name = "kneeseg",
    author,
    version,
    about = "Segment knee tissues from MRI DICOM series",
    long_about = "Segments cartilage and meniscus from a knee MRI DICOM series with pretrained \n\
                  ONNX models and writes one TIFF mask per tissue.\n\n\
                  For DESS acquisitions, optionally estimates per-tissue T2 relaxation times."
)]
pub struct Cli {
    /// DICOM series directory
    #[arg(short, long, env = "KNEESEG_DICOM")]
    pub dicom: Option<PathBuf>,

    /// Output directory for masks (default: the DICOM directory)
    #[arg(short, long, env = "KNEESEG_SAVE")]
    pub save: Option<PathBuf>,

    /// Only read DICOM files with this extension
    #[arg(short, long)]
    pub ext: Option<String>,

    /// Segment femoral cartilage
    #[arg(short = 'f')]
    pub femoral_cartilage: bool,

    /// Segment tibial cartilage
    #[arg(short = 't')]
    pub tibial_cartilage: bool,

    /// Segment meniscus
    #[arg(short = 'm')]
    pub meniscus: bool,

    /// Segment patellar cartilage
    #[arg(short = 'p')]
    pub patellar_cartilage: bool,

    /// DESS acquisition (two interleaved echoes)
    #[arg(long)]
    pub dess: bool,

    /// Calculate T2 maps for the segmented tissues (requires --dess)
    #[arg(long)]
    pub t2: bool,

    /// Slices per inference batch
    #[arg(
        long = "batch_size",
        alias = "batch-size",
        default_value_t = DEFAULT_BATCH_SIZE,
        env = "KNEESEG_BATCH_SIZE"
    )]
    pub batch_size: usize,

    /// Inference device id, e.g. "0" (only the first of a list is used)
    #[arg(long, env = "KNEESEG_GPU")]
    pub gpu: Option<String>,

    /// Settings file (TOML or JSON)
    #[arg(short, long, env = "KNEESEG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the model weights directory
    #[arg(long, env = "KNEESEG_WEIGHTS")]
    pub weights: Option<PathBuf>,

    /// Also write the T2 summaries to this JSON file
    #[arg(long, requires = "t2")]
    pub t2_report: Option<PathBuf>,

    /// Validate arguments and print the plan without loading any data
    #[arg(long)]
    pub dry_run: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, env = "KNEESEG_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty", env = "KNEESEG_LOG_FORMAT")]
    pub log_format: LogFormat,
}

impl Cli {
    /// Parse `argv` with every `KNEESEG_*` environment fallback disabled.
    ///
    /// The result depends on the arguments alone, whatever the shell or a
    /// loaded `.env` file exports.
    pub fn try_parse_args_only<I, T>(argv: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = Self::command()
            .mut_args(|arg| arg.env(None::<&'static str>))
            .try_get_matches_from(argv)?;
        Self::from_arg_matches(&matches)
    }
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
