//! Argument resolution
//!
//! Turns parsed flags into a validated `RunPlan`. Every check runs before
//! any filesystem side effect; the save directory is created last.

use std::path::PathBuf;

use config_loader::ConfigLoader;
use contracts::{Settings, Tissue, DESS_ECHOS};
use segmentation::InferenceConfig;
use tracing::{debug, info};

use crate::cli::Cli;
use crate::error::{CliError, Result};

/// Validated parameters of one run
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub dicom_dir: PathBuf,
    pub save_dir: PathBuf,
    pub extension: Option<String>,
    /// Requested tissues in canonical order
    pub tissues: Vec<Tissue>,
    pub dess: bool,
    pub t2: bool,
    /// Interleaved echoes per series (2 for DESS, else 1)
    pub echos: usize,
    pub inference: InferenceConfig,
    pub settings: Settings,
    pub t2_report: Option<PathBuf>,
    pub dry_run: bool,
}

impl RunPlan {
    /// Where the mask of `tissue` is written
    pub fn mask_path(&self, tissue: Tissue, extension: &str) -> PathBuf {
        self.save_dir.join(tissue.file_name(extension))
    }

    /// Print the plan for dry-run mode
    pub fn print_summary(&self) {
        println!("\n=== Run Plan ===\n");
        println!("DICOM:   {}", self.dicom_dir.display());
        if let Some(ref ext) = self.extension {
            println!("  Extension: {ext}");
        }
        println!("Save:    {}", self.save_dir.display());
        println!(
            "Tissues: {}",
            self.tissues
                .iter()
                .map(Tissue::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!("Echos:   {}{}", self.echos, if self.dess { " (DESS)" } else { "" });
        println!("T2:      {}", if self.t2 { "yes" } else { "no" });

        println!("\nInference:");
        println!("  Batch size: {}", self.inference.batch_size);
        println!("  Threshold:  {}", self.inference.threshold);
        match self.inference.device {
            Some(id) => println!("  Device:     gpu {id}"),
            None => println!("  Device:     cpu"),
        }
        for &tissue in &self.tissues {
            println!(
                "  - {}: {}",
                tissue,
                self.settings.model.weights_path(tissue).display()
            );
        }
        println!();
    }
}

/// Tissues selected by the `-f -t -m -p` flags, all four when none is set
pub fn selected_tissues(cli: &Cli) -> Vec<Tissue> {
    let flags = [
        (cli.femoral_cartilage, Tissue::FemoralCartilage),
        (cli.tibial_cartilage, Tissue::TibialCartilage),
        (cli.meniscus, Tissue::Meniscus),
        (cli.patellar_cartilage, Tissue::PatellarCartilage),
    ];
    let selected: Vec<Tissue> = flags
        .iter()
        .filter(|(on, _)| *on)
        .map(|&(_, tissue)| tissue)
        .collect();

    if selected.is_empty() {
        Tissue::ALL.to_vec()
    } else {
        selected
    }
}

/// Validate `cli` into a run plan.
///
/// Checks run in this order: dicom path given, `--t2` only with `--dess`,
/// dicom directory exists, batch size, device, settings file. Only then is
/// the save directory created (skipped for dry runs).
pub fn resolve_args(cli: &Cli) -> Result<RunPlan> {
    let dicom_dir = cli
        .dicom
        .clone()
        .ok_or_else(|| CliError::missing_argument("--dicom"))?;

    if cli.t2 && !cli.dess {
        return Err(CliError::incompatible_flags("--t2", "--dess"));
    }

    if !dicom_dir.is_dir() {
        return Err(CliError::DirectoryNotFound { path: dicom_dir });
    }

    if cli.batch_size == 0 {
        return Err(CliError::invalid_argument("--batch_size", "must be > 0"));
    }

    let mut settings = ConfigLoader::load_or_default(cli.config.as_deref())?;
    if let Some(ref weights) = cli.weights {
        info!(weights = %weights.display(), "Overriding weights directory from CLI");
        settings.model.weights_dir = weights.clone();
    }

    let mut inference = InferenceConfig::new(cli.batch_size, settings.model.threshold)?;
    if let Some(ref gpu) = cli.gpu {
        inference = inference.with_device(gpu)?;
    }

    let save_dir = cli.save.clone().unwrap_or_else(|| dicom_dir.clone());
    let echos = if cli.dess { DESS_ECHOS } else { 1 };

    let plan = RunPlan {
        dicom_dir,
        save_dir,
        extension: cli.ext.clone(),
        tissues: selected_tissues(cli),
        dess: cli.dess,
        t2: cli.t2,
        echos,
        inference,
        settings,
        t2_report: cli.t2_report.clone(),
        dry_run: cli.dry_run,
    };

    if !plan.dry_run && !plan.save_dir.exists() {
        info!(path = %plan.save_dir.display(), "Creating save directory");
        std::fs::create_dir_all(&plan.save_dir)?;
    }

    debug!(?plan, "Arguments resolved");
    Ok(plan)
}
