//! Segmentation command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::{ContractError, T2Summary, TissueMap};
use dicom_io::{DicomSeriesLoader, TiffMaskWriter};
use segmentation::{ModelRegistry, OnnxSegmenter};
use t2_mapping::DessT2Mapper;
use tracing::info;

use crate::cli::Cli;
use crate::pipeline::Pipeline;
use crate::resolve::resolve_args;

/// Execute a segmentation run
pub fn run_segment(cli: &Cli) -> Result<()> {
    let plan = resolve_args(cli)?;

    info!(
        dicom = %plan.dicom_dir.display(),
        save = %plan.save_dir.display(),
        tissues = plan.tissues.len(),
        dess = plan.dess,
        t2 = plan.t2,
        "Arguments resolved"
    );

    // Dry run - just validate and exit
    if plan.dry_run {
        info!("Dry run mode - arguments are valid, exiting");
        plan.print_summary();
        println!("=== Effective Settings ===\n");
        println!("{}", ConfigLoader::to_toml(&plan.settings)?);
        return Ok(());
    }

    // Fail on missing weights before reading any DICOM
    let registry = ModelRegistry::new(plan.settings.model.clone());
    if let Some((tissue, path)) = registry.missing(&plan.tissues).into_iter().next() {
        return Err(ContractError::ModelNotFound { tissue, path }.into());
    }

    let mut pipeline = Pipeline::new(
        DicomSeriesLoader::new(),
        OnnxSegmenter::new(plan.inference.clone(), registry),
        TiffMaskWriter::new(),
        DessT2Mapper::new(plan.settings.t2.clone()),
    );

    let stats = pipeline.run(&plan).context("Pipeline execution failed")?;

    info!(
        masks = stats.files_written.len(),
        duration_secs = stats.total.as_secs_f64(),
        "Pipeline completed successfully"
    );
    stats.print_summary();

    if let Some(ref path) = plan.t2_report {
        write_t2_report(path, &stats.t2_summaries)?;
        info!(path = %path.display(), "T2 report written");
    }

    Ok(())
}

/// Write T2 summaries as a JSON object keyed by tissue
pub fn write_t2_report(path: &Path, summaries: &TissueMap<T2Summary>) -> Result<()> {
    let json =
        serde_json::to_string_pretty(summaries).context("Failed to serialize T2 summaries")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write T2 report to {}", path.display()))?;
    Ok(())
}
