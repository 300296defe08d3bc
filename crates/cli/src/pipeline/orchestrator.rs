//! Pipeline orchestrator - sequences loading, segmentation, mask output and T2 mapping.
//!
//! Generic over its collaborators so tests can swap in mocks for any of them.

use std::path::{Path, PathBuf};
use std::time::Instant;

use contracts::{
    Mask, MaskWriter, Segmenter, T2Mapper, T2Summary, Tissue, TissueMap, VolumeLoader,
};
use dicom_io::{split_volume, whiten_volume};
use tracing::{info, instrument};

use super::RunStats;
use crate::error::{CliError, Result};
use crate::resolve::RunPlan;

/// Masks written by `generate_masks`
#[derive(Debug)]
pub struct MaskOutput {
    pub masks: TissueMap<Mask>,
    pub files: Vec<PathBuf>,
}

/// Main pipeline orchestrator
pub struct Pipeline<L, S, W, M> {
    loader: L,
    segmenter: S,
    writer: W,
    mapper: M,
}

impl<L, S, W, M> Pipeline<L, S, W, M>
where
    L: VolumeLoader,
    S: Segmenter,
    W: MaskWriter,
    M: T2Mapper,
{
    pub fn new(loader: L, segmenter: S, writer: W, mapper: M) -> Self {
        Self {
            loader,
            segmenter,
            writer,
            mapper,
        }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// The segmenter, for inspection after a run
    pub fn segmenter(&self) -> &S {
        &self.segmenter
    }

    /// Run the whole plan: masks, then T2 summaries when requested
    pub fn run(&mut self, plan: &RunPlan) -> Result<RunStats> {
        let start = Instant::now();
        let mut stats = RunStats::default();

        let output = self.generate_masks(
            &plan.dicom_dir,
            &plan.save_dir,
            &plan.tissues,
            plan.extension.as_deref(),
            plan.echos,
        )?;
        stats.segmentation = start.elapsed();
        stats.files_written = output.files;

        if plan.dess && plan.t2 {
            let t2_start = Instant::now();
            let summaries =
                self.calculate_t2_maps(&plan.dicom_dir, plan.extension.as_deref(), &output.masks)?;
            stats.t2 = Some(t2_start.elapsed());
            stats.t2_summaries = summaries;
        }

        stats.total = start.elapsed();
        Ok(stats)
    }

    /// Segment every tissue of `tissues` and write `<save_dir>/<tissue>.<ext>`.
    ///
    /// The first echo is segmented whatever the acquisition. A mask whose shape
    /// differs from the input volume stops the run before it is written.
    #[instrument(name = "generate_masks", skip(self, tissues), fields(dicom = %dicom_dir.display()))]
    pub fn generate_masks(
        &mut self,
        dicom_dir: &Path,
        save_dir: &Path,
        tissues: &[Tissue],
        extension: Option<&str>,
        echos: usize,
    ) -> Result<MaskOutput> {
        let (volume, _reference) = self.loader.load(dicom_dir, extension)?;
        info!(shape = ?volume.dim(), echos, "Volume loaded");

        let input = split_volume(&volume, echos)?
            .into_iter()
            .next()
            .ok_or_else(|| CliError::invalid_argument("echos", "no echo in volume"))?;
        let input = whiten_volume(&input);

        let mut output = MaskOutput {
            masks: TissueMap::new(),
            files: Vec::with_capacity(tissues.len()),
        };

        for &tissue in tissues {
            info!(%tissue, "Segmenting {}...", tissue);
            let mask = self.segmenter.segment(&input, tissue)?;

            if mask.dim() != input.dim() {
                return Err(CliError::ShapeInvariant {
                    tissue,
                    expected: input.dim(),
                    actual: mask.dim(),
                });
            }

            let path = save_dir.join(tissue.file_name(self.writer.extension()));
            self.writer.write(&path, &mask)?;
            info!(%tissue, path = %path.display(), "Mask written");

            output.files.push(path);
            output.masks.insert(tissue, mask);
        }

        Ok(output)
    }

    /// T2 summary of every tissue in `masks`, from the raw series.
    ///
    /// Assumes a DESS series; callers enforce this.
    #[instrument(name = "calculate_t2_maps", skip(self, masks), fields(dicom = %dicom_dir.display()))]
    pub fn calculate_t2_maps(
        &self,
        dicom_dir: &Path,
        extension: Option<&str>,
        masks: &TissueMap<Mask>,
    ) -> Result<TissueMap<T2Summary>> {
        info!("Calculating T2 map...");
        let (volume, reference) = self.loader.load(dicom_dir, extension)?;
        let t2_map = self.mapper.calc_t2_map(&volume, &reference)?;

        masks
            .iter()
            .map(|(&tissue, mask)| -> Result<(Tissue, T2Summary)> {
                let summary = self.mapper.tissue_t2(&t2_map, mask, tissue)?;
                info!(
                    %tissue,
                    mean_ms = summary.mean_ms,
                    valid_voxels = summary.valid_voxels,
                    "Tissue T2"
                );
                Ok((tissue, summary))
            })
            .collect()
    }
}
