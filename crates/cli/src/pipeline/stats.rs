//! Run statistics and summary output.

use std::path::PathBuf;
use std::time::Duration;

use contracts::{T2Summary, TissueMap};

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Loading, preprocessing, segmentation and mask output
    pub segmentation: Duration,

    /// T2 mapping, when it ran
    pub t2: Option<Duration>,

    /// Total duration of the run
    pub total: Duration,

    /// Mask files in write order
    pub files_written: Vec<PathBuf>,

    /// Per-tissue T2 summaries, empty unless T2 mapping ran
    pub t2_summaries: TissueMap<T2Summary>,
}

impl RunStats {
    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Run Summary ===\n");

        println!("Overview");
        println!("   ├─ Duration: {:.2}s", self.total.as_secs_f64());
        println!("   ├─ Segmentation: {:.2}s", self.segmentation.as_secs_f64());
        if let Some(t2) = self.t2 {
            println!("   ├─ T2 mapping: {:.2}s", t2.as_secs_f64());
        }
        println!("   └─ Masks written: {}", self.files_written.len());

        for path in &self.files_written {
            println!("      • {}", path.display());
        }

        if !self.t2_summaries.is_empty() {
            println!("\nT2 (ms)");
            println!(
                "   {:<20} {:>8} {:>8} {:>8} {:>8} {:>10}",
                "tissue", "mean", "std", "median", "max", "voxels"
            );
            for summary in self.t2_summaries.values() {
                println!(
                    "   {:<20} {:>8.2} {:>8.2} {:>8.2} {:>8.2} {:>10}",
                    summary.tissue.as_str(),
                    summary.mean_ms,
                    summary.std_ms,
                    summary.median_ms,
                    summary.max_ms,
                    summary.valid_voxels
                );
            }
        }

        println!();
    }
}
