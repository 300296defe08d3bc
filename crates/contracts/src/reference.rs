//! DicomReference - Volume Loader metadata output
//!
//! Acquisition parameters read from the first slice of a series.

use serde::{Deserialize, Serialize};

/// Reference metadata of a loaded series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DicomReference {
    /// Rows per slice
    pub rows: usize,

    /// Columns per slice
    pub columns: usize,

    /// Number of files stacked into the volume
    pub slice_count: usize,

    /// Repetition time (ms)
    pub repetition_time_ms: Option<f64>,

    /// Echo time (ms)
    pub echo_time_ms: Option<f64>,

    /// Flip angle (degrees)
    pub flip_angle_deg: Option<f64>,

    /// DESS spoiler gradient area, private tag (0019,10B6)
    pub gl_area: Option<f64>,

    /// DESS spoiler gradient duration (µs), private tag (0019,10B7)
    pub tg_us: Option<f64>,

    /// In-plane pixel spacing (mm), row then column
    pub pixel_spacing: Option<(f64, f64)>,

    /// Slice thickness (mm)
    pub slice_thickness: Option<f64>,

    /// Series description
    pub series_description: Option<String>,
}

impl DicomReference {
    /// Shape of the stacked volume
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.rows, self.columns, self.slice_count)
    }
}
