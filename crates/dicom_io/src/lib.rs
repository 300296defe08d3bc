//! # DICOM I/O
//!
//! Volume loading, preprocessing and mask output.
//!
//! Responsibilities:
//! - Collect the files of a DICOM series (extension filter, hidden files skipped)
//! - Decode and stack slices into a `(rows, columns, slices)` volume
//! - Split interleaved echoes and whiten intensities
//! - Write masks as multi-page TIFF stacks
//!
//! ## Usage Example
//!
//! ```ignore
//! use contracts::{MaskWriter, VolumeLoader};
//! use dicom_io::{split_volume, whiten_volume, DicomSeriesLoader, TiffMaskWriter};
//!
//! let (volume, reference) = DicomSeriesLoader::new().load(dir, Some("dcm"))?;
//! let echo1 = split_volume(&volume, 2)?.swap_remove(0);
//! let input = whiten_volume(&echo1);
//! TiffMaskWriter::new().write(&out.join("meniscus.tiff"), &mask)?;
//! ```

mod loader;
mod preprocess;
mod writer;

pub use loader::{list_series_files, DicomSeriesLoader, GL_AREA_TAG, TG_TAG};
pub use preprocess::{split_volume, whiten_volume};
pub use writer::{read_tiff_stack, TiffMaskWriter};
