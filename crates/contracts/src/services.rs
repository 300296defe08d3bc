//! Collaborator traits
//!
//! The orchestrator only sees these interfaces. Real implementations live in
//! `dicom_io`, `segmentation` and `t2_mapping`; tests substitute mocks.

use std::path::Path;

use crate::{ContractError, DicomReference, Mask, T2Map, T2Summary, Tissue, Volume};

/// Reads a DICOM series into a volume
pub trait VolumeLoader {
    /// Load every matching file of `dir` into one volume.
    ///
    /// # Arguments
    /// * `dir` - Series directory
    /// * `extension` - Only files ending with this extension are read (None = all)
    ///
    /// # Errors
    /// `DirectoryNotFound` when `dir` is missing or not a directory
    fn load(
        &self,
        dir: &Path,
        extension: Option<&str>,
    ) -> Result<(Volume, DicomReference), ContractError>;
}

/// Produces a tissue mask from a preprocessed volume
pub trait Segmenter {
    /// Segment `tissue` in `volume`.
    ///
    /// The returned mask is expected to have the shape of `volume`; callers
    /// check this rather than trusting the implementation.
    fn segment(&mut self, volume: &Volume, tissue: Tissue) -> Result<Mask, ContractError>;
}

/// Persists a mask as an image file
pub trait MaskWriter {
    /// File extension produced by this writer, without the dot
    fn extension(&self) -> &str;

    /// Write `mask` to `path`
    fn write(&self, path: &Path, mask: &Mask) -> Result<(), ContractError>;
}

/// Computes T2 relaxation maps and per-tissue statistics
pub trait T2Mapper {
    /// T2 map of a raw (unsplit, unwhitened) multi-echo volume
    fn calc_t2_map(
        &self,
        volume: &Volume,
        reference: &DicomReference,
    ) -> Result<T2Map, ContractError>;

    /// Statistics of `t2_map` inside `mask`
    fn tissue_t2(
        &self,
        t2_map: &T2Map,
        mask: &Mask,
        tissue: Tissue,
    ) -> Result<T2Summary, ContractError>;
}
