//! # Contracts
//!
//! Interface contracts shared by every crate of the knee segmentation
//! pipeline: the volume data model, the tissue vocabulary, and the traits
//! through which the orchestrator talks to its collaborators.
//! All business crates depend only on this crate, reverse dependencies are prohibited.
//!
//! ## Volume Layout
//! - Volumes are `(rows, columns, slices)`; slice `z` is `volume.index_axis(Axis(2), z)`
//! - Multi-echo acquisitions interleave echoes along the slice axis

mod error;
mod reference;
mod services;
mod settings;
mod t2;
mod tissue;
mod volume;

pub use error::*;
pub use reference::DicomReference;
pub use services::{MaskWriter, Segmenter, T2Mapper, VolumeLoader};
pub use settings::{ModelSettings, Settings, T2Settings};
pub use t2::T2Summary;
pub use tissue::{Tissue, TissueMap};
pub use volume::*;
