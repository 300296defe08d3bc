//! Test fixtures: synthetic DICOM series and in-memory collaborators.

use std::cell::Cell;
use std::path::{Path, PathBuf};

use contracts::{ContractError, DicomReference, Volume, VolumeLoader};
use dicom_core::{dicom_value, DataElement, PrimitiveValue, VR};
use dicom_dictionary_std::{tags, uids};
use dicom_io::{GL_AREA_TAG, TG_TAG};
use dicom_object::{FileMetaTableBuilder, InMemDicomObject};

/// Acquisition parameters of a synthetic DESS series
#[derive(Debug, Clone)]
pub struct SeriesParams {
    pub repetition_time_ms: f64,
    pub echo_time_ms: f64,
    pub flip_angle_deg: f64,
    pub gl_area: f64,
    pub tg_us: f64,
}

impl Default for SeriesParams {
    fn default() -> Self {
        Self {
            repetition_time_ms: 18.18,
            echo_time_ms: 6.0,
            flip_angle_deg: 25.0,
            gl_area: 3132.0,
            tg_us: 1800.0,
        }
    }
}

/// Write one 16-bit MR slice per entry of `slices` into `dir`.
///
/// Slice `i` gets `InstanceNumber` `i + 1`; file names are written in
/// reverse order so that loading has to sort by instance number.
pub fn write_series(
    dir: &Path,
    rows: u16,
    columns: u16,
    slices: &[Vec<u16>],
    params: &SeriesParams,
) -> Vec<PathBuf> {
    let count = slices.len();
    slices
        .iter()
        .enumerate()
        .map(|(i, pixels)| {
            assert_eq!(pixels.len(), rows as usize * columns as usize);
            let instance = i + 1;
            let path = dir.join(format!("IM{:04}.dcm", count - i));
            write_slice(&path, instance, rows, columns, pixels, params);
            path
        })
        .collect()
}

fn write_slice(
    path: &Path,
    instance: usize,
    rows: u16,
    columns: u16,
    pixels: &[u16],
    params: &SeriesParams,
) {
    let sop_instance_uid = format!("1.2.826.0.1.3680043.10.543.{instance}");
    let ds = |v: f64| PrimitiveValue::from(format!("{v}"));

    let obj = InMemDicomObject::from_element_iter([
        DataElement::new(
            tags::SOP_CLASS_UID,
            VR::UI,
            PrimitiveValue::from(uids::MR_IMAGE_STORAGE),
        ),
        DataElement::new(
            tags::SOP_INSTANCE_UID,
            VR::UI,
            PrimitiveValue::from(sop_instance_uid.as_str()),
        ),
        DataElement::new(tags::MODALITY, VR::CS, PrimitiveValue::from("MR")),
        DataElement::new(
            tags::SERIES_DESCRIPTION,
            VR::LO,
            PrimitiveValue::from("DESS SAG"),
        ),
        DataElement::new(tags::SLICE_THICKNESS, VR::DS, ds(0.7)),
        DataElement::new(tags::REPETITION_TIME, VR::DS, ds(params.repetition_time_ms)),
        DataElement::new(tags::ECHO_TIME, VR::DS, ds(params.echo_time_ms)),
        DataElement::new(tags::FLIP_ANGLE, VR::DS, ds(params.flip_angle_deg)),
        DataElement::new(GL_AREA_TAG, VR::DS, ds(params.gl_area)),
        DataElement::new(TG_TAG, VR::DS, ds(params.tg_us)),
        DataElement::new(
            tags::INSTANCE_NUMBER,
            VR::IS,
            PrimitiveValue::from(instance.to_string()),
        ),
        DataElement::new(tags::SAMPLES_PER_PIXEL, VR::US, PrimitiveValue::from(1_u16)),
        DataElement::new(
            tags::PHOTOMETRIC_INTERPRETATION,
            VR::CS,
            PrimitiveValue::from("MONOCHROME2"),
        ),
        DataElement::new(tags::ROWS, VR::US, PrimitiveValue::from(rows)),
        DataElement::new(tags::COLUMNS, VR::US, PrimitiveValue::from(columns)),
        DataElement::new(
            tags::PIXEL_SPACING,
            VR::DS,
            dicom_value!(Strs, ["0.5", "0.5"]),
        ),
        DataElement::new(tags::BITS_ALLOCATED, VR::US, PrimitiveValue::from(16_u16)),
        DataElement::new(tags::BITS_STORED, VR::US, PrimitiveValue::from(16_u16)),
        DataElement::new(tags::HIGH_BIT, VR::US, PrimitiveValue::from(15_u16)),
        DataElement::new(
            tags::PIXEL_REPRESENTATION,
            VR::US,
            PrimitiveValue::from(0_u16),
        ),
        DataElement::new(
            tags::PIXEL_DATA,
            VR::OW,
            PrimitiveValue::U16(pixels.iter().copied().collect()),
        ),
    ]);

    let file_obj = obj
        .with_meta(
            FileMetaTableBuilder::new()
                .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
                .media_storage_sop_class_uid(uids::MR_IMAGE_STORAGE)
                .media_storage_sop_instance_uid(sop_instance_uid.as_str()),
        )
        .unwrap();
    file_obj.write_to_file(path).unwrap();
}

/// Loader returning a fixed volume and counting calls
pub struct MemoryLoader {
    pub volume: Volume,
    pub reference: DicomReference,
    pub loads: Cell<usize>,
}

impl MemoryLoader {
    pub fn new(volume: Volume) -> Self {
        let (rows, columns, slice_count) = volume.dim();
        Self {
            volume,
            reference: DicomReference {
                rows,
                columns,
                slice_count,
                ..Default::default()
            },
            loads: Cell::new(0),
        }
    }
}

impl VolumeLoader for MemoryLoader {
    fn load(
        &self,
        dir: &Path,
        _extension: Option<&str>,
    ) -> Result<(Volume, DicomReference), ContractError> {
        if !dir.is_dir() {
            return Err(ContractError::directory_not_found(dir));
        }
        self.loads.set(self.loads.get() + 1);
        Ok((self.volume.clone(), self.reference.clone()))
    }
}
