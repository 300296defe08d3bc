//! DICOM series loader

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use contracts::{ContractError, DicomReference, Volume, VolumeLoader, SLICE_AXIS};
use dicom_core::Tag;
use dicom_dictionary_std::tags;
use dicom_object::{open_file, DefaultDicomObject};
use dicom_pixeldata::PixelDecoder;
use ndarray::ArrayView2;
use tracing::{debug, info, instrument, trace};
use walkdir::WalkDir;

/// DESS spoiler gradient area (private, Siemens)
pub const GL_AREA_TAG: Tag = Tag(0x0019, 0x10B6);

/// DESS spoiler gradient duration in µs (private, Siemens)
pub const TG_TAG: Tag = Tag(0x0019, 0x10B7);

const DICOM_MAGIC_OFFSET: usize = 128;

/// Loads every slice of a series directory into one volume.
///
/// Slices are ordered by `InstanceNumber`; files without one sort after
/// numbered files, by path. Only the first frame of each file is used.
#[derive(Debug, Default, Clone, Copy)]
pub struct DicomSeriesLoader;

/// One decoded slice before stacking
struct DecodedSlice {
    path: PathBuf,
    instance_number: Option<i32>,
    rows: usize,
    columns: usize,
    pixels: Vec<f32>,
}

impl DecodedSlice {
    fn sort_key(&self) -> (bool, i32, &Path) {
        (
            self.instance_number.is_none(),
            self.instance_number.unwrap_or(0),
            &self.path,
        )
    }
}

impl DicomSeriesLoader {
    pub fn new() -> Self {
        Self
    }
}

impl VolumeLoader for DicomSeriesLoader {
    #[instrument(name = "dicom_load_series", skip(self), fields(dir = %dir.display()))]
    fn load(
        &self,
        dir: &Path,
        extension: Option<&str>,
    ) -> Result<(Volume, DicomReference), ContractError> {
        let files = list_series_files(dir, extension)?;
        debug!(files = files.len(), "collected series files");

        let mut slices = files
            .iter()
            .map(|path| read_slice(path))
            .collect::<Result<Vec<_>, _>>()?;
        slices.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        let volume = stack_slices(&slices)?;
        let reference = read_reference(&slices[0].path, volume.dim())?;

        info!(
            rows = reference.rows,
            columns = reference.columns,
            slices = reference.slice_count,
            "DICOM series loaded"
        );
        Ok((volume, reference))
    }
}

/// Collect the files belonging to a series.
///
/// Walks `dir` recursively, skipping hidden files and `DICOMDIR`. With an
/// extension filter only files whose extension matches (case-insensitive,
/// leading dot optional) are kept. Without one, only files carrying the
/// `DICM` preamble are kept, so masks saved next to the series are ignored.
/// The result is sorted by path.
///
/// # Errors
/// - `DirectoryNotFound` if `dir` is missing or not a directory
/// - `EmptySeries` if nothing matched
pub fn list_series_files(dir: &Path, extension: Option<&str>) -> Result<Vec<PathBuf>, ContractError> {
    if !dir.is_dir() {
        return Err(ContractError::directory_not_found(dir));
    }

    let wanted = extension.map(|ext| ext.trim_start_matches('.'));
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(|e| ContractError::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if is_series_file(entry.path(), wanted) {
            files.push(entry.into_path());
        } else {
            trace!(path = %entry.path().display(), "skipping file");
        }
    }

    if files.is_empty() {
        return Err(ContractError::EmptySeries {
            path: dir.to_path_buf(),
            extension: extension.map(str::to_string),
        });
    }

    files.sort();
    Ok(files)
}

fn is_series_file(path: &Path, extension: Option<&str>) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name.starts_with('.') || name == "DICOMDIR" {
        return false;
    }
    match extension {
        None => has_dicom_preamble(path),
        Some(wanted) => path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(wanted)),
    }
}

/// Part 10 files carry `DICM` after a 128 byte preamble
fn has_dicom_preamble(path: &Path) -> bool {
    let mut header = [0u8; DICOM_MAGIC_OFFSET + 4];
    File::open(path)
        .and_then(|mut file| file.read_exact(&mut header))
        .is_ok_and(|()| &header[DICOM_MAGIC_OFFSET..] == b"DICM")
}

fn read_slice(path: &Path) -> Result<DecodedSlice, ContractError> {
    let obj = open_file(path).map_err(|e| ContractError::dicom_read(path, e.to_string()))?;

    let instance_number = obj
        .element_opt(tags::INSTANCE_NUMBER)
        .ok()
        .flatten()
        .and_then(|e| e.to_int::<i32>().ok());

    let decoded = obj
        .decode_pixel_data()
        .map_err(|e| ContractError::dicom_read(path, e.to_string()))?;

    if decoded.samples_per_pixel() != 1 {
        return Err(ContractError::dicom_read(
            path,
            format!(
                "expected single-channel pixels, got {} samples per pixel",
                decoded.samples_per_pixel()
            ),
        ));
    }

    let rows = decoded.rows() as usize;
    let columns = decoded.columns() as usize;
    let pixels = decoded
        .to_vec_frame::<f32>(0)
        .map_err(|e| ContractError::dicom_read(path, e.to_string()))?;

    if pixels.len() != rows * columns {
        return Err(ContractError::dicom_read(
            path,
            format!(
                "decoded {} pixels for a {rows}x{columns} frame",
                pixels.len()
            ),
        ));
    }

    trace!(path = %path.display(), instance_number = ?instance_number, "slice decoded");
    Ok(DecodedSlice {
        path: path.to_path_buf(),
        instance_number,
        rows,
        columns,
        pixels,
    })
}

fn stack_slices(slices: &[DecodedSlice]) -> Result<Volume, ContractError> {
    let first = &slices[0];
    let (rows, columns) = (first.rows, first.columns);
    let mut volume = Volume::zeros((rows, columns, slices.len()));

    for (z, slice) in slices.iter().enumerate() {
        if (slice.rows, slice.columns) != (rows, columns) {
            return Err(ContractError::InconsistentSeries {
                message: format!(
                    "'{}' is {}x{}, expected {rows}x{columns}",
                    slice.path.display(),
                    slice.rows,
                    slice.columns
                ),
            });
        }
        let plane = ArrayView2::from_shape((rows, columns), slice.pixels.as_slice())
            .map_err(|e| ContractError::dicom_read(&slice.path, e.to_string()))?;
        volume.index_axis_mut(SLICE_AXIS, z).assign(&plane);
    }

    Ok(volume)
}

fn read_reference(
    path: &Path,
    (rows, columns, slice_count): (usize, usize, usize),
) -> Result<DicomReference, ContractError> {
    let obj = open_file(path).map_err(|e| ContractError::dicom_read(path, e.to_string()))?;

    let pixel_spacing = obj
        .element_opt(tags::PIXEL_SPACING)
        .ok()
        .flatten()
        .and_then(|e| e.to_multi_float64().ok())
        .and_then(|v| match v.as_slice() {
            [row, col, ..] => Some((*row, *col)),
            _ => None,
        });

    let series_description = obj
        .element_opt(tags::SERIES_DESCRIPTION)
        .ok()
        .flatten()
        .and_then(|e| e.to_str().ok())
        .map(|s| s.trim().to_string());

    Ok(DicomReference {
        rows,
        columns,
        slice_count,
        repetition_time_ms: float_tag(&obj, tags::REPETITION_TIME),
        echo_time_ms: float_tag(&obj, tags::ECHO_TIME),
        flip_angle_deg: float_tag(&obj, tags::FLIP_ANGLE),
        gl_area: float_tag(&obj, GL_AREA_TAG),
        tg_us: float_tag(&obj, TG_TAG),
        pixel_spacing,
        slice_thickness: float_tag(&obj, tags::SLICE_THICKNESS),
        series_description,
    })
}

fn float_tag(obj: &DefaultDicomObject, tag: Tag) -> Option<f64> {
    obj.element_opt(tag)
        .ok()
        .flatten()
        .and_then(|e| e.to_float64().ok())
}
