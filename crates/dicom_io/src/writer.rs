//! TiffMaskWriter - masks as multi-page TIFF stacks
//!
//! One 8-bit grayscale page per slice; mask voxels are written as 255.

use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;

use contracts::{ContractError, Mask, MaskWriter, SLICE_AXIS};
use ndarray::{Array2, Axis};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{colortype, TiffEncoder};
use tracing::{debug, instrument};

/// Intensity of a mask voxel in the written image
const FOREGROUND: u8 = 255;

#[derive(Debug, Default, Clone, Copy)]
pub struct TiffMaskWriter;

impl TiffMaskWriter {
    pub fn new() -> Self {
        Self
    }
}

impl MaskWriter for TiffMaskWriter {
    fn extension(&self) -> &str {
        "tiff"
    }

    #[instrument(name = "tiff_write_mask", skip(self, mask), fields(path = %path.display()))]
    fn write(&self, path: &Path, mask: &Mask) -> Result<(), ContractError> {
        let (rows, columns, slices) = mask.dim();
        if rows == 0 || columns == 0 || slices == 0 {
            return Err(ContractError::mask_write(
                path,
                format!("cannot write an empty mask of shape {:?}", mask.dim()),
            ));
        }

        let mut buffer = Cursor::new(Vec::new());
        {
            let mut encoder = TiffEncoder::new(&mut buffer)
                .map_err(|e| ContractError::mask_write(path, e.to_string()))?;

            for z in 0..slices {
                let page: Vec<u8> = mask
                    .index_axis(SLICE_AXIS, z)
                    .iter()
                    .map(|&v| if v > 0 { FOREGROUND } else { 0 })
                    .collect();
                encoder
                    .write_image::<colortype::Gray8>(columns as u32, rows as u32, &page)
                    .map_err(|e| ContractError::mask_write(path, e.to_string()))?;
            }
        }

        std::fs::write(path, buffer.into_inner())
            .map_err(|e| ContractError::mask_write(path, e.to_string()))?;

        debug!(rows, columns, slices, "mask written");
        Ok(())
    }
}

/// Read a TIFF stack back into a binary mask (any non-zero pixel is set).
///
/// Every page must be 8-bit grayscale with the same dimensions.
pub fn read_tiff_stack(path: &Path) -> Result<Mask, ContractError> {
    let read_err = |e: tiff::TiffError| ContractError::Other(format!("'{}': {e}", path.display()));

    let file = File::open(path)?;
    let mut decoder = Decoder::new(BufReader::new(file)).map_err(read_err)?;
    let mut pages: Vec<Array2<u8>> = Vec::new();

    loop {
        let (width, height) = decoder.dimensions().map_err(read_err)?;
        let data = match decoder.read_image().map_err(read_err)? {
            DecodingResult::U8(data) => data,
            _ => {
                return Err(ContractError::Other(format!(
                    "'{}' is not an 8-bit stack",
                    path.display()
                )))
            }
        };
        let page = Array2::from_shape_vec((height as usize, width as usize), data)
            .map_err(|e| ContractError::Other(e.to_string()))?;
        pages.push(page.mapv(|v| u8::from(v > 0)));

        if !decoder.more_images() {
            break;
        }
        decoder.next_image().map_err(read_err)?;
    }

    let views: Vec<_> = pages.iter().map(|p| p.view()).collect();
    ndarray::stack(Axis(2), &views).map_err(|e| {
        ContractError::InconsistentSeries {
            message: format!("'{}': {e}", path.display()),
        }
    })
}
