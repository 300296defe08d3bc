//! DESS T2 estimation
//!
//! The ratio of the second to the first DESS echo depends on T2 through the
//! spoiler gradient dephasing and diffusion. With T1 and the diffusion
//! coefficient assumed, the signal model can be inverted per voxel:
//!
//! ```text
//! T2 = -2000 (TR - TE) / (ln(|r| / k) + c1)
//! ```
//!
//! where `k` and `c1` only depend on acquisition parameters.

use std::f64::consts::PI;

use contracts::{
    ContractError, DicomReference, Mask, T2Map, T2Mapper, T2Settings, T2Summary, Tissue, Volume,
    DESS_ECHOS,
};
use dicom_io::split_volume;
use ndarray::Zip;
use tracing::{debug, info, instrument};

use crate::stats::summarize;

/// Proton gyromagnetic ratio (rad / (G · s))
pub const GYROMAGNETIC_RATIO: f64 = 4258.0 * 2.0 * PI;

/// Acquisition parameters of a DESS series, in SI units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DessParams {
    /// Repetition time (s)
    pub tr_s: f64,
    /// Echo time (s)
    pub te_s: f64,
    /// Flip angle (rad)
    pub alpha_rad: f64,
    /// Spoiler gradient area
    pub gl_area: f64,
    /// Spoiler gradient duration (s)
    pub tg_s: f64,
}

impl DessParams {
    /// Read parameters from series metadata, with settings overriding the
    /// private gradient tags.
    ///
    /// # Errors
    /// `MissingTag` for any parameter found in neither place
    pub fn from_reference(
        reference: &DicomReference,
        settings: &T2Settings,
    ) -> Result<Self, ContractError> {
        let tr_ms = reference
            .repetition_time_ms
            .ok_or_else(|| ContractError::missing_tag("(0018,0080)", "RepetitionTime"))?;
        let te_ms = reference
            .echo_time_ms
            .ok_or_else(|| ContractError::missing_tag("(0018,0081)", "EchoTime"))?;
        let alpha_deg = reference
            .flip_angle_deg
            .ok_or_else(|| ContractError::missing_tag("(0018,1314)", "FlipAngle"))?;
        let gl_area = settings
            .gl_area
            .or(reference.gl_area)
            .ok_or_else(|| ContractError::missing_tag("(0019,10B6)", "GlArea"))?;
        let tg_us = settings
            .tg_us
            .or(reference.tg_us)
            .ok_or_else(|| ContractError::missing_tag("(0019,10B7)", "Tg"))?;

        Ok(Self {
            tr_s: tr_ms * 1e-3,
            te_s: te_ms * 1e-3,
            alpha_rad: alpha_deg.to_radians(),
            gl_area,
            tg_s: tg_us * 1e-6,
        })
    }
}

/// Per-series constants of the inverted signal model
#[derive(Debug, Clone, Copy)]
struct SignalModel {
    k: f64,
    c1: f64,
    /// `-2000 (TR - TE)`
    numerator: f64,
}

impl SignalModel {
    fn new(params: &DessParams, t1_s: f64, diffusivity: f64) -> Self {
        let DessParams {
            tr_s,
            te_s,
            alpha_rad,
            gl_area,
            tg_s,
        } = *params;

        let gl = gl_area / (tg_s * 1e6) * 100.0;
        let dk_l = GYROMAGNETIC_RATIO * gl * tg_s;
        let decay = (-tr_s / t1_s - tr_s * dk_l.powi(2) * diffusivity).exp();

        let k = (alpha_rad / 2.0).sin().powi(2) * (1.0 + decay) / (1.0 - alpha_rad.cos() * decay);
        let c1 = (tr_s - tg_s / 3.0) * dk_l.powi(2) * diffusivity;

        Self {
            k,
            c1,
            numerator: -2000.0 * (tr_s - te_s),
        }
    }

    /// T2 (ms) for an echo ratio; non-finite results are reported as 0
    fn t2(&self, ratio: f64) -> f64 {
        let t2 = self.numerator / ((ratio.abs() / self.k).ln() + self.c1);
        if t2.is_finite() {
            t2
        } else {
            0.0
        }
    }
}

/// `T2Mapper` for dual-echo steady-state acquisitions
#[derive(Debug, Clone, Default)]
pub struct DessT2Mapper {
    settings: T2Settings,
}

impl DessT2Mapper {
    pub fn new(settings: T2Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &T2Settings {
        &self.settings
    }

    /// T2 map from already separated echoes
    pub fn t2_from_echoes(&self, echo1: &Volume, echo2: &Volume, params: &DessParams) -> T2Map {
        let model = SignalModel::new(params, self.settings.t1_s, self.settings.diffusivity);
        let (min_ms, max_ms) = (self.settings.min_ms, self.settings.max_ms);
        debug!(k = model.k, c1 = model.c1, "DESS signal model");

        Zip::from(echo1).and(echo2).map_collect(|&s1, &s2| {
            let ratio = s2 as f64 / s1 as f64;
            let ratio = if ratio.is_finite() { ratio } else { 0.0 };
            let t2 = model.t2(ratio);
            if t2 > min_ms && t2 <= max_ms {
                ((t2 * 100.0).round() / 100.0) as f32
            } else {
                0.0
            }
        })
    }
}

impl T2Mapper for DessT2Mapper {
    #[instrument(name = "dess_t2_map", skip_all, fields(shape = ?volume.dim()))]
    fn calc_t2_map(
        &self,
        volume: &Volume,
        reference: &DicomReference,
    ) -> Result<T2Map, ContractError> {
        let params = DessParams::from_reference(reference, &self.settings)?;
        let echoes = split_volume(volume, DESS_ECHOS)?;
        let t2_map = self.t2_from_echoes(&echoes[0], &echoes[1], &params);

        let valid = t2_map.iter().filter(|&&v| v > 0.0).count();
        info!(valid, total = t2_map.len(), "T2 map computed");
        Ok(t2_map)
    }

    fn tissue_t2(
        &self,
        t2_map: &T2Map,
        mask: &Mask,
        tissue: Tissue,
    ) -> Result<T2Summary, ContractError> {
        summarize(t2_map, mask, tissue)
    }
}
