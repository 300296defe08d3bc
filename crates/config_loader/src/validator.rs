//! Settings validation
//!
//! Rules:
//! - model.threshold in (0, 1)
//! - model.weights keys name known tissues
//! - t2.t1_s > 0, t2.diffusivity > 0
//! - t2.min_ms < t2.max_ms
//! - t2.gl_area / t2.tg_us > 0 when given

use contracts::{ContractError, Settings, Tissue};

/// Validate settings
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(settings: &Settings) -> Result<(), ContractError> {
    validate_model(settings)?;
    validate_t2_constants(settings)?;
    validate_t2_range(settings)?;
    validate_tag_overrides(settings)?;
    Ok(())
}

fn validate_model(settings: &Settings) -> Result<(), ContractError> {
    let threshold = settings.model.threshold;
    if !(threshold > 0.0 && threshold < 1.0) {
        return Err(ContractError::config_validation(
            "model.threshold",
            format!("threshold must be in (0, 1), got {threshold}"),
        ));
    }

    for name in settings.model.weights.keys() {
        if name.parse::<Tissue>().is_err() {
            return Err(ContractError::config_validation(
                format!("model.weights.{name}"),
                "unknown tissue",
            ));
        }
    }
    Ok(())
}

fn validate_t2_constants(settings: &Settings) -> Result<(), ContractError> {
    let t2 = &settings.t2;
    if !(t2.t1_s > 0.0) {
        return Err(ContractError::config_validation(
            "t2.t1_s",
            format!("t1_s must be > 0, got {}", t2.t1_s),
        ));
    }
    if !(t2.diffusivity > 0.0) {
        return Err(ContractError::config_validation(
            "t2.diffusivity",
            format!("diffusivity must be > 0, got {}", t2.diffusivity),
        ));
    }
    Ok(())
}

fn validate_t2_range(settings: &Settings) -> Result<(), ContractError> {
    let t2 = &settings.t2;
    if !(t2.min_ms < t2.max_ms) {
        return Err(ContractError::config_validation(
            "t2.min_ms / t2.max_ms",
            format!(
                "min_ms ({}) must be < max_ms ({})",
                t2.min_ms, t2.max_ms
            ),
        ));
    }
    Ok(())
}

fn validate_tag_overrides(settings: &Settings) -> Result<(), ContractError> {
    let overrides = [("t2.gl_area", settings.t2.gl_area), ("t2.tg_us", settings.t2.tg_us)];
    for (field, value) in overrides {
        if let Some(v) = value {
            if !(v > 0.0) {
                return Err(ContractError::config_validation(
                    field,
                    format!("override must be > 0, got {v}"),
                ));
            }
        }
    }
    Ok(())
}
