//! Configuration errors.

use thiserror::Error;

/// Rejected configuration value.
///
/// Graph operations themselves never fail; unknown labels are no-ops.
/// Only configuration is validated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A sampling range is empty or not finite.
    #[error("{field}: range [{min}, {max}) is empty")]
    EmptyRange {
        field: &'static str,
        min: f32,
        max: f32,
    },

    /// A probability, weight or strength lies outside `[0, 1]`.
    #[error("{field}: {value} is outside [0, 1]")]
    OutOfUnitRange { field: &'static str, value: f32 },

    /// A scalar that must be strictly positive is not.
    #[error("{field}: {value} must be finite and greater than zero")]
    NotPositive { field: &'static str, value: f32 },

    /// A timer interval of zero milliseconds.
    #[error("{field}: interval must be at least 1 ms")]
    ZeroInterval { field: &'static str },

    /// The initial seed needs at least one satellite.
    #[error("satellite_count must be at least 1")]
    NoSatellites,
}

pub(crate) fn check_range(field: &'static str, (min, max): (f32, f32)) -> Result<(), ConfigError> {
    if min.is_finite() && max.is_finite() && min < max {
        Ok(())
    } else {
        Err(ConfigError::EmptyRange { field, min, max })
    }
}

pub(crate) fn check_unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange { field, value })
    }
}

pub(crate) fn check_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}
