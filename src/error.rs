use thiserror::Error;

/// Request rejected at the boundary before any arithmetic runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Room geometry missing: supply dimensions, volume_m3 or floorArea_m2")]
    MissingGeometry,

    #[error("Room geometry supplied more than once: use exactly one of dimensions, volume_m3 or floorArea_m2")]
    ConflictingGeometry,

    #[error("{field} must be a finite value greater than 0 (got {value})")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} {value}% out of range (0-100%)")]
    HumidityOutOfRange { field: &'static str, value: f64 },

    #[error("targetRH_pct {target}% must be lower than currentRH_pct {current}%")]
    TargetNotBelowCurrent { current: f64, target: f64 },

    #[error("indoorTemp_c {value}C out of range ({min}-{max}C)")]
    TemperatureOutOfRange { value: f64, min: f64, max: f64 },

    #[error("ach must be a finite value of 0 or more (got {0})")]
    NegativeAch(f64),

    #[error("Pool details are required when application is pool")]
    MissingPool,

    #[error("Pool details are only valid when application is pool (got {0})")]
    UnexpectedPool(String),

    #[error("waterTemp_c {value}C out of range ({min}-{max}C)")]
    WaterTemperatureOutOfRange { value: f64, min: f64, max: f64 },

    #[error("coveredHours_per_day must be within 0-24 (got {0})")]
    CoverHoursOutOfRange(f64),

    #[error("maxUnitsPerCombination must be between 1 and {max} (got {value})")]
    MaxUnitsOutOfRange { value: u32, max: u32 },

    #[error("Special load #{index} is invalid: {reason}")]
    InvalidSpecialLoad { index: usize, reason: String },

    #[error("No moisture load to size against (check ach, peopleCount and special loads)")]
    NoLoad,
}

/// Failure of a sizing call. Infeasibility is never an error; it is returned
/// as an escalated `SizingResult`.
#[derive(Debug, Error)]
pub enum SizingError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Internal invariant violated: {0}")]
    Internal(String),
}
