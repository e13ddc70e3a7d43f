//! Request validation and normalization.
//!
//! Fails fast on the first invalid field. A request that passes comes out
//! with its geometry resolved and every default applied.

use crate::error::ValidationError;
use crate::units;

use super::types::{PoolSpec, SizingRequest, SizingRules, SpecialLoad};

/// A request after validation, with defaults filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRequest {
    pub volume_m3: f64,
    pub room_area_m2: f64,
    pub ach: f64,
    pub max_units: u32,
    pub pool: Option<PoolSpec>,
}

fn require_positive(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::NonPositive { field, value })
    }
}

fn require_humidity(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::HumidityOutOfRange { field, value })
    }
}

/// Resolve volume and floor area from whichever geometry the request carries.
fn resolve_geometry(
    request: &SizingRequest,
    rules: &SizingRules,
) -> Result<(f64, f64), ValidationError> {
    let supplied = [
        request.dimensions.is_some(),
        request.volume_m3.is_some(),
        request.floor_area_m2.is_some(),
    ]
    .iter()
    .filter(|s| **s)
    .count();

    match supplied {
        0 => return Err(ValidationError::MissingGeometry),
        1 => {}
        _ => return Err(ValidationError::ConflictingGeometry),
    }

    let default_ceiling = rules.defaults.ceiling_height_m;

    if let Some(dims) = &request.dimensions {
        let length = require_positive("dimensions.length_m", dims.length_m)?;
        let width = require_positive("dimensions.width_m", dims.width_m)?;
        let height = require_positive("dimensions.height_m", dims.height_m)?;
        return Ok((units::volume_from_dimensions(length, width, height), length * width));
    }

    if let Some(volume) = request.volume_m3 {
        let volume = require_positive("volume_m3", volume)?;
        return Ok((volume, units::area_from_volume(volume, default_ceiling)));
    }

    let area = require_positive("floorArea_m2", request.floor_area_m2.unwrap_or(f64::NAN))?;
    let ceiling = match request.ceiling_height_m {
        Some(h) => require_positive("ceilingHeight_m", h)?,
        None => default_ceiling,
    };
    Ok((units::volume_from_area(area, ceiling), area))
}

fn valid_cover_hours(hours: f64) -> bool {
    (0.0..=24.0).contains(&hours)
}

fn validate_special_load(
    index: usize,
    load: &SpecialLoad,
    rules: &SizingRules,
) -> Result<(), ValidationError> {
    let invalid = |reason: String| ValidationError::InvalidSpecialLoad { index, reason };

    match load {
        SpecialLoad::Spa {
            surface_area_m2,
            water_temp_c,
            covered_hours_per_day,
            ..
        } => {
            if !(surface_area_m2.is_finite() && *surface_area_m2 > 0.0) {
                return Err(invalid(format!(
                    "spa surfaceArea_m2 must be > 0 (got {})",
                    surface_area_m2
                )));
            }
            let (min, max) = (rules.limits.water_temp_min_c, rules.limits.water_temp_max_c);
            if !(min..=max).contains(water_temp_c) {
                return Err(invalid(format!(
                    "spa waterTemp_c {}C out of range ({}-{}C)",
                    water_temp_c, min, max
                )));
            }
            if !valid_cover_hours(*covered_hours_per_day) {
                return Err(invalid(format!(
                    "spa coveredHours_per_day must be within 0-24 (got {})",
                    covered_hours_per_day
                )));
            }
        }
        SpecialLoad::Laundry {
            litres_per_hour,
            hours_per_day,
        } => {
            if !(litres_per_hour.is_finite() && *litres_per_hour > 0.0) {
                return Err(invalid(format!(
                    "laundry litresPerHour must be > 0 (got {})",
                    litres_per_hour
                )));
            }
            if !(*hours_per_day > 0.0 && *hours_per_day <= 24.0) {
                return Err(invalid(format!(
                    "laundry hoursPerDay must be in (0, 24] (got {})",
                    hours_per_day
                )));
            }
        }
        SpecialLoad::Process { litres_per_day } => {
            if !(litres_per_day.is_finite() && *litres_per_day > 0.0) {
                return Err(invalid(format!(
                    "process litresPerDay must be > 0 (got {})",
                    litres_per_day
                )));
            }
        }
    }
    Ok(())
}

/// Validate a request against the configured limits and apply defaults.
///
/// # Returns
/// * `Ok(NormalizedRequest)` - Geometry resolved, ach and unit cap defaulted
/// * `Err(ValidationError)` - The first field that failed
pub fn validate_request(
    request: &SizingRequest,
    rules: &SizingRules,
) -> Result<NormalizedRequest, ValidationError> {
    let (volume_m3, room_area_m2) = resolve_geometry(request, rules)?;

    let current = require_humidity("currentRH_pct", request.current_rh_pct)?;
    let target = require_humidity("targetRH_pct", request.target_rh_pct)?;
    if target >= current {
        return Err(ValidationError::TargetNotBelowCurrent { current, target });
    }

    let limits = &rules.limits;
    // Lower bound is exclusive: (min, max]
    let temp = request.indoor_temp_c;
    if !(temp > limits.indoor_temp_min_c && temp <= limits.indoor_temp_max_c) {
        return Err(ValidationError::TemperatureOutOfRange {
            value: temp,
            min: limits.indoor_temp_min_c,
            max: limits.indoor_temp_max_c,
        });
    }

    let ach = match request.ach {
        Some(ach) if ach.is_finite() && ach >= 0.0 => ach,
        Some(ach) => return Err(ValidationError::NegativeAch(ach)),
        None if request.application.is_pool() => rules.defaults.ach_pool,
        None => rules.defaults.ach_room,
    };

    let pool = match (request.application.is_pool(), request.pool) {
        (true, None) => return Err(ValidationError::MissingPool),
        (false, Some(_)) => {
            return Err(ValidationError::UnexpectedPool(request.application.to_string()))
        }
        (false, None) => None,
        (true, Some(pool)) => {
            require_positive("pool.surfaceArea_m2", pool.surface_area_m2)?;
            let water = pool.water_temp_c;
            if !(limits.water_temp_min_c..=limits.water_temp_max_c).contains(&water) {
                return Err(ValidationError::WaterTemperatureOutOfRange {
                    value: water,
                    min: limits.water_temp_min_c,
                    max: limits.water_temp_max_c,
                });
            }
            if !valid_cover_hours(pool.covered_hours_per_day) {
                return Err(ValidationError::CoverHoursOutOfRange(pool.covered_hours_per_day));
            }
            Some(pool)
        }
    };

    let max_units = match request.max_units_per_combination {
        Some(v) if v >= 1 && v <= limits.max_units_per_combination => v,
        Some(v) => {
            return Err(ValidationError::MaxUnitsOutOfRange {
                value: v,
                max: limits.max_units_per_combination,
            })
        }
        None => rules.defaults.max_units_per_combination,
    };

    for (index, load) in request.special_loads.iter().enumerate() {
        validate_special_load(index, load, rules)?;
    }

    if let Some(budget) = request.budget_max {
        require_positive("budgetMax", budget)?;
    }

    Ok(NormalizedRequest {
        volume_m3,
        room_area_m2,
        ach,
        max_units,
        pool,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sizing::rules::default_rules;
    use crate::sizing::types::{Application, RoomDimensions};
    use approx::assert_relative_eq;

    fn room_request() -> SizingRequest {
        SizingRequest {
            dimensions: None,
            volume_m3: Some(100.0),
            floor_area_m2: None,
            ceiling_height_m: None,
            current_rh_pct: 75.0,
            target_rh_pct: 55.0,
            indoor_temp_c: 22.0,
            ach: None,
            people_count: 0,
            application: Application::Room,
            pool: None,
            max_units_per_combination: None,
            special_loads: vec![],
            budget_max: None,
            preferred_types: vec![],
        }
    }

    #[test]
    fn test_defaults_applied() {
        let rules = default_rules();
        let norm = validate_request(&room_request(), &rules).unwrap();
        assert_eq!(norm.ach, 0.6);
        assert_eq!(norm.max_units, 4);
        assert_relative_eq!(norm.room_area_m2, 100.0 / 2.7, epsilon = 1e-9);
        assert!(norm.pool.is_none());
    }

    #[test]
    fn test_pool_default_ach() {
        let rules = default_rules();
        let request = SizingRequest {
            application: Application::Pool,
            pool: Some(PoolSpec::new(20.0, 28.0)),
            ..room_request()
        };
        let norm = validate_request(&request, &rules).unwrap();
        assert_eq!(norm.ach, 1.0);
    }

    #[test]
    fn test_floor_area_with_ceiling() {
        let rules = default_rules();
        let request = SizingRequest {
            volume_m3: None,
            floor_area_m2: Some(40.0),
            ceiling_height_m: Some(3.0),
            ..room_request()
        };
        let norm = validate_request(&request, &rules).unwrap();
        assert_relative_eq!(norm.volume_m3, 120.0);
        assert_relative_eq!(norm.room_area_m2, 40.0);
    }

    #[test]
    fn test_geometry_missing_and_conflicting() {
        let rules = default_rules();
        let missing = SizingRequest {
            volume_m3: None,
            ..room_request()
        };
        assert_eq!(
            validate_request(&missing, &rules),
            Err(ValidationError::MissingGeometry)
        );

        let conflicting = SizingRequest {
            dimensions: Some(RoomDimensions {
                length_m: 5.0,
                width_m: 4.0,
                height_m: 2.5,
            }),
            ..room_request()
        };
        assert_eq!(
            validate_request(&conflicting, &rules),
            Err(ValidationError::ConflictingGeometry)
        );
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let rules = default_rules();
        let request = SizingRequest {
            volume_m3: None,
            dimensions: Some(RoomDimensions {
                length_m: 5.0,
                width_m: 0.0,
                height_m: 2.5,
            }),
            ..room_request()
        };
        assert!(matches!(
            validate_request(&request, &rules),
            Err(ValidationError::NonPositive {
                field: "dimensions.width_m",
                ..
            })
        ));
    }

    #[test]
    fn test_target_equal_to_current_rejected() {
        let rules = default_rules();
        let request = SizingRequest {
            target_rh_pct: 75.0,
            ..room_request()
        };
        assert_eq!(
            validate_request(&request, &rules),
            Err(ValidationError::TargetNotBelowCurrent {
                current: 75.0,
                target: 75.0
            })
        );
    }

    #[test]
    fn test_humidity_out_of_range() {
        let rules = default_rules();
        let request = SizingRequest {
            current_rh_pct: 101.0,
            ..room_request()
        };
        assert!(matches!(
            validate_request(&request, &rules),
            Err(ValidationError::HumidityOutOfRange { .. })
        ));
    }

    #[test]
    fn test_temperature_limits() {
        let rules = default_rules();
        let hot = SizingRequest {
            indoor_temp_c: 50.5,
            ..room_request()
        };
        assert!(matches!(
            validate_request(&hot, &rules),
            Err(ValidationError::TemperatureOutOfRange { .. })
        ));
        let freezing = SizingRequest {
            indoor_temp_c: 0.0,
            ..room_request()
        };
        assert!(matches!(
            validate_request(&freezing, &rules),
            Err(ValidationError::TemperatureOutOfRange { .. })
        ));
        let cold = SizingRequest {
            indoor_temp_c: 2.0,
            ..room_request()
        };
        assert!(validate_request(&cold, &rules).is_ok());
        let max = SizingRequest {
            indoor_temp_c: 50.0,
            ..room_request()
        };
        assert!(validate_request(&max, &rules).is_ok());
    }

    #[test]
    fn test_pool_presence_must_match_application() {
        let rules = default_rules();
        let missing = SizingRequest {
            application: Application::Pool,
            ..room_request()
        };
        assert_eq!(
            validate_request(&missing, &rules),
            Err(ValidationError::MissingPool)
        );

        let unexpected = SizingRequest {
            application: Application::Basement,
            pool: Some(PoolSpec::new(10.0, 28.0)),
            ..room_request()
        };
        assert_eq!(
            validate_request(&unexpected, &rules),
            Err(ValidationError::UnexpectedPool("basement".to_string()))
        );
    }

    #[test]
    fn test_water_temperature_range() {
        let rules = default_rules();
        let request = SizingRequest {
            application: Application::Pool,
            pool: Some(PoolSpec::new(20.0, 60.0)),
            ..room_request()
        };
        assert!(matches!(
            validate_request(&request, &rules),
            Err(ValidationError::WaterTemperatureOutOfRange { .. })
        ));
    }

    #[test]
    fn test_cover_hours_range() {
        let rules = default_rules();
        let pool = PoolSpec {
            covered_hours_per_day: 25.0,
            ..PoolSpec::new(20.0, 28.0)
        };
        let request = SizingRequest {
            application: Application::Pool,
            pool: Some(pool),
            ..room_request()
        };
        assert_eq!(
            validate_request(&request, &rules),
            Err(ValidationError::CoverHoursOutOfRange(25.0))
        );

        let covered_overnight = SizingRequest {
            pool: Some(PoolSpec {
                covered_hours_per_day: 12.0,
                ..pool
            }),
            ..request
        };
        assert!(validate_request(&covered_overnight, &rules).is_ok());

        let spa = SizingRequest {
            special_loads: vec![SpecialLoad::Spa {
                surface_area_m2: 4.0,
                water_temp_c: 38.0,
                activity: Default::default(),
                covered_hours_per_day: -1.0,
            }],
            ..room_request()
        };
        assert!(matches!(
            validate_request(&spa, &rules),
            Err(ValidationError::InvalidSpecialLoad { index: 0, .. })
        ));
    }

    #[test]
    fn test_max_units_bounds() {
        let rules = default_rules();
        let zero = SizingRequest {
            max_units_per_combination: Some(0),
            ..room_request()
        };
        assert!(matches!(
            validate_request(&zero, &rules),
            Err(ValidationError::MaxUnitsOutOfRange { value: 0, .. })
        ));
        let ok = SizingRequest {
            max_units_per_combination: Some(6),
            ..room_request()
        };
        assert_eq!(validate_request(&ok, &rules).unwrap().max_units, 6);
    }

    #[test]
    fn test_negative_ach_rejected() {
        let rules = default_rules();
        let request = SizingRequest {
            ach: Some(-0.5),
            ..room_request()
        };
        assert_eq!(
            validate_request(&request, &rules),
            Err(ValidationError::NegativeAch(-0.5))
        );
    }

    #[test]
    fn test_invalid_special_load_reports_index() {
        let rules = default_rules();
        let request = SizingRequest {
            special_loads: vec![
                SpecialLoad::Process {
                    litres_per_day: 2.0,
                },
                SpecialLoad::Laundry {
                    litres_per_hour: 0.5,
                    hours_per_day: 30.0,
                },
            ],
            ..room_request()
        };
        assert!(matches!(
            validate_request(&request, &rules),
            Err(ValidationError::InvalidSpecialLoad { index: 1, .. })
        ));
    }
}
