//! Capacity derating, pool temperature multiplier and temperature banding.
//!
//! Catalog capacities are quoted at a reference condition (typically 30C /
//! 80% RH). A unit running colder or drier removes less water; the curve
//! returns the fraction of rated capacity it still delivers.

use crate::psychro;

use super::types::{
    CurveKind, DeratingConfig, DeratingPoint, Defaults, PoolMultiplierStep, ProductUnit,
    TemperatureBand,
};

/// The condition a unit's rated capacity was measured at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingCondition {
    pub temp_c: f64,
    pub rh_pct: f64,
}

impl RatingCondition {
    /// The unit's own rating condition, falling back to the configured default.
    pub fn for_unit(unit: &ProductUnit, defaults: &Defaults) -> Self {
        Self {
            temp_c: unit.reference_temp_c.unwrap_or(defaults.reference_temp_c),
            rh_pct: unit.reference_rh_pct.unwrap_or(defaults.reference_rh_pct),
        }
    }
}

/// Maps an operating condition to a capacity fraction.
///
/// Implementations must return a value in [0, 1] that never increases as
/// temperature or RH fall.
pub trait DeratingCurve: Send + Sync {
    fn name(&self) -> &'static str;

    fn factor(&self, rating: RatingCondition, temp_c: f64, rh_pct: f64) -> f64;

    /// Effective L/24h for a rated capacity, clamped to [0, rated].
    fn derated_capacity(
        &self,
        rated_lpd: f64,
        temp_c: f64,
        rh_pct: f64,
        rating: RatingCondition,
    ) -> f64 {
        let rated = rated_lpd.max(0.0);
        (rated * self.factor(rating, temp_c, rh_pct)).clamp(0.0, rated)
    }
}

/// Piecewise-linear lookup on distance below the rating condition.
/// Temperature and humidity factors multiply.
#[derive(Debug, Clone)]
pub struct TableDerating {
    temperature: Vec<DeratingPoint>,
    humidity: Vec<DeratingPoint>,
}

impl TableDerating {
    pub fn new(temperature: Vec<DeratingPoint>, humidity: Vec<DeratingPoint>) -> Self {
        Self {
            temperature,
            humidity,
        }
    }
}

/// Linear interpolation, clamped to the first and last points.
fn interpolate(points: &[DeratingPoint], below: f64) -> f64 {
    let (first, last) = match (points.first(), points.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return 1.0,
    };
    if below <= first.below_reference {
        return first.factor;
    }
    if below >= last.below_reference {
        return last.factor;
    }
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if below <= b.below_reference {
            let span = b.below_reference - a.below_reference;
            let t = (below - a.below_reference) / span;
            return a.factor + (b.factor - a.factor) * t;
        }
    }
    last.factor
}

impl DeratingCurve for TableDerating {
    fn name(&self) -> &'static str {
        "table"
    }

    fn factor(&self, rating: RatingCondition, temp_c: f64, rh_pct: f64) -> f64 {
        let t_factor = interpolate(&self.temperature, (rating.temp_c - temp_c).max(0.0));
        let rh_factor = interpolate(&self.humidity, (rating.rh_pct - rh_pct).max(0.0));
        (t_factor * rh_factor).clamp(0.0, 1.0)
    }
}

/// Derates on dew point: capacity tracks (dew point / scale)^exponent,
/// relative to the same index at the rating condition.
#[derive(Debug, Clone)]
pub struct DewPointDerating {
    pub scale_c: f64,
    pub exponent: f64,
    pub floor: f64,
}

impl Default for DewPointDerating {
    fn default() -> Self {
        Self {
            scale_c: 26.0,
            exponent: 1.5,
            floor: 0.1,
        }
    }
}

impl DewPointDerating {
    fn index(&self, temp_c: f64, rh_pct: f64) -> f64 {
        let td = psychro::dew_point(temp_c, rh_pct).unwrap_or(0.0).max(0.0);
        (td / self.scale_c).powf(self.exponent).clamp(self.floor, 1.0)
    }
}

impl DeratingCurve for DewPointDerating {
    fn name(&self) -> &'static str {
        "dew_point"
    }

    fn factor(&self, rating: RatingCondition, temp_c: f64, rh_pct: f64) -> f64 {
        let at_rating = self.index(rating.temp_c, rating.rh_pct);
        (self.index(temp_c, rh_pct) / at_rating).clamp(0.0, 1.0)
    }
}

/// Rated capacity everywhere.
#[derive(Debug, Clone, Default)]
pub struct NoDerating;

impl DeratingCurve for NoDerating {
    fn name(&self) -> &'static str {
        "none"
    }

    fn factor(&self, _rating: RatingCondition, _temp_c: f64, _rh_pct: f64) -> f64 {
        1.0
    }
}

/// Build the curve selected in the rule tables.
pub fn build_curve(config: &DeratingConfig) -> Box<dyn DeratingCurve> {
    match config.curve {
        CurveKind::Table => Box::new(TableDerating::new(
            config.temperature.clone(),
            config.humidity.clone(),
        )),
        CurveKind::DewPoint => Box::new(DewPointDerating::default()),
        CurveKind::None => Box::new(NoDerating),
    }
}

/// Effective L/24h of one unit at the given condition.
pub fn derated_capacity(
    curve: &dyn DeratingCurve,
    unit: &ProductUnit,
    defaults: &Defaults,
    temp_c: f64,
    rh_pct: f64,
) -> f64 {
    let rating = RatingCondition::for_unit(unit, defaults);
    curve.derated_capacity(unit.rated_capacity_lpd, temp_c, rh_pct, rating)
}

/// Pool area multiplier for a water temperature. Step bounds are inclusive,
/// so water exactly on a bound takes that step's factor.
pub fn pool_temperature_multiplier(steps: &[PoolMultiplierStep], water_temp_c: f64) -> f64 {
    steps
        .iter()
        .find(|s| s.up_to_water_c.map_or(true, |bound| water_temp_c <= bound))
        .or_else(|| steps.last())
        .map_or(1.0, |s| s.factor)
}

/// Strictly below the threshold is cold.
pub fn temperature_band(indoor_temp_c: f64, cold_threshold_c: f64) -> TemperatureBand {
    if indoor_temp_c < cold_threshold_c {
        TemperatureBand::Cold
    } else {
        TemperatureBand::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sizing::rules::default_rules;
    use approx::assert_relative_eq;

    const RATING: RatingCondition = RatingCondition {
        temp_c: 30.0,
        rh_pct: 80.0,
    };

    fn default_table() -> TableDerating {
        let rules = default_rules();
        TableDerating::new(rules.derating.temperature, rules.derating.humidity)
    }

    #[test]
    fn test_table_at_reference_is_unity() {
        let curve = default_table();
        assert_relative_eq!(curve.factor(RATING, 30.0, 80.0), 1.0);
        // warmer and wetter than the rating is not uprated
        assert_relative_eq!(curve.factor(RATING, 35.0, 90.0), 1.0);
    }

    #[test]
    fn test_table_interpolates() {
        let curve = default_table();
        // 7.5C below: midway between 0.85 and 0.70
        assert_relative_eq!(curve.factor(RATING, 22.5, 80.0), 0.775, epsilon = 1e-9);
        // 25 points drier: midway between 0.72 and 0.60
        assert_relative_eq!(curve.factor(RATING, 30.0, 55.0), 0.66, epsilon = 1e-9);
        assert_relative_eq!(curve.factor(RATING, 22.5, 55.0), 0.775 * 0.66, epsilon = 1e-9);
    }

    #[test]
    fn test_table_clamps_beyond_last_point() {
        let curve = default_table();
        assert_relative_eq!(curve.factor(RATING, 0.0, 80.0), 0.35, epsilon = 1e-9);
        assert_relative_eq!(curve.factor(RATING, 30.0, 0.0), 0.42, epsilon = 1e-9);
    }

    #[test]
    fn test_curves_monotonic() {
        let curves: Vec<Box<dyn DeratingCurve>> = vec![
            Box::new(default_table()),
            Box::new(DewPointDerating::default()),
            Box::new(NoDerating),
        ];
        for curve in &curves {
            let mut last = f64::INFINITY;
            for t in (0..=40).rev() {
                let f = curve.factor(RATING, t as f64, 60.0);
                assert!(f <= last + 1e-12, "{} increased as temp fell at {}C", curve.name(), t);
                assert!((0.0..=1.0).contains(&f));
                last = f;
            }
            let mut last = f64::INFINITY;
            for rh in (10..=90).rev() {
                let f = curve.factor(RATING, 25.0, rh as f64);
                assert!(f <= last + 1e-12, "{} increased as RH fell at {}%", curve.name(), rh);
                last = f;
            }
        }
    }

    #[test]
    fn test_derated_capacity_bounded_by_rated() {
        let curve = default_table();
        assert_relative_eq!(curve.derated_capacity(50.0, 35.0, 90.0, RATING), 50.0);
        let cold = curve.derated_capacity(50.0, 10.0, 40.0, RATING);
        assert!(cold > 0.0 && cold < 50.0);
        assert_eq!(curve.derated_capacity(-5.0, 30.0, 80.0, RATING), 0.0);
    }

    #[test]
    fn test_dew_point_curve_unity_at_rating() {
        let curve = DewPointDerating::default();
        assert_relative_eq!(curve.factor(RATING, 30.0, 80.0), 1.0, epsilon = 1e-9);
        assert!(curve.factor(RATING, 15.0, 50.0) < 0.5);
    }

    #[test]
    fn test_build_curve_by_kind() {
        let mut config = default_rules().derating;
        assert_eq!(build_curve(&config).name(), "table");
        config.curve = CurveKind::DewPoint;
        assert_eq!(build_curve(&config).name(), "dew_point");
        config.curve = CurveKind::None;
        assert_eq!(build_curve(&config).name(), "none");
    }

    #[test]
    fn test_pool_multiplier_steps() {
        let steps = default_rules().pool_multipliers;
        assert_eq!(pool_temperature_multiplier(&steps, 28.0), 1.0);
        assert_eq!(pool_temperature_multiplier(&steps, 30.0), 1.0);
        assert_eq!(pool_temperature_multiplier(&steps, 30.5), 1.5);
        assert_eq!(pool_temperature_multiplier(&steps, 35.0), 1.5);
        assert_eq!(pool_temperature_multiplier(&steps, 38.0), 2.0);
    }

    #[test]
    fn test_temperature_band_boundary() {
        assert_eq!(temperature_band(20.0, 20.0), TemperatureBand::Normal);
        assert_eq!(temperature_band(19.999, 20.0), TemperatureBand::Cold);
    }
}
