//! Psychrometric primitives at standard atmospheric pressure.
//!
//! All functions are pure. Temperatures in °C, relative humidity in percent.

/// Standard atmospheric pressure in kPa.
pub const ATM_KPA: f64 = 101.325;

const R_DRY_AIR: f64 = 287.055;
const R_WATER_VAPOUR: f64 = 461.495;

// Magnus coefficients (ASHRAE-style fit).
const MAGNUS_A_KPA: f64 = 0.61078;
const MAGNUS_B: f64 = 17.2694;
const MAGNUS_C: f64 = 237.3;

/// Saturation vapour pressure in kPa.
pub fn saturation_vp_kpa(temp_c: f64) -> f64 {
    MAGNUS_A_KPA * ((MAGNUS_B * temp_c) / (temp_c + MAGNUS_C)).exp()
}

/// Partial pressure of water vapour in kPa. RH is clamped to [0, 100].
pub fn vapour_pressure_kpa(temp_c: f64, rh_pct: f64) -> f64 {
    (rh_pct.clamp(0.0, 100.0) / 100.0) * saturation_vp_kpa(temp_c)
}

/// Humidity ratio W in kg water per kg dry air.
pub fn humidity_ratio(temp_c: f64, rh_pct: f64) -> f64 {
    let pw = vapour_pressure_kpa(temp_c, rh_pct);
    0.62198 * pw / (ATM_KPA - pw).max(1e-9)
}

/// W(current) - W(target) at a fixed temperature; positive when target is drier.
pub fn delta_humidity_ratio(temp_c: f64, current_rh_pct: f64, target_rh_pct: f64) -> f64 {
    humidity_ratio(temp_c, current_rh_pct) - humidity_ratio(temp_c, target_rh_pct)
}

/// Moist-air density in kg/m³ (ideal-gas mixture of dry air and vapour).
pub fn air_density_moist(temp_c: f64, rh_pct: f64) -> f64 {
    let t_k = temp_c + 273.15;
    let p = ATM_KPA * 1000.0;
    let pw = vapour_pressure_kpa(temp_c, rh_pct) * 1000.0;
    let pd = (p - pw).max(0.0);
    pd / (R_DRY_AIR * t_k) + pw / (R_WATER_VAPOUR * t_k)
}

/// Dew point in °C, or `None` when there is no vapour to condense.
pub fn dew_point(temp_c: f64, rh_pct: f64) -> Option<f64> {
    let pv = vapour_pressure_kpa(temp_c, rh_pct);
    if pv <= 0.0 {
        return None;
    }
    let alpha = (pv / MAGNUS_A_KPA).ln();
    Some(MAGNUS_C * alpha / (MAGNUS_B - alpha))
}
