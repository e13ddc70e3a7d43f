//! TOML rule loading for the sizing engine.
//!
//! Provides two loading methods:
//! - `default_rules()` - Loads embedded rules compiled into the binary
//! - `load_rules(path)` - Loads custom rules from a file path and checks them

use anyhow::{bail, ensure, Result};
use std::path::Path;

use super::types::{CurveKind, DeratingPoint, EvaporationModel, MarginBand, SizingRules};

/// Default rules embedded in the binary at compile time.
/// These are loaded from `config/sizing_rules.toml`.
const DEFAULT_RULES: &str = include_str!("../../config/sizing_rules.toml");

/// Load rules from a TOML file at the given path.
///
/// # Arguments
/// * `path` - Path to the TOML file containing rule tables
///
/// # Returns
/// * `Ok(SizingRules)` - Parsed and checked rules
/// * `Err` - If the file cannot be read, the TOML is invalid, or a table is inconsistent
pub fn load_rules(path: &Path) -> Result<SizingRules> {
    let content = std::fs::read_to_string(path)?;
    let rules: SizingRules = toml::from_str(&content)?;
    validate_rules(&rules)?;
    Ok(rules)
}

/// Get the default rules embedded in the binary.
///
/// # Panics
/// Panics if the embedded TOML is invalid (this would be a compile-time bug).
pub fn default_rules() -> SizingRules {
    toml::from_str(DEFAULT_RULES).expect("embedded sizing_rules.toml must be valid TOML")
}

/// Check cross-field consistency that serde cannot express.
pub fn validate_rules(rules: &SizingRules) -> Result<()> {
    let d = &rules.defaults;
    ensure!(d.ceiling_height_m > 0.0, "defaults.ceiling_height_m must be > 0");
    ensure!(d.ach_room >= 0.0 && d.ach_pool >= 0.0, "default ach must be >= 0");
    ensure!(
        d.reference_temp_c.is_finite() && (0.0..=100.0).contains(&d.reference_rh_pct),
        "default reference condition is invalid"
    );

    let l = &rules.limits;
    ensure!(
        l.indoor_temp_min_c < l.indoor_temp_max_c,
        "limits.indoor_temp_min_c must be below indoor_temp_max_c"
    );
    ensure!(
        l.water_temp_min_c < l.water_temp_max_c,
        "limits.water_temp_min_c must be below water_temp_max_c"
    );
    ensure!(
        d.max_units_per_combination >= 1
            && d.max_units_per_combination <= l.max_units_per_combination,
        "defaults.max_units_per_combination must be between 1 and limits.max_units_per_combination"
    );

    check_band("bands.normal", &rules.bands.normal)?;
    check_band("bands.cold", &rules.bands.cold)?;
    check_pool_multipliers(rules)?;
    check_evaporation(&rules.evaporation)?;

    if rules.derating.curve == CurveKind::Table {
        check_derating_table("derating.temperature", &rules.derating.temperature)?;
        check_derating_table("derating.humidity", &rules.derating.humidity)?;
    }

    if let Some(ceiling) = rules.escalation.budget_ceiling {
        ensure!(ceiling >= 0.0, "escalation.budget_ceiling must be >= 0");
    }
    Ok(())
}

fn check_band(name: &str, band: &MarginBand) -> Result<()> {
    ensure!(
        band.accept_min_pct <= band.accept_max_pct,
        "{}: accept_min_pct above accept_max_pct",
        name
    );
    ensure!(
        band.preferred_min_pct <= band.preferred_max_pct,
        "{}: preferred_min_pct above preferred_max_pct",
        name
    );
    ensure!(
        band.preferred_min_pct >= band.accept_min_pct
            && band.preferred_max_pct <= band.accept_max_pct,
        "{}: preferred range must sit inside the accept range",
        name
    );
    ensure!(band.undersize_weight >= 1.0, "{}: undersize_weight must be >= 1", name);
    Ok(())
}

fn check_pool_multipliers(rules: &SizingRules) -> Result<()> {
    let steps = &rules.pool_multipliers;
    ensure!(!steps.is_empty(), "pool_multipliers must not be empty");

    let mut last_bound = f64::NEG_INFINITY;
    let mut last_factor = 0.0;
    for (i, step) in steps.iter().enumerate() {
        ensure!(step.factor >= 1.0, "pool_multipliers[{}].factor must be >= 1", i);
        ensure!(
            step.factor >= last_factor,
            "pool_multipliers[{}].factor must not decrease",
            i
        );
        last_factor = step.factor;
        match step.up_to_water_c {
            Some(bound) => {
                ensure!(
                    bound > last_bound,
                    "pool_multipliers[{}].up_to_water_c must increase",
                    i
                );
                last_bound = bound;
            }
            None if i + 1 != steps.len() => {
                bail!("pool_multipliers[{}]: only the last step may be open-ended", i)
            }
            None => {}
        }
    }
    Ok(())
}

fn check_evaporation(model: &EvaporationModel) -> Result<()> {
    ensure!(model.c_standard > 0.0, "evaporation.c_standard must be > 0");
    ensure!(
        model.film_a >= 0.0 && model.film_b >= 0.0 && model.film_c >= 0.0,
        "evaporation film coefficients must be >= 0"
    );
    ensure!(
        model.field_bias > 0.0 && model.min_ratio_vs_standard >= 0.0,
        "evaporation.field_bias must be > 0 and min_ratio_vs_standard >= 0"
    );
    ensure!(
        (0.0..=1.0).contains(&model.cover_reduction),
        "evaporation.cover_reduction must be within 0-1"
    );
    let v = &model.air_velocity_mps;
    ensure!(
        v.still >= 0.0 && v.still <= v.low && v.low <= v.medium,
        "evaporation.air_velocity_mps must be >= 0 and rise from still to medium"
    );
    let a = &model.activity_factor;
    ensure!(
        a.none > 0.0 && a.none <= a.low && a.low <= a.medium && a.medium <= a.high,
        "evaporation.activity_factor must be > 0 and rise from none to high"
    );
    Ok(())
}

fn check_derating_table(name: &str, points: &[DeratingPoint]) -> Result<()> {
    ensure!(!points.is_empty(), "{} must not be empty for the table curve", name);
    ensure!(points[0].below_reference == 0.0, "{} must start at 0", name);

    for pair in points.windows(2) {
        ensure!(
            pair[1].below_reference > pair[0].below_reference,
            "{}: points must be sorted by below_reference",
            name
        );
        ensure!(
            pair[1].factor <= pair[0].factor,
            "{}: factors must not increase away from the reference",
            name
        );
    }
    for p in points {
        ensure!(
            (0.0..=1.0).contains(&p.factor),
            "{}: factor {} outside 0-1",
            name,
            p.factor
        );
    }
    Ok(())
}
