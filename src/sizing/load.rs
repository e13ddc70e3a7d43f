//! Latent moisture load model.
//!
//! Steady-state load is infiltration plus occupants plus declared special
//! loads, in litres per 24 hours. Pool evaporation is estimated for the
//! breakdown only; pool halls are sized on surface area.

use crate::psychro;

use super::types::{
    ActivityLevel, AirMovement, EvaporationMode, EvaporationModel, LoadBreakdown, LoadFactors,
    PoolSpec, SpecialLoad,
};
use super::validation::NormalizedRequest;

const FPM_PER_MPS: f64 = 196.8504;

/// Moisture carried in by outside air: ach × V × ρ × ΔW, per 24 h.
///
/// Density is taken at the target RH, the condition the space is held at.
pub fn infiltration_lpd(
    volume_m3: f64,
    ach: f64,
    indoor_temp_c: f64,
    current_rh_pct: f64,
    target_rh_pct: f64,
) -> f64 {
    let delta_w = psychro::delta_humidity_ratio(indoor_temp_c, current_rh_pct, target_rh_pct);
    let density = psychro::air_density_moist(indoor_temp_c, target_rh_pct);
    (ach * volume_m3 * density * delta_w * 24.0).max(0.0)
}

pub fn occupant_lpd(people: u32, factors: &LoadFactors) -> f64 {
    people as f64 * factors.occupant_latent_g_per_h * 24.0 / 1000.0
}

/// Use of an open water surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exposure {
    pub activity: ActivityLevel,
    pub air_movement: AirMovement,
    pub covered_hours_per_day: f64,
}

impl From<&PoolSpec> for Exposure {
    fn from(pool: &PoolSpec) -> Self {
        Self {
            activity: pool.activity,
            air_movement: pool.air_movement,
            covered_hours_per_day: pool.covered_hours_per_day,
        }
    }
}

/// Open-water evaporation in L/24h (1 kg of water ~ 1 L).
///
/// Driven by the vapour pressure difference between the water surface and
/// the room air. Hours under cover evaporate at `1 - cover_reduction` of the
/// open rate. Zero when the air holds more vapour than the water surface.
pub fn evaporation_lpd(
    surface_area_m2: f64,
    water_temp_c: f64,
    air_temp_c: f64,
    rh_pct: f64,
    exposure: Exposure,
    model: &EvaporationModel,
) -> f64 {
    if !(surface_area_m2 > 0.0) {
        return 0.0;
    }
    let v_fpm = model.air_velocity_mps.for_level(exposure.air_movement).max(0.0) * FPM_PER_MPS;
    let film = model.film_a + model.film_b * v_fpm.powf(model.film_c);
    let dp = (psychro::saturation_vp_kpa(water_temp_c)
        - psychro::vapour_pressure_kpa(air_temp_c, rh_pct))
    .max(0.0);
    let activity = model.activity_factor.for_level(exposure.activity);
    let kg_per_h = surface_area_m2 * model.c_standard * dp * film * activity;

    let covered = exposure.covered_hours_per_day.clamp(0.0, 24.0);
    let residual = 1.0 - model.cover_reduction.clamp(0.0, 1.0);
    let standard = (kg_per_h * (24.0 - covered) + kg_per_h * residual * covered).max(0.0);

    match model.mode {
        EvaporationMode::Standard => standard,
        EvaporationMode::FieldCalibrated => {
            (standard * model.field_bias).max(standard * model.min_ratio_vs_standard)
        }
    }
}

/// Litres per day from one special load. Spas use the room air at the
/// target RH.
pub fn special_load_lpd(load: &SpecialLoad, climate: Climate, model: &EvaporationModel) -> f64 {
    match load {
        SpecialLoad::Spa {
            surface_area_m2,
            water_temp_c,
            activity,
            covered_hours_per_day,
        } => evaporation_lpd(
            *surface_area_m2,
            *water_temp_c,
            climate.indoor_temp_c,
            climate.target_rh_pct,
            Exposure {
                activity: *activity,
                air_movement: AirMovement::Still,
                covered_hours_per_day: *covered_hours_per_day,
            },
            model,
        ),
        SpecialLoad::Laundry {
            litres_per_hour,
            hours_per_day,
        } => litres_per_hour * hours_per_day,
        SpecialLoad::Process { litres_per_day } => *litres_per_day,
    }
}

/// Sum of every special load.
pub fn aggregate_loads(loads: &[SpecialLoad], climate: Climate, model: &EvaporationModel) -> f64 {
    loads.iter().map(|l| special_load_lpd(l, climate, model)).sum()
}

/// One-time litres to take the room air from current to target RH.
pub fn pulldown_air_l(volume_m3: f64, temp_c: f64, current_rh_pct: f64, target_rh_pct: f64) -> f64 {
    let delta_w = psychro::delta_humidity_ratio(temp_c, current_rh_pct, target_rh_pct);
    (delta_w * psychro::air_density_moist(temp_c, current_rh_pct) * volume_m3).max(0.0)
}

/// Latent heat in kW for a daily condensate load.
pub fn latent_kw(load_lpd: f64, factors: &LoadFactors) -> f64 {
    load_lpd / 24.0 * factors.latent_kw_per_lph
}

/// Inputs to the load model that are not part of the normalized request.
#[derive(Debug, Clone, Copy)]
pub struct Climate {
    pub indoor_temp_c: f64,
    pub current_rh_pct: f64,
    pub target_rh_pct: f64,
}

/// Full latent load for a normalized request.
pub fn compute_load(
    norm: &NormalizedRequest,
    climate: Climate,
    people: u32,
    special: &[SpecialLoad],
    factors: &LoadFactors,
    evaporation: &EvaporationModel,
) -> LoadBreakdown {
    let infiltration = infiltration_lpd(
        norm.volume_m3,
        norm.ach,
        climate.indoor_temp_c,
        climate.current_rh_pct,
        climate.target_rh_pct,
    );
    let occupants = occupant_lpd(people, factors);
    let special_lpd = aggregate_loads(special, climate, evaporation);
    let pool_evaporation = norm
        .pool
        .map(|p| {
            evaporation_lpd(
                p.surface_area_m2,
                p.water_temp_c,
                climate.indoor_temp_c,
                climate.target_rh_pct,
                Exposure::from(&p),
                evaporation,
            )
        })
        .unwrap_or(0.0);

    let total = infiltration + occupants + special_lpd;

    LoadBreakdown {
        infiltration_lpd: infiltration,
        occupant_lpd: occupants,
        special_lpd,
        pool_evaporation_lpd: pool_evaporation,
        total_lpd: total,
        pulldown_air_l: pulldown_air_l(
            norm.volume_m3,
            climate.indoor_temp_c,
            climate.current_rh_pct,
            climate.target_rh_pct,
        ),
        steady_latent_kw: latent_kw(total, factors),
    }
}
