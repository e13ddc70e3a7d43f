//! Type definitions for the sizing engine.
//!
//! Rule tables deserialize from TOML; requests, catalog entries and results
//! use the JSON field names of the direct-call API.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// CONFIGURATION TYPES (loaded from TOML)
// =============================================================================

/// Root configuration loaded from sizing_rules.toml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizingRules {
    pub defaults: Defaults,
    pub limits: Limits,
    pub loads: LoadFactors,
    pub evaporation: EvaporationModel,
    pub temperature: TemperatureRules,
    pub bands: BandTable,
    /// Ordered water-temperature steps; the last step may be open-ended
    pub pool_multipliers: Vec<PoolMultiplierStep>,
    pub derating: DeratingConfig,
    #[serde(default)]
    pub escalation: EscalationRules,
}

/// Values used when the request leaves a field out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    /// Ceiling height assumed for area <-> volume conversion (m)
    pub ceiling_height_m: f64,
    /// Air changes per hour for non-pool spaces
    pub ach_room: f64,
    /// Air changes per hour for pool halls
    pub ach_pool: f64,
    pub max_units_per_combination: u32,
    /// Rating condition assumed when a catalog entry omits it
    pub reference_temp_c: f64,
    pub reference_rh_pct: f64,
}

/// Hard input bounds enforced by request validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Limits {
    pub indoor_temp_min_c: f64,
    pub indoor_temp_max_c: f64,
    pub water_temp_min_c: f64,
    pub water_temp_max_c: f64,
    pub max_units_per_combination: u32,
}

/// Coefficients for the latent load model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadFactors {
    /// Latent moisture released per occupant (g/h)
    pub occupant_latent_g_per_h: f64,
    /// kW of latent heat per L/h of condensate
    pub latent_kw_per_lph: f64,
}

/// Which evaporation estimate to report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EvaporationMode {
    Standard,
    /// Standard estimate scaled by the field bias, never below the minimum ratio
    FieldCalibrated,
}

/// Open-water evaporation coefficients.
///
/// kg/h = area × c_standard × Δp × K × activity, with the air-film factor
/// K = film_a + film_b × v_fpm^film_c and Δp in kPa.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaporationModel {
    pub mode: EvaporationMode,
    pub c_standard: f64,
    pub film_a: f64,
    pub film_b: f64,
    pub film_c: f64,
    pub field_bias: f64,
    pub min_ratio_vs_standard: f64,
    /// Fraction of evaporation suppressed while the cover is on
    pub cover_reduction: f64,
    pub air_velocity_mps: AirVelocities,
    pub activity_factor: ActivityFactors,
}

/// Air speed over the water surface for each air movement level (m/s).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirVelocities {
    pub still: f64,
    pub low: f64,
    pub medium: f64,
}

impl AirVelocities {
    pub fn for_level(&self, level: AirMovement) -> f64 {
        match level {
            AirMovement::Still => self.still,
            AirMovement::Low => self.low,
            AirMovement::Medium => self.medium,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityFactors {
    pub none: f64,
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl ActivityFactors {
    pub fn for_level(&self, level: ActivityLevel) -> f64 {
        match level {
            ActivityLevel::None => self.none,
            ActivityLevel::Low => self.low,
            ActivityLevel::Medium => self.medium,
            ActivityLevel::High => self.high,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemperatureRules {
    /// Indoor temperatures strictly below this are the cold band
    pub cold_threshold_c: f64,
}

/// Margin acceptance bands keyed by temperature band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandTable {
    pub normal: MarginBand,
    pub cold: MarginBand,
}

impl BandTable {
    pub fn for_band(&self, band: TemperatureBand) -> &MarginBand {
        match band {
            TemperatureBand::Normal => &self.normal,
            TemperatureBand::Cold => &self.cold,
        }
    }
}

/// Accept and preferred margin ranges, in percent, bounds inclusive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarginBand {
    pub accept_min_pct: f64,
    pub accept_max_pct: f64,
    pub preferred_min_pct: f64,
    pub preferred_max_pct: f64,
    /// Distance multiplier applied to negative margins when ranking
    #[serde(default = "default_undersize_weight")]
    pub undersize_weight: f64,
}

fn default_undersize_weight() -> f64 {
    1.0
}

impl MarginBand {
    pub fn accepts(&self, margin_pct: f64) -> bool {
        margin_pct >= self.accept_min_pct && margin_pct <= self.accept_max_pct
    }

    pub fn prefers(&self, margin_pct: f64) -> bool {
        margin_pct >= self.preferred_min_pct && margin_pct <= self.preferred_max_pct
    }

    /// Ranking target: 0% when the preferred range straddles zero, else its midpoint.
    pub fn target_pct(&self) -> f64 {
        if self.preferred_min_pct < 0.0 && self.preferred_max_pct > 0.0 {
            0.0
        } else {
            (self.preferred_min_pct + self.preferred_max_pct) / 2.0
        }
    }
}

/// One step of the pool water-temperature multiplier table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolMultiplierStep {
    /// Inclusive upper bound; `None` matches every remaining temperature
    #[serde(default)]
    pub up_to_water_c: Option<f64>,
    pub factor: f64,
}

/// Which derating curve the engine builds from the rule tables.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum CurveKind {
    Table,
    DewPoint,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeratingConfig {
    pub curve: CurveKind,
    /// Factor by °C below the unit's reference temperature
    #[serde(default)]
    pub temperature: Vec<DeratingPoint>,
    /// Factor by RH points below the unit's reference RH
    #[serde(default)]
    pub humidity: Vec<DeratingPoint>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DeratingPoint {
    pub below_reference: f64,
    pub factor: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EscalationRules {
    /// Advisory escalation when a selected combination costs more than this
    #[serde(default)]
    pub budget_ceiling: Option<f64>,
}

// =============================================================================
// INPUT TYPES (request and catalog)
// =============================================================================

/// Kind of space being dehumidified.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Application {
    Room,
    Pool,
    Basement,
    Garage,
}

impl Application {
    pub fn is_pool(&self) -> bool {
        matches!(self, Application::Pool)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Application::Room => "room",
            Application::Pool => "pool",
            Application::Basement => "basement",
            Application::Garage => "garage",
        }
    }
}

impl fmt::Display for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RoomDimensions {
    pub length_m: f64,
    pub width_m: f64,
    pub height_m: f64,
}

/// Bather activity on an open water surface.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    None,
    #[default]
    Low,
    Medium,
    High,
}

/// Air movement across an open water surface.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AirMovement {
    #[default]
    Still,
    Low,
    Medium,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PoolSpec {
    #[serde(rename = "surfaceArea_m2")]
    pub surface_area_m2: f64,
    #[serde(rename = "waterTemp_c")]
    pub water_temp_c: f64,
    #[serde(default)]
    pub activity: ActivityLevel,
    #[serde(default)]
    pub air_movement: AirMovement,
    /// Hours per day the cover is on, 0-24
    #[serde(default, rename = "coveredHours_per_day")]
    pub covered_hours_per_day: f64,
}

impl PoolSpec {
    /// Uncovered pool with default activity and still air.
    pub fn new(surface_area_m2: f64, water_temp_c: f64) -> Self {
        Self {
            surface_area_m2,
            water_temp_c,
            activity: ActivityLevel::default(),
            air_movement: AirMovement::default(),
            covered_hours_per_day: 0.0,
        }
    }
}

/// How a product is installed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InstallationType {
    WallMount,
    Ducted,
    Portable,
}

impl InstallationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstallationType::WallMount => "wall_mount",
            InstallationType::Ducted => "ducted",
            InstallationType::Portable => "portable",
        }
    }
}

impl fmt::Display for InstallationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An extra moisture source declared alongside the room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpecialLoad {
    Spa {
        #[serde(rename = "surfaceArea_m2")]
        surface_area_m2: f64,
        #[serde(rename = "waterTemp_c")]
        water_temp_c: f64,
        #[serde(default)]
        activity: ActivityLevel,
        #[serde(default, rename = "coveredHours_per_day")]
        covered_hours_per_day: f64,
    },
    Laundry {
        #[serde(rename = "litresPerHour")]
        litres_per_hour: f64,
        #[serde(rename = "hoursPerDay")]
        hours_per_day: f64,
    },
    Process {
        #[serde(rename = "litresPerDay")]
        litres_per_day: f64,
    },
}

/// Caller-supplied sizing request. Exactly one of `dimensions`, `volume_m3`
/// and `floor_area_m2` must be present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SizingRequest {
    #[serde(default)]
    pub dimensions: Option<RoomDimensions>,
    #[serde(default, rename = "volume_m3")]
    pub volume_m3: Option<f64>,
    #[serde(default, rename = "floorArea_m2")]
    pub floor_area_m2: Option<f64>,
    /// Only used with `floor_area_m2`
    #[serde(default, rename = "ceilingHeight_m")]
    pub ceiling_height_m: Option<f64>,
    #[serde(rename = "currentRH_pct")]
    pub current_rh_pct: f64,
    #[serde(rename = "targetRH_pct")]
    pub target_rh_pct: f64,
    #[serde(rename = "indoorTemp_c")]
    pub indoor_temp_c: f64,
    #[serde(default)]
    pub ach: Option<f64>,
    #[serde(default)]
    pub people_count: u32,
    pub application: Application,
    #[serde(default)]
    pub pool: Option<PoolSpec>,
    #[serde(default)]
    pub max_units_per_combination: Option<u32>,
    #[serde(default)]
    pub special_loads: Vec<SpecialLoad>,
    /// Overrides the configured budget ceiling for this call
    #[serde(default)]
    pub budget_max: Option<f64>,
    /// Installation types to consider; empty means any
    #[serde(default)]
    pub preferred_types: Vec<InstallationType>,
}

/// A catalog entry. Owned by the caller and never modified by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductUnit {
    pub sku: String,
    pub name: String,
    /// Product line grouping interchangeable models (e.g. "SP-PRO")
    pub family: String,
    #[serde(default)]
    pub pool_safe: bool,
    #[serde(rename = "ratedCapacity_lpd")]
    pub rated_capacity_lpd: f64,
    #[serde(default, rename = "referenceTemp_c")]
    pub reference_temp_c: Option<f64>,
    #[serde(default, rename = "referenceRH_pct")]
    pub reference_rh_pct: Option<f64>,
    #[serde(default, rename = "maxRoom_m3")]
    pub max_room_m3: Option<f64>,
    #[serde(default, rename = "maxRoom_m2")]
    pub max_room_m2: Option<f64>,
    #[serde(default, rename = "maxPool_m2")]
    pub max_pool_m2: Option<f64>,
    #[serde(default)]
    pub auto_defrost: bool,
    #[serde(default)]
    pub installation_type: Option<InstallationType>,
    /// `None` means price on request
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub url: Option<String>,
}

// =============================================================================
// DERIVED TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureBand {
    Cold,
    Normal,
}

/// Component view of the latent load, all in L/24h unless noted.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LoadBreakdown {
    pub infiltration_lpd: f64,
    pub occupant_lpd: f64,
    pub special_lpd: f64,
    /// Pool evaporation estimate; informational, pool sizing uses surface area
    pub pool_evaporation_lpd: f64,
    pub total_lpd: f64,
    /// One-time litres to pull the air alone from current to target RH
    pub pulldown_air_l: f64,
    pub steady_latent_kw: f64,
}

/// Normalized requirement every later stage works from.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SizingRequirement {
    pub application: Application,
    #[serde(rename = "volume_m3")]
    pub volume_m3: f64,
    #[serde(rename = "roomArea_m2")]
    pub room_area_m2: f64,
    #[serde(rename = "requiredLoad_lpd")]
    pub required_load_lpd: f64,
    /// Pool surface after the water-temperature multiplier (0 without a pool)
    #[serde(rename = "effectivePoolArea_m2")]
    pub effective_pool_area_m2: f64,
    pub pool_multiplier: Option<f64>,
    pub temperature_band: TemperatureBand,
    #[serde(rename = "indoorTemp_c")]
    pub indoor_temp_c: f64,
    #[serde(rename = "targetRH_pct")]
    pub target_rh_pct: f64,
    pub max_units_per_combination: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub preferred_types: Vec<InstallationType>,
    pub load_breakdown: LoadBreakdown,
}

// =============================================================================
// OUTPUT TYPES
// =============================================================================

/// One catalog model repeated `quantity` times.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CandidateCombination {
    pub family: String,
    pub sku: String,
    pub name: String,
    pub quantity: u32,
    #[serde(rename = "effectiveCapacity_lpd")]
    pub effective_capacity_lpd: f64,
    #[serde(rename = "coverageRoom_m3")]
    pub coverage_room_m3: Option<f64>,
    #[serde(rename = "coverageRoom_m2")]
    pub coverage_room_m2: Option<f64>,
    #[serde(rename = "coveragePool_m2")]
    pub coverage_pool_m2: Option<f64>,
    /// `None` when the unit is price on request
    pub total_price: Option<f64>,
    /// Margin on the governing dimension: litres for rooms, effective area for pools
    pub margin_pct: f64,
    pub pool_safe: bool,
    /// Minimal multi-unit answer for a pool larger than any single unit
    pub large_pool_rule: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// The single rule a combination failed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    NotPoolSafe,
    InstallationTypeExcluded,
    RequiresAutoDefrost,
    MissingCoverageRating,
    CoverageInsufficient,
    PoolCoverageInsufficient,
    CapacityInsufficient,
    MarginOutOfBand,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::NotPoolSafe => "not_pool_safe",
            RejectionReason::InstallationTypeExcluded => "installation_type_excluded",
            RejectionReason::RequiresAutoDefrost => "requires_auto_defrost",
            RejectionReason::MissingCoverageRating => "missing_coverage_rating",
            RejectionReason::CoverageInsufficient => "coverage_insufficient",
            RejectionReason::PoolCoverageInsufficient => "pool_coverage_insufficient",
            RejectionReason::CapacityInsufficient => "capacity_insufficient",
            RejectionReason::MarginOutOfBand => "margin_out_of_band",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Rejection {
    pub combination: CandidateCombination,
    pub reason: RejectionReason,
    /// Numbers behind the rejection, for diagnostics
    pub detail: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EscalationReason {
    EmptyCatalog,
    NoPoolSafeFamily,
    ExceedsMultiUnitCapacity,
    NoFeasibleCombination,
    /// Advisory: the recommendation is still populated
    OverBudget,
}

impl EscalationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EscalationReason::EmptyCatalog => "empty_catalog",
            EscalationReason::NoPoolSafeFamily => "no_pool_safe_family",
            EscalationReason::ExceedsMultiUnitCapacity => "exceeds_multi_unit_capacity",
            EscalationReason::NoFeasibleCombination => "no_feasible_combination",
            EscalationReason::OverBudget => "over_budget",
        }
    }
}

impl fmt::Display for EscalationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SizingWarning {
    /// Cold band: coil icing likely, only auto-defrost units considered
    IcingRisk,
    /// Pool exceeds every single unit; multi-unit coverage was generated
    LargePoolMultiUnit,
}

/// Complete result of one sizing call.
///
/// `escalate` must be checked independently of `recommendation`: an
/// over-budget escalation keeps its recommendation.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SizingResult {
    pub requirement: SizingRequirement,
    pub recommendation: Option<CandidateCombination>,
    pub alternatives: Vec<CandidateCombination>,
    pub rejected: Vec<Rejection>,
    pub escalate: bool,
    pub escalation_reason: Option<EscalationReason>,
    pub warnings: Vec<SizingWarning>,
}
