//! Sizing pipeline.
//!
//! The `SizingEngine` runs validate -> load -> derate -> generate -> rank ->
//! select -> escalate over one request and a caller-owned catalog. It holds
//! no per-call state and can be shared across threads.

use tracing::{debug, info, warn};

use crate::error::{SizingError, ValidationError};

use super::combination::Generator;
use super::derating::{build_curve, pool_temperature_multiplier, temperature_band, DeratingCurve};
use super::escalation::escalation_reason;
use super::load::{compute_load, Climate};
use super::ranker::{rank, select};
use super::rules::default_rules;
use super::types::*;
use super::validation::validate_request;

/// The sizing engine.
///
/// Holds the rule tables and the derating curve built from them.
pub struct SizingEngine {
    rules: SizingRules,
    curve: Box<dyn DeratingCurve>,
}

impl SizingEngine {
    /// Create an engine using the curve selected in `rules.derating`.
    ///
    /// # Arguments
    /// * `rules` - Rule tables (typically from `default_rules()` or `load_rules()`)
    pub fn new(rules: SizingRules) -> Self {
        let curve = build_curve(&rules.derating);
        Self { rules, curve }
    }

    /// Create an engine with a caller-supplied derating curve.
    pub fn with_curve(rules: SizingRules, curve: Box<dyn DeratingCurve>) -> Self {
        Self { rules, curve }
    }

    pub fn curve_name(&self) -> &'static str {
        self.curve.name()
    }

    /// Validate a request and derive the requirement every later stage uses.
    pub fn requirement(&self, request: &SizingRequest) -> Result<SizingRequirement, SizingError> {
        let norm = validate_request(request, &self.rules)?;

        let breakdown = compute_load(
            &norm,
            Climate {
                indoor_temp_c: request.indoor_temp_c,
                current_rh_pct: request.current_rh_pct,
                target_rh_pct: request.target_rh_pct,
            },
            request.people_count,
            &request.special_loads,
            &self.rules.loads,
            &self.rules.evaporation,
        );
        // Pools are sized on surface area, so a zero litre load is still sizable
        if !request.application.is_pool() && !(breakdown.total_lpd > 0.0) {
            return Err(ValidationError::NoLoad.into());
        }

        let (pool_multiplier, effective_pool_area_m2) = match norm.pool {
            Some(pool) => {
                let m =
                    pool_temperature_multiplier(&self.rules.pool_multipliers, pool.water_temp_c);
                (Some(m), pool.surface_area_m2 * m)
            }
            None => (None, 0.0),
        };

        Ok(SizingRequirement {
            application: request.application,
            volume_m3: norm.volume_m3,
            room_area_m2: norm.room_area_m2,
            required_load_lpd: breakdown.total_lpd,
            effective_pool_area_m2,
            pool_multiplier,
            temperature_band: temperature_band(
                request.indoor_temp_c,
                self.rules.temperature.cold_threshold_c,
            ),
            indoor_temp_c: request.indoor_temp_c,
            target_rh_pct: request.target_rh_pct,
            max_units_per_combination: norm.max_units,
            preferred_types: request.preferred_types.clone(),
            load_breakdown: breakdown,
        })
    }

    /// Size a request against a catalog.
    ///
    /// # Returns
    /// * `Ok(SizingResult)` - Including escalated results; infeasibility is data
    /// * `Err(SizingError)` - Invalid request or a broken catalog invariant
    pub fn compute(
        &self,
        request: &SizingRequest,
        catalog: &[ProductUnit],
    ) -> Result<SizingResult, SizingError> {
        let requirement = self.requirement(request)?;
        let band = self.rules.bands.for_band(requirement.temperature_band);

        info!(
            "Sizing {} request: {:.1} m³, load {:.2} L/24h, effective pool {:.1} m², {:?} band, {} catalog units",
            requirement.application,
            requirement.volume_m3,
            requirement.required_load_lpd,
            requirement.effective_pool_area_m2,
            requirement.temperature_band,
            catalog.len()
        );

        let mut warnings = Vec::new();
        if requirement.temperature_band == TemperatureBand::Cold {
            warn!(
                "Indoor temperature {}C is in the cold band; screening units without auto-defrost",
                requirement.indoor_temp_c
            );
            warnings.push(SizingWarning::IcingRisk);
        }

        let generator = Generator {
            requirement: &requirement,
            curve: self.curve.as_ref(),
            defaults: &self.rules.defaults,
        };
        let generation = generator.generate(catalog)?;
        if generation.large_pool_rule {
            warnings.push(SizingWarning::LargePoolMultiUnit);
        }
        debug!(
            "Generated {} combinations ({} screened) with {} curve",
            generation.candidates.len(),
            generation.screened.len(),
            self.curve.name()
        );

        let ranking = rank(generation.candidates, &requirement, band);
        let selection = select(&ranking.accepted);

        let mut rejected = generation.screened;
        rejected.extend(ranking.rejected);
        debug!(
            "{} combinations accepted, {} rejected",
            ranking.accepted.len(),
            rejected.len()
        );

        let budget = request.budget_max.or(self.rules.escalation.budget_ceiling);
        let reason = escalation_reason(&requirement, catalog, &selection, budget);
        match (&selection.recommendation, reason) {
            (_, Some(reason)) => warn!("Escalating for human review: {}", reason),
            (Some(rec), None) => info!(
                "Recommending {} x {} (margin {:.1}%)",
                rec.quantity, rec.sku, rec.margin_pct
            ),
            (None, None) => {}
        }

        Ok(SizingResult {
            requirement,
            recommendation: selection.recommendation,
            alternatives: selection.alternatives,
            rejected,
            escalate: reason.is_some(),
            escalation_reason: reason,
            warnings,
        })
    }
}

/// Size a request with the embedded default rules.
pub fn compute_sizing(
    request: &SizingRequest,
    catalog: &[ProductUnit],
) -> Result<SizingResult, SizingError> {
    SizingEngine::new(default_rules()).compute(request, catalog)
}
