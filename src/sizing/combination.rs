//! Candidate generation: every catalog model at 1..=max units.
//!
//! Combinations never mix models. Units outside the preferred installation
//! types, and in the cold band units without auto-defrost, are screened out
//! before anything is generated. Pool requests leave non-pool-safe units in
//! so each of their combinations is rejected as such.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::SizingError;

use super::derating::{derated_capacity, DeratingCurve};
use super::types::{
    CandidateCombination, Defaults, ProductUnit, Rejection, RejectionReason, SizingRequirement,
    TemperatureBand,
};

/// Output of the generator.
#[derive(Debug, Clone, Default)]
pub struct Generation {
    pub candidates: Vec<CandidateCombination>,
    /// Units removed before generation, one quantity-1 entry each
    pub screened: Vec<Rejection>,
    /// True when the pool exceeds every single unit and a multi-unit
    /// combination was marked under the large-pool rule
    pub large_pool_rule: bool,
}

/// Shared context for building combinations.
pub struct Generator<'a> {
    pub requirement: &'a SizingRequirement,
    pub curve: &'a dyn DeratingCurve,
    pub defaults: &'a Defaults,
}

fn check_non_negative(sku: &str, what: &str, value: f64) -> Result<f64, SizingError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(SizingError::Internal(format!(
            "{} for {} is {} (catalog ratings must be finite and >= 0)",
            what, sku, value
        )))
    }
}

impl<'a> Generator<'a> {
    /// Totals and margin for `quantity` units of one model.
    pub fn build(
        &self,
        unit: &ProductUnit,
        quantity: u32,
    ) -> Result<CandidateCombination, SizingError> {
        let req = self.requirement;
        let q = quantity as f64;

        check_non_negative(&unit.sku, "rated capacity", unit.rated_capacity_lpd)?;
        let single = derated_capacity(
            self.curve,
            unit,
            self.defaults,
            req.indoor_temp_c,
            req.target_rh_pct,
        );
        let effective = check_non_negative(&unit.sku, "effective capacity", single * q)?;

        let scale = |rating: Option<f64>, what: &str| -> Result<Option<f64>, SizingError> {
            rating
                .map(|r| check_non_negative(&unit.sku, what, r * q))
                .transpose()
        };
        let coverage_room_m3 = scale(unit.max_room_m3, "room coverage (m³)")?;
        let coverage_room_m2 = scale(unit.max_room_m2, "room coverage (m²)")?;
        let coverage_pool_m2 = scale(unit.max_pool_m2, "pool coverage")?;

        let margin_pct = if req.application.is_pool() {
            match coverage_pool_m2 {
                Some(cov) => {
                    (cov - req.effective_pool_area_m2) / req.effective_pool_area_m2 * 100.0
                }
                None => -100.0,
            }
        } else {
            (effective - req.required_load_lpd) / req.required_load_lpd * 100.0
        };

        Ok(CandidateCombination {
            family: unit.family.clone(),
            sku: unit.sku.clone(),
            name: unit.name.clone(),
            quantity,
            effective_capacity_lpd: effective,
            coverage_room_m3,
            coverage_room_m2,
            coverage_pool_m2,
            total_price: unit.price.map(|p| p * q),
            margin_pct,
            pool_safe: unit.pool_safe,
            large_pool_rule: false,
            url: unit.url.clone(),
        })
    }

    /// Why a unit is left out of generation, if it is.
    fn screen_reason(&self, unit: &ProductUnit) -> Option<(RejectionReason, String)> {
        let req = self.requirement;
        if req.application.is_pool() && !unit.pool_safe {
            return None;
        }
        if !req.preferred_types.is_empty()
            && !unit
                .installation_type
                .is_some_and(|t| req.preferred_types.contains(&t))
        {
            let installed = unit.installation_type.map_or("unspecified", |t| t.as_str());
            return Some((
                RejectionReason::InstallationTypeExcluded,
                format!("{} is {}, not a preferred installation type", unit.sku, installed),
            ));
        }
        if req.temperature_band == TemperatureBand::Cold && !unit.auto_defrost {
            return Some((
                RejectionReason::RequiresAutoDefrost,
                format!(
                    "{}C is below the cold threshold and {} has no auto-defrost",
                    req.indoor_temp_c, unit.sku
                ),
            ));
        }
        None
    }

    /// Split the catalog into usable units and screen rejections.
    pub fn screen<'c>(
        &self,
        catalog: &'c [ProductUnit],
    ) -> Result<(Vec<&'c ProductUnit>, Vec<Rejection>), SizingError> {
        let mut eligible = Vec::new();
        let mut screened = Vec::new();
        for unit in catalog {
            match self.screen_reason(unit) {
                None => eligible.push(unit),
                Some((reason, detail)) => screened.push(Rejection {
                    combination: self.build(unit, 1)?,
                    reason,
                    detail,
                }),
            }
        }
        Ok((eligible, screened))
    }

    /// Generate every combination for the catalog.
    ///
    /// Families are visited in name order, models in catalog order within
    /// a family, quantities ascending.
    pub fn generate(&self, catalog: &[ProductUnit]) -> Result<Generation, SizingError> {
        let (eligible, screened) = self.screen(catalog)?;
        let max_units = self.requirement.max_units_per_combination;

        let mut families: BTreeMap<&str, Vec<&ProductUnit>> = BTreeMap::new();
        for unit in eligible.iter().copied() {
            families.entry(unit.family.as_str()).or_default().push(unit);
        }

        let large_pool = self.large_pool_target(&eligible);

        let mut candidates = Vec::new();
        for (family, units) in &families {
            debug!("Generating combinations for family {} ({} models)", family, units.len());
            for unit in units {
                for quantity in 1..=max_units {
                    let mut combo = self.build(unit, quantity)?;
                    if let Some((largest, needed)) = large_pool {
                        combo.large_pool_rule = unit.pool_safe
                            && unit.max_pool_m2 == Some(largest)
                            && quantity == needed;
                    }
                    candidates.push(combo);
                }
            }
        }

        Ok(Generation {
            candidates,
            screened,
            large_pool_rule: large_pool.is_some(),
        })
    }

    /// `(largest single-unit pool rating, units needed)` when the effective
    /// pool area exceeds every pool-safe unit and the answer fits the cap.
    fn large_pool_target(&self, eligible: &[&ProductUnit]) -> Option<(f64, u32)> {
        let req = self.requirement;
        if !req.application.is_pool() {
            return None;
        }
        let largest = eligible
            .iter()
            .filter(|u| u.pool_safe)
            .filter_map(|u| u.max_pool_m2)
            .filter(|m| m.is_finite() && *m > 0.0)
            .fold(None, |acc: Option<f64>, m| Some(acc.map_or(m, |a| a.max(m))))?;

        if req.effective_pool_area_m2 <= largest {
            return None;
        }
        let needed = (req.effective_pool_area_m2 / largest).ceil() as u32;
        (needed <= req.max_units_per_combination).then_some((largest, needed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sizing::derating::NoDerating;
    use crate::sizing::rules::default_rules;
    use crate::sizing::types::{Application, InstallationType, LoadBreakdown};
    use approx::assert_relative_eq;

    fn unit(sku: &str, family: &str, pool: Option<f64>, cap: f64) -> ProductUnit {
        ProductUnit {
            sku: sku.to_string(),
            name: sku.to_string(),
            family: family.to_string(),
            pool_safe: pool.is_some(),
            rated_capacity_lpd: cap,
            reference_temp_c: None,
            reference_rh_pct: None,
            max_room_m3: Some(cap * 10.0),
            max_room_m2: None,
            max_pool_m2: pool,
            auto_defrost: false,
            installation_type: None,
            price: Some(1000.0),
            url: None,
        }
    }

    fn requirement(application: Application, pool_area: f64, temp: f64) -> SizingRequirement {
        SizingRequirement {
            application,
            volume_m3: 120.0,
            room_area_m2: 40.0,
            required_load_lpd: 20.0,
            effective_pool_area_m2: pool_area,
            pool_multiplier: if application.is_pool() { Some(1.0) } else { None },
            temperature_band: if temp < 20.0 {
                TemperatureBand::Cold
            } else {
                TemperatureBand::Normal
            },
            indoor_temp_c: temp,
            target_rh_pct: 55.0,
            max_units_per_combination: 4,
            preferred_types: vec![],
            load_breakdown: LoadBreakdown {
                infiltration_lpd: 20.0,
                occupant_lpd: 0.0,
                special_lpd: 0.0,
                pool_evaporation_lpd: 0.0,
                total_lpd: 20.0,
                pulldown_air_l: 1.0,
                steady_latent_kw: 0.58,
            },
        }
    }

    #[test]
    fn test_build_scales_totals() {
        let rules = default_rules();
        let req = requirement(Application::Room, 0.0, 25.0);
        let gen = Generator {
            requirement: &req,
            curve: &NoDerating,
            defaults: &rules.defaults,
        };
        let combo = gen.build(&unit("A1", "A", None, 25.0), 2).unwrap();
        assert_relative_eq!(combo.effective_capacity_lpd, 50.0);
        assert_eq!(combo.coverage_room_m3, Some(500.0));
        assert_eq!(combo.total_price, Some(2000.0));
        assert_relative_eq!(combo.margin_pct, 150.0);
    }

    #[test]
    fn test_pool_margin_on_area() {
        let rules = default_rules();
        let req = requirement(Application::Pool, 40.0, 28.0);
        let gen = Generator {
            requirement: &req,
            curve: &NoDerating,
            defaults: &rules.defaults,
        };
        let combo = gen.build(&unit("P1", "P", Some(30.0), 60.0), 2).unwrap();
        assert_relative_eq!(combo.margin_pct, 50.0);
    }

    #[test]
    fn test_generate_covers_every_quantity() {
        let rules = default_rules();
        let req = requirement(Application::Room, 0.0, 25.0);
        let gen = Generator {
            requirement: &req,
            curve: &NoDerating,
            defaults: &rules.defaults,
        };
        let catalog = vec![unit("B1", "B", None, 20.0), unit("A1", "A", None, 30.0)];
        let generation = gen.generate(&catalog).unwrap();
        assert_eq!(generation.candidates.len(), 8);
        assert_eq!(generation.candidates[0].family, "A", "Families visited in name order");
        assert!(generation.screened.is_empty());
        assert!(!generation.large_pool_rule);
    }

    #[test]
    fn test_cold_band_screens_without_auto_defrost() {
        let rules = default_rules();
        let req = requirement(Application::Basement, 0.0, 12.0);
        let gen = Generator {
            requirement: &req,
            curve: &NoDerating,
            defaults: &rules.defaults,
        };
        let mut defrost = unit("D1", "D", None, 30.0);
        defrost.auto_defrost = true;
        let catalog = vec![unit("N1", "N", None, 30.0), defrost];

        let generation = gen.generate(&catalog).unwrap();
        assert_eq!(generation.screened.len(), 1);
        assert_eq!(generation.screened[0].reason, RejectionReason::RequiresAutoDefrost);
        assert_eq!(generation.screened[0].combination.quantity, 1);
        assert!(generation.candidates.iter().all(|c| c.sku == "D1"));
    }

    #[test]
    fn test_cold_pool_keeps_unsafe_units_for_pool_rejection() {
        let rules = default_rules();
        let req = requirement(Application::Pool, 20.0, 12.0);
        let gen = Generator {
            requirement: &req,
            curve: &NoDerating,
            defaults: &rules.defaults,
        };
        let mut safe = unit("S1", "S", Some(30.0), 60.0);
        safe.auto_defrost = true;
        let catalog = vec![unit("U1", "U", None, 60.0), safe];

        let generation = gen.generate(&catalog).unwrap();
        assert!(generation.screened.is_empty(), "Unsafe unit should not be defrost-screened");
        let unsafe_combos = generation.candidates.iter().filter(|c| c.sku == "U1").count();
        assert_eq!(unsafe_combos, 4);
    }

    #[test]
    fn test_preferred_types_screen_other_installations() {
        let rules = default_rules();
        let mut req = requirement(Application::Room, 0.0, 25.0);
        req.preferred_types = vec![InstallationType::Ducted];
        let gen = Generator {
            requirement: &req,
            curve: &NoDerating,
            defaults: &rules.defaults,
        };
        let mut ducted = unit("D1", "D", None, 30.0);
        ducted.installation_type = Some(InstallationType::Ducted);
        let mut portable = unit("P1", "P", None, 30.0);
        portable.installation_type = Some(InstallationType::Portable);
        let catalog = vec![ducted, portable, unit("X1", "X", None, 30.0)];

        let generation = gen.generate(&catalog).unwrap();
        assert!(generation.candidates.iter().all(|c| c.sku == "D1"));
        let screened: Vec<_> = generation
            .screened
            .iter()
            .map(|r| r.combination.sku.as_str())
            .collect();
        assert_eq!(screened, vec!["P1", "X1"], "Untyped units are excluded too");
        assert!(generation
            .screened
            .iter()
            .all(|r| r.reason == RejectionReason::InstallationTypeExcluded));
    }

    #[test]
    fn test_large_pool_rule_marks_largest_model() {
        let rules = default_rules();
        let req = requirement(Application::Pool, 80.0, 28.0);
        let gen = Generator {
            requirement: &req,
            curve: &NoDerating,
            defaults: &rules.defaults,
        };
        let catalog = vec![unit("S", "F", Some(30.0), 60.0), unit("L", "F", Some(40.0), 90.0)];
        let generation = gen.generate(&catalog).unwrap();
        assert!(generation.large_pool_rule);

        let flagged: Vec<_> = generation
            .candidates
            .iter()
            .filter(|c| c.large_pool_rule)
            .collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].sku, "L");
        assert_eq!(flagged[0].quantity, 2);
    }

    #[test]
    fn test_large_pool_rule_not_applied_beyond_cap() {
        let rules = default_rules();
        let req = requirement(Application::Pool, 500.0, 28.0);
        let gen = Generator {
            requirement: &req,
            curve: &NoDerating,
            defaults: &rules.defaults,
        };
        let catalog = vec![unit("L", "F", Some(40.0), 90.0)];
        let generation = gen.generate(&catalog).unwrap();
        assert!(!generation.large_pool_rule);
    }

    #[test]
    fn test_negative_rating_is_internal_error() {
        let rules = default_rules();
        let req = requirement(Application::Room, 0.0, 25.0);
        let gen = Generator {
            requirement: &req,
            curve: &NoDerating,
            defaults: &rules.defaults,
        };
        let result = gen.build(&unit("X", "X", None, -5.0), 1);
        assert!(matches!(result, Err(SizingError::Internal(_))));
    }
}
