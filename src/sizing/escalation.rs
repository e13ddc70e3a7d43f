//! Human-review escalation.
//!
//! Reasons are checked in priority order and the first match wins:
//! empty catalog, no pool-safe family, pool beyond multi-unit capacity,
//! nothing feasible, then the advisory over-budget check.

use std::collections::BTreeMap;

use super::ranker::Selection;
use super::types::{EscalationReason, ProductUnit, SizingRequirement};

/// Most pool area the catalog could ever cover: for each pool-safe family,
/// its largest `maxPool_m2` times the unit cap, summed over families.
pub fn multi_unit_pool_capacity(catalog: &[ProductUnit], max_units: u32) -> f64 {
    let mut largest_by_family: BTreeMap<&str, f64> = BTreeMap::new();
    for unit in catalog.iter().filter(|u| u.pool_safe) {
        if let Some(area) = unit.max_pool_m2 {
            let entry = largest_by_family.entry(unit.family.as_str()).or_insert(0.0);
            *entry = entry.max(area);
        }
    }
    largest_by_family.values().sum::<f64>() * max_units as f64
}

/// Structural problems visible from the catalog alone.
pub fn catalog_escalation(
    req: &SizingRequirement,
    catalog: &[ProductUnit],
) -> Option<EscalationReason> {
    if catalog.is_empty() {
        return Some(EscalationReason::EmptyCatalog);
    }
    if !req.application.is_pool() {
        return None;
    }
    if !catalog.iter().any(|u| u.pool_safe) {
        return Some(EscalationReason::NoPoolSafeFamily);
    }
    let ceiling = multi_unit_pool_capacity(catalog, req.max_units_per_combination);
    if req.effective_pool_area_m2 > ceiling {
        return Some(EscalationReason::ExceedsMultiUnitCapacity);
    }
    None
}

/// True when any selected combination with a known price costs more than `budget`.
pub fn over_budget(selection: &Selection, budget: f64) -> bool {
    selection
        .recommendation
        .iter()
        .chain(selection.alternatives.iter())
        .filter_map(|c| c.total_price)
        .any(|price| price > budget)
}

/// Final escalation decision for a sizing call.
pub fn escalation_reason(
    req: &SizingRequirement,
    catalog: &[ProductUnit],
    selection: &Selection,
    budget: Option<f64>,
) -> Option<EscalationReason> {
    if let Some(reason) = catalog_escalation(req, catalog) {
        return Some(reason);
    }
    if selection.recommendation.is_none() {
        return Some(EscalationReason::NoFeasibleCombination);
    }
    match budget {
        Some(budget) if over_budget(selection, budget) => Some(EscalationReason::OverBudget),
        _ => None,
    }
}
