//! Feasibility filtering, margin acceptance, ranking and selection.

use std::cmp::Ordering;

use super::types::{
    CandidateCombination, MarginBand, Rejection, RejectionReason, SizingRequirement,
};

/// Number of alternatives returned next to the recommendation.
pub const MAX_ALTERNATIVES: usize = 2;

/// Accepted combinations in rank order, plus everything that failed a rule.
#[derive(Debug, Clone, Default)]
pub struct Ranking {
    pub accepted: Vec<CandidateCombination>,
    pub rejected: Vec<Rejection>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub recommendation: Option<CandidateCombination>,
    pub alternatives: Vec<CandidateCombination>,
}

type Failure = (RejectionReason, String);

fn check_room_coverage(
    combo: &CandidateCombination,
    req: &SizingRequirement,
) -> Result<(), Failure> {
    if let Some(m3) = combo.coverage_room_m3 {
        if m3 < req.volume_m3 {
            return Err((
                RejectionReason::CoverageInsufficient,
                format!("covers {:.1} m³, room is {:.1} m³", m3, req.volume_m3),
            ));
        }
        return Ok(());
    }
    if let Some(m2) = combo.coverage_room_m2 {
        if m2 < req.room_area_m2 {
            return Err((
                RejectionReason::CoverageInsufficient,
                format!("covers {:.1} m², room is {:.1} m²", m2, req.room_area_m2),
            ));
        }
        return Ok(());
    }
    Err((
        RejectionReason::MissingCoverageRating,
        format!("{} has no room coverage rating", combo.sku),
    ))
}

/// The first feasibility rule a combination fails, if any.
///
/// Pool: pool-safe, room coverage, pool coverage.
/// Room: room coverage, capacity.
/// Then the margin band for either.
pub fn check_feasibility(
    combo: &CandidateCombination,
    req: &SizingRequirement,
    band: &MarginBand,
) -> Result<(), Failure> {
    if req.application.is_pool() {
        if !combo.pool_safe {
            return Err((
                RejectionReason::NotPoolSafe,
                format!("{} is not rated for pool halls", combo.sku),
            ));
        }
        check_room_coverage(combo, req)?;
        match combo.coverage_pool_m2 {
            None => {
                return Err((
                    RejectionReason::MissingCoverageRating,
                    format!("{} has no pool coverage rating", combo.sku),
                ))
            }
            Some(area) if area < req.effective_pool_area_m2 => {
                return Err((
                    RejectionReason::PoolCoverageInsufficient,
                    format!(
                        "covers {:.1} m² of pool, effective area is {:.1} m²",
                        area, req.effective_pool_area_m2
                    ),
                ))
            }
            Some(_) => {}
        }
    } else {
        check_room_coverage(combo, req)?;
        if combo.effective_capacity_lpd < req.required_load_lpd {
            return Err((
                RejectionReason::CapacityInsufficient,
                format!(
                    "removes {:.1} L/24h, load is {:.1} L/24h",
                    combo.effective_capacity_lpd, req.required_load_lpd
                ),
            ));
        }
    }

    if !band.accepts(combo.margin_pct) {
        return Err((
            RejectionReason::MarginOutOfBand,
            format!(
                "margin {:.1}% outside [{}, {}]%",
                combo.margin_pct, band.accept_min_pct, band.accept_max_pct
            ),
        ));
    }
    Ok(())
}

/// Weighted distance from the band target; undersizing counts extra.
fn weighted_distance(margin_pct: f64, band: &MarginBand) -> f64 {
    let distance = (margin_pct - band.target_pct()).abs();
    if margin_pct < 0.0 {
        distance * band.undersize_weight
    } else {
        distance
    }
}

fn unit_count(combo: &CandidateCombination) -> u32 {
    if combo.large_pool_rule {
        1
    } else {
        combo.quantity
    }
}

/// Total order over accepted combinations: fewer units, non-negative margin,
/// inside the preferred range, closer to target, known lower price, SKU.
pub fn compare(a: &CandidateCombination, b: &CandidateCombination, band: &MarginBand) -> Ordering {
    unit_count(a)
        .cmp(&unit_count(b))
        .then_with(|| (a.margin_pct < 0.0).cmp(&(b.margin_pct < 0.0)))
        .then_with(|| (!band.prefers(a.margin_pct)).cmp(&!band.prefers(b.margin_pct)))
        .then_with(|| {
            weighted_distance(a.margin_pct, band).total_cmp(&weighted_distance(b.margin_pct, band))
        })
        .then_with(|| match (a.total_price, b.total_price) {
            (Some(pa), Some(pb)) => pa.total_cmp(&pb),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.sku.cmp(&b.sku))
}

/// Filter candidates and sort the survivors.
pub fn rank(
    candidates: Vec<CandidateCombination>,
    req: &SizingRequirement,
    band: &MarginBand,
) -> Ranking {
    let mut ranking = Ranking::default();
    for combo in candidates {
        match check_feasibility(&combo, req, band) {
            Ok(()) => ranking.accepted.push(combo),
            Err((reason, detail)) => ranking.rejected.push(Rejection {
                combination: combo,
                reason,
                detail,
            }),
        }
    }
    ranking.accepted.sort_by(|a, b| compare(a, b, band));
    ranking
}

/// Top combination, then up to two more from families not yet shown.
pub fn select(accepted: &[CandidateCombination]) -> Selection {
    let mut iter = accepted.iter();
    let Some(top) = iter.next() else {
        return Selection::default();
    };

    let mut families = vec![top.family.as_str()];
    let mut alternatives = Vec::new();
    for combo in iter {
        if alternatives.len() == MAX_ALTERNATIVES {
            break;
        }
        if families.contains(&combo.family.as_str()) {
            continue;
        }
        families.push(combo.family.as_str());
        alternatives.push(combo.clone());
    }

    Selection {
        recommendation: Some(top.clone()),
        alternatives,
    }
}
