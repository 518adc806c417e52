use super::super::domain::{RiskTier, Subscores};
use super::config::ScoringWeights;

pub const TRANCHE_GUIDANCE: &str =
    "Stage funding (e.g., 50/50 or 30/30/40) + training/credit-repair.";

/// Inclusive lower bounds on the score percentage, best tier first.
const TIER_THRESHOLDS: [(f64, RiskTier); 4] = [
    (85.0, RiskTier::A),
    (70.0, RiskTier::B),
    (55.0, RiskTier::C),
    (40.0, RiskTier::D),
];

pub(crate) fn composite_score(subscores: &Subscores, weights: &ScoringWeights) -> f64 {
    subscores.cashflow * weights.cashflow
        + subscores.credit_util * weights.credit_util
        + subscores.collateral_ltv * weights.collateral_ltv
        + subscores.competency * weights.competency
        + subscores.community_impact * weights.community_impact
}

pub(crate) fn score_pct(raw: f64) -> f64 {
    round_to(raw / 4.0 * 100.0, 1)
}

pub(crate) fn tier_from_score(pct: f64) -> RiskTier {
    TIER_THRESHOLDS
        .iter()
        .find(|(floor, _)| pct >= *floor)
        .map(|(_, tier)| *tier)
        .unwrap_or(RiskTier::F)
}

pub(crate) fn tranche_guidance(tier: RiskTier) -> Option<String> {
    tier.requires_tranche()
        .then(|| TRANCHE_GUIDANCE.to_string())
}

/// Half-away-from-zero rounding on the decimal value: binary noise is snapped away
/// before rounding, so a composite of 63.749999... still rounds to 63.8.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let scaled = ((value * factor) * 1e6).round() / 1e6;
    scaled.round() / factor
}
