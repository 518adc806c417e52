use super::super::domain::AprBreakdown;
use super::config::AprPolicy;
use super::tiering::round_to;

/// Independent signals feeding the APR adjustments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct AprInputs {
    pub raw_score: f64,
    pub dscr: f64,
    pub utilization_pct: Option<f64>,
    pub loan_amount: f64,
    pub collateral_value: Option<f64>,
}

pub(crate) fn apr_breakdown(inputs: &AprInputs, policy: &AprPolicy) -> AprBreakdown {
    AprBreakdown {
        base: policy.max_apr() - inputs.raw_score * policy.slope(),
        dscr_adjustment: dscr_adjustment(inputs.dscr),
        utilization_adjustment: utilization_adjustment(inputs.utilization_pct),
        collateral_adjustment: collateral_adjustment(inputs.loan_amount, inputs.collateral_value),
    }
}

pub(crate) fn apr_estimate(breakdown: &AprBreakdown, policy: &AprPolicy) -> f64 {
    let clamped = breakdown
        .unclamped()
        .clamp(policy.min_apr(), policy.max_apr());
    round_to(clamped, 1)
}

/// Coverage in [1.10, 1.25) carries no adjustment.
pub(crate) fn dscr_adjustment(dscr: f64) -> f64 {
    if dscr >= 2.0 {
        -1.2
    } else if dscr >= 1.75 {
        -1.0
    } else if dscr >= 1.25 {
        -0.5
    } else if dscr < 1.10 {
        1.0
    } else {
        0.0
    }
}

/// Unknown utilization is never penalized.
pub(crate) fn utilization_adjustment(utilization_pct: Option<f64>) -> f64 {
    utilization_pct.map(|pct| pct / 50.0).unwrap_or(0.0)
}

pub(crate) fn collateral_adjustment(loan_amount: f64, collateral_value: Option<f64>) -> f64 {
    let collateral = match collateral_value {
        Some(value) if value > 0.0 && loan_amount > 0.0 => value,
        _ => return 0.0,
    };

    match loan_amount / collateral {
        ltv if ltv <= 0.60 => -0.5,
        ltv if ltv <= 0.80 => -0.2,
        _ => 0.0,
    }
}
