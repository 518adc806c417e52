use super::super::domain::{LoanApplication, SoftPullRecord, Subscores};
use super::config::UnderwritingConfig;

/// Credit band used when neither the soft pull nor the application recognizes one.
const NEUTRAL_CREDIT_SCORE: f64 = 2.0;
/// Impact level assumed when the applicant leaves it blank.
const NEUTRAL_IMPACT_SCORE: f64 = 2.0;

const CREDIT_BANDS: &[(&str, f64)] = &[
    ("poor", 0.0),
    ("fair", 1.0),
    ("good", 2.0),
    ("very good", 3.0),
    ("excellent", 4.0),
    ("580-599", 0.0),
    ("600-619", 0.0),
    ("620-639", 1.0),
    ("640-659", 1.0),
    ("660-679", 2.0),
    ("680-699", 2.0),
    ("700-719", 3.0),
    ("720-739", 3.0),
    ("740-759", 4.0),
    ("760-780", 4.0),
];

/// Normalized engine inputs. Missing amounts are zero, non-positive collateral is `None`,
/// utilization is held to [0, 100].
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScoringSignals {
    pub monthly_revenue: f64,
    pub monthly_expenses: f64,
    pub loan_amount: f64,
    pub collateral_value: Option<f64>,
    pub years_in_business: f64,
    pub impact_level: Option<i64>,
    pub credit_band: Option<String>,
    pub utilization_pct: Option<f64>,
}

impl ScoringSignals {
    pub fn gather(application: &LoanApplication, soft_pull: Option<&SoftPullRecord>) -> Self {
        let pull = soft_pull.filter(|pull| pull.ok);
        let pulled_band = pull
            .and_then(|pull| pull.score_band.as_deref())
            .filter(|band| !band.trim().is_empty());

        let credit_band = pulled_band
            .or(application.credit_score_band.as_deref())
            .map(str::to_string);

        Self {
            monthly_revenue: amount(application.monthly_revenue),
            monthly_expenses: amount(application.monthly_expenses),
            loan_amount: amount(application.loan_amount_requested),
            collateral_value: application
                .collateral_value
                .filter(|value| value.is_finite() && *value > 0.0),
            years_in_business: amount(application.years_in_business),
            impact_level: application.impact_level,
            credit_band,
            utilization_pct: pull
                .and_then(|pull| pull.utilization_pct)
                .filter(|pct| pct.is_finite())
                .map(|pct| pct.clamp(0.0, 100.0)),
        }
    }

    /// Net operating income over a flat-rate placeholder payment, never dividing by less than 1.
    pub fn dscr(&self, config: &UnderwritingConfig) -> f64 {
        let net_operating_income = (self.monthly_revenue - self.monthly_expenses).max(0.0);
        let estimated_payment = (self.loan_amount * config.payment_rate / 12.0).max(1.0);
        net_operating_income / estimated_payment
    }

    pub fn subscores(&self, dscr: f64) -> Subscores {
        Subscores {
            cashflow: cashflow_subscore(Some(dscr)),
            credit_util: credit_subscore(self.credit_band.as_deref(), self.utilization_pct),
            collateral_ltv: ltv_subscore(self.loan_amount, self.collateral_value),
            competency: competency_subscore(Some(self.years_in_business)),
            community_impact: impact_subscore(self.impact_level),
        }
    }
}

fn amount(value: Option<f64>) -> f64 {
    value.filter(|value| value.is_finite()).unwrap_or(0.0)
}

pub(crate) fn cashflow_subscore(dscr: Option<f64>) -> f64 {
    match dscr {
        None => 0.0,
        Some(ratio) if ratio <= 1.00 => 0.0,
        Some(ratio) if ratio <= 1.25 => 1.0,
        Some(ratio) if ratio <= 1.75 => 2.0,
        Some(ratio) if ratio <= 2.50 => 3.0,
        Some(_) => 4.0,
    }
}

/// Missing collateral scores as the worst case.
pub(crate) fn ltv_subscore(loan_amount: f64, collateral_value: Option<f64>) -> f64 {
    let collateral = match collateral_value {
        Some(value) if value > 0.0 => value,
        _ => return 0.0,
    };

    match loan_amount / collateral {
        ltv if ltv > 1.00 => 0.0,
        ltv if ltv > 0.80 => 1.0,
        ltv if ltv > 0.60 => 2.0,
        ltv if ltv > 0.40 => 3.0,
        _ => 4.0,
    }
}

pub(crate) fn credit_band_score(band: Option<&str>) -> f64 {
    let normalized = band.unwrap_or_default().trim().to_lowercase();
    CREDIT_BANDS
        .iter()
        .find(|(label, _)| *label == normalized)
        .map(|(_, score)| *score)
        .unwrap_or(NEUTRAL_CREDIT_SCORE)
}

pub(crate) fn credit_subscore(band: Option<&str>, utilization_pct: Option<f64>) -> f64 {
    let base = credit_band_score(band);
    match utilization_pct {
        Some(pct) if pct > 50.0 => (base - 1.0).max(0.0),
        Some(pct) if pct >= 40.0 => (base - 0.5).max(0.0),
        _ => base,
    }
}

pub(crate) fn competency_subscore(years: Option<f64>) -> f64 {
    match years {
        None => 0.0,
        Some(years) if years < 1.0 => 0.0,
        Some(years) if years < 2.0 => 1.0,
        Some(years) if years < 4.0 => 2.0,
        Some(years) if years < 5.0 => 3.0,
        Some(_) => 4.0,
    }
}

pub(crate) fn impact_subscore(impact_level: Option<i64>) -> f64 {
    match impact_level {
        None => NEUTRAL_IMPACT_SCORE,
        Some(level) => level.clamp(0, 4) as f64,
    }
}
