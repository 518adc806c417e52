mod apr;
mod config;
mod subscores;
mod tiering;

pub use config::{AprPolicy, ScoringWeights, UnderwritingConfig};
pub use tiering::TRANCHE_GUIDANCE;

use super::domain::{DecisionRecord, LoanApplication, SoftPullRecord};
use apr::AprInputs;
use subscores::ScoringSignals;

/// Stateless underwriting engine: application plus optional soft pull in, decision out.
#[derive(Debug, Clone, Default)]
pub struct UnderwritingEngine {
    config: UnderwritingConfig,
}

impl UnderwritingEngine {
    pub fn new(config: UnderwritingConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    pub fn config(&self) -> &UnderwritingConfig {
        &self.config
    }

    pub fn score(
        &self,
        application: &LoanApplication,
        soft_pull: Option<&SoftPullRecord>,
    ) -> DecisionRecord {
        let signals = ScoringSignals::gather(application, soft_pull);
        let dscr = signals.dscr(&self.config);
        let subscores = signals.subscores(dscr);

        let raw_score = tiering::composite_score(&subscores, &self.config.weights);
        let score_pct = tiering::score_pct(raw_score);
        let risk_tier = tiering::tier_from_score(score_pct);

        let apr_breakdown = apr::apr_breakdown(
            &AprInputs {
                raw_score,
                dscr,
                utilization_pct: signals.utilization_pct,
                loan_amount: signals.loan_amount,
                collateral_value: signals.collateral_value,
            },
            &self.config.apr,
        );
        let apr_estimate = apr::apr_estimate(&apr_breakdown, &self.config.apr);

        DecisionRecord {
            dscr_estimate: tiering::round_to(dscr, 2),
            subscores,
            score_pct,
            risk_tier,
            decision: risk_tier.decision(),
            apr_estimate,
            tranche_guidance: tiering::tranche_guidance(risk_tier),
            apr_breakdown,
        }
    }
}

/// Score with the standard rubric.
pub fn score_application(
    application: &LoanApplication,
    soft_pull: Option<&SoftPullRecord>,
) -> DecisionRecord {
    UnderwritingEngine::default().score(application, soft_pull)
}
