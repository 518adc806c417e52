use super::domain::{LoanApplication, SoftPullRecord};

/// Soft-pull source consulted before scoring an application.
pub trait CreditBureau: Send + Sync {
    fn soft_pull(&self, application: &LoanApplication) -> Option<SoftPullRecord>;
}

/// Mock bureau echoing the applicant's self-reported band and utilization.
///
/// Consent is kept on the record for the paper trail; it does not change the pull, so
/// withholding it cannot hide a high utilization.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockCreditBureau;

impl CreditBureau for MockCreditBureau {
    fn soft_pull(&self, application: &LoanApplication) -> Option<SoftPullRecord> {
        Some(SoftPullRecord::approved(
            application.credit_score_band.clone(),
            application.utilization_pct,
        ))
    }
}
