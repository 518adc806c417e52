use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    lenient_impact_level, ApplicantContact, ApplicationId, BusinessReference,
    ComplianceChecklist, Consents, LoanApplication, SubmissionMetadata,
};

const MIN_TERM_MONTHS: u32 = 3;
const PENDING_STATUS: &str = "pending";

/// Raw intake form payload, before validation and id assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeSubmission {
    pub applicant: ApplicantContact,
    pub business_name: String,
    pub business_address: String,
    pub business_type: String,
    pub entity_type: String,
    pub business_ein: String,
    pub years_in_business: f64,
    pub loan_amount_requested: f64,
    pub loan_term_months: Option<u32>,
    pub loan_purpose: String,
    pub monthly_revenue: f64,
    pub monthly_expenses: f64,
    pub existing_debt_monthly_payment: f64,
    pub collateral_type: String,
    pub collateral_value: f64,
    pub credit_score_band: String,
    /// Reported revolving utilization; stored so every bureau lookup sees the same figure.
    pub utilization_pct: Option<f64>,
    #[serde(deserialize_with = "lenient_impact_level")]
    pub impact_level: Option<i64>,
    pub jobs_estimate: u32,
    pub compliance: ComplianceChecklist,
    pub consents: Consents,
    pub references: Vec<BusinessReference>,
    pub attest_true: bool,
    pub attest_authorized: bool,
}

/// Validation errors raised before an application is accepted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntakeViolation {
    #[error("required field missing: {0}")]
    MissingField(&'static str),
    #[error("applicant must certify the information and authorize evaluation")]
    MissingAttestation,
    #[error("{field} must be a non-negative amount (found {found})")]
    NegativeAmount { field: &'static str, found: f64 },
    #[error("impact level must be between 0 and 4 (found {0})")]
    ImpactOutOfRange(i64),
    #[error("utilization must be between 0 and 100 percent (found {0})")]
    UtilizationOutOfRange(f64),
    #[error("loan term must be at least 3 months (found {0})")]
    TermTooShort(u32),
}

/// Guard responsible for producing stored `LoanApplication` records from intake payloads.
#[derive(Debug, Clone, Default)]
pub struct IntakeGuard;

impl IntakeGuard {
    pub fn new() -> Self {
        Self
    }

    pub fn application_from_submission(
        &self,
        submission: IntakeSubmission,
        channel: &str,
        now: DateTime<Utc>,
    ) -> Result<LoanApplication, IntakeViolation> {
        require("first_name", &submission.applicant.first_name)?;
        require("last_name", &submission.applicant.last_name)?;
        require("email", &submission.applicant.email)?;
        require("business_name", &submission.business_name)?;

        if !(submission.attest_true && submission.attest_authorized) {
            return Err(IntakeViolation::MissingAttestation);
        }

        for (field, value) in [
            ("years_in_business", submission.years_in_business),
            ("loan_amount_requested", submission.loan_amount_requested),
            ("monthly_revenue", submission.monthly_revenue),
            ("monthly_expenses", submission.monthly_expenses),
            (
                "existing_debt_monthly_payment",
                submission.existing_debt_monthly_payment,
            ),
            ("collateral_value", submission.collateral_value),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(IntakeViolation::NegativeAmount {
                    field,
                    found: value,
                });
            }
        }

        check_impact_level(submission.impact_level)?;
        check_utilization(submission.utilization_pct)?;

        if let Some(term) = submission.loan_term_months {
            if term < MIN_TERM_MONTHS {
                return Err(IntakeViolation::TermTooShort(term));
            }
        }

        let references = submission
            .references
            .into_iter()
            .filter(|reference| !reference.name.trim().is_empty())
            .collect();

        Ok(LoanApplication {
            application_id: Some(ApplicationId::generate(now)),
            applicant: Some(submission.applicant),
            business_name: Some(submission.business_name),
            business_address: non_empty(submission.business_address),
            business_type: non_empty(submission.business_type),
            entity_type: non_empty(submission.entity_type),
            business_ein: non_empty(submission.business_ein),
            years_in_business: Some(submission.years_in_business),
            loan_amount_requested: Some(submission.loan_amount_requested),
            loan_term_months: submission.loan_term_months,
            loan_purpose: non_empty(submission.loan_purpose),
            monthly_revenue: Some(submission.monthly_revenue),
            monthly_expenses: Some(submission.monthly_expenses),
            existing_debt_monthly_payment: Some(submission.existing_debt_monthly_payment),
            collateral_type: non_empty(submission.collateral_type),
            collateral_value: Some(submission.collateral_value),
            credit_score_band: non_empty(submission.credit_score_band),
            utilization_pct: submission.utilization_pct,
            impact_level: submission.impact_level,
            jobs_estimate: Some(submission.jobs_estimate),
            compliance: submission.compliance,
            consents: submission.consents,
            references,
            metadata: Some(SubmissionMetadata {
                submitted_at: now.to_rfc3339_opts(SecondsFormat::Secs, true),
                channel: channel.to_string(),
                status: PENDING_STATUS.to_string(),
            }),
        })
    }
}

/// Impact levels run 0-4; absent is allowed.
pub(crate) fn check_impact_level(level: Option<i64>) -> Result<(), IntakeViolation> {
    match level {
        Some(level) if !(0..=4).contains(&level) => Err(IntakeViolation::ImpactOutOfRange(level)),
        _ => Ok(()),
    }
}

pub(crate) fn check_utilization(pct: Option<f64>) -> Result<(), IntakeViolation> {
    match pct {
        Some(pct) if !(0.0..=100.0).contains(&pct) => {
            Err(IntakeViolation::UtilizationOutOfRange(pct))
        }
        _ => Ok(()),
    }
}

fn require(field: &'static str, value: &str) -> Result<(), IntakeViolation> {
    if value.trim().is_empty() {
        Err(IntakeViolation::MissingField(field))
    } else {
        Ok(())
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 9, 30, 0)
            .single()
            .expect("valid timestamp")
    }

    fn submission() -> IntakeSubmission {
        IntakeSubmission {
            applicant: ApplicantContact {
                first_name: "Dana".to_string(),
                last_name: "Reyes".to_string(),
                email: "dana@example.com".to_string(),
                phone: "555-0100".to_string(),
                address: "12 Main St".to_string(),
            },
            business_name: "Reyes Freight LLC".to_string(),
            monthly_revenue: 10_000.0,
            monthly_expenses: 4_000.0,
            loan_amount_requested: 50_000.0,
            loan_term_months: Some(12),
            years_in_business: 3.0,
            credit_score_band: "700-719".to_string(),
            utilization_pct: Some(35.0),
            impact_level: Some(2),
            references: vec![
                BusinessReference {
                    name: "Sam Ortiz".to_string(),
                    relationship: "Supplier".to_string(),
                    phone: "555-0101".to_string(),
                },
                BusinessReference::default(),
            ],
            attest_true: true,
            attest_authorized: true,
            ..IntakeSubmission::default()
        }
    }

    #[test]
    fn accepted_submission_is_stamped_and_trimmed() {
        let application = IntakeGuard::new()
            .application_from_submission(submission(), "api-intake", now())
            .expect("valid submission");

        assert_eq!(
            application.application_id,
            Some(ApplicationId("app-20250602093000".to_string()))
        );
        let metadata = application.metadata.expect("metadata stamped");
        assert_eq!(metadata.submitted_at, "2025-06-02T09:30:00Z");
        assert_eq!(metadata.channel, "api-intake");
        assert_eq!(metadata.status, "pending");
        assert_eq!(application.references.len(), 1);
        assert_eq!(application.credit_score_band.as_deref(), Some("700-719"));
        assert_eq!(application.business_ein, None);
        assert_eq!(application.utilization_pct, Some(35.0));
    }

    #[test]
    fn missing_contact_fields_are_rejected() {
        let mut missing_email = submission();
        missing_email.applicant.email = "   ".to_string();

        let error = IntakeGuard::new()
            .application_from_submission(missing_email, "api-intake", now())
            .expect_err("email required");
        assert_eq!(error, IntakeViolation::MissingField("email"));
    }

    #[test]
    fn attestations_are_required() {
        let mut unattested = submission();
        unattested.attest_authorized = false;

        let error = IntakeGuard::new()
            .application_from_submission(unattested, "api-intake", now())
            .expect_err("attestation required");
        assert_eq!(error, IntakeViolation::MissingAttestation);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let guard = IntakeGuard::new();

        let mut negative = submission();
        negative.monthly_expenses = -1.0;
        assert!(matches!(
            guard.application_from_submission(negative, "api-intake", now()),
            Err(IntakeViolation::NegativeAmount {
                field: "monthly_expenses",
                ..
            })
        ));

        let mut impact = submission();
        impact.impact_level = Some(5);
        assert_eq!(
            guard.application_from_submission(impact, "api-intake", now()),
            Err(IntakeViolation::ImpactOutOfRange(5))
        );

        let mut utilization = submission();
        utilization.utilization_pct = Some(120.0);
        assert_eq!(
            guard.application_from_submission(utilization, "api-intake", now()),
            Err(IntakeViolation::UtilizationOutOfRange(120.0))
        );

        let mut term = submission();
        term.loan_term_months = Some(1);
        assert_eq!(
            guard.application_from_submission(term, "api-intake", now()),
            Err(IntakeViolation::TermTooShort(1))
        );
    }
}
