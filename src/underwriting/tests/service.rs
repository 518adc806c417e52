use super::common::*;
use crate::underwriting::domain::{ApplicationId, Consents, RiskTier, UnderwritingDecision};
use crate::underwriting::intake::IntakeViolation;
use crate::underwriting::repository::{ApplicationStore, StoreError};
use crate::underwriting::service::{ScoreOverrides, ServiceError};

#[test]
fn submit_persists_and_scores_with_bureau_pull() {
    let (service, store) = build_service();

    let scored = service
        .submit(submission(), "test-intake")
        .expect("submission succeeds");

    let stored = store
        .fetch(&scored.application_id)
        .expect("fetch works")
        .expect("application persisted");
    assert_eq!(stored.business_name.as_deref(), Some("Northside Logistics"));
    assert_eq!(
        stored.metadata.as_ref().map(|meta| meta.channel.as_str()),
        Some("test-intake")
    );

    assert_eq!(scored.result.score_pct, 63.8);
    assert_eq!(scored.result.risk_tier, RiskTier::C);
    assert!(
        scored.result.apr_breakdown.utilization_adjustment > 0.0,
        "reported utilization should reach the APR model via the soft pull"
    );
}

#[test]
fn withholding_consent_does_not_improve_the_rate() {
    let (consenting_service, _) = build_service();
    let (withholding_service, _) = build_service();
    let mut consented = submission();
    consented.utilization_pct = Some(90.0);
    let mut withheld = consented.clone();
    withheld.consents = Consents {
        soft_pull_consent: false,
    };

    let with_consent = consenting_service
        .submit(consented, "test-intake")
        .expect("submission succeeds");
    let without_consent = withholding_service
        .submit(withheld, "test-intake")
        .expect("submission succeeds");

    assert_eq!(with_consent.result, without_consent.result);
    assert_eq!(with_consent.result.subscores.credit_util, 2.0);
}

#[test]
fn rescoring_without_overrides_matches_the_submitted_decision() {
    let (service, _) = build_service();
    let mut submission = submission();
    submission.utilization_pct = Some(90.0);

    let submitted = service
        .submit(submission, "test-intake")
        .expect("submission succeeds");
    let rescored = service
        .score(&submitted.application_id, ScoreOverrides::default())
        .expect("stored application rescored");

    assert_eq!(rescored.result, submitted.result);
    assert_eq!(rescored.application.utilization_pct, Some(90.0));
}

#[test]
fn out_of_range_overrides_are_rejected() {
    let application = baseline_application();
    let id = application.application_id.clone().expect("fixture id");
    let service = service_with_store(MemoryStore::seeded(application));

    let error = service
        .score(
            &id,
            ScoreOverrides {
                utilization_pct: Some(-500.0),
                ..ScoreOverrides::default()
            },
        )
        .expect_err("utilization outside 0-100");
    assert!(matches!(
        error,
        ServiceError::Intake(IntakeViolation::UtilizationOutOfRange(_))
    ));

    let error = service
        .score(
            &id,
            ScoreOverrides {
                impact_level: Some(7),
                ..ScoreOverrides::default()
            },
        )
        .expect_err("impact outside 0-4");
    assert!(matches!(
        error,
        ServiceError::Intake(IntakeViolation::ImpactOutOfRange(7))
    ));
}

#[test]
fn band_override_keeps_reported_utilization() {
    let application = crate::underwriting::domain::LoanApplication {
        utilization_pct: Some(90.0),
        ..baseline_application()
    };
    let id = application.application_id.clone().expect("fixture id");
    let service = service_with_store(MemoryStore::seeded(application));

    let scored = service
        .score(
            &id,
            ScoreOverrides {
                credit_band: Some("excellent".to_string()),
                ..ScoreOverrides::default()
            },
        )
        .expect("scores");

    assert_eq!(scored.result.subscores.credit_util, 3.0);
    assert!((scored.result.apr_breakdown.utilization_adjustment - 1.8).abs() < 1e-9);
}

#[test]
fn submit_rejects_invalid_intake_without_storing() {
    let (service, store) = build_service();
    let mut submission = submission();
    submission.attest_true = false;

    let error = service
        .submit(submission, "test-intake")
        .expect_err("attestation required");

    assert!(matches!(
        error,
        ServiceError::Intake(IntakeViolation::MissingAttestation)
    ));
    assert!(store.list().expect("list works").is_empty());
}

#[test]
fn submit_surfaces_store_conflicts() {
    let service = service_with_store(ConflictStore);

    let error = service
        .submit(submission(), "test-intake")
        .expect_err("conflict surfaces");

    assert!(matches!(error, ServiceError::Store(StoreError::Conflict(_))));
}

#[test]
fn score_applies_operator_overrides() {
    let application = baseline_application();
    let id = application.application_id.clone().expect("fixture id");
    let service = service_with_store(MemoryStore::seeded(application));

    let baseline = service
        .score(&id, ScoreOverrides::default())
        .expect("scores without overrides");
    let overridden = service
        .score(
            &id,
            ScoreOverrides {
                credit_band: Some("excellent".to_string()),
                utilization_pct: Some(10.0),
                impact_level: Some(4),
            },
        )
        .expect("scores with overrides");

    assert_eq!(baseline.result.subscores.credit_util, 3.0);
    assert_eq!(overridden.result.subscores.credit_util, 4.0);
    assert_eq!(overridden.result.subscores.community_impact, 4.0);
    assert!(overridden.result.score_pct > baseline.result.score_pct);
    assert_eq!(overridden.application.impact_level, Some(4));

    let stored = service.get(&id).expect("still stored");
    assert_eq!(stored.impact_level, Some(2), "overrides are not persisted");
}

#[test]
fn utilization_override_alone_keeps_application_band() {
    let application = baseline_application();
    let id = application.application_id.clone().expect("fixture id");
    let service = service_with_store(MemoryStore::seeded(application));

    let scored = service
        .score(
            &id,
            ScoreOverrides {
                utilization_pct: Some(65.0),
                ..ScoreOverrides::default()
            },
        )
        .expect("scores");

    assert_eq!(scored.result.subscores.credit_util, 2.0);
    assert_eq!(scored.result.decision, UnderwritingDecision::ManualReview);
}

#[test]
fn score_reports_missing_applications() {
    let (service, _) = build_service();

    let error = service
        .score(
            &ApplicationId("app-missing".to_string()),
            ScoreOverrides::default(),
        )
        .expect_err("missing application");

    assert!(matches!(error, ServiceError::Store(StoreError::NotFound(_))));
}

#[test]
fn list_propagates_store_failures() {
    let service = service_with_store(UnavailableStore);
    assert!(matches!(
        service.list(),
        Err(ServiceError::Store(StoreError::Io(_)))
    ));
}
