use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::bureau::CreditBureau;
use super::domain::{
    lenient_impact_level, ApplicationId, DecisionRecord, LoanApplication, SoftPullRecord,
};
use super::engine::UnderwritingEngine;
use super::intake::{
    check_impact_level, check_utilization, IntakeGuard, IntakeSubmission, IntakeViolation,
};
use super::repository::{ApplicationStore, StoreError};

/// Operator overrides applied when rescoring a stored application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreOverrides {
    pub credit_band: Option<String>,
    pub utilization_pct: Option<f64>,
    #[serde(deserialize_with = "lenient_impact_level")]
    pub impact_level: Option<i64>,
}

impl ScoreOverrides {
    fn validate(&self) -> Result<(), IntakeViolation> {
        check_impact_level(self.impact_level)?;
        check_utilization(self.utilization_pct)
    }

    /// An explicit band or utilization stands in for the bureau lookup. The side left
    /// blank keeps what the applicant reported.
    fn soft_pull(&self, application: &LoanApplication) -> Option<SoftPullRecord> {
        if self.credit_band.is_none() && self.utilization_pct.is_none() {
            return None;
        }
        Some(SoftPullRecord::approved(
            self.credit_band
                .clone()
                .or_else(|| application.credit_score_band.clone()),
            self.utilization_pct.or(application.utilization_pct),
        ))
    }
}

/// Application paired with the decision computed for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredApplication {
    pub application_id: ApplicationId,
    pub application: LoanApplication,
    pub result: DecisionRecord,
}

/// Service composing intake validation, storage, the mock bureau, and the engine.
pub struct UnderwritingService<S, B> {
    guard: IntakeGuard,
    store: Arc<S>,
    bureau: Arc<B>,
    engine: Arc<UnderwritingEngine>,
}

impl<S, B> UnderwritingService<S, B>
where
    S: ApplicationStore + 'static,
    B: CreditBureau + 'static,
{
    pub fn new(store: Arc<S>, bureau: Arc<B>, engine: UnderwritingEngine) -> Self {
        Self {
            guard: IntakeGuard::new(),
            store,
            bureau,
            engine: Arc::new(engine),
        }
    }

    pub fn engine(&self) -> &UnderwritingEngine {
        &self.engine
    }

    /// Validate, persist, and score a new intake submission.
    pub fn submit(
        &self,
        submission: IntakeSubmission,
        channel: &str,
    ) -> Result<ScoredApplication, ServiceError> {
        let application = self
            .guard
            .application_from_submission(submission, channel, Utc::now())?;
        let application_id = application
            .application_id
            .clone()
            .ok_or(ServiceError::MissingIdentifier)?;

        self.store.insert(&application_id, &application)?;
        info!(application_id = %application_id, channel, "application stored");

        let soft_pull = self.bureau.soft_pull(&application);
        Ok(self.decide(application_id, application, soft_pull.as_ref()))
    }

    /// Rescore a stored application. Decisions are returned, never persisted.
    pub fn score(
        &self,
        application_id: &ApplicationId,
        overrides: ScoreOverrides,
    ) -> Result<ScoredApplication, ServiceError> {
        overrides.validate()?;
        let mut application = self.get(application_id)?;

        if let Some(level) = overrides.impact_level {
            application.impact_level = Some(level);
        }

        let soft_pull = match overrides.soft_pull(&application) {
            Some(pull) => Some(pull),
            None => self.bureau.soft_pull(&application),
        };

        Ok(self.decide(application_id.clone(), application, soft_pull.as_ref()))
    }

    pub fn get(&self, application_id: &ApplicationId) -> Result<LoanApplication, ServiceError> {
        let application = self
            .store
            .fetch(application_id)?
            .ok_or_else(|| StoreError::NotFound(application_id.clone()))?;
        Ok(application)
    }

    pub fn list(&self) -> Result<Vec<ApplicationId>, ServiceError> {
        Ok(self.store.list()?)
    }

    fn decide(
        &self,
        application_id: ApplicationId,
        application: LoanApplication,
        soft_pull: Option<&SoftPullRecord>,
    ) -> ScoredApplication {
        debug!(
            application_id = %application_id,
            soft_pull = soft_pull.is_some(),
            "scoring application"
        );
        let result = self.engine.score(&application, soft_pull);
        info!(
            application_id = %application_id,
            tier = %result.risk_tier,
            decision = %result.decision,
            apr = result.apr_estimate,
            score_pct = result.score_pct,
            "underwriting decision"
        );

        ScoredApplication {
            application_id,
            application,
            result,
        }
    }
}

/// Error raised by the underwriting service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeViolation),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("accepted application is missing its identifier")]
    MissingIdentifier,
}
