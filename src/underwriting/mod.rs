//! Small-business loan underwriting: intake, storage, and the scoring engine.
//!
//! The engine is a pure function of an application record and an optional soft-pull
//! record. Everything else in this module (intake validation, the JSON store, the mock
//! bureau, the HTTP router, CSV batch scoring) feeds it or presents its output.

pub mod batch;
pub mod bureau;
pub mod domain;
pub mod engine;
pub mod intake;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use batch::{BatchError, BatchOutcome, BatchScorer};
pub use bureau::{CreditBureau, MockCreditBureau};
pub use domain::{
    ApplicantContact, ApplicationId, AprBreakdown, BusinessReference, ComplianceChecklist,
    Consents, DecisionRecord, LoanApplication, RiskTier, SoftPullRecord, SubmissionMetadata,
    Subscores, UnderwritingDecision,
};
pub use engine::{
    score_application, AprPolicy, ScoringWeights, UnderwritingConfig, UnderwritingEngine,
    TRANCHE_GUIDANCE,
};
pub use intake::{IntakeGuard, IntakeSubmission, IntakeViolation};
pub use repository::{ApplicationStore, JsonFileStore, StoreError};
pub use router::{underwriting_router, ScoreRequest};
pub use service::{ScoreOverrides, ScoredApplication, ServiceError, UnderwritingService};
