use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::underwriting::bureau::MockCreditBureau;
use crate::underwriting::domain::{
    ApplicantContact, ApplicationId, BusinessReference, Consents, LoanApplication, SoftPullRecord,
};
use crate::underwriting::engine::UnderwritingEngine;
use crate::underwriting::intake::IntakeSubmission;
use crate::underwriting::repository::{ApplicationStore, StoreError};
use crate::underwriting::service::UnderwritingService;

/// Revenue 10k, expenses 4k, 50k requested without collateral, three years in business.
pub(super) fn baseline_application() -> LoanApplication {
    LoanApplication {
        application_id: Some(ApplicationId("app-20250401120000".to_string())),
        business_name: Some("Northside Logistics".to_string()),
        monthly_revenue: Some(10_000.0),
        monthly_expenses: Some(4_000.0),
        loan_amount_requested: Some(50_000.0),
        collateral_value: Some(0.0),
        years_in_business: Some(3.0),
        impact_level: Some(2),
        credit_score_band: Some("700-719".to_string()),
        consents: Consents {
            soft_pull_consent: true,
        },
        ..LoanApplication::default()
    }
}

pub(super) fn baseline_soft_pull() -> SoftPullRecord {
    SoftPullRecord::approved(Some("700-719".to_string()), Some(35.0))
}

pub(super) fn submission() -> IntakeSubmission {
    IntakeSubmission {
        applicant: ApplicantContact {
            first_name: "Jordan".to_string(),
            last_name: "Blake".to_string(),
            email: "jordan@northside.example".to_string(),
            phone: "555-0142".to_string(),
            address: "88 Elm Ave".to_string(),
        },
        business_name: "Northside Logistics".to_string(),
        business_type: "Logistics & Transportation".to_string(),
        entity_type: "LLC".to_string(),
        years_in_business: 3.0,
        loan_amount_requested: 50_000.0,
        loan_term_months: Some(12),
        loan_purpose: "Working capital".to_string(),
        monthly_revenue: 10_000.0,
        monthly_expenses: 4_000.0,
        collateral_type: "None".to_string(),
        credit_score_band: "700-719".to_string(),
        utilization_pct: Some(35.0),
        impact_level: Some(2),
        consents: Consents {
            soft_pull_consent: true,
        },
        references: vec![BusinessReference {
            name: "Riley Chen".to_string(),
            relationship: "Customer".to_string(),
            phone: "555-0199".to_string(),
        }],
        attest_true: true,
        attest_authorized: true,
        ..IntakeSubmission::default()
    }
}

pub(super) fn build_service() -> (
    UnderwritingService<MemoryStore, MockCreditBureau>,
    Arc<MemoryStore>,
) {
    let store = Arc::new(MemoryStore::default());
    let service = UnderwritingService::new(
        store.clone(),
        Arc::new(MockCreditBureau),
        UnderwritingEngine::default(),
    );
    (service, store)
}

pub(super) fn service_with_store<S: ApplicationStore + 'static>(
    store: S,
) -> UnderwritingService<S, MockCreditBureau> {
    UnderwritingService::new(
        Arc::new(store),
        Arc::new(MockCreditBureau),
        UnderwritingEngine::default(),
    )
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    pub(super) records: Arc<Mutex<BTreeMap<ApplicationId, LoanApplication>>>,
}

impl MemoryStore {
    pub(super) fn seeded(application: LoanApplication) -> Self {
        let store = Self::default();
        let id = application
            .application_id
            .clone()
            .expect("seeded application has an id");
        store
            .records
            .lock()
            .expect("store mutex poisoned")
            .insert(id, application);
        store
    }
}

impl ApplicationStore for MemoryStore {
    fn insert(&self, id: &ApplicationId, application: &LoanApplication) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        if guard.contains_key(id) {
            return Err(StoreError::Conflict(id.clone()));
        }
        guard.insert(id.clone(), application.clone());
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<LoanApplication>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<ApplicationId>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.keys().cloned().collect())
    }
}

pub(super) struct ConflictStore;

impl ApplicationStore for ConflictStore {
    fn insert(&self, id: &ApplicationId, _application: &LoanApplication) -> Result<(), StoreError> {
        Err(StoreError::Conflict(id.clone()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<LoanApplication>, StoreError> {
        Ok(None)
    }

    fn list(&self) -> Result<Vec<ApplicationId>, StoreError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableStore;

impl ApplicationStore for UnavailableStore {
    fn insert(&self, _id: &ApplicationId, _application: &LoanApplication) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::other("disk offline")))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<LoanApplication>, StoreError> {
        Err(StoreError::Io(std::io::Error::other("disk offline")))
    }

    fn list(&self) -> Result<Vec<ApplicationId>, StoreError> {
        Err(StoreError::Io(std::io::Error::other("disk offline")))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
