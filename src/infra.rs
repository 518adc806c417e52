use metrics_exporter_prometheus::PrometheusHandle;
use serde::de::DeserializeOwned;
use smb_underwriter::error::AppError;
use smb_underwriter::underwriting::{
    JsonFileStore, MockCreditBureau, UnderwritingEngine, UnderwritingService,
};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type FileBackedService = UnderwritingService<JsonFileStore, MockCreditBureau>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn file_backed_service(data_dir: &Path) -> FileBackedService {
    UnderwritingService::new(
        Arc::new(JsonFileStore::new(data_dir)),
        Arc::new(MockCreditBureau),
        UnderwritingEngine::default(),
    )
}

pub(crate) fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
