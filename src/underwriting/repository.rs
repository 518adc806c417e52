use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::domain::{ApplicationId, LoanApplication};

/// Storage abstraction so the service module can be exercised in isolation.
pub trait ApplicationStore: Send + Sync {
    fn insert(&self, id: &ApplicationId, application: &LoanApplication) -> Result<(), StoreError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<LoanApplication>, StoreError>;
    fn list(&self) -> Result<Vec<ApplicationId>, StoreError>;
}

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("application {0} already exists")]
    Conflict(ApplicationId),
    #[error("application {0} not found")]
    NotFound(ApplicationId),
    #[error("malformed application file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("storage unavailable: {0}")]
    Io(#[from] std::io::Error),
}

/// One pretty-printed JSON document per application under a data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, id: &ApplicationId) -> PathBuf {
        self.root.join(format!("{}.json", id.as_str()))
    }

    /// Load an arbitrary application file, e.g. one uploaded outside the data directory.
    pub fn load_path(path: impl AsRef<Path>) -> Result<LoanApplication, StoreError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|source| StoreError::Malformed {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl ApplicationStore for JsonFileStore {
    fn insert(&self, id: &ApplicationId, application: &LoanApplication) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_for(id);
        let payload = serde_json::to_string_pretty(application).map_err(|source| {
            StoreError::Malformed {
                path: path.clone(),
                source,
            }
        })?;

        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                return Err(StoreError::Conflict(id.clone()))
            }
            Err(err) => return Err(err.into()),
        };

        file.write_all(payload.as_bytes())?;
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<LoanApplication>, StoreError> {
        let path = self.path_for(id);
        match Self::load_path(&path) {
            Ok(application) => Ok(Some(application)),
            Err(StoreError::Io(err)) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(other) => Err(other),
        }
    }

    fn list(&self) -> Result<Vec<ApplicationId>, StoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                ids.push(ApplicationId(stem.to_string()));
            }
        }

        ids.sort();
        Ok(ids)
    }
}
