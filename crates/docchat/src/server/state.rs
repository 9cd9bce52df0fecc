//! Application state for the docchat server

use std::sync::Arc;

use crate::config::DocchatConfig;
use crate::error::Result;
use crate::providers::{Inferencer, ProcessInferencer};
use crate::storage::{DocumentDb, UploadDir};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: DocchatConfig,
    /// Extracted document text
    db: DocumentDb,
    /// Raw uploaded files
    uploads: UploadDir,
    /// Model used to answer questions
    inferencer: Arc<dyn Inferencer>,
}

impl AppState {
    /// Create state using the configured runner process
    pub fn new(config: DocchatConfig) -> Result<Self> {
        let inferencer = Arc::new(ProcessInferencer::new(&config.llm));
        Self::with_inferencer(config, inferencer)
    }

    /// Create state with an explicit inferencer
    pub fn with_inferencer(config: DocchatConfig, inferencer: Arc<dyn Inferencer>) -> Result<Self> {
        tracing::info!("Initializing docchat state...");

        let db = DocumentDb::new(&config.storage.database_path)?;
        let uploads = UploadDir::new(&config.storage.upload_dir)?;
        tracing::info!("Upload directory: {}", uploads.root().display());
        tracing::info!(
            "Inferencer: {} (model {})",
            inferencer.name(),
            inferencer.model()
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                db,
                uploads,
                inferencer,
            }),
        })
    }

    /// Get configuration
    pub fn config(&self) -> &DocchatConfig {
        &self.inner.config
    }

    /// Get the document store
    pub fn db(&self) -> &DocumentDb {
        &self.inner.db
    }

    /// Get the upload directory
    pub fn uploads(&self) -> &UploadDir {
        &self.inner.uploads
    }

    /// Get the inferencer
    pub fn inferencer(&self) -> &dyn Inferencer {
        self.inner.inferencer.as_ref()
    }

    /// Ready once the document store answers queries
    pub fn is_ready(&self) -> bool {
        match self.inner.db.count() {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Readiness check failed: {}", e);
                false
            }
        }
    }
}
