//! Configuration for the docchat server

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Main configuration, passed explicitly to every component
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocchatConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// On-disk locations for the document table and raw uploads
    pub storage: StorageConfig,
    /// Model runner configuration
    pub llm: LlmConfig,
}

impl DocchatConfig {
    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(format!("Invalid configuration: {}", e)))
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Maximum upload size in bytes (default: 100MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            // The bundled frontend posts to http://127.0.0.1:5000
            host: "127.0.0.1".to_string(),
            port: 5000,
            max_upload_size: 100 * 1024 * 1024, // 100MB
        }
    }
}

/// Storage locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file holding the `user_document` table
    pub database_path: PathBuf,
    /// Directory receiving raw uploaded files
    pub upload_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("documents.db"),
            upload_dir: PathBuf::from("uploaded_docs"),
        }
    }
}

/// Model runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Executable to spawn for every question
    pub command: String,
    /// Model identifier passed as `run <model>`
    pub model: String,
    /// Hard limit on a single invocation, in seconds
    pub timeout_secs: u64,
}

impl LlmConfig {
    /// Arguments handed to the runner executable
    pub fn args(&self) -> Vec<String> {
        vec!["run".to_string(), self.model.clone()]
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            command: "ollama".to_string(),
            model: "gemma:2b".to_string(),
            timeout_secs: 120,
        }
    }
}
