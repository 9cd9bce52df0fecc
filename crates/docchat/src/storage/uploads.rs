//! Raw copies of uploaded files on the local filesystem

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Directory receiving uploaded files under their original names.
///
/// A second upload with the same name overwrites the first.
#[derive(Debug, Clone)]
pub struct UploadDir {
    root: PathBuf,
}

impl UploadDir {
    /// Use `root`, creating it if needed
    pub fn new<P: Into<PathBuf>>(root: P) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `data` as `filename`, returning the path written
    pub async fn save(&self, filename: &str, data: &[u8]) -> Result<PathBuf> {
        let path = self.path_for(filename)?;
        tokio::fs::write(&path, data).await?;
        tracing::info!("Saved upload to {} ({} bytes)", path.display(), data.len());
        Ok(path)
    }

    /// Only the final path component of a client-supplied name is used
    fn path_for(&self, filename: &str) -> Result<PathBuf> {
        let name = Path::new(filename)
            .file_name()
            .ok_or_else(|| Error::Internal(format!("Invalid upload filename: {:?}", filename)))?;
        Ok(self.root.join(name))
    }
}
