//! Optional incident-image uploads, saved under a local directory.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::StoreError;

/// Saves uploaded incident images to the local filesystem.
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Where images land.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save image bytes under `file_name`, returning the full path.
    ///
    /// File names must be plain names — anything with path separators or
    /// parent components is rejected.
    pub async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, StoreError> {
        validate_file_name(file_name)?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(file_name);
        tokio::fs::write(&path, bytes).await?;

        info!(file = %path.display(), size = bytes.len(), "Image saved");
        Ok(path)
    }

    /// Remove a previously saved image. A missing file is not an error.
    pub async fn remove(&self, file_name: &str) -> Result<(), StoreError> {
        validate_file_name(file_name)?;
        match tokio::fs::remove_file(self.dir.join(file_name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn validate_file_name(file_name: &str) -> Result<(), StoreError> {
    let bad = file_name.is_empty()
        || file_name == "."
        || file_name == ".."
        || file_name.contains('/')
        || file_name.contains('\\')
        || file_name.contains('\0');
    if bad {
        return Err(StoreError::InvalidFileName(file_name.to_string()));
    }
    Ok(())
}
