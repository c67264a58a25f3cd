use crate::domain::ports::Storage;
use crate::utils::error::{LeadError, Result};
use std::path::{Path, PathBuf};

/// Filesystem storage. Relative paths resolve against `base_path`; absolute paths are used as given.
#[derive(Debug, Clone, Default)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        Path::new(&self.base_path).join(path)
    }
}

/// Sibling file the output is staged in before the rename.
fn staging_path(target: &Path) -> Option<PathBuf> {
    let file_name = target.file_name()?.to_str()?;
    Some(target.with_file_name(format!(".{}.partial", file_name)))
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.resolve(path);
        tokio::fs::read(&full_path)
            .await
            .map_err(|source| LeadError::FileReadError {
                path: full_path.display().to_string(),
                source,
            })
    }

    /// Writes `data` to a staging file next to the target and renames it into place,
    /// so a failed run never leaves a truncated output behind.
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);
        let target = full_path.display().to_string();
        let write_err = |source| LeadError::FileWriteError {
            path: target.clone(),
            source,
        };

        if let Some(parent) = full_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
            }
        }

        let staging = staging_path(&full_path).ok_or_else(|| LeadError::InvalidConfigValueError {
            field: "output".to_string(),
            value: target.clone(),
            reason: "Output path must name a file".to_string(),
        })?;

        tokio::fs::write(&staging, data).await.map_err(write_err)?;
        if let Err(source) = tokio::fs::rename(&staging, &full_path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(write_err(source));
        }

        tracing::debug!("Wrote {} bytes to {}", data.len(), target);
        Ok(())
    }
}
