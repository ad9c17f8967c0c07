use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Reads and writes under a site root on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }
}

impl Storage for LocalStorage {
    async fn exists(&self, path: &str) -> bool {
        fs::try_exists(self.resolve(path)).await.unwrap_or(false)
    }

    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let data = fs::read(self.resolve(path)).await?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(full_path, data).await?;
        Ok(())
    }

    async fn create_dir(&self, path: &str) -> Result<()> {
        fs::create_dir_all(self.resolve(path)).await?;
        Ok(())
    }

    async fn remove_dir(&self, path: &str) -> Result<()> {
        match fs::remove_dir_all(self.resolve(path)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Answers existence and reads from the wrapped storage but never writes.
/// Every skipped mutation is logged at debug level.
#[derive(Debug, Clone)]
pub struct DryRunStorage<S: Storage> {
    inner: S,
}

impl<S: Storage> DryRunStorage<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S: Storage> Storage for DryRunStorage<S> {
    async fn exists(&self, path: &str) -> bool {
        self.inner.exists(path).await
    }

    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        self.inner.read_file(path).await
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        tracing::debug!("[dry run] would write {} bytes to {}", data.len(), path);
        Ok(())
    }

    async fn create_dir(&self, path: &str) -> Result<()> {
        tracing::debug!("[dry run] would create folder {}", path);
        Ok(())
    }

    async fn remove_dir(&self, path: &str) -> Result<()> {
        tracing::debug!("[dry run] would remove folder {}", path);
        Ok(())
    }
}
