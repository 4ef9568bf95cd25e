//! Local file system provider.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::trace;

use super::{FileInfo, FileStore};
use crate::error::{Error, Result};

/// [`FileStore`] over the local file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileStore;

impl LocalFileStore {
    /// Create a new provider.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn create_dir_all(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)
            .await
            .map_err(|source| Error::DirectoryCreate {
                path: dir.to_path_buf(),
                source,
            })
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        fs::try_exists(path)
            .await
            .map_err(|e| Error::file_read(path, e.to_string()))
    }

    async fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        let bytes = fs::copy(from, to)
            .await
            .map_err(|e| Error::file_write(to, e.to_string()))?;
        trace!(from = %from.display(), to = %to.display(), bytes, "Copied file");
        Ok(())
    }

    async fn remove(&self, path: &Path) -> Result<()> {
        fs::remove_file(path)
            .await
            .map_err(|e| Error::file_write(path, e.to_string()))
    }

    async fn list(&self, dir: &Path) -> Result<Vec<String>> {
        let mut entries = fs::read_dir(dir)
            .await
            .map_err(|e| Error::file_read(dir, e.to_string()))?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::file_read(dir, e.to_string()))?
        {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        let meta = fs::metadata(path)
            .await
            .map_err(|e| Error::file_read(path, e.to_string()))?;
        Ok(FileInfo {
            size: Some(meta.len()),
            is_dir: meta.is_dir(),
        })
    }

    async fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        fs::canonicalize(path)
            .await
            .map_err(|e| Error::file_read(path, e.to_string()))
    }
}
