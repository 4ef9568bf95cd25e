//! Storage layer for formkeep.
//!
//! The two platform collaborators are traits so they can be swapped out:
//!
//! - [`KeyValueStore`]: durable string values by key. Backed by `SQLite` in
//!   [`sqlite::SqliteKeyValueStore`] and by a map in
//!   [`memory::MemoryKeyValueStore`].
//! - [`FileStore`]: durable files by path. Backed by the local file system in
//!   [`local::LocalFileStore`] and by a map in [`memory::MemoryFileStore`].
//!
//! [`FormDataStore`] and [`ImageStore`] hold the application's persistence
//! rules on top of them.

pub mod form_store;
pub mod image_store;
pub mod local;
pub mod memory;
pub mod schema;
pub mod sqlite;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::Result;

pub use form_store::{FormDataStore, FormStats, StoreKeys};
pub use image_store::ImageStore;

/// Durable string storage addressed by key.
///
/// Implementations report failures as [`crate::Error::StorageRead`] or
/// [`crate::Error::StorageWrite`].
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, `None` if unset.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key succeeds.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Remove several keys in one batch.
    async fn multi_remove(&self, keys: &[&str]) -> Result<()>;
}

/// Metadata about a stored file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileInfo {
    /// Size in bytes, when the provider reports one.
    pub size: Option<u64>,
    /// Whether the path is a directory.
    pub is_dir: bool,
}

/// Durable file storage addressed by path.
///
/// Implementations report failures as [`crate::Error::FileRead`] or
/// [`crate::Error::FileWrite`].
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Create `dir` and any missing parents.
    async fn create_dir_all(&self, dir: &Path) -> Result<()>;

    /// Check whether anything exists at `path`.
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Copy the file at `from` to `to`, overwriting `to`.
    async fn copy(&self, from: &Path, to: &Path) -> Result<()>;

    /// Delete the file at `path`.
    async fn remove(&self, path: &Path) -> Result<()>;

    /// Names of the entries directly under `dir`.
    async fn list(&self, dir: &Path) -> Result<Vec<String>>;

    /// Metadata for `path`.
    async fn stat(&self, path: &Path) -> Result<FileInfo>;

    /// Absolute form of an existing `path` with links resolved.
    async fn canonicalize(&self, path: &Path) -> Result<PathBuf>;
}
