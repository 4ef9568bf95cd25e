//! In-memory storage providers.
//!
//! Both stores support failure injection so callers' degradation and
//! propagation rules can be exercised without a real disk.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{FileInfo, FileStore, KeyValueStore};
use crate::error::{Error, Result};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicked test thread must not cascade into unrelated assertions
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// In-memory [`KeyValueStore`].
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    values: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    failing_write_keys: Mutex<HashSet<String>>,
}

impl MemoryKeyValueStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every read fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every write and removal fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make writes and removals of one key fail.
    pub fn fail_writes_for(&self, key: &str) {
        lock(&self.failing_write_keys).insert(key.to_string());
    }

    /// Read a value without going through the async interface.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<String> {
        lock(&self.values).get(key).cloned()
    }

    /// Store a value without going through the async interface.
    pub fn insert_raw(&self, key: &str, value: &str) {
        lock(&self.values).insert(key.to_string(), value.to_string());
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.values).len()
    }

    /// Check whether the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_write(&self, key: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) || lock(&self.failing_write_keys).contains(key)
        {
            return Err(Error::storage_write(key, "simulated write failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::storage_read(key, "simulated read failure"));
        }
        Ok(self.peek(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check_write(key)?;
        self.insert_raw(key, value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.check_write(key)?;
        lock(&self.values).remove(key);
        Ok(())
    }

    async fn multi_remove(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            self.check_write(key)?;
        }
        let mut values = lock(&self.values);
        for key in keys {
            values.remove(*key);
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct FileTree {
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: HashSet<PathBuf>,
    sizeless: HashSet<PathBuf>,
    failing_copies: HashSet<PathBuf>,
    failing_removes: HashSet<PathBuf>,
    remove_attempts: Vec<PathBuf>,
    fail_list: bool,
    fail_create_dir: bool,
}

/// In-memory [`FileStore`].
#[derive(Debug, Default)]
pub struct MemoryFileStore {
    tree: Mutex<FileTree>,
}

impl MemoryFileStore {
    /// Create an empty file tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a file at `path`, creating its parent directories.
    pub fn insert_file(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        let path = path.into();
        let mut tree = lock(&self.tree);
        let mut parent = path.parent();
        while let Some(dir) = parent {
            if dir.as_os_str().is_empty() {
                break;
            }
            tree.dirs.insert(dir.to_path_buf());
            parent = dir.parent();
        }
        tree.files.insert(path, contents.into());
    }

    /// Contents of the file at `path`.
    #[must_use]
    pub fn read(&self, path: &Path) -> Option<Vec<u8>> {
        lock(&self.tree).files.get(path).cloned()
    }

    /// Check whether `dir` has been created.
    #[must_use]
    pub fn has_dir(&self, dir: &Path) -> bool {
        lock(&self.tree).dirs.contains(dir)
    }

    /// Make copies whose destination is `path` fail.
    pub fn fail_copy_to(&self, path: impl Into<PathBuf>) {
        lock(&self.tree).failing_copies.insert(path.into());
    }

    /// Make deleting `path` fail.
    pub fn fail_remove_of(&self, path: impl Into<PathBuf>) {
        lock(&self.tree).failing_removes.insert(path.into());
    }

    /// Make directory listings fail.
    pub fn set_fail_list(&self, fail: bool) {
        lock(&self.tree).fail_list = fail;
    }

    /// Make directory creation fail.
    pub fn set_fail_create_dir(&self, fail: bool) {
        lock(&self.tree).fail_create_dir = fail;
    }

    /// Report no size for `path` when it is stat'ed.
    pub fn hide_size_of(&self, path: impl Into<PathBuf>) {
        lock(&self.tree).sizeless.insert(path.into());
    }

    /// Every path a removal was attempted on, in call order.
    #[must_use]
    pub fn remove_attempts(&self) -> Vec<PathBuf> {
        lock(&self.tree).remove_attempts.clone()
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn create_dir_all(&self, dir: &Path) -> Result<()> {
        let mut tree = lock(&self.tree);
        if tree.fail_create_dir {
            return Err(Error::file_write(dir, "simulated mkdir failure"));
        }
        let mut current = Some(dir);
        while let Some(d) = current {
            if d.as_os_str().is_empty() {
                break;
            }
            tree.dirs.insert(d.to_path_buf());
            current = d.parent();
        }
        Ok(())
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        let tree = lock(&self.tree);
        Ok(tree.files.contains_key(path) || tree.dirs.contains(path))
    }

    async fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        let mut tree = lock(&self.tree);
        if tree.failing_copies.contains(to) {
            return Err(Error::file_write(to, "simulated copy failure"));
        }
        let contents = tree
            .files
            .get(from)
            .cloned()
            .ok_or_else(|| Error::file_read(from, "no such file"))?;
        match to.parent() {
            Some(parent) if !tree.dirs.contains(parent) => {
                return Err(Error::file_write(to, "parent directory does not exist"));
            }
            _ => {}
        }
        tree.files.insert(to.to_path_buf(), contents);
        Ok(())
    }

    async fn remove(&self, path: &Path) -> Result<()> {
        let mut tree = lock(&self.tree);
        tree.remove_attempts.push(path.to_path_buf());
        if tree.failing_removes.contains(path) {
            return Err(Error::file_write(path, "simulated delete failure"));
        }
        if tree.files.remove(path).is_none() {
            return Err(Error::file_write(path, "no such file"));
        }
        Ok(())
    }

    async fn list(&self, dir: &Path) -> Result<Vec<String>> {
        let tree = lock(&self.tree);
        if tree.fail_list {
            return Err(Error::file_read(dir, "simulated list failure"));
        }
        if !tree.dirs.contains(dir) {
            return Err(Error::file_read(dir, "no such directory"));
        }
        let mut names: Vec<String> = tree
            .files
            .keys()
            .chain(tree.dirs.iter())
            .filter(|path| path.parent() == Some(dir))
            .filter_map(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect();
        names.sort();
        Ok(names)
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        let tree = lock(&self.tree);
        if tree.dirs.contains(path) {
            return Ok(FileInfo {
                size: None,
                is_dir: true,
            });
        }
        let contents = tree
            .files
            .get(path)
            .ok_or_else(|| Error::file_read(path, "no such file"))?;
        let size = if tree.sizeless.contains(path) {
            None
        } else {
            Some(contents.len() as u64)
        };
        Ok(FileInfo {
            size,
            is_dir: false,
        })
    }

    async fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        let tree = lock(&self.tree);
        if tree.files.contains_key(path) || tree.dirs.contains(path) {
            Ok(path.to_path_buf())
        } else {
            Err(Error::file_read(path, "no such file"))
        }
    }
}
