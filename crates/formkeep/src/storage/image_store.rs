//! Captured image persistence over a [`FileStore`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use futures::future::join_all;
use tracing::{debug, error, info, warn};

use super::{FileInfo, FileStore};
use crate::camera::CapturedImage;
use crate::error::{Error, Result};

/// Copies captures into one application-owned directory.
#[derive(Debug)]
pub struct ImageStore<F> {
    files: F,
    directory: PathBuf,
}

impl<F: FileStore> ImageStore<F> {
    /// Create a store keeping images under `directory`.
    pub fn new(files: F, directory: impl Into<PathBuf>) -> Self {
        Self {
            files,
            directory: directory.into(),
        }
    }

    /// The image directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// The underlying file store.
    pub fn inner(&self) -> &F {
        &self.files
    }

    /// Create the image directory if needed. Failures are only logged.
    pub async fn ensure_directory(&self) {
        if let Err(e) = self.files.create_dir_all(&self.directory).await {
            warn!(dir = %self.directory.display(), error = %e, "Failed to create image directory");
        }
    }

    /// Copy `temporary` into the directory as `name`.
    ///
    /// The source file is left in place. A source that already is the
    /// stored file is not copied onto itself.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileWrite`] if the copy fails.
    pub async fn save_image(&self, temporary: &Path, name: &str) -> Result<PathBuf> {
        self.ensure_directory().await;
        let target = self.directory.join(name);
        if self.is_same_file(temporary, &target).await {
            debug!(path = %target.display(), "Image already stored");
            return Ok(target);
        }
        self.files.copy(temporary, &target).await.map_err(|e| {
            error!(from = %temporary.display(), to = %target.display(), error = %e, "Failed to save image");
            e
        })?;
        debug!(path = %target.display(), "Saved image");
        Ok(target)
    }

    /// Save every image concurrently, returning copies with stored paths.
    ///
    /// Either every image is saved and the full list returned, or an error
    /// is returned and no list at all. Copies that completed before a
    /// failure stay in the directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileWrite`] if two images share a name, in which
    /// case nothing is copied, or the first failure among the copies.
    pub async fn save_images(&self, images: &[CapturedImage]) -> Result<Vec<CapturedImage>> {
        let mut names = HashSet::with_capacity(images.len());
        if let Some(dup) = images.iter().find(|image| !names.insert(image.name.as_str())) {
            let target = self.directory.join(&dup.name);
            error!(path = %target.display(), "Duplicate image name in batch");
            return Err(Error::file_write(target, "duplicate image name in batch"));
        }

        let results = join_all(images.iter().map(|image| async move {
            self.save_image(&image.uri, &image.name)
                .await
                .map(|stored| image.with_uri(stored))
        }))
        .await;

        let saved = results.into_iter().collect::<Result<Vec<_>>>()?;
        info!(count = saved.len(), "Saved images");
        Ok(saved)
    }

    /// Delete the file at `path` if it exists. Failures are only logged.
    pub async fn delete_image(&self, path: &Path) {
        match self.files.exists(path).await {
            Ok(true) => {
                if let Err(e) = self.files.remove(path).await {
                    warn!(path = %path.display(), error = %e, "Failed to delete image");
                } else {
                    debug!(path = %path.display(), "Deleted image");
                }
            }
            Ok(false) => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to check image"),
        }
    }

    /// Paths of every saved image; empty on failure.
    ///
    /// Subdirectories are not images and are left out.
    pub async fn list_saved_images(&self) -> Vec<PathBuf> {
        match self.saved_files().await {
            Ok(files) => files.into_iter().map(|(path, _)| path).collect(),
            Err(e) => {
                warn!(dir = %self.directory.display(), error = %e, "Failed to list images");
                Vec::new()
            }
        }
    }

    /// Delete every saved image, returning how many were removed.
    ///
    /// A failed deletion is logged and does not stop the others.
    pub async fn clear_all_images(&self) -> usize {
        let paths = self.list_saved_images().await;
        let results = join_all(paths.iter().map(|path| self.files.remove(path))).await;

        let mut removed = 0;
        for (path, result) in paths.iter().zip(results) {
            match result {
                Ok(()) => removed += 1,
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to delete image"),
            }
        }
        info!(removed, total = paths.len(), "Cleared images");
        removed
    }

    /// Total bytes used by saved images; 0 on failure.
    pub async fn total_storage_size(&self) -> u64 {
        match self.saved_files().await {
            Ok(files) => files.iter().map(|(_, info)| info.size.unwrap_or(0)).sum(),
            Err(e) => {
                warn!(dir = %self.directory.display(), error = %e, "Failed to size images");
                0
            }
        }
    }

    async fn saved_files(&self) -> Result<Vec<(PathBuf, FileInfo)>> {
        let names = self.files.list(&self.directory).await?;
        let mut files = Vec::with_capacity(names.len());
        for name in names {
            let path = self.directory.join(name);
            let info = self.files.stat(&path).await?;
            if !info.is_dir {
                files.push((path, info));
            }
        }
        Ok(files)
    }

    async fn is_same_file(&self, source: &Path, target: &Path) -> bool {
        if source == target {
            return true;
        }
        match (
            self.files.canonicalize(source).await,
            self.files.canonicalize(target).await,
        ) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::local::LocalFileStore;
    use crate::storage::memory::MemoryFileStore;

    const DIR: &str = "/app/images";

    fn create_test_store() -> ImageStore<MemoryFileStore> {
        ImageStore::new(MemoryFileStore::new(), DIR)
    }

    fn capture(store: &ImageStore<MemoryFileStore>, name: &str, bytes: usize) -> CapturedImage {
        let uri = PathBuf::from(format!("/tmp/cam/{name}"));
        store.inner().insert_file(&uri, vec![7u8; bytes]);
        CapturedImage {
            name: name.to_string(),
            ..CapturedImage::new(uri, bytes as u64, None, None)
        }
    }

    fn named(name: &str, uri: impl Into<PathBuf>) -> CapturedImage {
        CapturedImage {
            name: name.to_string(),
            ..CapturedImage::new(uri, 0, None, None)
        }
    }

    #[tokio::test]
    async fn test_ensure_directory_is_idempotent() {
        let store = create_test_store();
        store.ensure_directory().await;
        store.ensure_directory().await;
        assert!(store.inner().has_dir(Path::new(DIR)));
    }

    #[tokio::test]
    async fn test_ensure_directory_swallows_failure() {
        let store = create_test_store();
        store.inner().set_fail_create_dir(true);
        store.ensure_directory().await;
        assert!(!store.inner().has_dir(Path::new(DIR)));
    }

    #[tokio::test]
    async fn test_save_image_copies_and_keeps_source() {
        let store = create_test_store();
        let img = capture(&store, "a.jpg", 3);

        let stored = store.save_image(&img.uri, &img.name).await.unwrap();

        assert_eq!(stored, PathBuf::from("/app/images/a.jpg"));
        assert_eq!(store.inner().read(&stored), Some(vec![7u8; 3]));
        assert!(store.inner().read(&img.uri).is_some());
    }

    #[tokio::test]
    async fn test_save_image_failure() {
        let store = create_test_store();
        let img = capture(&store, "a.jpg", 3);
        store.inner().fail_copy_to("/app/images/a.jpg");

        let err = store.save_image(&img.uri, &img.name).await.unwrap_err();
        assert!(matches!(err, Error::FileWrite { .. }));
    }

    #[tokio::test]
    async fn test_save_images_substitutes_paths() {
        let store = create_test_store();
        let images = vec![capture(&store, "a.jpg", 1), capture(&store, "b.jpg", 2)];

        let saved = store.save_images(&images).await.unwrap();

        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].uri, PathBuf::from("/app/images/a.jpg"));
        assert_eq!(saved[1].uri, PathBuf::from("/app/images/b.jpg"));
        assert_eq!(saved[1].size, images[1].size);
    }

    #[tokio::test]
    async fn test_save_images_is_all_or_nothing() {
        let store = create_test_store();
        let images = vec![
            capture(&store, "a.jpg", 1),
            capture(&store, "b.jpg", 1),
            capture(&store, "c.jpg", 1),
        ];
        store.inner().fail_copy_to("/app/images/b.jpg");

        let result = store.save_images(&images).await;

        // No partial list comes back
        let Err(err) = result else {
            panic!("expected batch failure, got {result:?}");
        };
        assert!(matches!(err, Error::FileWrite { .. }));

        // Completed copies are left in place and the sources untouched
        assert_eq!(
            store.list_saved_images().await,
            vec![
                PathBuf::from("/app/images/a.jpg"),
                PathBuf::from("/app/images/c.jpg")
            ]
        );
        for image in &images {
            assert!(store.inner().read(&image.uri).is_some());
        }
    }

    #[tokio::test]
    async fn test_save_images_rejects_duplicate_names() {
        let store = create_test_store();
        store.inner().insert_file("/tmp/x/p.jpg", b"first".to_vec());
        store.inner().insert_file("/tmp/y/p.jpg", b"second".to_vec());
        let images = vec![
            named("p.jpg", "/tmp/x/p.jpg"),
            named("p.jpg", "/tmp/y/p.jpg"),
        ];

        let err = store.save_images(&images).await.unwrap_err();

        assert!(matches!(err, Error::FileWrite { .. }));
        assert!(err.to_string().contains("duplicate"));
        assert!(store.list_saved_images().await.is_empty());
    }

    #[tokio::test]
    async fn test_resave_of_stored_image_keeps_contents() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("shot.jpg");
        std::fs::write(&source, b"jpegdata").unwrap();
        let store = ImageStore::new(LocalFileStore::new(), dir.path().join("images"));

        let stored = store.save_image(&source, "shot.jpg").await.unwrap();
        let again = store.save_image(&stored, "shot.jpg").await.unwrap();

        assert_eq!(again, stored);
        assert_eq!(std::fs::read(&stored).unwrap(), b"jpegdata");
    }

    #[tokio::test]
    async fn test_resave_through_parent_segment_keeps_contents() {
        let dir = tempfile::tempdir().unwrap();
        let images_dir = dir.path().join("images");
        std::fs::create_dir_all(&images_dir).unwrap();
        std::fs::write(images_dir.join("shot.jpg"), b"jpegdata").unwrap();
        let store = ImageStore::new(LocalFileStore::new(), &images_dir);

        let indirect = images_dir.join("..").join("images").join("shot.jpg");
        let saved = store
            .save_images(&[named("shot.jpg", indirect)])
            .await
            .unwrap();

        assert_eq!(saved[0].uri, images_dir.join("shot.jpg"));
        assert_eq!(std::fs::read(&saved[0].uri).unwrap(), b"jpegdata");
    }

    #[tokio::test]
    async fn test_delete_image() {
        let store = create_test_store();
        store.inner().insert_file("/app/images/a.jpg", b"x".to_vec());

        store.delete_image(Path::new("/app/images/a.jpg")).await;
        assert!(store.list_saved_images().await.is_empty());

        // Absent file is a no-op
        store.delete_image(Path::new("/app/images/a.jpg")).await;
        assert_eq!(store.inner().remove_attempts().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_image_swallows_failure() {
        let store = create_test_store();
        store.inner().insert_file("/app/images/a.jpg", b"x".to_vec());
        store.inner().fail_remove_of("/app/images/a.jpg");

        store.delete_image(Path::new("/app/images/a.jpg")).await;
        assert_eq!(store.list_saved_images().await.len(), 1);
    }

    #[tokio::test]
    async fn test_list_saved_images() {
        let store = create_test_store();
        store.inner().insert_file("/app/images/b.jpg", b"x".to_vec());
        store.inner().insert_file("/app/images/a.jpg", b"x".to_vec());
        store.inner().insert_file("/elsewhere/c.jpg", b"x".to_vec());

        assert_eq!(
            store.list_saved_images().await,
            vec![
                PathBuf::from("/app/images/a.jpg"),
                PathBuf::from("/app/images/b.jpg")
            ]
        );
    }

    #[tokio::test]
    async fn test_list_saved_images_failure_is_empty() {
        let store = create_test_store();
        assert!(store.list_saved_images().await.is_empty());

        store.inner().insert_file("/app/images/a.jpg", b"x".to_vec());
        store.inner().set_fail_list(true);
        assert!(store.list_saved_images().await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_all_images_continues_past_failure() {
        let store = create_test_store();
        for name in ["a.jpg", "b.jpg", "c.jpg", "d.jpg"] {
            store
                .inner()
                .insert_file(format!("/app/images/{name}"), b"x".to_vec());
        }
        store.inner().fail_remove_of("/app/images/b.jpg");

        let removed = store.clear_all_images().await;

        assert_eq!(removed, 3);
        assert_eq!(store.inner().remove_attempts().len(), 4);
        assert_eq!(
            store.list_saved_images().await,
            vec![PathBuf::from("/app/images/b.jpg")]
        );
    }

    #[tokio::test]
    async fn test_total_storage_size() {
        let store = create_test_store();
        assert_eq!(store.total_storage_size().await, 0);

        store.inner().insert_file("/app/images/a.jpg", vec![0u8; 100]);
        store.inner().insert_file("/app/images/b.jpg", vec![0u8; 50]);
        store.inner().insert_file("/app/images/c.jpg", vec![0u8; 25]);
        store.inner().hide_size_of("/app/images/c.jpg");

        assert_eq!(store.total_storage_size().await, 150);

        store.inner().set_fail_list(true);
        assert_eq!(store.total_storage_size().await, 0);
    }

    #[tokio::test]
    async fn test_subdirectories_are_not_images() {
        let store = create_test_store();
        store.inner().insert_file("/app/images/a.jpg", vec![0u8; 5]);
        store.inner().insert_file("/app/images/sub/nested.jpg", vec![0u8; 40]);

        assert_eq!(
            store.list_saved_images().await,
            vec![PathBuf::from("/app/images/a.jpg")]
        );
        assert_eq!(store.total_storage_size().await, 5);
        assert_eq!(store.clear_all_images().await, 1);
        assert_eq!(store.inner().remove_attempts().len(), 1);
    }

    #[tokio::test]
    async fn test_subdirectories_skipped_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"12345").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let store = ImageStore::new(LocalFileStore::new(), dir.path());

        assert_eq!(store.list_saved_images().await, vec![dir.path().join("a.jpg")]);
        assert_eq!(store.total_storage_size().await, 5);
    }
}
