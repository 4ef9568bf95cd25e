//! Camera capture with preview and retake.
//!
//! A [`CameraSession`] holds at most one unconfirmed capture. Confirmed
//! photos accumulate in capture order until they are handed to the
//! [`crate::storage::ImageStore`].

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// MIME type assigned to captures.
pub const JPEG_MIME: &str = "image/jpeg";

/// A photo taken by the camera.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedImage {
    /// Unique file name.
    pub name: String,
    /// Temporary capture location, or the stored path once saved.
    pub uri: PathBuf,
    /// MIME type.
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Size in bytes.
    pub size: u64,
    /// Width in pixels, if known.
    pub width: Option<u32>,
    /// Height in pixels, if known.
    pub height: Option<u32>,
    /// When the photo was taken.
    pub captured_at: DateTime<Utc>,
}

impl CapturedImage {
    /// Record a capture at `uri`, named after the current time.
    #[must_use]
    pub fn new(uri: impl Into<PathBuf>, size: u64, width: Option<u32>, height: Option<u32>) -> Self {
        let captured_at = Utc::now();
        Self {
            name: capture_name(captured_at, CAPTURE_SEQ.fetch_add(1, Ordering::Relaxed)),
            uri: uri.into(),
            mime_type: JPEG_MIME.to_string(),
            size,
            width,
            height,
            captured_at,
        }
    }

    /// Record an existing file, keeping its file name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileRead`] if the file cannot be inspected or has no
    /// file name.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let meta = std::fs::metadata(path).map_err(|e| Error::file_read(path, e.to_string()))?;
        if !meta.is_file() {
            return Err(Error::file_read(path, "not a regular file"));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::file_read(path, "path has no file name"))?;

        Ok(Self {
            mime_type: mime_for(&name).to_string(),
            name,
            uri: path.to_path_buf(),
            size: meta.len(),
            width: None,
            height: None,
            captured_at: Utc::now(),
        })
    }

    /// Copy of this record pointing at `uri`.
    #[must_use]
    pub fn with_uri(&self, uri: impl Into<PathBuf>) -> Self {
        Self {
            uri: uri.into(),
            ..self.clone()
        }
    }
}

/// Captures within the same millisecond still get distinct names.
static CAPTURE_SEQ: AtomicU64 = AtomicU64::new(0);

fn capture_name(at: DateTime<Utc>, seq: u64) -> String {
    format!("photo_{}_{seq}.jpg", at.format("%Y%m%d_%H%M%S_%3f"))
}

fn mime_for(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("heic") => "image/heic",
        Some("webp") => "image/webp",
        _ => JPEG_MIME,
    }
}

/// Where a capture session is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraState {
    /// Camera not shown.
    Closed,
    /// Live viewfinder, ready to capture.
    Ready,
    /// Showing a capture awaiting confirm or retake.
    Previewing(CapturedImage),
}

/// Drives capture, preview, retake and confirm.
#[derive(Debug)]
pub struct CameraSession {
    state: CameraState,
    photos: Vec<CapturedImage>,
}

impl Default for CameraSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraSession {
    /// A closed session with no photos.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: CameraState::Closed,
            photos: Vec::new(),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &CameraState {
        &self.state
    }

    /// Confirmed photos in capture order.
    #[must_use]
    pub fn photos(&self) -> &[CapturedImage] {
        &self.photos
    }

    /// Show the viewfinder. Has no effect while previewing.
    pub fn open(&mut self) {
        if self.state == CameraState::Closed {
            self.state = CameraState::Ready;
        }
    }

    /// Hide the camera, discarding any unconfirmed capture.
    pub fn close(&mut self) -> Option<CapturedImage> {
        match std::mem::replace(&mut self.state, CameraState::Closed) {
            CameraState::Previewing(image) => Some(image),
            _ => None,
        }
    }

    /// Take a photo and preview it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] unless the viewfinder is ready.
    pub fn capture(&mut self, image: CapturedImage) -> Result<()> {
        if self.state != CameraState::Ready {
            return Err(Error::internal("camera is not ready to capture"));
        }
        debug!(name = %image.name, "Captured photo");
        self.state = CameraState::Previewing(image);
        Ok(())
    }

    /// Discard the previewed photo and return to the viewfinder.
    ///
    /// Returns the discarded capture so its temporary file can be removed.
    pub fn retake(&mut self) -> Option<CapturedImage> {
        match std::mem::replace(&mut self.state, CameraState::Ready) {
            CameraState::Previewing(image) => Some(image),
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Keep the previewed photo and close the camera.
    pub fn confirm(&mut self) -> Option<&CapturedImage> {
        match std::mem::replace(&mut self.state, CameraState::Closed) {
            CameraState::Previewing(image) => {
                debug!(name = %image.name, "Confirmed photo");
                self.photos.push(image);
                self.photos.last()
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Drop a confirmed photo by name.
    pub fn remove_photo(&mut self, name: &str) -> Option<CapturedImage> {
        let pos = self.photos.iter().position(|p| p.name == name)?;
        Some(self.photos.remove(pos))
    }

    /// Replace the confirmed photos, e.g. with their stored copies.
    pub fn set_photos(&mut self, photos: Vec<CapturedImage>) {
        self.photos = photos;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn image(name: &str) -> CapturedImage {
        CapturedImage {
            name: name.to_string(),
            ..CapturedImage::new(format!("/tmp/cam/{name}"), 1024, Some(640), Some(480))
        }
    }

    #[test]
    fn test_capture_name_format() {
        let at = Utc.with_ymd_and_hms(2026, 10, 18, 14, 5, 9).unwrap();
        assert_eq!(capture_name(at, 7), "photo_20261018_140509_000_7.jpg");
    }

    #[test]
    fn test_new_image_defaults() {
        let img = CapturedImage::new("/tmp/cam/1.jpg", 2048, None, None);
        assert!(img.name.starts_with("photo_"));
        assert!(img.name.ends_with(".jpg"));
        assert_eq!(img.mime_type, JPEG_MIME);
        assert_eq!(img.size, 2048);
    }

    #[test]
    fn test_back_to_back_captures_have_distinct_names() {
        let first = CapturedImage::new("/tmp/cam/1.jpg", 1, None, None);
        let second = CapturedImage::new("/tmp/cam/2.jpg", 1, None, None);
        assert_ne!(first.name, second.name);
    }

    #[test]
    fn test_image_json_shape() {
        let value = serde_json::to_value(image("a.jpg")).unwrap();
        assert_eq!(value["type"], "image/jpeg");
        assert_eq!(value["uri"], "/tmp/cam/a.jpg");
        assert!(value.get("capturedAt").is_some());
        assert!(value.get("mimeType").is_none());
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.PNG");
        std::fs::write(&path, b"12345").unwrap();

        let img = CapturedImage::from_path(&path).unwrap();
        assert_eq!(img.name, "shot.PNG");
        assert_eq!(img.mime_type, "image/png");
        assert_eq!(img.size, 5);
        assert_eq!(img.uri, path);
    }

    #[test]
    fn test_from_path_rejects_missing_and_dirs() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CapturedImage::from_path(dir.path().join("none.jpg"))
            .unwrap_err()
            .is_file_error());
        assert!(CapturedImage::from_path(dir.path()).is_err());
    }

    #[test]
    fn test_with_uri() {
        let img = image("a.jpg");
        let stored = img.with_uri("/data/images/a.jpg");
        assert_eq!(stored.uri, PathBuf::from("/data/images/a.jpg"));
        assert_eq!(stored.name, img.name);
    }

    #[test]
    fn test_capture_requires_ready() {
        let mut cam = CameraSession::new();
        assert!(cam.capture(image("a.jpg")).is_err());

        cam.open();
        cam.capture(image("a.jpg")).unwrap();
        assert!(matches!(cam.state(), CameraState::Previewing(_)));
        assert!(cam.capture(image("b.jpg")).is_err());
    }

    #[test]
    fn test_retake_returns_discarded() {
        let mut cam = CameraSession::new();
        cam.open();
        cam.capture(image("a.jpg")).unwrap();

        let discarded = cam.retake().unwrap();
        assert_eq!(discarded.name, "a.jpg");
        assert_eq!(cam.state(), &CameraState::Ready);
        assert!(cam.photos().is_empty());
        assert!(cam.retake().is_none());
    }

    #[test]
    fn test_confirm_keeps_photo_and_closes() {
        let mut cam = CameraSession::new();
        assert!(cam.confirm().is_none());

        for name in ["a.jpg", "b.jpg"] {
            cam.open();
            cam.capture(image(name)).unwrap();
            cam.confirm().unwrap();
        }

        assert_eq!(cam.state(), &CameraState::Closed);
        let names: Vec<_> = cam.photos().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn test_close_discards_preview() {
        let mut cam = CameraSession::new();
        cam.open();
        cam.capture(image("a.jpg")).unwrap();

        assert_eq!(cam.close().map(|i| i.name), Some("a.jpg".to_string()));
        assert!(cam.photos().is_empty());
    }

    #[test]
    fn test_remove_photo() {
        let mut cam = CameraSession::new();
        cam.set_photos(vec![image("a.jpg"), image("b.jpg")]);

        assert!(cam.remove_photo("a.jpg").is_some());
        assert!(cam.remove_photo("a.jpg").is_none());
        assert_eq!(cam.photos().len(), 1);
    }
}
