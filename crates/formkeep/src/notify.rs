//! Toast-style user notifications.
//!
//! At most one toast is held at a time. Showing a new one replaces the
//! current toast; nothing is queued. When a tokio runtime is running, each
//! toast hides itself after the configured duration.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    /// Operation succeeded.
    Success,
    /// Operation failed.
    Error,
    /// Neutral information.
    Info,
}

/// A single notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    /// Severity.
    pub kind: ToastKind,
    /// Text shown to the user.
    pub message: String,
    /// Whether the toast is on screen.
    pub visible: bool,
}

#[derive(Debug)]
struct Inner {
    toast: Mutex<Option<Toast>>,
    generation: AtomicU64,
    duration: Duration,
}

impl Inner {
    fn slot(&self) -> MutexGuard<'_, Option<Toast>> {
        self.toast
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn hide_if_current(&self, generation: u64) {
        if self.generation.load(Ordering::SeqCst) == generation {
            if let Some(toast) = self.slot().as_mut() {
                toast.visible = false;
            }
        }
    }
}

/// Shared handle to the notification slot.
#[derive(Debug, Clone)]
pub struct Notifier {
    inner: Arc<Inner>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(Duration::from_millis(3000))
    }
}

impl Notifier {
    /// Create a notifier whose toasts stay up for `duration`.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                toast: Mutex::new(None),
                generation: AtomicU64::new(0),
                duration,
            }),
        }
    }

    /// How long a toast stays visible.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.inner.duration
    }

    /// Show a toast, replacing any current one.
    pub fn show(&self, kind: ToastKind, message: impl Into<String>) {
        let message = message.into();
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(?kind, %message, "Showing toast");
        *self.inner.slot() = Some(Toast {
            kind,
            message,
            visible: true,
        });

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let inner = Arc::clone(&self.inner);
            handle.spawn(async move {
                tokio::time::sleep(inner.duration).await;
                inner.hide_if_current(generation);
            });
        }
    }

    /// Show a success toast.
    pub fn success(&self, message: impl Into<String>) {
        self.show(ToastKind::Success, message);
    }

    /// Show an error toast.
    pub fn error(&self, message: impl Into<String>) {
        self.show(ToastKind::Error, message);
    }

    /// Show an informational toast.
    pub fn info(&self, message: impl Into<String>) {
        self.show(ToastKind::Info, message);
    }

    /// Hide the current toast.
    pub fn hide(&self) {
        if let Some(toast) = self.inner.slot().as_mut() {
            toast.visible = false;
        }
    }

    /// The toast on screen, if any.
    #[must_use]
    pub fn current(&self) -> Option<Toast> {
        self.inner.slot().clone().filter(|t| t.visible)
    }

    /// The most recent toast, visible or not.
    #[must_use]
    pub fn last(&self) -> Option<Toast> {
        self.inner.slot().clone()
    }
}
