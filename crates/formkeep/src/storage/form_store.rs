//! Draft and submission persistence over a [`KeyValueStore`].
//!
//! Two keys are used: one holds the draft as a JSON object, the other the
//! submitted records as a JSON array in submission order. Reads degrade to
//! "no data" on any failure; writes log and return their error.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::KeyValueStore;
use crate::config::StorageConfig;
use crate::error::{Error, Result};
use crate::form::{DraftForm, SubmittedForm};

/// The two keys the form data lives under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreKeys {
    /// Key holding the draft record.
    pub draft: String,
    /// Key holding the submitted records list.
    pub submitted: String,
}

impl Default for StoreKeys {
    fn default() -> Self {
        Self::from(&StorageConfig::default())
    }
}

impl From<&StorageConfig> for StoreKeys {
    fn from(config: &StorageConfig) -> Self {
        Self {
            draft: config.draft_key.clone(),
            submitted: config.submitted_key.clone(),
        }
    }
}

/// Summary of persisted form data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormStats {
    /// Whether a draft is saved.
    pub has_draft: bool,
    /// Number of submitted records.
    pub submitted_count: usize,
    /// When the most recent record was submitted.
    pub last_submitted_at: Option<DateTime<Utc>>,
}

/// Persists the draft and the submitted records.
#[derive(Debug)]
pub struct FormDataStore<S> {
    store: S,
    keys: StoreKeys,
}

impl<S: KeyValueStore> FormDataStore<S> {
    /// Create a store writing under `keys`.
    pub fn new(store: S, keys: StoreKeys) -> Self {
        Self { store, keys }
    }

    /// The keys in use.
    pub fn keys(&self) -> &StoreKeys {
        &self.keys
    }

    /// The underlying key-value store.
    pub fn inner(&self) -> &S {
        &self.store
    }

    /// Overwrite the saved draft.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageWrite`] if the draft cannot be stored.
    pub async fn save_draft(&self, draft: &DraftForm) -> Result<()> {
        let json = serde_json::to_string(draft)
            .map_err(|e| Error::storage_write(self.keys.draft.as_str(), e.to_string()))?;
        self.store.set(&self.keys.draft, &json).await.map_err(|e| {
            error!(key = %self.keys.draft, error = %e, "Failed to save draft");
            e
        })?;
        debug!("Draft saved");
        Ok(())
    }

    /// Load the saved draft, `None` if there is none or it cannot be read.
    pub async fn get_draft(&self) -> Option<DraftForm> {
        let raw = match self.store.get(&self.keys.draft).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key = %self.keys.draft, error = %e, "Failed to read draft");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(draft) => Some(draft),
            Err(e) => {
                warn!(key = %self.keys.draft, error = %e, "Ignoring malformed draft");
                None
            }
        }
    }

    /// Append `record` to the submitted list, then clear the draft.
    ///
    /// The draft is only cleared once the list has been written. A failure
    /// to clear it afterwards is logged and does not fail the commit, since
    /// the record is already stored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageWrite`] if the list cannot be written; the
    /// draft is left untouched in that case.
    pub async fn commit_submission(&self, record: &SubmittedForm) -> Result<()> {
        let mut forms = self.get_submitted_forms().await;
        forms.push(record.clone());

        let json = serde_json::to_string(&forms)
            .map_err(|e| Error::storage_write(self.keys.submitted.as_str(), e.to_string()))?;
        self.store
            .set(&self.keys.submitted, &json)
            .await
            .map_err(|e| {
                error!(key = %self.keys.submitted, error = %e, "Failed to store submission");
                e
            })?;

        if let Err(e) = self.store.remove(&self.keys.draft).await {
            warn!(key = %self.keys.draft, error = %e, "Submission stored but draft not cleared");
        }

        info!(total = forms.len(), "Submission committed");
        Ok(())
    }

    /// All submitted records in submission order; empty if unreadable.
    pub async fn get_submitted_forms(&self) -> Vec<SubmittedForm> {
        match self.load_submitted().await {
            Ok(forms) => forms,
            Err(e) => {
                warn!(key = %self.keys.submitted, error = %e, "Failed to read submissions");
                Vec::new()
            }
        }
    }

    /// Remove the saved draft. Succeeds when there is none.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageWrite`] if the removal fails.
    pub async fn clear_draft(&self) -> Result<()> {
        self.store.remove(&self.keys.draft).await.map_err(|e| {
            error!(key = %self.keys.draft, error = %e, "Failed to clear draft");
            e
        })
    }

    /// Remove the draft and every submitted record in one batch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageWrite`] if the batch removal fails.
    pub async fn clear_all(&self) -> Result<()> {
        self.store
            .multi_remove(&[self.keys.draft.as_str(), self.keys.submitted.as_str()])
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to clear form data");
                e
            })?;
        info!("Cleared all form data");
        Ok(())
    }

    /// Summarize persisted data. Any failure yields the empty summary.
    pub async fn get_stats(&self) -> FormStats {
        match self.collect_stats().await {
            Ok(stats) => stats,
            Err(e) => {
                warn!(error = %e, "Failed to collect form stats");
                FormStats::default()
            }
        }
    }

    async fn collect_stats(&self) -> Result<FormStats> {
        let has_draft = self.store.get(&self.keys.draft).await?.is_some();
        let forms = self.load_submitted().await?;
        Ok(FormStats {
            has_draft,
            submitted_count: forms.len(),
            last_submitted_at: forms.last().map(|f| f.submitted_at),
        })
    }

    async fn load_submitted(&self) -> Result<Vec<SubmittedForm>> {
        match self.store.get(&self.keys.submitted).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }
}
