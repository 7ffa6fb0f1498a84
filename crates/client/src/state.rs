//! Durable client-side mirror of the tracked job.
//!
//! The tracker persists its state on every change and restores it on
//! load so an in-flight job survives a reload. The restore policy —
//! discard snapshots of terminal jobs instead of resurrecting stale UI —
//! lives here, in one place, behind the [`StateStore`] seam.

use std::path::PathBuf;

use async_trait::async_trait;
use dpp_core::job::{ImportJobStatus, ImportProgress};
use dpp_core::types::JobId;
use serde::{Deserialize, Serialize};

/// Client-side mirror of one import job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportState {
    pub job_id: JobId,
    pub status: ImportJobStatus,
    pub progress: ImportProgress,
    pub filename: String,
}

impl ImportState {
    /// Fresh state for a newly accepted upload.
    pub fn new(job_id: JobId, filename: impl Into<String>) -> Self {
        Self {
            job_id,
            status: ImportJobStatus::Pending,
            progress: ImportProgress::default(),
            filename: filename.into(),
        }
    }
}

/// Errors from the durable store.
#[derive(Debug, thiserror::Error)]
pub enum StateStoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Durable storage for the tracked job snapshot.
///
/// Implementations are per browser-context/per-profile; a snapshot is
/// never shared across jobs or tenants.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load(&self) -> Result<Option<ImportState>, StateStoreError>;
    async fn save(&self, state: &ImportState) -> Result<(), StateStoreError>;
    async fn clear(&self) -> Result<(), StateStoreError>;
}

/// Apply the restore policy to a loaded snapshot.
///
/// A terminal snapshot (`completed`/`failed`/`cancelled`) is discarded
/// so a reload does not resurrect a finished job's widget; anything
/// else is restored verbatim.
pub fn restore_snapshot(snapshot: Option<ImportState>) -> Option<ImportState> {
    snapshot.filter(|s| !s.status.is_terminal())
}

// ---------------------------------------------------------------------------
// JSON file store
// ---------------------------------------------------------------------------

/// [`StateStore`] backed by a single JSON file.
///
/// The desktop shell equivalent of web local storage.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl StateStore for JsonFileStore {
    async fn load(&self) -> Result<Option<ImportState>, StateStoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let state = serde_json::from_slice(&bytes)?;
        Ok(Some(state))
    }

    async fn save(&self, state: &ImportState) -> Result<(), StateStoreError> {
        let json = serde_json::to_vec_pretty(state)?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StateStoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(status: ImportJobStatus) -> ImportState {
        ImportState {
            job_id: uuid::Uuid::new_v4(),
            status,
            progress: ImportProgress::new(4, 10, 3, 1, 0),
            filename: "catalog.csv".to_string(),
        }
    }

    #[test]
    fn terminal_snapshots_are_discarded_on_restore() {
        for status in [
            ImportJobStatus::Completed,
            ImportJobStatus::Failed,
            ImportJobStatus::Cancelled,
        ] {
            assert_eq!(restore_snapshot(Some(snapshot(status))), None, "{status}");
        }
    }

    #[test]
    fn in_flight_snapshot_is_restored_verbatim() {
        let s = snapshot(ImportJobStatus::Validating);
        assert_eq!(restore_snapshot(Some(s.clone())), Some(s));
    }

    #[tokio::test]
    async fn file_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("import_state.json"));

        assert!(store.load().await.unwrap().is_none());

        let s = snapshot(ImportJobStatus::Validating);
        store.save(&s).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(s));

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        // Clearing an already-empty store is not an error.
        store.clear().await.unwrap();
    }
}
