//! Local filesystem storage for the status record.
//!
//! The record lives in a single JSON file:
//!
//! ```text
//! { "status": "in_stock" | "out_of_stock" | null, "sold_out_email_sent": bool }
//! ```
//!
//! Writes go to a sibling temp file which is then renamed over the target,
//! so a crash leaves either the old or the new record. A torn or garbled file
//! is still tolerated by `load`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::StatusRecord;
use crate::storage::StatusStore;

/// JSON file backed status store.
#[derive(Debug, Clone)]
pub struct LocalStatusStore {
    path: PathBuf,
}

impl LocalStatusStore {
    /// Create a store for the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the raw record, `None` when the file doesn't exist.
    async fn read_record(&self) -> Result<Option<StatusRecord>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl StatusStore for LocalStatusStore {
    async fn load(&self) -> StatusRecord {
        match self.read_record().await {
            Ok(Some(record)) => {
                if !record.is_consistent() {
                    log::warn!(
                        "Status file {} has sold-out flag set while {}; clearing it",
                        self.path.display(),
                        record.status
                    );
                }
                record.normalized()
            }
            Ok(None) => {
                log::info!(
                    "No status file at {}, starting fresh",
                    self.path.display()
                );
                StatusRecord::default()
            }
            Err(e) => {
                log::warn!(
                    "Corrupted status file {} ({}), starting fresh",
                    self.path.display(),
                    e
                );
                StatusRecord::default()
            }
        }
    }

    async fn save(&self, record: &StatusRecord) -> Result<()> {
        let bytes = serde_json::to_vec(record)?;
        self.write_bytes(&bytes).await?;
        log::debug!("Saved status {:?} to {}", record, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StockStatus;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_missing_file_defaults() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStatusStore::new(tmp.path().join("stock_status.json"));

        assert_eq!(store.load().await, StatusRecord::default());
    }

    #[tokio::test]
    async fn test_load_corrupt_file_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("stock_status.json");
        std::fs::write(&path, b"{\"status\": \"out_of_st").unwrap();

        let store = LocalStatusStore::new(&path);
        assert_eq!(store.load().await, StatusRecord::default());
    }

    #[tokio::test]
    async fn test_load_wrong_shape_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("stock_status.json");
        std::fs::write(&path, b"[1, 2, 3]").unwrap();

        let store = LocalStatusStore::new(&path);
        assert_eq!(store.load().await, StatusRecord::default());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStatusStore::new(tmp.path().join("state/stock_status.json"));
        let record = StatusRecord::new(StockStatus::OutOfStock, true);

        store.save(&record).await.unwrap();
        assert_eq!(store.load().await, record);
        assert!(!tmp.path().join("state/stock_status.tmp").exists());
    }

    #[tokio::test]
    async fn test_save_overwrites_whole_record() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("stock_status.json");
        let store = LocalStatusStore::new(&path);

        store
            .save(&StatusRecord::new(StockStatus::OutOfStock, true))
            .await
            .unwrap();
        store
            .save(&StatusRecord::new(StockStatus::InStock, false))
            .await
            .unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw, r#"{"status":"in_stock","sold_out_email_sent":false}"#);
    }

    #[tokio::test]
    async fn test_load_null_status() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("stock_status.json");
        std::fs::write(&path, br#"{"status": null, "sold_out_email_sent": false}"#).unwrap();

        let store = LocalStatusStore::new(&path);
        assert_eq!(store.load().await, StatusRecord::default());
    }

    #[tokio::test]
    async fn test_load_clears_inconsistent_flag() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("stock_status.json");
        std::fs::write(&path, br#"{"status": "in_stock", "sold_out_email_sent": true}"#).unwrap();

        let store = LocalStatusStore::new(&path);
        assert_eq!(
            store.load().await,
            StatusRecord::new(StockStatus::InStock, false)
        );
    }
}
