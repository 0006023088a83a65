//! Persistence of the monitor's status record.
//!
//! The record is the only durable state. It is read once at startup and
//! replaced whole after every determinate probe.

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::StatusRecord;

// Re-export for convenience
pub use local::LocalStatusStore;

/// Trait for status record backends.
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// Read the last saved record.
    ///
    /// Never fails: a missing or unreadable record yields the default.
    async fn load(&self) -> StatusRecord;

    /// Replace the saved record.
    async fn save(&self, record: &StatusRecord) -> Result<()>;
}
