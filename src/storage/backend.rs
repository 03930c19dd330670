//! Storage backend trait definition
//!
//! This module defines the `ScoreBackend` trait that every score
//! persistence strategy implements.

use async_trait::async_trait;

use super::error::StorageResult;
use crate::score::ScoreRecord;

/// Number of records returned by the scores listing
pub const LIST_LIMIT: usize = 50;

/// Trait for score persistence backends
///
/// Exactly one implementation is selected at startup and shared by every
/// request handler for the lifetime of the process.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync` as they are called concurrently
/// from independent request tasks.
///
/// ## Error Handling
///
/// Failures are never retried or masked. Implementations convert their
/// client errors into `StorageError` variants and return them as-is.
#[async_trait]
pub trait ScoreBackend: Send + Sync {
    /// Short backend identifier used in logs ("memory", "relational", ...)
    fn name(&self) -> &'static str;

    /// Persist a record
    ///
    /// Returns the record unchanged on success. Either the whole record is
    /// written or nothing is.
    async fn insert(&self, record: ScoreRecord) -> StorageResult<ScoreRecord>;

    /// Fetch up to `limit` records, newest first
    async fn list_recent(&self, limit: usize) -> StorageResult<Vec<ScoreRecord>>;

    /// Check that the backend is reachable
    ///
    /// Performs a lightweight probe (e.g. `SELECT 1`, bucket existence
    /// check). An `Err` means the service is alive but not ready.
    async fn health_check(&self) -> StorageResult<()>;
}
