//! Object-store storage backend
//!
//! Each score is written as its own JSON object under a date-partitioned key:
//!
//! ```text
//! scores/<YYYY>/<MM>/<DD>/<id>.json
//! ```
//!
//! ## Listing
//!
//! There is no index. `list_recent` enumerates every key under `scores/`,
//! sorts the listing by the store-reported last-modified time (newest first),
//! keeps the first `limit` entries and fetches their bodies concurrently.
//!
//! ## Limitations
//!
//! - **Cost**: every list call is O(objects under the prefix), not O(limit)
//! - **Approximate recency**: last-modified usually tracks write order, but
//!   nothing guarantees it, so the listing may not be exactly the `limit`
//!   most recent submissions
//!
//! The store itself sits behind the [`ObjectStore`] trait; the production
//! implementation is [`crate::storage::s3::S3Store`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use futures::future::try_join_all;
use tracing::{debug, instrument};

use super::backend::ScoreBackend;
use super::error::StorageResult;
use crate::score::ScoreRecord;

/// Prefix every score key lives under
pub const SCORES_PREFIX: &str = "scores/";

/// One entry of an object listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    pub key: String,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Minimal object store client
///
/// Implementations map their client errors to
/// [`StorageError::ObjectStoreFailed`](super::error::StorageError::ObjectStoreFailed).
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Name of the bucket/container the store operates on
    fn bucket(&self) -> &str;

    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str)
    -> StorageResult<()>;

    async fn get_object(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// List every object under `prefix`, following pagination to the end
    async fn list_objects(&self, prefix: &str) -> StorageResult<Vec<ObjectSummary>>;

    /// Existence probe on the bucket
    async fn head_bucket(&self) -> StorageResult<()>;
}

/// Key a record is stored under, partitioned by its own creation date
pub fn object_key(record: &ScoreRecord) -> String {
    let date = record.created_at;
    format!(
        "{}{:04}/{:02}/{:02}/{}.json",
        SCORES_PREFIX,
        date.year(),
        date.month(),
        date.day(),
        record.id
    )
}

/// Object-store storage backend
pub struct ObjectStoreBackend {
    store: Arc<dyn ObjectStore>,
}

impl ObjectStoreBackend {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ScoreBackend for ObjectStoreBackend {
    fn name(&self) -> &'static str {
        "object-store"
    }

    #[instrument(skip(self, record), fields(id = %record.id))]
    async fn insert(&self, record: ScoreRecord) -> StorageResult<ScoreRecord> {
        let key = object_key(&record);
        let body = serde_json::to_vec(&record)?;

        self.store
            .put_object(&key, body, "application/json")
            .await?;

        debug!("score written to {}", key);
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn list_recent(&self, limit: usize) -> StorageResult<Vec<ScoreRecord>> {
        let mut objects = self.store.list_objects(SCORES_PREFIX).await?;
        debug!("listed {} objects under {}", objects.len(), SCORES_PREFIX);

        // `None` sorts before `Some`, so objects without a timestamp end up last
        objects.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        objects.truncate(limit);

        let fetches = objects.iter().map(|object| async move {
            let body = self.store.get_object(&object.key).await?;
            let record: ScoreRecord = serde_json::from_slice(&body)?;
            StorageResult::Ok(record)
        });

        try_join_all(fetches).await
    }

    async fn health_check(&self) -> StorageResult<()> {
        self.store.head_bucket().await?;
        debug!("bucket {} reachable", self.store.bucket());
        Ok(())
    }
}
