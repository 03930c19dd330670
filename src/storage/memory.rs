//! In-memory storage backend (no persistence)
//!
//! This backend keeps submitted scores in an append-only list.
//! It's used when:
//! - No external backend is configured
//! - The configured backend could not be constructed at startup
//! - Tests need a backend without external dependencies
//!
//! ## Limitations
//!
//! - **No persistence**: All data lost on restart
//! - **Not shared**: Every process instance has its own list

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::backend::ScoreBackend;
use super::error::StorageResult;
use crate::score::ScoreRecord;

/// In-memory storage backend
#[derive(Debug, Default)]
pub struct MemoryBackend {
    scores: RwLock<Vec<ScoreRecord>>,
}

impl MemoryBackend {
    /// Create a new, empty in-memory backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.scores.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.scores.read().await.is_empty()
    }
}

#[async_trait]
impl ScoreBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, record: ScoreRecord) -> StorageResult<ScoreRecord> {
        debug!("in-memory backend: storing score {}", record.id);
        self.scores.write().await.push(record.clone());
        Ok(record)
    }

    async fn list_recent(&self, limit: usize) -> StorageResult<Vec<ScoreRecord>> {
        debug!("in-memory backend: listing latest {} scores", limit);

        let scores = self.scores.read().await;
        Ok(scores.iter().rev().take(limit).cloned().collect())
    }

    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}
