//! Startup-time backend selection
//!
//! The configured backend is built exactly once. If that fails for any
//! reason (missing settings, unreachable database, feature not compiled in)
//! the in-memory backend is used for the rest of the process lifetime.

use std::sync::Arc;

use tracing::{info, warn};

use super::backend::ScoreBackend;
use super::error::StorageResult;
use super::memory::MemoryBackend;
use crate::config::{ObjectStoreConfig, RelationalConfig, StorageConfig};

/// Build the backend for `config`, falling back to memory on failure
pub async fn select_backend(config: &StorageConfig) -> Arc<dyn ScoreBackend> {
    match build_backend(config).await {
        Ok(backend) => {
            info!("using {} storage backend", backend.name());
            backend
        }
        Err(e) => {
            warn!("{e}; falling back to in-memory storage");
            Arc::new(MemoryBackend::new())
        }
    }
}

/// Build the backend for `config` without any fallback
pub async fn build_backend(config: &StorageConfig) -> StorageResult<Arc<dyn ScoreBackend>> {
    match config {
        StorageConfig::Memory => Ok(Arc::new(MemoryBackend::new())),
        StorageConfig::Relational(relational) => build_relational(relational).await,
        StorageConfig::ObjectStore(store) => build_object_store(store).await,
    }
}

#[cfg(feature = "relational")]
async fn build_relational(config: &RelationalConfig) -> StorageResult<Arc<dyn ScoreBackend>> {
    use super::relational::RelationalBackend;

    let backend = RelationalBackend::connect(config).await?;
    Ok(Arc::new(backend))
}

#[cfg(not(feature = "relational"))]
async fn build_relational(_config: &RelationalConfig) -> StorageResult<Arc<dyn ScoreBackend>> {
    Err(super::error::StorageError::InvalidConfig(
        "relational backend support is not compiled in".to_string(),
    ))
}

#[cfg(feature = "object-store")]
async fn build_object_store(config: &ObjectStoreConfig) -> StorageResult<Arc<dyn ScoreBackend>> {
    use super::object_store::ObjectStoreBackend;
    use super::s3::S3Store;

    let store = S3Store::from_config(config).await?;
    Ok(Arc::new(ObjectStoreBackend::new(Arc::new(store))))
}

#[cfg(not(feature = "object-store"))]
async fn build_object_store(_config: &ObjectStoreConfig) -> StorageResult<Arc<dyn ScoreBackend>> {
    Err(super::error::StorageError::InvalidConfig(
        "object-store backend support is not compiled in".to_string(),
    ))
}
