//! Storage backends for score persistence
//!
//! This module provides a trait-based abstraction over the places scores
//! can be persisted to.
//!
//! ## Design
//!
//! - **Trait-based**: `ScoreBackend` lets the request layer stay agnostic of
//!   where records end up
//! - **Chosen once**: [`select::select_backend`] makes the single startup-time
//!   decision; handlers never branch on configuration
//! - **No retries**: backend failures surface immediately
//!
//! ## Backends
//!
//! - **Relational**: rows in a `scores` table (PostgreSQL in production)
//! - **Object store**: one JSON object per score in an S3 bucket
//! - **In-Memory** (fallback): no persistence, used when nothing else is
//!   configured or the configured backend cannot be built
//!
//! ## Usage
//!
//! ```no_run
//! use snake_scores::config::StorageConfig;
//! use snake_scores::storage::select::select_backend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = select_backend(&StorageConfig::Memory).await;
//!     assert_eq!(backend.name(), "memory");
//! }
//! ```

pub mod backend;
pub mod error;
pub mod memory;
pub mod object_store;
#[cfg(feature = "relational")]
pub mod relational;
#[cfg(feature = "object-store")]
pub mod s3;
pub mod select;

pub use backend::{LIST_LIMIT, ScoreBackend};
pub use error::{StorageError, StorageResult};
pub use memory::MemoryBackend;
