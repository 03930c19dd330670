//! Relational storage backend implementation
//!
//! Scores are stored as rows of a fixed `scores` table:
//!
//! ```sql
//! CREATE TABLE scores (
//!     id          TEXT PRIMARY KEY,
//!     user_id     TEXT NOT NULL,
//!     points      DOUBLE PRECISION NOT NULL,
//!     created_at  TEXT NOT NULL
//! );
//! ```
//!
//! The table is not created by the service. `created_at` holds the
//! fixed-width RFC 3339 rendering of the submission time, so ordering by the
//! text column is ordering by time.
//!
//! The backend talks to the database through sqlx's `Any` driver. Production
//! deployments point it at PostgreSQL; the test suite runs it against a
//! SQLite file.

use async_trait::async_trait;
use sqlx::any::{AnyPoolOptions, AnyRow};
use sqlx::{AnyPool, Row};
use tracing::{debug, info, instrument, warn};

use super::backend::ScoreBackend;
use super::error::{StorageError, StorageResult};
use crate::config::{RelationalConfig, unverified_ssl_mode};
use crate::score::{self, ScoreRecord};

/// Relational storage backend
#[derive(Debug)]
pub struct RelationalBackend {
    pool: AnyPool,
}

impl RelationalBackend {
    /// Connect using the resolved relational configuration
    ///
    /// The connection is established eagerly, so an unreachable database
    /// fails here rather than on the first request.
    #[instrument(skip_all)]
    pub async fn connect(config: &RelationalConfig) -> StorageResult<Self> {
        let url = config.connection_url()?;
        if let Some(mode) = unverified_ssl_mode(&url) {
            warn!("database TLS mode '{mode}' does not verify the server certificate");
        }
        Self::connect_url(&url).await
    }

    /// Connect to an explicit database URL
    pub async fn connect_url(url: &str) -> StorageResult<Self> {
        sqlx::any::install_default_drivers();

        let pool = AnyPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        info!("relational connection pool created");

        Ok(Self { pool })
    }

    /// Access the underlying pool
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    fn row_to_record(row: &AnyRow) -> StorageResult<ScoreRecord> {
        let points: f64 = row.try_get("points")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(ScoreRecord {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            points: score::number_from_f64(points).ok_or_else(|| {
                StorageError::SerializationError(format!("stored points are not finite: {points}"))
            })?,
            created_at: score::timestamp::parse(&created_at).map_err(|e| {
                StorageError::SerializationError(format!(
                    "invalid created_at '{created_at}': {e}"
                ))
            })?,
        })
    }
}

#[async_trait]
impl ScoreBackend for RelationalBackend {
    fn name(&self) -> &'static str {
        "relational"
    }

    #[instrument(skip(self, record), fields(id = %record.id))]
    async fn insert(&self, record: ScoreRecord) -> StorageResult<ScoreRecord> {
        let points = record.points.as_f64().ok_or_else(|| {
            StorageError::SerializationError(format!(
                "points {} cannot be stored as a double",
                record.points
            ))
        })?;

        sqlx::query(
            "INSERT INTO scores (id, user_id, points, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(points)
        .bind(record.created_at_string())
        .execute(&self.pool)
        .await?;

        debug!("score inserted");
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn list_recent(&self, limit: usize) -> StorageResult<Vec<ScoreRecord>> {
        let rows = sqlx::query(
            "SELECT id, user_id, points, created_at FROM scores ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        debug!("fetched {} score rows", rows.len());

        rows.iter().map(Self::row_to_record).collect()
    }

    async fn health_check(&self) -> StorageResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::UnhealthyBackend(e.to_string()))?;

        debug!("relational health check ok, pool size {}", self.pool.size());
        Ok(())
    }
}
