//! Runtime configuration
//!
//! Every setting can be given as a command line flag or through the
//! environment (a `.env` file is loaded first by the binary). The raw
//! [`Args`] are resolved once into a typed [`Config`].

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::warn;

use crate::api::ApiConfig;
use crate::storage::error::{StorageError, StorageResult};

const DEFAULT_REGION: &str = "ap-southeast-1";

const DEFAULT_PG_PORT: u16 = 5432;

#[derive(Debug, Clone, Parser)]
#[command(name = "snake-scores", about = "Score submission service for the snake game")]
pub struct Args {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Address to bind to
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
    pub bind_addr: IpAddr,

    /// Storage backend: "relational" (alias "aurora", "postgres") or "object-store" (alias "s3")
    #[arg(long, env = "STORAGE_BACKEND", default_value = "object-store")]
    pub storage_backend: String,

    /// Bucket holding score objects
    #[arg(long, env = "S3_BUCKET")]
    pub s3_bucket: Option<String>,

    /// AWS region of the bucket
    #[arg(long, env = "AWS_REGION")]
    pub aws_region: Option<String>,

    #[arg(long, env = "AWS_DEFAULT_REGION", hide = true)]
    pub aws_default_region: Option<String>,

    /// Custom S3 endpoint (S3-compatible stores)
    #[arg(long, env = "S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// Full database connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    #[arg(long, env = "PGHOST")]
    pub pghost: Option<String>,

    #[arg(long, env = "PGPORT")]
    pub pgport: Option<u16>,

    #[arg(long, env = "PGDATABASE")]
    pub pgdatabase: Option<String>,

    #[arg(long, env = "PGUSER")]
    pub pguser: Option<String>,

    #[arg(long, env = "PGPASSWORD", hide_env_values = true)]
    pub pgpassword: Option<String>,

    /// TLS mode for the database connection
    #[arg(long, env = "PGSSLMODE", value_enum, default_value_t = SslMode::VerifyFull)]
    pub pgsslmode: SslMode,

    /// Directory with the static landing page
    #[arg(long, env = "STATIC_DIR", default_value = "public")]
    pub static_dir: PathBuf,
}

/// PostgreSQL `sslmode` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SslMode {
    Disable,
    Prefer,
    Require,
    VerifyCa,
    VerifyFull,
}

impl SslMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SslMode::Disable => "disable",
            SslMode::Prefer => "prefer",
            SslMode::Require => "require",
            SslMode::VerifyCa => "verify-ca",
            SslMode::VerifyFull => "verify-full",
        }
    }

    /// Whether the server certificate chain is checked
    pub fn verifies_certificate(&self) -> bool {
        matches!(self, SslMode::VerifyCa | SslMode::VerifyFull)
    }
}

/// Storage backend selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Relational,
    ObjectStore,
}

impl BackendKind {
    /// Case-insensitive parse, `None` for unrecognised values
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "relational" | "aurora" | "postgres" => Some(BackendKind::Relational),
            "object-store" | "s3" => Some(BackendKind::ObjectStore),
            _ => None,
        }
    }
}

/// Connection settings for the relational backend
#[derive(Debug, Clone)]
pub struct RelationalConfig {
    pub database_url: Option<String>,
    pub host: Option<String>,
    pub port: u16,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub ssl_mode: SslMode,
}

impl RelationalConfig {
    /// Resolve the connection string handed to the database driver
    ///
    /// `DATABASE_URL` wins over the discrete settings. An explicit `sslmode`
    /// inside a PostgreSQL URL is kept; otherwise the configured mode is added.
    pub fn connection_url(&self) -> StorageResult<String> {
        if let Some(url) = self.database_url.as_deref().filter(|url| !url.is_empty()) {
            if !url.starts_with("postgres") {
                return Ok(url.to_string());
            }

            let mut parsed = url::Url::parse(url)
                .map_err(|e| StorageError::InvalidConfig(format!("invalid DATABASE_URL: {e}")))?;
            if !parsed.query_pairs().any(|(key, _)| key == "sslmode") {
                parsed
                    .query_pairs_mut()
                    .append_pair("sslmode", self.ssl_mode.as_str());
            }
            return Ok(parsed.into());
        }

        let host = self
            .host
            .as_deref()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| {
                StorageError::InvalidConfig("neither DATABASE_URL nor PGHOST is set".to_string())
            })?;

        let invalid = |field: &str| StorageError::InvalidConfig(format!("invalid {field}"));

        let mut url = url::Url::parse("postgres://localhost").map_err(|_| invalid("URL"))?;
        url.set_host(Some(host)).map_err(|_| invalid("PGHOST"))?;
        url.set_port(Some(self.port)).map_err(|_| invalid("PGPORT"))?;
        if let Some(user) = &self.user {
            url.set_username(user).map_err(|_| invalid("PGUSER"))?;
        }
        if let Some(password) = &self.password {
            url.set_password(Some(password))
                .map_err(|_| invalid("PGPASSWORD"))?;
        }
        if let Some(database) = &self.database {
            url.set_path(database);
        }
        url.query_pairs_mut()
            .append_pair("sslmode", self.ssl_mode.as_str());

        Ok(url.into())
    }
}

/// The `sslmode` of a resolved connection URL, if it leaves the server
/// certificate unchecked
///
/// A PostgreSQL URL without `sslmode` uses the driver default, `prefer`.
/// Other databases have no TLS mode and yield `None`.
pub fn unverified_ssl_mode(url: &str) -> Option<String> {
    if !url.starts_with("postgres") {
        return None;
    }

    let parsed = url::Url::parse(url).ok()?;
    let mode = parsed
        .query_pairs()
        .find(|(key, _)| key == "sslmode")
        .map(|(_, value)| value.into_owned())
        .unwrap_or_else(|| SslMode::Prefer.as_str().to_string());

    match SslMode::from_str(&mode, true) {
        Ok(parsed) if parsed.verifies_certificate() => None,
        _ => Some(mode),
    }
}

/// Settings for the object-store backend
#[derive(Debug, Clone)]
pub struct ObjectStoreConfig {
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
}

/// Storage backend configuration
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// In-memory storage (no persistence)
    Memory,

    Relational(RelationalConfig),

    ObjectStore(ObjectStoreConfig),
}

/// Fully resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
}

impl Args {
    pub fn into_config(self) -> Config {
        let storage = match BackendKind::parse(&self.storage_backend) {
            Some(BackendKind::Relational) => StorageConfig::Relational(RelationalConfig {
                database_url: self.database_url,
                host: self.pghost,
                port: self.pgport.unwrap_or(DEFAULT_PG_PORT),
                database: self.pgdatabase,
                user: self.pguser,
                password: self.pgpassword,
                ssl_mode: self.pgsslmode,
            }),
            Some(BackendKind::ObjectStore) => StorageConfig::ObjectStore(ObjectStoreConfig {
                bucket: self.s3_bucket.unwrap_or_default(),
                region: self
                    .aws_region
                    .or(self.aws_default_region)
                    .unwrap_or_else(|| DEFAULT_REGION.to_string()),
                endpoint: self.s3_endpoint,
            }),
            None => {
                warn!(
                    "unknown storage backend '{}', using in-memory storage",
                    self.storage_backend
                );
                StorageConfig::Memory
            }
        };

        Config {
            api: ApiConfig {
                bind_addr: SocketAddr::new(self.bind_addr, self.port),
                enable_cors: true,
                static_dir: Some(self.static_dir),
            },
            storage,
        }
    }
}
