//! S3 implementation of the [`ObjectStore`] trait

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use super::error::{StorageError, StorageResult};
use super::object_store::{ObjectStore, ObjectSummary};
use crate::config::ObjectStoreConfig;

fn s3_error(operation: &str, err: impl std::error::Error) -> StorageError {
    StorageError::ObjectStoreFailed(format!("{operation}: {}", DisplayErrorContext(err)))
}

fn to_chrono(dt: &aws_sdk_s3::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())
}

/// S3 bucket client
#[derive(Debug, Clone)]
pub struct S3Store {
    client: S3Client,
    bucket: String,
}

impl S3Store {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    /// Build a client from the default AWS credential chain
    ///
    /// A custom endpoint (S3-compatible stores such as MinIO) switches the
    /// client to path-style addressing.
    #[instrument(skip_all, fields(bucket = %config.bucket))]
    pub async fn from_config(config: &ObjectStoreConfig) -> StorageResult<Self> {
        if config.bucket.is_empty() {
            return Err(StorageError::InvalidConfig(
                "object store bucket name is empty".to_string(),
            ));
        }

        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        info!("S3 client created for region {}", config.region);

        Ok(Self::new(
            S3Client::from_conf(builder.build()),
            config.bucket.clone(),
        ))
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| s3_error("PutObject", e))?;
        Ok(())
    }

    async fn get_object(&self, key: &str) -> StorageResult<Vec<u8>> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| s3_error("GetObject", e))?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| s3_error("GetObject body", e))?;

        Ok(data.into_bytes().to_vec())
    }

    async fn list_objects(&self, prefix: &str) -> StorageResult<Vec<ObjectSummary>> {
        let mut objects = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| s3_error("ListObjectsV2", e))?;

            objects.extend(output.contents().iter().filter_map(|object| {
                Some(ObjectSummary {
                    key: object.key()?.to_string(),
                    last_modified: object.last_modified().and_then(to_chrono),
                })
            }));

            match output.next_continuation_token() {
                Some(token) if output.is_truncated().unwrap_or(false) => {
                    continuation = Some(token.to_string());
                }
                _ => break,
            }
        }

        debug!("listed {} objects in {}", objects.len(), self.bucket);
        Ok(objects)
    }

    async fn head_bucket(&self) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| s3_error("HeadBucket", e))?;
        Ok(())
    }
}
