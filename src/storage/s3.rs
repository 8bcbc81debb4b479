//! S3-compatible object store.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use tracing::debug;

use super::{validate_key, ObjectStore, PutMetadata, StorageError};
use crate::config::StorageConfig;

/// Object store backed by an S3 bucket.
///
/// A custom endpoint switches the client to path-style addressing so
/// S3-compatible services (MinIO, R2, ...) work without DNS tricks.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: S3Client,
    bucket: String,
    locator_base: String,
}

impl S3ObjectStore {
    /// Build a client from storage configuration.
    ///
    /// Explicit credentials take precedence over the default provider chain.
    pub async fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        if config.bucket.is_empty() {
            return Err(StorageError::Backend("bucket name is empty".to_string()));
        }

        let loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        let loader = match (&config.access_key_id, &config.secret_access_key) {
            (Some(key_id), Some(secret)) => {
                let credentials = Credentials::new(key_id, secret, None, None, "driveclone");
                loader.credentials_provider(credentials)
            }
            _ => loader,
        };

        let sdk_config = loader.load().await;

        let client = match &config.endpoint {
            Some(endpoint) => {
                let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
                    .endpoint_url(endpoint)
                    .force_path_style(true)
                    .build();
                S3Client::from_conf(s3_config)
            }
            None => S3Client::new(&sdk_config),
        };

        Ok(Self::from_client(
            client,
            config.bucket.clone(),
            locator_base(&config.bucket, &config.region, config.endpoint.as_deref()),
        ))
    }

    /// Wrap an existing client.
    pub fn from_client(client: S3Client, bucket: String, locator_base: String) -> Self {
        Self {
            client,
            bucket,
            locator_base,
        }
    }

    /// Bucket this store writes to.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

/// Base URL objects in `bucket` are addressed under.
fn locator_base(bucket: &str, region: &str, endpoint: Option<&str>) -> String {
    match endpoint {
        Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), bucket),
        None => format!("https://{bucket}.s3.{region}.amazonaws.com"),
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(
        &self,
        key: &str,
        data: &[u8],
        metadata: &PutMetadata,
    ) -> Result<String, StorageError> {
        validate_key(key)?;
        debug!(bucket = %self.bucket, key, size = data.len(), "Putting object");

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data.to_vec()))
            .content_type(&metadata.content_type)
            .metadata("fieldname", "file")
            .metadata(
                "originalname",
                urlencoding::encode(&metadata.original_name).into_owned(),
            )
            .send()
            .await
            .map_err(|e| StorageError::Backend(DisplayErrorContext(&e).to_string()))?;

        Ok(format!("{}/{}", self.locator_base, key))
    }

    async fn signed_get_url(&self, key: &str, ttl: Duration) -> Result<String, StorageError> {
        validate_key(key)?;
        let presigning =
            PresigningConfig::expires_in(ttl).map_err(|e| StorageError::Signing(e.to_string()))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::Signing(DisplayErrorContext(&e).to_string()))?;

        Ok(request.uri().to_string())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        debug!(bucket = %self.bucket, key, "Deleting object");

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Backend(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }
}
