//! S3-backed object store
//!
//! Thin adapter over `aws-sdk-s3` supporting S3-compatible services through a
//! configurable endpoint with path-style addressing. Authentication is a
//! static access/secret key pair, or anonymous access for public buckets.

use std::path::Path;

use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::app::models::RemoteObject;
use crate::constants::store as defaults;
use crate::errors::{StoreError, StoreResult};

use super::{ListPage, ObjectStore};

/// Connection settings for an S3-compatible store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Service endpoint URL
    pub endpoint: String,
    /// Bucket name
    pub bucket: String,
    /// Region string, often ignored by non-AWS services
    pub region: String,
    /// Static credentials; `None` for anonymous access
    pub credentials: Option<(String, String)>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::DEFAULT_ENDPOINT.to_string(),
            bucket: defaults::DEFAULT_BUCKET.to_string(),
            region: defaults::DEFAULT_REGION.to_string(),
            credentials: None,
        }
    }
}

impl StoreConfig {
    /// Create a config for an endpoint and bucket
    pub fn new(endpoint: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            ..Self::default()
        }
    }

    /// Set static credentials
    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.credentials = Some((access_key.into(), secret_key.into()));
        self
    }
}

/// Object store backed by an S3-compatible service
pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Store {
    /// Connect to the configured service
    ///
    /// Path-style addressing is forced so that non-AWS services which do not
    /// support virtual-hosted buckets keep working.
    pub async fn connect(config: StoreConfig) -> Self {
        let mut loader =
            aws_config::defaults(aws_config::BehaviorVersion::latest()).region(Region::new(config.region.clone()));

        loader = match &config.credentials {
            Some((access_key, secret_key)) => loader.credentials_provider(Credentials::from_keys(
                access_key.clone(),
                secret_key.clone(),
                None,
            )),
            None => loader.no_credentials(),
        };

        let shared = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .endpoint_url(config.endpoint.clone())
            .force_path_style(true)
            .build();

        debug!(
            "Connected S3 store: endpoint={} bucket={}",
            config.endpoint, config.bucket
        );

        Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: config.bucket,
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list_page(
        &self,
        prefix: &str,
        delimiter: Option<&str>,
        token: Option<String>,
    ) -> StoreResult<ListPage> {
        let mut request = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix);

        if let Some(delimiter) = delimiter {
            request = request.delimiter(delimiter);
        }
        if let Some(token) = token {
            request = request.continuation_token(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StoreError::list(prefix, e))?;

        let mut objects = Vec::new();
        for object in response.contents() {
            let key = object
                .key()
                .ok_or_else(|| StoreError::IncompleteRecord {
                    prefix: prefix.to_string(),
                })?
                .to_string();
            let size = object.size().unwrap_or(0).max(0) as u64;
            let etag = object.e_tag().unwrap_or_default().to_string();
            objects.push(RemoteObject { key, size, etag });
        }

        let common_prefixes = response
            .common_prefixes()
            .iter()
            .filter_map(|p| p.prefix().map(str::to_string))
            .collect();

        Ok(ListPage {
            objects,
            common_prefixes,
            next_token: response.next_continuation_token().map(str::to_string),
        })
    }

    async fn download_to(&self, key: &str, dest: &Path) -> StoreResult<u64> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StoreError::get(key, e))?;

        let io_err = |source| StoreError::Write {
            key: key.to_string(),
            path: dest.to_path_buf(),
            source,
        };

        let mut file = fs::File::create(dest).await.map_err(io_err)?;
        let mut body = response.body.into_async_read();
        let written = tokio::io::copy(&mut body, &mut file).await.map_err(io_err)?;
        file.flush().await.map_err(io_err)?;

        Ok(written)
    }
}
