use std::env;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream as AwsByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use tracing::debug;

use crate::{
    BlobError, BlobResult, BlobStore, Listing, ObjectItem, ObjectPath, PutResult,
    StoreCapabilities,
};

/// S3-compatible store configuration
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Custom endpoint for S3-compatible services; enables path-style addressing
    pub endpoint_url: Option<String>,
    /// Lifetime of presigned download URLs
    pub url_ttl_secs: u64,
}

impl S3Config {
    pub fn new<B: Into<String>, R: Into<String>>(bucket: B, region: R) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            access_key_id: None,
            secret_access_key: None,
            endpoint_url: None,
            url_ttl_secs: 3600,
        }
    }

    /// Read configuration from `PIX_S3_*` environment variables.
    ///
    /// `PIX_S3_BUCKET` and `PIX_S3_REGION` are required. Without
    /// `PIX_S3_ACCESS_KEY_ID`/`PIX_S3_SECRET_ACCESS_KEY` the default AWS
    /// credential chain is used.
    pub fn from_env() -> BlobResult<Self> {
        fn required(key: &str) -> BlobResult<String> {
            env::var(key).map_err(|_| BlobError::invalid(format!("{} environment variable required", key)))
        }
        fn optional(key: &str) -> Option<String> {
            env::var(key).ok().filter(|v| !v.trim().is_empty())
        }

        let mut config = Self::new(required("PIX_S3_BUCKET")?, required("PIX_S3_REGION")?);
        config.access_key_id = optional("PIX_S3_ACCESS_KEY_ID");
        config.secret_access_key = optional("PIX_S3_SECRET_ACCESS_KEY");
        config.endpoint_url = optional("PIX_S3_ENDPOINT_URL");
        if let Some(ttl) = optional("PIX_S3_URL_TTL_SECS") {
            config.url_ttl_secs = ttl
                .parse()
                .map_err(|_| BlobError::invalid(format!("PIX_S3_URL_TTL_SECS is not a number: {}", ttl)))?;
        }
        Ok(config)
    }

    pub fn with_credentials<A: Into<String>, S: Into<String>>(mut self, access_key_id: A, secret: S) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret.into());
        self
    }

    pub fn with_endpoint<S: Into<String>>(mut self, endpoint_url: S) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    pub fn with_url_ttl(mut self, secs: u64) -> Self {
        self.url_ttl_secs = secs;
        self
    }
}

/// Object store backed by any S3-compatible service
#[derive(Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
    url_ttl_secs: u64,
}

impl S3Store {
    pub async fn new(config: S3Config) -> Self {
        let bucket = config.bucket.clone();
        let url_ttl_secs = config.url_ttl_secs;
        let client = Self::create_client(config).await;
        Self {
            client,
            bucket,
            url_ttl_secs,
        }
    }

    /// Wrap an existing client
    pub fn from_client<B: Into<String>>(client: Client, bucket: B, url_ttl_secs: u64) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            url_ttl_secs,
        }
    }

    async fn create_client(config: S3Config) -> Client {
        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region));

        if let (Some(access_key_id), Some(secret)) = (config.access_key_id, config.secret_access_key) {
            let credentials = Credentials::new(access_key_id, secret, None, None, "pix-s3");
            loader = loader.credentials_provider(credentials);
        }

        let force_path_style = config.endpoint_url.is_some();
        if let Some(endpoint_url) = config.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }

        let aws_config = loader.load().await;

        Client::from_conf(
            aws_sdk_s3::config::Builder::from(&aws_config)
                .force_path_style(force_path_style)
                .build(),
        )
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl BlobStore for S3Store {
    async fn list(&self, path: &ObjectPath) -> BlobResult<Listing> {
        let prefix = path.as_prefix();
        let mut listing = Listing::default();
        let mut continuation: Option<String> = None;

        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(&prefix)
                .delimiter("/")
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| BlobError::list_failed(path.to_string(), e))?;

            for object in output.contents() {
                let Some(key) = object.key() else { continue };
                // Zero-byte "folder" markers created by consoles
                if key.ends_with('/') {
                    continue;
                }
                let mut item = ObjectItem::new(ObjectPath::new(key));
                if let Some(size) = object.size() {
                    item = item.with_size(size.max(0) as u64);
                }
                listing.items.push(item);
            }

            for common in output.common_prefixes() {
                if let Some(child) = common.prefix() {
                    listing.sub_paths.push(ObjectPath::new(child));
                }
            }

            continuation = output.next_continuation_token().map(str::to_string);
            if output.is_truncated() != Some(true) || continuation.is_none() {
                break;
            }
            debug!(path = %path, "following list continuation token");
        }

        Ok(listing)
    }

    async fn resolve_url(&self, item: &ObjectItem) -> BlobResult<String> {
        let presigning = PresigningConfig::expires_in(Duration::from_secs(self.url_ttl_secs))
            .map_err(|e| BlobError::resolve_failed(item.key(), e))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(item.key())
            .presigned(presigning)
            .await
            .map_err(|e| BlobError::resolve_failed(item.key(), e))?;

        Ok(request.uri().to_string())
    }

    async fn upload(
        &self,
        path: &ObjectPath,
        body: Bytes,
        content_type: Option<&str>,
    ) -> BlobResult<PutResult> {
        let size_bytes = body.len() as u64;

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(path.as_str())
            .body(AwsByteStream::from(body));

        if let Some(ct) = content_type {
            request = request.content_type(ct);
        }

        let result = request
            .send()
            .await
            .map_err(|e| BlobError::upload_failed(path.as_str(), e))?;

        Ok(PutResult {
            etag: result.e_tag().map(str::to_string),
            size_bytes,
        })
    }

    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities::basic().with_signed_urls(self.url_ttl_secs)
    }
}
