//! S3-backed artwork store.
//!
//! Stores artworks as objects in an S3 or S3-compatible bucket (MinIO,
//! etc.). Listing pages through `list_objects_v2` with continuation
//! tokens, uploads are a single `put_object`, deletes are `head_object`
//! followed by `delete_object` — S3 deletes are silent for missing keys,
//! so the head request is what surfaces a 404.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use tracing::debug;

use crate::error::StoreError;

use super::{validate_name, ArtworkStore, StoredArtwork};

/// Artwork store backed by an S3 bucket.
///
/// The artwork filename becomes the object key, prefixed with the
/// configured key prefix if any.
///
/// # Example
///
/// ```ignore
/// use gallery_server::store::{create_s3_client, S3Store};
///
/// let client = create_s3_client(None, "us-east-1").await;
/// let store = S3Store::new(client, "my-gallery".to_string(), None, None, "us-east-1".to_string());
/// ```
#[derive(Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
    prefix: Option<String>,
    endpoint: Option<String>,
    region: String,
}

impl S3Store {
    /// Create a new S3Store for the given bucket.
    ///
    /// # Arguments
    /// * `client` - AWS S3 client to use for requests
    /// * `bucket` - Bucket name containing the artworks
    /// * `prefix` - Optional key prefix (e.g. "artworks/")
    /// * `endpoint` - Custom endpoint, used for building public URLs
    /// * `region` - AWS region, used for building public URLs
    pub fn new(
        client: Client,
        bucket: String,
        prefix: Option<String>,
        endpoint: Option<String>,
        region: String,
    ) -> Self {
        let prefix = prefix
            .map(|p| {
                let p = p.trim_matches('/');
                if p.is_empty() {
                    String::new()
                } else {
                    format!("{}/", p)
                }
            })
            .filter(|p| !p.is_empty());

        Self {
            client,
            bucket,
            prefix,
            endpoint: endpoint.map(|e| e.trim_end_matches('/').to_string()),
            region,
        }
    }

    /// Get the bucket name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Full object key for an artwork filename.
    fn key_for(&self, filename: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, filename),
            None => filename.to_string(),
        }
    }

    /// Public URL for an object key.
    ///
    /// Custom endpoints use path-style addressing (MinIO default); plain
    /// AWS uses the virtual-hosted form.
    fn url_for(&self, key: &str) -> String {
        let encoded: Vec<String> = key
            .split('/')
            .map(|seg| urlencoding::encode(seg).into_owned())
            .collect();
        let encoded = encoded.join("/");

        match &self.endpoint {
            Some(endpoint) => format!("{}/{}/{}", endpoint, self.bucket, encoded),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, encoded
            ),
        }
    }

    /// Resolve a client-supplied identifier to an object key.
    ///
    /// Listings hand out full URLs as `path`, and the delete endpoint
    /// accepts either that URL or the bare filename.
    fn resolve_key(&self, identifier: &str) -> String {
        if identifier.starts_with("http://") || identifier.starts_with("https://") {
            if let Ok(parsed) = url::Url::parse(identifier) {
                let path = parsed.path().trim_start_matches('/');
                // Path-style URLs carry the bucket as the first segment.
                let key = path
                    .strip_prefix(&format!("{}/", self.bucket))
                    .unwrap_or(path);
                return urlencoding::decode(key)
                    .map(|s| s.into_owned())
                    .unwrap_or_else(|_| key.to_string());
            }
        }
        self.key_for(identifier)
    }

    /// Strip the configured prefix from an object key.
    fn filename_from_key<'a>(&self, key: &'a str) -> &'a str {
        match &self.prefix {
            Some(prefix) => key.strip_prefix(prefix.as_str()).unwrap_or(key),
            None => key,
        }
    }

    /// Check whether an object exists, mapping missing objects to
    /// [`StoreError::NotFound`].
    async fn head(&self, key: &str) -> Result<(), StoreError> {
        self.client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let is_not_found = e
                    .as_service_error()
                    .map(|se| se.is_not_found())
                    .unwrap_or(false);

                if is_not_found {
                    StoreError::NotFound(key.to_string())
                } else {
                    StoreError::S3(e.to_string())
                }
            })?;
        Ok(())
    }
}

#[async_trait]
impl ArtworkStore for S3Store {
    async fn list(&self) -> Result<Vec<StoredArtwork>, StoreError> {
        let mut artworks = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .max_keys(1000);

            if let Some(ref prefix) = self.prefix {
                request = request.prefix(prefix);
            }
            if let Some(token) = continuation_token {
                request = request.continuation_token(token);
            }

            let result = request
                .send()
                .await
                .map_err(|e| StoreError::S3(e.to_string()))?;

            for obj in result.contents() {
                let Some(key) = obj.key() else { continue };
                let filename = self.filename_from_key(key);
                // The prefix marker object itself has an empty filename.
                if filename.is_empty() {
                    continue;
                }
                artworks.push(StoredArtwork {
                    filename: filename.to_string(),
                    url: self.url_for(key),
                    size: obj.size().unwrap_or(0) as u64,
                });
            }

            if result.is_truncated() == Some(true) {
                continuation_token = result.next_continuation_token().map(|s| s.to_string());
            } else {
                break;
            }
        }

        Ok(artworks)
    }

    async fn put(
        &self,
        filename: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<StoredArtwork, StoreError> {
        validate_name(filename)?;

        let key = self.key_for(filename);
        let size = data.len() as u64;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| StoreError::S3(e.to_string()))?;

        debug!(key = %key, size = size, "stored artwork in bucket");

        Ok(StoredArtwork {
            filename: filename.to_string(),
            url: self.url_for(&key),
            size,
        })
    }

    async fn delete(&self, filename: &str) -> Result<(), StoreError> {
        let key = self.resolve_key(filename);
        validate_name(self.filename_from_key(&key))?;

        // delete_object succeeds for absent keys; head first so a missing
        // artwork reports 404 instead of silently "working".
        self.head(&key).await?;

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
            .map_err(|e| StoreError::S3(e.to_string()))?;

        debug!(key = %key, "deleted artwork from bucket");
        Ok(())
    }
}

/// Create an S3 client with optional custom endpoint and region.
///
/// Use a custom endpoint for S3-compatible services like MinIO:
/// ```ignore
/// let client = create_s3_client(Some("http://localhost:9000"), "us-east-1").await;
/// ```
///
/// For AWS S3, pass `None` to use the default endpoint:
/// ```ignore
/// let client = create_s3_client(None, "us-east-1").await;
/// ```
pub async fn create_s3_client(endpoint_url: Option<&str>, region: &str) -> Client {
    let region = aws_config::Region::new(region.to_string());
    let mut config_loader =
        aws_config::defaults(aws_config::BehaviorVersion::latest()).region(region);

    if let Some(endpoint) = endpoint_url {
        config_loader = config_loader.endpoint_url(endpoint);
    }

    let sdk_config = config_loader.load().await;

    // S3-compatible services usually require path-style addressing
    let s3_config = if endpoint_url.is_some() {
        aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build()
    } else {
        aws_sdk_s3::config::Builder::from(&sdk_config).build()
    };

    Client::from_conf(s3_config)
}
