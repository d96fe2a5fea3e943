//! Object storage gateway.
//!
//! Product photography lives in a hosted storage service with a plain
//! HTTP surface: objects are addressed as `{bucket}/{path}`, uploads go
//! through an authenticated endpoint, and reads for the storefront use
//! stable public URLs. [`ObjectStore`] is the seam the image pipeline
//! works against; [`MemoryObjectStore`] backs tests.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors from object storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Transport-level failure talking to the storage service.
    #[error("storage request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The storage service answered with a non-success status.
    #[error("storage returned {status} for {path}")]
    UnexpectedStatus {
        status: StatusCode,
        path: String,
    },

    /// Object does not exist (memory store only).
    #[error("object not found: {0}")]
    NotFound(String),
}

/// Blob operations the image pipeline needs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Download an object's bytes.
    async fn download(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Upload bytes to `path`, replacing any existing object.
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;
}

struct StorageClientInner {
    http: reqwest::Client,
    base_url: String,
    bucket: String,
    service_key: SecretString,
}

/// HTTP client for the hosted storage service.
///
/// Cheap to clone; the underlying HTTP client and credentials are shared.
#[derive(Clone)]
pub struct StorageClient {
    inner: Arc<StorageClientInner>,
}

impl StorageClient {
    /// Create a storage client for one bucket.
    ///
    /// `base_url` is the service root (no trailing slash); object routes
    /// are derived from it.
    #[must_use]
    pub fn new(base_url: String, bucket: String, service_key: SecretString) -> Self {
        Self {
            inner: Arc::new(StorageClientInner {
                http: reqwest::Client::new(),
                base_url,
                bucket,
                service_key,
            }),
        }
    }

    /// Bucket this client reads and writes.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.inner.bucket
    }

    /// Public, unauthenticated URL for an object.
    #[must_use]
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.inner.base_url, self.inner.bucket, path
        )
    }

    fn object_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.inner.base_url, self.inner.bucket, path
        )
    }
}

impl fmt::Debug for StorageClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageClient")
            .field("base_url", &self.inner.base_url)
            .field("bucket", &self.inner.bucket)
            .field("service_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ObjectStore for StorageClient {
    async fn download(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let response = self
            .inner
            .http
            .get(self.object_url(path))
            .bearer_auth(self.inner.service_key.expose_secret())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::UnexpectedStatus {
                status,
                path: path.to_owned(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let response = self
            .inner
            .http
            .post(self.object_url(path))
            .bearer_auth(self.inner.service_key.expose_secret())
            .header("content-type", content_type)
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::UnexpectedStatus {
                status,
                path: path.to_owned(),
            });
        }

        Ok(())
    }
}

/// In-memory object store for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
}

#[derive(Debug, Clone)]
struct StoredObject {
    content_type: String,
    bytes: Vec<u8>,
}

impl MemoryObjectStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object, as if it had been uploaded earlier.
    pub async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) {
        self.objects.write().await.insert(
            path.to_owned(),
            StoredObject {
                content_type: content_type.to_owned(),
                bytes,
            },
        );
    }

    /// Bytes stored at `path`, if any.
    pub async fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(path)
            .map(|o| o.bytes.clone())
    }

    /// Content type stored at `path`, if any.
    pub async fn content_type(&self, path: &str) -> Option<String> {
        self.objects
            .read()
            .await
            .get(path)
            .map(|o| o.content_type.clone())
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Whether the store holds no objects.
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn download(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        self.get(path)
            .await
            .ok_or_else(|| StorageError::NotFound(path.to_owned()))
    }

    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.put(path, bytes, content_type).await;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url_shape() {
        let client = StorageClient::new(
            "https://storage.forgeline.pk".to_owned(),
            "product-images".to_owned(),
            SecretString::from("key"),
        );
        assert_eq!(
            client.public_url("originals/wolf.jpg"),
            "https://storage.forgeline.pk/storage/v1/object/public/product-images/originals/wolf.jpg"
        );
    }

    #[test]
    fn test_debug_redacts_service_key() {
        let client = StorageClient::new(
            "https://storage.forgeline.pk".to_owned(),
            "product-images".to_owned(),
            SecretString::from("super-secret-key"),
        );
        let debug = format!("{client:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret-key"));
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryObjectStore::new();
        store
            .upload("thumbnail/p1/wolf.webp", vec![1, 2, 3], "image/webp")
            .await
            .unwrap();

        assert_eq!(
            store.download("thumbnail/p1/wolf.webp").await.unwrap(),
            vec![1, 2, 3]
        );
        assert_eq!(
            store.content_type("thumbnail/p1/wolf.webp").await.as_deref(),
            Some("image/webp")
        );
    }

    #[tokio::test]
    async fn test_memory_store_upload_replaces() {
        let store = MemoryObjectStore::new();
        store.put("a.webp", vec![1], "image/webp").await;
        store
            .upload("a.webp", vec![2, 2], "image/webp")
            .await
            .unwrap();

        assert_eq!(store.download("a.webp").await.unwrap(), vec![2, 2]);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_memory_store_missing_object() {
        let store = MemoryObjectStore::new();
        let err = store.download("missing.jpg").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }
}
