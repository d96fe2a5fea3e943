//! Image derivative pipeline.
//!
//! Product photography is uploaded once as an original; this pipeline
//! turns it into everything the storefront serves: a blurhash
//! placeholder plus thumbnail (150), medium (600), and large (1200)
//! WebP derivatives, all center-cropped squares.
//!
//! Claiming an image flips `processing_status` from `pending` or
//! `failed` to `processing` in a single compare-and-set UPDATE, so
//! concurrent triggers for the same image get a clean decline instead of
//! racing through the work twice. After a claim, any failure marks the
//! row `failed` with the error message; derivatives uploaded before the
//! failure stay in storage and are overwritten on the next attempt.

pub mod encode;

use std::sync::Arc;

use async_trait::async_trait;
use image::GenericImageView;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, instrument};

use forgeline_core::{ImageId, ProductId};

use crate::db::RepositoryError;
use crate::storage::ObjectStore;

use self::encode::{LARGE_EDGE, MEDIUM_EDGE, THUMBNAIL_EDGE, WEBP_CONTENT_TYPE};

/// Image row claimed for processing.
#[derive(Debug, Clone)]
pub struct PendingImage {
    pub id: ImageId,
    pub product_id: ProductId,
    /// Path of the original upload within the bucket.
    pub storage_path: String,
}

/// Derivative paths written back on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivativeSet {
    pub thumbnail_path: String,
    pub medium_path: String,
    pub large_path: String,
}

/// Source image facts recorded alongside the derivatives.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SourceMetadata {
    pub original_width: i32,
    pub original_height: i32,
    pub file_size_bytes: i64,
}

/// Result of a successful pipeline run.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub blurhash: String,
    pub derivatives: DerivativeSet,
    pub metadata: SourceMetadata,
}

/// Persistence operations the pipeline needs on `product_images` rows.
#[async_trait]
pub trait ImageRecords: Send + Sync {
    /// Atomically claim the image if it is `pending` or `failed`, moving
    /// it to `processing`. Returns `None` when the row is absent, already
    /// being processed, or completed.
    async fn claim(&self, id: ImageId) -> Result<Option<PendingImage>, RepositoryError>;

    /// Record success: derivative paths, blurhash, metadata, status `completed`.
    async fn complete(
        &self,
        id: ImageId,
        processed: &ProcessedImage,
    ) -> Result<(), RepositoryError>;

    /// Record failure: status `failed` plus the error message.
    async fn fail(&self, id: ImageId, message: &str) -> Result<(), RepositoryError>;
}

/// Errors from a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The claim was declined; another run owns the image or it is done.
    #[error("image {0} is already being processed or completed")]
    AlreadyClaimed(ImageId),

    /// Reading or writing pipeline state failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Processing failed after the claim; the image row is marked failed.
    #[error("image processing failed: {0}")]
    Processing(String),
}

/// The derivative pipeline: claim, download, encode, upload, record.
#[derive(Clone)]
pub struct ImagePipeline {
    store: Arc<dyn ObjectStore>,
    records: Arc<dyn ImageRecords>,
}

impl ImagePipeline {
    /// Create a pipeline over a blob store and an image record store.
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>, records: Arc<dyn ImageRecords>) -> Self {
        Self { store, records }
    }

    /// Run the full pipeline for one image.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::AlreadyClaimed` when the compare-and-set
    /// claim is declined, `PipelineError::Processing` when any step after
    /// the claim fails (the row is marked `failed` first), and
    /// `PipelineError::Repository` when pipeline state cannot be read or
    /// written.
    #[instrument(skip(self), fields(image_id = %image_id))]
    pub async fn process(&self, image_id: ImageId) -> Result<ProcessedImage, PipelineError> {
        let Some(pending) = self.records.claim(image_id).await? else {
            info!("image claim declined");
            return Err(PipelineError::AlreadyClaimed(image_id));
        };

        match self.run(&pending).await {
            Ok(processed) => {
                self.records.complete(image_id, &processed).await?;
                info!(blurhash = %processed.blurhash, "image processing completed");
                Ok(processed)
            }
            Err(message) => {
                error!(%message, "image processing failed");
                // The processing failure is what callers see; a bookkeeping
                // failure on top of it only gets logged.
                if let Err(record_err) = self.records.fail(image_id, &message).await {
                    error!(error = %record_err, "could not record image failure");
                }
                Err(PipelineError::Processing(message))
            }
        }
    }

    async fn run(&self, pending: &PendingImage) -> Result<ProcessedImage, String> {
        let bytes = self
            .store
            .download(&pending.storage_path)
            .await
            .map_err(|e| e.to_string())?;
        let file_size_bytes = i64::try_from(bytes.len()).unwrap_or(i64::MAX);

        let source = encode::decode_source(&bytes).map_err(|e| e.to_string())?;
        let (width, height) = source.dimensions();

        let blurhash = encode::blurhash_preview(&source).map_err(|e| e.to_string())?;

        let thumbnail_path =
            encode::variant_object_path("thumbnail", pending.product_id, &pending.storage_path);
        let medium_path =
            encode::variant_object_path("medium", pending.product_id, &pending.storage_path);
        let large_path =
            encode::variant_object_path("large", pending.product_id, &pending.storage_path);

        let thumbnail = encode::webp_cover(&source, THUMBNAIL_EDGE, THUMBNAIL_EDGE);
        self.store
            .upload(&thumbnail_path, thumbnail, WEBP_CONTENT_TYPE)
            .await
            .map_err(|e| e.to_string())?;

        let medium = encode::webp_cover(&source, MEDIUM_EDGE, MEDIUM_EDGE);
        self.store
            .upload(&medium_path, medium, WEBP_CONTENT_TYPE)
            .await
            .map_err(|e| e.to_string())?;

        let large = encode::webp_cover(&source, LARGE_EDGE, LARGE_EDGE);
        self.store
            .upload(&large_path, large, WEBP_CONTENT_TYPE)
            .await
            .map_err(|e| e.to_string())?;

        Ok(ProcessedImage {
            blurhash,
            derivatives: DerivativeSet {
                thumbnail_path,
                medium_path,
                large_path,
            },
            metadata: SourceMetadata {
                original_width: i32::try_from(width).unwrap_or(i32::MAX),
                original_height: i32::try_from(height).unwrap_or(i32::MAX),
                file_size_bytes,
            },
        })
    }
}
