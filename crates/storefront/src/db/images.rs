//! Image pipeline state on `product_images` rows.
//!
//! The claim is a single compare-and-set UPDATE: only `pending` and
//! `failed` rows can move to `processing`, so concurrent pipeline runs
//! for the same image resolve in the database, not in application locks.

use async_trait::async_trait;
use sqlx::PgPool;

use forgeline_core::{ImageId, ImageProcessingStatus, ProductId};

use super::RepositoryError;
use crate::images::{ImageRecords, PendingImage, ProcessedImage};

#[derive(sqlx::FromRow)]
struct ClaimedRow {
    id: ImageId,
    product_id: ProductId,
    storage_path: String,
}

/// Pipeline status row for operational tooling.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UnprocessedImage {
    pub id: ImageId,
    pub product_id: ProductId,
    pub storage_path: String,
    pub processing_status: ImageProcessingStatus,
    pub processing_error: Option<String>,
}

/// Repository for image pipeline state.
///
/// Owns its pool (cheap clone) so it can sit behind `Arc<dyn ImageRecords>`
/// in application state.
#[derive(Debug, Clone)]
pub struct ImageRepository {
    pool: PgPool,
}

impl ImageRepository {
    /// Create a new image repository.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Images that still need a pipeline run: `pending` plus `failed`,
    /// oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_unprocessed(&self) -> Result<Vec<UnprocessedImage>, RepositoryError> {
        let rows = sqlx::query_as::<_, UnprocessedImage>(
            r"
            SELECT id, product_id, storage_path, processing_status, processing_error
            FROM product_images
            WHERE processing_status IN ('pending', 'failed')
            ORDER BY created_at
            ",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl ImageRecords for ImageRepository {
    async fn claim(&self, id: ImageId) -> Result<Option<PendingImage>, RepositoryError> {
        let row = sqlx::query_as::<_, ClaimedRow>(
            r"
            UPDATE product_images
            SET processing_status = 'processing',
                processing_error = NULL,
                updated_at = NOW()
            WHERE id = $1 AND processing_status IN ('pending', 'failed')
            RETURNING id, product_id, storage_path
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| PendingImage {
            id: r.id,
            product_id: r.product_id,
            storage_path: r.storage_path,
        }))
    }

    async fn complete(
        &self,
        id: ImageId,
        processed: &ProcessedImage,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE product_images
            SET thumbnail_path = $2,
                medium_path = $3,
                large_path = $4,
                blurhash = $5,
                processing_status = 'completed',
                processing_error = NULL,
                original_width = $6,
                original_height = $7,
                file_size_bytes = $8,
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&processed.derivatives.thumbnail_path)
        .bind(&processed.derivatives.medium_path)
        .bind(&processed.derivatives.large_path)
        .bind(&processed.blurhash)
        .bind(processed.metadata.original_width)
        .bind(processed.metadata.original_height)
        .bind(processed.metadata.file_size_bytes)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn fail(&self, id: ImageId, message: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE product_images
            SET processing_status = 'failed',
                processing_error = $2,
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(message)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
