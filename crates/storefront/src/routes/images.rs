//! Image pipeline route handler.
//!
//! The admin upload tool creates the `product_images` row and the
//! original file, then triggers this endpoint. The pipeline claims the
//! row, so a duplicate trigger for the same image gets a 409 instead of
//! racing the first run.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use forgeline_core::ImageId;

use crate::error::AppError;
use crate::images::{DerivativeSet, SourceMetadata};
use crate::state::AppState;

/// Request body naming the image to process.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessImageRequest {
    #[serde(default)]
    pub image_id: Option<ImageId>,
}

/// Pipeline run receipt.
#[derive(Debug, Serialize)]
pub struct ProcessImageResponse {
    pub success: bool,
    pub image_id: ImageId,
    pub blurhash: String,
    pub variants: DerivativeSet,
    pub metadata: SourceMetadata,
}

/// Run the derivative pipeline for one uploaded image.
#[instrument(skip(state, request))]
pub async fn process(
    State(state): State<AppState>,
    Json(request): Json<ProcessImageRequest>,
) -> Result<Json<ProcessImageResponse>, AppError> {
    let Some(image_id) = request.image_id else {
        return Err(AppError::BadRequest("Missing imageId".to_string()));
    };

    let processed = state.pipeline().process(image_id).await?;

    Ok(Json(ProcessImageResponse {
        success: true,
        image_id,
        blurhash: processed.blurhash,
        variants: processed.derivatives,
        metadata: processed.metadata,
    }))
}
