//! Image pipeline management commands.
//!
//! The storefront never retries a failed pipeline run on its own; these
//! commands are the manual retry path. `pending` shows what is waiting,
//! `reprocess` claims and runs one image through the pipeline.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`)
//! - `STORAGE_URL` - Object storage base URL
//! - `STORAGE_SERVICE_KEY` - Object storage service key
//! - `STORAGE_BUCKET` - Bucket holding product images (default: product-images)

use std::sync::Arc;

use secrecy::SecretString;

use forgeline_core::ImageId;
use forgeline_storefront::db::ImageRepository;
use forgeline_storefront::images::ImagePipeline;
use forgeline_storefront::storage::StorageClient;

use super::{CommandError, connect};

/// List images whose pipeline run is pending or failed, oldest first.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the query fails.
pub async fn pending() -> Result<(), CommandError> {
    let pool = connect().await?;
    let images = ImageRepository::new(pool).list_unprocessed().await?;

    if images.is_empty() {
        tracing::info!("No pending or failed images");
        return Ok(());
    }

    #[allow(clippy::print_stdout)]
    {
        println!("{:<38} {:<12} {}", "IMAGE ID", "STATUS", "STORAGE PATH");
        for image in &images {
            println!(
                "{:<38} {:<12} {}",
                image.id, image.processing_status, image.storage_path
            );
            if let Some(error) = &image.processing_error {
                println!("{:38} {:12} error: {error}", "", "");
            }
        }
        println!("\n{} image(s) awaiting processing", images.len());
    }

    Ok(())
}

/// Run the derivative pipeline for one image.
///
/// # Errors
///
/// Returns an error when the id is not a UUID, the claim is declined
/// (image absent, already processing, or completed), or the run fails.
pub async fn reprocess(image_id: &str) -> Result<(), CommandError> {
    let image_id: ImageId = image_id
        .parse()
        .map_err(|_| CommandError::InvalidArgument(format!("invalid image id: {image_id}")))?;

    let pool = connect().await?;
    let storage = storage_client()?;
    let pipeline = ImagePipeline::new(
        Arc::new(storage),
        Arc::new(ImageRepository::new(pool)),
    );

    tracing::info!(%image_id, "Running image pipeline...");
    let processed = pipeline.process(image_id).await?;

    tracing::info!(
        blurhash = %processed.blurhash,
        thumbnail = %processed.derivatives.thumbnail_path,
        medium = %processed.derivatives.medium_path,
        large = %processed.derivatives.large_path,
        "Image processed"
    );
    Ok(())
}

/// Build the storage client from environment variables.
fn storage_client() -> Result<StorageClient, CommandError> {
    let url =
        std::env::var("STORAGE_URL").map_err(|_| CommandError::MissingEnvVar("STORAGE_URL"))?;
    let service_key = std::env::var("STORAGE_SERVICE_KEY")
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("STORAGE_SERVICE_KEY"))?;
    let bucket =
        std::env::var("STORAGE_BUCKET").unwrap_or_else(|_| "product-images".to_string());

    Ok(StorageClient::new(url, bucket, service_key))
}
