//! CLI command implementations.

pub mod images;
pub mod migrate;

use secrecy::SecretString;
use sqlx::PgPool;

/// Errors shared by CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Repository error: {0}")]
    Repository(#[from] forgeline_storefront::db::RepositoryError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] forgeline_storefront::images::PipelineError),
}

/// Connect to the storefront database using `STOREFRONT_DATABASE_URL`,
/// falling back to `DATABASE_URL`.
pub(crate) async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("STOREFRONT_DATABASE_URL"))?;

    Ok(forgeline_storefront::db::create_pool(&database_url).await?)
}
