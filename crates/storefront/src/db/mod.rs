//! Database operations for the storefront `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `categories` - Browsable groupings (tree via `parent_id`)
//! - `products` / `product_images` - Catalog entries and their gallery images
//! - `product_attributes` / `product_attribute_values` - Material, size, thickness axes
//! - `product_variants` / `inventory` - Sellable configurations and live stock
//! - `orders` / `order_items` - Immutable order snapshots (written by `create_order`)
//! - `custom_orders` - Bespoke piece requests from the customize form
//! - `newsletter_subscribers` - Marketing opt-ins (unique email)
//! - `homepage_config` - Singleton merchandising row (hero + promo banner)
//! - `reviews` - Customer reviews; only approved rows are public
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p forgeline-cli -- migrate
//! ```

pub mod catalog;
pub mod custom_orders;
pub mod images;
pub mod newsletter;
pub mod orders;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use catalog::CatalogRepository;
pub use custom_orders::CustomOrderRepository;
pub use images::ImageRepository;
pub use newsletter::NewsletterRepository;
pub use orders::OrderRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Convert a stored `NUMERIC` into a [`forgeline_core::Price`], flagging
/// negative values as corruption.
pub(crate) fn decimal_to_price(
    value: rust_decimal::Decimal,
) -> Result<forgeline_core::Price, RepositoryError> {
    forgeline_core::Price::new(value)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid price in database: {e}")))
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
