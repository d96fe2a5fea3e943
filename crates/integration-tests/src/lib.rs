//! Integration tests for the Forgeline storefront API.
//!
//! These tests drive a running storefront over HTTP and are `#[ignore]`d
//! by default. To run them:
//!
//! ```bash
//! # Start the database and run migrations
//! docker compose up -d postgres
//! cargo run -p forgeline-cli -- migrate
//!
//! # Start the storefront
//! cargo run -p forgeline-storefront
//!
//! # Run the ignored tests against it
//! cargo test -p forgeline-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_BASE_URL` - Storefront origin (default: <http://localhost:3000>)
//! - `ORDER_WEBHOOK_SECRET` - Enables the authorized webhook test when set

use reqwest::Client;

/// Base URL of the storefront under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// HTTP client with a cookie store, so the session cookie set on the
/// first cart request is carried on subsequent ones.
///
/// # Panics
///
/// Panics if the client cannot be constructed.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}
