//! HTTP route handlers for the storefront JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (database ping)
//!
//! GET  /api/home                    - Homepage payload (hero, categories, rails)
//!
//! # Products
//! GET  /api/products                - Filtered product listing
//! GET  /api/products/categories     - Category list for the filter sidebar
//! GET  /api/products/attributes     - Attribute axes for the filter sidebar
//! GET  /api/products/{slug}         - Product detail
//! GET  /api/products/{slug}/reviews - Approved reviews plus summary
//! GET  /api/products/{slug}/related - Related product cards
//!
//! # Cart (session-backed)
//! GET  /api/cart                    - Current cart with totals
//! POST /api/cart/add                - Add a variant (merges quantities)
//! POST /api/cart/update             - Set line quantity (0 removes)
//! POST /api/cart/remove             - Remove a line
//! POST /api/cart/clear              - Empty the cart
//! GET  /api/cart/count              - Item count for the header badge
//!
//! # Checkout
//! POST /api/checkout                - Place a cash-on-delivery order
//! GET  /api/orders/{id}             - Order confirmation summary
//!
//! # Marketing
//! POST /api/newsletter              - Newsletter opt-in
//! POST /api/custom-orders           - Custom piece request
//!
//! # Back-office hooks
//! POST /api/images/process          - Run the derivative pipeline for an upload
//! POST /api/webhooks/order-status   - Order row-change events from the database
//! ```

pub mod cart;
pub mod checkout;
pub mod custom_orders;
pub mod home;
pub mod images;
pub mod newsletter;
pub mod products;
pub mod webhooks;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/categories", get(products::categories))
        .route("/attributes", get(products::attributes))
        .route("/{slug}", get(products::show))
        .route("/{slug}/reviews", get(products::reviews))
        .route("/{slug}/related", get(products::related))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create all routes for the storefront, mounted under `/api`.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        // Homepage payload
        .route("/home", get(home::show))
        // Product routes
        .nest("/products", product_routes())
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout and confirmation
        .route("/checkout", post(checkout::submit))
        .route("/orders/{id}", get(checkout::confirmation))
        // Marketing
        .route("/newsletter", post(newsletter::subscribe))
        .route("/custom-orders", post(custom_orders::submit))
        // Back-office hooks
        .route("/images/process", post(images::process))
        .route("/webhooks/order-status", post(webhooks::order_status));

    Router::new().nest("/api", api)
}
