//! Homepage route handler.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use crate::models::{CategoryTile, HomepageContent, ProductCard};
use crate::state::AppState;

/// Aggregated homepage payload: merchandising content, the category
/// grid, and both product rails.
#[derive(Debug, Serialize)]
pub struct HomePayload {
    pub content: HomepageContent,
    pub categories: Vec<CategoryTile>,
    pub featured: Vec<ProductCard>,
    pub bestsellers: Vec<ProductCard>,
}

/// Homepage payload.
///
/// Each section degrades independently: a failed query logs and falls
/// back to defaults (or an empty rail) instead of failing the page.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Json<HomePayload> {
    let catalog = state.catalog();

    let content = catalog.homepage_content().await.unwrap_or_else(|e| {
        tracing::error!("Failed to load homepage content: {e}");
        HomepageContent::default()
    });

    let categories = catalog.homepage_categories().await.unwrap_or_else(|e| {
        tracing::error!("Failed to load homepage categories: {e}");
        Vec::new()
    });

    let featured = catalog.featured_products().await.unwrap_or_else(|e| {
        tracing::error!("Failed to load featured products: {e}");
        Vec::new()
    });

    let bestsellers = catalog.bestsellers().await.unwrap_or_else(|e| {
        tracing::error!("Failed to load bestsellers: {e}");
        Vec::new()
    });

    Json(HomePayload {
        content,
        categories,
        featured,
        bestsellers,
    })
}
