//! Product browsing route handlers.
//!
//! Listing, detail, reviews, related products, and the two filter
//! endpoints the sidebar reads. Everything goes through the cached
//! [`crate::catalog::Catalog`] service.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use forgeline_core::Price;

use crate::error::AppError;
use crate::models::{
    CategorySummary, FilterAttribute, ListParams, ProductCard, ProductDetail, ProductListPage,
    ProductSort, ReviewsResult,
};
use crate::state::AppState;

/// Listing limit when the query does not supply one.
const DEFAULT_PAGE_SIZE: u32 = 24;
/// Upper bound on the `limit` query parameter.
const MAX_PAGE_SIZE: u32 = 100;

/// Raw listing query parameters, before normalization.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ListQuery {
    /// Normalize into [`ListParams`]: clamp paging, drop empty or
    /// non-positive filters, fall back to the default sort on unknown
    /// values.
    fn into_params(self) -> ListParams {
        ListParams {
            category: self.category.filter(|c| !c.trim().is_empty()),
            min_price: self.min_price.as_deref().and_then(parse_price_bound),
            max_price: self.max_price.as_deref().and_then(parse_price_bound),
            sort: self.sort.as_deref().map(parse_sort).unwrap_or_default(),
            page: self.page.unwrap_or(1).max(1),
            limit: self
                .limit
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }
}

/// Parse a price filter bound. Unparseable or non-positive values are
/// treated as absent rather than rejected.
fn parse_price_bound(raw: &str) -> Option<Price> {
    let value: Decimal = raw.trim().parse().ok()?;
    Price::new(value).ok().filter(|p| *p > Price::ZERO)
}

/// Parse a sort parameter, falling back to the default for anything
/// unrecognized.
fn parse_sort(raw: &str) -> ProductSort {
    match raw {
        "price-asc" => ProductSort::PriceAsc,
        "price-desc" => ProductSort::PriceDesc,
        "popularity" => ProductSort::Popularity,
        _ => ProductSort::Newest,
    }
}

/// Product listing with filters, sort, and pagination.
#[instrument(skip(state, query))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ProductListPage>, AppError> {
    let params = query.into_params();
    let page = state.catalog().list(&params).await?;
    Ok(Json(page))
}

/// Visible categories for the filter sidebar.
#[instrument(skip(state))]
pub async fn categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategorySummary>>, AppError> {
    let categories = state.catalog().filter_categories().await?;
    Ok(Json(categories))
}

/// Query parameters for the attribute filter endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct AttributesQuery {
    pub category: Option<String>,
}

/// Attribute axes (material, size, thickness) with their distinct
/// values, optionally scoped to one category.
#[instrument(skip(state))]
pub async fn attributes(
    State(state): State<AppState>,
    Query(query): Query<AttributesQuery>,
) -> Json<Vec<FilterAttribute>> {
    let category = query.category.as_deref().filter(|c| !c.trim().is_empty());
    let attributes = state.catalog().filter_attributes(category).await;
    Json(attributes)
}

/// Product detail by slug.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductDetail>, AppError> {
    let detail = state
        .catalog()
        .product_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
    Ok(Json(detail))
}

/// Approved reviews and the rating summary for a product.
#[instrument(skip(state))]
pub async fn reviews(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ReviewsResult>, AppError> {
    let detail = state
        .catalog()
        .product_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
    let reviews = state.catalog().reviews(detail.id).await?;
    Ok(Json(reviews))
}

/// Product cards from the same category, excluding the product itself.
#[instrument(skip(state))]
pub async fn related(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<ProductCard>>, AppError> {
    let detail = state
        .catalog()
        .product_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
    let related = state
        .catalog()
        .related_products(detail.category.id, detail.id)
        .await?;
    Ok(Json(related))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sort_known_values() {
        assert_eq!(parse_sort("price-asc"), ProductSort::PriceAsc);
        assert_eq!(parse_sort("price-desc"), ProductSort::PriceDesc);
        assert_eq!(parse_sort("popularity"), ProductSort::Popularity);
        assert_eq!(parse_sort("newest"), ProductSort::Newest);
    }

    #[test]
    fn test_parse_sort_falls_back_to_newest() {
        assert_eq!(parse_sort(""), ProductSort::Newest);
        assert_eq!(parse_sort("rating"), ProductSort::Newest);
        assert_eq!(parse_sort("PRICE-ASC"), ProductSort::Newest);
    }

    #[test]
    fn test_parse_price_bound() {
        assert_eq!(parse_price_bound("2500"), Some(Price::from_rupees(2500)));
        assert_eq!(parse_price_bound(" 99.50 ").map(|p| p.amount().to_string()),
            Some("99.50".to_string()));
        assert_eq!(parse_price_bound("0"), None);
        assert_eq!(parse_price_bound("-10"), None);
        assert_eq!(parse_price_bound("abc"), None);
        assert_eq!(parse_price_bound(""), None);
    }

    #[test]
    fn test_into_params_defaults() {
        let params = ListQuery::default().into_params();
        assert_eq!(params, ListParams::default());
    }

    #[test]
    fn test_into_params_clamps_paging() {
        let query = ListQuery {
            page: Some(0),
            limit: Some(500),
            ..ListQuery::default()
        };
        let params = query.into_params();
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, MAX_PAGE_SIZE);

        let query = ListQuery {
            limit: Some(0),
            ..ListQuery::default()
        };
        assert_eq!(query.into_params().limit, 1);
    }

    #[test]
    fn test_into_params_drops_blank_category() {
        let query = ListQuery {
            category: Some("  ".to_string()),
            ..ListQuery::default()
        };
        assert_eq!(query.into_params().category, None);

        let query = ListQuery {
            category: Some("metal-wall-art".to_string()),
            ..ListQuery::default()
        };
        assert_eq!(
            query.into_params().category.as_deref(),
            Some("metal-wall-art")
        );
    }
}
