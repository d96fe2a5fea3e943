//! Cache types for catalog reads.
//!
//! Every key class carries its own TTL, applied through a moka
//! [`Expiry`] hook when the entry is inserted. Volatile data (listing
//! pages) expires quickly; near-static data (category tree) lives for
//! an hour.

use std::time::{Duration, Instant};

use moka::Expiry;
use moka::future::Cache;

use forgeline_core::{CategoryId, ProductId};

use crate::models::{
    CategorySummary, CategoryTile, FilterAttribute, HomepageContent, ProductCard, ProductDetail,
    ProductListPage, ReviewsResult,
};

/// Maximum cached entries across all key classes.
const CACHE_CAPACITY: u64 = 1000;

/// Cache key for catalog responses.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    HomepageContent,
    HomepageCategories,
    FeaturedProducts,
    Bestsellers,
    /// Canonical listing parameter string, see `ListParams::cache_suffix`.
    ProductList(String),
    /// Product slug.
    ProductDetail(String),
    ProductReviews(ProductId),
    RelatedProducts {
        category_id: CategoryId,
        exclude: ProductId,
    },
    FilterCategories,
    /// Category slug, or `all` when unfiltered.
    FilterAttributes(String),
}

impl CacheKey {
    /// How long entries under this key stay fresh.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        match self {
            Self::HomepageContent | Self::FeaturedProducts => Duration::from_secs(30 * 60),
            Self::HomepageCategories | Self::Bestsellers | Self::FilterCategories => {
                Duration::from_secs(60 * 60)
            }
            Self::ProductList(_) => Duration::from_secs(5 * 60),
            Self::ProductDetail(_)
            | Self::RelatedProducts { .. }
            | Self::FilterAttributes(_) => Duration::from_secs(10 * 60),
            Self::ProductReviews(_) => Duration::from_secs(15 * 60),
        }
    }
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    HomepageContent(HomepageContent),
    CategoryTiles(Vec<CategoryTile>),
    ProductCards(Vec<ProductCard>),
    ProductList(ProductListPage),
    ProductDetail(Box<ProductDetail>),
    Reviews(ReviewsResult),
    Categories(Vec<CategorySummary>),
    Attributes(Vec<FilterAttribute>),
}

/// Applies each key's TTL at insert time.
struct CatalogExpiry;

impl Expiry<CacheKey, CacheValue> for CatalogExpiry {
    fn expire_after_create(
        &self,
        key: &CacheKey,
        _value: &CacheValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(key.ttl())
    }
}

/// Build the catalog cache with per-key expiry.
#[must_use]
pub fn build_cache() -> Cache<CacheKey, CacheValue> {
    Cache::builder()
        .max_capacity(CACHE_CAPACITY)
        .expire_after(CatalogExpiry)
        .build()
}
