//! Cached catalog reads.
//!
//! [`Catalog`] wraps [`CatalogRepository`] behind an in-process moka
//! cache so hot storefront pages (homepage, listings, product detail)
//! do not hit Postgres on every request. TTLs are per key class, see
//! [`cache::CacheKey::ttl`]. The service is cheap to clone and shared
//! through application state.

mod cache;

use std::sync::Arc;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::{debug, instrument, warn};

use forgeline_core::{CategoryId, ProductId};

use crate::db::{CatalogRepository, RepositoryError};
use crate::models::{
    CategorySummary, CategoryTile, FilterAttribute, HomepageContent, ListParams, ProductCard,
    ProductDetail, ProductListPage, ReviewsResult,
};

use self::cache::{CacheKey, CacheValue, build_cache};

/// Catalog read service with in-process caching.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    pool: PgPool,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("cached_entries", &self.inner.cache.entry_count())
            .finish_non_exhaustive()
    }
}

impl Catalog {
    /// Create a catalog service over the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            inner: Arc::new(CatalogInner {
                pool,
                cache: build_cache(),
            }),
        }
    }

    fn repository(&self) -> CatalogRepository<'_> {
        CatalogRepository::new(&self.inner.pool)
    }

    /// Hero and promo banner content for the homepage.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    #[instrument(skip(self))]
    pub async fn homepage_content(&self) -> Result<HomepageContent, RepositoryError> {
        let key = CacheKey::HomepageContent;
        if let Some(CacheValue::HomepageContent(content)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for homepage content");
            return Ok(content);
        }

        let content = self.repository().homepage_content().await?;
        self.inner
            .cache
            .insert(key, CacheValue::HomepageContent(content.clone()))
            .await;
        Ok(content)
    }

    /// Top-level visible categories for the homepage grid.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    #[instrument(skip(self))]
    pub async fn homepage_categories(&self) -> Result<Vec<CategoryTile>, RepositoryError> {
        let key = CacheKey::HomepageCategories;
        if let Some(CacheValue::CategoryTiles(tiles)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for homepage categories");
            return Ok(tiles);
        }

        let tiles = self.repository().homepage_categories().await?;
        self.inner
            .cache
            .insert(key, CacheValue::CategoryTiles(tiles.clone()))
            .await;
        Ok(tiles)
    }

    /// Featured product rail.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    #[instrument(skip(self))]
    pub async fn featured_products(&self) -> Result<Vec<ProductCard>, RepositoryError> {
        let key = CacheKey::FeaturedProducts;
        if let Some(CacheValue::ProductCards(cards)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for featured products");
            return Ok(cards);
        }

        let cards = self.repository().featured_products().await?;
        self.inner
            .cache
            .insert(key, CacheValue::ProductCards(cards.clone()))
            .await;
        Ok(cards)
    }

    /// Bestseller rail, ranked by units sold.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    #[instrument(skip(self))]
    pub async fn bestsellers(&self) -> Result<Vec<ProductCard>, RepositoryError> {
        let key = CacheKey::Bestsellers;
        if let Some(CacheValue::ProductCards(cards)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for bestsellers");
            return Ok(cards);
        }

        let cards = self.repository().bestsellers().await?;
        self.inner
            .cache
            .insert(key, CacheValue::ProductCards(cards.clone()))
            .await;
        Ok(cards)
    }

    /// One page of the filtered product listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or baseline
    /// attribute values are missing.
    #[instrument(skip(self, params), fields(params = %params.cache_suffix()))]
    pub async fn list(&self, params: &ListParams) -> Result<ProductListPage, RepositoryError> {
        let key = CacheKey::ProductList(params.cache_suffix());
        if let Some(CacheValue::ProductList(page)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product list");
            return Ok(page);
        }

        let page = self.repository().list(params).await?;
        self.inner
            .cache
            .insert(key, CacheValue::ProductList(page.clone()))
            .await;
        Ok(page)
    }

    /// Full product detail by slug. `None` when no such product exists.
    ///
    /// Only found products are cached, so a miss stays a cheap lookup
    /// and a product that appears later is picked up immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn product_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<ProductDetail>, RepositoryError> {
        let key = CacheKey::ProductDetail(slug.to_owned());
        if let Some(CacheValue::ProductDetail(detail)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product detail");
            return Ok(Some(*detail));
        }

        let Some(detail) = self.repository().product_by_slug(slug).await? else {
            return Ok(None);
        };
        self.inner
            .cache
            .insert(key, CacheValue::ProductDetail(Box::new(detail.clone())))
            .await;
        Ok(Some(detail))
    }

    /// Latest approved reviews plus the rating summary for a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn reviews(&self, product_id: ProductId) -> Result<ReviewsResult, RepositoryError> {
        let key = CacheKey::ProductReviews(product_id);
        if let Some(CacheValue::Reviews(reviews)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product reviews");
            return Ok(reviews);
        }

        let reviews = self.repository().reviews(product_id).await?;
        self.inner
            .cache
            .insert(key, CacheValue::Reviews(reviews.clone()))
            .await;
        Ok(reviews)
    }

    /// Other active products in the same category.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    #[instrument(skip(self), fields(category_id = %category_id, exclude = %exclude))]
    pub async fn related_products(
        &self,
        category_id: CategoryId,
        exclude: ProductId,
    ) -> Result<Vec<ProductCard>, RepositoryError> {
        let key = CacheKey::RelatedProducts {
            category_id,
            exclude,
        };
        if let Some(CacheValue::ProductCards(cards)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for related products");
            return Ok(cards);
        }

        let cards = self
            .repository()
            .related_products(category_id, exclude)
            .await?;
        self.inner
            .cache
            .insert(key, CacheValue::ProductCards(cards.clone()))
            .await;
        Ok(cards)
    }

    /// All visible categories for the listing filter sidebar.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    #[instrument(skip(self))]
    pub async fn filter_categories(&self) -> Result<Vec<CategorySummary>, RepositoryError> {
        let key = CacheKey::FilterCategories;
        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for filter categories");
            return Ok(categories);
        }

        let categories = self.repository().filter_categories().await?;
        self.inner
            .cache
            .insert(key, CacheValue::Categories(categories.clone()))
            .await;
        Ok(categories)
    }

    /// Filterable attribute names and values.
    ///
    /// Attribute filters are decoration on the listing page, so a
    /// failed lookup degrades to an empty list instead of failing the
    /// whole page.
    #[instrument(skip(self))]
    pub async fn filter_attributes(&self, category: Option<&str>) -> Vec<FilterAttribute> {
        let key = CacheKey::FilterAttributes(category.unwrap_or("all").to_owned());
        if let Some(CacheValue::Attributes(attributes)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for filter attributes");
            return attributes;
        }

        match self.repository().filter_attributes().await {
            Ok(attributes) => {
                self.inner
                    .cache
                    .insert(key, CacheValue::Attributes(attributes.clone()))
                    .await;
                attributes
            }
            Err(e) => {
                warn!("Failed to load filter attributes: {e}");
                Vec::new()
            }
        }
    }
}
