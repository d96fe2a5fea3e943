//! Catalog view models served by the JSON API.
//!
//! These are the shapes handlers return after repositories have joined
//! and flattened the underlying rows. Prices are [`Price`] throughout;
//! raw `NUMERIC` values never leave the db layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use forgeline_core::{CategoryId, ImageId, Price, ProductId, ReviewId, VariantId};

/// Fallback hero copy when `homepage_config` is empty.
pub const DEFAULT_HERO_HEADLINE: &str = "Shop the Latest Collection";
/// Fallback hero subheadline.
pub const DEFAULT_HERO_SUBHEADLINE: &str = "Free shipping on orders over Rs. 5,000";
/// Fallback hero call-to-action label.
pub const DEFAULT_HERO_CTA_TEXT: &str = "Shop Now";
/// Fallback hero call-to-action link.
pub const DEFAULT_HERO_CTA_LINK: &str = "/products";
/// Fallback promo banner background.
pub const DEFAULT_PROMO_BG_COLOR: &str = "#000000";

/// Hero section content for the homepage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroContent {
    pub headline: String,
    pub subheadline: String,
    pub cta_text: String,
    pub cta_link: String,
    pub image_path: Option<String>,
}

impl Default for HeroContent {
    fn default() -> Self {
        Self {
            headline: DEFAULT_HERO_HEADLINE.to_owned(),
            subheadline: DEFAULT_HERO_SUBHEADLINE.to_owned(),
            cta_text: DEFAULT_HERO_CTA_TEXT.to_owned(),
            cta_link: DEFAULT_HERO_CTA_LINK.to_owned(),
            image_path: None,
        }
    }
}

/// Dismissible promo banner above the header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoBanner {
    pub is_active: bool,
    pub headline: String,
    pub subheadline: String,
    pub cta_text: String,
    pub cta_link: String,
    pub background_color: String,
}

impl Default for PromoBanner {
    fn default() -> Self {
        Self {
            is_active: false,
            headline: String::new(),
            subheadline: String::new(),
            cta_text: String::new(),
            cta_link: String::new(),
            background_color: DEFAULT_PROMO_BG_COLOR.to_owned(),
        }
    }
}

/// Merchandising content for the homepage (hero + promo banner).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HomepageContent {
    pub hero: HeroContent,
    pub promo: PromoBanner,
}

/// Category tile shown in the homepage grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryTile {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub image_path: Option<String>,
    pub product_count: i32,
}

/// Category entry for the filter sidebar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<CategoryId>,
}

/// Minimal category reference embedded in product payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

/// Primary gallery image for a product card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRef {
    pub storage_path: String,
    pub alt_text: Option<String>,
    pub blurhash: Option<String>,
}

/// Product card for homepage rails (featured, bestsellers, related).
///
/// `price` is the cheapest variant price (zero when the product has no
/// variants yet); `compare_at_price` is the highest struck-through price
/// across variants, if any variant carries one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCard {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub image: Option<ImageRef>,
    pub price: Price,
    pub compare_at_price: Option<Price>,
}

/// Sort orders accepted by the product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductSort {
    PriceAsc,
    PriceDesc,
    Popularity,
    #[default]
    Newest,
}

impl ProductSort {
    /// SQL `ORDER BY` clause for this sort. Price sorts apply to the
    /// baseline variant; popularity and newest sort on the product.
    #[must_use]
    pub const fn order_clause(self) -> &'static str {
        match self {
            Self::PriceAsc => "v.price ASC",
            Self::PriceDesc => "v.price DESC",
            Self::Popularity => "p.total_sold DESC",
            Self::Newest => "p.created_at DESC",
        }
    }

    /// Stable label used in cache keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::Popularity => "popularity",
            Self::Newest => "newest",
        }
    }
}

/// Normalized listing parameters after defaults and clamping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub category: Option<String>,
    pub min_price: Option<Price>,
    pub max_price: Option<Price>,
    pub sort: ProductSort,
    pub page: u32,
    pub limit: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            category: None,
            min_price: None,
            max_price: None,
            sort: ProductSort::default(),
            page: 1,
            limit: 24,
        }
    }
}

impl ListParams {
    /// Canonical cache-key suffix. Every field participates so distinct
    /// parameter combinations never share an entry.
    #[must_use]
    pub fn cache_suffix(&self) -> String {
        format!(
            "cat={}|min={}|max={}|sort={}|page={}|limit={}",
            self.category.as_deref().unwrap_or(""),
            self.min_price
                .map(|p| p.amount().to_string())
                .unwrap_or_default(),
            self.max_price
                .map(|p| p.amount().to_string())
                .unwrap_or_default(),
            self.sort.as_str(),
            self.page,
            self.limit,
        )
    }
}

/// One row of the product listing: the baseline variant plus its product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductListItem {
    pub variant_id: VariantId,
    pub sku: String,
    pub price: Price,
    pub compare_at_price: Option<Price>,
    pub product_id: ProductId,
    pub name: String,
    pub slug: String,
    pub category: Option<CategoryRef>,
    pub image: Option<ImageRef>,
    pub quantity_available: i32,
}

/// A page of listing results with pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductListPage {
    pub items: Vec<ProductListItem>,
    pub total_count: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

/// Gallery image on the product detail page, including derivative paths
/// once the image pipeline has run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailImage {
    pub id: ImageId,
    pub storage_path: String,
    pub alt_text: Option<String>,
    pub display_order: i32,
    pub variant_id: Option<VariantId>,
    pub blurhash: Option<String>,
    pub thumbnail_path: Option<String>,
    pub medium_path: Option<String>,
    pub large_path: Option<String>,
}

/// Sellable variant on the product detail page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailVariant {
    pub id: VariantId,
    pub sku: String,
    pub price: Price,
    pub compare_at_price: Option<Price>,
    pub material: String,
    pub size: String,
    pub thickness: String,
    pub quantity_available: i32,
}

/// Full product detail payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDetail {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub seo_description: Option<String>,
    pub status: String,
    pub category: CategoryRef,
    pub images: Vec<DetailImage>,
    pub variants: Vec<DetailVariant>,
}

/// A published customer review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub rating: i32,
    pub title: Option<String>,
    pub body: Option<String>,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Count of reviews at one star level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingCount {
    pub star: i32,
    pub count: i64,
}

/// Aggregate rating stats, distribution listed five stars first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub total_count: i64,
    pub average_rating: f64,
    pub distribution: Vec<RatingCount>,
}

/// Reviews payload: latest approved reviews plus the aggregate summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewsResult {
    pub reviews: Vec<Review>,
    pub summary: ReviewSummary,
}

/// One attribute axis and its distinct values, for the filter sidebar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterAttribute {
    pub name: String,
    pub values: Vec<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use forgeline_core::Price;

    #[test]
    fn test_sort_defaults_to_newest() {
        assert_eq!(ProductSort::default(), ProductSort::Newest);
    }

    #[test]
    fn test_sort_deserializes_kebab_case() {
        let sort: ProductSort = serde_json::from_str("\"price-asc\"").unwrap();
        assert_eq!(sort, ProductSort::PriceAsc);
        let sort: ProductSort = serde_json::from_str("\"popularity\"").unwrap();
        assert_eq!(sort, ProductSort::Popularity);
    }

    #[test]
    fn test_order_clause_covers_all_sorts() {
        assert_eq!(ProductSort::PriceAsc.order_clause(), "v.price ASC");
        assert_eq!(ProductSort::PriceDesc.order_clause(), "v.price DESC");
        assert_eq!(ProductSort::Popularity.order_clause(), "p.total_sold DESC");
        assert_eq!(ProductSort::Newest.order_clause(), "p.created_at DESC");
    }

    #[test]
    fn test_cache_suffix_distinguishes_params() {
        let a = ListParams::default();
        let b = ListParams {
            category: Some("geometric".to_owned()),
            ..ListParams::default()
        };
        let c = ListParams {
            min_price: Some(Price::from_rupees(1000)),
            ..ListParams::default()
        };
        assert_ne!(a.cache_suffix(), b.cache_suffix());
        assert_ne!(a.cache_suffix(), c.cache_suffix());
        assert_ne!(b.cache_suffix(), c.cache_suffix());
    }

    #[test]
    fn test_cache_suffix_is_stable() {
        let params = ListParams {
            category: Some("animals".to_owned()),
            min_price: Some(Price::from_rupees(500)),
            max_price: None,
            sort: ProductSort::PriceDesc,
            page: 2,
            limit: 24,
        };
        assert_eq!(
            params.cache_suffix(),
            "cat=animals|min=500|max=|sort=price-desc|page=2|limit=24"
        );
    }

    #[test]
    fn test_hero_defaults_match_storefront_copy() {
        let hero = HeroContent::default();
        assert_eq!(hero.headline, "Shop the Latest Collection");
        assert_eq!(hero.cta_link, "/products");
        assert!(hero.image_path.is_none());
    }

    #[test]
    fn test_promo_defaults_inactive() {
        let promo = PromoBanner::default();
        assert!(!promo.is_active);
        assert_eq!(promo.background_color, "#000000");
    }
}
