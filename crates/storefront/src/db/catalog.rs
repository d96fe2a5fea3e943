//! Catalog repository: homepage rails, product listing, detail, reviews.
//!
//! Queries flatten joined rows into the view models in [`crate::models`].
//! The listing works variant-first: every card shows the baseline
//! acrylic / 2x2 / 3mm configuration, so filters and price sorts apply
//! to that variant's price rather than a synthetic product price.

use rust_decimal::Decimal;
use sqlx::PgPool;

use forgeline_core::{CategoryId, ImageId, Price, ProductId, ReviewId, VariantId};

use super::{RepositoryError, decimal_to_price as to_price};
use crate::models::cart::VariantSummary;
use crate::models::catalog::{
    CategoryRef, CategorySummary, CategoryTile, DetailImage, DetailVariant, FilterAttribute,
    HeroContent, HomepageContent, ImageRef, ListParams, ProductCard, ProductDetail,
    ProductListItem, ProductListPage, PromoBanner, RatingCount, Review, ReviewSummary,
    ReviewsResult, DEFAULT_HERO_CTA_LINK, DEFAULT_HERO_CTA_TEXT, DEFAULT_HERO_HEADLINE,
    DEFAULT_HERO_SUBHEADLINE, DEFAULT_PROMO_BG_COLOR,
};

/// Attribute values identifying the baseline variant shown on listing cards.
const BASELINE_MATERIAL: &str = "acrylic";
const BASELINE_SIZE: &str = "2x2";
const BASELINE_THICKNESS: &str = "3";

/// Products shown per homepage rail.
const HOMEPAGE_RAIL_LIMIT: i64 = 8;
/// Approved reviews returned per product.
const REVIEWS_PAGE_LIMIT: i64 = 10;
/// Related products shown under the detail page.
const RELATED_LIMIT: i64 = 4;

/// Shared card projection: product plus primary image and price range.
const CARD_SELECT: &str = r"
    SELECT p.id, p.name, p.slug,
           pi.storage_path AS image_path, pi.alt_text AS image_alt, pi.blurhash AS image_blurhash,
           pr.min_price, pr.max_compare_at
    FROM products p
    LEFT JOIN LATERAL (
        SELECT storage_path, alt_text, blurhash
        FROM product_images
        WHERE product_id = p.id
        ORDER BY display_order
        LIMIT 1
    ) pi ON TRUE
    LEFT JOIN LATERAL (
        SELECT MIN(price) AS min_price, MAX(compare_at_price) AS max_compare_at
        FROM product_variants
        WHERE product_id = p.id
    ) pr ON TRUE
";

#[derive(sqlx::FromRow)]
struct HomepageConfigRow {
    hero_headline: Option<String>,
    hero_subheadline: Option<String>,
    hero_cta_text: Option<String>,
    hero_cta_link: Option<String>,
    hero_image_path: Option<String>,
    promo_is_active: bool,
    promo_headline: Option<String>,
    promo_subheadline: Option<String>,
    promo_cta_text: Option<String>,
    promo_cta_link: Option<String>,
    promo_bg_color: Option<String>,
}

#[derive(sqlx::FromRow)]
struct CategoryTileRow {
    id: CategoryId,
    name: String,
    slug: String,
    image_path: Option<String>,
    product_count: i32,
}

#[derive(sqlx::FromRow)]
struct CategorySummaryRow {
    id: CategoryId,
    name: String,
    slug: String,
    parent_id: Option<CategoryId>,
}

#[derive(sqlx::FromRow)]
struct CardRow {
    id: ProductId,
    name: String,
    slug: String,
    image_path: Option<String>,
    image_alt: Option<String>,
    image_blurhash: Option<String>,
    min_price: Option<Decimal>,
    max_compare_at: Option<Decimal>,
}

#[derive(sqlx::FromRow)]
struct AttributeValueRow {
    attribute: String,
    value: String,
}

#[derive(sqlx::FromRow)]
struct ListRow {
    variant_id: VariantId,
    sku: String,
    price: Decimal,
    compare_at_price: Option<Decimal>,
    product_id: ProductId,
    name: String,
    slug: String,
    category_id: CategoryId,
    category_name: String,
    category_slug: String,
    image_path: Option<String>,
    image_alt: Option<String>,
    image_blurhash: Option<String>,
    quantity_available: i32,
    total_count: i64,
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    slug: String,
    description: Option<String>,
    seo_description: Option<String>,
    status: String,
    category_id: CategoryId,
    category_name: String,
    category_slug: String,
}

#[derive(sqlx::FromRow)]
struct DetailImageRow {
    id: ImageId,
    storage_path: String,
    alt_text: Option<String>,
    display_order: i32,
    variant_id: Option<VariantId>,
    blurhash: Option<String>,
    thumbnail_path: Option<String>,
    medium_path: Option<String>,
    large_path: Option<String>,
}

#[derive(sqlx::FromRow)]
struct DetailVariantRow {
    id: VariantId,
    sku: String,
    price: Decimal,
    compare_at_price: Option<Decimal>,
    material: String,
    size: String,
    thickness: String,
    quantity_available: i32,
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: ReviewId,
    rating: i32,
    title: Option<String>,
    body: Option<String>,
    display_name: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(sqlx::FromRow)]
struct RatingCountRow {
    rating: i32,
    count: i64,
}

#[derive(sqlx::FromRow)]
struct VariantSummaryRow {
    variant_id: VariantId,
    product_name: String,
    sku: String,
    price: Decimal,
    material: String,
    size: String,
    thickness: String,
    quantity_available: i32,
    image_path: Option<String>,
    image_alt: Option<String>,
    image_blurhash: Option<String>,
}

/// Repository for catalog reads.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load homepage hero and promo content, falling back to default copy
    /// per column when `homepage_config` is empty or partially filled.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn homepage_content(&self) -> Result<HomepageContent, RepositoryError> {
        let row = sqlx::query_as::<_, HomepageConfigRow>(
            r"
            SELECT hero_headline, hero_subheadline, hero_cta_text, hero_cta_link,
                   hero_image_path, promo_is_active, promo_headline, promo_subheadline,
                   promo_cta_text, promo_cta_link, promo_bg_color
            FROM homepage_config
            LIMIT 1
            ",
        )
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map_or_else(HomepageContent::default, |row| HomepageContent {
            hero: HeroContent {
                headline: row
                    .hero_headline
                    .unwrap_or_else(|| DEFAULT_HERO_HEADLINE.to_owned()),
                subheadline: row
                    .hero_subheadline
                    .unwrap_or_else(|| DEFAULT_HERO_SUBHEADLINE.to_owned()),
                cta_text: row
                    .hero_cta_text
                    .unwrap_or_else(|| DEFAULT_HERO_CTA_TEXT.to_owned()),
                cta_link: row
                    .hero_cta_link
                    .unwrap_or_else(|| DEFAULT_HERO_CTA_LINK.to_owned()),
                image_path: row.hero_image_path,
            },
            promo: PromoBanner {
                is_active: row.promo_is_active,
                headline: row.promo_headline.unwrap_or_default(),
                subheadline: row.promo_subheadline.unwrap_or_default(),
                cta_text: row.promo_cta_text.unwrap_or_default(),
                cta_link: row.promo_cta_link.unwrap_or_default(),
                background_color: row
                    .promo_bg_color
                    .unwrap_or_else(|| DEFAULT_PROMO_BG_COLOR.to_owned()),
            },
        }))
    }

    /// Visible root categories for the homepage grid, at most eight.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn homepage_categories(&self) -> Result<Vec<CategoryTile>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryTileRow>(
            r"
            SELECT id, name, slug, image_path, product_count
            FROM categories
            WHERE parent_id IS NULL AND is_visible
            ORDER BY display_order
            LIMIT $1
            ",
        )
        .bind(HOMEPAGE_RAIL_LIMIT)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| CategoryTile {
                id: r.id,
                name: r.name,
                slug: r.slug,
                image_path: r.image_path,
                product_count: r.product_count,
            })
            .collect())
    }

    /// Featured products in curated order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` on a negative stored price.
    pub async fn featured_products(&self) -> Result<Vec<ProductCard>, RepositoryError> {
        let sql = format!(
            "{CARD_SELECT} WHERE p.status = 'active' AND p.is_featured ORDER BY p.featured_order LIMIT $1"
        );
        let rows = sqlx::query_as::<_, CardRow>(&sql)
            .bind(HOMEPAGE_RAIL_LIMIT)
            .fetch_all(self.pool)
            .await?;
        rows.into_iter().map(card_from_row).collect()
    }

    /// All-time bestsellers by units sold.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` on a negative stored price.
    pub async fn bestsellers(&self) -> Result<Vec<ProductCard>, RepositoryError> {
        let sql = format!(
            "{CARD_SELECT} WHERE p.status = 'active' ORDER BY p.total_sold DESC LIMIT $1"
        );
        let rows = sqlx::query_as::<_, CardRow>(&sql)
            .bind(HOMEPAGE_RAIL_LIMIT)
            .fetch_all(self.pool)
            .await?;
        rows.into_iter().map(card_from_row).collect()
    }

    /// Active products in the same category, bestselling first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` on a negative stored price.
    pub async fn related_products(
        &self,
        category_id: CategoryId,
        exclude: ProductId,
    ) -> Result<Vec<ProductCard>, RepositoryError> {
        let sql = format!(
            "{CARD_SELECT} WHERE p.status = 'active' AND p.category_id = $1 AND p.id <> $2 ORDER BY p.total_sold DESC LIMIT $3"
        );
        let rows = sqlx::query_as::<_, CardRow>(&sql)
            .bind(category_id)
            .bind(exclude)
            .bind(RELATED_LIMIT)
            .fetch_all(self.pool)
            .await?;
        rows.into_iter().map(card_from_row).collect()
    }

    /// Visible categories for the filter sidebar, alphabetical.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn filter_categories(&self) -> Result<Vec<CategorySummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategorySummaryRow>(
            r"
            SELECT id, name, slug, parent_id
            FROM categories
            WHERE is_visible
            ORDER BY name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| CategorySummary {
                id: r.id,
                name: r.name,
                slug: r.slug,
                parent_id: r.parent_id,
            })
            .collect())
    }

    /// Every attribute axis with its distinct values, sorted.
    ///
    /// Values are currently global, not scoped to the requested category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    // TODO: scope values to the requested category by joining through its variants.
    pub async fn filter_attributes(&self) -> Result<Vec<FilterAttribute>, RepositoryError> {
        let rows = sqlx::query_as::<_, AttributeValueRow>(
            r"
            SELECT a.name AS attribute, av.value
            FROM product_attribute_values av
            JOIN product_attributes a ON a.id = av.attribute_id
            ORDER BY a.name, av.value
            ",
        )
        .fetch_all(self.pool)
        .await?;

        let mut grouped: std::collections::BTreeMap<String, Vec<String>> =
            std::collections::BTreeMap::new();
        for row in rows {
            let values = grouped.entry(row.attribute).or_default();
            if !values.contains(&row.value) {
                values.push(row.value);
            }
        }

        Ok(grouped
            .into_iter()
            .map(|(name, values)| FilterAttribute { name, values })
            .collect())
    }

    /// One page of the product listing.
    ///
    /// Only in-stock baseline variants of active products appear. Price
    /// filters and sorts apply to the baseline variant price.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` when the baseline
    /// attribute values are missing, `RepositoryError::Database` if a
    /// query fails.
    pub async fn list(&self, params: &ListParams) -> Result<ProductListPage, RepositoryError> {
        let material_id = self.attribute_value_id(BASELINE_MATERIAL).await?;
        let size_id = self.attribute_value_id(BASELINE_SIZE).await?;
        let thickness_id = self.attribute_value_id(BASELINE_THICKNESS).await?;

        let (Some(material_id), Some(size_id), Some(thickness_id)) =
            (material_id, size_id, thickness_id)
        else {
            return Err(RepositoryError::DataCorruption(
                "baseline attribute values (acrylic, 2x2, 3) are not seeded".to_owned(),
            ));
        };

        let order_clause = params.sort.order_clause();
        let sql = format!(
            r"
            SELECT v.id AS variant_id, v.sku, v.price, v.compare_at_price,
                   p.id AS product_id, p.name, p.slug,
                   c.id AS category_id, c.name AS category_name, c.slug AS category_slug,
                   pi.storage_path AS image_path, pi.alt_text AS image_alt,
                   pi.blurhash AS image_blurhash,
                   i.quantity_available,
                   COUNT(*) OVER () AS total_count
            FROM product_variants v
            JOIN products p ON p.id = v.product_id
            JOIN categories c ON c.id = p.category_id
            JOIN inventory i ON i.variant_id = v.id
            LEFT JOIN LATERAL (
                SELECT storage_path, alt_text, blurhash
                FROM product_images
                WHERE product_id = p.id
                ORDER BY display_order
                LIMIT 1
            ) pi ON TRUE
            WHERE p.status = 'active'
              AND i.quantity_available > 0
              AND v.material_id = $1
              AND v.size_id = $2
              AND v.thickness_id = $3
              AND ($4::text IS NULL OR c.slug = $4)
              AND ($5::numeric IS NULL OR v.price >= $5)
              AND ($6::numeric IS NULL OR v.price <= $6)
            ORDER BY {order_clause}
            LIMIT $7 OFFSET $8
            "
        );

        let limit = i64::from(params.limit);
        let offset = i64::from(params.page.saturating_sub(1)) * limit;
        let rows = sqlx::query_as::<_, ListRow>(&sql)
            .bind(material_id)
            .bind(size_id)
            .bind(thickness_id)
            .bind(params.category.as_deref())
            .bind(params.min_price.map(|p| p.amount()))
            .bind(params.max_price.map(|p| p.amount()))
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool)
            .await?;

        let total_count = rows.first().map_or(0, |r| r.total_count);
        let total_pages = total_pages(total_count, params.limit);

        let items = rows
            .into_iter()
            .map(|r| {
                Ok(ProductListItem {
                    variant_id: r.variant_id,
                    sku: r.sku,
                    price: to_price(r.price)?,
                    compare_at_price: r.compare_at_price.map(to_price).transpose()?,
                    product_id: r.product_id,
                    name: r.name,
                    slug: r.slug,
                    category: Some(CategoryRef {
                        id: r.category_id,
                        name: r.category_name,
                        slug: r.category_slug,
                    }),
                    image: image_ref(r.image_path, r.image_alt, r.image_blurhash),
                    quantity_available: r.quantity_available,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        Ok(ProductListPage {
            items,
            total_count,
            page: params.page,
            limit: params.limit,
            total_pages,
        })
    }

    /// Full product detail by slug, or `None` when the slug is unknown.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails, or
    /// `RepositoryError::DataCorruption` on a negative stored price.
    pub async fn product_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<ProductDetail>, RepositoryError> {
        let product = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT p.id, p.name, p.slug, p.description, p.seo_description, p.status,
                   c.id AS category_id, c.name AS category_name, c.slug AS category_slug
            FROM products p
            JOIN categories c ON c.id = p.category_id
            WHERE p.slug = $1
            ",
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        let Some(product) = product else {
            return Ok(None);
        };

        let images = sqlx::query_as::<_, DetailImageRow>(
            r"
            SELECT id, storage_path, alt_text, display_order, variant_id,
                   blurhash, thumbnail_path, medium_path, large_path
            FROM product_images
            WHERE product_id = $1
            ORDER BY display_order
            ",
        )
        .bind(product.id)
        .fetch_all(self.pool)
        .await?;

        let variants = sqlx::query_as::<_, DetailVariantRow>(
            r"
            SELECT v.id, v.sku, v.price, v.compare_at_price,
                   m.value AS material, s.value AS size, t.value AS thickness,
                   COALESCE(i.quantity_available, 0) AS quantity_available
            FROM product_variants v
            JOIN product_attribute_values m ON m.id = v.material_id
            JOIN product_attribute_values s ON s.id = v.size_id
            JOIN product_attribute_values t ON t.id = v.thickness_id
            LEFT JOIN inventory i ON i.variant_id = v.id
            WHERE v.product_id = $1
            ORDER BY v.price
            ",
        )
        .bind(product.id)
        .fetch_all(self.pool)
        .await?;

        let variants = variants
            .into_iter()
            .map(|v| {
                Ok(DetailVariant {
                    id: v.id,
                    sku: v.sku,
                    price: to_price(v.price)?,
                    compare_at_price: v.compare_at_price.map(to_price).transpose()?,
                    material: v.material,
                    size: v.size,
                    thickness: v.thickness,
                    quantity_available: v.quantity_available,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        Ok(Some(ProductDetail {
            id: product.id,
            name: product.name,
            slug: product.slug,
            description: product.description,
            seo_description: product.seo_description,
            status: product.status,
            category: CategoryRef {
                id: product.category_id,
                name: product.category_name,
                slug: product.category_slug,
            },
            images: images
                .into_iter()
                .map(|i| DetailImage {
                    id: i.id,
                    storage_path: i.storage_path,
                    alt_text: i.alt_text,
                    display_order: i.display_order,
                    variant_id: i.variant_id,
                    blurhash: i.blurhash,
                    thumbnail_path: i.thumbnail_path,
                    medium_path: i.medium_path,
                    large_path: i.large_path,
                })
                .collect(),
            variants,
        }))
    }

    /// Variant lookup for cart additions: product name, attribute values,
    /// price, stock and the product's primary image.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if the stored price is invalid.
    pub async fn variant_summary(
        &self,
        variant_id: VariantId,
    ) -> Result<Option<VariantSummary>, RepositoryError> {
        let row = sqlx::query_as::<_, VariantSummaryRow>(
            r"
            SELECT v.id AS variant_id, p.name AS product_name, v.sku, v.price,
                   m.value AS material, s.value AS size, t.value AS thickness,
                   COALESCE(i.quantity_available, 0) AS quantity_available,
                   img.storage_path AS image_path, img.alt_text AS image_alt,
                   img.blurhash AS image_blurhash
            FROM product_variants v
            JOIN products p ON p.id = v.product_id
            JOIN product_attribute_values m ON m.id = v.material_id
            JOIN product_attribute_values s ON s.id = v.size_id
            JOIN product_attribute_values t ON t.id = v.thickness_id
            LEFT JOIN inventory i ON i.variant_id = v.id
            LEFT JOIN LATERAL (
                SELECT pi.storage_path, pi.alt_text, pi.blurhash
                FROM product_images pi
                WHERE pi.product_id = p.id
                ORDER BY pi.display_order
                LIMIT 1
            ) img ON TRUE
            WHERE v.id = $1
            ",
        )
        .bind(variant_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(|row| {
            Ok(VariantSummary {
                variant_id: row.variant_id,
                product_name: row.product_name,
                variant_description: format!("{}, {}, {}", row.material, row.size, row.thickness),
                sku: row.sku,
                unit_price: to_price(row.price)?,
                quantity_available: row.quantity_available,
                image: image_ref(row.image_path, row.image_alt, row.image_blurhash),
            })
        })
        .transpose()
    }

    /// Latest approved reviews plus the aggregate summary.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn reviews(&self, product_id: ProductId) -> Result<ReviewsResult, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            r"
            SELECT id, rating, title, body, display_name, created_at
            FROM reviews
            WHERE product_id = $1 AND is_approved
            ORDER BY created_at DESC
            LIMIT $2
            ",
        )
        .bind(product_id)
        .bind(REVIEWS_PAGE_LIMIT)
        .fetch_all(self.pool)
        .await?;

        let counts = sqlx::query_as::<_, RatingCountRow>(
            r"
            SELECT rating, COUNT(*) AS count
            FROM reviews
            WHERE product_id = $1 AND is_approved
            GROUP BY rating
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        let counts: Vec<(i32, i64)> = counts.into_iter().map(|r| (r.rating, r.count)).collect();

        Ok(ReviewsResult {
            reviews: rows
                .into_iter()
                .map(|r| Review {
                    id: r.id,
                    rating: r.rating,
                    title: r.title,
                    body: r.body,
                    display_name: r.display_name,
                    created_at: r.created_at,
                })
                .collect(),
            summary: summarize_ratings(&counts),
        })
    }

    async fn attribute_value_id(
        &self,
        value: &str,
    ) -> Result<Option<uuid::Uuid>, RepositoryError> {
        let id = sqlx::query_scalar::<_, uuid::Uuid>(
            "SELECT id FROM product_attribute_values WHERE value = $1",
        )
        .bind(value)
        .fetch_optional(self.pool)
        .await?;
        Ok(id)
    }
}

fn image_ref(
    storage_path: Option<String>,
    alt_text: Option<String>,
    blurhash: Option<String>,
) -> Option<ImageRef> {
    storage_path.map(|storage_path| ImageRef {
        storage_path,
        alt_text,
        blurhash,
    })
}

fn card_from_row(row: CardRow) -> Result<ProductCard, RepositoryError> {
    Ok(ProductCard {
        id: row.id,
        name: row.name,
        slug: row.slug,
        image: image_ref(row.image_path, row.image_alt, row.image_blurhash),
        price: row.min_price.map_or(Ok(Price::ZERO), to_price)?,
        compare_at_price: row.max_compare_at.map(to_price).transpose()?,
    })
}

fn total_pages(total_count: i64, limit: u32) -> u32 {
    if total_count <= 0 || limit == 0 {
        return 0;
    }
    let limit = i64::from(limit);
    let pages = (total_count + limit - 1) / limit;
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Build the 5-to-1 star distribution and rounded average from grouped
/// rating counts.
#[allow(clippy::cast_precision_loss)]
fn summarize_ratings(counts: &[(i32, i64)]) -> ReviewSummary {
    let total_count: i64 = counts.iter().map(|(_, count)| count).sum();
    let weighted: i64 = counts
        .iter()
        .map(|(star, count)| i64::from(*star) * count)
        .sum();

    let average_rating = if total_count == 0 {
        0.0
    } else {
        (weighted as f64 / total_count as f64 * 10.0).round() / 10.0
    };

    let distribution = (1..=5)
        .rev()
        .map(|star| RatingCount {
            star,
            count: counts
                .iter()
                .find(|(s, _)| *s == star)
                .map_or(0, |(_, count)| *count),
        })
        .collect();

    ReviewSummary {
        total_count,
        average_rating,
        distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(0, 24), 0);
        assert_eq!(total_pages(1, 24), 1);
        assert_eq!(total_pages(24, 24), 1);
        assert_eq!(total_pages(25, 24), 2);
    }

    #[test]
    fn test_summarize_empty_ratings() {
        let summary = summarize_ratings(&[]);
        assert_eq!(summary.total_count, 0);
        assert!((summary.average_rating - 0.0).abs() < f64::EPSILON);
        assert_eq!(summary.distribution.len(), 5);
        assert!(summary.distribution.iter().all(|d| d.count == 0));
    }

    #[test]
    fn test_summarize_rounds_average_to_one_decimal() {
        // 5 + 5 + 4 = 14 over 3 reviews = 4.666... -> 4.7
        let summary = summarize_ratings(&[(5, 2), (4, 1)]);
        assert_eq!(summary.total_count, 3);
        assert!((summary.average_rating - 4.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summarize_distribution_five_stars_first() {
        let summary = summarize_ratings(&[(1, 4), (5, 2)]);
        let stars: Vec<i32> = summary.distribution.iter().map(|d| d.star).collect();
        assert_eq!(stars, vec![5, 4, 3, 2, 1]);
        assert_eq!(summary.distribution[0].count, 2);
        assert_eq!(summary.distribution[4].count, 4);
    }
}
