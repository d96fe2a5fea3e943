//! Custom order intake repository.

use sqlx::PgPool;

use forgeline_core::{CustomOrderId, Email};

use super::RepositoryError;

/// A validated custom piece request ready to persist.
///
/// Optional fields are `None` rather than empty strings; normalization
/// happens at the route boundary.
#[derive(Debug, Clone)]
pub struct NewCustomOrder {
    pub customer_name: String,
    pub customer_email: Email,
    pub customer_phone: Option<String>,
    /// Reference image the customer uploaded before submitting.
    pub image_url: String,
    pub description: Option<String>,
    pub preferred_material: Option<String>,
    pub preferred_size: Option<String>,
    pub preferred_thickness: Option<String>,
}

/// Repository for custom order requests.
pub struct CustomOrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomOrderRepository<'a> {
    /// Create a new custom order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a request with status `pending`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        request: &NewCustomOrder,
    ) -> Result<CustomOrderId, RepositoryError> {
        let id = sqlx::query_scalar::<_, CustomOrderId>(
            r"
            INSERT INTO custom_orders (
                customer_name, customer_email, customer_phone, image_url,
                description, preferred_material, preferred_size, preferred_thickness
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            ",
        )
        .bind(&request.customer_name)
        .bind(request.customer_email.as_str())
        .bind(request.customer_phone.as_deref())
        .bind(&request.image_url)
        .bind(request.description.as_deref())
        .bind(request.preferred_material.as_deref())
        .bind(request.preferred_size.as_deref())
        .bind(request.preferred_thickness.as_deref())
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }
}
