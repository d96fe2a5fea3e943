//! Newsletter subscriber repository.

use sqlx::PgPool;

use forgeline_core::{Email, SubscriberId};

use super::RepositoryError;

/// Repository for newsletter subscriptions.
pub struct NewsletterRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NewsletterRepository<'a> {
    /// Create a new newsletter repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Subscribe an address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the address is already
    /// subscribed, `RepositoryError::Database` for other failures.
    pub async fn subscribe(&self, email: &Email) -> Result<SubscriberId, RepositoryError> {
        let id = sqlx::query_scalar::<_, SubscriberId>(
            r"
            INSERT INTO newsletter_subscribers (email)
            VALUES ($1)
            RETURNING id
            ",
        )
        .bind(email.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already subscribed".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(id)
    }
}
