//! Order repository: the `create_order` function call and confirmation reads.
//!
//! Orders are written exclusively by the `create_order` database function,
//! which snapshots line items, checks and decrements inventory, and
//! computes totals inside a single transaction. This module never writes
//! order rows directly.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use forgeline_core::{OrderId, OrderStatus};

use super::{RepositoryError, decimal_to_price as to_price};
use crate::models::orders::{Address, NewOrder, OrderConfirmation, OrderItemView};

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    order_number: String,
    status: OrderStatus,
    customer_email: String,
    customer_name: String,
    customer_phone: String,
    shipping_address: Json<Address>,
    billing_address: Json<Address>,
    subtotal: Decimal,
    shipping_cost: Decimal,
    discount_amount: Decimal,
    tax_amount: Decimal,
    total_amount: Decimal,
    payment_method: String,
    order_notes: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    product_name: String,
    variant_description: String,
    sku: String,
    quantity: i32,
    unit_price: Decimal,
    total_price: Decimal,
}

/// Repository for order writes and confirmation reads.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an order atomically via the `create_order` database function.
    ///
    /// The function raises when a variant is unknown or stock is
    /// insufficient, which surfaces here as a database error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the call fails.
    pub async fn create_order(&self, order: &NewOrder) -> Result<OrderId, RepositoryError> {
        let id = sqlx::query_scalar::<_, OrderId>(
            r"
            SELECT create_order(
                p_customer_email := $1,
                p_customer_name := $2,
                p_customer_phone := $3,
                p_shipping_address := $4,
                p_billing_address := $5,
                p_cart_items := $6,
                p_payment_intent_id := $7,
                p_payment_method := $8,
                p_shipping_cost := $9,
                p_discount_amount := $10,
                p_tax_rate := $11,
                p_ip_address := $12,
                p_user_agent := $13,
                p_order_notes := $14
            )
            ",
        )
        .bind(order.customer_email.as_str())
        .bind(&order.customer_name)
        .bind(&order.customer_phone)
        .bind(Json(&order.shipping_address))
        .bind(Json(&order.billing_address))
        .bind(Json(&order.items))
        .bind(order.payment_intent_id.as_deref())
        .bind(&order.payment_method)
        .bind(order.shipping_cost.amount())
        .bind(order.discount_amount.amount())
        .bind(order.tax_rate)
        .bind(order.ip_address.as_deref())
        .bind(order.user_agent.as_deref())
        .bind(order.order_notes.as_deref())
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }

    /// Look up the human-facing order number for a freshly created order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn order_number(&self, id: OrderId) -> Result<Option<String>, RepositoryError> {
        let number =
            sqlx::query_scalar::<_, String>("SELECT order_number FROM orders WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;
        Ok(number)
    }

    /// Full confirmation payload for the post-checkout page, or `None`
    /// when the order does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails, or
    /// `RepositoryError::DataCorruption` on a negative stored amount.
    pub async fn confirmation(
        &self,
        id: OrderId,
    ) -> Result<Option<OrderConfirmation>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, order_number, status, customer_email, customer_name, customer_phone,
                   shipping_address, billing_address, subtotal, shipping_cost, discount_amount,
                   tax_amount, total_amount, payment_method, order_notes, created_at
            FROM orders
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = self.items(id).await?;

        Ok(Some(OrderConfirmation {
            id: row.id,
            order_number: row.order_number,
            status: row.status,
            customer_email: row.customer_email,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            shipping_address: row.shipping_address.0,
            billing_address: row.billing_address.0,
            subtotal: to_price(row.subtotal)?,
            shipping_cost: to_price(row.shipping_cost)?,
            discount_amount: to_price(row.discount_amount)?,
            tax_amount: to_price(row.tax_amount)?,
            total_amount: to_price(row.total_amount)?,
            payment_method: row.payment_method,
            order_notes: row.order_notes,
            created_at: row.created_at,
            items,
        }))
    }

    /// Snapshotted line items for an order, insertion order preserved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` on a negative stored amount.
    pub async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItemView>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT product_name, variant_description, sku, quantity, unit_price, total_price
            FROM order_items
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                Ok(OrderItemView {
                    product_name: r.product_name,
                    variant_description: r.variant_description,
                    sku: r.sku,
                    quantity: r.quantity,
                    unit_price: to_price(r.unit_price)?,
                    total_price: to_price(r.total_price)?,
                })
            })
            .collect()
    }
}
