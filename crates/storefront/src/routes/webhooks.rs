//! Database webhook route handlers.
//!
//! The orders table has a row-change trigger pointed at
//! `POST /api/webhooks/order-status`. The handler sends the order
//! confirmation email exactly once, on the pending→confirmed
//! transition; every other change is acknowledged without sending.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use forgeline_core::{OrderId, OrderStatus, Price};

use crate::db::OrderRepository;
use crate::models::{Address, OrderItemView};
use crate::services::{EmailLineItem, OrderConfirmationEmail};
use crate::state::AppState;

/// Row-change event as delivered by the database webhook.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    /// Change kind: `INSERT`, `UPDATE`, or `DELETE`.
    #[serde(rename = "type")]
    pub change_type: String,
    pub table: String,
    pub record: OrderRecord,
    pub old_record: Option<StatusRecord>,
}

/// Order row image carried in the payload.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderRecord {
    pub id: OrderId,
    pub order_number: String,
    pub status: OrderStatus,
    pub customer_email: String,
    pub customer_name: String,
    pub shipping_address: Address,
    pub subtotal: Price,
    pub shipping_cost: Price,
    pub tax_amount: Price,
    pub total_amount: Price,
    pub created_at: DateTime<Utc>,
}

/// Previous row image; only the status matters for gating.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusRecord {
    pub status: OrderStatus,
}

/// Whether this change is the transition that sends the confirmation
/// email. A confirmed→confirmed no-op update must not send again.
fn should_send(payload: &WebhookPayload) -> bool {
    payload.change_type == "UPDATE"
        && payload.record.status == OrderStatus::Confirmed
        && payload
            .old_record
            .as_ref()
            .is_none_or(|old| old.status != OrderStatus::Confirmed)
}

/// Compare the `Authorization` header against the configured secret.
fn authorized(headers: &HeaderMap, secret: &SecretString) -> bool {
    let expected = format!("Bearer {}", secret.expose_secret());
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == expected)
}

/// Assemble the email view model from the order row and its items.
///
/// The order date is rendered here (long form, `24 August 2026`);
/// empty variant descriptions fall back to `Standard` at render time.
fn build_confirmation(order: &OrderRecord, items: Vec<OrderItemView>) -> OrderConfirmationEmail {
    let items = items
        .into_iter()
        .map(|item| EmailLineItem {
            name: item.product_name,
            material: item.variant_description,
            quantity: item.quantity,
            unit_price: item.unit_price,
            total_price: item.total_price,
        })
        .collect();

    OrderConfirmationEmail {
        order_number: order.order_number.clone(),
        customer_name: order.customer_name.clone(),
        order_date: order.created_at.format("%-d %B %Y").to_string(),
        items,
        subtotal: order.subtotal,
        shipping_cost: order.shipping_cost,
        tax_amount: order.tax_amount,
        total: order.total_amount,
        shipping_address: order.shipping_address.clone(),
    }
}

/// Order status change webhook.
#[instrument(skip(state, headers, payload), fields(order_id = %payload.record.id))]
pub async fn order_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<WebhookPayload>,
) -> Response {
    if !authorized(&headers, &state.config().order_webhook_secret) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Unauthorized" })),
        )
            .into_response();
    }

    if !should_send(&payload) {
        return (StatusCode::OK, Json(json!({ "message": "No email needed" }))).into_response();
    }

    let order = payload.record;

    let items = match OrderRepository::new(state.pool()).items(order.id).await {
        Ok(items) => items,
        Err(e) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(error = %e, sentry_event_id = %event_id, "Failed to fetch order items");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch order items" })),
            )
                .into_response();
        }
    };

    let confirmation = build_confirmation(&order, items);

    match state
        .email()
        .send_order_confirmation(&order.customer_email, &confirmation)
        .await
    {
        Ok(()) => {
            tracing::info!(order_number = %order.order_number, "Order confirmation email sent");
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "message": format!("Email sent to {}", order.customer_email),
                })),
            )
                .into_response()
        }
        Err(e) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(error = %e, sentry_event_id = %event_id, "Failed to send order confirmation");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to send email" })),
            )
                .into_response()
        }
    }
}
