//! Checkout route handlers.
//!
//! `POST /api/checkout` places a cash-on-delivery order from the
//! session cart; `GET /api/orders/{id}` serves the confirmation page
//! payload. Order creation itself is a single `create_order` database
//! function call, so a failed checkout never leaves partial rows.

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use forgeline_core::OrderId;

use crate::checkout::{self, CheckoutForm, CheckoutResponse};
use crate::db::OrderRepository;
use crate::error::AppError;
use crate::models::OrderConfirmation;
use crate::state::AppState;

use super::cart::{load_cart, save_cart};

/// Place a cash-on-delivery order from the session cart.
///
/// The subtotal is recomputed from the session cart; client-supplied
/// totals are ignored. The cart is cleared exactly once, only after the
/// order row exists. A missing order number downgrades to `"Unknown"`
/// rather than failing an order that was already written.
#[instrument(skip(state, session, headers, payload))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Json(payload): Json<serde_json::Value>,
) -> Response {
    let cart = load_cart(&session).await;
    if cart.is_empty() {
        return failure(StatusCode::BAD_REQUEST, "Your cart is empty");
    }

    let Ok(form) = serde_json::from_value::<CheckoutForm>(payload) else {
        return failure(StatusCode::BAD_REQUEST, "Missing required fields");
    };

    let email = match checkout::validate(&form) {
        Ok(email) => email,
        Err(message) => return failure(StatusCode::BAD_REQUEST, message),
    };

    let order = checkout::build_order(
        form,
        email,
        &cart,
        client_ip(&headers),
        user_agent(&headers),
    );

    let repo = OrderRepository::new(state.pool());
    let order_id = match repo.create_order(&order).await {
        Ok(id) => id,
        Err(e) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(error = %e, sentry_event_id = %event_id, "Order creation failed");
            return failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create order. Please try again.",
            );
        }
    };

    let order_number = match repo.order_number(order_id).await {
        Ok(Some(number)) => number,
        Ok(None) => {
            tracing::error!(order_id = %order_id, "Created order has no order number");
            "Unknown".to_string()
        }
        Err(e) => {
            tracing::error!(order_id = %order_id, error = %e, "Failed to fetch order number");
            "Unknown".to_string()
        }
    };

    // The order exists; clearing the cart must happen exactly once, and
    // a session write failure must not fail the checkout.
    let mut cart = cart;
    cart.clear();
    if let Err(e) = save_cart(&session, &cart).await {
        tracing::warn!(order_id = %order_id, "Failed to clear cart after checkout: {e}");
    }

    tracing::info!(order_id = %order_id, order_number = %order_number, "Order placed");
    (
        StatusCode::OK,
        Json(CheckoutResponse::placed(order_id, order_number)),
    )
        .into_response()
}

/// Order confirmation payload for the post-checkout page.
#[instrument(skip(state))]
pub async fn confirmation(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderConfirmation>, AppError> {
    let confirmation = OrderRepository::new(state.pool())
        .confirmation(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
    Ok(Json(confirmation))
}

fn failure(status: StatusCode, error: impl Into<String>) -> Response {
    (status, Json(CheckoutResponse::failure(error))).into_response()
}

/// Client IP as seen through the reverse proxy: first hop of
/// `x-forwarded-for`, then `x-real-ip`.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|value| value.to_str().ok())
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        })
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_client_ip_prefers_forwarded_for_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            "203.0.113.9, 10.0.0.1, 10.0.0.2".parse().unwrap(),
        );
        headers.insert("x-real-ip", "198.51.100.7".parse().unwrap());
        assert_eq!(client_ip(&headers).as_deref(), Some("203.0.113.9"));
    }

    #[test]
    fn test_client_ip_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "198.51.100.7".parse().unwrap());
        assert_eq!(client_ip(&headers).as_deref(), Some("198.51.100.7"));
    }

    #[test]
    fn test_client_ip_absent() {
        let headers = HeaderMap::new();
        assert_eq!(client_ip(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "  ".parse().unwrap());
        assert_eq!(client_ip(&headers), None);
    }

    #[test]
    fn test_user_agent_read() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, "Mozilla/5.0".parse().unwrap());
        assert_eq!(user_agent(&headers).as_deref(), Some("Mozilla/5.0"));
        assert_eq!(user_agent(&HeaderMap::new()), None);
    }
}
