//! Cart route handlers.
//!
//! The cart is session state: every handler hydrates it from the
//! Postgres-backed session, applies the mutation, and writes it back.
//! Variant data (name, price, image) is captured at add time so the
//! cart never re-queries the catalog on reads.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use forgeline_core::{Price, VariantId};

use crate::db::CatalogRepository;
use crate::error::AppError;
use crate::models::{Cart, CartItem, session::keys};
use crate::state::AppState;

/// Cart payload with derived totals.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub item_count: u32,
    pub subtotal: Price,
}

impl CartView {
    fn from_cart(cart: Cart) -> Self {
        Self {
            item_count: cart.item_count(),
            subtotal: cart.subtotal(),
            items: cart.items,
        }
    }
}

/// Item count payload for the header badge.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u32,
}

/// Load the cart from the session, defaulting to empty.
pub(crate) async fn load_cart(session: &Session) -> Cart {
    session
        .get::<Cart>(keys::CART)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Write the cart back to the session.
pub(crate) async fn save_cart(session: &Session, cart: &Cart) -> Result<(), AppError> {
    session
        .insert(keys::CART, cart)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))
}

/// Current cart contents.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Json<CartView> {
    let cart = load_cart(&session).await;
    Json(CartView::from_cart(cart))
}

/// Request body for adding a variant to the cart.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub variant_id: VariantId,
    /// Defaults to 1 when absent.
    pub quantity: Option<u32>,
}

/// Add a variant to the cart, merging quantities on repeat adds.
#[instrument(skip(state, session), fields(variant_id = %request.variant_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<CartView>, AppError> {
    let quantity = request.quantity.unwrap_or(1);
    if quantity == 0 {
        return Err(AppError::BadRequest(
            "Quantity must be at least 1".to_string(),
        ));
    }

    let repo = CatalogRepository::new(state.pool());
    let Some(variant) = repo.variant_summary(request.variant_id).await? else {
        return Err(AppError::BadRequest("Variant not found".to_string()));
    };
    if variant.quantity_available <= 0 {
        return Err(AppError::BadRequest("Out of stock".to_string()));
    }

    let mut cart = load_cart(&session).await;
    cart.add_item(variant.into_cart_item(quantity));
    save_cart(&session, &cart).await?;

    Ok(Json(CartView::from_cart(cart)))
}

/// Request body for setting a line quantity.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub variant_id: VariantId,
    pub quantity: u32,
}

/// Set the quantity of a line; zero removes it.
#[instrument(skip(session), fields(variant_id = %request.variant_id))]
pub async fn update(
    session: Session,
    Json(request): Json<UpdateItemRequest>,
) -> Result<Json<CartView>, AppError> {
    let mut cart = load_cart(&session).await;
    cart.update_quantity(request.variant_id, request.quantity);
    save_cart(&session, &cart).await?;

    Ok(Json(CartView::from_cart(cart)))
}

/// Request body for removing a line.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveItemRequest {
    pub variant_id: VariantId,
}

/// Remove a line from the cart; no-op when absent.
#[instrument(skip(session), fields(variant_id = %request.variant_id))]
pub async fn remove(
    session: Session,
    Json(request): Json<RemoveItemRequest>,
) -> Result<Json<CartView>, AppError> {
    let mut cart = load_cart(&session).await;
    cart.remove_item(request.variant_id);
    save_cart(&session, &cart).await?;

    Ok(Json(CartView::from_cart(cart)))
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Json<CartView>, AppError> {
    let mut cart = load_cart(&session).await;
    cart.clear();
    save_cart(&session, &cart).await?;

    Ok(Json(CartView::from_cart(cart)))
}

/// Item count for the header badge.
#[instrument(skip(session))]
pub async fn count(session: Session) -> Json<CartCount> {
    let cart = load_cart(&session).await;
    Json(CartCount {
        count: cart.item_count(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(variant_id: VariantId, rupees: u32, quantity: u32) -> CartItem {
        CartItem {
            variant_id,
            product_name: "Geometric Stag".to_string(),
            variant_description: "steel, 2x2, 3".to_string(),
            sku: "GS-S-22-3".to_string(),
            unit_price: Price::from_rupees(rupees),
            quantity,
            image: None,
        }
    }

    #[test]
    fn test_cart_view_totals() {
        let mut cart = Cart::default();
        cart.add_item(item(VariantId::new(), 2600, 2));
        cart.add_item(item(VariantId::new(), 1500, 1));

        let view = CartView::from_cart(cart);
        assert_eq!(view.item_count, 3);
        assert_eq!(view.subtotal, Price::from_rupees(6700));
        assert_eq!(view.items.len(), 2);
    }

    #[test]
    fn test_cart_view_serializes_amounts_as_strings() {
        let mut cart = Cart::default();
        cart.add_item(item(VariantId::new(), 2600, 2));

        let json = serde_json::to_value(CartView::from_cart(cart)).unwrap();
        assert_eq!(json["item_count"], serde_json::json!(2));
        assert_eq!(json["subtotal"], serde_json::json!("5200"));
        assert_eq!(json["items"][0]["unit_price"], serde_json::json!("2600"));
    }
}
