//! Order models: checkout inputs and the confirmation payload.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use forgeline_core::{Email, OrderId, OrderStatus, Price, VariantId};

/// Country recorded on every order; the store only ships domestically.
pub const SHIPPING_COUNTRY: &str = "Pakistan";

/// Postal address stored as JSONB on the order row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub country: String,
}

/// One cart line passed to the `create_order` database function.
///
/// Field names are part of the function's JSONB contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub variant_id: VariantId,
    pub quantity: u32,
    pub price: Price,
}

/// Everything `create_order` needs to write an order atomically.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_email: Email,
    pub customer_name: String,
    pub customer_phone: String,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub items: Vec<OrderLine>,
    pub payment_intent_id: Option<String>,
    pub payment_method: String,
    pub shipping_cost: Price,
    pub discount_amount: Price,
    pub tax_rate: Decimal,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub order_notes: Option<String>,
}

/// Line item as snapshotted on the order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemView {
    pub product_name: String,
    pub variant_description: String,
    pub sku: String,
    pub quantity: i32,
    pub unit_price: Price,
    pub total_price: Price,
}

/// Order confirmation payload for the post-checkout page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub id: OrderId,
    pub order_number: String,
    pub status: OrderStatus,
    pub customer_email: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub subtotal: Price,
    pub shipping_cost: Price,
    pub discount_amount: Price,
    pub tax_amount: Price,
    pub total_amount: Price,
    pub payment_method: String,
    pub order_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemView>,
}
