//! Checkout validation and order assembly.
//!
//! Validation mirrors the storefront checkout form: Pakistan phone
//! numbers, five-digit postal codes, bounded free-text fields. Totals
//! are recomputed from the session cart; client-supplied amounts are
//! never trusted.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use forgeline_core::{Email, OrderId, Price};

use crate::models::{Address, Cart, NewOrder, OrderLine, SHIPPING_COUNTRY};

/// Orders at or above this subtotal (rupees) ship free.
const FREE_SHIPPING_THRESHOLD_RUPEES: u32 = 5000;
/// Flat shipping (rupees) below the threshold.
const SHIPPING_COST_RUPEES: u32 = 200;

/// Provinces accepted in address forms.
pub const PAKISTAN_PROVINCES: &[&str] = &[
    "Punjab",
    "Sindh",
    "Khyber Pakhtunkhwa",
    "Balochistan",
    "Gilgit-Baltistan",
    "Azad Kashmir",
    "Islamabad Capital Territory",
];

// Accepts: 03001234567, +923001234567, 00923001234567
static PAKISTAN_PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(03\d{9}|(\+92|0092)3\d{9})$").expect("Invalid regex"));

static POSTAL_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}$").expect("Invalid regex"));

/// Address fields as posted by the checkout form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressForm {
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub province: String,
    pub postal_code: String,
}

impl AddressForm {
    /// Convert to the stored address shape. Country is always Pakistan;
    /// an empty second line becomes `None`.
    #[must_use]
    pub fn into_address(self) -> Address {
        Address {
            line1: self.line1,
            line2: self.line2.filter(|l| !l.trim().is_empty()),
            city: self.city,
            province: self.province,
            postal_code: self.postal_code,
            country: SHIPPING_COUNTRY.to_string(),
        }
    }
}

/// Checkout form payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutForm {
    pub email: String,
    pub name: String,
    pub phone: String,
    pub shipping: AddressForm,
    pub use_same_address: bool,
    pub billing: Option<AddressForm>,
    pub order_notes: Option<String>,
}

/// Checkout response body, also used for failures.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckoutResponse {
    /// Successful order placement.
    #[must_use]
    pub fn placed(order_id: OrderId, order_number: String) -> Self {
        Self {
            success: true,
            order_id: Some(order_id),
            order_number: Some(order_number),
            message: Some("Order placed successfully!".to_string()),
            error: None,
        }
    }

    /// Failed checkout with a user-facing message.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            order_id: None,
            order_number: None,
            message: None,
            error: Some(error.into()),
        }
    }
}

/// Validate the checkout form, returning the normalized customer email.
///
/// # Errors
///
/// Returns the first user-facing validation message that applies.
pub fn validate(form: &CheckoutForm) -> Result<Email, String> {
    let email = Email::parse(&form.email)
        .map_err(|_| "Please enter a valid email address".to_string())?;

    let name = form.name.trim();
    if name.len() < 2 {
        return Err("Name must be at least 2 characters".to_string());
    }
    if name.len() > 100 {
        return Err("Name is too long".to_string());
    }

    if !PAKISTAN_PHONE_RE.is_match(form.phone.trim()) {
        return Err(
            "Please enter a valid Pakistan phone number (e.g., 03001234567 or +923001234567)"
                .to_string(),
        );
    }

    validate_address(&form.shipping)?;

    if !form.use_same_address {
        match &form.billing {
            Some(billing) => validate_address(billing)?,
            None => {
                return Err("Billing address is required when different from shipping".to_string());
            }
        }
    }

    if let Some(notes) = &form.order_notes
        && notes.len() > 500
    {
        return Err("Notes are too long".to_string());
    }

    Ok(email)
}

fn validate_address(address: &AddressForm) -> Result<(), String> {
    let line1 = address.line1.trim();
    if line1.len() < 5 {
        return Err("Address is too short".to_string());
    }
    if line1.len() > 200 {
        return Err("Address is too long".to_string());
    }

    if let Some(line2) = &address.line2
        && line2.len() > 200
    {
        return Err("Address is too long".to_string());
    }

    let city = address.city.trim();
    if city.len() < 2 {
        return Err("City is required".to_string());
    }
    if city.len() > 100 {
        return Err("City name is too long".to_string());
    }

    let province = address.province.trim();
    if province.len() < 2 {
        return Err("Province is required".to_string());
    }
    if province.len() > 100 {
        return Err("Province name is too long".to_string());
    }

    if !POSTAL_CODE_RE.is_match(address.postal_code.trim()) {
        return Err("Postal code must be 5 digits".to_string());
    }

    Ok(())
}

/// Shipping cost for a cart subtotal. Free at and above the threshold.
#[must_use]
pub fn shipping_cost(subtotal: Price) -> Price {
    if subtotal >= Price::from_rupees(FREE_SHIPPING_THRESHOLD_RUPEES) {
        Price::ZERO
    } else {
        Price::from_rupees(SHIPPING_COST_RUPEES)
    }
}

/// Assemble the `create_order` input from the validated form and the
/// session cart. Billing falls back to the shipping address, COD fields
/// are fixed, and the shipping cost is derived from the cart subtotal.
#[must_use]
pub fn build_order(
    form: CheckoutForm,
    customer_email: Email,
    cart: &Cart,
    ip_address: Option<String>,
    user_agent: Option<String>,
) -> NewOrder {
    let items: Vec<OrderLine> = cart
        .items
        .iter()
        .map(|item| OrderLine {
            variant_id: item.variant_id,
            quantity: item.quantity,
            price: item.unit_price,
        })
        .collect();

    let shipping_cost = shipping_cost(cart.subtotal());
    let shipping_address = form.shipping.into_address();
    let billing_address = if form.use_same_address {
        shipping_address.clone()
    } else {
        form.billing
            .map_or_else(|| shipping_address.clone(), AddressForm::into_address)
    };

    NewOrder {
        customer_email,
        customer_name: form.name.trim().to_string(),
        customer_phone: form.phone.trim().to_string(),
        shipping_address,
        billing_address,
        items,
        payment_intent_id: None,
        payment_method: "cash_on_delivery".to_string(),
        shipping_cost,
        discount_amount: Price::ZERO,
        tax_rate: rust_decimal::Decimal::ZERO,
        ip_address,
        user_agent,
        order_notes: form
            .order_notes
            .filter(|notes| !notes.trim().is_empty())
            .map(|notes| notes.trim().to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use forgeline_core::VariantId;

    use crate::models::CartItem;

    fn address() -> AddressForm {
        AddressForm {
            line1: "House 12, Street 4, F-8/3".to_string(),
            line2: None,
            city: "Islamabad".to_string(),
            province: "Islamabad Capital Territory".to_string(),
            postal_code: "44000".to_string(),
        }
    }

    fn form() -> CheckoutForm {
        CheckoutForm {
            email: "ayesha@example.com".to_string(),
            name: "Ayesha Khan".to_string(),
            phone: "03001234567".to_string(),
            shipping: address(),
            use_same_address: true,
            billing: None,
            order_notes: None,
        }
    }

    fn cart_with_subtotal(rupees: u32) -> Cart {
        let mut cart = Cart::default();
        cart.add_item(CartItem {
            variant_id: VariantId::new(),
            product_name: "Geometric Wolf".to_string(),
            variant_description: "acrylic, 2x2, 3".to_string(),
            sku: "GW-A-22-3".to_string(),
            unit_price: Price::from_rupees(rupees),
            quantity: 1,
            image: None,
        });
        cart
    }

    #[test]
    fn test_shipping_free_at_threshold() {
        assert_eq!(shipping_cost(Price::from_rupees(5000)), Price::ZERO);
    }

    #[test]
    fn test_shipping_charged_below_threshold() {
        assert_eq!(shipping_cost(Price::from_rupees(4999)), Price::from_rupees(200));
    }

    #[test]
    fn test_shipping_free_above_threshold() {
        assert_eq!(shipping_cost(Price::from_rupees(5001)), Price::ZERO);
    }

    #[test]
    fn test_validate_accepts_well_formed_form() {
        let email = validate(&form()).unwrap();
        assert_eq!(email.as_str(), "ayesha@example.com");
    }

    #[test]
    fn test_validate_normalizes_email() {
        let mut form = form();
        form.email = "  Ayesha@Example.COM ".to_string();
        let email = validate(&form).unwrap();
        assert_eq!(email.as_str(), "ayesha@example.com");
    }

    #[test]
    fn test_validate_rejects_bad_email() {
        let mut form = form();
        form.email = "not-an-email".to_string();
        assert_eq!(
            validate(&form).unwrap_err(),
            "Please enter a valid email address"
        );
    }

    #[test]
    fn test_validate_rejects_short_name() {
        let mut form = form();
        form.name = "A".to_string();
        assert_eq!(
            validate(&form).unwrap_err(),
            "Name must be at least 2 characters"
        );
    }

    #[test]
    fn test_validate_accepts_phone_formats() {
        for phone in ["03001234567", "+923001234567", "00923001234567"] {
            let mut form = form();
            form.phone = phone.to_string();
            assert!(validate(&form).is_ok(), "{phone} should validate");
        }
    }

    #[test]
    fn test_validate_rejects_foreign_phone() {
        for phone in ["0412345678", "1234567", "+13001234567", "030012345678"] {
            let mut form = form();
            form.phone = phone.to_string();
            assert!(validate(&form).is_err(), "{phone} should be rejected");
        }
    }

    #[test]
    fn test_validate_rejects_bad_postal_code() {
        for postal in ["4400", "440000", "44O00", ""] {
            let mut form = form();
            form.shipping.postal_code = postal.to_string();
            assert_eq!(
                validate(&form).unwrap_err(),
                "Postal code must be 5 digits",
                "{postal} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_requires_billing_when_not_same() {
        let mut form = form();
        form.use_same_address = false;
        assert_eq!(
            validate(&form).unwrap_err(),
            "Billing address is required when different from shipping"
        );
    }

    #[test]
    fn test_validate_checks_billing_fields() {
        let mut form = form();
        form.use_same_address = false;
        let mut billing = address();
        billing.postal_code = "12".to_string();
        form.billing = Some(billing);
        assert_eq!(validate(&form).unwrap_err(), "Postal code must be 5 digits");
    }

    #[test]
    fn test_validate_rejects_long_notes() {
        let mut form = form();
        form.order_notes = Some("x".repeat(501));
        assert_eq!(validate(&form).unwrap_err(), "Notes are too long");
    }

    #[test]
    fn test_build_order_fixed_cod_fields() {
        let cart = cart_with_subtotal(2000);
        let form = form();
        let email = validate(&form).unwrap();
        let order = build_order(form, email, &cart, Some("203.0.113.9".to_string()), None);

        assert_eq!(order.payment_method, "cash_on_delivery");
        assert!(order.payment_intent_id.is_none());
        assert!(order.discount_amount.is_zero());
        assert!(order.tax_rate.is_zero());
    }

    #[test]
    fn test_build_order_billing_falls_back_to_shipping() {
        let cart = cart_with_subtotal(2000);
        let form = form();
        let email = validate(&form).unwrap();
        let order = build_order(form, email, &cart, None, None);

        assert_eq!(order.billing_address.line1, order.shipping_address.line1);
        assert_eq!(order.shipping_address.country, "Pakistan");
    }

    #[test]
    fn test_build_order_uses_distinct_billing_address() {
        let cart = cart_with_subtotal(2000);
        let mut form = form();
        form.use_same_address = false;
        let mut billing = address();
        billing.line1 = "Office 7, Blue Area".to_string();
        billing.city = "Rawalpindi".to_string();
        form.billing = Some(billing);
        let email = validate(&form).unwrap();
        let order = build_order(form, email, &cart, None, None);

        assert_eq!(order.billing_address.line1, "Office 7, Blue Area");
        assert_eq!(order.billing_address.city, "Rawalpindi");
        assert_eq!(order.shipping_address.city, "Islamabad");
    }

    #[test]
    fn test_build_order_applies_free_shipping() {
        let cart = cart_with_subtotal(5200);
        let form = form();
        let email = validate(&form).unwrap();
        let order = build_order(form, email, &cart, None, None);

        assert!(order.shipping_cost.is_zero());
    }

    #[test]
    fn test_build_order_charges_flat_shipping() {
        let cart = cart_with_subtotal(3100);
        let form = form();
        let email = validate(&form).unwrap();
        let order = build_order(form, email, &cart, None, None);

        assert_eq!(order.shipping_cost, Price::from_rupees(200));
    }

    #[test]
    fn test_build_order_copies_cart_lines() {
        let mut cart = Cart::default();
        let variant_id = VariantId::new();
        cart.add_item(CartItem {
            variant_id,
            product_name: "Crescent Calligraphy".to_string(),
            variant_description: "steel, 3x4, 5".to_string(),
            sku: "CC-S-34-5".to_string(),
            unit_price: Price::from_rupees(3100),
            quantity: 2,
            image: None,
        });
        let form = form();
        let email = validate(&form).unwrap();
        let order = build_order(form, email, &cart, None, None);

        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].variant_id, variant_id);
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.items[0].price, Price::from_rupees(3100));
    }

    #[test]
    fn test_build_order_drops_blank_notes() {
        let cart = cart_with_subtotal(2000);
        let mut form = form();
        form.order_notes = Some("   ".to_string());
        let email = validate(&form).unwrap();
        let order = build_order(form, email, &cart, None, None);

        assert!(order.order_notes.is_none());
    }

    #[test]
    fn test_checkout_response_shapes() {
        let ok = CheckoutResponse::placed(OrderId::new(), "ORD-000042".to_string());
        assert!(ok.success);
        assert_eq!(ok.message.as_deref(), Some("Order placed successfully!"));

        let err = CheckoutResponse::failure("Your cart is empty");
        assert!(!err.success);
        assert_eq!(err.error.as_deref(), Some("Your cart is empty"));

        let json = serde_json::to_value(&err).unwrap();
        assert!(json.get("order_id").is_none());
    }
}
