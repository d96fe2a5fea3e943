//! Session cart model.
//!
//! The cart lives entirely in the session store; nothing is written to
//! order tables until checkout. Lines are keyed by variant, so adding a
//! variant that is already present merges quantities instead of creating
//! a duplicate line.

use serde::{Deserialize, Serialize};

use forgeline_core::{Price, VariantId};

use super::catalog::ImageRef;

/// One line in the cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub variant_id: VariantId,
    pub product_name: String,
    /// Attribute values joined for display, e.g. "acrylic, 2x2, 3".
    pub variant_description: String,
    pub sku: String,
    /// Unit price captured when the line was added.
    pub unit_price: Price,
    pub quantity: u32,
    pub image: Option<ImageRef>,
}

impl CartItem {
    /// Line total (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// Variant data fetched when a line is added, before quantity is known.
#[derive(Debug, Clone)]
pub struct VariantSummary {
    pub variant_id: VariantId,
    pub product_name: String,
    pub variant_description: String,
    pub sku: String,
    pub unit_price: Price,
    pub quantity_available: i32,
    pub image: Option<ImageRef>,
}

impl VariantSummary {
    /// Build the cart line for this variant with the requested quantity.
    #[must_use]
    pub fn into_cart_item(self, quantity: u32) -> CartItem {
        CartItem {
            variant_id: self.variant_id,
            product_name: self.product_name,
            variant_description: self.variant_description,
            sku: self.sku,
            unit_price: self.unit_price,
            quantity,
            image: self.image,
        }
    }
}

/// The session cart. Only `items` is stored; totals are derived.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Add an item, merging quantities when the variant is already present.
    pub fn add_item(&mut self, item: CartItem) {
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.variant_id == item.variant_id)
        {
            existing.quantity += item.quantity;
        } else {
            self.items.push(item);
        }
    }

    /// Remove the line for `variant_id`, if present.
    pub fn remove_item(&mut self, variant_id: VariantId) {
        self.items.retain(|i| i.variant_id != variant_id);
    }

    /// Set the quantity for `variant_id`. Zero removes the line; an
    /// unknown variant is a no-op.
    pub fn update_quantity(&mut self, variant_id: VariantId, quantity: u32) {
        if quantity == 0 {
            self.remove_item(variant_id);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|i| i.variant_id == variant_id) {
            item.quantity = quantity;
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Sum of line totals before shipping.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(variant_id: VariantId, price: u32, quantity: u32) -> CartItem {
        CartItem {
            variant_id,
            product_name: "Geometric Wolf".to_owned(),
            variant_description: "acrylic, 2x2, 3".to_owned(),
            sku: "GW-A-22-3".to_owned(),
            unit_price: Price::from_rupees(price),
            quantity,
            image: None,
        }
    }

    #[test]
    fn test_add_item_appends_new_variant() {
        let mut cart = Cart::default();
        cart.add_item(item(VariantId::new(), 2500, 1));
        cart.add_item(item(VariantId::new(), 3000, 2));

        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_add_item_merges_same_variant() {
        let variant_id = VariantId::new();
        let mut cart = Cart::default();
        cart.add_item(item(variant_id, 2500, 1));
        cart.add_item(item(variant_id, 2500, 2));

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 3);
    }

    #[test]
    fn test_update_quantity_sets_new_value() {
        let variant_id = VariantId::new();
        let mut cart = Cart::default();
        cart.add_item(item(variant_id, 2500, 1));

        cart.update_quantity(variant_id, 5);
        assert_eq!(cart.items[0].quantity, 5);
    }

    #[test]
    fn test_update_quantity_zero_removes_line() {
        let variant_id = VariantId::new();
        let mut cart = Cart::default();
        cart.add_item(item(variant_id, 2500, 2));

        cart.update_quantity(variant_id, 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_unknown_variant_is_noop() {
        let mut cart = Cart::default();
        cart.add_item(item(VariantId::new(), 2500, 2));

        cart.update_quantity(VariantId::new(), 7);
        assert_eq!(cart.items[0].quantity, 2);
    }

    #[test]
    fn test_remove_item_leaves_other_lines() {
        let keep = VariantId::new();
        let drop = VariantId::new();
        let mut cart = Cart::default();
        cart.add_item(item(keep, 2500, 1));
        cart.add_item(item(drop, 4000, 1));

        cart.remove_item(drop);
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].variant_id, keep);
    }

    #[test]
    fn test_subtotal_sums_line_totals() {
        let mut cart = Cart::default();
        cart.add_item(item(VariantId::new(), 2500, 2));
        cart.add_item(item(VariantId::new(), 1000, 3));

        assert_eq!(cart.subtotal(), Price::from_rupees(8000));
    }

    #[test]
    fn test_clear_empties_cart() {
        let mut cart = Cart::default();
        cart.add_item(item(VariantId::new(), 2500, 2));

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
        assert!(cart.subtotal().is_zero());
    }

    #[test]
    fn test_cart_survives_session_serialization() {
        let mut cart = Cart::default();
        cart.add_item(item(VariantId::new(), 2500, 2));

        let json = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.items.len(), 1);
        assert_eq!(restored.subtotal(), cart.subtotal());
    }
}
