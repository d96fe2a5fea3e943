//! Session-stored state.
//!
//! The storefront keeps exactly one thing in the session: the shopper's
//! cart. Handlers hydrate it on access and write it back after every
//! mutation, so the Postgres session store is the single source of
//! truth across reloads.

/// Session keys for cart state.
pub mod keys {
    /// Key for storing the shopping cart.
    pub const CART: &str = "cart";
}
