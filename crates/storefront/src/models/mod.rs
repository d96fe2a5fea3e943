//! Domain models for the storefront.

pub mod cart;
pub mod catalog;
pub mod orders;
pub mod session;

pub use cart::{Cart, CartItem, VariantSummary};
pub use catalog::{
    CategoryRef, CategorySummary, CategoryTile, DetailImage, DetailVariant, FilterAttribute,
    HeroContent, HomepageContent, ImageRef, ListParams, ProductCard, ProductDetail, ProductListItem,
    ProductListPage, ProductSort, PromoBanner, RatingCount, Review, ReviewSummary, ReviewsResult,
};
pub use orders::{Address, NewOrder, OrderConfirmation, OrderItemView, OrderLine, SHIPPING_COUNTRY};
