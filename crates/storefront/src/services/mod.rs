//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `email` - Transactional email delivery via SMTP

pub mod email;

pub use email::{EmailError, EmailLineItem, EmailService, OrderConfirmationEmail};
