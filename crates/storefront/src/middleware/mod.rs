//! HTTP middleware stack for the storefront API.
//!
//! # Middleware Order (outermost to innermost)
//!
//! 1. Sentry layers (capture errors, trace transactions)
//! 2. Session layer (tower-sessions with `PostgreSQL` store)
//! 3. `TraceLayer` (request tracing)
//! 4. Request ID (add unique ID to each request)

pub mod request_id;
pub mod session;

pub use request_id::request_id_middleware;
pub use session::create_session_layer;
