//! HTTP middleware and extractors.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, transaction per route)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (record into the span, echo in the response)
//! 4. CORS (widget origin)

pub mod json;
pub mod request_id;

pub use json::ValidatedJson;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
