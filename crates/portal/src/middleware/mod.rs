//! HTTP middleware stack for the portal.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, added in `main`)
//! 2. Request ID (`x-request-id`, generated if absent, echoed back)
//! 3. `TraceLayer` (request span carrying the request ID)
//! 4. Session layer (tower-sessions with an in-memory store)

pub mod request_id;
pub mod session;

pub use request_id::{
    REQUEST_ID_HEADER, RequestSpan, propagate_request_id_layer, set_request_id_layer,
};
pub use session::create_session_layer;
