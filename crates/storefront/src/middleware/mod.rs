//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (added by the binary)
//! 2. `TraceLayer` (request span, see [`make_request_span`])
//! 3. Request ID (records into the span, Sentry scope and response)
//! 4. Session layer (tower-sessions with `MemoryStore`)
//! 5. Body limit (`STOREFRONT_MAX_UPLOAD_BYTES`)

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, SessionApi, clear_current_customer, set_current_customer};
pub use request_id::{REQUEST_ID_HEADER, RequestId, make_request_span, request_id_middleware};
pub use session::create_session_layer;
