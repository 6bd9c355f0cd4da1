//! HTTP server layer for the resize proxy.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │             ANY /{path}?url=...&width=..&mobile                 │
//! │                                                                 │
//! │  ┌──────────────────────────┐  ┌─────────────────────────────┐  │
//! │  │        handlers          │  │           routes            │  │
//! │  │ (request → ProxyService) │  │ (router, CORS, tracing)     │  │
//! │  └──────────────────────────┘  └─────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    health_handler, image_response, proxy_handler, AppState, HealthResponse,
    DEFAULT_CACHE_MAX_AGE, FALLBACK_HEADER,
};
pub use routes::{create_router, RouterConfig};
