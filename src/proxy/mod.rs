//! Proxy service layer.
//!
//! Sits between the HTTP handlers and the resolve/fetch/transform components:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              HTTP Handlers              │
//! └────────────────────┬────────────────────┘
//!                      │ ProxyRequest
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │              ProxyService               │
//! │  resolve ─▶ fetch ─▶ transform (pool)   │
//! └────────────────────┬────────────────────┘
//!                      │ EncodedResult / ProxyError
//!                      ▼
//!                  HTTP response
//! ```

mod request;
mod service;

pub use request::{validate_source_url, ProxyRequest};
pub use service::{default_transform_concurrency, ProxyService};
