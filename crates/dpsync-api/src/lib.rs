//! Async client for the site server's content-distribution management API.
//!
//! The API is a small JSON-over-HTTP surface: distribution point discovery,
//! per-kind content enumeration, and the distribute action that copies one
//! content item onto a target distribution point. Every response is wrapped
//! in a `{ status, message?, value }` envelope which [`SiteClient`] strips
//! before callers see the payload.
//!
//! Authentication is either an API key (sent as a `Authorization: Bearer`
//! default header) or username/password (session login that stores a cookie
//! in the shared jar). Transport concerns (TLS, timeout, cookies) live in
//! [`TransportConfig`] so both auth flows build their `reqwest::Client` the
//! same way.

pub mod auth;
pub mod client;
pub mod content;
pub mod error;
pub mod models;
pub mod nodes;
pub mod transport;

pub use auth::Credentials;
pub use client::SiteClient;
pub use content::ContentKind;
pub use error::Error;
pub use models::{ContentItem, DistributionPoint};
pub use transport::{TlsMode, TransportConfig};
