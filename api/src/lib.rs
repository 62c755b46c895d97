//! # Boxoffice API Client
//!
//! Typed HTTP client for the Boxoffice marketplace API.
//!
//! Every service-layer call in the storefront goes through [`ApiClient`]:
//! it prefixes requests with a fixed API namespace, sends JSON or multipart
//! bodies with credentials (cookie-based session), and funnels every failure
//! through a single user-facing notification.
//!
//! Failures are explicit: a failed call returns `Err(ApiError)` rather than
//! a silent empty value, so callers cannot mistake a failure for
//! succeeded-with-no-data. The client still owns the "exactly one toast per
//! failed request" behavior via the injected [`Notifier`].
//!
//! ## Example
//!
//! ```no_run
//! use boxoffice_api::{ApiClient, ApiPrefix, TracingNotifier};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::new("https://api.example.com", Arc::new(TracingNotifier))?;
//!
//!     let event: serde_json::Value = client
//!         .get(ApiPrefix::Events, "evt-123", &[])
//!         .await?;
//!
//!     println!("{event:?}");
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod notify;
pub mod types;

// Re-export main types for convenience
pub use client::ApiClient;
pub use error::ApiError;
pub use notify::{Notifier, TracingNotifier};
pub use types::{ApiErrorBody, ApiPrefix, GENERIC_ERROR_MESSAGE, message_for_code};
