//! Error types for the Boxoffice API client

use thiserror::Error;

/// Errors that can occur when calling the marketplace API
///
/// By the time a caller sees one of these, the user-facing notification has
/// already been emitted by the client; callers only decide what the failed
/// operation means for their own state.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived (DNS, connect, TLS)
    #[error("Request failed: {0}")]
    Request(String),

    /// API returned a non-2xx response
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Internal error code from the response body, when present
        code: Option<String>,
        /// The user-facing message chosen for this failure
        message: String,
    },

    /// Response body did not decode as the expected type
    #[error("Response parsing failed: {0}")]
    Decode(String),
}
