use miniapp_kit_storage::StorageError;
use serde::Serialize;
use thiserror::Error;

/// Unified error type for request operations.
///
/// Every failure of a call surfaces as one of these variants; there is no
/// retry layer, so a returned error is final for that call. Callers still
/// inspect [`Envelope::code`](crate::Envelope::code) for application-level
/// failures, which are not errors at this level.
#[derive(Error, Debug, Clone, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum RequestError {
    /// The url is empty or cannot be used for a request.
    #[error("Invalid url: '{0}'")]
    InvalidUrl(String),

    /// A transport-level failure (DNS resolution, connection refused, broken body, ...).
    #[error("Network error for {url}: {detail}")]
    Network {
        /// Resolved request url.
        url: String,
        /// Error details.
        detail: String,
    },

    /// The request did not complete within its timeout.
    #[error("Request timeout after {timeout_ms}ms: {url}")]
    Timeout {
        /// Resolved request url.
        url: String,
        /// Configured timeout in milliseconds.
        timeout_ms: u64,
    },

    /// A non-2xx response whose body is not a decodable envelope.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated for display.
        body: String,
    },

    /// The response body could not be decoded into the expected envelope.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Request data could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Reading local storage (e.g. the auth token) failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A response handler rejected the response.
    #[error("Rejected by {handler}: {reason}")]
    Rejected {
        /// Name of the rejecting handler.
        handler: String,
        /// Why the response was rejected.
        reason: String,
    },
}

impl RequestError {
    /// Whether the error was caused by the request timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Convenience type alias for `Result<T, RequestError>`.
pub type Result<T> = std::result::Result<T, RequestError>;
