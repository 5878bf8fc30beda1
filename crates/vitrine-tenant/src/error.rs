//! Errors from the tenant data API.

/// Errors returned by [`TenantApi`](crate::TenantApi).
#[derive(Debug, thiserror::Error)]
pub enum TenantApiError {
    /// Connection, timeout or body decoding failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("{method} {url} failed with status {status}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
    },

    /// A configured collection URL cannot take a path segment.
    #[error("invalid collection URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A lookup by id matched nothing.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },
}
