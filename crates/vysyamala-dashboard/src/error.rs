//! Error types for dashboard fetches

use std::io;
use thiserror::Error;

/// Result type alias for dashboard operations
pub type DashboardResult<T> = Result<T, DashboardError>;

/// Errors that can occur while fetching or exporting dashboard data
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Transport-level failure (connect, TLS, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response
    #[error("API returned status {status} for {path}")]
    Status {
        /// Endpoint path
        path: String,
        /// HTTP status code
        status: u16,
    },

    /// The body parsed as JSON but not into the expected shape
    #[error("Unexpected response from {endpoint}: {message}")]
    Decode {
        /// Endpoint path
        endpoint: String,
        /// Error message
        message: String,
    },

    /// The API answered with its success flag unset
    #[error("{endpoint} reported failure: {message}")]
    Unsuccessful {
        /// Endpoint path
        endpoint: String,
        /// Server supplied message, if any
        message: String,
    },

    /// Request could not be built
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Error message
        message: String,
    },

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error while writing an export
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration or identity error from the core crate
    #[error(transparent)]
    Core(#[from] vysyamala_core::Error),
}

impl DashboardError {
    /// Create a decode error for an endpoint
    #[must_use]
    pub fn decode<E: Into<String>, S: Into<String>>(endpoint: E, message: S) -> Self {
        Self::Decode {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create an invalid request error
    #[must_use]
    pub fn invalid_request<S: Into<String>>(message: S) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Whether the failure happened before any response was received
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}
