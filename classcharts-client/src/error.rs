//! Error types for the ClassCharts client

use thiserror::Error;

/// Errors that can occur when using a ClassCharts client
///
/// Every fallible operation in this crate returns this type, so it doubles as
/// the base error for callers that do not care about the specific kind.
#[derive(Error, Debug)]
pub enum ClassChartsError {
    /// Login was rejected or the session credentials could not be read
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// A caller-supplied option or identifier was missing or invalid
    #[error("Validation failed: {0}")]
    Validation(String),

    /// An authenticated method was called before a successful login
    #[error("No session ID")]
    NoSession,

    /// The upstream API or the transport failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Client initialization failed
    #[error("Client initialization failed: {0}")]
    ClientInit(String),
}

/// Failures of a single API round-trip
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP request failed before a response was read
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with `success: 0`
    #[error("{0}")]
    Upstream(String),

    /// Invalid HTTP status code received
    #[error("Invalid HTTP status: {status}")]
    InvalidStatus {
        /// The status code that was received
        status: reqwest::StatusCode,
    },

    /// The response body was not the JSON shape the endpoint returns
    #[error("Error parsing JSON. Returned response: {body}")]
    MalformedPayload {
        /// Raw response body
        body: String,
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
    },
}

impl From<reqwest::Error> for ClassChartsError {
    fn from(error: reqwest::Error) -> Self {
        ClassChartsError::Api(ApiError::Request(error))
    }
}

impl ClassChartsError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        ClassChartsError::Validation(message.into())
    }

    pub(crate) fn authentication(message: impl Into<String>) -> Self {
        ClassChartsError::Authentication(message.into())
    }
}
