use std::fmt;

use async_trait::async_trait;

use super::types::Country;

/// Errors surfaced by the upstream country API.
///
/// `Clone` so a single in-flight result can be handed to every caller
/// waiting on it.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamError {
    /// Transport-level failure (DNS, connection refused, reset).
    Network(String),
    /// The API answered with a non-success status.
    Status { status: u16, message: String },
    /// The response body was not the JSON shape we expect.
    Decode(String),
    /// The background task running the fetch died before producing a result.
    Task(String),
    /// The code cannot name any country, so no request was sent.
    InvalidCode(String),
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamError::Network(msg) => write!(f, "network error: {msg}"),
            UpstreamError::Status { status, message } => {
                write!(f, "upstream error (HTTP {status}): {message}")
            }
            UpstreamError::Decode(msg) => write!(f, "decode error: {msg}"),
            UpstreamError::Task(msg) => write!(f, "fetch task failed: {msg}"),
            UpstreamError::InvalidCode(code) => write!(f, "invalid country code '{code}'"),
        }
    }
}

impl std::error::Error for UpstreamError {}

impl UpstreamError {
    /// True when the requested record does not exist, either because the
    /// API said so or because the code could never match one.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            UpstreamError::Status { status: 404, .. } | UpstreamError::InvalidCode(_)
        )
    }
}

/// A read-only source of country records.
#[async_trait]
pub trait CountrySource: Send + Sync {
    /// Returns the name of the source, for logs.
    fn name(&self) -> &str;

    /// Every country, summary fields only.
    async fn fetch_all_countries(&self) -> Result<Vec<Country>, UpstreamError>;

    /// One country with its full field set.
    async fn fetch_country_by_code(&self, code: &str) -> Result<Country, UpstreamError>;

    /// Summary records for the given codes.
    ///
    /// Never fails: an empty input or any upstream failure yields an empty list.
    async fn fetch_countries_by_codes(&self, codes: &[String]) -> Vec<Country>;
}
