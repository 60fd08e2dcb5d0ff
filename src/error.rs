//! Error types for the search library.

use thiserror::Error;

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors that can occur during search operations.
#[derive(Error, Debug)]
pub enum SearchError {
    /// An extra query parameter collides with one the paginator sets itself.
    #[error("GET parameter '{0}' overlaps with a built-in GET parameter")]
    ReservedParameter(String),

    /// The request cannot be paginated as configured.
    #[error("Invalid search request: {0}")]
    InvalidRequest(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Transport failure reported by a non-reqwest fetcher.
    #[error("Network error: {0}")]
    Network(String),

    /// The engine answered with a bot-check page instead of results.
    #[error("Search blocked: {0}")]
    Blocked(String),

    /// A single-result lookup produced no links.
    #[error("No results found")]
    Exhausted,

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// URL parsing error.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Proxy configuration could not be used.
    #[error("Invalid proxy: {0}")]
    InvalidProxy(String),

    /// Reading a local resource failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SearchError {
    /// Returns true for errors raised while validating a request, before
    /// any page was fetched.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::ReservedParameter(_) | Self::InvalidRequest(_))
    }

    /// Returns true for transport failures from the page fetcher.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Network(_))
    }
}
