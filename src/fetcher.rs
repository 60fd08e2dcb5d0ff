//! Page fetcher abstraction for retrieving HTML content.

use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;

/// Trait for fetching the HTML content of a URL.
///
/// A fetcher is a session: cookies set by one response must be sent with
/// the next request, so the home page visit made at the start of a search
/// carries over to the result pages. Headers, cookies and proxy settings
/// are configured at construction time; `fetch` is a simple URL-in,
/// HTML-out interface.
///
/// Failures (connection, timeout, non-success status) are returned as
/// errors and are not retried.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the HTML content of the given URL.
    async fn fetch(&self, url: &str) -> Result<String>;
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for Arc<T> {
    async fn fetch(&self, url: &str) -> Result<String> {
        (**self).fetch(url).await
    }
}
