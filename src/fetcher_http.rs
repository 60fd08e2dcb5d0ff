//! HTTP-based page fetcher using reqwest.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use tracing::debug;

use crate::fetcher::PageFetcher;
use crate::proxy::ProxyConfig;
use crate::user_agent::{FixedUserAgent, UserAgentProvider};
use crate::{Result, SearchError};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A page fetcher that uses plain HTTP requests via reqwest.
///
/// One `HttpFetcher` is one browsing session: every response's cookies are
/// stored in its jar and sent with later requests. Clone the jar handle
/// with [`HttpFetcher::cookie_jar`] to inspect it or reuse it in another
/// session.
pub struct HttpFetcher {
    client: Client,
    cookies: Arc<Jar>,
    user_agent: Arc<dyn UserAgentProvider>,
}

impl HttpFetcher {
    /// Creates a fetcher with the default user agent, no proxy and an
    /// empty cookie jar.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Returns a builder for a customized fetcher.
    pub fn builder() -> HttpFetcherBuilder {
        HttpFetcherBuilder::default()
    }

    /// Returns the session's cookie jar.
    pub fn cookie_jar(&self) -> Arc<Jar> {
        Arc::clone(&self.cookies)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, self.user_agent.user_agent())
            .send()
            .await?
            .error_for_status()?;
        debug!("Fetched {} ({})", url, response.status());
        let html = response.text().await?;
        Ok(html)
    }
}

/// Builder for [`HttpFetcher`].
pub struct HttpFetcherBuilder {
    user_agent: Arc<dyn UserAgentProvider>,
    proxy: Option<ProxyConfig>,
    timeout: Duration,
    cookies: Option<Arc<Jar>>,
}

impl Default for HttpFetcherBuilder {
    fn default() -> Self {
        Self {
            user_agent: Arc::new(FixedUserAgent::default()),
            proxy: None,
            timeout: DEFAULT_TIMEOUT,
            cookies: None,
        }
    }
}

impl HttpFetcherBuilder {
    /// Sets the user-agent source.
    pub fn user_agent<P: UserAgentProvider + 'static>(mut self, provider: P) -> Self {
        self.user_agent = Arc::new(provider);
        self
    }

    /// Routes every request through the given proxy.
    pub fn proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Starts the session from an existing cookie jar.
    pub fn cookie_jar(mut self, cookies: Arc<Jar>) -> Self {
        self.cookies = Some(cookies);
        self
    }

    /// Builds the fetcher.
    pub fn build(self) -> Result<HttpFetcher> {
        let cookies = self.cookies.unwrap_or_default();

        let mut builder = Client::builder()
            .timeout(self.timeout)
            .cookie_provider(Arc::clone(&cookies));

        if let Some(proxy) = &self.proxy {
            debug!("Using proxy: {}", proxy);
            builder = builder.proxy(proxy.to_reqwest()?);
        }

        let client = builder
            .build()
            .map_err(|e| SearchError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(HttpFetcher {
            client,
            cookies,
            user_agent: self.user_agent,
        })
    }
}
