//! Proxy settings for the HTTP fetcher.

use std::fmt;
use std::str::FromStr;

use reqwest::Proxy as ReqwestProxy;
use url::Url;

use crate::{Result, SearchError};

/// Proxy protocol type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProxyProtocol {
    /// HTTP proxy
    #[default]
    Http,
    /// HTTPS proxy
    Https,
    /// SOCKS5 proxy
    Socks5,
}

impl ProxyProtocol {
    fn scheme(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
            Self::Socks5 => "socks5",
        }
    }

    fn default_port(&self) -> u16 {
        match self {
            Self::Http | Self::Https => 8080,
            Self::Socks5 => 1080,
        }
    }
}

/// A single proxy configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Proxy host (IP or domain)
    pub host: String,
    /// Proxy port
    pub port: u16,
    /// Proxy protocol
    pub protocol: ProxyProtocol,
    /// Optional username for authentication
    pub username: Option<String>,
    /// Optional password for authentication
    pub password: Option<String>,
}

impl ProxyConfig {
    /// Creates a new proxy configuration.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            protocol: ProxyProtocol::Http,
            username: None,
            password: None,
        }
    }

    /// Sets the proxy protocol.
    pub fn with_protocol(mut self, protocol: ProxyProtocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Sets authentication credentials.
    pub fn with_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Returns the proxy URL string.
    pub fn url(&self) -> String {
        let scheme = self.protocol.scheme();
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => {
                format!("{}://{}:{}@{}:{}", scheme, user, pass, self.host, self.port)
            }
            _ => format!("{}://{}:{}", scheme, self.host, self.port),
        }
    }

    /// Builds the reqwest proxy routing all traffic through this proxy.
    pub fn to_reqwest(&self) -> Result<ReqwestProxy> {
        ReqwestProxy::all(self.url()).map_err(|e| SearchError::InvalidProxy(e.to_string()))
    }
}

/// Credentials are left out so the config can be logged.
impl fmt::Display for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.protocol.scheme(), self.host, self.port)
    }
}

/// Parses `scheme://[user:pass@]host[:port]`, e.g. `socks5://127.0.0.1:1080`.
impl FromStr for ProxyConfig {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        let url = Url::parse(s)?;

        let protocol = match url.scheme() {
            "http" => ProxyProtocol::Http,
            "https" => ProxyProtocol::Https,
            "socks5" => ProxyProtocol::Socks5,
            scheme => {
                return Err(SearchError::InvalidProxy(format!(
                    "unsupported proxy protocol: {}",
                    scheme
                )))
            }
        };

        let host = url
            .host_str()
            .ok_or_else(|| SearchError::InvalidProxy("missing proxy host".into()))?;
        let port = url.port().unwrap_or(protocol.default_port());

        let mut config = ProxyConfig::new(host, port).with_protocol(protocol);
        if let Some(password) = url.password() {
            config = config.with_auth(url.username(), password);
        }

        Ok(config)
    }
}
