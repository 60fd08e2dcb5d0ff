//! User-Agent header sources.

use std::path::Path;

use rand::seq::SliceRandom;

use crate::Result;

/// User agent sent when nothing else is configured.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/4.0 (compatible; MSIE 8.0; Windows NT 6.0)";

/// Built-in pool for [`RandomUserAgent::builtin`].
const BUILTIN_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
    DEFAULT_USER_AGENT,
];

/// Supplies the User-Agent header for each request.
pub trait UserAgentProvider: Send + Sync {
    /// Returns the user agent for the next request.
    fn user_agent(&self) -> String;
}

/// Always sends the same user agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedUserAgent(String);

impl FixedUserAgent {
    /// Creates a provider for the given user agent.
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self(user_agent.into())
    }
}

impl Default for FixedUserAgent {
    fn default() -> Self {
        Self::new(DEFAULT_USER_AGENT)
    }
}

impl UserAgentProvider for FixedUserAgent {
    fn user_agent(&self) -> String {
        self.0.clone()
    }
}

/// Picks a user agent uniformly at random from a list on every request.
#[derive(Debug, Clone)]
pub struct RandomUserAgent {
    agents: Vec<String>,
}

impl RandomUserAgent {
    /// Creates a provider over the given agents. Blank entries are dropped.
    pub fn new<I, S>(agents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let agents = agents
            .into_iter()
            .map(Into::into)
            .map(|agent: String| agent.trim().to_string())
            .filter(|agent| !agent.is_empty())
            .collect();
        Self { agents }
    }

    /// Creates a provider over the built-in list of common browsers.
    pub fn builtin() -> Self {
        Self::new(BUILTIN_USER_AGENTS.iter().copied())
    }

    /// Parses one user agent per line.
    pub fn from_lines(text: &str) -> Self {
        Self::new(text.lines())
    }

    /// Loads one user agent per line from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_lines(&text))
    }

    /// Returns the agents in the pool.
    pub fn agents(&self) -> &[String] {
        &self.agents
    }
}

impl Default for RandomUserAgent {
    fn default() -> Self {
        Self::builtin()
    }
}

impl UserAgentProvider for RandomUserAgent {
    fn user_agent(&self) -> String {
        self.agents
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string())
    }
}
