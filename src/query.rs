//! Search request representation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Result, SearchError};

/// Query parameters the paginator always sets; extra parameters may not
/// reuse these names.
pub const RESERVED_PARAMS: [&str; 6] = ["hl", "q", "btnG", "tbs", "safe", "tbm"];

/// Number of results Google serves per page when `num` is omitted.
pub const DEFAULT_NUM: u32 = 10;

/// Safe search level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafeSearch {
    /// No filtering.
    #[default]
    Off,
    /// Explicit results filtered.
    Active,
}

impl SafeSearch {
    /// Value of the `safe` query parameter.
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Active => "active",
        }
    }
}

/// Time range filter for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl TimeRange {
    /// Value of the `tbs` query parameter.
    pub fn as_tbs(&self) -> &'static str {
        match self {
            Self::Hour => "qdr:h",
            Self::Day => "qdr:d",
            Self::Week => "qdr:w",
            Self::Month => "qdr:m",
            Self::Year => "qdr:y",
        }
    }
}

/// Vertical to search in, sent as the `tbm` query parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    /// Regular web search.
    #[default]
    Web,
    Images,
    News,
    Videos,
    Shopping,
    Books,
    Apps,
}

impl SearchType {
    /// Value of the `tbm` query parameter. Web search leaves it empty.
    pub fn tbm(&self) -> &'static str {
        match self {
            Self::Web => "",
            Self::Images => "isch",
            Self::News => "nws",
            Self::Videos => "vid",
            Self::Shopping => "shop",
            Self::Books => "bks",
            Self::Apps => "app",
        }
    }
}

/// A paginated search with all parameters.
///
/// Fields omitted when deserializing take the same defaults as
/// [`SearchRequest::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// The search terms, not URL-encoded.
    pub query: String,
    /// Top level domain of the Google host (e.g. "com", "co.uk").
    #[serde(default = "default_tld")]
    pub tld: String,
    /// Interface language.
    #[serde(default = "default_lang")]
    pub lang: String,
    /// Raw `tbs` time filter; "0" means unrestricted.
    #[serde(default = "default_tbs")]
    pub tbs: String,
    /// Safe search level.
    #[serde(default)]
    pub safe: SafeSearch,
    /// Vertical to search in.
    #[serde(default)]
    pub search_type: SearchType,
    /// Results per page.
    #[serde(default = "default_num")]
    pub num: u32,
    /// Offset of the first result to retrieve.
    #[serde(default)]
    pub start: u32,
    /// Offset at which to stop; `None` keeps paging until results run out.
    #[serde(default)]
    pub stop: Option<u32>,
    /// Seconds to wait before every page request.
    #[serde(default = "default_pause")]
    pub pause_secs: f64,
    /// Only yield the main organic results (anchors directly under `h3`).
    #[serde(default)]
    pub only_standard: bool,
    /// Extra GET parameters appended to every page URL, already URL-encoded.
    #[serde(default)]
    pub extra_params: Vec<(String, String)>,
}

fn default_tld() -> String {
    "com".to_string()
}

fn default_lang() -> String {
    "en".to_string()
}

fn default_tbs() -> String {
    "0".to_string()
}

fn default_num() -> u32 {
    DEFAULT_NUM
}

fn default_pause() -> f64 {
    2.0
}

impl SearchRequest {
    /// Creates a new search request with the given terms.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            tld: default_tld(),
            lang: default_lang(),
            tbs: default_tbs(),
            safe: SafeSearch::Off,
            search_type: SearchType::Web,
            num: DEFAULT_NUM,
            start: 0,
            stop: None,
            pause_secs: default_pause(),
            only_standard: false,
            extra_params: Vec::new(),
        }
    }

    /// Sets the top level domain.
    pub fn with_tld(mut self, tld: impl Into<String>) -> Self {
        self.tld = tld.into();
        self
    }

    /// Sets the interface language.
    pub fn with_language(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// Sets a raw `tbs` value.
    pub fn with_tbs(mut self, tbs: impl Into<String>) -> Self {
        self.tbs = tbs.into();
        self
    }

    /// Restricts results to a recent time range.
    pub fn with_time_range(mut self, range: TimeRange) -> Self {
        self.tbs = range.as_tbs().to_string();
        self
    }

    /// Sets the safe search level.
    pub fn with_safesearch(mut self, level: SafeSearch) -> Self {
        self.safe = level;
        self
    }

    /// Sets the vertical to search in.
    pub fn with_type(mut self, search_type: SearchType) -> Self {
        self.search_type = search_type;
        self
    }

    /// Sets the number of results per page.
    pub fn with_num(mut self, num: u32) -> Self {
        self.num = num;
        self
    }

    /// Sets the first result offset.
    pub fn with_start(mut self, start: u32) -> Self {
        self.start = start;
        self
    }

    /// Sets the offset at which paging stops.
    pub fn with_stop(mut self, stop: u32) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Sets the delay before every page request.
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause_secs = pause.as_secs_f64();
        self
    }

    /// Restricts extraction to the main organic results.
    pub fn with_only_standard(mut self, only_standard: bool) -> Self {
        self.only_standard = only_standard;
        self
    }

    /// Appends an extra GET parameter. The value must already be URL-encoded.
    pub fn with_extra_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_params.push((name.into(), value.into()));
        self
    }

    /// Returns the inter-request delay. Negative or non-finite values mean no delay.
    pub fn pause(&self) -> Duration {
        Duration::try_from_secs_f64(self.pause_secs).unwrap_or_default()
    }

    /// Returns true if a page starting at `offset` is still within range.
    pub fn in_range(&self, offset: u32) -> bool {
        self.stop.map_or(true, |stop| offset < stop)
    }

    /// Checks the request before any network activity.
    pub fn validate(&self) -> Result<()> {
        if let Some((name, _)) = self
            .extra_params
            .iter()
            .find(|(name, _)| RESERVED_PARAMS.contains(&name.as_str()))
        {
            return Err(SearchError::ReservedParameter(name.clone()));
        }

        if self.num == 0 {
            return Err(SearchError::InvalidRequest(
                "results per page must be at least 1".into(),
            ));
        }

        Ok(())
    }
}
