//! Parsing of a single Google result page.

use scraper::{ElementRef, Html, Selector};

use crate::{Result, SearchError};

/// Markers present on Google's bot-check ("unusual traffic") page.
const BLOCK_MARKERS: [&str; 2] = ["/sorry/index", "recaptcha"];

/// Raw links and pagination state extracted from one result page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultPage {
    /// `href` values of the result container's anchors, in document order.
    pub hrefs: Vec<String>,
    /// Whether the page links to further result pages.
    pub has_next: bool,
}

impl ResultPage {
    /// Parses a result page.
    ///
    /// Anchors are taken from the `#search` container. With `only_standard`
    /// set, only anchors whose parent is an `h3` are kept. A page without a
    /// container yields no links, unless it is a bot-check page, which is
    /// reported as [`SearchError::Blocked`].
    pub fn parse(html: &str, only_standard: bool) -> Result<Self> {
        let document = Html::parse_document(html);

        let container_selector = selector("#search")?;
        let anchor_selector = selector("a")?;
        let nav_selector = selector("#nav")?;

        let has_next = document.select(&nav_selector).next().is_some();

        let Some(container) = document.select(&container_selector).next() else {
            if let Some(marker) = BLOCK_MARKERS.iter().find(|m| html.contains(*m)) {
                return Err(SearchError::Blocked(format!(
                    "Google returned a bot-check page ({}); slow down or use a proxy",
                    marker
                )));
            }
            return Ok(Self {
                hrefs: Vec::new(),
                has_next,
            });
        };

        let hrefs = container
            .select(&anchor_selector)
            .filter(|anchor| !only_standard || parent_is_h3(anchor))
            .filter_map(|anchor| anchor.value().attr("href"))
            .map(str::to_string)
            .collect();

        Ok(Self { hrefs, has_next })
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| SearchError::Parse(format!("Failed to parse selector: {:?}", e)))
}

fn parent_is_h3(anchor: &ElementRef<'_>) -> bool {
    anchor
        .parent()
        .and_then(ElementRef::wrap)
        .map_or(false, |parent| parent.value().name().eq_ignore_ascii_case("h3"))
}
