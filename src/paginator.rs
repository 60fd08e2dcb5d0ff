//! Paginated result-link extraction.
//!
//! [`ResultPaginator::search`] turns a [`SearchRequest`] into a lazy stream
//! of result links. Pages are fetched one at a time, only when the consumer
//! has drained the links of the previous page, with the request's pause
//! before every page fetch. Dropping the stream stops the search.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashSet, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use tracing::debug;

use crate::fetcher::PageFetcher;
use crate::filter::filter_result;
use crate::page::ResultPage;
use crate::urls::{home_url, page_url};
use crate::{Result, SearchError, SearchRequest};

/// Stream of result links produced by [`ResultPaginator::search`].
///
/// The stream ends after the first error.
pub type LinkStream = BoxStream<'static, Result<String>>;

/// Pages through Google results for a query.
///
/// The paginator holds no per-search state; every call to [`search`]
/// starts a fresh sequence. Cookies live in the fetcher.
///
/// [`search`]: ResultPaginator::search
#[derive(Clone)]
pub struct ResultPaginator {
    fetcher: Arc<dyn PageFetcher>,
}

impl ResultPaginator {
    /// Creates a paginator fetching pages through the given session.
    pub fn new<F: PageFetcher + 'static>(fetcher: F) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
        }
    }

    /// Creates a paginator sharing an existing fetcher.
    pub fn with_fetcher(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Searches for the request's query, yielding result links.
    ///
    /// The request is validated immediately; nothing is fetched until the
    /// stream is first polled. The first poll visits the home page once to
    /// pick up session cookies, then result pages are fetched from
    /// `request.start` until `request.stop` is reached or a page has no
    /// link to further results.
    pub fn search(&self, request: SearchRequest) -> Result<LinkStream> {
        request.validate()?;

        debug!(
            "Searching \"{}\" from offset {} (stop: {:?})",
            request.query, request.start, request.stop
        );

        let fetcher = Arc::clone(&self.fetcher);
        let links = stream::try_unfold(PageState::new(request), move |state| {
            let fetcher = Arc::clone(&fetcher);
            async move { state.next_link(fetcher.as_ref()).await }
        });

        Ok(links.boxed())
    }

    /// Returns the first result for the query.
    ///
    /// Fetches a single one-result page without pausing. Fails with
    /// [`SearchError::Exhausted`] if the page yields no links.
    pub async fn lucky(&self, request: SearchRequest) -> Result<String> {
        let request = SearchRequest {
            num: 1,
            start: 0,
            stop: Some(1),
            pause_secs: 0.0,
            ..request
        };

        let mut links = self.search(request)?;
        links.try_next().await?.ok_or(SearchError::Exhausted)
    }
}

/// Progress of one search sequence.
struct PageState {
    request: SearchRequest,
    /// Offset of the next page to fetch.
    start: u32,
    /// Hashes of every link yielded so far.
    seen: HashSet<u64>,
    /// Links of the last fetched page not yet handed out.
    pending: VecDeque<String>,
    warmed_up: bool,
    exhausted: bool,
}

impl PageState {
    fn new(request: SearchRequest) -> Self {
        Self {
            start: request.start,
            request,
            seen: HashSet::new(),
            pending: VecDeque::new(),
            warmed_up: false,
            exhausted: false,
        }
    }

    fn has_more_pages(&self) -> bool {
        !self.exhausted && self.request.in_range(self.start)
    }

    async fn next_link(mut self, fetcher: &dyn PageFetcher) -> Result<Option<(String, Self)>> {
        if !self.warmed_up {
            fetcher.fetch(&home_url(&self.request.tld)).await?;
            self.warmed_up = true;
        }

        loop {
            if let Some(link) = self.pending.pop_front() {
                return Ok(Some((link, self)));
            }
            if !self.has_more_pages() {
                debug!("Search \"{}\" finished at offset {}", self.request.query, self.start);
                return Ok(None);
            }
            self.fetch_page(fetcher).await?;
        }
    }

    async fn fetch_page(&mut self, fetcher: &dyn PageFetcher) -> Result<()> {
        let url = page_url(&self.request, self.start);

        let pause = self.request.pause();
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }

        debug!("Fetching result page {}", url);
        let html = fetcher.fetch(&url).await?;
        let page = ResultPage::parse(&html, self.request.only_standard)?;

        let found = page.hrefs.len();
        for href in &page.hrefs {
            let Some(link) = filter_result(href) else {
                continue;
            };
            if self.seen.insert(link_hash(&link)) {
                self.pending.push_back(link);
            }
        }
        debug!(
            "Page at offset {}: {} anchors, {} new links",
            self.start,
            found,
            self.pending.len()
        );

        match self.start.checked_add(self.request.num) {
            Some(next) if page.has_next => self.start = next,
            _ => self.exhausted = true,
        }

        Ok(())
    }
}

/// Links are deduplicated by hash, so two distinct links with colliding
/// hashes count as one.
fn link_hash(link: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    link.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    const HOME: &str = "<html><body>home</body></html>";

    /// Serves canned pages by URL and records every request.
    #[derive(Default)]
    struct ScriptedFetcher {
        pages: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl ScriptedFetcher {
        fn page(mut self, url: &str, html: impl Into<String>) -> Self {
            self.pages.insert(url.to_string(), html.into());
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for ScriptedFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.requests.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| SearchError::Network(format!("no page for {}", url)))
        }
    }

    fn result_page(hrefs: &[&str], has_next: bool) -> String {
        let anchors: String = hrefs
            .iter()
            .map(|href| format!(r#"<div class="g"><h3><a href="{}">r</a></h3></div>"#, href))
            .collect();
        let nav = if has_next {
            r#"<table id="nav"><tr><td><a href="/search?start=10">Next</a></td></tr></table>"#
        } else {
            ""
        };
        format!(
            r#"<html><body><div id="search">{}</div>{}</body></html>"#,
            anchors, nav
        )
    }

    fn quick(query: &str) -> SearchRequest {
        SearchRequest::new(query).with_pause(Duration::ZERO)
    }

    async fn collect(paginator: &ResultPaginator, request: SearchRequest) -> Result<Vec<String>> {
        paginator.search(request)?.try_collect().await
    }

    #[tokio::test]
    async fn test_search_single_page() {
        let request = quick("test").with_stop(10);
        let fetcher = Arc::new(
            ScriptedFetcher::default()
                .page("https://www.google.com/", HOME)
                .page(
                    &page_url(&request, 0),
                    result_page(
                        &[
                            "/url?q=http://example.com/a&amp;sa=U",
                            "http://www.google.com/x",
                            "https://other.org/b",
                        ],
                        false,
                    ),
                ),
        );
        let paginator = ResultPaginator::new(Arc::clone(&fetcher));

        let links = collect(&paginator, request).await.unwrap();
        assert_eq!(links, vec!["http://example.com/a", "https://other.org/b"]);
        assert_eq!(fetcher.requests().len(), 2);
        assert_eq!(fetcher.requests()[0], "https://www.google.com/");
    }

    #[tokio::test]
    async fn test_search_follows_pages_until_no_nav() {
        let request = quick("rust");
        let fetcher = Arc::new(
            ScriptedFetcher::default()
                .page("https://www.google.com/", HOME)
                .page(&page_url(&request, 0), result_page(&["https://a.com/"], true))
                .page(&page_url(&request, 10), result_page(&["https://b.com/"], true))
                .page(&page_url(&request, 20), result_page(&["https://c.com/"], false)),
        );
        let paginator = ResultPaginator::new(Arc::clone(&fetcher));

        let links = collect(&paginator, request.clone()).await.unwrap();
        assert_eq!(links, vec!["https://a.com/", "https://b.com/", "https://c.com/"]);
        assert_eq!(
            fetcher.requests(),
            vec![
                "https://www.google.com/".to_string(),
                page_url(&request, 0),
                page_url(&request, 10),
                page_url(&request, 20),
            ]
        );
    }

    #[tokio::test]
    async fn test_search_respects_stop_offset() {
        let request = quick("rust").with_num(20).with_stop(40);
        let fetcher = Arc::new(
            ScriptedFetcher::default()
                .page("https://www.google.com/", HOME)
                .page(&page_url(&request, 0), result_page(&["https://a.com/"], true))
                .page(&page_url(&request, 20), result_page(&["https://b.com/"], true)),
        );
        let paginator = ResultPaginator::new(Arc::clone(&fetcher));

        let links = collect(&paginator, request).await.unwrap();
        assert_eq!(links, vec!["https://a.com/", "https://b.com/"]);
        assert_eq!(fetcher.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_search_starts_at_offset() {
        let request = quick("rust").with_start(30);
        let fetcher = Arc::new(
            ScriptedFetcher::default()
                .page("https://www.google.com/", HOME)
                .page(&page_url(&request, 30), result_page(&["https://d.com/"], false)),
        );
        let paginator = ResultPaginator::new(Arc::clone(&fetcher));

        let links = collect(&paginator, request.clone()).await.unwrap();
        assert_eq!(links, vec!["https://d.com/"]);
        assert!(fetcher.requests()[1].contains("&start=30&"));
    }

    #[tokio::test]
    async fn test_search_deduplicates_across_pages() {
        let request = quick("dup");
        let fetcher = Arc::new(
            ScriptedFetcher::default()
                .page("https://www.google.com/", HOME)
                .page(
                    &page_url(&request, 0),
                    result_page(
                        &[
                            "https://a.com/",
                            "/url?q=https://a.com/&amp;sa=U",
                            "https://b.com/",
                            "https://a.com/",
                        ],
                        true,
                    ),
                )
                .page(
                    &page_url(&request, 10),
                    result_page(&["https://b.com/", "https://c.com/"], false),
                ),
        );
        let paginator = ResultPaginator::new(fetcher);

        let links = collect(&paginator, request).await.unwrap();
        assert_eq!(links, vec!["https://a.com/", "https://b.com/", "https://c.com/"]);
    }

    #[tokio::test]
    async fn test_search_stop_not_after_start_yields_nothing() {
        for (start, stop) in [(0, 0), (20, 20), (30, 10)] {
            let fetcher = Arc::new(ScriptedFetcher::default().page("https://www.google.com/", HOME));
            let paginator = ResultPaginator::new(Arc::clone(&fetcher));
            let request = quick("test").with_start(start).with_stop(stop);

            let links = collect(&paginator, request).await.unwrap();
            assert!(links.is_empty());
            assert_eq!(fetcher.requests(), vec!["https://www.google.com/".to_string()]);
        }
    }

    #[tokio::test]
    async fn test_search_stops_when_offset_would_overflow() {
        let request = quick("deep").with_start(u32::MAX - 5);
        let fetcher = Arc::new(
            ScriptedFetcher::default()
                .page("https://www.google.com/", HOME)
                .page(
                    &page_url(&request, u32::MAX - 5),
                    result_page(&["https://last.com/"], true),
                ),
        );
        let paginator = ResultPaginator::new(Arc::clone(&fetcher));

        let links = collect(&paginator, request).await.unwrap();
        assert_eq!(links, vec!["https://last.com/"]);
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_search_empty_page_stops_without_next_fetch() {
        let request = quick("nothing");
        let fetcher = Arc::new(
            ScriptedFetcher::default()
                .page("https://www.google.com/", HOME)
                .page(&page_url(&request, 0), result_page(&[], false)),
        );
        let paginator = ResultPaginator::new(Arc::clone(&fetcher));

        let links = collect(&paginator, request).await.unwrap();
        assert!(links.is_empty());
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_search_only_standard() {
        let request = quick("std").with_only_standard(true);
        let html = r#"<div id="search">
            <h3><a href="https://organic.com/">organic</a></h3>
            <div><a href="https://sidebar.com/">sidebar</a></div>
        </div>"#;
        let fetcher = ScriptedFetcher::default()
            .page("https://www.google.com/", HOME)
            .page(&page_url(&request, 0), html);
        let paginator = ResultPaginator::new(fetcher);

        let links = collect(&paginator, request).await.unwrap();
        assert_eq!(links, vec!["https://organic.com/"]);
    }

    #[tokio::test]
    async fn test_search_reserved_param_fails_before_fetch() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        let paginator = ResultPaginator::new(Arc::clone(&fetcher));
        let request = quick("test").with_extra_param("q", "other");

        match paginator.search(request) {
            Err(SearchError::ReservedParameter(name)) => assert_eq!(name, "q"),
            Err(other) => panic!("Expected ReservedParameter, got {:?}", other),
            Ok(_) => panic!("Expected ReservedParameter, got a stream"),
        }
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn test_search_is_lazy() {
        let fetcher = Arc::new(ScriptedFetcher::default().page("https://www.google.com/", HOME));
        let paginator = ResultPaginator::new(Arc::clone(&fetcher));

        let stream = paginator.search(quick("lazy")).unwrap();
        assert!(fetcher.requests().is_empty());
        drop(stream);
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn test_search_warm_up_failure_propagates() {
        let fetcher = ScriptedFetcher::default();
        let paginator = ResultPaginator::new(fetcher);

        let err = collect(&paginator, quick("test")).await.unwrap_err();
        assert!(err.is_network(), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_search_fetch_failure_ends_stream() {
        let request = quick("fail");
        let fetcher = ScriptedFetcher::default()
            .page("https://www.google.com/", HOME)
            .page(&page_url(&request, 0), result_page(&["https://a.com/"], true));
        let paginator = ResultPaginator::new(fetcher);

        let mut stream = paginator.search(request).unwrap();
        assert_eq!(stream.next().await.unwrap().unwrap(), "https://a.com/");
        assert!(stream.next().await.unwrap().is_err());
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_search_blocked_page() {
        let request = quick("blocked");
        let fetcher = ScriptedFetcher::default()
            .page("https://www.google.com/", HOME)
            .page(
                &page_url(&request, 0),
                r#"<html><body><form action="/sorry/index"></form></body></html>"#,
            );
        let paginator = ResultPaginator::new(fetcher);

        let err = collect(&paginator, request).await.unwrap_err();
        assert!(matches!(err, SearchError::Blocked(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_search_abandoned_stream_fetches_no_more_pages() {
        let request = quick("abandon");
        let fetcher = Arc::new(
            ScriptedFetcher::default()
                .page("https://www.google.com/", HOME)
                .page(
                    &page_url(&request, 0),
                    result_page(&["https://a.com/", "https://b.com/"], true),
                ),
        );
        let paginator = ResultPaginator::new(Arc::clone(&fetcher));

        let first: Vec<String> = paginator
            .search(request)
            .unwrap()
            .take(1)
            .try_collect()
            .await
            .unwrap();
        assert_eq!(first, vec!["https://a.com/"]);
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_search_calls_are_independent() {
        let request = quick("again");
        let fetcher = ScriptedFetcher::default()
            .page("https://www.google.com/", HOME)
            .page(&page_url(&request, 0), result_page(&["https://a.com/"], false));
        let paginator = ResultPaginator::new(fetcher);

        let first = collect(&paginator, request.clone()).await.unwrap();
        let second = collect(&paginator, request).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_pauses_before_each_page() {
        let request = SearchRequest::new("slow").with_pause(Duration::from_secs(2));
        let fetcher = ScriptedFetcher::default()
            .page("https://www.google.com/", HOME)
            .page(&page_url(&request, 0), result_page(&["https://a.com/"], true))
            .page(&page_url(&request, 10), result_page(&["https://b.com/"], false));
        let paginator = ResultPaginator::new(fetcher);

        let before = tokio::time::Instant::now();
        let links = collect(&paginator, request).await.unwrap();
        assert_eq!(links.len(), 2);
        assert!(before.elapsed() >= Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_lucky_returns_first_link() {
        let request = SearchRequest::new("lucky");
        let single = request.clone().with_num(1).with_stop(1);
        let fetcher = Arc::new(
            ScriptedFetcher::default()
                .page("https://www.google.com/", HOME)
                .page(
                    &page_url(&single, 0),
                    result_page(&["https://first.com/", "https://second.com/"], true),
                ),
        );
        let paginator = ResultPaginator::new(Arc::clone(&fetcher));

        let link = paginator.lucky(request).await.unwrap();
        assert_eq!(link, "https://first.com/");
        assert!(fetcher.requests()[1].contains("&num=1&"));
    }

    #[tokio::test]
    async fn test_lucky_exhausted() {
        let request = SearchRequest::new("nothing");
        let single = request.clone().with_num(1).with_stop(1);
        let fetcher = ScriptedFetcher::default()
            .page("https://www.google.com/", HOME)
            .page(&page_url(&single, 0), result_page(&["https://www.google.com/x"], false));
        let paginator = ResultPaginator::new(fetcher);

        let err = paginator.lucky(request).await.unwrap_err();
        assert!(matches!(err, SearchError::Exhausted));
    }

    #[test]
    fn test_link_hash_stable_within_process() {
        assert_eq!(link_hash("https://a.com/"), link_hash("https://a.com/"));
        assert_ne!(link_hash("https://a.com/"), link_hash("https://b.com/"));
    }
}
