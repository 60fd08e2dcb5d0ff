//! # a3s-serp
//!
//! Programmatic access to Google result links without an official API.
//!
//! A [`ResultPaginator`] walks Google's result pages for a [`SearchRequest`]
//! and yields the links it finds as a lazy stream:
//!
//! - Links back to Google itself are dropped and `/url?q=` redirects are
//!   unwrapped
//! - Each link is yielded at most once per search
//! - Pages are fetched one at a time with a pause between requests
//! - Fetching goes through a pluggable [`PageFetcher`] session; the bundled
//!   [`HttpFetcher`] keeps cookies and supports proxies and user-agent
//!   rotation
//!
//! ## Example
//!
//! ```rust,no_run
//! use futures::TryStreamExt;
//! use a3s_serp::{HttpFetcher, ResultPaginator, SearchRequest};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let paginator = ResultPaginator::new(HttpFetcher::new()?);
//!
//!     let request = SearchRequest::new("rust programming").with_stop(20);
//!     let mut links = paginator.search(request)?;
//!
//!     while let Some(link) = links.try_next().await? {
//!         println!("{}", link);
//!     }
//!     Ok(())
//! }
//! ```

mod error;
mod fetcher;
mod fetcher_http;
mod filter;
mod page;
mod paginator;
mod query;
mod urls;

pub mod proxy;
pub mod user_agent;

pub use error::{Result, SearchError};
pub use fetcher::PageFetcher;
pub use fetcher_http::{HttpFetcher, HttpFetcherBuilder};
pub use filter::filter_result;
pub use page::ResultPage;
pub use paginator::{LinkStream, ResultPaginator};
pub use query::{SafeSearch, SearchRequest, SearchType, TimeRange, DEFAULT_NUM, RESERVED_PARAMS};
pub use urls::{home_url, page_url, ENGINE_DOMAIN_FRAGMENT};
