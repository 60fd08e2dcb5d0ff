//! Google URL templates.

use url::form_urlencoded;

use crate::query::{SearchRequest, DEFAULT_NUM};

/// Substring identifying Google's own hosts, e.g. `images.google.com`.
pub const ENGINE_DOMAIN_FRAGMENT: &str = "google";

/// Returns the home page URL, fetched once per search to pick up cookies.
pub fn home_url(tld: &str) -> String {
    format!("https://www.google.{}/", tld)
}

/// Returns the URL of the result page starting at `start`.
///
/// The first page carries the `btnG` form button; continuation pages carry
/// `start` instead. `num` is only sent when it differs from Google's default.
pub fn page_url(request: &SearchRequest, start: u32) -> String {
    let query: String = form_urlencoded::byte_serialize(request.query.as_bytes()).collect();

    let mut url = format!(
        "https://www.google.{}/search?hl={}&q={}",
        request.tld, request.lang, query
    );

    if request.num != DEFAULT_NUM {
        url.push_str(&format!("&num={}", request.num));
    }
    if start > 0 {
        url.push_str(&format!("&start={}", start));
    } else {
        url.push_str("&btnG=Google+Search");
    }
    url.push_str(&format!(
        "&tbs={}&safe={}&tbm={}",
        request.tbs,
        request.safe.as_param(),
        request.search_type.tbm()
    ));

    for (name, value) in &request.extra_params {
        url.push_str(&format!("&{}={}", name, value));
    }

    url
}
