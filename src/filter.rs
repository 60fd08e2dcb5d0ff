//! Filtering of links found in result pages.

use url::{form_urlencoded, Position, Url};

use crate::urls::ENGINE_DOMAIN_FRAGMENT;

/// Path prefix of Google's click-through redirect, which carries the real
/// destination in its `q` parameter.
const REDIRECT_PREFIX: &str = "/url?";

/// Filters a link found in a result page.
///
/// Returns the link itself when it is absolute and does not point to a
/// Google host, the decoded destination when it is a `/url?q=` redirect to
/// such a link, and `None` otherwise. Malformed input is never an error.
pub fn filter_result(link: &str) -> Option<String> {
    if is_foreign(link) {
        return Some(link.to_string());
    }

    let query = link.strip_prefix(REDIRECT_PREFIX)?;
    let (_, target) = form_urlencoded::parse(query.as_bytes()).find(|(key, _)| key == "q")?;

    if is_foreign(&target) {
        Some(target.into_owned())
    } else {
        None
    }
}

/// Returns true if the link has a network location outside Google's domains.
fn is_foreign(link: &str) -> bool {
    authority(link).map_or(false, |authority| {
        !authority.to_ascii_lowercase().contains(ENGINE_DOMAIN_FRAGMENT)
    })
}

/// Returns the `user@host:port` part of an absolute link.
///
/// A link only has one when `//` and a non-empty authority follow its
/// scheme; protocol-relative links are read as `http:`.
fn authority(link: &str) -> Option<String> {
    let absolute = if link.starts_with("//") {
        format!("http:{}", link)
    } else {
        link.to_string()
    };

    let (_, rest) = absolute.split_once(':')?;
    let raw = rest.strip_prefix("//")?;
    if raw.is_empty() || raw.starts_with(['/', '?', '#']) {
        return None;
    }

    let url = Url::parse(&absolute).ok()?;
    url.host()?;
    Some(url[Position::BeforeUsername..Position::AfterPort].to_string())
}
