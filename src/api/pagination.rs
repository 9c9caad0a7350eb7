use axum::http::{HeaderMap, HeaderName, HeaderValue};

use crate::models::SuggestionPage;

pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Builds `X-Total-Count` and an RFC 5988 `Link` header for `page`
///
/// Relations are emitted in the order next, prev, last, first; next and prev
/// only when such a page exists.
pub fn pagination_headers(page: &SuggestionPage, base_path: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static(TOTAL_COUNT_HEADER),
        HeaderValue::from(page.total_elements),
    );

    let link = |index: u64, rel: &str| {
        format!(
            "<{}?page={}&size={}>; rel=\"{}\"",
            base_path, index, page.size, rel
        )
    };

    let last = page.total_pages().saturating_sub(1);
    let mut links = Vec::with_capacity(4);
    if page.has_next() {
        links.push(link(page.page as u64 + 1, "next"));
    }
    if page.has_previous() {
        links.push(link(page.page as u64 - 1, "prev"));
    }
    links.push(link(last, "last"));
    links.push(link(0, "first"));

    match HeaderValue::from_str(&links.join(",")) {
        Ok(value) => {
            headers.insert(axum::http::header::LINK, value);
        }
        Err(e) => tracing::warn!(error = %e, path = %base_path, "Skipping unencodable Link header"),
    }

    headers
}
