//! Link header cursor extraction (RFC 8288)
//!
//! GitHub reports further pages as
//! `Link: <https://api.github.com/...?page=2>; rel="next", <...>; rel="last"`.

use reqwest::header::HeaderMap;
use url::Url;

/// Next page number advertised by the response headers
pub fn next_page(headers: &HeaderMap) -> Option<u32> {
    let link = headers.get("link").and_then(|v| v.to_str().ok())?;
    let next = parse_link_header(link, "next")?;
    page_param(&next)
}

/// Parse a Link header and extract the URL for the given rel
pub fn parse_link_header(header: &str, target_rel: &str) -> Option<String> {
    for part in header.split(',') {
        let mut url = None;
        let mut rel = None;

        for segment in part.trim().split(';') {
            let segment = segment.trim();
            if let Some(inner) = segment
                .strip_prefix('<')
                .and_then(|s| s.strip_suffix('>'))
            {
                url = Some(inner);
            } else if let Some(value) = segment.strip_prefix("rel=") {
                rel = Some(value.trim_matches('"').trim_matches('\''));
            }
        }

        if let (Some(u), Some(r)) = (url, rel) {
            if r.split_whitespace().any(|r| r == target_rel) {
                return Some(u.to_string());
            }
        }
    }

    None
}

/// `page` query value of a URL; zero or unparsable means "none"
fn page_param(url: &str) -> Option<u32> {
    let url = Url::parse(url).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse().ok())
        .filter(|page| *page != 0)
}
