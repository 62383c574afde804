//! Link resolution and de-tracking.
//!
//! Engines wrap destination links in their own redirectors for click
//! tracking. [`detrack`] peels those wrappers off until a plain destination
//! remains. Links that are not wrapped come back unchanged, so de-tracking
//! is idempotent.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use url::Url;

/// Wrappers can nest (a Yahoo redirect to a Bing click URL, say), but
/// never deeply.
const MAX_UNWRAP_DEPTH: usize = 4;

/// Resolve an `href` attribute against the engine page it came from.
///
/// Handles absolute, protocol-relative (`//host/...`) and root-relative
/// links. Returns `None` for fragments, `javascript:` links and anything
/// that does not resolve to `http(s)`.
pub fn resolve_href(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    if href.to_ascii_lowercase().starts_with("javascript:") {
        return None;
    }
    let base = Url::parse(base).ok()?;
    let resolved = base.join(href).ok()?;
    is_web_url(&resolved).then(|| resolved.to_string())
}

/// A de-tracked link with the redirect wrappers peeled off to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detracked {
    /// The destination.
    pub link: String,
    /// Wrapper URLs that were unwrapped, outermost first.
    pub wrappers: Vec<String>,
}

impl Detracked {
    /// Every URL on the redirect chain, outermost wrapper first and the
    /// destination last.
    pub fn chain(&self) -> impl Iterator<Item = &str> {
        self.wrappers
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.link.as_str()))
    }
}

/// Unwrap engine redirect links to their destination.
///
/// Recognised wrappers:
///
/// - Google `/url?q=` and `/url?url=`
/// - Bing `/aclick?u=` (or `r=`) and `/ck/a?u=a1<base64url>`
/// - DuckDuckGo `/l/?uddg=`
/// - Yahoo `r.search.yahoo.com/.../RU=<encoded>/...`
///
/// Anything else, including unparseable input, is returned unchanged.
pub fn detrack(link: &str) -> String {
    detrack_chain(link).link
}

/// Like [`detrack`], also keeping the wrappers that were removed.
pub fn detrack_chain(link: &str) -> Detracked {
    let mut current = link.to_owned();
    let mut wrappers = Vec::new();
    for _ in 0..MAX_UNWRAP_DEPTH {
        match unwrap_once(&current) {
            Some(next) if next != current => wrappers.push(std::mem::replace(&mut current, next)),
            _ => break,
        }
    }
    Detracked {
        link: current,
        wrappers,
    }
}

fn unwrap_once(link: &str) -> Option<String> {
    let parsed = Url::parse(link).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    let path = parsed.path();

    let candidate = if is_google_host(&host) && path == "/url" {
        query_param(&parsed, &["q", "url"])
    } else if host_matches(&host, "bing.com") && path.starts_with("/aclick") {
        query_param(&parsed, &["u", "r"])
    } else if host_matches(&host, "bing.com") && path.starts_with("/ck/a") {
        query_param(&parsed, &["u"]).and_then(|u| decode_bing_base64(&u))
    } else if host_matches(&host, "duckduckgo.com") && path.starts_with("/l/") {
        query_param(&parsed, &["uddg"])
    } else if host == "r.search.yahoo.com" {
        yahoo_ru_segment(path)
    } else {
        None
    }?;

    let destination = Url::parse(&candidate).ok()?;
    is_web_url(&destination).then_some(candidate)
}

fn query_param(url: &Url, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        url.query_pairs()
            .find(|(k, v)| k == key && !v.is_empty())
            .map(|(_, v)| v.into_owned())
    })
}

/// Bing `/ck/a` links carry the destination as `a1` followed by unpadded
/// URL-safe base64.
fn decode_bing_base64(value: &str) -> Option<String> {
    let encoded = value.strip_prefix("a1")?.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD.decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}

/// Yahoo puts the destination in a path segment: `/RV=2/RE=.../RU=<enc>/RK=...`.
fn yahoo_ru_segment(path: &str) -> Option<String> {
    let segment = path.split('/').find_map(|s| s.strip_prefix("RU="))?;
    urlencoding::decode(segment).ok().map(|s| s.into_owned())
}

fn is_google_host(host: &str) -> bool {
    let host = host.strip_prefix("www.").unwrap_or(host);
    host.starts_with("google.")
}

fn host_matches(host: &str, domain: &str) -> bool {
    host == domain || host.ends_with(&format!(".{domain}"))
}

fn is_web_url(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https") && url.host_str().is_some()
}
