//! Link normalisation for the storage upsert key.
//!
//! Two links that differ only in host case, fragment, default port,
//! tracking parameters, query order or a trailing slash map to the same key.
//! The stored row keeps the link as scraped; only the key is normalised.

use url::Url;

/// Query parameters that identify a click rather than a page.
const TRACKING_PARAMS: &[&str] = &[
    "dclid", "fbclid", "gclid", "gclsrc", "mc_cid", "mc_eid", "msclkid", "ref_src", "yclid",
];

fn is_tracking(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key.as_str())
}

/// Normalised form of `link`. Input that does not parse as an absolute URL
/// is trimmed and otherwise returned as-is.
pub fn normalize_link(link: &str) -> String {
    let link = link.trim();
    let Ok(mut url) = Url::parse(link) else {
        return link.to_owned();
    };

    // `Url` already drops a port equal to the scheme default.
    url.set_fragment(None);

    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    params.sort();
    if params.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(&params);
    }

    if url.path().len() > 1 && url.path().ends_with('/') {
        let trimmed = url.path().trim_end_matches('/').to_owned();
        url.set_path(if trimmed.is_empty() { "/" } else { &trimmed });
    }

    url.into()
}
