//! DuckDuckGo result pages, scraped from the HTML-only endpoint at
//! `https://html.duckduckgo.com/html/`.
//!
//! The HTML endpoint needs no JavaScript. Results are `div.result` blocks
//! whose title anchor goes through the `/l/?uddg=` redirector; ads carry
//! `result--ad` and link through `y.js`.

use crate::engine::{encode_url, EngineStrategy};
use crate::engines::scan::{scan, SelectorTable};
use crate::observer::ScrapeObserver;
use crate::types::{ResultEntry, SearchEngine};

const TABLE: SelectorTable = SelectorTable {
    engine: SearchEngine::DuckDuckGo,
    organic: &[".result", ".web-result"],
    ads: &[
        "div[data-testid=\"ad\"]",
        ".result--ad",
        ".js-ad-link",
        ".sponsored",
    ],
    promos: &[
        "div[data-testid=\"zci\"]",
        ".zci",
        ".module--carousel",
        ".module-answer",
        ".module--products",
        ".module--shopping",
    ],
    title: ".result__a",
    link: "a.result__url, a.result__a",
    description: ".result__snippet",
    label: ".badge--ad, .result__badge",
    markup_markers: &[
        "result--ad",
        "result__sponsored",
        "js-ad-",
        "module--ads",
        "aaxads",
        "badge--ad",
    ],
    link_markers: &[
        "duckduckgo.com/y.js",
        "ad_provider",
        "bing.com/aclick",
        "doubleclick.net",
    ],
    skip_titles: &[],
};

/// DuckDuckGo HTML search, paged with `s` in steps of thirty. The first
/// page carries no offset parameter.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuckDuckGoStrategy;

impl EngineStrategy for DuckDuckGoStrategy {
    fn engine(&self) -> SearchEngine {
        SearchEngine::DuckDuckGo
    }

    fn page_stride(&self) -> usize {
        30
    }

    fn build_url(&self, keyword: &str, page_offset: usize) -> String {
        let base = "https://html.duckduckgo.com/html/";
        if page_offset == 0 {
            return encode_url(base, &[("q", keyword)]);
        }
        let s = page_offset.to_string();
        encode_url(base, &[("q", keyword), ("s", &s)])
    }

    fn parse_observed(&self, raw: &str, observer: &dyn ScrapeObserver) -> Vec<ResultEntry> {
        scan(&TABLE, raw, observer)
    }
}
