//! Bing result pages.
//!
//! Every block on the page is an `li` directly under `#b_results`: organic
//! results are `b_algo`, ads `b_ad`, answers and rich blocks `b_ans`. Links
//! are often wrapped in `/ck/a` click trackers carrying a base64 target.

use crate::engine::{encode_url, EngineStrategy};
use crate::engines::scan::{scan, SelectorTable};
use crate::observer::ScrapeObserver;
use crate::types::{ResultEntry, SearchEngine};

const TABLE: SelectorTable = SelectorTable {
    engine: SearchEngine::Bing,
    organic: &["#b_results > li"],
    ads: &[
        "li.b_ad",
        "li[data-tag=\"ad\"]",
        ".b_adLastChild",
        ".sb_add",
        ".ad_sc",
        "#b_context .b_ad",
    ],
    promos: &[".b_ans", "#b_context > li"],
    title: "h2",
    link: "h2 a, a.tilk",
    description: "div.b_caption p, p, .b_lineclamp2",
    label: ".b_adSlug, .b_adLabel",
    markup_markers: &["data-bm=\"5\"", "data-bm=\"6\"", "productcard", "b_adslug"],
    link_markers: &[
        "bat.bing.com",
        "bing.com/aclick",
        "msn.com/ads",
        "microsoft.com/advertising",
        "doubleclick.net",
    ],
    skip_titles: &["previous", "next", "related searches"],
};

/// Bing web search, paged with a one-based `first` index in steps of ten.
#[derive(Debug, Clone, Copy, Default)]
pub struct BingStrategy;

impl EngineStrategy for BingStrategy {
    fn engine(&self) -> SearchEngine {
        SearchEngine::Bing
    }

    fn page_stride(&self) -> usize {
        10
    }

    fn build_url(&self, keyword: &str, page_offset: usize) -> String {
        let first = (page_offset + 1).to_string();
        encode_url(
            "https://www.bing.com/search",
            &[("q", keyword), ("first", &first)],
        )
    }

    fn parse_observed(&self, raw: &str, observer: &dyn ScrapeObserver) -> Vec<ResultEntry> {
        scan(&TABLE, raw, observer)
    }
}
