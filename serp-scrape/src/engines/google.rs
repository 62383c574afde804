//! Google result pages: heaviest ad density and aggressive bot detection.
//!
//! Organic results sit in `div.MjjYud` / `div.g` wrappers with an `h3`
//! title inside the result anchor. Text ads live under `#tads` / `#tadsb`
//! and carry `data-text-ad`; rich blocks (knowledge panel, "People also
//! ask") use their own classes.

use crate::engine::{encode_url, EngineStrategy};
use crate::engines::scan::{scan, SelectorTable};
use crate::observer::ScrapeObserver;
use crate::types::{ResultEntry, SearchEngine};

const TABLE: SelectorTable = SelectorTable {
    engine: SearchEngine::Google,
    organic: &["div.MjjYud", "div.g"],
    ads: &[
        "#tads > div",
        "#tadsb > div",
        "div[data-text-ad]",
        "div[aria-label=\"Ads\"]",
        ".uEierd",
        ".commercial-unit-desktop-top",
        ".pla-unit",
        ".ads-ad",
    ],
    promos: &[
        ".xpdopen",
        ".kp-blk",
        ".related-question-pair",
        ".g-blk",
        ".knowledge-panel",
        ".VkpGBb",
    ],
    title: "h3, div[role=\"heading\"]",
    link: "a[href]",
    description: "div.VwiC3b, .IsZvec",
    label: "span.U3A9Ac, span.x2VHCd",
    markup_markers: &[
        "data-text-ad",
        "data-dtld",
        "commercial-unit",
        "ueierd",
        "mkzh5e",
        "adurl=",
    ],
    link_markers: &[
        "googleadservices.com",
        "/aclk",
        "doubleclick.net",
        "adurl=",
    ],
    skip_titles: &[],
};

/// Google web search, paged with `start` in steps of ten.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoogleStrategy;

impl EngineStrategy for GoogleStrategy {
    fn engine(&self) -> SearchEngine {
        SearchEngine::Google
    }

    fn page_stride(&self) -> usize {
        10
    }

    fn build_url(&self, keyword: &str, page_offset: usize) -> String {
        let start = page_offset.to_string();
        encode_url(
            "https://www.google.com/search",
            &[("q", keyword), ("start", &start)],
        )
    }

    fn parse_observed(&self, raw: &str, observer: &dyn ScrapeObserver) -> Vec<ResultEntry> {
        scan(&TABLE, raw, observer)
    }
}
