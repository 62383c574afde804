//! Yahoo result pages.
//!
//! Results are `li` items under `#web`, each holding a `dd algo` block with
//! a `compTitle` heading and `compText` snippet. Every outbound link goes
//! through `r.search.yahoo.com` with the destination in an `RU=` segment.

use crate::engine::{encode_url, EngineStrategy};
use crate::engines::scan::{scan, SelectorTable};
use crate::observer::ScrapeObserver;
use crate::types::{ResultEntry, SearchEngine};

const TABLE: SelectorTable = SelectorTable {
    engine: SearchEngine::Yahoo,
    organic: &["#web > ol > li", "#web .algo", ".dd.algo"],
    ads: &[
        "#web .ad",
        "ol.searchCenterTopAds li",
        "ol.searchCenterBottomAds li",
        ".AdTop",
        ".AdBttm",
        ".Ad-Composite",
        ".sw-Card-Bd[data-integration=\"commerce\"]",
    ],
    // `compText` is the snippet class of ordinary results, so it is not a
    // promotional marker here.
    promos: &[
        ".compArticleList",
        ".compFeatured",
        ".compShoppingSummary",
        ".compDlink",
        ".compCardList",
        ".sw-Card",
        "#right .algo",
    ],
    title: "h3",
    link: "h3 a, .compTitle a",
    description: "p.s-desc, .compText p, .compText",
    label: ".ad-label, .ad_badge, .adlink",
    markup_markers: &[
        "ad_badge",
        "adlink",
        "compshoppingsummary",
        "adchoices",
        "label=\"ad\"",
        "sponsored_",
        "price-section",
    ],
    link_markers: &[
        "/cbclk",
        "beap.gemini.yahoo.com",
        "doubleclick.net",
        "bing.com/aclick",
    ],
    skip_titles: &["also try"],
};

/// Yahoo web search, keyword in `p`, paged with a one-based `b` index in
/// steps of ten.
#[derive(Debug, Clone, Copy, Default)]
pub struct YahooStrategy;

impl EngineStrategy for YahooStrategy {
    fn engine(&self) -> SearchEngine {
        SearchEngine::Yahoo
    }

    fn page_stride(&self) -> usize {
        10
    }

    fn build_url(&self, keyword: &str, page_offset: usize) -> String {
        let b = (page_offset + 1).to_string();
        encode_url(
            "https://search.yahoo.com/search",
            &[("p", keyword), ("b", &b)],
        )
    }

    fn parse_observed(&self, raw: &str, observer: &dyn ScrapeObserver) -> Vec<ResultEntry> {
        scan(&TABLE, raw, observer)
    }
}
