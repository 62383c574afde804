//! Trait definition for per-engine query and parsing strategies.
//!
//! Each search engine (Google, Bing, DuckDuckGo, Yahoo) implements
//! [`EngineStrategy`] to describe how its result pages are addressed and
//! how they are parsed. The pagination controller drives engines only
//! through this trait and never inspects engine identity.

use crate::observer::{ScrapeObserver, TracingObserver};
use crate::types::{ResultEntry, SearchEngine};

/// How one search engine pages and parses its results.
///
/// Implementations are stateless: the same input always yields the same
/// URL or the same entries. All implementations must be `Send + Sync` so
/// one strategy can be shared by concurrent searches.
pub trait EngineStrategy: Send + Sync {
    /// Which engine this strategy scrapes.
    fn engine(&self) -> SearchEngine;

    /// How far the page offset advances between consecutive result pages.
    fn page_stride(&self) -> usize;

    /// Build the result-page URL for `keyword` at `page_offset`.
    ///
    /// The keyword is percent-encoded into the engine's query parameter and
    /// the offset into its pagination parameter.
    fn build_url(&self, keyword: &str, page_offset: usize) -> String;

    /// Parse a raw result page into classified entries, reporting container
    /// matches and classification reasons to `observer`.
    ///
    /// Never fails: containers that cannot yield a title and a link are
    /// skipped, and unrecognisable content yields an empty sequence.
    fn parse_observed(&self, raw: &str, observer: &dyn ScrapeObserver) -> Vec<ResultEntry>;

    /// Parse a raw result page, logging through `tracing`.
    fn parse(&self, raw: &str) -> Vec<ResultEntry> {
        self.parse_observed(raw, &TracingObserver)
    }
}

/// Build `base?key=value&...` with form-style percent-encoding.
pub(crate) fn encode_url(base: &str, params: &[(&str, &str)]) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    if query.is_empty() {
        base.to_owned()
    } else {
        format!("{base}?{query}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Classification;

    /// A strategy that treats every line of the page as a link.
    struct LineStrategy;

    impl EngineStrategy for LineStrategy {
        fn engine(&self) -> SearchEngine {
            SearchEngine::DuckDuckGo
        }

        fn page_stride(&self) -> usize {
            5
        }

        fn build_url(&self, keyword: &str, page_offset: usize) -> String {
            let offset = page_offset.to_string();
            encode_url("https://lines.test/", &[("q", keyword), ("o", &offset)])
        }

        fn parse_observed(&self, raw: &str, _observer: &dyn ScrapeObserver) -> Vec<ResultEntry> {
            raw.lines()
                .filter_map(|line| {
                    ResultEntry::new(self.engine(), line, line, "", Classification::Organic)
                })
                .collect()
        }
    }

    #[test]
    fn strategy_is_object_safe() {
        let strategy: Box<dyn EngineStrategy> = Box::new(LineStrategy);
        assert_eq!(strategy.engine(), SearchEngine::DuckDuckGo);
        assert_eq!(strategy.page_stride(), 5);
    }

    #[test]
    fn default_parse_delegates_to_parse_observed() {
        let entries = LineStrategy.parse("https://a.com\n\nhttps://b.com");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].link(), "https://b.com");
    }

    #[test]
    fn encode_url_percent_encodes_values() {
        let url = encode_url("https://x.test/search", &[("q", "rust & c++"), ("n", "10")]);
        assert_eq!(url, "https://x.test/search?q=rust+%26+c%2B%2B&n=10");
        assert_eq!(encode_url("https://x.test/", &[]), "https://x.test/");
    }

    #[test]
    fn build_url_includes_offset() {
        assert_eq!(
            LineStrategy.build_url("a b", 10),
            "https://lines.test/?q=a+b&o=10"
        );
    }
}
