//! Core types: engine identity, classified result entries, and search batches.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Search engines whose result pages can be scraped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SearchEngine {
    /// Google: heaviest ad density, aggressive bot detection.
    Google,
    /// Bing: results are partly populated client-side.
    Bing,
    /// DuckDuckGo: HTML-only endpoint, ads marked with `result--ad`.
    DuckDuckGo,
    /// Yahoo: Bing-backed index behind `r.search.yahoo.com` redirects.
    Yahoo,
}

impl SearchEngine {
    /// Returns the human-readable name of this engine.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::Bing => "Bing",
            Self::DuckDuckGo => "DuckDuckGo",
            Self::Yahoo => "Yahoo",
        }
    }

    /// Canonical root URL of the engine. Constant per engine and copied
    /// into every [`ResultEntry`] it produces.
    pub fn base_url(&self) -> &'static str {
        match self {
            Self::Google => "https://www.google.com",
            Self::Bing => "https://www.bing.com",
            Self::DuckDuckGo => "https://duckduckgo.com",
            Self::Yahoo => "https://search.yahoo.com",
        }
    }

    /// Returns all available engine variants.
    pub fn all() -> &'static [SearchEngine] {
        &[Self::Google, Self::Bing, Self::DuckDuckGo, Self::Yahoo]
    }
}

impl fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a result entry was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    /// Unpaid, non-promotional listing.
    Organic,
    /// Paid placement.
    Advertisement,
    /// Specially formatted, non-paid content (knowledge panels, carousels,
    /// related-question blocks).
    Promotional,
}

impl Classification {
    /// `true` for [`Classification::Organic`] only. Advertisements and
    /// promotional entries are both filtered out downstream.
    pub fn is_organic(&self) -> bool {
        matches!(self, Self::Organic)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Organic => "organic",
            Self::Advertisement => "advertisement",
            Self::Promotional => "promotional",
        })
    }
}

/// One scraped listing.
///
/// Construct with [`ResultEntry::new`], which refuses empty titles and
/// links; every entry that exists therefore satisfies the emission
/// invariant. Fields are read through accessors and never change after
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultEntry {
    engine: SearchEngine,
    base_url: &'static str,
    title: String,
    link: String,
    description: String,
    classification: Classification,
}

impl ResultEntry {
    /// Build an entry, returning `None` when `title` or `link` is blank.
    ///
    /// Surrounding whitespace is trimmed from every text field.
    pub fn new(
        engine: SearchEngine,
        title: impl Into<String>,
        link: impl Into<String>,
        description: impl Into<String>,
        classification: Classification,
    ) -> Option<Self> {
        let title = title.into().trim().to_owned();
        let link = link.into().trim().to_owned();
        if title.is_empty() || link.is_empty() {
            return None;
        }
        Some(Self {
            engine,
            base_url: engine.base_url(),
            title,
            link,
            description: description.into().trim().to_owned(),
            classification,
        })
    }

    pub fn engine(&self) -> SearchEngine {
        self.engine
    }

    pub fn base_url(&self) -> &str {
        self.base_url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub fn is_organic(&self) -> bool {
        self.classification.is_organic()
    }
}

/// The coordinator's output for one keyword: each engine's entries in the
/// order that engine produced them.
///
/// Handed to the storage boundary as a unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchBatch {
    keyword: String,
    results: BTreeMap<SearchEngine, Vec<ResultEntry>>,
}

impl SearchBatch {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            results: BTreeMap::new(),
        }
    }

    /// The keyword this batch was produced for.
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Store the entries for `engine`, replacing any previous sequence.
    pub fn insert(&mut self, engine: SearchEngine, entries: Vec<ResultEntry>) {
        self.results.insert(engine, entries);
    }

    /// Entries for `engine`, empty when the engine was not run or failed.
    pub fn entries(&self, engine: SearchEngine) -> &[ResultEntry] {
        self.results
            .get(&engine)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Engines present in this batch, including ones with no entries.
    pub fn engines(&self) -> impl Iterator<Item = SearchEngine> + '_ {
        self.results.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SearchEngine, &[ResultEntry])> {
        self.results.iter().map(|(e, v)| (*e, v.as_slice()))
    }

    /// Total number of entries across all engines.
    pub fn total_len(&self) -> usize {
        self.results.values().map(Vec::len).sum()
    }

    /// Number of advertisement or promotional entries across all engines.
    pub fn non_organic_len(&self) -> usize {
        self.results
            .values()
            .flatten()
            .filter(|entry| !entry.is_organic())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.total_len() == 0
    }
}
