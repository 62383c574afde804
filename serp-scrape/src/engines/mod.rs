//! Search engine strategies.
//!
//! Each module provides a struct implementing [`crate::engine::EngineStrategy`]
//! for one engine's result pages. Parsing is shared: every engine describes
//! its page structure as a selector table read by one shared scanner.

pub mod bing;
pub mod duckduckgo;
pub mod google;
pub(crate) mod scan;
pub mod yahoo;

pub use bing::BingStrategy;
pub use duckduckgo::DuckDuckGoStrategy;
pub use google::GoogleStrategy;
pub use yahoo::YahooStrategy;

use crate::engine::EngineStrategy;
use crate::types::SearchEngine;

/// The strategy that scrapes `engine`.
pub fn strategy_for(engine: SearchEngine) -> Box<dyn EngineStrategy> {
    match engine {
        SearchEngine::Google => Box::new(GoogleStrategy),
        SearchEngine::Bing => Box::new(BingStrategy),
        SearchEngine::DuckDuckGo => Box::new(DuckDuckGoStrategy),
        SearchEngine::Yahoo => Box::new(YahooStrategy),
    }
}
