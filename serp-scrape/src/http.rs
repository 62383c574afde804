//! Browser-like HTTP client and request pacing.
//!
//! Both transports present a realistic browser User-Agent; the plain one
//! also sleeps a random politeness delay before every request.

use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use url::Url;

use crate::config::ScrapeConfig;
use crate::error::ScrapeError;

/// Realistic browser User-Agent strings, rotated per client.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:124.0) Gecko/20100101 Firefox/124.0",
];

/// The configured User-Agent, or a random one from the rotation list.
pub fn user_agent(config: &ScrapeConfig) -> String {
    config
        .user_agent
        .clone()
        .unwrap_or_else(|| random_user_agent().to_owned())
}

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        // USER_AGENTS is a non-empty const array
        .unwrap_or(USER_AGENTS[0])
}

/// Build the [`reqwest::Client`] used for plain fetches.
///
/// Cookies are kept for the lifetime of the client, the configured plain
/// timeout bounds every request, and redirects are followed up to ten hops.
///
/// # Errors
///
/// Returns [`ScrapeError::Http`] if the client cannot be constructed.
pub fn build_client(config: &ScrapeConfig) -> Result<reqwest::Client, ScrapeError> {
    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(config.plain_timeout())
        .user_agent(user_agent(config))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| ScrapeError::Http(format!("failed to build HTTP client: {e}")))
}

/// `url` without its query string or fragment.
///
/// Result-page URLs carry the keyword in the query, so this form is what
/// goes into logs above trace level and into error text.
pub fn redact_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.set_fragment(None);
            parsed.into()
        }
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_owned(),
    }
}

/// Pick a random delay within `(min_ms, max_ms)`, inclusive.
pub fn jitter(range_ms: (u64, u64)) -> Duration {
    let (min, max) = range_ms;
    if min >= max {
        return Duration::from_millis(min);
    }
    Duration::from_millis(rand::thread_rng().gen_range(min..=max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_user_agent_is_from_list() {
        let ua = random_user_agent();
        assert!(USER_AGENTS.contains(&ua));
        assert!(ua.starts_with("Mozilla/5.0"));
    }

    #[test]
    fn configured_user_agent_wins() {
        let config = ScrapeConfig {
            user_agent: Some("CustomBot/1.0".into()),
            ..Default::default()
        };
        assert_eq!(user_agent(&config), "CustomBot/1.0");
    }

    #[test]
    fn build_client_with_default_config() {
        assert!(build_client(&ScrapeConfig::default()).is_ok());
    }

    #[test]
    fn jitter_stays_in_range() {
        for _ in 0..50 {
            let d = jitter((1_500, 3_500));
            assert!(d >= Duration::from_millis(1_500));
            assert!(d <= Duration::from_millis(3_500));
        }
    }

    #[test]
    fn degenerate_jitter_range() {
        assert_eq!(jitter((0, 0)), Duration::ZERO);
        assert_eq!(jitter((20, 20)), Duration::from_millis(20));
    }

    #[test]
    fn redact_url_drops_query_and_fragment() {
        assert_eq!(
            redact_url("https://www.bing.com/search?q=secret+plans&first=11#top"),
            "https://www.bing.com/search"
        );
        assert_eq!(
            redact_url("https://search.yahoo.com/search?p=secret&b=1"),
            "https://search.yahoo.com/search"
        );
        assert_eq!(redact_url("not a url?q=secret"), "not a url");
    }
}
