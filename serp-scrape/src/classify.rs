//! Unified ad/promo classification rule.
//!
//! Engine parsers gather [`Evidence`] for each container; [`classify`]
//! turns it into a [`Classification`]. Any ad signal makes an entry an
//! advertisement. A promotional container with no ad signal makes it
//! promotional. Everything else is organic.

use crate::types::Classification;

/// Which selector group a container was found by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// A regular result container.
    Primary,
    /// A dedicated ad container.
    Ad,
    /// A rich block: knowledge panel, carousel, related questions.
    Promo,
}

/// One reason an entry is not organic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evidence {
    /// The container matched an engine ad selector.
    AdContainer,
    /// The container matched an engine promotional selector.
    PromoContainer,
    /// The de-tracked link contains a known ad substring.
    AdLink(&'static str),
    /// A short label near the entry reads "ad", "sponsored" and so on.
    AdLabel(String),
    /// The container markup contains an engine ad-marker token.
    AdMarkup(&'static str),
}

impl Evidence {
    pub fn is_ad(&self) -> bool {
        !matches!(self, Self::PromoContainer)
    }
}

/// Label words that mark paid placements, matched as whole tokens.
const AD_LABEL_WORDS: &[&str] = &["ad", "ads", "sponsored", "advertisement"];

/// Longest label text inspected. Descriptions are never scanned.
pub const MAX_LABEL_LEN: usize = 40;

/// `true` when short label text announces a paid placement.
///
/// Only whole words count, so "Adobe" or "headline" do not match.
pub fn is_ad_label(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() || text.chars().count() > MAX_LABEL_LEN {
        return false;
    }
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .any(|word| {
            let word = word.to_lowercase();
            AD_LABEL_WORDS.contains(&word.as_str())
        })
}

/// Combine all collected evidence into a single classification.
///
/// Returns the classification and the evidence that decided it. Ad
/// evidence beats promotional evidence.
pub fn classify(evidence: &[Evidence]) -> (Classification, Option<&Evidence>) {
    if let Some(ad) = evidence.iter().find(|e| e.is_ad()) {
        return (Classification::Advertisement, Some(ad));
    }
    if let Some(promo) = evidence.first() {
        return (Classification::Promotional, Some(promo));
    }
    (Classification::Organic, None)
}
