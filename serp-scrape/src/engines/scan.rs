//! Table-driven result-page scanner shared by every engine.
//!
//! An engine describes its page structure as a [`SelectorTable`]; [`scan`]
//! walks the document in three passes (primary containers, then ad
//! containers, then promotional blocks), extracts title, link and
//! description from each container, gathers classification evidence, and
//! emits the entries it can build fully.

use scraper::{ElementRef, Html, Selector};

use crate::classify::{self, ContainerKind, Evidence};
use crate::detrack::{self, Detracked};
use crate::observer::{ScrapeEvent, ScrapeObserver};
use crate::types::{ResultEntry, SearchEngine};

/// Longest fallback title taken from container text.
pub(crate) const MAX_FALLBACK_TITLE_LEN: usize = 80;

/// One engine's page structure and ad markers.
///
/// Markers are matched case-insensitively and must be written in lowercase.
pub(crate) struct SelectorTable {
    pub engine: SearchEngine,
    /// Regular result containers.
    pub organic: &'static [&'static str],
    /// Dedicated ad containers.
    pub ads: &'static [&'static str],
    /// Knowledge panels, carousels, related-question blocks.
    pub promos: &'static [&'static str],
    /// Title element inside a container.
    pub title: &'static str,
    /// Fallback link element when the title carries no anchor.
    pub link: &'static str,
    /// Snippet element.
    pub description: &'static str,
    /// Short label elements that may read "Ad" or "Sponsored".
    pub label: &'static str,
    /// Tokens in container markup that reveal a paid placement.
    pub markup_markers: &'static [&'static str],
    /// Substrings that reveal an ad redirect, matched against every URL on
    /// the link's redirect chain, not only the de-tracked destination.
    pub link_markers: &'static [&'static str],
    /// Titles of navigation widgets that look like results.
    pub skip_titles: &'static [&'static str],
}

struct Compiled {
    groups: Vec<(ContainerKind, Selector)>,
    ads: Option<Selector>,
    promos: Option<Selector>,
    title: Option<Selector>,
    link: Option<Selector>,
    description: Option<Selector>,
    label: Option<Selector>,
    aria_label: Option<Selector>,
}

fn compile(engine: SearchEngine, selectors: &[&str]) -> Option<Selector> {
    if selectors.is_empty() {
        return None;
    }
    let joined = selectors.join(", ");
    if let Ok(selector) = Selector::parse(&joined) {
        return Some(selector);
    }
    tracing::warn!(%engine, selector = %joined, "invalid selector skipped");
    None
}

impl SelectorTable {
    fn compile(&self) -> Compiled {
        let engine = self.engine;
        let groups = [
            (ContainerKind::Primary, self.organic),
            (ContainerKind::Ad, self.ads),
            (ContainerKind::Promo, self.promos),
        ]
        .into_iter()
        .filter_map(|(kind, sels)| compile(engine, sels).map(|s| (kind, s)))
        .collect();
        Compiled {
            groups,
            ads: compile(engine, self.ads),
            promos: compile(engine, self.promos),
            title: compile(engine, &[self.title]),
            link: compile(engine, &[self.link]),
            description: compile(engine, &[self.description]),
            label: compile(engine, &[self.label]),
            aria_label: compile(engine, &["[aria-label]"]),
        }
    }
}

/// Parse `raw` with `table`, reporting to `observer`.
pub(crate) fn scan(
    table: &SelectorTable,
    raw: &str,
    observer: &dyn ScrapeObserver,
) -> Vec<ResultEntry> {
    let engine = table.engine;
    let document = Html::parse_document(raw);
    let compiled = table.compile();

    let mut claimed: Vec<ElementRef<'_>> = Vec::new();
    let mut entries = Vec::new();

    for (kind, selector) in &compiled.groups {
        for container in document.select(selector) {
            if overlaps_claimed(container, &claimed) {
                continue;
            }
            observer.on_event(&ScrapeEvent::ContainerMatched {
                engine,
                kind: *kind,
            });
            // Only containers that yield an entry are claimed, so a rich
            // block nested in a failed wrapper still gets its own pass.
            match extract(table, &compiled, container, *kind, observer) {
                Ok(entry) => {
                    claimed.push(container);
                    entries.push(entry);
                }
                Err(reason) => observer.on_event(&ScrapeEvent::ContainerSkipped {
                    engine,
                    kind: *kind,
                    reason,
                }),
            }
        }
    }

    tracing::debug!(%engine, count = entries.len(), "results parsed");
    entries
}

/// A container nested in, containing, or equal to an already-processed
/// container would duplicate its entry.
fn overlaps_claimed(element: ElementRef<'_>, claimed: &[ElementRef<'_>]) -> bool {
    claimed.iter().any(|c| {
        let node = **c;
        element.ancestors().any(|a| a == node) || element.descendants().any(|d| d == node)
    })
}

fn extract(
    table: &SelectorTable,
    compiled: &Compiled,
    container: ElementRef<'_>,
    kind: ContainerKind,
    observer: &dyn ScrapeObserver,
) -> Result<ResultEntry, &'static str> {
    let engine = table.engine;
    let title_el = compiled
        .title
        .as_ref()
        .and_then(|sel| container.select(sel).find(|el| !collapsed_text(*el).is_empty()));

    let description = compiled
        .description
        .as_ref()
        .and_then(|sel| container.select(sel).next())
        .map(collapsed_text)
        .unwrap_or_default();

    let title = match title_el {
        Some(el) => collapsed_text(el),
        None if kind != ContainerKind::Primary => {
            let source = if description.is_empty() {
                collapsed_text(container)
            } else {
                description.clone()
            };
            truncate_chars(&source, MAX_FALLBACK_TITLE_LEN)
        }
        None => return Err("missing title"),
    };
    if title.is_empty() {
        return Err("missing title");
    }
    let lowered_title = title.to_lowercase();
    if table
        .skip_titles
        .iter()
        .any(|skip| lowered_title.starts_with(skip))
    {
        return Err("navigation block");
    }

    let href = find_href(compiled, container, title_el).ok_or("missing link")?;
    let detracked = detrack::resolve_href(engine.base_url(), href)
        .map(|resolved| detrack::detrack_chain(&resolved))
        .ok_or("unusable link")?;

    let evidence = gather_evidence(table, compiled, container, kind, &detracked);
    let link = detracked.link;
    let (classification, reason) = classify::classify(&evidence);
    observer.on_event(&ScrapeEvent::EntryClassified {
        engine,
        link: &link,
        classification,
        evidence: reason,
    });

    ResultEntry::new(engine, title, link, description, classification)
        .ok_or("empty title or link")
}

/// Link lookup order: the container itself when it is an anchor, the
/// title's anchor (inside or around it), the table's link selector, then
/// any anchor in the container.
fn find_href<'a>(
    compiled: &Compiled,
    container: ElementRef<'a>,
    title_el: Option<ElementRef<'a>>,
) -> Option<&'a str> {
    if let Some(href) = anchor_href(container) {
        return Some(href);
    }
    if let Some(title_el) = title_el {
        let inner = anchor_href(title_el).or_else(|| {
            title_el
                .descendants()
                .filter_map(ElementRef::wrap)
                .find_map(anchor_href)
        });
        if inner.is_some() {
            return inner;
        }
        let around = title_el
            .ancestors()
            .filter_map(ElementRef::wrap)
            .take_while(|a| *a != container)
            .find_map(anchor_href);
        if around.is_some() {
            return around;
        }
    }
    compiled
        .link
        .as_ref()
        .and_then(|sel| container.select(sel).find_map(|el| el.value().attr("href")))
        .or_else(|| {
            container
                .descendants()
                .filter_map(ElementRef::wrap)
                .find_map(anchor_href)
        })
}

fn anchor_href(el: ElementRef<'_>) -> Option<&str> {
    (el.value().name() == "a")
        .then(|| el.value().attr("href"))
        .flatten()
        .filter(|href| !href.trim().is_empty())
}

fn gather_evidence(
    table: &SelectorTable,
    compiled: &Compiled,
    container: ElementRef<'_>,
    kind: ContainerKind,
    detracked: &Detracked,
) -> Vec<Evidence> {
    let mut evidence = Vec::new();

    if kind == ContainerKind::Ad || matches_or_inside(container, compiled.ads.as_ref()) {
        evidence.push(Evidence::AdContainer);
    }
    if kind == ContainerKind::Promo || matches_or_inside(container, compiled.promos.as_ref()) {
        evidence.push(Evidence::PromoContainer);
    }

    let chain: Vec<String> = detracked.chain().map(str::to_lowercase).collect();
    if let Some(marker) = table
        .link_markers
        .iter()
        .find(|m| chain.iter().any(|url| url.contains(*m)))
    {
        evidence.push(Evidence::AdLink(marker));
    }

    if let Some(label) = find_ad_label(compiled, container) {
        evidence.push(Evidence::AdLabel(label));
    }

    let markup = container.html().to_lowercase();
    if let Some(marker) = table.markup_markers.iter().find(|m| markup.contains(*m)) {
        evidence.push(Evidence::AdMarkup(marker));
    }

    evidence
}

fn matches_or_inside(element: ElementRef<'_>, selector: Option<&Selector>) -> bool {
    let Some(selector) = selector else {
        return false;
    };
    selector.matches(&element)
        || element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|a| selector.matches(&a))
}

fn find_ad_label(compiled: &Compiled, container: ElementRef<'_>) -> Option<String> {
    let from_text = compiled.label.as_ref().and_then(|sel| {
        container
            .select(sel)
            .map(collapsed_text)
            .find(|text| classify::is_ad_label(text))
    });
    if from_text.is_some() {
        return from_text;
    }
    let own = container.value().attr("aria-label");
    let nested = compiled.aria_label.as_ref().and_then(|sel| {
        container
            .select(sel)
            .find_map(|el| el.value().attr("aria-label"))
            .filter(|label| classify::is_ad_label(label))
    });
    own.filter(|label| classify::is_ad_label(label))
        .or(nested)
        .map(str::to_owned)
}

fn collapsed_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect::<String>().trim().to_owned()
}
