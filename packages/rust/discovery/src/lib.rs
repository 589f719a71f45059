//! Related-link discovery and categorization.
//!
//! While a page is fetched, its anchors are scanned for links that point at
//! news, careers, investor, or company pages. Matches are categorized by a
//! fixed keyword rule table and accumulated in a [`ResearchSession`], which
//! deduplicates by absolute URL across every page of one report run.

mod rules;

use std::collections::HashSet;
use std::sync::LazyLock;

use acctintel_shared::{DiscoveredLink, SessionId};
use scraper::{Html, Selector};
use tracing::{debug, trace};
use url::Url;

pub use rules::{CATEGORY_RULES, RELEVANT_KEYWORDS, categorize, is_relevant};

// ---------------------------------------------------------------------------
// ResearchSession
// ---------------------------------------------------------------------------

/// Per-run research context, passed by reference into each pipeline stage.
///
/// The discovered-link list is append-only; the first occurrence of a URL wins.
#[derive(Debug, Default)]
pub struct ResearchSession {
    id: SessionId,
    links: Vec<DiscoveredLink>,
    seen: HashSet<String>,
}

impl ResearchSession {
    /// Start a fresh session with a new id and no links.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Links in discovery order.
    pub fn links(&self) -> &[DiscoveredLink] {
        &self.links
    }

    /// Append a link unless its URL was already seen. Returns `true` if added.
    pub fn push_link(&mut self, link: DiscoveredLink) -> bool {
        if !self.seen.insert(link.url.clone()) {
            return false;
        }
        self.links.push(link);
        true
    }

    /// Consume the session, yielding its links.
    pub fn into_links(self) -> Vec<DiscoveredLink> {
        self.links
    }
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

static ANCHOR_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector"));

/// Scan `doc` for relevant anchors and append them to `session`.
///
/// Hrefs are resolved against `base_url`; hrefs that cannot be resolved are
/// skipped. Returns the number of newly added links.
pub fn discover(doc: &Html, base_url: &Url, session: &mut ResearchSession) -> usize {
    let mut added = 0;

    for el in doc.select(&ANCHOR_SEL) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        if href.trim().is_empty() {
            continue;
        }

        let Ok(resolved) = base_url.join(href.trim()) else {
            trace!(href, "unresolvable href, skipping");
            continue;
        };
        let url = resolved.to_string();
        let text = el.text().collect::<String>();

        if !is_relevant(&url, &text) {
            continue;
        }

        let link = DiscoveredLink {
            category: categorize(&url, &text),
            display_text: text.trim().to_string(),
            url,
        };

        if session.push_link(link) {
            added += 1;
        }
    }

    debug!(
        base = %base_url,
        added,
        total = session.links().len(),
        "link discovery complete"
    );

    added
}
