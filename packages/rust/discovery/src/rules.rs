//! Keyword rules for link relevance and categorization.
//!
//! Rules are ordered `(label, keywords)` pairs evaluated top to bottom;
//! the first rule with any keyword present in the URL or anchor text wins.

use acctintel_shared::LinkCategory;

/// A link is kept only if its URL or text contains one of these.
pub const RELEVANT_KEYWORDS: &[&str] = &[
    "news",
    "blog",
    "press",
    "careers",
    "about",
    "investor",
    "media",
    "announcement",
];

/// Category rules in priority order. Unmatched links are [`LinkCategory::General`].
pub const CATEGORY_RULES: &[(LinkCategory, &[&str])] = &[
    (LinkCategory::News, &["news", "press", "announcement"]),
    (LinkCategory::Careers, &["career", "job", "hire"]),
    (
        LinkCategory::InvestorRelations,
        &["investor", "financial", "funding"],
    ),
    (LinkCategory::CompanyInfo, &["about", "company", "management"]),
];

/// True if any keyword occurs in either lowercased haystack.
fn mentions_any(keywords: &[&str], url_lower: &str, text_lower: &str) -> bool {
    keywords
        .iter()
        .any(|k| url_lower.contains(k) || text_lower.contains(k))
}

/// Whether an anchor is topically relevant (case-insensitive).
pub fn is_relevant(url: &str, text: &str) -> bool {
    mentions_any(RELEVANT_KEYWORDS, &url.to_lowercase(), &text.to_lowercase())
}

/// Assign a category by first matching rule.
pub fn categorize(url: &str, text: &str) -> LinkCategory {
    let url_lower = url.to_lowercase();
    let text_lower = text.to_lowercase();

    CATEGORY_RULES
        .iter()
        .find(|(_, keywords)| mentions_any(keywords, &url_lower, &text_lower))
        .map(|(category, _)| *category)
        .unwrap_or(LinkCategory::General)
}
