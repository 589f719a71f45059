//! Core domain types for account-intelligence reports.

use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// SessionId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one report-generation run (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Generate a new time-sortable session identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ScrapeResult
// ---------------------------------------------------------------------------

/// Outcome of a single page fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    Success,
    /// Network, timeout, HTTP status, or URL failure description.
    Error(String),
}

impl std::fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Error(message) => write!(f, "error: {message}"),
        }
    }
}

impl Serialize for FetchStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One fetched URL. Never mutated after the fetcher returns it.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeResult {
    pub url: String,
    /// Flattened page text, capped at the configured length.
    pub content: String,
    /// `<title>` text; empty on failure.
    pub title: String,
    pub status: FetchStatus,
}

impl ScrapeResult {
    /// A failed fetch: empty content and title.
    pub fn failed(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content: String::new(),
            title: String::new(),
            status: FetchStatus::Error(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == FetchStatus::Success
    }
}

// ---------------------------------------------------------------------------
// DiscoveredLink
// ---------------------------------------------------------------------------

/// Coarse category assigned to a discovered link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkCategory {
    News,
    Careers,
    #[serde(rename = "Investor Relations")]
    InvestorRelations,
    #[serde(rename = "Company Info")]
    CompanyInfo,
    General,
}

impl LinkCategory {
    /// Human-readable label used in source names and listings.
    pub fn label(&self) -> &'static str {
        match self {
            Self::News => "News",
            Self::Careers => "Careers",
            Self::InvestorRelations => "Investor Relations",
            Self::CompanyInfo => "Company Info",
            Self::General => "General",
        }
    }
}

impl std::fmt::Display for LinkCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// An anchor on a fetched page that matched a relevance keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredLink {
    /// Absolute URL, resolved against the page it was found on.
    pub url: String,
    /// Trimmed anchor text.
    pub display_text: String,
    pub category: LinkCategory,
}

// ---------------------------------------------------------------------------
// RelevanceJudgment
// ---------------------------------------------------------------------------

/// Whether a source is worth citing for the requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    UseSource,
    SearchElsewhere,
}

/// LLM judgment of one source against the user's requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelevanceJudgment {
    /// 0 (irrelevant) to 10 (highly relevant).
    pub relevance_score: u8,
    pub relevant_insights: Vec<String>,
    pub missing_info: Vec<String>,
    pub recommendation: Recommendation,
    pub best_for: Vec<String>,
    pub source_url: String,
}

impl RelevanceJudgment {
    /// The zero-confidence judgment substituted when analysis fails.
    pub fn fallback(source_url: impl Into<String>) -> Self {
        Self {
            relevance_score: 0,
            relevant_insights: Vec::new(),
            missing_info: vec!["Analysis failed".into()],
            recommendation: Recommendation::SearchElsewhere,
            best_for: Vec::new(),
            source_url: source_url.into(),
        }
    }
}

/// A successfully fetched source merged with its relevance judgment.
#[derive(Debug, Clone, Serialize)]
pub struct ResearchResult {
    /// Display name, e.g. `Company Website (www.example.com)`.
    pub source_name: String,
    pub url: String,
    pub title: String,
    pub content: String,
    pub relevance_score: u8,
    pub relevant_insights: Vec<String>,
}

// ---------------------------------------------------------------------------
// InsightType
// ---------------------------------------------------------------------------

/// Fixed taxonomy of report rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InsightType {
    #[serde(rename = "Account Intelligence")]
    AccountIntelligence,
    #[serde(rename = "Recent Hires")]
    RecentHires,
    #[serde(rename = "Recent Initiatives")]
    RecentInitiatives,
    #[serde(rename = "Growth Insights")]
    GrowthInsights,
    Funding,
    #[serde(rename = "Senior Management")]
    SeniorManagement,
}

impl InsightType {
    /// Every insight type, in the order the report prompt lists them.
    pub const ALL: [InsightType; 6] = [
        Self::AccountIntelligence,
        Self::RecentHires,
        Self::RecentInitiatives,
        Self::GrowthInsights,
        Self::Funding,
        Self::SeniorManagement,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::AccountIntelligence => "Account Intelligence",
            Self::RecentHires => "Recent Hires",
            Self::RecentInitiatives => "Recent Initiatives",
            Self::GrowthInsights => "Growth Insights",
            Self::Funding => "Funding",
            Self::SeniorManagement => "Senior Management",
        }
    }

    /// Case-insensitive lookup by label.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(label))
    }
}

impl std::fmt::Display for InsightType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// CompanyInfo
// ---------------------------------------------------------------------------

/// The research request as entered by the user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub company: String,
    pub country: String,
    pub research_topic: String,
    pub search_queries: String,
    /// Comma-separated URLs, scheme optional.
    pub support_urls: String,
    /// Free-text intelligence requirements.
    pub prompt: String,
}

impl CompanyInfo {
    /// Requirement text sent to the relevance scorer.
    pub fn requirements(&self) -> String {
        format!(
            "{} {} {}",
            self.research_topic, self.search_queries, self.prompt
        )
    }

    /// Non-empty, trimmed entries of `support_urls`, as typed.
    pub fn support_url_list(&self) -> Vec<String> {
        self.support_urls
            .split(',')
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(String::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_status_display() {
        assert_eq!(FetchStatus::Success.to_string(), "success");
        let err = FetchStatus::Error("HTTP 404 Not Found".into());
        assert!(err.to_string().starts_with("error:"));
    }

    #[test]
    fn failed_scrape_is_empty() {
        let r = ScrapeResult::failed("https://example.com", "timed out");
        assert!(!r.is_success());
        assert!(r.content.is_empty());
        assert!(r.title.is_empty());
        assert_eq!(r.status.to_string(), "error: timed out");
    }

    #[test]
    fn fallback_judgment_shape() {
        let j = RelevanceJudgment::fallback("https://example.com");
        assert_eq!(j.relevance_score, 0);
        assert!(j.relevant_insights.is_empty());
        assert_eq!(j.missing_info, vec!["Analysis failed".to_string()]);
        assert_eq!(j.recommendation, Recommendation::SearchElsewhere);
        assert_eq!(j.source_url, "https://example.com");
    }

    #[test]
    fn judgment_serializes_snake_case_recommendation() {
        let j = RelevanceJudgment::fallback("https://example.com");
        let json = serde_json::to_string(&j).unwrap();
        assert!(json.contains(r#""recommendation":"search_elsewhere""#));
    }

    #[test]
    fn insight_type_labels_roundtrip() {
        for t in InsightType::ALL {
            assert_eq!(InsightType::from_label(t.label()), Some(t));
        }
        assert_eq!(
            InsightType::from_label("  recent hires "),
            Some(InsightType::RecentHires)
        );
        assert_eq!(InsightType::from_label("Senior Management Hires"), None);
    }

    #[test]
    fn link_category_serializes_label() {
        let json = serde_json::to_string(&LinkCategory::InvestorRelations).unwrap();
        assert_eq!(json, r#""Investor Relations""#);
    }

    #[test]
    fn requirements_concatenate_fields() {
        let info = CompanyInfo {
            research_topic: "NEWS".into(),
            search_queries: "New Hires".into(),
            prompt: "Funding".into(),
            ..Default::default()
        };
        assert_eq!(info.requirements(), "NEWS New Hires Funding");
    }

    #[test]
    fn support_url_list_trims_and_drops_empty() {
        let info = CompanyInfo {
            support_urls: " example.com, ,https://example.com/news ,".into(),
            ..Default::default()
        };
        assert_eq!(
            info.support_url_list(),
            vec!["example.com".to_string(), "https://example.com/news".to_string()]
        );
    }
}
