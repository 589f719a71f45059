//! Source aggregation and insight-table rendering.
//!
//! Scored sources and discovered links are merged into per-insight-type
//! buckets. The model is asked to turn the buckets into the final table; if
//! that fails or comes back unusable, a deterministic table is built from the
//! best candidate in each bucket.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use acctintel_fetcher::truncate_chars;
use acctintel_markdown::{MarkdownTable, format_source_cell, parse_table, render_table};
use acctintel_shared::{
    CompanyInfo, DiscoveredLink, InsightType, LinkCategory, ResearchResult, SessionId,
};

use crate::llm::{CompletionRequest, LlmClient};

/// Column headers of every report table.
pub const REPORT_HEADERS: [&str; 3] = ["Insight Type", "Recommended Source", "Reason"];

/// Relevance assigned to the company's own categorized pages.
pub const DISCOVERED_LINK_RELEVANCE: u8 = 8;

/// Characters of each source's content included in the report prompt.
const CONTEXT_CONTENT_CHARS: usize = 800;

const REPORT_MAX_TOKENS: u32 = 1000;

const REPORT_SYSTEM_PROMPT: &str = "You are an enterprise research assistant. \
Create a comprehensive insights table with these columns:\n\
- Insight Type\n\
- Recommended Source (with URL)\n\
- Reason\n\n\
For the Recommended Source column, format as: \"Source Name - URL\" \
(e.g., \"Company Website - https://example.com/news\").\n\n\
Use only these insight types: Account Intelligence, Recent Hires, Recent Initiatives, \
Growth Insights, Funding, Senior Management.\n\
Output ONLY a markdown table with proper URLs included.";

// ---------------------------------------------------------------------------
// Classification rules
// ---------------------------------------------------------------------------

/// Ordered keyword rules mapping an insight sentence to its type.
/// First match wins; no match means [`InsightType::AccountIntelligence`].
pub const INSIGHT_RULES: &[(InsightType, &[&str])] = &[
    (
        InsightType::RecentHires,
        &["hire", "recruit", "employee", "staff"],
    ),
    (
        InsightType::Funding,
        &["funding", "investment", "capital", "financial"],
    ),
    (
        InsightType::GrowthInsights,
        &["growth", "expansion", "market", "revenue"],
    ),
    (
        InsightType::RecentInitiatives,
        &["initiative", "project", "partnership", "acquisition"],
    ),
    (
        InsightType::SeniorManagement,
        &["management", "executive", "leadership", "ceo", "cto"],
    ),
];

/// Classify a free-text insight by keyword.
pub fn classify_insight(insight: &str) -> InsightType {
    let lower = insight.to_lowercase();
    INSIGHT_RULES
        .iter()
        .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .map(|(kind, _)| *kind)
        .unwrap_or(InsightType::AccountIntelligence)
}

/// Insight type a discovered link's category contributes to.
pub fn category_insight(category: LinkCategory) -> InsightType {
    match category {
        LinkCategory::News => InsightType::RecentInitiatives,
        LinkCategory::Careers => InsightType::RecentHires,
        LinkCategory::InvestorRelations => InsightType::Funding,
        LinkCategory::CompanyInfo => InsightType::AccountIntelligence,
        LinkCategory::General => InsightType::GrowthInsights,
    }
}

// ---------------------------------------------------------------------------
// Buckets
// ---------------------------------------------------------------------------

/// A source competing for one insight row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub source_name: String,
    pub url: String,
    pub relevance: u8,
}

/// Candidates grouped by insight type, in first-insertion order.
#[derive(Debug, Clone, Default)]
pub struct InsightBuckets {
    buckets: Vec<(InsightType, Vec<Candidate>)>,
}

impl InsightBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket every insight of every result, then every discovered link.
    pub fn build(results: &[ResearchResult], links: &[DiscoveredLink]) -> Self {
        let mut buckets = Self::new();

        for result in results {
            for insight in &result.relevant_insights {
                buckets.push(
                    classify_insight(insight),
                    Candidate {
                        source_name: result.source_name.clone(),
                        url: result.url.clone(),
                        relevance: result.relevance_score,
                    },
                );
            }
        }

        for link in links {
            buckets.push(
                category_insight(link.category),
                Candidate {
                    source_name: format!("Company Website - {}", link.category),
                    url: link.url.clone(),
                    relevance: DISCOVERED_LINK_RELEVANCE,
                },
            );
        }

        buckets
    }

    pub fn push(&mut self, kind: InsightType, candidate: Candidate) {
        match self.buckets.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, list)) => list.push(candidate),
            None => self.buckets.push((kind, vec![candidate])),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (InsightType, &[Candidate])> {
        self.buckets.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    /// Highest-relevance candidate of `kind`; the earliest wins ties.
    pub fn best(&self, kind: InsightType) -> Option<&Candidate> {
        self.buckets
            .iter()
            .find(|(k, _)| *k == kind)
            .and_then(|(_, list)| best_of(list))
    }
}

fn best_of(candidates: &[Candidate]) -> Option<&Candidate> {
    candidates
        .iter()
        .fold(None, |best: Option<&Candidate>, c| match best {
            Some(b) if b.relevance >= c.relevance => Some(b),
            _ => Some(c),
        })
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Which path produced a report table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSource {
    Llm,
    Fallback,
}

/// The final insight table and its provenance.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedReport {
    pub markdown: String,
    pub source: ReportSource,
    pub generated_at: DateTime<Utc>,
    pub session_id: SessionId,
}

/// Deterministic table: one row per non-empty bucket, in bucket order.
pub fn fallback_table(buckets: &InsightBuckets) -> String {
    let rows: Vec<Vec<String>> = buckets
        .iter()
        .filter_map(|(kind, candidates)| {
            let best = best_of(candidates)?;
            Some(vec![
                kind.label().to_string(),
                format_source_cell(&best.source_name, &best.url),
                format!(
                    "High relevance source with detailed information about {}",
                    kind.label().to_lowercase()
                ),
            ])
        })
        .collect();

    render_table(&REPORT_HEADERS, &rows)
}

/// The report table inside model output, if it is one worth showing.
pub fn usable_table(markdown: &str) -> Option<MarkdownTable> {
    let table = parse_table(markdown).ok()?;
    let usable = table.headers.len() == REPORT_HEADERS.len()
        && table.headers[0].eq_ignore_ascii_case(REPORT_HEADERS[0])
        && !table.rows.is_empty();
    usable.then_some(table)
}

/// Re-render a parsed table, dropping whatever surrounded it.
fn clean_table(table: &MarkdownTable) -> String {
    let headers: Vec<&str> = table.headers.iter().map(String::as_str).collect();
    render_table(&headers, &table.rows)
}

/// Build the report prompt from the request, buckets and sources.
pub fn build_context(
    company: &CompanyInfo,
    buckets: &InsightBuckets,
    results: &[ResearchResult],
) -> String {
    let mut ctx = String::new();
    ctx.push_str(&format!("Company: {}\n", company.company));
    ctx.push_str(&format!("Country: {}\n", company.country));
    ctx.push_str(&format!("Research Topic: {}\n", company.research_topic));
    ctx.push_str(&format!("Requirements: {}\n\n", company.prompt));

    ctx.push_str("Available Sources with URLs:\n");
    for (kind, candidates) in buckets.iter() {
        ctx.push_str(&format!("\n{kind}:\n"));
        for c in candidates {
            ctx.push_str(&format!("- {}: {}\n", c.source_name, c.url));
        }
    }

    for result in results {
        ctx.push_str(&format!("\nSource: {}\n", result.source_name));
        ctx.push_str(&format!(
            "Content: {}\n",
            truncate_chars(&result.content, CONTEXT_CONTENT_CHARS)
        ));
    }

    ctx
}

/// Merge results and links into buckets and render the report table.
///
/// Never fails. Without any candidates the model is not called and the
/// header-only table is returned.
#[instrument(
    skip_all,
    fields(company = %company.company, results = results.len(), links = links.len())
)]
pub async fn aggregate_and_render<L: LlmClient>(
    llm: &L,
    company: &CompanyInfo,
    results: &[ResearchResult],
    links: &[DiscoveredLink],
    session_id: SessionId,
) -> RenderedReport {
    let buckets = InsightBuckets::build(results, links);
    debug!(buckets = buckets.len(), "sources bucketed");

    let report = |markdown: String, source: ReportSource| RenderedReport {
        markdown,
        source,
        generated_at: Utc::now(),
        session_id,
    };

    if buckets.is_empty() {
        info!("no candidate sources, rendering empty table");
        return report(fallback_table(&buckets), ReportSource::Fallback);
    }

    let request = CompletionRequest::new(
        REPORT_SYSTEM_PROMPT,
        build_context(company, &buckets, results),
        REPORT_MAX_TOKENS,
    );

    match llm.complete(&request).await {
        Ok(markdown) => match usable_table(&markdown) {
            Some(table) => {
                info!(rows = table.rows.len(), "report table rendered by model");
                report(clean_table(&table), ReportSource::Llm)
            }
            None => {
                warn!("model returned no usable table, using fallback");
                report(fallback_table(&buckets), ReportSource::Fallback)
            }
        },
        Err(e) => {
            warn!(error = %e, "report rendering failed, using fallback");
            report(fallback_table(&buckets), ReportSource::Fallback)
        }
    }
}
