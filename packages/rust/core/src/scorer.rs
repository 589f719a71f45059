//! Per-source relevance scoring.
//!
//! One completion per fetched page. The model is asked for a JSON judgment;
//! whatever comes back is read leniently and any failure collapses into
//! [`RelevanceJudgment::fallback`].

use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use acctintel_fetcher::truncate_chars;
use acctintel_markdown::strip_code_fence;
use acctintel_shared::{AcctIntelError, Recommendation, RelevanceJudgment, Result};

use crate::llm::{CompletionRequest, LlmClient};

/// Characters of page content sent to the model.
pub const SCORER_CONTENT_CHARS: usize = 2000;

const SCORER_MAX_TOKENS: u32 = 500;

const SCORER_SYSTEM_PROMPT: &str =
    "You are an expert content analyst. Respond only with valid JSON.";

const MAX_SCORE: f64 = 10.0;

/// Judge how well `content` satisfies `requirements`.
///
/// Never fails: transport errors and malformed output both yield the
/// zero-confidence fallback stamped with `url`.
#[instrument(skip(llm, content, requirements))]
pub async fn score<L: LlmClient>(
    llm: &L,
    content: &str,
    requirements: &str,
    url: &str,
) -> RelevanceJudgment {
    let request = CompletionRequest::new(
        SCORER_SYSTEM_PROMPT,
        build_prompt(content, requirements, url),
        SCORER_MAX_TOKENS,
    );

    let raw = match llm.complete(&request).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(%url, error = %e, "relevance scoring failed");
            return RelevanceJudgment::fallback(url);
        }
    };

    match parse_judgment(&raw, url) {
        Ok(judgment) => {
            debug!(
                %url,
                score = judgment.relevance_score,
                insights = judgment.relevant_insights.len(),
                "source scored"
            );
            judgment
        }
        Err(e) => {
            warn!(%url, error = %e, "unusable relevance judgment");
            RelevanceJudgment::fallback(url)
        }
    }
}

fn build_prompt(content: &str, requirements: &str, url: &str) -> String {
    let excerpt = truncate_chars(content, SCORER_CONTENT_CHARS);
    format!(
        "Analyze the following content and determine its relevance to the user requirements.\n\n\
         User Requirements: {requirements}\n\
         Source URL: {url}\n\n\
         Content: {excerpt}\n\n\
         Provide a JSON response with:\n\
         - \"relevance_score\": 0-10 (10 being highly relevant)\n\
         - \"relevant_insights\": list of relevant insights found with their categories \
         (e.g., \"Recent Hires\", \"Funding\", \"Growth\")\n\
         - \"missing_info\": list of information not found in content\n\
         - \"recommendation\": \"use_source\" or \"search_elsewhere\"\n\
         - \"best_for\": list of insight types this source is best suited for"
    )
}

// ---------------------------------------------------------------------------
// Lenient parsing
// ---------------------------------------------------------------------------

/// Read a model response into a judgment, filling gaps with defaults.
pub fn parse_judgment(raw: &str, url: &str) -> Result<RelevanceJudgment> {
    let body = strip_code_fence(raw);
    let value: Value = serde_json::from_str(&body)
        .map_err(|e| AcctIntelError::parse("relevance judgment", format!("not JSON: {e}")))?;
    let Value::Object(obj) = value else {
        return Err(AcctIntelError::parse("relevance judgment", "not a JSON object"));
    };

    Ok(RelevanceJudgment {
        relevance_score: read_score(obj.get("relevance_score")),
        relevant_insights: read_list(obj.get("relevant_insights")),
        missing_info: read_list(obj.get("missing_info")),
        recommendation: read_recommendation(obj.get("recommendation")),
        best_for: read_list(obj.get("best_for")),
        source_url: url.to_string(),
    })
}

fn read_score(value: Option<&Value>) -> u8 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match raw {
        Some(n) if n.is_finite() => n.round().clamp(0.0, MAX_SCORE) as u8,
        _ => 0,
    }
}

/// A list of strings; objects become their string values joined by `": "`.
fn read_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(item_text).collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

fn item_text(item: &Value) -> Option<String> {
    let text = match item {
        Value::String(s) => s.trim().to_string(),
        Value::Object(obj) => object_text(obj),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn object_text(obj: &Map<String, Value>) -> String {
    obj.values()
        .filter_map(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(": ")
}

fn read_recommendation(value: Option<&Value>) -> Recommendation {
    let Some(text) = value.and_then(Value::as_str) else {
        return Recommendation::SearchElsewhere;
    };
    let text = text.trim().to_lowercase();
    if text.contains("elsewhere") {
        Recommendation::SearchElsewhere
    } else if text.starts_with("use") || text.contains("use_source") || text.contains("use this") {
        Recommendation::UseSource
    } else {
        Recommendation::SearchElsewhere
    }
}
