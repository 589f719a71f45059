//! End-to-end report pipeline: URLs → fetch + discover → score → aggregate → table.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, instrument, warn};
use url::Url;

use acctintel_discovery::ResearchSession;
use acctintel_fetcher::{Fetcher, normalize_input_url};
use acctintel_shared::{
    CompanyInfo, DiscoveredLink, ReportConfig, ResearchResult, Result, ScrapeResult,
};

use crate::aggregator::{RenderedReport, aggregate_and_render};
use crate::llm::{LlmClient, OpenAiCompatClient};
use crate::scorer;

/// Result of one report run.
#[derive(Debug, Clone, Serialize)]
pub struct ReportOutcome {
    /// The rendered insight table.
    pub report: RenderedReport,
    /// Links discovered across all fetched pages, in discovery order.
    pub discovered_links: Vec<DiscoveredLink>,
    /// One entry per requested URL, successful or not.
    pub scrapes: Vec<ScrapeResult>,
    /// Successfully fetched sources with their relevance scores.
    pub results: Vec<ResearchResult>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each URL has been fetched (and scored, if it succeeded).
    fn page_fetched(&self, url: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, outcome: &ReportOutcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn page_fetched(&self, _url: &str, _current: usize, _total: usize) {}
    fn done(&self, _outcome: &ReportOutcome) {}
}

/// Display name for a fetched source: `Company Website (<host>)`.
pub fn source_name(url: &str) -> String {
    let host = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(String::from))
        .unwrap_or_else(|| url.to_string());
    format!("Company Website ({host})")
}

/// Run the full report pipeline against the configured LLM endpoint.
///
/// Only setup failures (missing API key, HTTP client construction) are
/// errors; every per-URL and per-call failure degrades in place.
pub async fn generate_report(
    config: &ReportConfig,
    company: &CompanyInfo,
    progress: &dyn ProgressReporter,
) -> Result<ReportOutcome> {
    let fetcher = Fetcher::from_config(config)?;
    let llm = OpenAiCompatClient::from_config(&config.llm)?;
    Ok(run_report(&fetcher, &llm, config, company, progress).await)
}

/// Run the pipeline with an explicit fetcher and LLM client.
///
/// 1. Normalize the support URLs
/// 2. Fetch each URL in turn, collecting discovered links into the session
/// 3. Score each successful page against the requirements
/// 4. Aggregate and render the insight table
#[instrument(skip_all, fields(company = %company.company))]
pub async fn run_report<L: LlmClient>(
    fetcher: &Fetcher,
    llm: &L,
    config: &ReportConfig,
    company: &CompanyInfo,
    progress: &dyn ProgressReporter,
) -> ReportOutcome {
    let start = Instant::now();
    let mut session = ResearchSession::new();

    let urls: Vec<String> = company
        .support_url_list()
        .iter()
        .map(|u| normalize_input_url(u))
        .collect();
    let requirements = company.requirements();

    info!(session = %session.id(), urls = urls.len(), "starting report");

    // --- Phase 1: Fetch and score ---
    progress.phase("Fetching sources");
    let mut scrapes = Vec::with_capacity(urls.len());
    let mut results = Vec::new();

    for (i, url) in urls.iter().enumerate() {
        let scrape = fetcher
            .fetch(url, config.max_content_length, &mut session)
            .await;

        if scrape.is_success() {
            let judgment = scorer::score(llm, &scrape.content, &requirements, url).await;
            results.push(ResearchResult {
                source_name: source_name(url),
                url: url.clone(),
                title: scrape.title.clone(),
                content: scrape.content.clone(),
                relevance_score: judgment.relevance_score,
                relevant_insights: judgment.relevant_insights,
            });
        } else {
            warn!(%url, status = %scrape.status, "skipping source");
        }

        scrapes.push(scrape);
        progress.page_fetched(url, i + 1, urls.len());
    }

    // --- Phase 2: Aggregate ---
    progress.phase("Generating insights table");
    let session_id = session.id().clone();
    let links = session.into_links();
    let report = aggregate_and_render(llm, company, &results, &links, session_id).await;

    let outcome = ReportOutcome {
        report,
        discovered_links: links,
        scrapes,
        results,
        elapsed: start.elapsed(),
    };

    info!(
        sources = outcome.results.len(),
        links = outcome.discovered_links.len(),
        rendered_by = ?outcome.report.source,
        elapsed_ms = outcome.elapsed.as_millis() as u64,
        "report complete"
    );

    progress.done(&outcome);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use acctintel_markdown::parse_table;
    use acctintel_shared::{AppConfig, LinkCategory, LlmConfig, LlmProvider};
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::aggregator::ReportSource;

    fn report_config(server: &MockServer) -> ReportConfig {
        let mut config = ReportConfig::from(&AppConfig::default());
        config.fetch_timeout_secs = 5;
        config.llm = LlmConfig {
            provider: LlmProvider::OpenAi,
            base_url: server.uri(),
            timeout_secs: 5,
            ..LlmConfig::default()
        };
        config
    }

    fn clients(config: &ReportConfig) -> (Fetcher, OpenAiCompatClient) {
        (
            Fetcher::from_config(config).unwrap(),
            OpenAiCompatClient::with_api_key(&config.llm, "test-key").unwrap(),
        )
    }

    fn chat_body(content: &str) -> serde_json::Value {
        json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] })
    }

    #[test]
    fn source_name_uses_host() {
        assert_eq!(
            source_name("https://www.acme.com/news"),
            "Company Website (www.acme.com)"
        );
        assert_eq!(source_name("garbage"), "Company Website (garbage)");
    }

    #[tokio::test]
    async fn end_to_end_with_fallback_table() {
        let server = MockServer::start().await;

        let page = r#"<html><head><title>Acme</title></head><body>
            <p>Acme closed a Series B funding round led by Globex.</p>
            <a href="/careers">Careers</a>
        </body></html>"#;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page))
            .mount(&server)
            .await;

        let judgment = json!({
            "relevance_score": 9,
            "relevant_insights": ["Series B funding round led by Globex"],
            "missing_info": [],
            "recommendation": "use_source",
            "best_for": ["Funding"]
        });
        let judgment_reply = chat_body(&judgment.to_string());
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_string_contains("Respond only with valid JSON"))
            .respond_with(ResponseTemplate::new(200).set_body_json(judgment_reply))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_string_contains("enterprise research assistant"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("Sorry, no table.")))
            .expect(1)
            .mount(&server)
            .await;

        let config = report_config(&server);
        let (fetcher, llm) = clients(&config);
        let company = CompanyInfo {
            company: "Acme".into(),
            research_topic: "Funding".into(),
            support_urls: format!("{}, ,", server.uri()),
            prompt: "Find funding news".into(),
            ..Default::default()
        };

        let outcome = run_report(&fetcher, &llm, &config, &company, &SilentProgress).await;

        assert_eq!(outcome.scrapes.len(), 1);
        assert!(outcome.scrapes[0].is_success());
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].relevance_score, 9);
        assert_eq!(outcome.results[0].source_name, "Company Website (127.0.0.1)");

        assert_eq!(outcome.discovered_links.len(), 1);
        assert_eq!(outcome.discovered_links[0].category, LinkCategory::Careers);

        assert_eq!(outcome.report.source, ReportSource::Fallback);
        let table = parse_table(&outcome.report.markdown).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0], "Funding");
        assert!(table.rows[0][1].ends_with(&format!(" - {}", server.uri())));
        assert_eq!(table.rows[1][0], "Recent Hires");
        assert_eq!(
            table.rows[1][1],
            format!("Company Website - Careers - {}/careers", server.uri())
        );
    }

    #[tokio::test]
    async fn failed_fetch_is_recorded_not_scored() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let config = report_config(&server);
        let (fetcher, llm) = clients(&config);
        let company = CompanyInfo {
            support_urls: server.uri(),
            ..Default::default()
        };

        let outcome = run_report(&fetcher, &llm, &config, &company, &SilentProgress).await;

        assert_eq!(outcome.scrapes.len(), 1);
        assert!(outcome.scrapes[0].status.to_string().starts_with("error:"));
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.report.source, ReportSource::Fallback);
    }

    #[tokio::test]
    async fn schemeless_support_url_is_fetched_over_https() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let config = report_config(&server);
        let (fetcher, llm) = clients(&config);
        let host = server.uri().trim_start_matches("http://").to_string();
        let company = CompanyInfo {
            support_urls: format!(" {host} "),
            ..Default::default()
        };

        let outcome = run_report(&fetcher, &llm, &config, &company, &SilentProgress).await;

        // The mock only speaks plain HTTP, so the upgraded request cannot succeed.
        assert_eq!(outcome.scrapes.len(), 1);
        assert_eq!(outcome.scrapes[0].url, format!("https://{host}"));
        assert!(outcome.scrapes[0].status.to_string().starts_with("error:"));
        assert!(outcome.results.is_empty());
    }

    #[tokio::test]
    async fn zero_urls_yields_header_only_table() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("unused")))
            .expect(0)
            .mount(&server)
            .await;

        let config = report_config(&server);
        let (fetcher, llm) = clients(&config);
        let company = CompanyInfo {
            company: "Acme".into(),
            ..Default::default()
        };

        let outcome = run_report(&fetcher, &llm, &config, &company, &SilentProgress).await;

        assert!(outcome.scrapes.is_empty());
        assert!(outcome.discovered_links.is_empty());
        let table = parse_table(&outcome.report.markdown).unwrap();
        assert_eq!(table.headers.len(), 3);
        assert!(table.rows.is_empty());
    }
}
