//! Single-page fetcher.
//!
//! One GET per URL with a bounded timeout and a browser-like User-Agent.
//! Every failure is folded into [`ScrapeResult::status`]; nothing is raised
//! to the caller, so one bad URL never aborts a report run.

use std::time::Duration;

use reqwest::Client;
use scraper::Html;
use tracing::{debug, instrument, warn};
use url::Url;

use acctintel_discovery::{ResearchSession, discover};
use acctintel_shared::{
    AcctIntelError, FetchFailure, FetchStatus, ReportConfig, Result, ScrapeResult,
};

use crate::extract::{extract_text, extract_title, truncate_chars};

/// Maximum number of redirects to follow per page.
const MAX_REDIRECTS: usize = 5;

/// Prepend `https://` to user-typed URLs that carry no HTTP scheme.
pub fn normalize_input_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

/// HTTP page fetcher.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Build a fetcher sending `user_agent` and giving up after `timeout`.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(timeout)
            .build()
            .map_err(|e| AcctIntelError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Build a fetcher from the runtime report configuration.
    pub fn from_config(config: &ReportConfig) -> Result<Self> {
        Self::new(
            &config.user_agent,
            Duration::from_secs(config.fetch_timeout_secs),
        )
    }

    /// Fetch `url`, discover its related links into `session`, and return
    /// its flattened text capped at `max_length` characters.
    #[instrument(skip(self, session))]
    pub async fn fetch(
        &self,
        url: &str,
        max_length: usize,
        session: &mut ResearchSession,
    ) -> ScrapeResult {
        match self.try_fetch(url, max_length, session).await {
            Ok(result) => result,
            Err(e) => {
                warn!(%url, error = %e, "fetch failed");
                ScrapeResult::failed(url, e.to_string())
            }
        }
    }

    async fn try_fetch(
        &self,
        url: &str,
        max_length: usize,
        session: &mut ResearchSession,
    ) -> Result<ScrapeResult> {
        let parsed = Url::parse(url)
            .map_err(|e| AcctIntelError::fetch(url, FetchFailure::InvalidUrl(e.to_string())))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AcctIntelError::fetch(
                url,
                FetchFailure::UnsupportedScheme(parsed.scheme().to_string()),
            ));
        }

        debug!(%parsed, "fetching page");

        let response = self
            .client
            .get(parsed.as_str())
            .send()
            .await
            .map_err(|e| AcctIntelError::fetch(url, FetchFailure::Transport(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AcctIntelError::fetch(url, FetchFailure::Status(status.as_u16())));
        }

        // Redirects may move the page; relative links resolve against where we landed.
        let final_url = response.url().clone();

        let body = response
            .text()
            .await
            .map_err(|e| AcctIntelError::fetch(url, FetchFailure::Body(e.to_string())))?;

        let doc = Html::parse_document(&body);

        // Discovery sees the document before any text is stripped.
        discover(&doc, &final_url, session);

        let text = extract_text(&doc);
        let title = extract_title(&doc);

        debug!(
            %url,
            chars = text.chars().count(),
            %title,
            "page fetched"
        );

        Ok(ScrapeResult {
            url: url.to_string(),
            content: truncate_chars(&text, max_length),
            title,
            status: FetchStatus::Success,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acctintel_shared::LinkCategory;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEST_UA: &str = "Mozilla/5.0 (test)";

    fn fetcher() -> Fetcher {
        Fetcher::new(TEST_UA, Duration::from_secs(10)).unwrap()
    }

    #[test]
    fn normalize_adds_https() {
        assert_eq!(normalize_input_url("example.com"), "https://example.com");
        assert_eq!(
            normalize_input_url(" www.example.com/news "),
            "https://www.example.com/news"
        );
    }

    #[test]
    fn normalize_keeps_existing_scheme() {
        assert_eq!(normalize_input_url("http://example.com"), "http://example.com");
        assert_eq!(
            normalize_input_url("https://example.com/about"),
            "https://example.com/about"
        );
    }

    #[tokio::test]
    async fn fetch_success_extracts_text_title_and_links() {
        let server = MockServer::start().await;
        let page = r#"<html><head><title>Acme Corp</title>
            <script>trackVisitor();</script></head>
            <body>
                <h1>Acme</h1>
                <p>Acme closed a Series B funding round.</p>
                <a href="/careers">Careers</a>
                <a href="/pricing">Pricing</a>
            </body></html>"#;

        Mock::given(method("GET"))
            .and(path("/"))
            .and(header("user-agent", TEST_UA))
            .respond_with(ResponseTemplate::new(200).set_body_string(page))
            .mount(&server)
            .await;

        let mut session = ResearchSession::new();
        let result = fetcher().fetch(&server.uri(), 5000, &mut session).await;

        assert!(result.is_success());
        assert_eq!(result.status.to_string(), "success");
        assert_eq!(result.title, "Acme Corp");
        assert!(result.content.contains("Series B funding round"));
        assert!(!result.content.contains("trackVisitor"));

        assert_eq!(session.links().len(), 1);
        assert_eq!(session.links()[0].url, format!("{}/careers", server.uri()));
        assert_eq!(session.links()[0].category, LinkCategory::Careers);
    }

    #[tokio::test]
    async fn fetch_truncates_content() {
        let server = MockServer::start().await;
        let page = format!("<html><body><p>{}</p></body></html>", "x".repeat(500));

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page))
            .mount(&server)
            .await;

        let mut session = ResearchSession::new();
        let result = fetcher().fetch(&server.uri(), 100, &mut session).await;

        assert_eq!(result.content.chars().count(), 103);
        assert!(result.content.ends_with("..."));
    }

    #[tokio::test]
    async fn fetch_http_error_is_status_not_panic() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let mut session = ResearchSession::new();
        let result = fetcher().fetch(&server.uri(), 5000, &mut session).await;

        assert!(result.status.to_string().starts_with("error:"));
        assert!(result.status.to_string().contains("404"));
        assert_eq!(result.content, "");
        assert_eq!(result.title, "");
        assert!(session.links().is_empty());
    }

    #[tokio::test]
    async fn fetch_connection_refused() {
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let mut session = ResearchSession::new();
        let result = fetcher().fetch(&uri, 5000, &mut session).await;

        assert!(result.status.to_string().starts_with("error:"));
        assert_eq!(result.content, "");
    }

    #[tokio::test]
    async fn fetch_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html></html>")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(TEST_UA, Duration::from_millis(200)).unwrap();
        let mut session = ResearchSession::new();
        let result = fetcher.fetch(&server.uri(), 5000, &mut session).await;

        assert!(result.status.to_string().starts_with("error:"));
        assert_eq!(result.content, "");
    }

    #[tokio::test]
    async fn fetch_invalid_url() {
        let mut session = ResearchSession::new();
        let result = fetcher().fetch("not a url", 5000, &mut session).await;
        assert!(result.status.to_string().starts_with("error:"));
        assert_eq!(result.url, "not a url");

        let result = fetcher().fetch("ftp://example.com/file", 5000, &mut session).await;
        assert!(result.status.to_string().contains("unsupported scheme"));
    }
}
