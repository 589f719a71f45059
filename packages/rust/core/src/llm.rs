//! Chat-completion client.
//!
//! Scoring and report rendering talk to the model through [`LlmClient`].
//! [`OpenAiCompatClient`] speaks the OpenAI chat-completions wire format,
//! which OpenRouter, OpenAI and Azure OpenAI all accept.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use acctintel_shared::{AcctIntelError, LlmConfig, LlmProvider, Result};

/// One system + user prompt exchange.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            max_tokens,
        }
    }
}

/// Anything that turns a prompt into completion text.
pub trait LlmClient: Send + Sync {
    /// Return the assistant message text for `req`.
    fn complete(&self, req: &CompletionRequest) -> impl Future<Output = Result<String>> + Send;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// ---------------------------------------------------------------------------
// OpenAI-compatible client
// ---------------------------------------------------------------------------

/// How the API key travels with each request.
#[derive(Debug, Clone)]
enum Auth {
    Bearer(String),
    AzureKey(String),
}

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiCompatClient {
    client: Client,
    endpoint: String,
    /// Sent in the body; Azure addresses the model by deployment path instead.
    model: Option<String>,
    auth: Auth,
}

impl OpenAiCompatClient {
    /// Build a client from config, reading the API key from the environment.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = config.api_key()?;
        Self::with_api_key(config, api_key)
    }

    /// Build a client from config with an explicit API key.
    pub fn with_api_key(config: &LlmConfig, api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        let base = config.base_url.trim_end_matches('/');

        let (endpoint, model, auth) = match config.provider {
            LlmProvider::Azure => {
                let version = config.api_version.as_deref().ok_or_else(|| {
                    AcctIntelError::config("llm.api_version is required for the azure provider")
                })?;
                (
                    format!(
                        "{base}/openai/deployments/{}/chat/completions?api-version={version}",
                        config.model
                    ),
                    None,
                    Auth::AzureKey(api_key),
                )
            }
            LlmProvider::OpenRouter | LlmProvider::OpenAi => (
                format!("{base}/chat/completions"),
                Some(config.model.clone()),
                Auth::Bearer(api_key),
            ),
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AcctIntelError::config(format!("failed to build LLM HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            model,
            auth,
        })
    }

    /// Full URL requests are POSTed to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl LlmClient for OpenAiCompatClient {
    #[instrument(skip_all, fields(endpoint = %self.endpoint, max_tokens = req.max_tokens))]
    async fn complete(&self, req: &CompletionRequest) -> Result<String> {
        let body = ChatRequest {
            model: self.model.as_deref(),
            messages: [
                ChatMessage {
                    role: "system",
                    content: &req.system,
                },
                ChatMessage {
                    role: "user",
                    content: &req.user,
                },
            ],
            max_tokens: req.max_tokens,
        };

        let builder = self.client.post(&self.endpoint).json(&body);
        let builder = match &self.auth {
            Auth::Bearer(key) => builder.bearer_auth(key),
            Auth::AzureKey(key) => builder.header("api-key", key),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| AcctIntelError::Llm(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let snippet: String = text.chars().take(200).collect();
            return Err(AcctIntelError::Llm(format!("HTTP {status}: {snippet}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AcctIntelError::Llm(format!("invalid response body: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AcctIntelError::Llm("response contained no choices".into()))?;

        debug!(chars = content.chars().count(), "completion received");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer, provider: LlmProvider) -> LlmConfig {
        LlmConfig {
            provider,
            base_url: server.uri(),
            model: "test-model".into(),
            api_version: Some("2024-02-01".into()),
            timeout_secs: 5,
            ..LlmConfig::default()
        }
    }

    fn chat_body(content: &str) -> serde_json::Value {
        json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] })
    }

    fn request() -> CompletionRequest {
        CompletionRequest::new("system prompt", "user prompt", 42)
    }

    #[tokio::test]
    async fn bearer_request_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "test-model",
                "max_tokens": 42,
                "messages": [
                    { "role": "system", "content": "system prompt" },
                    { "role": "user", "content": "user prompt" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("hello")))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            OpenAiCompatClient::with_api_key(&config_for(&server, LlmProvider::OpenRouter), "sk-test")
                .unwrap();
        assert_eq!(client.complete(&request()).await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn azure_request_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/deployments/test-model/chat/completions"))
            .and(query_param("api-version", "2024-02-01"))
            .and(header("api-key", "az-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("azure says hi")))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            OpenAiCompatClient::with_api_key(&config_for(&server, LlmProvider::Azure), "az-key")
                .unwrap();
        assert_eq!(client.complete(&request()).await.unwrap(), "azure says hi");
    }

    #[test]
    fn azure_requires_api_version() {
        let config = LlmConfig {
            provider: LlmProvider::Azure,
            api_version: None,
            ..LlmConfig::default()
        };
        let err = OpenAiCompatClient::with_api_key(&config, "k").unwrap_err();
        assert!(err.to_string().contains("api_version"));
    }

    #[test]
    fn trailing_slash_in_base_url() {
        let config = LlmConfig {
            base_url: "https://openrouter.ai/api/v1/".into(),
            ..LlmConfig::default()
        };
        let client = OpenAiCompatClient::with_api_key(&config, "k").unwrap();
        assert_eq!(
            client.endpoint(),
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }

    #[tokio::test]
    async fn non_success_status_is_llm_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let client =
            OpenAiCompatClient::with_api_key(&config_for(&server, LlmProvider::OpenAi), "k").unwrap();
        let err = client.complete(&request()).await.unwrap_err();
        assert!(matches!(err, AcctIntelError::Llm(_)));
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn empty_choices_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let client =
            OpenAiCompatClient::with_api_key(&config_for(&server, LlmProvider::OpenAi), "k").unwrap();
        assert!(client.complete(&request()).await.is_err());
    }

    #[tokio::test]
    async fn garbage_body_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client =
            OpenAiCompatClient::with_api_key(&config_for(&server, LlmProvider::OpenAi), "k").unwrap();
        assert!(client.complete(&request()).await.is_err());
    }
}
