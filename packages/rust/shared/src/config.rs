//! Application configuration for acctintel.
//!
//! User config lives at `~/.acctintel/acctintel.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AcctIntelError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "acctintel.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".acctintel";

/// Browser-like identification, reduces trivial bot-blocking.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

// ---------------------------------------------------------------------------
// Config structs (matching acctintel.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Page fetching settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// LLM endpoint settings.
    #[serde(default)]
    pub llm: LlmConfig,
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,

    /// Maximum characters of page text kept per source.
    #[serde(default = "default_max_content_length")]
    pub max_content_length: usize,

    /// User-Agent header sent with every page request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout(),
            max_content_length: default_max_content_length(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_fetch_timeout() -> u64 {
    10
}
fn default_max_content_length() -> usize {
    5000
}
fn default_user_agent() -> String {
    BROWSER_USER_AGENT.into()
}

/// Which flavour of OpenAI-compatible API the endpoint speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// OpenRouter (bearer auth, `/chat/completions`).
    OpenRouter,
    /// OpenAI (bearer auth, `/chat/completions`).
    OpenAi,
    /// Azure OpenAI (`api-key` header, deployment path, `api-version` query).
    Azure,
}

/// `[llm]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API flavour.
    #[serde(default = "default_provider")]
    pub provider: LlmProvider,

    /// API base URL (for Azure, the resource endpoint).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model ID, or deployment name for Azure.
    #[serde(default = "default_model")]
    pub model: String,

    /// Azure `api-version` query parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            model: default_model(),
            api_version: None,
            timeout_secs: default_llm_timeout(),
        }
    }
}

fn default_provider() -> LlmProvider {
    LlmProvider::OpenRouter
}
fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".into()
}
fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".into()
}
fn default_model() -> String {
    "openai/gpt-4o-mini".into()
}
fn default_llm_timeout() -> u64 {
    60
}

impl LlmConfig {
    /// Read the API key from the configured env var.
    pub fn api_key(&self) -> Result<String> {
        let var_name = &self.api_key_env;
        match std::env::var(var_name) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Err(AcctIntelError::config(format!(
                "LLM API key not found. Set the {var_name} environment variable \
                 (a .env file in the working directory is also read)."
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Report config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime report-generation configuration.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Page fetch timeout in seconds.
    pub fetch_timeout_secs: u64,
    /// Maximum characters of page text kept per source.
    pub max_content_length: usize,
    /// User-Agent header for page fetches.
    pub user_agent: String,
    /// LLM endpoint settings.
    pub llm: LlmConfig,
}

impl From<&AppConfig> for ReportConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            fetch_timeout_secs: config.fetch.timeout_secs,
            max_content_length: config.fetch.max_content_length,
            user_agent: config.fetch.user_agent.clone(),
            llm: config.llm.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.acctintel/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| AcctIntelError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.acctintel/acctintel.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AcctIntelError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| AcctIntelError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| AcctIntelError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| AcctIntelError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| AcctIntelError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that the LLM API key env var is set and non-empty.
pub fn validate_api_key(config: &AppConfig) -> Result<()> {
    config.llm.api_key().map(|_| ())
}
