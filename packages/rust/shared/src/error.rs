//! Error types for acctintel.
//!
//! Library crates return [`AcctIntelError`]. Only setup problems ever reach
//! the CLI: a failed fetch becomes a [`FetchStatus`](crate::FetchStatus) on its
//! `ScrapeResult`, and LLM or parse failures are absorbed by the scorer and
//! aggregator fallbacks. The CLI wraps what remains with `color-eyre`.

use std::path::PathBuf;

/// Why a single page could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchFailure {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("unsupported scheme '{0}'")]
    UnsupportedScheme(String),

    /// Connection refused, DNS, TLS, timeout, redirect loop.
    #[error("{0}")]
    Transport(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("body read failed: {0}")]
    Body(String),
}

/// Top-level error type for all acctintel operations.
#[derive(Debug, thiserror::Error)]
pub enum AcctIntelError {
    /// Missing API key, unreadable config file, unbuildable HTTP client.
    #[error("config error: {message}")]
    Config { message: String },

    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: FetchFailure },

    /// The chat-completions call failed or returned nothing usable.
    #[error("llm request failed: {0}")]
    Llm(String),

    /// Model output or a report table could not be read.
    #[error("could not parse {what}: {message}")]
    Parse { what: &'static str, message: String },

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, AcctIntelError>;

impl AcctIntelError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn fetch(url: impl Into<String>, reason: FetchFailure) -> Self {
        Self::Fetch {
            url: url.into(),
            reason,
        }
    }

    /// `what` names the artifact, e.g. `"relevance judgment"` or `"markdown table"`.
    pub fn parse(what: &'static str, msg: impl Into<String>) -> Self {
        Self::Parse {
            what,
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The fetch failure behind this error, if it came from the fetcher.
    pub fn fetch_failure(&self) -> Option<&FetchFailure> {
        match self {
            Self::Fetch { reason, .. } => Some(reason),
            _ => None,
        }
    }
}
