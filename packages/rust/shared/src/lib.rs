//! Shared types, error model, and configuration for acctintel.
//!
//! This crate is the foundation depended on by all other acctintel crates.
//! It provides:
//! - [`AcctIntelError`]: the unified error type
//! - Domain types ([`ScrapeResult`], [`DiscoveredLink`], [`RelevanceJudgment`], [`InsightType`])
//! - Configuration ([`AppConfig`], [`ReportConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, FetchConfig, LlmConfig, LlmProvider, ReportConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, validate_api_key,
};
pub use error::{AcctIntelError, FetchFailure, Result};
pub use types::{
    CompanyInfo, DiscoveredLink, FetchStatus, InsightType, LinkCategory, Recommendation,
    RelevanceJudgment, ResearchResult, ScrapeResult, SessionId,
};
