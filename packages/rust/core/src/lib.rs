//! Core report logic for acctintel.
//!
//! This crate ties together page fetching, link discovery, LLM relevance
//! scoring and source aggregation into the end-to-end `generate_report`
//! workflow.

pub mod aggregator;
pub mod llm;
pub mod pipeline;
pub mod scorer;

pub use aggregator::{RenderedReport, ReportSource};
pub use llm::{CompletionRequest, LlmClient, OpenAiCompatClient};
pub use pipeline::{ProgressReporter, ReportOutcome, SilentProgress, generate_report, run_report};
