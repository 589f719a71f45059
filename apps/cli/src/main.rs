//! acctintel CLI: account intelligence research tool.
//!
//! Fetches a company's pages, scores them against free-text requirements
//! with an LLM, and prints an insight-type → source → reason table.

mod commands;
mod display;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
