//! CLI command definitions, routing, and tracing setup.

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use acctintel_core::pipeline::{ProgressReporter, ReportOutcome, generate_report};
use acctintel_shared::{
    AppConfig, CompanyInfo, ReportConfig, init_config, load_config, validate_api_key,
};

use crate::display;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// acctintel: account intelligence from a company's own web pages.
#[derive(Parser)]
#[command(
    name = "acctintel",
    version,
    about = "Score company web pages against your research needs and build an insights table.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// How the report is printed.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// Aligned columns with clickable sources.
    #[default]
    Table,
    /// Markdown table with `[name](url)` sources.
    Markdown,
    /// The full outcome as JSON.
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Research a company and print the insights table.
    Report {
        /// Company name.
        #[arg(long)]
        company: String,

        /// Country the company operates in.
        #[arg(long, default_value = "")]
        country: String,

        /// Research topic (e.g. "Funding", "Leadership changes").
        #[arg(long, default_value = "")]
        topic: String,

        /// Search queries, folded into the relevance requirements.
        #[arg(long, default_value = "")]
        queries: String,

        /// Comma-separated URLs to research; `https://` is assumed if missing.
        #[arg(long, default_value = "")]
        urls: String,

        /// Free-text intelligence requirements.
        #[arg(long, default_value = "")]
        prompt: String,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Maximum number of discovered links to list.
        #[arg(long, default_value_t = 10)]
        max_links: usize,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "acctintel=info",
        1 => "acctintel=debug",
        _ => "acctintel=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Report {
            company,
            country,
            topic,
            queries,
            urls,
            prompt,
            format,
            max_links,
        } => {
            let info = CompanyInfo {
                company,
                country,
                research_topic: topic,
                search_queries: queries,
                support_urls: urls,
                prompt,
            };
            cmd_report(&info, format, max_links).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_report(company: &CompanyInfo, format: OutputFormat, max_links: usize) -> Result<()> {
    // Validate API key before doing anything
    let config = load_config()?;
    validate_api_key(&config)?;
    let report_config = ReportConfig::from(&config);

    info!(
        company = %company.company,
        urls = company.support_url_list().len(),
        "generating report"
    );

    let reporter = CliProgress::new();
    let outcome = generate_report(&report_config, company, &reporter).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Markdown => {
            println!("{}", display::markdown_report(&outcome.report.markdown));
        }
        OutputFormat::Table => print_summary(&outcome, max_links),
    }

    Ok(())
}

fn print_summary(outcome: &ReportOutcome, max_links: usize) {
    println!();
    for scrape in &outcome.scrapes {
        println!("  {} [{}]", scrape.url, scrape.status);
    }

    if !outcome.discovered_links.is_empty() {
        println!();
        println!("  Discovered links:");
        for line in display::link_lines(&outcome.discovered_links, max_links) {
            println!("    {line}");
        }
    }

    println!();
    println!("{}", display::terminal_report(&outcome.report.markdown));
    println!();
    println!(
        "  Rendered by: {:?}   Session: {}   Time: {:.1}s",
        outcome.report.source,
        outcome.report.session_id,
        outcome.elapsed.as_secs_f64()
    );
    println!();
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn page_fetched(&self, url: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Fetched [{current}/{total}] {url}"));
    }

    fn done(&self, _outcome: &ReportOutcome) {
        self.spinner.finish_and_clear();
    }
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
