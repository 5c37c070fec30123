use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use pubmed_fetcher::config::{find_config_file, load_config, load_env_config, to_toml, Config};
use pubmed_fetcher::report::{print_rows, write_csv, ConsoleFormat, ReportOutcome};
use pubmed_fetcher::{LiteratureFetcher, PubMedSource};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Fetch research papers from PubMed and list authors affiliated with
/// pharmaceutical or biotech companies
#[derive(Parser, Debug)]
#[command(name = "get-papers-list")]
#[command(version = pubmed_fetcher::VERSION)]
#[command(about = "Fetch research papers from PubMed", long_about = None)]
struct Cli {
    /// PubMed search query (full PubMed query syntax is supported)
    #[arg(required_unless_present = "print_config")]
    query: Option<String>,

    /// Save results to this CSV file instead of printing them
    #[arg(long, short)]
    file: Option<PathBuf>,

    /// Print progress and diagnostic information
    #[arg(long, short)]
    debug: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress everything except errors on stderr
    #[arg(long, short)]
    quiet: bool,

    /// Console output format
    #[arg(long, short, value_enum, default_value_t = OutputFormat::Plain)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum number of papers to look at
    #[arg(long)]
    max_results: Option<usize>,

    /// Affiliation keyword (repeatable); replaces the configured list
    #[arg(long = "keyword", value_name = "KEYWORD")]
    keywords: Vec<String>,

    /// Number of detail requests kept in flight
    #[arg(long)]
    concurrency: Option<usize>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

/// Output format for console results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// One line per paper
    Plain,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
}

impl From<OutputFormat> for ConsoleFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Plain => ConsoleFormat::Plain,
            OutputFormat::Table => ConsoleFormat::Table,
            OutputFormat::Json => ConsoleFormat::Json,
        }
    }
}

impl Cli {
    fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match (self.debug, self.verbose) {
            (_, v) if v >= 2 => "trace",
            (true, _) | (_, 1) => "debug",
            _ => "warn",
        }
    }

    /// Apply command-line overrides on top of file/env configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(max_results) = self.max_results {
            config.search.max_results = max_results;
        }
        if !self.keywords.is_empty() {
            config.classifier.keywords = self.keywords.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.fetch.concurrency = concurrency;
        }
    }
}

fn init_tracing(level: &str) {
    // Logs go to stderr so stdout only carries the report.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("pubmed_fetcher={}", level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        load_config(config_path)
            .with_context(|| format!("Failed to load config {}", config_path.display()))?
    } else if let Some(config_path) = find_config_file() {
        tracing::info!("Using config file: {}", config_path.display());
        load_config(&config_path)
            .with_context(|| format!("Failed to load config {}", config_path.display()))?
    } else {
        load_env_config().context("Failed to read configuration from environment")?
    };

    cli.apply_overrides(&mut config);
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_level());

    let config = resolve_config(&cli)?;

    if cli.print_config {
        print!("{}", to_toml(&config)?);
        return Ok(());
    }

    let query = cli.query.clone().unwrap_or_default();

    let source = PubMedSource::from_config(&config)?;
    let fetcher = LiteratureFetcher::from_config(Arc::new(source), &config);

    let papers = fetcher.fetch_papers(&query).await?;

    let mut stdout = std::io::stdout();

    match &cli.file {
        Some(path) => match write_csv(path, &papers) {
            Ok(ReportOutcome::Written { path, rows }) => {
                tracing::info!("Results saved to {} ({} papers)", path.display(), rows);
            }
            Ok(ReportOutcome::NoResults) => {
                print_rows(&mut stdout, &papers, cli.output.into())?;
            }
            Err(e) => {
                tracing::error!(
                    "Could not save {} papers to {}: {}",
                    papers.len(),
                    path.display(),
                    e
                );
                // Fetched rows are still shown so the run's work is not lost.
                print_rows(&mut stdout, &papers, cli.output.into())?;
                return Err(e).with_context(|| format!("Failed to write {}", path.display()));
            }
        },
        None => print_rows(&mut stdout, &papers, cli.output.into())?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_config_renders_overrides() {
        let cli = Cli::parse_from([
            "get-papers-list",
            "--print-config",
            "--max-results",
            "7",
            "--keyword",
            "Roche",
        ]);
        assert!(cli.print_config);
        assert!(cli.query.is_none());

        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        let rendered = to_toml(&config).unwrap();

        assert!(rendered.contains("max_results = 7"));
        assert!(rendered.contains("\"Roche\""));
        assert!(rendered.contains("delay_ms = 5000"));
    }

    #[test]
    fn test_version_flag_reports_library_version() {
        use clap::CommandFactory;
        assert_eq!(Cli::command().get_version(), Some(pubmed_fetcher::VERSION));
    }

    #[test]
    fn test_cli_query_and_defaults() {
        let cli = Cli::parse_from(["get-papers-list", "cancer immunotherapy"]);
        assert_eq!(cli.query.as_deref(), Some("cancer immunotherapy"));
        assert!(cli.file.is_none());
        assert!(!cli.debug);
        assert_eq!(cli.output, OutputFormat::Plain);
        assert_eq!(cli.log_level(), "warn");
    }

    #[test]
    fn test_cli_requires_query() {
        assert!(Cli::try_parse_from(["get-papers-list"]).is_err());
        assert!(Cli::try_parse_from(["get-papers-list", "--print-config"]).is_ok());
    }

    #[test]
    fn test_cli_file_and_debug_flags() {
        let cli = Cli::parse_from(["get-papers-list", "covid", "-f", "out.csv", "-d"]);
        assert_eq!(cli.file, Some(PathBuf::from("out.csv")));
        assert!(cli.debug);
        assert_eq!(cli.log_level(), "debug");

        let cli = Cli::parse_from(["get-papers-list", "covid", "--file", "x.csv", "--debug"]);
        assert_eq!(cli.file, Some(PathBuf::from("x.csv")));
        assert!(cli.debug);
    }

    #[test]
    fn test_cli_log_levels() {
        let cli = Cli::parse_from(["get-papers-list", "q", "-vv"]);
        assert_eq!(cli.log_level(), "trace");

        let cli = Cli::parse_from(["get-papers-list", "q", "-v"]);
        assert_eq!(cli.log_level(), "debug");

        let cli = Cli::parse_from(["get-papers-list", "q", "-d", "-q"]);
        assert_eq!(cli.log_level(), "error");
    }

    #[test]
    fn test_cli_output_format() {
        let cli = Cli::parse_from(["get-papers-list", "q", "-o", "json"]);
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(ConsoleFormat::from(cli.output), ConsoleFormat::Json);

        let cli = Cli::parse_from(["get-papers-list", "q", "--output", "table"]);
        assert_eq!(cli.output, OutputFormat::Table);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "get-papers-list",
            "q",
            "--max-results",
            "50",
            "--keyword",
            "Genentech",
            "--keyword",
            "roche",
            "--concurrency",
            "4",
        ]);
        let mut config = Config::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.search.max_results, 50);
        assert_eq!(config.classifier.keywords, vec!["Genentech", "roche"]);
        assert_eq!(config.fetch.concurrency, 4);
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let cli = Cli::parse_from(["get-papers-list", "q"]);
        let mut config = Config::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config, Config::default());
    }
}
