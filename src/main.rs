mod repl;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use insights_analytics::{Insights, ReportGenerator};
use insights_core::config::AppConfig;
use insights_core::filters::{DateRange, FilterCriteria, NumericRange};
use insights_core::source::{ConversationSource, FileSource, HttpSource};
use insights_core::store::{ConversationStore, LoadOutcome};
use insights_core::types::{CallStatus, CallType};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "call-insights",
    about = "Filter and summarize recorded voice-agent conversations",
    version,
    author
)]
struct Cli {
    /// Path to config file (default: ~/.config/call-insights/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the conversations endpoint URL
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Read conversations from a local JSON file instead of the endpoint
    #[arg(long, global = true, conflicts_with = "endpoint")]
    file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive filter shell (default)
    Shell,

    /// Load once and print the dashboard report
    Report {
        #[command(flatten)]
        filters: FilterArgs,

        /// Print the JSON snapshot instead of markdown
        #[arg(long)]
        json: bool,
    },

    /// Serve conversations and insights over HTTP
    Serve {
        /// Bind host
        #[arg(long)]
        host: Option<String>,
        /// Bind port
        #[arg(long)]
        port: Option<u16>,
        /// JSON file backing /api/conversations
        #[arg(long)]
        data: Option<PathBuf>,
    },

    /// Show or manage configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Initialize default configuration file
    Init,
    /// Print config file path
    Path,
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    #[arg(long)]
    agent: Option<String>,
    #[arg(long)]
    call_type: Option<CallType>,
    #[arg(long)]
    status: Option<CallStatus>,
    /// Inclusive lower bound on start time
    #[arg(long)]
    start: Option<i64>,
    /// Inclusive upper bound on start time
    #[arg(long)]
    end: Option<i64>,
    #[arg(long)]
    min_duration: Option<f64>,
    #[arg(long)]
    max_duration: Option<f64>,
    #[arg(long)]
    min_cost: Option<f64>,
    #[arg(long)]
    max_cost: Option<f64>,
}

impl FilterArgs {
    fn into_criteria(self) -> FilterCriteria {
        FilterCriteria {
            date_range: DateRange::new(self.start, self.end),
            agent: self.agent.filter(|a| !a.is_empty()),
            call_type: self.call_type,
            status: self.status,
            duration_range: NumericRange::new(self.min_duration, self.max_duration),
            cost_range: NumericRange::new(self.min_cost, self.max_cost),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up tracing.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "call_insights=info,insights_core=info,warn".into()),
        )
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Load config.
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    // Apply CLI overrides.
    if let Some(endpoint) = &cli.endpoint {
        config.source.endpoint = endpoint.clone();
    }

    match cli.command {
        Some(Commands::Serve { host, port, data }) => {
            if let Some(h) = host {
                config.server.host = h;
            }
            if let Some(p) = port {
                config.server.port = p;
            }
            let Some(data) = data.or_else(|| config.server.data_file.clone()) else {
                bail!("No data file: pass --data or set server.data_file in the config");
            };
            insights_server::serve(config, Arc::new(FileSource::new(data))).await?;
        }
        Some(Commands::Report { filters, json }) => {
            let source = build_source(cli.file, &config)?;
            run_report(source.as_ref(), filters.into_criteria(), json).await?;
        }
        Some(Commands::Config { action }) => {
            handle_config_command(action, &config)?;
        }
        Some(Commands::Shell) | None => {
            let source = build_source(cli.file, &config)?;
            repl::run(source).await?;
        }
    }

    Ok(())
}

fn build_source(file: Option<PathBuf>, config: &AppConfig) -> Result<Box<dyn ConversationSource>> {
    Ok(match file {
        Some(path) => Box::new(FileSource::new(path)),
        None => Box::new(HttpSource::new(&config.source)?),
    })
}

async fn run_report(source: &dyn ConversationSource, criteria: FilterCriteria, json: bool) -> Result<()> {
    let mut store = ConversationStore::new();
    if let LoadOutcome::Failed = store.load(source).await {
        bail!("Failed to load conversations from {}", source.describe());
    }
    store.set_filters(criteria);

    let insights = Insights::from_store(&store);
    if json {
        println!("{}", serde_json::to_string_pretty(&insights.snapshot())?);
    } else {
        println!("{}", ReportGenerator::dashboard_report(&insights));
    }
    Ok(())
}

fn handle_config_command(action: Option<ConfigAction>, config: &AppConfig) -> Result<()> {
    match action {
        Some(ConfigAction::Show) | None => {
            let toml_str = toml::to_string_pretty(config)?;
            println!("{}", toml_str);
        }
        Some(ConfigAction::Init) => {
            let path = AppConfig::default_path();
            if path.exists() {
                println!("Config already exists at: {}", path.display());
            } else {
                config.save()?;
                println!("Created default config at: {}", path.display());
            }
        }
        Some(ConfigAction::Path) => {
            println!("{}", AppConfig::default_path().display());
        }
    }
    Ok(())
}
