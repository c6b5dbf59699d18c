//! Pod metrics source CLI
//!
//! A command-line driver for the Prometheus pod-metrics source: runs
//! timeseries queries against a PromQL endpoint and prints the merged
//! table or its schema.

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use source_lib::{PrometheusSource, SourceConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Pod metrics source CLI
#[derive(Parser)]
#[command(name = "pms")]
#[command(author, version, about = "CLI for the Prometheus pod-metrics source", long_about = None)]
pub struct Cli {
    /// PromQL API base URL (can also be set via PMS_PROMQL_API env var)
    #[arg(long, env = "PMS_PROMQL_API")]
    pub api_url: Option<String>,

    /// Path to a configuration file
    #[arg(long, env = "PMS_CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Override the query period (e.g. 3h, 1d, 2w)
    #[arg(long)]
    pub period: Option<String>,

    /// Override the query_range step
    #[arg(long)]
    pub step: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Query a table and print the merged timeseries
    Get {
        /// Table name
        #[arg(default_value = "timeseries")]
        table: String,

        /// Restrict the query to these pod ids (repeatable)
        #[arg(long = "id", value_name = "POD_ID")]
        ids: Vec<String>,
    },

    /// Print the declared schema of a table
    Schema {
        /// Table name (prints every table if omitted)
        table: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load_config(&cli)?;
    let source = PrometheusSource::new(config)?;

    match &cli.command {
        Commands::Get { table, ids } => {
            commands::get::run(&source, table, ids, cli.format).await?;
        }
        Commands::Schema { table } => {
            commands::schema::run(&source, table.as_deref(), cli.format)?;
        }
    }

    Ok(())
}

/// Load configuration, applying command-line overrides on top.
fn load_config(cli: &Cli) -> Result<SourceConfig> {
    let mut config = match &cli.config {
        Some(path) => SourceConfig::from_file(path)?,
        None => SourceConfig::load()?,
    };
    if let Some(api_url) = &cli.api_url {
        config.promql_api = api_url.clone();
    }
    if let Some(period) = &cli.period {
        config.period = period.clone();
    }
    if let Some(step) = &cli.step {
        config.step = step.clone();
    }
    Ok(config)
}
