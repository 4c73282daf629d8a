mod commands;
mod output;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use intrinio_lib::{validation, Config, Session};
use tracing_subscriber::EnvFilter;

use crate::commands::{DownloadArgs, TickerArgs};
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "intrinio")]
#[command(about = "Download security prices and adjustments from the Intrinio API")]
struct Cli {
    /// Output format: table, json, csv, or markdown
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// TOML config file. Without it, settings come from INTRINIO_* variables
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Fail any ticker whose history spans more than this many pages
    #[arg(long, global = true)]
    max_pages: Option<usize>,

    /// Maximum number of tickers fetched at once
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Raw daily prices for each ticker, combined into one table
    Prices(DownloadArgs),
    /// Split and dividend adjustments for each ticker, combined into one table
    Adjustments(DownloadArgs),
    /// Adjusted OHLCV indexed by date and ticker
    Adjusted(TickerArgs),
    /// One adjusted table per ticker
    Distinct(TickerArgs),
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::from_env()?,
    };
    if let Some(max_pages) = cli.max_pages {
        if max_pages == 0 {
            bail!("--max-pages must be at least 1");
        }
        config.max_pages = Some(max_pages);
    }
    if let Some(concurrency) = cli.concurrency {
        config.concurrency = Some(validation::validate_concurrency(concurrency)?);
    }
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("intrinio_lib=info".parse()?)
                .add_directive("intrinio_api=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::parse(&cli.output);

    let config = load_config(&cli)?;
    let session = Session::new(&config)?;

    match &cli.command {
        Commands::Prices(args) => commands::prices::run(args, &session, &format).await?,
        Commands::Adjustments(args) => commands::adjustments::run(args, &session, &format).await?,
        Commands::Adjusted(args) => commands::adjusted::run(args, &session, &format).await?,
        Commands::Distinct(args) => commands::distinct::run(args, &session, &format).await?,
    }

    Ok(())
}
