//! hubstats - track model popularity on the Hub
//!
//! Polls the Hub listing API for likes and downloads, upserts daily
//! snapshots into CSV, computes day-over-day deltas, and renders the
//! latest numbers into a README section.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "hubstats")]
#[command(about = "Track model likes and downloads from the Hub")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file path (default: ./hubstats.toml or ~/.config/hubstats/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Maximum attempts per request
    #[arg(long, global = true)]
    max_retries: Option<u32>,

    /// Backoff unit in seconds (wait = unit * attempt)
    #[arg(long, global = true)]
    backoff_secs: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Snapshot every model carrying a tag (default: compressed-tensors)
    Tensors(cmd::tensors::TensorsArgs),
    /// Snapshot every model published by one author
    Author(cmd::author::AuthorArgs),
    /// Compute day-over-day deltas for a stats file
    Delta(cmd::delta::DeltaArgs),
    /// Render a stats file into the README "Latest Stats" section
    Readme(cmd::readme::ReadmeArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let progress = hubstats_core::ProgressContext::new();
    let multi = progress.is_tty().then(|| progress.multi());
    hubstats_core::init_logging(
        hubstats_core::Verbosity::from_flags(cli.quiet, cli.debug),
        multi,
    );

    let mut config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    // CLI overrides config file
    if let Some(n) = cli.max_retries {
        config.http.max_retries = n;
    }
    if let Some(secs) = cli.backoff_secs {
        config.http.backoff_secs = secs;
    }

    match cli.command {
        Command::Tensors(args) => cmd::tensors::run(args, &config, &progress),
        Command::Author(args) => cmd::author::run(args, &config, &progress),
        Command::Delta(args) => cmd::delta::run(args),
        Command::Readme(args) => cmd::readme::run(args),
        Command::Config => {
            cmd::print_summary(
                "Setting",
                &[
                    ("Hub base URL", config.hub.base_url.clone()),
                    ("Tag", config.hub.tag.clone()),
                    ("Page size", config.hub.page_size.to_string()),
                    ("Max pages", config.hub.max_pages.to_string()),
                    ("Max attempts", config.http.max_retries.to_string()),
                    ("Backoff unit", format!("{}s", config.http.backoff_secs)),
                    (
                        "Timeouts",
                        format!(
                            "connect {}s, request {}s",
                            config.http.connect_timeout_secs, config.http.timeout_secs
                        ),
                    ),
                    ("User agent", config.http.settings().user_agent),
                ],
            );
            Ok(())
        }
    }
}
