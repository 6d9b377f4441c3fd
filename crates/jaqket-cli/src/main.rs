//! jaqket - CLI for the JAQKET Japanese quiz QA dataset
//!
//! Lists the built-in configs, shows dataset metadata, and downloads and
//! generates the train/validation splits of v1.0 and v2.0.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "jaqket")]
#[command(about = "JAQKET Japanese quiz QA dataset loader")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./jaqket.toml or ~/.config/jaqket/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Download cache directory
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Read timeout in seconds for stall detection
    #[arg(long, global = true)]
    read_timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// List the built-in configs
    Configs,
    /// Show metadata and schema of a config
    Info(cmd::info::InfoArgs),
    /// Download and generate every split of a config
    Load(cmd::load::LoadArgs),
    /// Print the first records of a split as JSON
    Preview(cmd::preview::PreviewArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = Arc::new(jaqket_core::ProgressContext::new());

    // Logging:
    //   TTY:     quiet (warn) unless --debug, progress bars show activity
    //   non-TTY: info unless --debug, logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = if is_tty { !cli.debug } else { false };
    jaqket_core::init_logging(quiet, cli.debug, multi);

    let mut config = if let Some(path) = &cli.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };

    // CLI flags override the config file
    if let Some(dir) = cli.cache_dir {
        config.cache.dir = dir;
    }
    if let Some(secs) = cli.read_timeout {
        config.http.read_timeout = secs;
    }
    jaqket_core::set_http_config(jaqket_core::HttpConfig {
        read_timeout: Duration::from_secs(config.http.read_timeout),
        connect_timeout: Duration::from_secs(config.http.connect_timeout),
    });

    match cli.command {
        Command::Configs => cmd::info::list_configs(),
        Command::Info(args) => cmd::info::run(args),
        Command::Load(args) => cmd::load::run(args, &config, &progress),
        Command::Preview(args) => cmd::preview::run(args, &config, &progress),
        Command::Config => {
            cmd::print_table(
                ("Setting", "Value"),
                &[
                    ("Cache directory", config.cache.dir.display().to_string()),
                    ("Read timeout", format!("{}s", config.http.read_timeout)),
                    ("Connect timeout", format!("{}s", config.http.connect_timeout)),
                    (
                        "num_contexts",
                        config
                            .dataset
                            .num_contexts
                            .map_or_else(|| "version default".to_string(), |n| n.to_string()),
                    ),
                ],
            );
            Ok(())
        }
    }
}
