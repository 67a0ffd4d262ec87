//! dcf - Command Line Operations for Real-Estate DCF Analysis
//!
//! # Commands
//!
//! - `dcf analyse --property <file>` - Analyse a property under one scenario
//! - `dcf simulate --property <file>` - Monte Carlo batch over market scenarios
//! - `dcf check` - Validate configuration and inputs
//!
//! Settings come from `dcf.toml` (or `--config`), overridden by `DCF_*`
//! environment variables.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;
mod input;
mod output;

pub use error::{CliError, Result};

use commands::simulate::SimulateOptions;
use config::LogLevel;
use output::OutputFormat;

const DEFAULT_CONFIG: &str = "dcf.toml";

/// Real-estate discounted cash flow analysis
#[derive(Parser)]
#[command(name = "dcf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path [default: dcf.toml]
    #[arg(short, long, global = true, env = "DCF_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse a property under a single market scenario
    Analyse {
        /// Property description (TOML or JSON)
        #[arg(short, long)]
        property: PathBuf,

        /// Market scenario (TOML or JSON); defaults to the market mean
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Run a Monte Carlo batch of market scenarios
    Simulate {
        /// Property description (TOML or JSON)
        #[arg(short, long)]
        property: PathBuf,

        /// Number of scenarios [default: from configuration]
        #[arg(short = 'n', long)]
        scenarios: Option<usize>,

        /// Base seed [default: from configuration]
        #[arg(long)]
        seed: Option<u64>,

        /// Worker threads [default: all cores]
        #[arg(short, long)]
        threads: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Include per-scenario results in JSON output
        #[arg(long)]
        full: bool,
    },

    /// Check configuration and, optionally, a property file
    Check {
        /// Property description to validate
        #[arg(short, long)]
        property: Option<PathBuf>,
    },
}

fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_filter_str()));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config_path, explicit) = match cli.config {
        Some(path) => (path, true),
        None => (PathBuf::from(DEFAULT_CONFIG), false),
    };
    let config = config::build_config(&config_path, explicit)
        .with_context(|| format!("loading configuration from {}", config_path.display()))?;

    init_tracing(if cli.verbose {
        LogLevel::Debug
    } else {
        config.log_level
    });
    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match cli.command {
        Commands::Analyse {
            property,
            scenario,
            format,
        } => commands::analyse::run(&config, &property, scenario.as_deref(), format)
            .context("analyse failed"),
        Commands::Simulate {
            property,
            scenarios,
            seed,
            threads,
            format,
            full,
        } => commands::simulate::run(
            &config,
            &property,
            SimulateOptions {
                scenarios,
                seed,
                threads,
                full,
            },
            format,
        )
        .context("simulate failed"),
        Commands::Check { property } => {
            commands::check::run(&config, property.as_deref()).context("check failed")
        }
    }
}
