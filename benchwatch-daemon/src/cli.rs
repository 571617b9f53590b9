//! CLI argument definitions for the benchwatch daemon.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use benchwatch_core::config::BenchwatchConfig;

/// Security benchmark compliance exporter.
///
/// Watches a directory of scan results and exposes the latest compliance
/// posture as Prometheus gauges. The `report` subcommand renders a
/// one-off Markdown/JSON report instead.
#[derive(Parser, Debug)]
#[command(name = "benchwatch")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to benchwatch.toml configuration file.
    ///
    /// When omitted, built-in defaults plus environment variables are used.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Validate configuration and exit without starting the exporter.
    #[arg(long)]
    pub validate: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Generate a compliance report from a single scan result file.
    Report {
        /// Scan result JSON file.
        input: PathBuf,

        /// Directory for compliance_report.md and compliance_summary.json.
        #[arg(short, long, default_value = "reports")]
        output_dir: PathBuf,
    },
}

impl DaemonCli {
    /// Load configuration with CLI overrides applied.
    ///
    /// Precedence: CLI flags > environment variables > config file > defaults.
    pub async fn resolve_config(&self) -> Result<BenchwatchConfig> {
        let mut config = match &self.config {
            Some(path) => BenchwatchConfig::load(path)
                .await
                .map_err(|e| anyhow::anyhow!("failed to load config {}: {}", path.display(), e))?,
            None => BenchwatchConfig::from_env()
                .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?,
        };

        if let Some(level) = &self.log_level {
            config.general.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.general.log_format = format.clone();
        }

        config
            .validate()
            .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;
        Ok(config)
    }
}
