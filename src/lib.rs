#![allow(clippy::collapsible_if)]
#![allow(clippy::type_complexity)]

// Core modules
pub mod analysis;
pub mod api;
pub mod config;
pub mod data;
pub mod domain;
pub mod models;
pub mod pipeline;
pub mod utils;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

// Re-export commonly used types
pub use analysis::{AnalysisReport, RunStatus, run_full_analysis};
pub use config::AnalysisConfig;
pub use data::{SpreadsheetSource, WorkbookSource, save_report};
pub use domain::{Grade, InstrumentTable, Outlook, SheetResult};
pub use pipeline::{SkipReason, SkippedSheet, Stage};

// CLI argument parsing
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding the configured workbooks
    #[arg(long, default_value = "./data")]
    pub data_dir: PathBuf,

    /// Directory the result files are written to
    #[arg(long, default_value = "./outputs")]
    pub output_dir: PathBuf,

    /// TOML file overriding the built-in configurations and pipeline settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    pub debug: bool,
}

/// Built-in configuration, or the TOML file when one is given.
pub fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => AnalysisConfig::from_file(path),
        None => {
            let config = AnalysisConfig::default();
            config.validate().context("Built-in configuration is invalid")?;
            Ok(config)
        }
    }
}

/// How many results per configuration the CLI echoes to the log.
const TOP_RESULTS_LOGGED: usize = 5;

/// CLI entry point: analyze, write the outputs, log the leaders.
///
/// A missing data directory or an empty report is logged and ends the run
/// without writing anything.
pub fn run_cli(args: &Cli) -> Result<Option<AnalysisReport>> {
    if !args.data_dir.is_dir() {
        log::error!("❌ Data directory not found: {}", args.data_dir.display());
        return Ok(None);
    }
    let config = load_config(args.config.as_deref())?;

    log::info!(
        "🚀 Running {} configurations from {}",
        config.configurations.len(),
        args.data_dir.display()
    );
    let report = run_full_analysis(&args.data_dir, &config);

    match report.status() {
        RunStatus::Empty => {
            log::error!("❌ Analysis produced no results");
            return Ok(None);
        }
        RunStatus::Partial => log::warn!(
            "⚠️ Analysis finished with {} skipped sheets",
            report.total_skipped()
        ),
        RunStatus::Complete => log::info!("✅ Analysis complete"),
    }

    let written = save_report(&report, &args.output_dir)?;
    for path in &written {
        log::info!("💾 Wrote {}", path.display());
    }

    for (name, results) in report.results_map() {
        log::info!("🏆 Top results for {}:", name);
        for result in results.iter().take(TOP_RESULTS_LOGGED) {
            log::info!(
                "    #{} {:<12} final value {:>6} grade {} {}",
                result.rank.unwrap_or_default(),
                result.sheet_name,
                result.final_value,
                result.grade.map(|g| g.to_string()).unwrap_or_default(),
                result.outlook
            );
        }
    }

    Ok(Some(report))
}
