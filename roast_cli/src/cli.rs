//! CLI argument definitions and shared statics.

use clap::{ArgAction, ArgGroup, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "roastcurve", version, about = "Roast curve analysis")]
pub struct Cli {
    /// Path to analysis config TOML; built-in defaults when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print reports and errors as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze one roast profile or raw telemetry CSV
    #[command(group(ArgGroup::new("input").required(true).args(["profile", "csv"])))]
    Analyze {
        /// Roast profile JSON
        #[arg(long, value_name = "FILE")]
        profile: Option<PathBuf>,
        /// Raw telemetry CSV with header 'time,et,bt' (Celsius)
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,
        /// Stored roast record JSON used as the lowest-precedence source
        #[arg(long, value_name = "FILE")]
        record: Option<PathBuf>,
        /// Keep every Nth display point (overrides display.step / max_points)
        #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
        step: Option<u64>,
    },
    /// Check a roast against the configured goals using a reference roast
    Check {
        /// Roast profile JSON to check
        #[arg(long, value_name = "FILE")]
        profile: PathBuf,
        /// Stored roast record JSON for the checked roast
        #[arg(long, value_name = "FILE")]
        record: Option<PathBuf>,
        /// Reference roast profile JSON
        #[arg(long, value_name = "FILE")]
        reference: PathBuf,
    },
    /// Analyze many profiles and write one CSV row of metrics per roast
    Export {
        /// Output CSV path
        #[arg(long, value_name = "FILE")]
        out: PathBuf,
        /// Roast profile JSON files
        #[arg(required = true, value_name = "PROFILES")]
        profiles: Vec<PathBuf>,
    },
    /// Quick health check: config validity and a synthetic roast
    SelfCheck,
}
