mod cli;
mod commands;
mod error_fmt;
mod files;
mod render;

use clap::Parser;
use cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use eyre::Result;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn init_tracing(json: bool, level: &str, logging: &roast_config::Logging) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Console logs always go to stderr so stdout stays machine-readable
    let console = if json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).boxed()
    };

    let file_layer = logging.file.as_deref().map(|path| {
        let path = std::path::Path::new(path);
        let dir = path
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
            .unwrap_or_else(|| std::path::Path::new("."));
        let name = path.file_name().map_or_else(|| "roastcurve.log".into(), |n| n.to_os_string());
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        let file_filter = EnvFilter::new(logging.level.as_deref().unwrap_or("info"));
        fmt::layer()
            .json()
            .with_writer(writer)
            .with_filter(file_filter)
    });

    let _ = tracing_subscriber::registry()
        .with(console.with_filter(filter))
        .with(file_layer)
        .try_init();
}

fn run(cli: Cli) -> Result<i32> {
    let cfg = files::read_config(cli.config.as_deref())?;
    init_tracing(cli.json, &cli.log_level, &cfg.logging);

    match cli.cmd {
        Commands::Analyze {
            profile,
            csv,
            record,
            step,
        } => commands::run_analyze(&cfg, profile.as_deref(), csv.as_deref(), record, step, cli.json),
        Commands::Check {
            profile,
            record,
            reference,
        } => commands::run_check(&cfg, &profile, record, &reference, cli.json),
        Commands::Export { out, profiles } => commands::run_export(&cfg, &out, &profiles),
        Commands::SelfCheck => commands::run_self_check(&cfg),
    }
}

fn main() {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            if JSON_MODE.get().copied().unwrap_or(false) {
                eprintln!("{}", error_fmt::format_error_json(&e));
            } else {
                eprintln!("{}", error_fmt::humanize(&e));
            }
            error_fmt::exit_code_for_error(&e)
        }
    };
    std::process::exit(code);
}
