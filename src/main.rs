use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use models_loader::config::{Config, default_config_path};
use models_loader::sync::run;

const DEFAULT_LOG_FILTER: &str = "models_loader=info";

#[derive(Parser)]
#[command(name = "models-loader")]
#[command(version, about = "Download the newest package version reported by the version endpoints")]
struct Cli {
    /// Configuration document (default: ./config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Append log lines to this file instead of standard output
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.log_file.as_deref(), cli.log_format)?;

    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = Config::load(&config_path)?;

    let outcome = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(run(&config))?;
    tracing::debug!("Sync finished: {:?}", outcome);

    Ok(())
}

/// Install the global subscriber. The returned guard flushes the log file on drop.
fn init_logging(log_file: Option<&Path>, format: LogFormat) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let (writer, guard) = match log_file {
        Some(path) => {
            let file_name = path
                .file_name()
                .with_context(|| format!("Log file path {path:?} has no file name"))?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {dir:?}"))?;

            let appender = tracing_appender::rolling::never(dir, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stdout), None),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(log_file.is_none());

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }

    Ok(guard)
}
