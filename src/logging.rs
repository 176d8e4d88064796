//! Structured logging setup.
//!
//! - JSON formatting for CI and production
//! - Pretty formatting for development
//! - File output with daily rotation

use anyhow::{Context, Result};
use std::env;
use std::io;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Configuration for logging setup.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log format: "json" or "pretty"
    pub format: LogFormat,
    /// Log output: "stdout", "stderr", or "file"
    pub output: LogOutput,
    /// Directory for log files (when output is "file")
    pub log_dir: PathBuf,
    /// Log file name prefix
    pub log_file_prefix: String,
    pub service_name: String,
    pub service_version: String,
    /// Environment (e.g., "dev", "ci", "production")
    pub environment: String,
    /// Rotate log files daily
    pub enable_rotation: bool,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Log output destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    Stderr,
    File,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let is_production = environment == "production" || environment == "prod";

        Self {
            format: if is_production {
                LogFormat::Json
            } else {
                LogFormat::Pretty
            },
            // stdout carries the run report
            output: LogOutput::Stderr,
            log_dir: PathBuf::from("logs"),
            log_file_prefix: "throwgen".to_string(),
            service_name: "throwgen".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            environment,
            enable_rotation: true,
        }
    }
}

impl LoggingConfig {
    /// Create a new logging configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(format) = env::var("LOG_FORMAT") {
            config.format = parse_format(&format).unwrap_or(config.format);
        }

        if let Ok(output) = env::var("LOG_OUTPUT") {
            config.output = parse_output(&output).unwrap_or(config.output);
        }

        if let Ok(log_dir) = env::var("LOG_DIR") {
            config.log_dir = PathBuf::from(log_dir);
        }

        config
    }
}

fn parse_format(value: &str) -> Option<LogFormat> {
    match value.to_lowercase().as_str() {
        "json" => Some(LogFormat::Json),
        "pretty" => Some(LogFormat::Pretty),
        _ => None,
    }
}

fn parse_output(value: &str) -> Option<LogOutput> {
    match value.to_lowercase().as_str() {
        "stdout" => Some(LogOutput::Stdout),
        "stderr" => Some(LogOutput::Stderr),
        "file" => Some(LogOutput::File),
        _ => None,
    }
}

/// Initialize structured logging with the given configuration.
///
/// Returns a WorkerGuard that must be held until the process exits so that
/// buffered log lines are flushed.
pub fn init_logging(config: LoggingConfig) -> Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (writer, guard) = match config.output {
        LogOutput::Stdout => tracing_appender::non_blocking(io::stdout()),
        LogOutput::Stderr => tracing_appender::non_blocking(io::stderr()),
        LogOutput::File => {
            std::fs::create_dir_all(&config.log_dir).context("Failed to create log directory")?;

            let file_appender = if config.enable_rotation {
                tracing_appender::rolling::daily(&config.log_dir, &config.log_file_prefix)
            } else {
                tracing_appender::rolling::never(&config.log_dir, &config.log_file_prefix)
            };
            tracing_appender::non_blocking(file_appender)
        }
    };

    let registry = tracing_subscriber::registry();

    match config.format {
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_target(true)
                .with_level(true)
                .with_line_number(true)
                .with_file(true)
                .with_current_span(true)
                .with_filter(env_filter);
            registry
                .with(fmt_layer)
                .try_init()
                .context("Failed to install tracing subscriber")?;
        }
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .pretty()
                .with_writer(writer)
                .with_target(true)
                .with_level(true)
                .with_line_number(false)
                .with_file(false)
                .with_ansi(config.output != LogOutput::File)
                .with_filter(env_filter);
            registry
                .with(fmt_layer)
                .try_init()
                .context("Failed to install tracing subscriber")?;
        }
    }

    tracing::debug!(
        service = %config.service_name,
        version = %config.service_version,
        environment = %config.environment,
        format = ?config.format,
        output = ?config.output,
        "logging initialized"
    );

    Ok(Some(guard))
}

/// Span covering one generation run.
pub fn run_span(snapshot: &str) -> tracing::Span {
    tracing::info_span!(
        "generation_run",
        snapshot = snapshot,
        service = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert_eq!(config.service_name, "throwgen");
        assert_eq!(config.output, LogOutput::Stderr);
    }

    #[test]
    fn test_parse_format_and_output() {
        assert_eq!(parse_format("JSON"), Some(LogFormat::Json));
        assert_eq!(parse_format("pretty"), Some(LogFormat::Pretty));
        assert_eq!(parse_format("xml"), None);
        assert_eq!(parse_output("file"), Some(LogOutput::File));
        assert_eq!(parse_output("Stdout"), Some(LogOutput::Stdout));
        assert_eq!(parse_output("syslog"), None);
    }
}
