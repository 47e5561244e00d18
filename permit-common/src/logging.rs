//! Logging initialization.
//!
//! Diagnostics go through `tracing` to stderr so stdout stays reserved for
//! user-facing progress lines.

use crate::config::env::EnvParser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
    pub to_stderr: bool,
    /// Problems found while reading the environment, logged once the
    /// subscriber is installed.
    pub warnings: Vec<String>,
}

impl LogConfig {
    /// Read `PERMIT_LOG` and `PERMIT_LOG_FORMAT`, falling back to
    /// `default_level` and pretty output.
    pub fn from_env(default_level: &str) -> Self {
        Self::from_parser(&mut EnvParser::new(), default_level)
    }

    pub fn from_parser(parser: &mut EnvParser, default_level: &str) -> Self {
        let level = parser.get_log_level("LOG", default_level).value;
        let format = match parser
            .get_choice("LOG_FORMAT", "pretty", &["pretty", "json"])
            .value
            .as_str()
        {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        };
        let warnings = parser
            .take_errors()
            .into_iter()
            .map(|e| e.to_string())
            .collect();

        Self {
            level,
            format,
            to_stderr: false,
            warnings,
        }
    }

    pub fn with_stderr(mut self) -> Self {
        self.to_stderr = true;
        self
    }

    pub fn with_level(mut self, level: &str) -> Self {
        self.level = level.to_string();
        self
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.level).unwrap_or_else(|_| EnvFilter::new("warn"))
    }

    fn writer(&self) -> BoxMakeWriter {
        if self.to_stderr {
            BoxMakeWriter::new(std::io::stderr)
        } else {
            BoxMakeWriter::new(std::io::stdout)
        }
    }
}

/// Install the global subscriber described by `config`.
pub fn init_logging(config: &LogConfig) -> Result<(), TryInitError> {
    let json = (config.format == LogFormat::Json).then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(config.writer())
    });
    let pretty = (config.format == LogFormat::Pretty).then(|| {
        tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(config.writer())
    });

    tracing_subscriber::registry()
        .with(config.filter())
        .with(json)
        .with(pretty)
        .try_init()?;

    for warning in &config.warnings {
        tracing::warn!("{}", warning);
    }
    Ok(())
}
