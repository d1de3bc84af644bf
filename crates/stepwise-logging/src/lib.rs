//! Logging configuration and subscriber setup for stepwise.
//!
//! Every stepwise crate logs through `tracing`. This crate turns a
//! serializable [`LoggingConfig`] into an [`EnvFilter`] and installs a `fmt`
//! subscriber. `RUST_LOG`, when set, takes precedence over the config.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::TestWriter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{Layer, Registry};

/// Errors raised while building the log filter.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log filter directive: {0}")]
    InvalidDirective(#[from] tracing_subscriber::filter::ParseError),
    #[error("unknown log level: {0:?}")]
    UnknownLevel(String),
}

/// Log level for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive spelling understood by [`EnvFilter`].
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_directive())
    }
}

impl FromStr for LogLevel {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(LoggingError::UnknownLevel(s.to_string())),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
    Compact,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level to output
    #[serde(default)]
    pub level: LogLevel,
    /// Output format
    #[serde(default)]
    pub format: LogFormat,
    /// Enable timestamps
    #[serde(default = "default_true")]
    pub timestamps: bool,
    /// Enable colors (for terminal output)
    #[serde(default = "default_true")]
    pub colors: bool,
    /// Per-crate log levels, keyed by crate name (`stepwise-registry`)
    #[serde(default)]
    pub component_levels: BTreeMap<String, LogLevel>,
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Plain,
            timestamps: true,
            colors: true,
            component_levels: BTreeMap::new(),
        }
    }
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_component_level(mut self, component: impl Into<String>, level: LogLevel) -> Self {
        self.component_levels.insert(component.into(), level);
        self
    }

    /// `EnvFilter` directives for this config, e.g. `info,stepwise_runner=debug`.
    ///
    /// Crate names are written with underscores, matching tracing targets.
    pub fn filter_directives(&self) -> String {
        let mut directives = vec![self.level.as_directive().to_string()];
        directives.extend(
            self.component_levels
                .iter()
                .map(|(component, level)| format!("{}={}", component.replace('-', "_"), level)),
        );
        directives.join(",")
    }
}

/// The filter to install: `RUST_LOG` when set and non-empty, else the config.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingError> {
    match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(raw) if !raw.trim().is_empty() => Ok(EnvFilter::try_new(raw)?),
        _ => Ok(EnvFilter::try_new(config.filter_directives())?),
    }
}

/// Install the global subscriber, writing to stderr.
///
/// Returns `Ok(false)` if a global subscriber was already installed.
pub fn init(config: &LoggingConfig) -> Result<bool, LoggingError> {
    install(config, BoxMakeWriter::new(std::io::stderr), config.colors)
}

/// Install the global subscriber through the test harness writer, so output
/// is captured per test.
pub fn init_for_tests(config: &LoggingConfig) -> Result<bool, LoggingError> {
    install(config, BoxMakeWriter::new(TestWriter::new()), false)
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn install(
    config: &LoggingConfig,
    writer: BoxMakeWriter,
    ansi: bool,
) -> Result<bool, LoggingError> {
    let filter = env_filter(config)?;
    let layer = tracing_subscriber::fmt::layer()
        .with_ansi(ansi)
        .with_writer(writer);

    let layer: BoxedLayer = match (config.format, config.timestamps) {
        (LogFormat::Plain, true) => Box::new(layer),
        (LogFormat::Plain, false) => Box::new(layer.without_time()),
        (LogFormat::Compact, true) => Box::new(layer.compact()),
        (LogFormat::Compact, false) => Box::new(layer.compact().without_time()),
        (LogFormat::Json, true) => Box::new(layer.json()),
        (LogFormat::Json, false) => Box::new(layer.json().without_time()),
    };

    Ok(tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
        .is_ok())
}
