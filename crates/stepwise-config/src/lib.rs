//! Configuration management and loading for stepwise suites.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use stepwise_logging::{LogLevel, LoggingConfig};
use stepwise_report::ReportFormat;
use tracing::debug;

pub const ENV_REPORTS_DIR: &str = "STEPWISE_REPORTS_DIR";
pub const ENV_REPORT_FORMAT: &str = "STEPWISE_REPORT_FORMAT";
pub const ENV_FAIL_FAST: &str = "STEPWISE_FAIL_FAST";
pub const ENV_LOG_LEVEL: &str = "STEPWISE_LOG_LEVEL";

/// Errors raised while loading or saving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON config error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML config error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
}

/// Configuration format types supported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigFormat {
    Json,
    #[default]
    Yaml,
}

impl ConfigFormat {
    /// Pick the format from a file extension; YAML unless it says `.json`.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => ConfigFormat::Json,
            Some("yaml") | Some("yml") => ConfigFormat::Yaml,
            _ => ConfigFormat::default(),
        }
    }
}

/// What a run does with steps that resolved to no implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedPolicy {
    /// Execute anyway; unresolved steps are silently skipped.
    #[default]
    Ignore,
    /// Record the scenario as skipped without executing it.
    Skip,
    /// Record the scenario as failed without executing it.
    Fail,
}

impl fmt::Display for UnresolvedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnresolvedPolicy::Ignore => "ignore",
            UnresolvedPolicy::Skip => "skip",
            UnresolvedPolicy::Fail => "fail",
        })
    }
}

impl FromStr for UnresolvedPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(UnresolvedPolicy::Ignore),
            "skip" => Ok(UnresolvedPolicy::Skip),
            "fail" => Ok(UnresolvedPolicy::Fail),
            _ => Err(invalid("unresolved", s)),
        }
    }
}

/// Main suite configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Directory reports are written to
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,

    /// Format of the written report
    #[serde(default)]
    pub report_format: ReportFormat,

    /// Clear the registry context before every scenario
    #[serde(default = "default_true")]
    pub clear_context: bool,

    /// Skip the remaining scenarios after the first failure
    #[serde(default)]
    pub fail_fast: bool,

    /// Handling of steps with no registered implementation
    #[serde(default)]
    pub unresolved: UnresolvedPolicy,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_true() -> bool {
    true
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            reports_dir: default_reports_dir(),
            report_format: ReportFormat::default(),
            clear_context: true,
            fail_fast: false,
            unresolved: UnresolvedPolicy::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SuiteConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overlay `STEPWISE_*` values obtained from `lookup`.
    ///
    /// Unset or blank variables leave the current value alone.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = get(ENV_REPORTS_DIR) {
            self.reports_dir = PathBuf::from(dir);
        }
        if let Some(format) = get(ENV_REPORT_FORMAT) {
            self.report_format = format
                .trim()
                .to_ascii_lowercase()
                .parse::<ReportFormat>()
                .map_err(|_| invalid(ENV_REPORT_FORMAT, &format))?;
        }
        if let Some(flag) = get(ENV_FAIL_FAST) {
            self.fail_fast = parse_bool(ENV_FAIL_FAST, &flag)?;
        }
        if let Some(level) = get(ENV_LOG_LEVEL) {
            self.logging.level = level
                .parse::<LogLevel>()
                .map_err(|_| invalid(ENV_LOG_LEVEL, &level))?;
        }

        debug!(config = ?self, "applied environment overrides");
        Ok(())
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

/// Load configuration from a file
pub fn load_config(path: impl AsRef<Path>) -> Result<SuiteConfig, ConfigError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let config = match ConfigFormat::from_path(path) {
        ConfigFormat::Json => serde_json::from_str(&contents)?,
        ConfigFormat::Yaml => serde_yaml::from_str(&contents)?,
    };
    debug!(path = %path.display(), "loaded suite config");
    Ok(config)
}

/// Save configuration to a file
pub fn save_config(config: &SuiteConfig, path: impl AsRef<Path>) -> Result<(), ConfigError> {
    let path = path.as_ref();
    let contents = match ConfigFormat::from_path(path) {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };

    std::fs::write(path, contents).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use stepwise_logging::LogFormat;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn config_default_values() {
        let config = SuiteConfig::default();
        assert_eq!(config.reports_dir, PathBuf::from("reports"));
        assert_eq!(config.report_format, ReportFormat::Text);
        assert!(config.clear_context);
        assert!(!config.fail_fast);
        assert_eq!(config.unresolved, UnresolvedPolicy::Ignore);
    }

    #[test]
    fn empty_yaml_uses_defaults() {
        let config: SuiteConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, SuiteConfig::default());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config: SuiteConfig =
            serde_json::from_str(r#"{"report_format": "json", "unresolved": "fail"}"#).unwrap();
        assert_eq!(config.report_format, ReportFormat::Json);
        assert_eq!(config.unresolved, UnresolvedPolicy::Fail);
        assert!(config.clear_context);
    }

    #[test]
    fn load_save_yaml_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("stepwise.yaml");

        let config = SuiteConfig {
            reports_dir: PathBuf::from("/tmp/reports"),
            report_format: ReportFormat::Json,
            clear_context: false,
            fail_fast: true,
            unresolved: UnresolvedPolicy::Skip,
            logging: LoggingConfig::new()
                .with_level(LogLevel::Debug)
                .with_format(LogFormat::Compact),
        };

        save_config(&config, &config_path).unwrap();
        let loaded = load_config(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn load_save_json_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("stepwise.json");

        save_config(&SuiteConfig::default(), &config_path).unwrap();
        let text = std::fs::read_to_string(&config_path).unwrap();
        assert!(text.contains("\"reports_dir\""));

        let loaded = load_config(&config_path).unwrap();
        assert_eq!(loaded, SuiteConfig::default());
    }

    #[test]
    fn unknown_extension_reads_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("stepwise.conf");
        std::fs::write(&config_path, "fail_fast: true\n").unwrap();

        assert!(load_config(&config_path).unwrap().fail_fast);
    }

    #[test]
    fn missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = load_config(temp_dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("bad.json");
        std::fs::write(&config_path, "{not json").unwrap();

        let err = load_config(&config_path).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
        assert!(err.to_string().starts_with("JSON config error: "));
    }

    #[test]
    fn malformed_yaml_is_yaml_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("bad.yaml");
        std::fs::write(&config_path, "fail_fast: [unclosed\n").unwrap();

        let err = load_config(&config_path).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
        assert!(err.to_string().starts_with("YAML config error: "));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = SuiteConfig::default();
        config
            .apply_env_overrides(env(&[
                (ENV_REPORTS_DIR, "out/reports"),
                (ENV_REPORT_FORMAT, "JSON"),
                (ENV_FAIL_FAST, "true"),
                (ENV_LOG_LEVEL, "trace"),
            ]))
            .unwrap();

        assert_eq!(config.reports_dir, PathBuf::from("out/reports"));
        assert_eq!(config.report_format, ReportFormat::Json);
        assert!(config.fail_fast);
        assert_eq!(config.logging.level, LogLevel::Trace);
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut config = SuiteConfig::default();
        config
            .apply_env_overrides(env(&[(ENV_REPORTS_DIR, "  "), (ENV_FAIL_FAST, "")]))
            .unwrap();
        assert_eq!(config, SuiteConfig::default());
    }

    #[test]
    fn invalid_env_values_are_rejected() {
        let mut config = SuiteConfig::default();
        let err = config
            .apply_env_overrides(env(&[(ENV_FAIL_FAST, "maybe")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref key, ref value } if key == ENV_FAIL_FAST && value == "maybe"
        ));

        let err = config
            .apply_env_overrides(env(&[(ENV_REPORT_FORMAT, "html")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn unresolved_policy_parsing() {
        assert_eq!("Skip".parse::<UnresolvedPolicy>().unwrap(), UnresolvedPolicy::Skip);
        assert_eq!(UnresolvedPolicy::Fail.to_string(), "fail");
        assert!("explode".parse::<UnresolvedPolicy>().is_err());
    }

    #[test]
    fn format_from_path() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("a.yml")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("a")), ConfigFormat::Yaml);
    }
}
