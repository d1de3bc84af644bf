//! Scenario result reporting for stepwise.
//!
//! [`Reporter`] is an append-only log of scenario outcomes. Steps are stored
//! as display strings at append time, so the log is a snapshot that later
//! changes to [`Step`] values cannot rewrite.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use stepwise_step::Step;
use tracing::{debug, info, warn};

const BANNER_WIDTH: usize = 60;
const BANNER_TITLE: &str = "BDD TEST REPORT";

/// Errors raised while rendering or writing reports.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("unknown report format: {0:?}")]
    UnknownFormat(String),
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write report to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of one scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Passed,
    Failed,
    Skipped,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Passed => "PASSED",
            Status::Failed => "FAILED",
            Status::Skipped => "SKIPPED",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Text => "text",
            ReportFormat::Json => "json",
        }
    }

    /// File extension used by [`Reporter::write_report`].
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(ReportError::UnknownFormat(other.to_string())),
        }
    }
}

/// One recorded scenario outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario: String,
    pub steps: Vec<String>,
    pub status: Status,
    pub error: Option<String>,
}

/// Aggregate counts over a result log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Statistics {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Statistics {
    /// Count the statuses in `results`.
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a ScenarioResult>) -> Self {
        results
            .into_iter()
            .fold(Statistics::default(), |mut stats, result| {
                stats.total += 1;
                match result.status {
                    Status::Passed => stats.passed += 1,
                    Status::Failed => stats.failed += 1,
                    Status::Skipped => stats.skipped += 1,
                }
                stats
            })
    }

    /// No scenario failed.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Append-only log of scenario outcomes.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    results: Vec<ScenarioResult>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of a scenario.
    pub fn add_result<'a>(
        &mut self,
        scenario: impl Into<String>,
        steps: impl IntoIterator<Item = &'a Step>,
        status: Status,
        error: Option<String>,
    ) {
        let record = ScenarioResult {
            scenario: scenario.into(),
            steps: steps.into_iter().map(Step::to_string).collect(),
            status,
            error,
        };
        debug!(scenario = %record.scenario, %status, "recorded scenario result");
        self.results.push(record);
    }

    pub fn results(&self) -> &[ScenarioResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Counts computed from the current log.
    pub fn statistics(&self) -> Statistics {
        Statistics::from_results(&self.results)
    }

    /// Render the log as `"text"` or `"json"`.
    ///
    /// Any other format yields an empty string.
    pub fn generate_report(&self, format: &str) -> String {
        let Ok(format) = format.parse::<ReportFormat>() else {
            debug!(format, "unknown report format; nothing rendered");
            return String::new();
        };

        self.render(format).unwrap_or_else(|err| {
            warn!(error = %err, "report rendering failed");
            String::new()
        })
    }

    /// Render the log in a known format.
    pub fn render(&self, format: ReportFormat) -> Result<String, ReportError> {
        match format {
            ReportFormat::Text => Ok(self.render_text()),
            ReportFormat::Json => Ok(serde_json::to_string_pretty(&self.results)?),
        }
    }

    /// Write the rendered log to `dir/bdd_report.<ext>`, creating `dir`.
    pub fn write_report(&self, dir: &Path, format: ReportFormat) -> Result<PathBuf, ReportError> {
        let path = dir.join(format!("bdd_report.{}", format.extension()));
        let contents = self.render(format)?;

        std::fs::create_dir_all(dir).map_err(|source| ReportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        std::fs::write(&path, contents).map_err(|source| ReportError::Io {
            path: path.clone(),
            source,
        })?;

        info!(path = %path.display(), %format, results = self.len(), "wrote report");
        Ok(path)
    }

    fn render_text(&self) -> String {
        let rule = "=".repeat(BANNER_WIDTH);
        let mut report = format!("{rule}\n{BANNER_TITLE}\n{rule}\n\n");

        for result in &self.results {
            report.push_str(&format!("Scenario: {}\n", result.scenario));
            report.push_str(&format!("Status: {}\n", result.status));
            for step in &result.steps {
                report.push_str(&format!("  - {step}\n"));
            }
            if let Some(error) = result.error.as_deref().filter(|e| !e.is_empty()) {
                report.push_str(&format!("Error: {error}\n"));
            }
            report.push('\n');
        }

        report
    }
}

/// Parse a JSON report back into result records.
pub fn parse_json_report(text: &str) -> Result<Vec<ScenarioResult>, ReportError> {
    Ok(serde_json::from_str(text)?)
}
