//! Feature execution for stepwise.
//!
//! [`FeatureRunner`] runs each scenario of a feature in order against one
//! registry and appends every outcome to a [`Reporter`]. [`Suite`] bundles a
//! registry, a reporter and a [`SuiteConfig`] for a whole run.

mod suite;

pub use stepwise_config::{SuiteConfig, UnresolvedPolicy};
pub use suite::Suite;

use chrono::{DateTime, Utc};
use serde::Serialize;
use stepwise_feature::Feature;
use stepwise_registry::StepRegistry;
use stepwise_report::{Reporter, Statistics, Status};
use stepwise_scenario::Scenario;
use tracing::{info, info_span, warn};

const SKIPPED_AFTER_FAILURE: &str = "skipped after an earlier failure";

/// Per-run behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Clear the registry context before each scenario.
    pub clear_context: bool,
    /// Record remaining scenarios as skipped after the first failure.
    pub fail_fast: bool,
    pub unresolved: UnresolvedPolicy,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            clear_context: true,
            fail_fast: false,
            unresolved: UnresolvedPolicy::Ignore,
        }
    }
}

impl From<&SuiteConfig> for RunOptions {
    fn from(config: &SuiteConfig) -> Self {
        Self {
            clear_context: config.clear_context,
            fail_fast: config.fail_fast,
            unresolved: config.unresolved,
        }
    }
}

/// Outcome of running one feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub feature: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Counts for this run only.
    pub statistics: Statistics,
}

impl RunSummary {
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    pub fn is_success(&self) -> bool {
        self.statistics.is_success()
    }
}

/// Runs scenarios against a registry, recording into a reporter.
pub struct FeatureRunner<'a> {
    registry: &'a StepRegistry,
    reporter: &'a mut Reporter,
    options: RunOptions,
}

impl<'a> FeatureRunner<'a> {
    pub fn new(registry: &'a StepRegistry, reporter: &'a mut Reporter) -> Self {
        Self {
            registry,
            reporter,
            options: RunOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> RunOptions {
        self.options
    }

    /// Run every scenario of `feature` in insertion order.
    pub fn run_feature(&mut self, feature: &Feature) -> RunSummary {
        let span = info_span!("feature", name = %feature.name());
        let _guard = span.enter();

        let started_at = Utc::now();
        let first_record = self.reporter.len();
        let mut failed = false;

        for scenario in feature.scenarios() {
            if failed && self.options.fail_fast {
                self.reporter.add_result(
                    scenario.name(),
                    scenario.all_steps(),
                    Status::Skipped,
                    Some(SKIPPED_AFTER_FAILURE.to_string()),
                );
                continue;
            }
            failed |= self.run_scenario(scenario) == Status::Failed;
        }

        let statistics = Statistics::from_results(self.reporter.results().iter().skip(first_record));
        info!(
            total = statistics.total,
            passed = statistics.passed,
            failed = statistics.failed,
            skipped = statistics.skipped,
            "feature finished"
        );

        RunSummary {
            feature: feature.name().to_string(),
            started_at,
            finished_at: Utc::now(),
            statistics,
        }
    }

    /// Run one scenario and record its outcome.
    pub fn run_scenario(&mut self, scenario: &Scenario) -> Status {
        if self.options.clear_context {
            self.registry.clear_context();
        }

        let unresolved = scenario.unresolved_steps().first().map(|step| step.to_string());
        let (status, error) = match (self.options.unresolved, unresolved) {
            (UnresolvedPolicy::Skip, Some(step)) => {
                (Status::Skipped, Some(format!("unresolved step: {step}")))
            }
            (UnresolvedPolicy::Fail, Some(step)) => {
                (Status::Failed, Some(format!("unresolved step: {step}")))
            }
            _ => match scenario.execute() {
                Ok(()) => (Status::Passed, None),
                Err(err) => (Status::Failed, Some(format!("{err:#}"))),
            },
        };

        match &error {
            Some(error) if status == Status::Failed => {
                warn!(scenario = %scenario.name(), %error, "scenario failed")
            }
            _ => info!(scenario = %scenario.name(), %status, "scenario finished"),
        }

        self.reporter
            .add_result(scenario.name(), scenario.all_steps(), status, error);
        status
    }
}
