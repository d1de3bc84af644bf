use crate::{FeatureRunner, RunOptions, RunSummary};
use std::path::{Path, PathBuf};
use stepwise_builder::ScenarioBuilder;
use stepwise_config::{ConfigError, SuiteConfig, load_config};
use stepwise_feature::Feature;
use stepwise_logging::LoggingError;
use stepwise_registry::StepRegistry;
use stepwise_report::{ReportError, Reporter, Statistics};
use tracing::info;

/// A registry, a reporter and the config that drives them.
///
/// Step definitions go into [`Suite::registry_mut`], scenarios are built
/// with [`Suite::builder`] and every [`Suite::run`] appends to the same
/// report.
#[derive(Debug, Default)]
pub struct Suite {
    config: SuiteConfig,
    registry: StepRegistry,
    reporter: Reporter,
    summaries: Vec<RunSummary>,
}

impl Suite {
    pub fn new(config: SuiteConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Load config from `path` and overlay the `STEPWISE_*` environment.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Load config from `path` and overlay `STEPWISE_*` values from `lookup`.
    pub fn load_with_env<F>(path: impl AsRef<Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = load_config(path)?;
        config.apply_env_overrides(lookup)?;
        Ok(Self::new(config))
    }

    /// Install the global subscriber from the config's logging section.
    pub fn init_logging(&self) -> Result<bool, LoggingError> {
        stepwise_logging::init(&self.config.logging)
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut StepRegistry {
        &mut self.registry
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Start a scenario resolved against this suite's registry.
    pub fn builder(&self, name: impl Into<String>) -> ScenarioBuilder<'_> {
        ScenarioBuilder::new(name, &self.registry)
    }

    /// Run `feature` with options taken from the config.
    pub fn run(&mut self, feature: &Feature) -> RunSummary {
        let summary = FeatureRunner::new(&self.registry, &mut self.reporter)
            .with_options(RunOptions::from(&self.config))
            .run_feature(feature);
        self.summaries.push(summary.clone());
        summary
    }

    /// One summary per completed [`Suite::run`].
    pub fn summaries(&self) -> &[RunSummary] {
        &self.summaries
    }

    /// Counts across every run so far.
    pub fn statistics(&self) -> Statistics {
        self.reporter.statistics()
    }

    /// Write the report in the configured format under `reports_dir`.
    pub fn write_report(&self) -> Result<PathBuf, ReportError> {
        let path = self
            .reporter
            .write_report(&self.config.reports_dir, self.config.report_format)?;
        info!(runs = self.summaries.len(), "suite report written");
        Ok(path)
    }
}
