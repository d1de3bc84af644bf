//! Fluent scenario construction.
//!
//! [`ScenarioBuilder`] takes step text by phase, resolves each line against a
//! [`StepRegistry`] and appends the resulting [`Step`] to the scenario it is
//! assembling. Unresolved text still becomes a step, just without an action.

use stepwise_registry::StepRegistry;
use stepwise_scenario::{DataTable, Scenario};
use stepwise_step::{Phase, Step};
use tracing::debug;

/// Builds a [`Scenario`] from step descriptions bound to a registry.
pub struct ScenarioBuilder<'r> {
    scenario: Scenario,
    registry: &'r StepRegistry,
}

impl<'r> ScenarioBuilder<'r> {
    pub fn new(name: impl Into<String>, registry: &'r StepRegistry) -> Self {
        Self {
            scenario: Scenario::new(name),
            registry,
        }
    }

    /// Continue building an existing scenario.
    ///
    /// A built scenario is never frozen: steps added here are appended to
    /// the same sequences it already holds.
    pub fn extend(scenario: Scenario, registry: &'r StepRegistry) -> Self {
        Self { scenario, registry }
    }

    /// Add a Given step.
    pub fn given(mut self, description: &str) -> Self {
        let step = self.resolve(Phase::Given, Phase::Given, description);
        self.scenario.add_given(step);
        self
    }

    /// Add a When step.
    pub fn when(mut self, description: &str) -> Self {
        let step = self.resolve(Phase::When, Phase::When, description);
        self.scenario.add_when(step);
        self
    }

    /// Add a Then step.
    pub fn then(mut self, description: &str) -> Self {
        let step = self.resolve(Phase::Then, Phase::Then, description);
        self.scenario.add_then(step);
        self
    }

    /// Add a Background step. Backgrounds resolve against Given definitions.
    pub fn background(mut self, description: &str) -> Self {
        let step = self.resolve(Phase::Background, Phase::Given, description);
        self.scenario.add_background(step);
        self
    }

    /// Attach a data table, replacing any earlier one.
    pub fn with_data(mut self, data: DataTable) -> Self {
        self.scenario.set_data_table(data);
        self
    }

    /// The registry steps are resolved against.
    pub fn registry(&self) -> &'r StepRegistry {
        self.registry
    }

    /// The scenario assembled so far.
    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn build(self) -> Scenario {
        debug!(
            scenario = %self.scenario.name(),
            steps = self.scenario.step_count(),
            unresolved = self.scenario.unresolved_steps().len(),
            "built scenario"
        );
        self.scenario
    }

    fn resolve(&self, phase: Phase, lookup: Phase, description: &str) -> Step {
        let action = self.registry.match_step(lookup, description);
        Step::from_parts(phase, description, action)
    }
}
