//! Features: named, ordered groups of scenarios.

use stepwise_scenario::Scenario;

/// A named grouping of related scenarios, kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Feature {
    name: String,
    description: String,
    scenarios: Vec<Scenario>,
}

impl Feature {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_description(name, "")
    }

    pub fn with_description(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            scenarios: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Append a scenario.
    pub fn add_scenario(&mut self, scenario: Scenario) -> &mut Self {
        self.scenarios.push(scenario);
        self
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn scenarios_mut(&mut self) -> &mut Vec<Scenario> {
        &mut self.scenarios
    }

    pub fn scenario_count(&self) -> usize {
        self.scenarios.len()
    }

    /// First scenario named `name`.
    pub fn scenario(&self, name: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.name() == name)
    }
}
