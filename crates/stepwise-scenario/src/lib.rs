//! Executable scenarios for stepwise.
//!
//! A [`Scenario`] keeps its steps in four ordered lists and always runs them
//! as background, given, when, then.

use serde_json::Value;
use std::collections::BTreeMap;
use stepwise_step::{Phase, Step};
use tracing::{debug, trace};

/// Structured example data attached to a scenario.
pub type DataTable = BTreeMap<String, Value>;

/// One ordered, executable test case composed of phased steps.
#[derive(Debug, Clone, Default)]
pub struct Scenario {
    name: String,
    background: Vec<Step>,
    given: Vec<Step>,
    when: Vec<Step>,
    then: Vec<Step>,
    data_table: DataTable,
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a Given step (precondition).
    pub fn add_given(&mut self, step: Step) -> &mut Self {
        self.given.push(step);
        self
    }

    /// Append a When step (action).
    pub fn add_when(&mut self, step: Step) -> &mut Self {
        self.when.push(step);
        self
    }

    /// Append a Then step (assertion).
    pub fn add_then(&mut self, step: Step) -> &mut Self {
        self.then.push(step);
        self
    }

    /// Append a Background step (shared precondition).
    pub fn add_background(&mut self, step: Step) -> &mut Self {
        self.background.push(step);
        self
    }

    /// Replace the data table. The previous table is discarded, not merged.
    pub fn set_data_table(&mut self, data: DataTable) -> &mut Self {
        self.data_table = data;
        self
    }

    pub fn data_table(&self) -> &DataTable {
        &self.data_table
    }

    pub fn background_steps(&self) -> &[Step] {
        &self.background
    }

    pub fn given_steps(&self) -> &[Step] {
        &self.given
    }

    pub fn when_steps(&self) -> &[Step] {
        &self.when
    }

    pub fn then_steps(&self) -> &[Step] {
        &self.then
    }

    /// Steps stored under `phase`, in insertion order.
    pub fn steps(&self, phase: Phase) -> &[Step] {
        match phase {
            Phase::Background => &self.background,
            Phase::Given => &self.given,
            Phase::When => &self.when,
            Phase::Then => &self.then,
        }
    }

    /// Every step in execution order: background, given, when, then.
    pub fn all_steps(&self) -> Vec<&Step> {
        Phase::EXECUTION_ORDER
            .iter()
            .flat_map(|phase| self.steps(*phase))
            .collect()
    }

    pub fn step_count(&self) -> usize {
        self.background.len() + self.given.len() + self.when.len() + self.then.len()
    }

    pub fn is_empty(&self) -> bool {
        self.step_count() == 0
    }

    /// Steps with no action attached, in execution order.
    pub fn unresolved_steps(&self) -> Vec<&Step> {
        self.all_steps()
            .into_iter()
            .filter(|step| !step.is_resolved())
            .collect()
    }

    /// Run every attached action in execution order.
    ///
    /// Steps without an action are skipped. The first failing action stops
    /// the run and its error is returned as-is; earlier side effects stay.
    pub fn execute(&self) -> anyhow::Result<()> {
        debug!(scenario = %self.name, steps = self.step_count(), "executing scenario");
        for step in self.all_steps() {
            match step.action() {
                Some(action) => {
                    trace!(scenario = %self.name, %step, "running step");
                    action()?;
                }
                None => trace!(scenario = %self.name, %step, "no action; skipping"),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stepwise_testkit::{ActionLog, failing};

    #[test]
    fn new_scenario_is_empty() {
        let scenario = Scenario::new("User logs in");
        assert_eq!(scenario.name(), "User logs in");
        assert!(scenario.is_empty());
        assert!(scenario.all_steps().is_empty());
        assert!(scenario.data_table().is_empty());
    }

    #[test]
    fn empty_scenario_executes_as_no_op() {
        let scenario = Scenario::new("S");
        scenario.execute().unwrap();
    }

    #[test]
    fn add_methods_append_per_phase() {
        let mut scenario = Scenario::new("Login test");
        scenario.add_given(Step::new(Phase::Given, "user is on login page"));
        scenario.add_when(Step::new(Phase::When, "user enters credentials"));
        scenario.add_then(Step::new(Phase::Then, "user is logged in"));

        assert_eq!(scenario.given_steps().len(), 1);
        assert_eq!(scenario.when_steps().len(), 1);
        assert_eq!(scenario.then_steps().len(), 1);
        assert_eq!(scenario.given_steps()[0].description(), "user is on login page");
    }

    #[test]
    fn chaining_returns_same_scenario() {
        let mut scenario = Scenario::new("Login");
        let addr: *const Scenario = &scenario;

        let chained = scenario
            .add_given(Step::new(Phase::Given, "step1"))
            .add_when(Step::new(Phase::When, "step2"))
            .add_background(Step::new(Phase::Background, "step0"));

        assert!(std::ptr::eq(chained, addr));
        assert_eq!(chained.step_count(), 3);
    }

    #[test]
    fn all_steps_in_phase_order() {
        let mut scenario = Scenario::new("Test");
        scenario
            .add_then(Step::new(Phase::Then, "assertion"))
            .add_when(Step::new(Phase::When, "action"))
            .add_given(Step::new(Phase::Given, "precondition"))
            .add_background(Step::new(Phase::Background, "setup"));

        let rendered: Vec<String> = scenario.all_steps().iter().map(|s| s.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "Background setup",
                "Given precondition",
                "When action",
                "Then assertion"
            ]
        );
    }

    #[test]
    fn data_table_replaced_not_merged() {
        let mut scenario = Scenario::new("Search");
        let mut first = DataTable::new();
        first.insert("query".into(), json!("rust"));
        first.insert("limit".into(), json!(10));
        scenario.set_data_table(first);

        let mut second = DataTable::new();
        second.insert("query".into(), json!("python"));
        scenario.set_data_table(second);

        assert_eq!(scenario.data_table().len(), 1);
        assert_eq!(scenario.data_table()["query"], json!("python"));
    }

    #[test]
    fn execute_runs_actions_in_declared_order() {
        let log = ActionLog::new();
        let mut scenario = Scenario::new("ordered");
        scenario
            .add_then(Step::with_action(Phase::Then, "t1", log.recorder("t1")))
            .add_given(Step::with_action(Phase::Given, "g1", log.recorder("g1")))
            .add_when(Step::with_action(Phase::When, "w1", log.recorder("w1")))
            .add_given(Step::with_action(Phase::Given, "g2", log.recorder("g2")))
            .add_background(Step::with_action(Phase::Background, "b1", log.recorder("b1")));

        scenario.execute().unwrap();
        assert_eq!(log.entries(), vec!["b1", "g1", "g2", "w1", "t1"]);
    }

    #[test]
    fn execute_skips_unresolved_steps() {
        let log = ActionLog::new();
        let mut scenario = Scenario::new("partial");
        scenario
            .add_given(Step::new(Phase::Given, "not implemented"))
            .add_when(Step::with_action(Phase::When, "w", log.recorder("w")));

        scenario.execute().unwrap();
        assert_eq!(log.entries(), vec!["w"]);
        assert_eq!(scenario.unresolved_steps().len(), 1);
        assert_eq!(scenario.unresolved_steps()[0].description(), "not implemented");
    }

    #[test]
    fn failing_action_stops_and_propagates() {
        let log = ActionLog::new();
        let mut scenario = Scenario::new("fails");
        scenario
            .add_given(Step::with_action(Phase::Given, "g", log.recorder("g")))
            .add_when(Step::with_action(Phase::When, "boom", failing("element not found")))
            .add_then(Step::with_action(Phase::Then, "t", log.recorder("t")));

        let err = scenario.execute().unwrap_err();
        assert_eq!(err.to_string(), "element not found");
        assert_eq!(log.entries(), vec!["g"]);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn all_steps_is_concatenation(
                b in 0usize..4, g in 0usize..4, w in 0usize..4, t in 0usize..4
            ) {
                let log = ActionLog::new();
                let mut scenario = Scenario::new("law");
                for i in 0..t {
                    let tag = format!("then-{i}");
                    scenario.add_then(Step::with_action(Phase::Then, tag.clone(), log.recorder(&tag)));
                }
                for i in 0..w {
                    let tag = format!("when-{i}");
                    scenario.add_when(Step::with_action(Phase::When, tag.clone(), log.recorder(&tag)));
                }
                for i in 0..g {
                    let tag = format!("given-{i}");
                    scenario.add_given(Step::with_action(Phase::Given, tag.clone(), log.recorder(&tag)));
                }
                for i in 0..b {
                    let tag = format!("background-{i}");
                    scenario.add_background(Step::with_action(Phase::Background, tag.clone(), log.recorder(&tag)));
                }

                let expected: Vec<String> = (0..b).map(|i| format!("background-{i}"))
                    .chain((0..g).map(|i| format!("given-{i}")))
                    .chain((0..w).map(|i| format!("when-{i}")))
                    .chain((0..t).map(|i| format!("then-{i}")))
                    .collect();

                let descriptions: Vec<String> = scenario
                    .all_steps()
                    .iter()
                    .map(|s| s.description().to_string())
                    .collect();
                prop_assert_eq!(scenario.all_steps().len(), b + g + w + t);
                prop_assert_eq!(&descriptions, &expected);

                scenario.execute().unwrap();
                prop_assert_eq!(log.entries(), expected);
            }
        }
    }
}
