//! Step definition registry for stepwise.
//!
//! Maps step descriptions to actions per phase and resolves free-text steps
//! against them: an exact description wins, otherwise the first registered
//! pattern whose `{placeholder}` form matches.

mod context;
pub mod pattern;

pub use context::ScenarioContext;
pub use pattern::{compile_pattern, has_placeholders, matches_pattern, pattern_to_regex};

use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::rc::Rc;
use stepwise_step::{Phase, StepFn};
use tracing::{debug, trace, warn};

struct StepDefinition {
    pattern: String,
    matcher: Option<Regex>,
    action: StepFn,
}

impl StepDefinition {
    fn new(pattern: String, action: StepFn) -> Self {
        let matcher = match compile_pattern(&pattern) {
            Ok(re) => Some(re),
            Err(err) => {
                warn!(%pattern, error = %err, "step pattern did not compile; exact match only");
                None
            }
        };
        Self {
            pattern,
            matcher,
            action,
        }
    }

    fn matches(&self, description: &str) -> bool {
        self.matcher
            .as_ref()
            .is_some_and(|re| re.is_match(description))
    }
}

/// Registry of step implementations plus the shared context of a run.
#[derive(Default)]
pub struct StepRegistry {
    given: Vec<StepDefinition>,
    when: Vec<StepDefinition>,
    then: Vec<StepDefinition>,
    context: ScenarioContext,
}

impl StepRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a Given step. Returns the action so it stays callable.
    pub fn given<F>(&mut self, description: impl Into<String>, action: F) -> StepFn
    where
        F: Fn() -> anyhow::Result<()> + 'static,
    {
        self.register(Phase::Given, description, Rc::new(action))
    }

    /// Register a When step. Returns the action so it stays callable.
    pub fn when<F>(&mut self, description: impl Into<String>, action: F) -> StepFn
    where
        F: Fn() -> anyhow::Result<()> + 'static,
    {
        self.register(Phase::When, description, Rc::new(action))
    }

    /// Register a Then step. Returns the action so it stays callable.
    pub fn then<F>(&mut self, description: impl Into<String>, action: F) -> StepFn
    where
        F: Fn() -> anyhow::Result<()> + 'static,
    {
        self.register(Phase::Then, description, Rc::new(action))
    }

    /// Register `action` under `description` for `phase`.
    ///
    /// Registering an existing description replaces its action and keeps its
    /// position. Background steps share the Given table.
    pub fn register(
        &mut self,
        phase: Phase,
        description: impl Into<String>,
        action: StepFn,
    ) -> StepFn {
        let description = description.into();
        let table = self.table_mut(phase);

        match table.iter_mut().find(|d| d.pattern == description) {
            Some(existing) => {
                debug!(%phase, pattern = %description, "replacing step definition");
                existing.action = Rc::clone(&action);
            }
            None => {
                debug!(
                    %phase,
                    pattern = %description,
                    parameterized = has_placeholders(&description),
                    "registering step definition"
                );
                table.push(StepDefinition::new(description, Rc::clone(&action)));
            }
        }

        action
    }

    /// Resolve a step description to an action.
    ///
    /// Exact descriptions are checked first; then patterns in registration
    /// order, first match wins. `None` means no implementation; Background
    /// has no table of its own and always resolves to `None` here.
    pub fn match_step(&self, phase: Phase, description: &str) -> Option<StepFn> {
        let table = self.table(phase)?;

        if let Some(def) = table.iter().find(|d| d.pattern == description) {
            trace!(%phase, %description, "exact step match");
            return Some(Rc::clone(&def.action));
        }

        match table.iter().find(|d| d.matches(description)) {
            Some(def) => {
                trace!(%phase, %description, pattern = %def.pattern, "pattern step match");
                Some(Rc::clone(&def.action))
            }
            None => {
                debug!(%phase, %description, "no step definition found");
                None
            }
        }
    }

    /// Registered descriptions for `phase`, in registration order.
    pub fn patterns(&self, phase: Phase) -> Vec<&str> {
        self.table(phase)
            .map(|t| t.iter().map(|d| d.pattern.as_str()).collect())
            .unwrap_or_default()
    }

    /// Whether `description` is registered verbatim under `phase`.
    pub fn contains(&self, phase: Phase, description: &str) -> bool {
        self.table(phase)
            .is_some_and(|t| t.iter().any(|d| d.pattern == description))
    }

    pub fn len(&self, phase: Phase) -> usize {
        self.table(phase).map_or(0, <[StepDefinition]>::len)
    }

    /// True when no step of any phase is registered.
    pub fn is_empty(&self) -> bool {
        self.given.is_empty() && self.when.is_empty() && self.then.is_empty()
    }

    /// The context store owned by this registry.
    pub fn context(&self) -> &ScenarioContext {
        &self.context
    }

    pub fn set_context(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.context.set(key, value);
    }

    pub fn get_context(&self, key: &str) -> Option<Value> {
        self.context.get(key)
    }

    /// Empty the context store. Called between scenarios.
    pub fn clear_context(&self) {
        self.context.clear();
    }

    fn table(&self, phase: Phase) -> Option<&[StepDefinition]> {
        match phase {
            Phase::Given => Some(&self.given),
            Phase::When => Some(&self.when),
            Phase::Then => Some(&self.then),
            Phase::Background => None,
        }
    }

    fn table_mut(&mut self, phase: Phase) -> &mut Vec<StepDefinition> {
        match phase {
            Phase::Given | Phase::Background => &mut self.given,
            Phase::When => &mut self.when,
            Phase::Then => &mut self.then,
        }
    }
}

impl fmt::Debug for StepRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepRegistry")
            .field("given", &self.patterns(Phase::Given))
            .field("when", &self.patterns(Phase::When))
            .field("then", &self.patterns(Phase::Then))
            .field("context_keys", &self.context.keys())
            .finish()
    }
}
