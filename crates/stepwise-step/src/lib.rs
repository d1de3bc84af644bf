//! Phase-tagged steps for stepwise scenarios.
//!
//! A [`Step`] pairs a behavioural [`Phase`] with a free-text description and,
//! when the description resolved against a registry, the action to run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

/// A zero-argument step action.
///
/// Returning `Err` is how an action reports failure; the error is handed back
/// to whoever executes the scenario, unchanged.
pub type StepFn = Rc<dyn Fn() -> anyhow::Result<()>>;

/// Wrap a closure as a [`StepFn`].
pub fn step_fn<F>(action: F) -> StepFn
where
    F: Fn() -> anyhow::Result<()> + 'static,
{
    Rc::new(action)
}

/// Behavioural phase of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    Background,
    Given,
    When,
    Then,
}

impl Phase {
    /// All phases in execution order.
    pub const EXECUTION_ORDER: [Phase; 4] =
        [Phase::Background, Phase::Given, Phase::When, Phase::Then];

    /// The keyword used when the step is displayed.
    pub fn keyword(&self) -> &'static str {
        match self {
            Phase::Background => "Background",
            Phase::Given => "Given",
            Phase::When => "When",
            Phase::Then => "Then",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Error returned when a keyword does not name a phase.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown step phase: {0:?}")]
pub struct UnknownPhase(pub String);

impl FromStr for Phase {
    type Err = UnknownPhase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "background" => Ok(Phase::Background),
            "given" => Ok(Phase::Given),
            "when" => Ok(Phase::When),
            "then" => Ok(Phase::Then),
            _ => Err(UnknownPhase(s.to_string())),
        }
    }
}

/// One phase-tagged, described, optionally executable unit of a scenario.
#[derive(Clone)]
pub struct Step {
    phase: Phase,
    description: String,
    action: Option<StepFn>,
}

impl Step {
    /// A step with no action attached.
    pub fn new(phase: Phase, description: impl Into<String>) -> Self {
        Self {
            phase,
            description: description.into(),
            action: None,
        }
    }

    /// A step that runs `action` when executed.
    pub fn with_action(phase: Phase, description: impl Into<String>, action: StepFn) -> Self {
        Self::from_parts(phase, description, Some(action))
    }

    /// A step from a possibly-unresolved action.
    pub fn from_parts(
        phase: Phase,
        description: impl Into<String>,
        action: Option<StepFn>,
    ) -> Self {
        Self {
            phase,
            description: description.into(),
            action,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn action(&self) -> Option<&StepFn> {
        self.action.as_ref()
    }

    /// Whether an action is attached.
    pub fn is_resolved(&self) -> bool {
        self.action.is_some()
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.phase, self.description)
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("phase", &self.phase)
            .field("description", &self.description)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}
