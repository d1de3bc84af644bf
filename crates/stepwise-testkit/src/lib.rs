//! Test helpers for stepwise.
//!
//! Keeping these in a microcrate avoids copy-paste of recording and failing
//! step actions across the registry/scenario/runner tests.

use std::cell::RefCell;
use std::rc::Rc;
use stepwise_logging::{LogLevel, LoggingConfig};
use stepwise_registry::StepRegistry;
use stepwise_step::{Phase, StepFn};

/// Ordered log of markers written by step actions.
///
/// Clones share the same log, so a test keeps one handle and hands
/// recorders to the steps it builds.
#[derive(Debug, Clone, Default)]
pub struct ActionLog {
    entries: Rc<RefCell<Vec<String>>>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// An action that appends `marker` each time it runs.
    pub fn recorder(&self, marker: impl Into<String>) -> StepFn {
        let entries = Rc::clone(&self.entries);
        let marker = marker.into();
        Rc::new(move || {
            entries.borrow_mut().push(marker.clone());
            Ok(())
        })
    }

    /// Append a marker directly.
    pub fn push(&self, marker: impl Into<String>) {
        self.entries.borrow_mut().push(marker.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

/// An action that always fails with `message`.
pub fn failing(message: impl Into<String>) -> StepFn {
    let message = message.into();
    Rc::new(move || Err(anyhow::anyhow!("{message}")))
}

/// A registry whose steps record their own description into `log`.
pub fn recording_registry(log: &ActionLog, definitions: &[(Phase, &str)]) -> StepRegistry {
    let mut registry = StepRegistry::new();
    for (phase, description) in definitions {
        registry.register(*phase, *description, log.recorder(*description));
    }
    registry
}

/// Route `tracing` output through the test harness at debug level.
pub fn init_test_logging() {
    let config = LoggingConfig::new().with_level(LogLevel::Debug);
    // Ok(false) means an earlier test already installed a subscriber.
    if let Err(err) = stepwise_logging::init_for_tests(&config) {
        panic!("test logging setup failed: {err}");
    }
}

/// Assertion helpers for step actions.
///
/// Each returns `anyhow::Result` so a step body can use `?`.
pub mod assertions {
    use anyhow::{Result, anyhow, bail};
    use std::fmt::Debug;

    pub fn assert_present<T: Debug>(option: Option<T>, name: &str) -> Result<T> {
        option.ok_or_else(|| anyhow!("Expected {name} to be present, but was None"))
    }

    pub fn assert_eq<T: Debug + PartialEq>(actual: T, expected: T, name: &str) -> Result<()> {
        if actual != expected {
            bail!("Expected {name} to be {expected:?}, but was {actual:?}");
        }
        Ok(())
    }

    pub fn assert_true(flag: bool, name: &str) -> Result<()> {
        if !flag {
            bail!("Expected {name} to be true, but was false");
        }
        Ok(())
    }

    pub fn assert_false(flag: bool, name: &str) -> Result<()> {
        if flag {
            bail!("Expected {name} to be false, but was true");
        }
        Ok(())
    }

    pub fn assert_contains(haystack: &str, needle: &str, name: &str) -> Result<()> {
        if !haystack.contains(needle) {
            bail!("Expected {name} to contain '{needle}', but it did not. Content: {haystack}");
        }
        Ok(())
    }

    pub fn assert_not_contains(haystack: &str, needle: &str, name: &str) -> Result<()> {
        if haystack.contains(needle) {
            bail!("Expected {name} NOT to contain '{needle}', but it did. Content: {haystack}");
        }
        Ok(())
    }
}
