//! Key-value store shared by the steps of a run.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared, mutable context for passing data between steps.
///
/// Cloning yields another handle to the same store, so step actions can
/// capture a handle while the registry keeps its own. Stores created
/// separately never share data.
#[derive(Debug, Clone, Default)]
pub struct ScenarioContext {
    values: Rc<RefCell<HashMap<String, Value>>>,
}

impl ScenarioContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, replacing any previous value under `key`.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.borrow_mut().insert(key.into(), value.into());
    }

    /// Fetch a copy of the value under `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.values.borrow().get(key).cloned()
    }

    /// Fetch the value under `key` decoded as `T`.
    ///
    /// `Ok(None)` when the key is unset; an error when the stored value has
    /// the wrong shape.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> serde_json::Result<Option<T>> {
        self.get(key).map(serde_json::from_value).transpose()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.borrow().contains_key(key)
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.values.borrow_mut().remove(key)
    }

    /// Drop every stored value.
    pub fn clear(&self) {
        self.values.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }

    /// Stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.values.borrow().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Whether both handles point at the same store.
    pub fn shares_store_with(&self, other: &ScenarioContext) -> bool {
        Rc::ptr_eq(&self.values, &other.values)
    }
}
