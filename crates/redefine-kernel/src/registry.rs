//! Saved bindings, memoized exports, and the in-flight resolution stack.

use crate::error::RedefineError;
use crate::redefiner::BindingCell;
use crate::value::Value;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub(crate) struct Registry {
    bindings: BTreeMap<String, BindingCell>,
    cache: BTreeMap<String, Value>,
    resolving: Vec<String>,
}

impl Registry {
    /// Register `binding` under `name`. Last write wins; any exports cached
    /// for the replaced binding are dropped.
    ///
    /// Returns the replaced binding, if any.
    pub(crate) fn register(&mut self, name: &str, binding: BindingCell) -> Option<BindingCell> {
        let previous = self.bindings.insert(name.to_string(), binding);
        if previous.is_some() {
            self.cache.remove(name);
        }
        previous
    }

    pub(crate) fn binding(&self, name: &str) -> Option<BindingCell> {
        self.bindings.get(name).cloned()
    }

    pub(crate) fn bindings(&self) -> &BTreeMap<String, BindingCell> {
        &self.bindings
    }

    pub(crate) fn cached(&self, name: &str) -> Option<Value> {
        self.cache.get(name).cloned()
    }

    pub(crate) fn cache(&mut self, name: &str, exports: Value) {
        self.cache.insert(name.to_string(), exports);
    }

    pub(crate) fn cache_entries(&self) -> &BTreeMap<String, Value> {
        &self.cache
    }

    /// Push `name` onto the resolution stack, failing if it is already there.
    pub(crate) fn enter(&mut self, name: &str) -> Result<(), RedefineError> {
        if let Some(start) = self.resolving.iter().position(|entry| entry == name) {
            let mut path = self.resolving[start..].to_vec();
            path.push(name.to_string());
            return Err(RedefineError::CyclicBinding { path });
        }
        self.resolving.push(name.to_string());
        Ok(())
    }

    pub(crate) fn leave(&mut self, name: &str) {
        if let Some(position) = self.resolving.iter().rposition(|entry| entry == name) {
            self.resolving.truncate(position);
        }
    }
}
