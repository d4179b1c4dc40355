//! Read-only diagnostics view of a harness.

use crate::harness::State;
use crate::queue::Factory;
use serde::Serialize;
use std::collections::BTreeMap;

/// Queue, registry, cache, and claim count at one point in time.
///
/// Values are rendered through their string coercion.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DebugSnapshot {
    pub queue: Vec<DeclarationSnapshot>,
    pub map: BTreeMap<String, BindingSnapshot>,
    pub exports_cache: BTreeMap<String, String>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeclarationSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub dependencies: Vec<String>,
    pub factory: FactoryKind,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FactoryKind {
    Function,
    Static,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BindingSnapshot {
    pub declaration: usize,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub links: BTreeMap<String, String>,
}

impl DebugSnapshot {
    pub(crate) fn capture(state: &State) -> Self {
        let queue = state
            .queue
            .iter()
            .map(|declaration| DeclarationSnapshot {
                id: declaration.id().map(str::to_string),
                dependencies: declaration.dependencies().to_vec(),
                factory: match declaration.factory() {
                    Factory::Function(_) => FactoryKind::Function,
                    Factory::Static(_) => FactoryKind::Static,
                },
            })
            .collect();

        let map = state
            .registry
            .bindings()
            .iter()
            .map(|(name, binding)| {
                let binding = binding.borrow();
                let snapshot = BindingSnapshot {
                    declaration: binding.index(),
                    overrides: binding
                        .overrides()
                        .iter()
                        .map(|(dependency, value)| (dependency.clone(), value.to_string()))
                        .collect(),
                    links: binding.links().clone(),
                };
                (name.clone(), snapshot)
            })
            .collect();

        let exports_cache = state
            .registry
            .cache_entries()
            .iter()
            .map(|(name, exports)| (name.clone(), exports.to_string()))
            .collect();

        Self {
            queue,
            map,
            exports_cache,
            count: state.queue.claimed(),
        }
    }
}
