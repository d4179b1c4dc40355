//! Declarative scenarios: declarations, bindings, and the exports to read,
//! described in TOML or JSON and replayed onto a harness.

use crate::error::RedefineError;
use crate::harness::Harness;
use crate::module::Invocation;
use crate::queue::{Factory, is_sentinel};
use crate::redefiner::Substitute;
use crate::snapshot::DebugSnapshot;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use serde_json::Map;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Errors raised while loading or replaying a scenario.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("failed to read scenario at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scenario TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to parse scenario JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Redefine(#[from] RedefineError),
}

/// A complete wiring: what is declared, how it is bound, what is read.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub define: Vec<DefineSpec>,
    #[serde(default)]
    pub redefine: Vec<RedefineSpec>,
    #[serde(default)]
    pub exports: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DefineSpec {
    /// Module id of a named declaration; never affects claim order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Omitted lists default to `require, exports, module`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<String>>,
    pub factory: FactorySpec,
}

/// Factory behaviours expressible as data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FactorySpec {
    /// Exports are this value.
    Static { value: serde_json::Value },
    /// Returns the dependency argument at `index`.
    Identity {
        #[serde(default)]
        index: usize,
    },
    /// Returns an object of every non-sentinel dependency name to its value.
    Collect,
    /// Writes `values` onto the exports slot and returns nothing.
    Assign { values: Map<String, serde_json::Value> },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RedefineSpec {
    pub name: String,
    #[serde(default, rename = "let", skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<LetSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LetSpec {
    pub dependency: String,
    /// A string names another binding unless `from` says otherwise.
    pub be: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<OriginSpec>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OriginSpec {
    Exports,
    Redefine,
}

/// Result of running a scenario on a fresh harness.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioReport {
    pub exports: BTreeMap<String, serde_json::Value>,
    pub debug: DebugSnapshot,
}

impl Scenario {
    pub fn from_toml_str(input: &str) -> Result<Self, ScenarioError> {
        Ok(toml::from_str(input)?)
    }

    pub fn from_json_str(input: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Load a scenario; `.toml` files parse as TOML, anything else as JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.display().to_string(),
            source,
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&input),
            _ => Self::from_json_str(&input),
        }
    }

    /// Record every declaration and apply every binding, in order.
    pub fn replay(&self, harness: &Harness) -> Result<(), ScenarioError> {
        for spec in &self.define {
            harness.record(
                spec.id.clone(),
                spec.dependencies.clone(),
                spec.factory.to_factory(),
            );
        }
        for spec in &self.redefine {
            let mut bindings = harness.redefine().save_as(spec.name.as_str())?;
            for binding in &spec.bindings {
                let bound = bindings.let_(binding.dependency.as_str()).be(substitute(&binding.be));
                bindings = match binding.from {
                    Some(OriginSpec::Exports) => bound.from().exports(),
                    Some(OriginSpec::Redefine) => bound.from().redefine(),
                    None => bound.into(),
                };
            }
        }
        debug!(
            declared = harness.declared(),
            claimed = harness.claimed(),
            "scenario replayed"
        );
        Ok(())
    }

    /// Replay onto a fresh harness and read `names`, or the scenario's own
    /// `exports` list when `names` is empty.
    pub fn run(&self, names: &[String]) -> Result<ScenarioReport, ScenarioError> {
        let harness = Harness::new();
        self.replay(&harness)?;
        let names = if names.is_empty() {
            self.exports.as_slice()
        } else {
            names
        };
        let mut exports = BTreeMap::new();
        for name in names {
            exports.insert(name.clone(), harness.exports(name)?.to_json());
        }
        Ok(ScenarioReport {
            exports,
            debug: harness.debug(),
        })
    }
}

fn substitute(be: &serde_json::Value) -> Substitute {
    match be {
        serde_json::Value::String(name) => Substitute::reference(name.as_str()),
        other => Substitute::literal(Value::json(other.clone())),
    }
}

impl FactorySpec {
    pub fn to_factory(&self) -> Factory {
        match self {
            Self::Static { value } => Factory::value(Value::json(value.clone())),
            Self::Identity { index } => {
                let index = *index;
                Factory::function(move |invocation| {
                    invocation.expect_dependency(index).cloned().map(Some)
                })
            }
            Self::Collect => Factory::function(collect),
            Self::Assign { values } => {
                let values = values.clone();
                Factory::function(move |invocation| {
                    let slot = invocation.module().exports();
                    let exports = slot.as_exports().ok_or_else(|| {
                        RedefineError::factory("module exports slot is not an object")
                    })?;
                    for (key, value) in &values {
                        exports.set(key.as_str(), Value::json(value.clone()));
                    }
                    Ok(None)
                })
            }
        }
    }
}

fn collect(invocation: &Invocation<'_>) -> Result<Option<Value>, RedefineError> {
    let object = Value::exports_object();
    if let Some(exports) = object.as_exports() {
        let names = invocation.dependency_names();
        for (name, argument) in names.iter().zip(invocation.arguments()) {
            if is_sentinel(name) {
                continue;
            }
            if let Some(value) = argument.value() {
                exports.set(name.as_str(), value.clone());
            }
        }
    }
    Ok(Some(object))
}
