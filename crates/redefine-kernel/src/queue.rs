//! The definition queue: every intercepted declaration, in call order.

use crate::error::RedefineError;
use crate::module::Invocation;
use crate::value::Value;
use std::fmt;
use std::rc::Rc;

/// Sentinel dependency supplying the binding-scoped resolver.
pub const REQUIRE: &str = "require";
/// Sentinel dependency supplying the module's mutable exports slot.
pub const EXPORTS: &str = "exports";
/// Sentinel dependency supplying the module descriptor.
pub const MODULE: &str = "module";

/// Dependencies assumed when a declaration omits its list.
pub const DEFAULT_DEPENDENCIES: [&str; 3] = [REQUIRE, EXPORTS, MODULE];

pub fn is_sentinel(name: &str) -> bool {
    DEFAULT_DEPENDENCIES.contains(&name)
}

pub type FactoryFn = dyn Fn(&Invocation<'_>) -> Result<Option<Value>, RedefineError>;

/// How a declaration produces its exports.
#[derive(Clone)]
pub enum Factory {
    /// Invoked with the ordered dependency arguments. A returned value
    /// replaces the module's exports slot.
    Function(Rc<FactoryFn>),
    /// Used as the module's exports directly.
    Static(Value),
}

impl Factory {
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> Result<Option<Value>, RedefineError> + 'static,
    {
        Self::Function(Rc::new(f))
    }

    pub fn value(value: Value) -> Self {
        Self::Static(value)
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Self::Function(_))
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(_) => f.write_str("Factory::Function(..)"),
            Self::Static(value) => f.debug_tuple("Factory::Static").field(value).finish(),
        }
    }
}

/// One captured declaration. Immutable once recorded.
#[derive(Debug)]
pub struct Declaration {
    id: Option<String>,
    dependencies: Vec<String>,
    factory: Factory,
}

impl Declaration {
    /// The module id of a named `define(id, dependencies, factory)` call.
    ///
    /// Kept for diagnostics only; claims never look at it.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn factory(&self) -> &Factory {
        &self.factory
    }
}

/// Ordered declarations plus the claim cursor.
///
/// Claims always take the earliest unclaimed declaration, so claim order
/// equals declaration order.
#[derive(Debug, Default)]
pub struct DefinitionQueue {
    entries: Vec<Rc<Declaration>>,
    claimed: usize,
}

impl DefinitionQueue {
    /// Append a declaration; `None` dependencies default to the sentinel triple.
    ///
    /// Returns the declaration's position.
    pub fn record(
        &mut self,
        id: Option<String>,
        dependencies: Option<Vec<String>>,
        factory: Factory,
    ) -> usize {
        let dependencies = dependencies.unwrap_or_else(|| {
            DEFAULT_DEPENDENCIES
                .iter()
                .map(|name| name.to_string())
                .collect()
        });
        self.entries.push(Rc::new(Declaration {
            id,
            dependencies,
            factory,
        }));
        self.entries.len() - 1
    }

    /// Take the next unclaimed declaration and advance the cursor.
    pub fn claim_next(&mut self) -> Option<(usize, Rc<Declaration>)> {
        let index = self.claimed;
        let declaration = self.entries.get(index)?.clone();
        self.claimed += 1;
        Some((index, declaration))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn claimed(&self) -> usize {
        self.claimed
    }

    /// Whether every declaration has been claimed exactly once.
    pub fn is_balanced(&self) -> bool {
        self.claimed == self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.entries.iter().map(AsRef::as_ref)
    }
}
