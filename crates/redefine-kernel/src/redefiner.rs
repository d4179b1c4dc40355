//! The redefiner builder.
//!
//! Each stage of the chain is its own type, so only the operations legal
//! at that point exist:
//!
//! ```text
//! Redefiner  --save_as-->  Bindings  --let_-->  Let  --be-->  Bound
//!                             ^                                 |  \
//!                             |                               let_  from
//!                             |                                      |
//!                             +------ exports / redefine ------- Origin
//! ```

use crate::error::RedefineError;
use crate::harness::Harness;
use crate::queue::Declaration;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::debug;

/// What a dependency is bound to.
#[derive(Debug, Clone)]
pub enum Substitute {
    /// Passed to the factory as-is.
    Literal(Value),
    /// The saved name of another binding whose exports are used.
    Reference(String),
}

impl Substitute {
    pub fn literal(value: Value) -> Self {
        Self::Literal(value)
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Self::Reference(name.into())
    }

    /// The value as literal exports, whatever form it was given in.
    fn into_literal(self) -> Value {
        match self {
            Self::Literal(value) => value,
            Self::Reference(name) => Value::text(name),
        }
    }

    /// The value as a binding name; literals are string-coerced.
    fn into_reference(self) -> String {
        match self {
            Self::Literal(value) => value.to_string(),
            Self::Reference(name) => name,
        }
    }
}

/// Strings name another binding unless redirected with `from().exports()`.
impl From<&str> for Substitute {
    fn from(name: &str) -> Self {
        Self::Reference(name.to_string())
    }
}

impl From<String> for Substitute {
    fn from(name: String) -> Self {
        Self::Reference(name)
    }
}

impl From<Value> for Substitute {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

/// A claimed declaration and its substitutes.
///
/// A dependency name sits in at most one of `overrides` and `links`.
#[derive(Debug)]
pub(crate) struct Binding {
    name: String,
    index: usize,
    declaration: Rc<Declaration>,
    overrides: BTreeMap<String, Value>,
    links: BTreeMap<String, String>,
}

pub(crate) type BindingCell = Rc<RefCell<Binding>>;

impl Binding {
    pub(crate) fn new(name: String, index: usize, declaration: Rc<Declaration>) -> Self {
        Self {
            name,
            index,
            declaration,
            overrides: BTreeMap::new(),
            links: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of the claimed declaration in the queue.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn declaration(&self) -> &Rc<Declaration> {
        &self.declaration
    }

    pub fn overrides(&self) -> &BTreeMap<String, Value> {
        &self.overrides
    }

    pub fn links(&self) -> &BTreeMap<String, String> {
        &self.links
    }

    fn set_override(&mut self, dependency: &str, value: Value) {
        self.links.remove(dependency);
        self.overrides.insert(dependency.to_string(), value);
    }

    fn set_link(&mut self, dependency: &str, target: String) {
        self.overrides.remove(dependency);
        self.links.insert(dependency.to_string(), target);
    }

    fn apply(&mut self, dependency: &str, substitute: Substitute) {
        match substitute {
            Substitute::Literal(value) => self.set_override(dependency, value),
            Substitute::Reference(target) => self.set_link(dependency, target),
        }
    }
}

/// An unclaimed redefiner, as returned by [`Harness::redefine`].
#[must_use = "a redefiner does nothing until saved"]
pub struct Redefiner<'h> {
    harness: &'h Harness,
}

impl<'h> Redefiner<'h> {
    pub(crate) fn new(harness: &'h Harness) -> Self {
        Self { harness }
    }

    /// Claim the earliest unclaimed declaration under `name`.
    pub fn save_as(self, name: impl Into<String>) -> Result<Bindings, RedefineError> {
        let binding = self.harness.claim(name.into())?;
        Ok(Bindings { binding })
    }
}

/// A claimed redefiner between substitutions.
pub struct Bindings {
    binding: BindingCell,
}

impl Bindings {
    /// Start binding `dependency`, as named in the declaration.
    pub fn let_(self, dependency: impl Into<String>) -> Let {
        Let {
            binding: self.binding,
            dependency: dependency.into(),
        }
    }

    pub fn name(&self) -> String {
        self.binding.borrow().name().to_string()
    }
}

/// Awaiting the substitute for one dependency.
#[must_use = "let_ must be followed by be"]
pub struct Let {
    binding: BindingCell,
    dependency: String,
}

impl Let {
    /// Bind the dependency. Strings become references to another binding;
    /// values become literal overrides.
    pub fn be(self, substitute: impl Into<Substitute>) -> Bound {
        let substitute = substitute.into();
        {
            let mut binding = self.binding.borrow_mut();
            debug!(
                binding = binding.name(),
                dependency = %self.dependency,
                ?substitute,
                "bind dependency"
            );
            binding.apply(&self.dependency, substitute.clone());
        }
        Bound {
            binding: self.binding,
            dependency: self.dependency,
            substitute,
        }
    }
}

/// A dependency was just bound; its origin may still be redirected.
pub struct Bound {
    binding: BindingCell,
    dependency: String,
    substitute: Substitute,
}

impl Bound {
    pub fn let_(self, dependency: impl Into<String>) -> Let {
        Bindings::from(self).let_(dependency)
    }

    /// Redirect where the just-bound value comes from.
    pub fn from(self) -> Origin {
        Origin { bound: self }
    }

    pub fn name(&self) -> String {
        self.binding.borrow().name().to_string()
    }
}

impl From<Bound> for Bindings {
    fn from(bound: Bound) -> Self {
        Self {
            binding: bound.binding,
        }
    }
}

/// The origin of the just-bound value.
pub struct Origin {
    bound: Bound,
}

impl Origin {
    /// Treat the value as literal exports, even when it is a string.
    pub fn exports(self) -> Bindings {
        let Bound {
            binding,
            dependency,
            substitute,
        } = self.bound;
        binding
            .borrow_mut()
            .set_override(&dependency, substitute.into_literal());
        Bindings { binding }
    }

    /// Treat the value as the saved name of another binding, coercing
    /// non-strings to their string form.
    pub fn redefine(self) -> Bindings {
        let Bound {
            binding,
            dependency,
            substitute,
        } = self.bound;
        binding
            .borrow_mut()
            .set_link(&dependency, substitute.into_reference());
        Bindings { binding }
    }
}
