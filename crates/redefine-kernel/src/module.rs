//! What a factory sees when it runs: the module descriptor, the
//! binding-scoped `require`, and the ordered dependency arguments.

use crate::error::RedefineError;
use crate::harness::Harness;
use crate::queue::Declaration;
use crate::redefiner::BindingCell;
use crate::value::Value;
use std::cell::RefCell;
use std::rc::Rc;

pub const MODULE_ID: &str = "#testmodule";
pub const MODULE_URI: &str = "http://example.com";

#[derive(Debug)]
struct ModuleState {
    id: String,
    uri: String,
    exports: RefCell<Value>,
}

/// A fresh module descriptor, created once per resolution.
#[derive(Debug, Clone)]
pub struct Module(Rc<ModuleState>);

impl Module {
    pub(crate) fn new() -> Self {
        Self(Rc::new(ModuleState {
            id: MODULE_ID.to_string(),
            uri: MODULE_URI.to_string(),
            exports: RefCell::new(Value::exports_object()),
        }))
    }

    pub fn id(&self) -> &str {
        &self.0.id
    }

    pub fn uri(&self) -> &str {
        &self.0.uri
    }

    /// The current exports slot.
    pub fn exports(&self) -> Value {
        self.0.exports.borrow().clone()
    }

    /// Replace the exports slot wholesale.
    pub fn set_exports(&self, exports: Value) {
        *self.0.exports.borrow_mut() = exports;
    }
}

/// The resolver handed out through the `require` sentinel.
///
/// It only consults the overrides and links of the binding being resolved;
/// another binding's substitutes are invisible to it.
#[derive(Clone)]
pub struct Require<'a> {
    harness: &'a Harness,
    binding: BindingCell,
}

enum Source {
    Override(Value),
    Link(String),
}

impl<'a> Require<'a> {
    pub(crate) fn new(harness: &'a Harness, binding: BindingCell) -> Self {
        Self { harness, binding }
    }

    /// Resolve one dependency name: override first, then link.
    pub fn require(&self, dependency: &str) -> Result<Value, RedefineError> {
        let source = {
            let binding = self.binding.borrow();
            if let Some(value) = binding.overrides().get(dependency) {
                Source::Override(value.clone())
            } else if let Some(target) = binding.links().get(dependency) {
                Source::Link(target.clone())
            } else {
                return Err(RedefineError::UnresolvedDependency {
                    binding: binding.name().to_string(),
                    dependency: dependency.to_string(),
                });
            }
        };
        match source {
            Source::Override(value) => Ok(value),
            Source::Link(target) => self.harness.resolve(&target),
        }
    }
}

/// One positional factory argument.
#[derive(Clone)]
pub enum Argument<'a> {
    Require(Require<'a>),
    Module(Module),
    Exports(Value),
    Resolved(Value),
}

impl Argument<'_> {
    /// The argument as a plain value: exports slots and resolved
    /// dependencies yield one, `require` and `module` do not.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Exports(value) | Self::Resolved(value) => Some(value),
            Self::Require(_) | Self::Module(_) => None,
        }
    }
}

/// The call frame a function factory is invoked with.
pub struct Invocation<'a> {
    declaration: Rc<Declaration>,
    module: Module,
    require: Require<'a>,
    arguments: Vec<Argument<'a>>,
}

impl<'a> Invocation<'a> {
    pub(crate) fn new(
        declaration: Rc<Declaration>,
        module: Module,
        require: Require<'a>,
        arguments: Vec<Argument<'a>>,
    ) -> Self {
        Self {
            declaration,
            module,
            require,
            arguments,
        }
    }

    /// The module descriptor (the factory's receiver).
    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn require(&self) -> &Require<'a> {
        &self.require
    }

    /// The declared dependency names, parallel to [`Invocation::arguments`].
    pub fn dependency_names(&self) -> &[String] {
        self.declaration.dependencies()
    }

    pub fn arguments(&self) -> &[Argument<'a>] {
        &self.arguments
    }

    /// The plain value at `index`, if that position carries one.
    pub fn dependency(&self, index: usize) -> Option<&Value> {
        self.arguments.get(index).and_then(Argument::value)
    }

    /// Like [`Invocation::dependency`] but reports a factory failure when absent.
    pub fn expect_dependency(&self, index: usize) -> Result<&Value, RedefineError> {
        self.dependency(index).ok_or_else(|| {
            RedefineError::factory(format!("no value dependency at position {index}"))
        })
    }
}
