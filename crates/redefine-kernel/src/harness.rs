//! The harness: one explicit context holding the queue and the registry.
//!
//! Independent scenarios use independent harnesses; [`Harness::reset`]
//! exists for callers that reuse one.

use crate::error::RedefineError;
use crate::queue::{DefinitionQueue, Factory};
use crate::redefiner::{Binding, BindingCell, Redefiner};
use crate::registry::Registry;
use crate::snapshot::DebugSnapshot;
use crate::value::Value;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

#[derive(Debug, Default)]
pub(crate) struct State {
    pub(crate) queue: DefinitionQueue,
    pub(crate) registry: Registry,
}

/// Queue of intercepted declarations plus the bindings that substitute
/// their dependencies.
#[derive(Debug, Default)]
pub struct Harness {
    pub(crate) state: RefCell<State>,
}

impl Harness {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one declaration. `None` dependencies default to
    /// `require, exports, module`; a module `id` is kept for diagnostics.
    pub fn record(
        &self,
        id: Option<String>,
        dependencies: Option<Vec<String>>,
        factory: Factory,
    ) -> usize {
        let index = self
            .state
            .borrow_mut()
            .queue
            .record(id.clone(), dependencies, factory);
        debug!(index, id = ?id, "recorded declaration");
        index
    }

    /// Record a declaration with an explicit dependency list.
    pub fn define<I, S>(&self, dependencies: I, factory: Factory) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let dependencies = dependencies.into_iter().map(Into::into).collect();
        self.record(None, Some(dependencies), factory)
    }

    /// Record a declaration that omits its dependency list.
    pub fn define_default(&self, factory: Factory) -> usize {
        self.record(None, None, factory)
    }

    /// Start a new, unclaimed redefiner.
    pub fn redefine(&self) -> Redefiner<'_> {
        Redefiner::new(self)
    }

    /// Exports for a saved binding.
    ///
    /// Fails with [`RedefineError::UnbalancedDeclarations`] unless every
    /// declaration has been claimed.
    pub fn exports(&self, name: &str) -> Result<Value, RedefineError> {
        {
            let state = self.state.borrow();
            if !state.queue.is_balanced() {
                return Err(RedefineError::UnbalancedDeclarations {
                    claimed: state.queue.claimed(),
                    declared: state.queue.len(),
                });
            }
        }
        self.resolve(name)
    }

    /// Drop every declaration, binding, and cached export.
    pub fn reset(&self) {
        *self.state.borrow_mut() = State::default();
        debug!("harness reset");
    }

    /// A read-only view of the queue, registry, cache, and claim count.
    pub fn debug(&self) -> DebugSnapshot {
        DebugSnapshot::capture(&self.state.borrow())
    }

    pub fn declared(&self) -> usize {
        self.state.borrow().queue.len()
    }

    pub fn claimed(&self) -> usize {
        self.state.borrow().queue.claimed()
    }

    pub(crate) fn claim(&self, name: String) -> Result<BindingCell, RedefineError> {
        let mut state = self.state.borrow_mut();
        let Some((index, declaration)) = state.queue.claim_next() else {
            return Err(RedefineError::TooManyClaims { name });
        };
        let binding = Rc::new(RefCell::new(Binding::new(name.clone(), index, declaration)));
        if state.registry.register(&name, binding.clone()).is_some() {
            warn!(name = %name, index, "binding name reused; previous binding replaced");
        }
        debug!(name = %name, index, "claimed declaration");
        Ok(binding)
    }

    pub(crate) fn binding(&self, name: &str) -> Option<BindingCell> {
        self.state.borrow().registry.binding(name)
    }
}
