//! Resolution: turning a saved binding into exports.
//!
//! Resolution is synchronous and depth-first. Links recurse into the linked
//! binding; results are memoized per name so a factory runs at most once.

use crate::error::RedefineError;
use crate::harness::Harness;
use crate::module::{Argument, Invocation, Module, Require};
use crate::queue::{EXPORTS, Factory, MODULE, REQUIRE};
use crate::redefiner::BindingCell;
use crate::value::Value;
use tracing::{debug, trace};

impl Harness {
    /// Exports for `name`, computing them on first request.
    ///
    /// Unlike [`Harness::exports`] this skips the balance check; links use
    /// it to reach sibling bindings.
    pub fn resolve(&self, name: &str) -> Result<Value, RedefineError> {
        let cached = self.state.borrow().registry.cached(name);
        if let Some(exports) = cached {
            trace!(name, "exports cache hit");
            return Ok(exports);
        }

        let binding = self
            .binding(name)
            .ok_or_else(|| RedefineError::UnknownBinding(name.to_string()))?;

        self.state.borrow_mut().registry.enter(name)?;
        let result = self.evaluate(&binding);
        self.state.borrow_mut().registry.leave(name);

        let exports = result?;
        self.state
            .borrow_mut()
            .registry
            .cache(name, exports.clone());
        debug!(name, exports = %exports, "resolved binding");
        Ok(exports)
    }

    fn evaluate(&self, binding: &BindingCell) -> Result<Value, RedefineError> {
        let declaration = binding.borrow().declaration().clone();
        let module = Module::new();
        let require = Require::new(self, binding.clone());

        let mut arguments = Vec::with_capacity(declaration.dependencies().len());
        for dependency in declaration.dependencies() {
            let argument = match dependency.as_str() {
                REQUIRE => Argument::Require(require.clone()),
                MODULE => Argument::Module(module.clone()),
                EXPORTS => Argument::Exports(module.exports()),
                other => Argument::Resolved(require.require(other)?),
            };
            arguments.push(argument);
        }

        match declaration.factory() {
            Factory::Function(factory) => {
                let invocation =
                    Invocation::new(declaration.clone(), module.clone(), require, arguments);
                if let Some(result) = factory(&invocation)? {
                    module.set_exports(result);
                }
            }
            Factory::Static(value) => module.set_exports(value.clone()),
        }

        Ok(module.exports())
    }
}
