//! # Redefine Kernel
//!
//! Dependency substitution for modules declared through an AMD-style
//! `define(dependencies, factory)` call. Declarations are queued without
//! resolving anything; a test then claims each one under a name and binds
//! its dependencies either to literal stand-ins or to the exports of
//! another claimed declaration.
//!
//! This crate is **loader-agnostic**: it never fetches or parses sources,
//! and resolution is synchronous and depth-first.
//!
//! ## Architecture
//!
//! ```text
//! DefinitionQueue     ← declarations, in call order
//!     │
//! Redefiner           ← typed builder: save_as → let_ → be → from
//!     │
//! Registry            ← name → binding, name → memoized exports
//!     │
//! resolve             ← overrides, then links (recursive), then sentinels
//!     │
//! Harness             ← the explicit context tying it together
//! ```
//!
//! ```
//! use redefine_kernel::{Factory, Harness, Value};
//!
//! let harness = Harness::new();
//! harness.define(["greeting"], Factory::function(|call| Ok(call.dependency(0).cloned())));
//! harness
//!     .redefine()
//!     .save_as("greeter")?
//!     .let_("greeting")
//!     .be(Value::text("hello"));
//!
//! assert_eq!(harness.exports("greeter")?.as_str(), Some("hello"));
//! # Ok::<(), redefine_kernel::RedefineError>(())
//! ```

pub mod error;
pub mod harness;
pub mod hooks;
pub mod module;
pub mod queue;
pub mod redefiner;
mod registry;
mod resolve;
pub mod scenario;
pub mod snapshot;
pub mod value;

pub use error::RedefineError;
pub use harness::Harness;
pub use hooks::{Hooks, Interception};
pub use module::{Argument, Invocation, Module, Require};
pub use queue::{
    DEFAULT_DEPENDENCIES, Declaration, DefinitionQueue, EXPORTS, Factory, MODULE, REQUIRE,
};
pub use redefiner::{Bindings, Bound, Let, Origin, Redefiner, Substitute};
pub use scenario::{Scenario, ScenarioError, ScenarioReport};
pub use snapshot::{BindingSnapshot, DebugSnapshot, DeclarationSnapshot, FactoryKind};
pub use value::{ExportsObject, Value};
