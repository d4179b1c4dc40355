//! Interception of the host's `define` / `require` entry points.
//!
//! A host exposes its loader through a [`Hooks`] table. Intercepting swaps
//! in a `define` that records into a harness and a `require` that refuses
//! to load anything; [`Interception::restore`] swaps the originals back.
//!
//! `define` takes the named AMD form `define(id, dependencies, factory)`
//! as well as the anonymous one. The installed `define` advertises AMD
//! support through [`Hooks::is_amd`], as loaders do with `define.amd`.

use crate::error::RedefineError;
use crate::harness::Harness;
use crate::queue::Factory;
use crate::value::Value;
use std::rc::{Rc, Weak};
use tracing::{debug, warn};

pub type DefineHook = Rc<dyn Fn(Option<&str>, Option<Vec<String>>, Factory)>;
pub type RequireHook = Rc<dyn Fn(&[String]) -> Result<Vec<Value>, RedefineError>>;

/// The host's current loader entry points.
#[derive(Clone)]
pub struct Hooks {
    define: DefineHook,
    require: RequireHook,
    amd: bool,
}

impl Hooks {
    pub fn new<D, R>(define: D, require: R) -> Self
    where
        D: Fn(Option<&str>, Option<Vec<String>>, Factory) + 'static,
        R: Fn(&[String]) -> Result<Vec<Value>, RedefineError> + 'static,
    {
        Self {
            define: Rc::new(define),
            require: Rc::new(require),
            amd: false,
        }
    }

    /// Mark whether the installed `define` speaks AMD.
    pub fn with_amd(mut self, amd: bool) -> Self {
        self.amd = amd;
        self
    }

    /// Declare a module through whichever `define` is installed. `id` is
    /// the module id of a named declaration.
    pub fn define(&self, id: Option<&str>, dependencies: Option<Vec<String>>, factory: Factory) {
        (self.define)(id, dependencies, factory)
    }

    /// The `define.amd` marker of the installed `define`.
    pub fn is_amd(&self) -> bool {
        self.amd
    }

    /// Load modules through whichever `require` is installed.
    pub fn require(&self, ids: &[String]) -> Result<Vec<Value>, RedefineError> {
        (self.require)(ids)
    }

    /// Whether both entry points are the ones in `other`.
    pub fn same_as(&self, other: &Hooks) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.define), Rc::as_ptr(&other.define))
            && std::ptr::addr_eq(Rc::as_ptr(&self.require), Rc::as_ptr(&other.require))
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("amd", &self.amd)
            .finish_non_exhaustive()
    }
}

/// The originals captured by [`Harness::intercept`].
///
/// Restoring consumes the interception, so it happens at most once.
#[must_use = "dropping an interception leaves the host hooks replaced"]
#[derive(Debug)]
pub struct Interception {
    original: Hooks,
}

impl Interception {
    /// Put the original hooks back.
    pub fn restore(self, hooks: &mut Hooks) {
        *hooks = self.original;
        debug!("restored original define/require hooks");
    }
}

impl Harness {
    /// Replace the host's hooks with recording / refusing ones.
    ///
    /// The installed `define` holds a weak handle; declarations made after
    /// the harness is dropped are discarded with a warning.
    pub fn intercept(self: &Rc<Self>, hooks: &mut Hooks) -> Interception {
        let harness: Weak<Harness> = Rc::downgrade(self);
        let installed = Hooks::new(
            move |id: Option<&str>, dependencies, factory| match harness.upgrade() {
                Some(harness) => {
                    harness.record(id.map(str::to_string), dependencies, factory);
                }
                None => warn!("define called after the harness was dropped; ignoring"),
            },
            |ids: &[String]| {
                Err(RedefineError::DirectLoadDisallowed {
                    requested: ids.to_vec(),
                })
            },
        )
        .with_amd(true);
        let original = std::mem::replace(hooks, installed);
        debug!("intercepted define/require hooks");
        Interception { original }
    }
}
