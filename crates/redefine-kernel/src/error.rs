//! Error types for Redefine kernel operations.

/// Errors raised while declaring, claiming, or resolving modules.
///
/// Every error aborts the operation that raised it. State mutated before
/// the failure (a claim already taken, overrides already recorded) is kept.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RedefineError {
    /// A claim was requested but every declaration is already claimed.
    #[error("too many redefine() calls reached when trying to save {name}")]
    TooManyClaims { name: String },

    /// A factory dependency had neither an override nor a link.
    #[error("unresolved dependency: {dependency} (while resolving {binding})")]
    UnresolvedDependency { binding: String, dependency: String },

    /// Exports were requested while some declarations remain unclaimed.
    #[error(
        "redefine() calls do not match define() calls ({claimed} claimed, {declared} declared); not proceeding"
    )]
    UnbalancedDeclarations { claimed: usize, declared: usize },

    /// The host loader was called directly while interception is active.
    #[error(
        "global require should not be used (requested: {}); bind dependencies through redefine() instead",
        .requested.join(", ")
    )]
    DirectLoadDisallowed { requested: Vec<String> },

    /// A chain of links leads back to a binding that is still resolving.
    #[error("cyclic binding: {}", .path.join(" -> "))]
    CyclicBinding { path: Vec<String> },

    /// A name was requested (directly or via a link) that was never saved.
    #[error("unknown binding: {0}")]
    UnknownBinding(String),

    /// A factory reported its own failure.
    #[error("factory failed: {0}")]
    FactoryFailed(String),
}

impl RedefineError {
    /// Build a factory failure from any displayable message.
    pub fn factory(message: impl std::fmt::Display) -> Self {
        Self::FactoryFailed(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cyclic_binding_renders_the_path() {
        let err = RedefineError::CyclicBinding {
            path: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "cyclic binding: a -> b -> a");
    }

    #[test]
    fn direct_load_lists_requested_ids() {
        let err = RedefineError::DirectLoadDisallowed {
            requested: vec!["one/one".into(), "two/two".into()],
        };
        assert!(err.to_string().contains("one/one, two/two"));
    }
}
