//! Structural edits recorded during an update pass.

use lattice_core::ScopeId;

/// What a pending edit does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PendingOp {
    /// Adopt `child` into the target.
    Add,
    /// Orphan `child` from the target and destroy it.
    Remove,
}

/// One deferred structural edit. Edits apply in the order recorded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingChild {
    /// Scope being added or removed.
    pub child: ScopeId,
    /// Operation.
    pub op: PendingOp,
    /// Scope that gains or loses `child`.
    pub target: ScopeId,
    /// Destination attribute for adds.
    pub attribute: Option<String>,
}

impl PendingChild {
    /// Adopt `child` into attribute `attribute` of `target`.
    #[must_use]
    pub fn add(child: ScopeId, target: ScopeId, attribute: impl Into<String>) -> Self {
        Self {
            child,
            op: PendingOp::Add,
            target,
            attribute: Some(attribute.into()),
        }
    }

    /// Orphan `child` from `target`, then destroy it.
    #[must_use]
    pub fn remove(child: ScopeId, target: ScopeId) -> Self {
        Self {
            child,
            op: PendingOp::Remove,
            target,
            attribute: None,
        }
    }
}
