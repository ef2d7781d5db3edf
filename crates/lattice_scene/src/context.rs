//! # Update Context
//!
//! State handed to every node during an update pass. Nodes read and write
//! attributes through it and record structural edits; the tree shape does
//! not change until the pass completes.

use lattice_core::{Datum, ScopeId, TypeRegistry};

use crate::clock::GameTime;
use crate::error::SceneResult;
use crate::node::SceneTree;
use crate::pending::PendingChild;

/// Where the update pass currently is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldState {
    /// Time for this pass.
    pub game_time: GameTime,
    /// World being updated.
    pub world: ScopeId,
    /// Sector being updated.
    pub sector: Option<ScopeId>,
    /// Entity being updated.
    pub entity: Option<ScopeId>,
    /// Action being updated.
    pub action: Option<ScopeId>,
}

/// Mutable access to the tree for the node being updated.
pub struct UpdateContext<'a> {
    tree: &'a mut SceneTree,
    registry: &'a TypeRegistry,
    state: &'a mut WorldState,
    pending: &'a mut Vec<PendingChild>,
    current: ScopeId,
}

impl<'a> UpdateContext<'a> {
    /// Creates a context positioned at `current`.
    pub fn new(
        tree: &'a mut SceneTree,
        registry: &'a TypeRegistry,
        state: &'a mut WorldState,
        pending: &'a mut Vec<PendingChild>,
        current: ScopeId,
    ) -> Self {
        Self {
            tree,
            registry,
            state,
            pending,
            current,
        }
    }

    /// Scope of the node being updated.
    #[must_use]
    pub fn current(&self) -> ScopeId {
        self.current
    }

    /// The tree.
    #[must_use]
    pub fn tree(&self) -> &SceneTree {
        self.tree
    }

    /// The tree, for attribute writes.
    ///
    /// Structural edits made here are visible immediately. Nodes should
    /// record them with [`enqueue`](Self::enqueue) instead.
    pub fn tree_mut(&mut self) -> &mut SceneTree {
        self.tree
    }

    /// The type registry.
    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        self.registry
    }

    /// Pass-wide state.
    #[must_use]
    pub fn state(&self) -> &WorldState {
        self.state
    }

    /// Pass-wide state, for writing.
    pub fn state_mut(&mut self) -> &mut WorldState {
        self.state
    }

    /// Searches from the current scope upward.
    #[must_use]
    pub fn search(&self, name: &str) -> Option<(ScopeId, &Datum)> {
        self.tree.search(self.current, name)
    }

    /// Searches from the current scope upward, for writing. Stops at a
    /// scope store.
    pub fn search_mut(&mut self, name: &str) -> Option<(ScopeId, &mut Datum)> {
        self.tree.search_mut(self.current, name)
    }

    /// Own attribute of the current scope.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Datum> {
        self.tree.get(self.current)?.find(name)
    }

    /// Records a structural edit to apply after the pass.
    pub fn enqueue(&mut self, change: PendingChild) {
        tracing::trace!("Queued {:?} of {} on {}", change.op, change.child, change.target);
        self.pending.push(change);
    }

    /// Edits recorded so far in this pass.
    #[must_use]
    pub fn pending(&self) -> &[PendingChild] {
        self.pending
    }

    fn child_ids(&self, attribute: &str) -> Vec<ScopeId> {
        self.attribute(attribute)
            .map(|datum| datum.scopes().to_vec())
            .unwrap_or_default()
    }

    /// Updates every child held in `attribute` of the current scope.
    ///
    /// # Errors
    ///
    /// The first error returned by a child.
    pub fn update_children(&mut self, attribute: &str) -> SceneResult<()> {
        for child in self.child_ids(attribute) {
            self.update_node(child)?;
        }
        Ok(())
    }

    /// As [`update_children`](Self::update_children), recording each child
    /// as the current action.
    ///
    /// # Errors
    ///
    /// The first error returned by a child.
    pub fn update_actions(&mut self, attribute: &str) -> SceneResult<()> {
        let previous = self.state.action;
        for child in self.child_ids(attribute) {
            self.state.action = Some(child);
            let result = self.update_node(child);
            if result.is_err() {
                self.state.action = previous;
                return result;
            }
        }
        self.state.action = previous;
        Ok(())
    }

    /// Updates one node. Scopes without a host are skipped.
    ///
    /// The host is checked out of the tree while it runs, so it may freely
    /// borrow the tree through this context.
    ///
    /// # Errors
    ///
    /// `HostUnavailable` if the node is already running, or the node's own
    /// error.
    pub fn update_node(&mut self, id: ScopeId) -> SceneResult<()> {
        if self.tree.type_key(id).is_none() {
            return Ok(());
        }
        let mut host = self.tree.take_host(id)?;
        tracing::trace!("Updating {} ({})", id, host.type_key());

        let previous = std::mem::replace(&mut self.current, id);
        let result = host.update(self);
        self.current = previous;

        self.tree.restore_host(id, host)?;
        result
    }
}
