//! # Scene Nodes
//!
//! Every node in the scene tree is hosted by a [`SceneNode`]: a reflected
//! native object that knows how to copy itself and what to do on update.

use std::any::Any;

use lattice_core::{Datum, Host, Reflect, ScopeId, Tree};

use crate::context::UpdateContext;
use crate::error::SceneResult;

/// Native object behind a scene scope.
pub trait SceneNode: Reflect + Any {
    /// Deep copy, preserving the concrete type.
    fn clone_node(&self) -> Box<dyn SceneNode>;

    /// Runs one update pass for this node.
    ///
    /// # Errors
    ///
    /// Any error aborts the pass.
    fn update(&mut self, ctx: &mut UpdateContext<'_>) -> SceneResult<()>;

    /// Upcast for downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Upcast for downcasting to the concrete type.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl Host for dyn SceneNode {
    fn duplicate(&self) -> Box<Self> {
        self.clone_node()
    }
}

/// Attribute tree whose hosted scopes are scene nodes.
pub type SceneTree = Tree<dyn SceneNode>;

/// Attribute holding a node's name.
pub const NAME: &str = "Name";

/// Reads the first string of a datum, if it holds one.
pub(crate) fn first_string(datum: &Datum) -> Option<String> {
    datum.get::<String>(0).ok()
}

/// Name of a scene scope, read through its `Name` attribute.
#[must_use]
pub fn node_name(tree: &SceneTree, id: ScopeId) -> Option<String> {
    tree.get(id)?.find(NAME).and_then(first_string)
}

/// Borrows the host of `id` as `T`.
#[must_use]
pub fn host_as<T: SceneNode>(tree: &SceneTree, id: ScopeId) -> Option<&T> {
    tree.host(id)?.as_any().downcast_ref::<T>()
}

/// Borrows the host of `id` as `T` for writing.
#[must_use]
pub fn host_as_mut<T: SceneNode>(tree: &mut SceneTree, id: ScopeId) -> Option<&mut T> {
    tree.host_mut(id)?.as_any_mut().downcast_mut::<T>()
}
