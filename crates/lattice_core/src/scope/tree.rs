//! # Scope Tree
//!
//! Generational arena that owns every [`Scope`] and enforces the ownership
//! rules between them:
//! - every scope has at most one parent
//! - a scope can never become its own ancestor
//! - destroying a scope destroys everything it still owns
//!
//! Nodes may carry a host object (see [`Host`]). External attributes of a
//! hosted scope alias the host's fields; the tree remembers those bindings
//! so that [`Tree::clone_scope`] can point the copy at the copied host.

use std::collections::VecDeque;
use std::fmt;

use crate::datum::{Datum, DatumType};
use crate::error::{CoreError, CoreResult};
use crate::reflect::{FieldId, Host, Plain, TypeKey};

use super::{Scope, ScopeId, ScopeMut};

/// An external attribute and the host field it aliases.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Binding {
    pub(crate) attribute: String,
    pub(crate) field: FieldId,
}

enum HostSlot<H: ?Sized> {
    Absent,
    Present(Box<H>),
    CheckedOut,
}

struct Node<H: ?Sized> {
    scope: Scope,
    host: HostSlot<H>,
    type_key: Option<TypeKey>,
    bindings: Vec<Binding>,
}

struct Slot<H: ?Sized> {
    generation: u32,
    node: Option<Node<H>>,
}

/// Arena of scopes, optionally hosted by `H`.
pub struct Tree<H: ?Sized + Host = Plain> {
    slots: Vec<Slot<H>>,
    free: Vec<u32>,
    live: usize,
}

/// Tree of plain scopes without hosts.
pub type ScopeTree = Tree<Plain>;

impl<H: ?Sized + Host> Default for Tree<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ?Sized + Host> fmt::Debug for Tree<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("live", &self.live)
            .field("slots", &self.slots.len())
            .finish()
    }
}

impl<H: ?Sized + Host> Tree<H> {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty tree with room for `capacity` scopes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Number of live scopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Checks for zero live scopes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Handles of every live scope, in slot order.
    pub fn ids(&self) -> impl Iterator<Item = ScopeId> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.node
                .as_ref()
                .map(|_| ScopeId::new(index as u32, slot.generation))
        })
    }

    fn node(&self, id: ScopeId) -> Option<&Node<H>> {
        if id.is_null() {
            return None;
        }
        let slot = self.slots.get(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.node.as_ref()
    }

    fn node_mut(&mut self, id: ScopeId) -> Option<&mut Node<H>> {
        if id.is_null() {
            return None;
        }
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.node.as_mut()
    }

    fn live_node(&self, id: ScopeId) -> CoreResult<&Node<H>> {
        self.node(id).ok_or(CoreError::StaleHandle(id))
    }

    fn live_node_mut(&mut self, id: ScopeId) -> CoreResult<&mut Node<H>> {
        self.node_mut(id).ok_or(CoreError::StaleHandle(id))
    }

    pub(crate) fn insert(
        &mut self,
        scope: Scope,
        host: Option<Box<H>>,
        bindings: Vec<Binding>,
    ) -> ScopeId {
        let type_key = host.as_ref().map(|host| host.type_key());
        let node = Node {
            scope,
            host: host.map_or(HostSlot::Absent, HostSlot::Present),
            type_key,
            bindings,
        };
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            ScopeId::new(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            ScopeId::new(index, 0)
        }
    }

    fn free_subtree(&mut self, root: ScopeId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(slot) = self.slots.get_mut(id.index() as usize) else {
                continue;
            };
            if slot.generation != id.generation() {
                continue;
            }
            if let Some(node) = slot.node.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(id.index());
                self.live -= 1;
                stack.extend(node.scope.child_ids());
            }
        }
    }

    /// Creates an empty parentless scope.
    pub fn create(&mut self) -> ScopeId {
        self.insert(Scope::new(), None, Vec::new())
    }

    /// Creates an empty parentless scope with room for `capacity` attributes.
    pub fn create_with_capacity(&mut self, capacity: usize) -> ScopeId {
        self.insert(Scope::with_capacity(capacity), None, Vec::new())
    }

    /// Creates a parentless scope from `(name, datum)` pairs, in order.
    ///
    /// # Errors
    ///
    /// `EmptyName`, `DuplicateName`, or `ScopeStore` if a datum already holds
    /// nested scopes.
    pub fn create_from<I, S>(&mut self, entries: I) -> CoreResult<ScopeId>
    where
        I: IntoIterator<Item = (S, Datum)>,
        S: Into<String>,
    {
        let mut scope = Scope::new();
        for (name, datum) in entries {
            let name = name.into();
            if !datum.scopes().is_empty() {
                return Err(CoreError::ScopeStore);
            }
            if scope.contains(&name) {
                return Err(CoreError::DuplicateName(name));
            }
            *scope.append(&name)? = datum;
        }
        Ok(self.insert(scope, None, Vec::new()))
    }

    /// Checks whether `id` refers to a live scope.
    #[must_use]
    pub fn contains(&self, id: ScopeId) -> bool {
        self.node(id).is_some()
    }

    /// Borrows a scope.
    #[must_use]
    pub fn get(&self, id: ScopeId) -> Option<&Scope> {
        self.node(id).map(|node| &node.scope)
    }

    /// Borrows a scope for writing its value attributes. Nested scopes
    /// only change through the tree.
    #[must_use]
    pub fn get_mut(&mut self, id: ScopeId) -> Option<ScopeMut<'_>> {
        self.table_mut(id).map(ScopeMut::new)
    }

    fn table_mut(&mut self, id: ScopeId) -> Option<&mut Scope> {
        self.node_mut(id).map(|node| &mut node.scope)
    }

    /// Borrows a live scope.
    ///
    /// # Errors
    ///
    /// `StaleHandle`.
    pub fn scope(&self, id: ScopeId) -> CoreResult<&Scope> {
        self.get(id).ok_or(CoreError::StaleHandle(id))
    }

    /// Borrows a live scope for writing.
    ///
    /// # Errors
    ///
    /// `StaleHandle`.
    pub fn scope_mut(&mut self, id: ScopeId) -> CoreResult<ScopeMut<'_>> {
        self.get_mut(id).ok_or(CoreError::StaleHandle(id))
    }

    fn live_table_mut(&mut self, id: ScopeId) -> CoreResult<&mut Scope> {
        self.table_mut(id).ok_or(CoreError::StaleHandle(id))
    }

    /// The scope's owner.
    #[must_use]
    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.node(id)?.scope.parent()
    }

    /// Registry key of the scope's host, if it has one.
    #[must_use]
    pub fn type_key(&self, id: ScopeId) -> Option<TypeKey> {
        self.node(id)?.type_key
    }

    /// Borrows the scope's host. `None` while it is checked out.
    #[must_use]
    pub fn host(&self, id: ScopeId) -> Option<&H> {
        match &self.node(id)?.host {
            HostSlot::Present(host) => Some(host.as_ref()),
            HostSlot::Absent | HostSlot::CheckedOut => None,
        }
    }

    /// Borrows the scope's host for writing.
    #[must_use]
    pub fn host_mut(&mut self, id: ScopeId) -> Option<&mut H> {
        match &mut self.node_mut(id)?.host {
            HostSlot::Present(host) => Some(host.as_mut()),
            HostSlot::Absent | HostSlot::CheckedOut => None,
        }
    }

    /// Checks a host out so it can run with mutable access to the tree.
    ///
    /// # Errors
    ///
    /// `StaleHandle`, or `HostUnavailable` if the scope has no host or it is
    /// already checked out.
    pub fn take_host(&mut self, id: ScopeId) -> CoreResult<Box<H>> {
        let node = self.live_node_mut(id)?;
        match std::mem::replace(&mut node.host, HostSlot::CheckedOut) {
            HostSlot::Present(host) => Ok(host),
            other => {
                node.host = other;
                Err(CoreError::HostUnavailable(id))
            }
        }
    }

    /// Returns a host taken with [`take_host`](Self::take_host).
    ///
    /// # Errors
    ///
    /// `StaleHandle` if the scope was destroyed meanwhile (the host is
    /// dropped), `HostUnavailable` if the host was not checked out.
    pub fn restore_host(&mut self, id: ScopeId, host: Box<H>) -> CoreResult<()> {
        let node = self.live_node_mut(id)?;
        if !matches!(node.host, HostSlot::CheckedOut) {
            return Err(CoreError::HostUnavailable(id));
        }
        node.host = HostSlot::Present(host);
        Ok(())
    }

    /// Returns the attribute called `name` on `id`, appending it if absent.
    ///
    /// # Errors
    ///
    /// `StaleHandle`, `EmptyName`, or `ScopeStore` if `name` holds nested
    /// scopes.
    pub fn append(&mut self, id: ScopeId, name: &str) -> CoreResult<&mut Datum> {
        self.live_table_mut(id)?.append(name)
    }

    /// Creates a new child scope under attribute `name` of `parent`.
    ///
    /// Calling it again with the same name adds another child to the same
    /// attribute.
    ///
    /// # Errors
    ///
    /// `StaleHandle`, `EmptyName`, or `NotAScope` when `name` holds another
    /// kind.
    pub fn append_scope(&mut self, parent: ScopeId, name: &str) -> CoreResult<ScopeId> {
        self.append_scope_with_capacity(parent, name, 0)
    }

    /// As [`append_scope`](Self::append_scope), reserving room for
    /// `capacity` attributes in the new child.
    ///
    /// # Errors
    ///
    /// As [`append_scope`](Self::append_scope).
    pub fn append_scope_with_capacity(
        &mut self,
        parent: ScopeId,
        name: &str,
        capacity: usize,
    ) -> CoreResult<ScopeId> {
        self.scope(parent)?.check_scope_slot(name)?;
        let child = self.create_with_capacity(capacity);
        if let Err(error) = self.attach(parent, child, name) {
            self.free_subtree(child);
            return Err(error);
        }
        Ok(child)
    }

    fn attach(&mut self, parent: ScopeId, child: ScopeId, name: &str) -> CoreResult<()> {
        self.live_table_mut(parent)?.append_raw(name)?.push_scope(child)?;
        self.live_table_mut(child)?.set_parent(Some(parent));
        Ok(())
    }

    /// Moves `child` under attribute `name` of `parent`, detaching it from
    /// its previous owner first.
    ///
    /// # Errors
    ///
    /// `StaleHandle`, `EmptyName`, `NotAScope`, or `CycleDetected` when
    /// `child` is `parent` or one of its ancestors. Nothing changes on error.
    pub fn adopt(&mut self, parent: ScopeId, child: ScopeId, name: &str) -> CoreResult<()> {
        self.live_node(child)?;
        self.scope(parent)?.check_scope_slot(name)?;
        if parent == child || self.is_ancestor_of(child, parent) {
            return Err(CoreError::CycleDetected { parent, child });
        }
        if let Some(previous) = self.parent(child) {
            if let Some(owner) = self.table_mut(previous) {
                owner.detach(child);
            }
        }
        tracing::debug!("Adopting {} into {}.{}", child, parent, name);
        self.attach(parent, child, name)
    }

    /// Detaches `child` from `parent` without destroying it.
    ///
    /// Returns `None` if `parent` does not own `child`.
    pub fn orphan(&mut self, parent: ScopeId, child: ScopeId) -> Option<ScopeId> {
        if self.parent(child)? != parent {
            return None;
        }
        if !self.table_mut(parent)?.detach(child) {
            return None;
        }
        self.table_mut(child)?.set_parent(None);
        tracing::debug!("Orphaned {} from {}", child, parent);
        Some(child)
    }

    /// Destroys a scope and everything it owns, detaching it from its parent.
    ///
    /// # Errors
    ///
    /// `StaleHandle`.
    pub fn destroy(&mut self, id: ScopeId) -> CoreResult<()> {
        if let Some(parent) = self.live_node(id)?.scope.parent() {
            if let Some(owner) = self.table_mut(parent) {
                owner.detach(id);
            }
        }
        let before = self.live;
        self.free_subtree(id);
        tracing::debug!("Destroyed {} ({} scopes)", id, before - self.live);
        Ok(())
    }

    /// Removes every attribute of `id` and destroys its children.
    ///
    /// # Errors
    ///
    /// `StaleHandle`.
    pub fn clear(&mut self, id: ScopeId) -> CoreResult<()> {
        let children = self.children(id)?;
        for child in children {
            self.free_subtree(child);
        }
        let node = self.live_node_mut(id)?;
        node.scope.take_entries();
        node.bindings.clear();
        Ok(())
    }

    /// Direct children of `id`, in attribute then element order.
    ///
    /// # Errors
    ///
    /// `StaleHandle`.
    pub fn children(&self, id: ScopeId) -> CoreResult<Vec<ScopeId>> {
        Ok(self.scope(id)?.child_ids().collect())
    }

    /// Locates `child` inside `parent`: attribute name and element index.
    #[must_use]
    pub fn find_scope(&self, parent: ScopeId, child: ScopeId) -> Option<(&str, usize)> {
        self.get(parent)?.find_scope(child)
    }

    /// Checks whether `ancestor` owns `descendant`, directly or transitively.
    #[must_use]
    pub fn is_ancestor_of(&self, ancestor: ScopeId, descendant: ScopeId) -> bool {
        let mut current = self.parent(descendant);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Checks whether `descendant` is owned by `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: ScopeId, ancestor: ScopeId) -> bool {
        self.is_ancestor_of(ancestor, descendant)
    }

    /// Looks for `name` in `id`, then its parent, then further up.
    ///
    /// Returns the owning scope and the attribute.
    #[must_use]
    pub fn search(&self, id: ScopeId, name: &str) -> Option<(ScopeId, &Datum)> {
        let mut current = Some(id);
        while let Some(scope_id) = current {
            let scope = self.get(scope_id)?;
            if let Some(datum) = scope.find(name) {
                return Some((scope_id, datum));
            }
            current = scope.parent();
        }
        None
    }

    /// As [`search`](Self::search), for writing. A scope store found first
    /// ends the search with `None`.
    #[must_use]
    pub fn search_mut(&mut self, id: ScopeId, name: &str) -> Option<(ScopeId, &mut Datum)> {
        let (owner, _) = self.search(id, name)?;
        let datum = self.table_mut(owner)?.find_mut(name)?;
        Some((owner, datum))
    }

    /// Breadth-first search for `name` over `id` and its descendants.
    #[must_use]
    pub fn search_children(&self, id: ScopeId, name: &str) -> Option<(ScopeId, &Datum)> {
        let owner = self.search_children_owner(id, name)?;
        Some((owner, self.get(owner)?.find(name)?))
    }

    /// As [`search_children`](Self::search_children), for writing. A scope
    /// store found first ends the search with `None`.
    #[must_use]
    pub fn search_children_mut(
        &mut self,
        id: ScopeId,
        name: &str,
    ) -> Option<(ScopeId, &mut Datum)> {
        let owner = self.search_children_owner(id, name)?;
        Some((owner, self.table_mut(owner)?.find_mut(name)?))
    }

    fn search_children_owner(&self, id: ScopeId, name: &str) -> Option<ScopeId> {
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            let Some(scope) = self.get(current) else {
                continue;
            };
            if scope.contains(name) {
                return Some(current);
            }
            queue.extend(scope.child_ids());
        }
        None
    }

    /// Deep structural equality: same attribute names in the same order, equal
    /// values, and recursively equal nested scopes.
    #[must_use]
    pub fn scopes_equal(&self, a: ScopeId, b: ScopeId) -> bool {
        let (Some(left), Some(right)) = (self.get(a), self.get(b)) else {
            return false;
        };
        left.len() == right.len()
            && left
                .iter()
                .zip(right.iter())
                .all(|((left_name, left_datum), (right_name, right_datum))| {
                    left_name == right_name && self.datums_equal(left_datum, right_datum)
                })
    }

    fn datums_equal(&self, left: &Datum, right: &Datum) -> bool {
        if left.datum_type() == DatumType::Scope && right.datum_type() == DatumType::Scope {
            left.len() == right.len()
                && left
                    .scopes()
                    .iter()
                    .zip(right.scopes())
                    .all(|(&l, &r)| self.scopes_equal(l, r))
        } else {
            left == right
        }
    }

    /// Deep-copies `id` and its subtree into a new parentless scope.
    ///
    /// Hosts are duplicated and every external attribute of the copy aliases
    /// the copied host, never the original.
    ///
    /// # Errors
    ///
    /// `StaleHandle`, `HostUnavailable` if a host in the subtree is checked
    /// out, or `MissingField` if a duplicated host lacks a bound field.
    pub fn clone_scope(&mut self, id: ScopeId) -> CoreResult<ScopeId> {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = self.live_node(current)?;
            if matches!(node.host, HostSlot::CheckedOut) {
                return Err(CoreError::HostUnavailable(current));
            }
            stack.extend(node.scope.child_ids());
        }
        let copy = self.clone_subtree(id)?;
        tracing::debug!("Cloned {} as {}", id, copy);
        Ok(copy)
    }

    fn clone_subtree(&mut self, id: ScopeId) -> CoreResult<ScopeId> {
        let node = self.live_node(id)?;
        let host = match &node.host {
            HostSlot::Present(host) => Some(host.duplicate()),
            HostSlot::Absent | HostSlot::CheckedOut => None,
        };
        let bindings = node.bindings.clone();

        let mut entries = Vec::with_capacity(node.scope.len());
        let mut nested = Vec::new();
        for (name, datum) in node.scope.iter() {
            if datum.datum_type() == DatumType::Scope {
                let mut slot = Datum::with_type(DatumType::Scope);
                slot.reserve(datum.capacity())?;
                entries.push((name.to_string(), slot));
                nested.push((name.to_string(), datum.scopes().to_vec()));
            } else {
                entries.push((name.to_string(), datum.clone()));
            }
        }

        let mut scope = Scope::from_entries(entries);
        if let Some(host) = &host {
            for binding in &bindings {
                let field = host.field(binding.field).ok_or_else(|| CoreError::MissingField {
                    type_key: host.type_key(),
                    field: binding.field,
                    attribute: binding.attribute.clone(),
                })?;
                if let Some(datum) = scope.find_mut(&binding.attribute) {
                    let len = datum.len();
                    datum.set_external(field)?;
                    datum.resize(len)?;
                }
            }
        }

        let copy = self.insert(scope, host, bindings);
        for (name, children) in nested {
            for child in children {
                let attached = self
                    .clone_subtree(child)
                    .and_then(|cloned| self.attach(copy, cloned, &name));
                if let Err(error) = attached {
                    self.free_subtree(copy);
                    return Err(error);
                }
            }
        }
        Ok(copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_levels(tree: &mut ScopeTree) -> (ScopeId, ScopeId, ScopeId) {
        let root = tree.create();
        let middle = tree.append_scope(root, "Children").unwrap();
        let leaf = tree.append_scope(middle, "Children").unwrap();
        (root, middle, leaf)
    }

    #[test]
    fn test_append_scope_twice_shares_attribute() {
        let mut tree = ScopeTree::new();
        let root = tree.create();
        let first = tree.append_scope(root, "Children").unwrap();
        let second = tree.append_scope(root, "Children").unwrap();

        assert_ne!(first, second);
        let scope = tree.scope(root).unwrap();
        assert_eq!(scope.len(), 1);
        assert_eq!(scope.find("Children").unwrap().len(), 2);
        assert_eq!(tree.parent(second), Some(root));
    }

    #[test]
    fn test_append_scope_with_capacity() {
        let mut tree = ScopeTree::new();
        let root = tree.create();
        let child = tree.append_scope_with_capacity(root, "Children", 8).unwrap();

        assert!(tree.scope(child).unwrap().capacity() >= 8);
        assert!(tree.scope(child).unwrap().is_empty());
    }

    #[test]
    fn test_append_scope_over_other_kind_fails() {
        let mut tree = ScopeTree::new();
        let root = tree.create();
        tree.append(root, "Health").unwrap().push_back(10).unwrap();

        assert!(matches!(
            tree.append_scope(root, "Health"),
            Err(CoreError::NotAScope { .. })
        ));
        assert_eq!(tree.append_scope(root, ""), Err(CoreError::EmptyName));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_adopt_rejects_cycles_at_any_depth() {
        let mut tree = ScopeTree::new();
        let (root, middle, leaf) = three_levels(&mut tree);

        for (parent, child) in [(leaf, root), (leaf, middle), (middle, root), (root, root)] {
            assert_eq!(
                tree.adopt(parent, child, "Loop"),
                Err(CoreError::CycleDetected { parent, child })
            );
        }
        assert!(tree.scope(leaf).unwrap().is_empty());
        assert_eq!(tree.parent(middle), Some(root));
    }

    #[test]
    fn test_adopt_moves_between_owners() {
        let mut tree = ScopeTree::new();
        let (root, middle, leaf) = three_levels(&mut tree);

        tree.adopt(root, leaf, "Moved").unwrap();
        assert_eq!(tree.parent(leaf), Some(root));
        assert!(tree.children(middle).unwrap().is_empty());
        assert_eq!(tree.find_scope(root, leaf), Some(("Moved", 0)));
    }

    #[test]
    fn test_orphan_only_from_owner() {
        let mut tree = ScopeTree::new();
        let (root, middle, leaf) = three_levels(&mut tree);

        assert_eq!(tree.orphan(root, leaf), None);
        assert_eq!(tree.orphan(middle, leaf), Some(leaf));
        assert_eq!(tree.parent(leaf), None);
        assert!(tree.contains(leaf));
        assert_eq!(tree.find_scope(middle, leaf), None);
    }

    #[test]
    fn test_destroy_is_recursive_and_invalidates_handles() {
        let mut tree = ScopeTree::new();
        let (root, middle, leaf) = three_levels(&mut tree);

        tree.destroy(middle).unwrap();
        assert_eq!(tree.len(), 1);
        assert!(!tree.contains(middle));
        assert!(!tree.contains(leaf));
        assert!(tree.children(root).unwrap().is_empty());
        assert_eq!(tree.destroy(middle), Err(CoreError::StaleHandle(middle)));

        let reused = tree.create();
        assert_eq!(reused.index(), leaf.index());
        assert_eq!(reused.generation(), leaf.generation() + 1);
        assert!(!tree.contains(leaf));
    }

    #[test]
    fn test_search_walks_up_not_sideways() {
        let mut tree = ScopeTree::new();
        let (root, middle, leaf) = three_levels(&mut tree);
        let sibling = tree.append_scope(root, "Children").unwrap();
        tree.append(root, "Gravity").unwrap().push_back(9.8_f32).unwrap();
        tree.append(sibling, "Secret").unwrap().push_back(1).unwrap();

        let (owner, datum) = tree.search(leaf, "Gravity").unwrap();
        assert_eq!(owner, root);
        assert_eq!(datum.get::<f32>(0).unwrap(), 9.8);
        assert!(tree.search(leaf, "Secret").is_none());

        let (_, gravity) = tree.search_mut(middle, "Gravity").unwrap();
        gravity.set(0, 1.6_f32).unwrap();
        assert_eq!(tree.scope(root).unwrap().find("Gravity").unwrap().get::<f32>(0).unwrap(), 1.6);
    }

    #[test]
    fn test_search_children_is_breadth_first() {
        let mut tree = ScopeTree::new();
        let (root, middle, leaf) = three_levels(&mut tree);
        let sibling = tree.append_scope(root, "Children").unwrap();
        tree.append(leaf, "Tag").unwrap().push_back(1).unwrap();
        tree.append(sibling, "Tag").unwrap().push_back(2).unwrap();

        let (owner, datum) = tree.search_children(root, "Tag").unwrap();
        assert_eq!(owner, sibling);
        assert_eq!(datum.get::<i32>(0).unwrap(), 2);
        assert!(tree.search_children(leaf, "Missing").is_none());
        assert_eq!(tree.search_children(middle, "Tag").unwrap().0, leaf);
    }

    #[test]
    fn test_clone_scope_is_deep_and_equal() {
        let mut tree = ScopeTree::new();
        let (root, _, leaf) = three_levels(&mut tree);
        tree.append(leaf, "Value").unwrap().push_back(3).unwrap();

        let copy = tree.clone_scope(root).unwrap();
        assert!(tree.scopes_equal(root, copy));
        assert_eq!(tree.len(), 6);
        assert_eq!(tree.parent(copy), None);

        let copied_leaf = tree.children(tree.children(copy).unwrap()[0]).unwrap()[0];
        assert_ne!(copied_leaf, leaf);
        tree.scope_mut(copied_leaf)
            .unwrap()
            .find_mut("Value")
            .unwrap()
            .set(0, 4)
            .unwrap();
        assert!(!tree.scopes_equal(root, copy));
    }

    #[test]
    fn test_create_from_rejects_duplicates() {
        let mut tree = ScopeTree::new();
        let result = tree.create_from([("a", Datum::from(1)), ("a", Datum::from(2))]);
        assert_eq!(result, Err(CoreError::DuplicateName("a".into())));
        assert!(tree.is_empty());

        let id = tree
            .create_from([("Name", Datum::from("foo")), ("Speed", Datum::from(2.0_f32))])
            .unwrap();
        assert_eq!(tree.scope(id).unwrap().find_name(1), Some("Speed"));
    }

    #[test]
    fn test_clear_destroys_children() {
        let mut tree = ScopeTree::new();
        let (root, middle, _) = three_levels(&mut tree);
        tree.append(root, "x").unwrap();

        tree.clear(root).unwrap();
        assert!(tree.scope(root).unwrap().is_empty());
        assert!(!tree.contains(middle));
        assert_eq!(tree.len(), 1);
    }
}
