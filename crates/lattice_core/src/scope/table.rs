//! # Attribute Table
//!
//! An ordered name → [`Datum`] table. Insertion order is authoritative for
//! positional access; a hash index gives O(1) lookup by name.
//!
//! Tables do not own their nested scopes directly: scope-kind datums hold
//! [`ScopeId`] handles and the owning [`Tree`](super::Tree) manages the
//! children. Structural edits that touch children go through the tree.

use std::collections::HashMap;
use std::ops::Deref;

use crate::datum::{Datum, DatumType};
use crate::error::{CoreError, CoreResult};

use super::ScopeId;

/// Ordered table of named attributes.
#[derive(Debug, Default)]
pub struct Scope {
    entries: Vec<(String, Datum)>,
    index: HashMap<String, usize>,
    parent: Option<ScopeId>,
}

impl Scope {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty table with room for `capacity` attributes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            parent: None,
        }
    }

    pub(crate) fn from_entries(entries: Vec<(String, Datum)>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.clone(), i))
            .collect();
        Self {
            entries,
            index,
            parent: None,
        }
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks for zero attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of attributes that fit without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Ensures room for at least `capacity` attributes in total.
    pub fn reserve(&mut self, capacity: usize) {
        let additional = capacity.saturating_sub(self.entries.len());
        self.entries.reserve(additional);
        self.index.reserve(additional);
    }

    /// Releases unused table capacity.
    pub fn shrink_to_fit(&mut self) {
        self.entries.shrink_to_fit();
        self.index.shrink_to_fit();
    }

    /// The owning scope, if this scope is a child.
    #[must_use]
    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<ScopeId>) {
        self.parent = parent;
    }

    /// Looks up an attribute by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Datum> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    /// Looks up an attribute by name for writing.
    ///
    /// Scope stores are not writable here and come back as `None`; their
    /// children change through the tree.
    #[must_use]
    pub fn find_mut(&mut self, name: &str) -> Option<&mut Datum> {
        let i = *self.index.get(name)?;
        let datum = &mut self.entries[i].1;
        (datum.datum_type() != DatumType::Scope).then_some(datum)
    }

    /// Checks whether an attribute exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Insertion position of an attribute.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Name of the attribute at `index`.
    #[must_use]
    pub fn find_name(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|(name, _)| name.as_str())
    }

    /// Attribute at insertion position `index`.
    ///
    /// # Errors
    ///
    /// `IndexOutOfBounds`.
    pub fn at(&self, index: usize) -> CoreResult<&Datum> {
        let size = self.entries.len();
        self.entries
            .get(index)
            .map(|(_, datum)| datum)
            .ok_or(CoreError::IndexOutOfBounds { index, size })
    }

    /// Attribute at insertion position `index`, for writing.
    ///
    /// # Errors
    ///
    /// `IndexOutOfBounds`, or `ScopeStore` for a scope store.
    pub fn at_mut(&mut self, index: usize) -> CoreResult<&mut Datum> {
        let size = self.entries.len();
        let (_, datum) = self
            .entries
            .get_mut(index)
            .ok_or(CoreError::IndexOutOfBounds { index, size })?;
        writable(datum)
    }

    /// Iterates attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Datum)> {
        self.entries.iter().map(|(name, datum)| (name.as_str(), datum))
    }

    /// Attribute names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Returns the attribute called `name`, appending an empty one if absent.
    ///
    /// # Errors
    ///
    /// `EmptyName`, or `ScopeStore` if `name` holds nested scopes.
    pub fn append(&mut self, name: &str) -> CoreResult<&mut Datum> {
        writable(self.append_raw(name)?)
    }

    /// As [`append`](Self::append), including scope stores.
    pub(crate) fn append_raw(&mut self, name: &str) -> CoreResult<&mut Datum> {
        let i = self.append_index(name)?;
        Ok(&mut self.entries[i].1)
    }

    pub(crate) fn append_index(&mut self, name: &str) -> CoreResult<usize> {
        if name.is_empty() {
            return Err(CoreError::EmptyName);
        }
        if let Some(&i) = self.index.get(name) {
            return Ok(i);
        }
        let i = self.entries.len();
        self.entries.push((name.to_string(), Datum::new()));
        self.index.insert(name.to_string(), i);
        Ok(i)
    }

    /// Checks that `name` can hold nested scopes: absent, untyped, or
    /// already scope-kind.
    pub(crate) fn check_scope_slot(&self, name: &str) -> CoreResult<()> {
        if name.is_empty() {
            return Err(CoreError::EmptyName);
        }
        match self.find(name).map(Datum::datum_type) {
            None | Some(DatumType::Unknown | DatumType::Scope) => Ok(()),
            Some(found) => Err(CoreError::NotAScope {
                name: name.to_string(),
                found,
            }),
        }
    }

    /// Locates a nested scope handle: attribute name and element index.
    #[must_use]
    pub fn find_scope(&self, child: ScopeId) -> Option<(&str, usize)> {
        self.entries.iter().find_map(|(name, datum)| {
            datum
                .scopes()
                .iter()
                .position(|&id| id == child)
                .map(|i| (name.as_str(), i))
        })
    }

    /// Every nested scope handle, in attribute then element order.
    pub fn child_ids(&self) -> impl Iterator<Item = ScopeId> + '_ {
        self.entries
            .iter()
            .flat_map(|(_, datum)| datum.scopes().iter().copied())
    }

    /// Removes `child` from whichever attribute holds it.
    pub(crate) fn detach(&mut self, child: ScopeId) -> bool {
        self.entries
            .iter_mut()
            .any(|(_, datum)| datum.remove_scope(child).is_some())
    }

    pub(crate) fn take_entries(&mut self) -> Vec<(String, Datum)> {
        self.index.clear();
        std::mem::take(&mut self.entries)
    }
}

fn writable(datum: &mut Datum) -> CoreResult<&mut Datum> {
    if datum.datum_type() == DatumType::Scope {
        return Err(CoreError::ScopeStore);
    }
    Ok(datum)
}

/// Write access to a scope owned by a [`Tree`](super::Tree).
///
/// Reads go through [`Deref`] to [`Scope`]. Writes are limited to value
/// attributes; the table itself cannot be replaced.
#[derive(Debug)]
pub struct ScopeMut<'a> {
    scope: &'a mut Scope,
}

impl<'a> ScopeMut<'a> {
    pub(crate) fn new(scope: &'a mut Scope) -> Self {
        Self { scope }
    }

    /// See [`Scope::find_mut`].
    #[must_use]
    pub fn find_mut(&mut self, name: &str) -> Option<&mut Datum> {
        self.scope.find_mut(name)
    }

    /// See [`Scope::at_mut`].
    ///
    /// # Errors
    ///
    /// As [`Scope::at_mut`].
    pub fn at_mut(&mut self, index: usize) -> CoreResult<&mut Datum> {
        self.scope.at_mut(index)
    }

    /// See [`Scope::append`].
    ///
    /// # Errors
    ///
    /// As [`Scope::append`].
    pub fn append(&mut self, name: &str) -> CoreResult<&mut Datum> {
        self.scope.append(name)
    }

    /// See [`Scope::reserve`].
    pub fn reserve(&mut self, capacity: usize) {
        self.scope.reserve(capacity);
    }

    /// See [`Scope::shrink_to_fit`].
    pub fn shrink_to_fit(&mut self) {
        self.scope.shrink_to_fit();
    }

    /// Consumes the guard, keeping the borrow of attribute `name`.
    #[must_use]
    pub fn into_find_mut(self, name: &str) -> Option<&'a mut Datum> {
        self.scope.find_mut(name)
    }
}

impl Deref for ScopeMut<'_> {
    type Target = Scope;

    fn deref(&self) -> &Scope {
        self.scope
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_returns_existing() {
        let mut scope = Scope::new();
        scope.append("Name").unwrap().push_back(String::from("foo")).unwrap();
        let again = scope.append("Name").unwrap();
        assert_eq!(again.get::<String>(0).unwrap(), "foo");
        assert_eq!(scope.len(), 1);
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut scope = Scope::new();
        assert_eq!(scope.append("").unwrap_err(), CoreError::EmptyName);
        assert!(scope.is_empty());
    }

    #[test]
    fn test_positional_access_follows_insertion_order() {
        let mut scope = Scope::with_capacity(4);
        for name in ["c", "a", "b"] {
            scope.append(name).unwrap();
        }
        assert_eq!(scope.find_name(0), Some("c"));
        assert_eq!(scope.position("b"), Some(2));
        assert_eq!(scope.names().collect::<Vec<_>>(), vec!["c", "a", "b"]);
        assert_eq!(
            scope.at(3).unwrap_err(),
            CoreError::IndexOutOfBounds { index: 3, size: 3 }
        );
    }

    #[test]
    fn test_scope_slot_check() {
        let mut scope = Scope::new();
        scope.append("Health").unwrap().push_back(5).unwrap();
        scope.append("Pending").unwrap();

        assert!(scope.check_scope_slot("Children").is_ok());
        assert!(scope.check_scope_slot("Pending").is_ok());
        assert_eq!(
            scope.check_scope_slot("Health"),
            Err(CoreError::NotAScope {
                name: "Health".into(),
                found: DatumType::Integer
            })
        );
    }

    #[test]
    fn test_scope_stores_are_not_writable() {
        let mut scope = Scope::new();
        scope.append_raw("Kids").unwrap().push_scope(ScopeId::new(1, 0)).unwrap();

        assert!(scope.find_mut("Kids").is_none());
        assert_eq!(scope.at_mut(0).unwrap_err(), CoreError::ScopeStore);
        assert_eq!(scope.append("Kids").unwrap_err(), CoreError::ScopeStore);
        assert_eq!(scope.find("Kids").unwrap().scopes(), &[ScopeId::new(1, 0)]);
    }

    #[test]
    fn test_reserve_grows_table_capacity() {
        let mut scope = Scope::new();
        scope.reserve(16);
        assert!(scope.capacity() >= 16);
        scope.shrink_to_fit();
        assert_eq!(scope.capacity(), 0);
    }
}
