//! # Datum
//!
//! A dynamically typed, homogeneous array of values. The kind is fixed on
//! first use and never changes afterwards. Storage is either owned by the
//! datum or an alias of a host [`Field`], in which case the capacity is the
//! field length and cannot change.
//!
//! ## Example
//!
//! ```
//! use lattice_core::datum::{Datum, DatumType};
//!
//! let mut health = Datum::new();
//! health.push_back(100_i32).unwrap();
//! assert_eq!(health.datum_type(), DatumType::Integer);
//! assert!(health.push_back(1.5_f32).is_err());
//! ```

mod field;
mod kind;
mod storage;

pub use field::{ExternalField, Field};
pub use kind::{DatumRef, DatumType, Element, Opaque};

use lattice_shared::{Mat4, Vec4};

use crate::error::{CoreError, CoreResult};
use crate::scope::ScopeId;
use storage::Buffer;

/// Computes the next capacity when an owned store is full.
///
/// Receives the current size and capacity. Results not larger than the
/// current capacity are raised to `capacity + 1`.
pub type ReserveStrategy = fn(usize, usize) -> usize;

/// Grows by half, and always by at least one.
#[must_use]
pub fn default_reserve_strategy(_size: usize, capacity: usize) -> usize {
    (capacity + capacity / 2).max(capacity + 1)
}

/// Dispatches on a kind with `$T` aliased to the matching element type.
macro_rules! by_kind {
    ($kind:expr, $T:ident => $body:expr, scope => $scope:expr, unknown => $unknown:expr) => {
        match $kind {
            DatumType::Unknown => $unknown,
            DatumType::Integer => {
                type $T = i32;
                $body
            }
            DatumType::Float => {
                type $T = f32;
                $body
            }
            DatumType::Vector => {
                type $T = Vec4;
                $body
            }
            DatumType::Matrix => {
                type $T = Mat4;
                $body
            }
            DatumType::String => {
                type $T = String;
                $body
            }
            DatumType::Pointer => {
                type $T = Opaque;
                $body
            }
            DatumType::Reference => {
                type $T = DatumRef;
                $body
            }
            DatumType::Scope => $scope,
        }
    };
}

#[derive(Clone, Debug)]
enum Storage {
    Owned { buffer: Buffer, capacity: usize },
    External { field: ExternalField, len: usize },
}

/// A typed array of values, owned or aliased.
///
/// Cloning an owned datum copies its values; cloning an external datum
/// yields another alias of the same host field. Scope handles have a single
/// owner, so cloning a scope store yields an empty scope store.
#[derive(Debug)]
pub struct Datum {
    storage: Storage,
    strategy: ReserveStrategy,
}

impl Default for Datum {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Datum {
    fn clone(&self) -> Self {
        let storage = match &self.storage {
            Storage::Owned {
                buffer: Buffer::Scope(_),
                ..
            } => Storage::Owned {
                buffer: Buffer::empty(DatumType::Scope),
                capacity: 0,
            },
            other => other.clone(),
        };
        Self {
            storage,
            strategy: self.strategy,
        }
    }
}

fn push_owned<T>(values: &mut Vec<T>, capacity: &mut usize, strategy: ReserveStrategy, value: T) {
    if values.len() >= *capacity {
        let grown = strategy(values.len(), *capacity).max(*capacity + 1);
        values.reserve_exact(grown - values.len());
        *capacity = grown;
    }
    values.push(value);
}

impl Datum {
    /// Creates an empty, untyped, owned datum.
    #[must_use]
    pub fn new() -> Self {
        Self {
            storage: Storage::Owned {
                buffer: Buffer::Unknown,
                capacity: 0,
            },
            strategy: default_reserve_strategy,
        }
    }

    /// Creates an empty owned datum of a fixed kind.
    #[must_use]
    pub fn with_type(kind: DatumType) -> Self {
        Self {
            storage: Storage::Owned {
                buffer: Buffer::empty(kind),
                capacity: 0,
            },
            strategy: default_reserve_strategy,
        }
    }

    /// Creates a single-element datum.
    #[must_use]
    pub fn from_value<T: Element>(value: T) -> Self {
        Self::from_values(vec![value])
    }

    /// Creates a datum holding `values`, with capacity equal to their count.
    #[must_use]
    pub fn from_values<T: Element>(values: Vec<T>) -> Self {
        let capacity = values.len();
        Self {
            storage: Storage::Owned {
                buffer: T::wrap_owned(values),
                capacity,
            },
            strategy: default_reserve_strategy,
        }
    }

    /// Creates a datum aliasing a host field.
    #[must_use]
    pub fn external(field: ExternalField) -> Self {
        Self {
            storage: Storage::External {
                len: field.len(),
                field,
            },
            strategy: default_reserve_strategy,
        }
    }

    /// The fixed kind, or `Unknown`.
    #[must_use]
    pub fn datum_type(&self) -> DatumType {
        match &self.storage {
            Storage::Owned { buffer, .. } => buffer.datum_type(),
            Storage::External { field, .. } => field.datum_type(),
        }
    }

    /// Number of elements in use.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.storage {
            Storage::Owned { buffer, .. } => buffer.len(),
            Storage::External { len, .. } => *len,
        }
    }

    /// Checks for zero elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of elements that fit without growing.
    #[must_use]
    pub fn capacity(&self) -> usize {
        match &self.storage {
            Storage::Owned { capacity, .. } => *capacity,
            Storage::External { field, .. } => field.len(),
        }
    }

    /// Checks whether storage aliases a host field.
    #[must_use]
    pub fn is_external(&self) -> bool {
        matches!(self.storage, Storage::External { .. })
    }

    /// The aliased host field, if any.
    #[must_use]
    pub fn external_field(&self) -> Option<&ExternalField> {
        match &self.storage {
            Storage::External { field, .. } => Some(field),
            Storage::Owned { .. } => None,
        }
    }

    /// Replaces the growth policy for owned storage.
    pub fn set_reserve_strategy(&mut self, strategy: ReserveStrategy) {
        self.strategy = strategy;
    }

    fn mismatch(&self, expected: DatumType) -> CoreError {
        CoreError::TypeMismatch {
            expected,
            found: self.datum_type(),
        }
    }

    fn ensure_type(&mut self, kind: DatumType) -> CoreResult<()> {
        match self.datum_type() {
            DatumType::Unknown => self.set_type(kind),
            current if current == kind => Ok(()),
            _ => Err(self.mismatch(kind)),
        }
    }

    fn bounds(&self, index: usize) -> CoreResult<()> {
        let size = self.len();
        if index < size {
            Ok(())
        } else {
            Err(CoreError::IndexOutOfBounds { index, size })
        }
    }

    fn slice<T: Element, R>(&self, f: impl FnOnce(&[T]) -> R) -> CoreResult<R> {
        match &self.storage {
            Storage::Owned { buffer, .. } => match T::owned(buffer) {
                Some(values) => Ok(f(values)),
                None => Err(self.mismatch(T::TYPE)),
            },
            Storage::External { field, len } => match T::external(field) {
                Some(cells) => Ok(f(&cells.borrow()[..*len])),
                None => Err(self.mismatch(T::TYPE)),
            },
        }
    }

    fn slice_mut<T: Element, R>(&mut self, f: impl FnOnce(&mut [T]) -> R) -> CoreResult<R> {
        let found = self.datum_type();
        let mismatch = CoreError::TypeMismatch {
            expected: T::TYPE,
            found,
        };
        match &mut self.storage {
            Storage::Owned { buffer, .. } => match T::owned_mut(buffer) {
                Some(values) => Ok(f(values)),
                None => Err(mismatch),
            },
            Storage::External { field, len } => match T::external(field) {
                Some(cells) => Ok(f(&mut cells.borrow_mut()[..*len])),
                None => Err(mismatch),
            },
        }
    }

    /// Fixes the kind of an untyped datum.
    ///
    /// Setting the kind a datum already has is a no-op.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` when the datum already holds a different kind.
    pub fn set_type(&mut self, kind: DatumType) -> CoreResult<()> {
        let current = self.datum_type();
        if current == kind {
            return Ok(());
        }
        if current != DatumType::Unknown {
            return Err(self.mismatch(kind));
        }
        if let Storage::Owned { buffer, capacity } = &mut self.storage {
            *buffer = Buffer::empty(kind);
            buffer.reserve_exact(*capacity);
        }
        Ok(())
    }

    /// Ensures room for at least `capacity` elements. Never shrinks.
    ///
    /// # Errors
    ///
    /// `UnsetType` on an untyped datum; `ExternalCapacity` when an external
    /// datum would have to grow.
    pub fn reserve(&mut self, capacity: usize) -> CoreResult<()> {
        match &mut self.storage {
            Storage::Owned {
                buffer: Buffer::Unknown,
                ..
            } => Err(CoreError::UnsetType),
            Storage::Owned {
                buffer,
                capacity: current,
            } => {
                if capacity > *current {
                    buffer.reserve_exact(capacity - buffer.len());
                    *current = capacity;
                }
                Ok(())
            }
            Storage::External { field, .. } => {
                if capacity > field.len() {
                    Err(CoreError::ExternalCapacity {
                        capacity: field.len(),
                        requested: capacity,
                    })
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Sets the element count, filling new slots with default values.
    ///
    /// Shrinking keeps the capacity. Growing past it raises the capacity to
    /// exactly `size`.
    ///
    /// # Errors
    ///
    /// `UnsetType`, `ScopeStore` for nested scope stores, or
    /// `ExternalCapacity` when an external datum would have to grow.
    pub fn resize(&mut self, size: usize) -> CoreResult<()> {
        match self.datum_type() {
            DatumType::Unknown => return Err(CoreError::UnsetType),
            DatumType::Scope => return Err(CoreError::ScopeStore),
            _ => {}
        }
        match &mut self.storage {
            Storage::Owned { buffer, capacity } => {
                if size > *capacity {
                    buffer.reserve_exact(size - buffer.len());
                    *capacity = size;
                }
                buffer.resize_default(size);
            }
            Storage::External { field, len } => {
                if size > field.len() {
                    return Err(CoreError::ExternalCapacity {
                        capacity: field.len(),
                        requested: size,
                    });
                }
                if size > *len {
                    field.reset_from(*len);
                }
                *len = size;
            }
        }
        Ok(())
    }

    /// Drops unused capacity.
    ///
    /// # Errors
    ///
    /// `UnsetType` on an untyped datum; `ExternalCapacity` when an external
    /// datum is not already full.
    pub fn shrink_to_fit(&mut self) -> CoreResult<()> {
        match &mut self.storage {
            Storage::Owned {
                buffer: Buffer::Unknown,
                ..
            } => Err(CoreError::UnsetType),
            Storage::Owned { buffer, capacity } => {
                buffer.shrink_to_fit();
                *capacity = buffer.len();
                Ok(())
            }
            Storage::External { field, len } => {
                if *len == field.len() {
                    Ok(())
                } else {
                    Err(CoreError::ExternalCapacity {
                        capacity: field.len(),
                        requested: *len,
                    })
                }
            }
        }
    }

    /// Removes every element, keeping kind and capacity.
    ///
    /// # Errors
    ///
    /// `ScopeStore` for nested scope stores; clear those through the tree.
    pub fn clear(&mut self) -> CoreResult<()> {
        if self.datum_type() == DatumType::Scope {
            return Err(CoreError::ScopeStore);
        }
        match &mut self.storage {
            Storage::Owned { buffer, .. } => buffer.truncate(0),
            Storage::External { len, .. } => *len = 0,
        }
        Ok(())
    }

    /// Appends a value, fixing the kind if unset.
    ///
    /// # Errors
    ///
    /// `TypeMismatch`, or `ExternalCapacity` when an external datum is full.
    pub fn push_back<T: Element>(&mut self, value: T) -> CoreResult<()> {
        self.ensure_type(T::TYPE)?;
        let found = self.datum_type();
        let strategy = self.strategy;
        match &mut self.storage {
            Storage::Owned { buffer, capacity } => {
                let values = T::owned_mut(buffer).ok_or(CoreError::TypeMismatch {
                    expected: T::TYPE,
                    found,
                })?;
                push_owned(values, capacity, strategy, value);
            }
            Storage::External { field, len } => {
                let cells = T::external(field).ok_or(CoreError::TypeMismatch {
                    expected: T::TYPE,
                    found,
                })?;
                if *len >= cells.len() {
                    return Err(CoreError::ExternalCapacity {
                        capacity: cells.len(),
                        requested: *len + 1,
                    });
                }
                cells.borrow_mut()[*len] = value;
                *len += 1;
            }
        }
        Ok(())
    }

    /// Removes the last element. Returns `false` on an empty datum.
    ///
    /// # Errors
    ///
    /// `ScopeStore` for nested scope stores.
    pub fn pop_back(&mut self) -> CoreResult<bool> {
        if self.datum_type() == DatumType::Scope {
            return Err(CoreError::ScopeStore);
        }
        let size = self.len();
        if size == 0 {
            return Ok(false);
        }
        match &mut self.storage {
            Storage::Owned { buffer, .. } => buffer.truncate(size - 1),
            Storage::External { field, len } => {
                field.reset_from(size - 1);
                *len -= 1;
            }
        }
        Ok(true)
    }

    /// Reads element `index`.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` or `IndexOutOfBounds`.
    pub fn get<T: Element>(&self, index: usize) -> CoreResult<T> {
        let size = self.len();
        self.slice::<T, _>(|values| values.get(index).cloned())?
            .ok_or(CoreError::IndexOutOfBounds { index, size })
    }

    /// Overwrites element `index`.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` or `IndexOutOfBounds`.
    pub fn set<T: Element>(&mut self, index: usize, value: T) -> CoreResult<()> {
        let size = self.len();
        self.slice_mut::<T, _>(|values| {
            values.get_mut(index).map(|slot| *slot = value)
        })?
        .ok_or(CoreError::IndexOutOfBounds { index, size })
    }

    /// Reads the first element.
    ///
    /// # Errors
    ///
    /// `TypeMismatch`, or `IndexOutOfBounds` when empty.
    pub fn front<T: Element>(&self) -> CoreResult<T> {
        self.get(0)
    }

    /// Reads the last element.
    ///
    /// # Errors
    ///
    /// `TypeMismatch`, or `IndexOutOfBounds` when empty.
    pub fn back<T: Element>(&self) -> CoreResult<T> {
        match self.len() {
            0 => {
                self.slice::<T, _>(|_| ())?;
                Err(CoreError::IndexOutOfBounds { index: 0, size: 0 })
            }
            size => self.get(size - 1),
        }
    }

    /// Copies all elements out.
    ///
    /// # Errors
    ///
    /// `TypeMismatch`.
    pub fn values<T: Element>(&self) -> CoreResult<Vec<T>> {
        self.slice::<T, _>(<[T]>::to_vec)
    }

    /// Index of the first element equal to `value`. A value of another kind
    /// is never found.
    #[must_use]
    pub fn find<T: Element>(&self, value: &T) -> Option<usize> {
        self.slice::<T, _>(|values| values.iter().position(|v| v == value))
            .ok()
            .flatten()
    }

    /// Removes the first element equal to `value`, shifting the rest down.
    ///
    /// # Errors
    ///
    /// `TypeMismatch`.
    pub fn remove<T: Element>(&mut self, value: &T) -> CoreResult<bool> {
        if self.datum_type() != T::TYPE {
            return Err(self.mismatch(T::TYPE));
        }
        match self.find(value) {
            Some(index) => self.remove_at(index).map(|()| true),
            None => Ok(false),
        }
    }

    /// Removes element `index`, shifting the rest down.
    ///
    /// # Errors
    ///
    /// `IndexOutOfBounds`, or `ScopeStore` for nested scope stores.
    pub fn remove_at(&mut self, index: usize) -> CoreResult<()> {
        if self.datum_type() == DatumType::Scope {
            return Err(CoreError::ScopeStore);
        }
        self.bounds(index)?;
        match &mut self.storage {
            Storage::Owned { buffer, .. } => buffer.remove(index),
            Storage::External { field, len } => {
                field.shift_out(index, *len);
                *len -= 1;
            }
        }
        Ok(())
    }

    /// Formats element `index` as text.
    ///
    /// Pointer, reference and scope elements get a descriptive form that
    /// [`set_from_string`](Self::set_from_string) does not accept.
    ///
    /// # Errors
    ///
    /// `UnsetType` or `IndexOutOfBounds`.
    pub fn to_string_at(&self, index: usize) -> CoreResult<String> {
        by_kind!(self.datum_type(),
            T => self.get::<T>(index).map(|value| value.to_text()),
            scope => self.scope(index).map(|id| id.to_string()),
            unknown => Err(CoreError::UnsetType))
    }

    /// Parses `text` into element `index`.
    ///
    /// # Errors
    ///
    /// `UnsetType`, `IndexOutOfBounds`, `ParseFailed`, or
    /// `NotRepresentable` for pointer, reference and scope kinds.
    pub fn set_from_string(&mut self, index: usize, text: &str) -> CoreResult<()> {
        by_kind!(self.datum_type(),
            T => {
                self.bounds(index)?;
                let value = T::from_text(text)?;
                self.set::<T>(index, value)
            },
            scope => Err(CoreError::NotRepresentable(DatumType::Scope)),
            unknown => Err(CoreError::UnsetType))
    }

    /// Parses `text` and appends it.
    ///
    /// # Errors
    ///
    /// As [`set_from_string`](Self::set_from_string), plus `ExternalCapacity`.
    pub fn push_from_string(&mut self, text: &str) -> CoreResult<()> {
        by_kind!(self.datum_type(),
            T => {
                let value = T::from_text(text)?;
                self.push_back::<T>(value)
            },
            scope => Err(CoreError::NotRepresentable(DatumType::Scope)),
            unknown => Err(CoreError::UnsetType))
    }

    /// Aliases a host field. See [`set_external`](Self::set_external).
    ///
    /// # Errors
    ///
    /// As [`set_external`](Self::set_external).
    pub fn set_storage<T: Element>(&mut self, field: &Field<T>) -> CoreResult<()> {
        self.set_external(field.external())
    }

    /// Switches to aliasing `field`. Size and capacity become its length.
    ///
    /// An external datum may be rebound to another field of the same kind.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` when the kinds differ; `OwnedStorage` when the datum
    /// already owns memory.
    pub fn set_external(&mut self, field: ExternalField) -> CoreResult<()> {
        let current = self.datum_type();
        if current != DatumType::Unknown && current != field.datum_type() {
            return Err(CoreError::TypeMismatch {
                expected: field.datum_type(),
                found: current,
            });
        }
        if let Storage::Owned { capacity, .. } = &self.storage {
            if *capacity > 0 {
                return Err(CoreError::OwnedStorage {
                    capacity: *capacity,
                });
            }
        }
        self.storage = Storage::External {
            len: field.len(),
            field,
        };
        Ok(())
    }

    /// Copies the values of `other` into this datum.
    ///
    /// An owned datum takes a fresh copy. An external datum writes through
    /// to its host, and only if the values fit.
    ///
    /// # Errors
    ///
    /// `TypeMismatch`, `ExternalCapacity`, or `ScopeStore` for nested scope
    /// stores.
    pub fn assign(&mut self, other: &Datum) -> CoreResult<()> {
        let (mine, theirs) = (self.datum_type(), other.datum_type());
        if mine == DatumType::Scope || theirs == DatumType::Scope {
            return Err(CoreError::ScopeStore);
        }
        if mine != DatumType::Unknown && theirs != DatumType::Unknown && mine != theirs {
            return Err(self.mismatch(theirs));
        }
        if let Storage::External { field, .. } = &self.storage {
            if other.len() > field.len() {
                return Err(CoreError::ExternalCapacity {
                    capacity: field.len(),
                    requested: other.len(),
                });
            }
        }

        if let Storage::External { field, len } = &mut self.storage {
            by_kind!(mine,
                T => {
                    let values = if theirs == DatumType::Unknown {
                        Vec::new()
                    } else {
                        other.values::<T>()?
                    };
                    if let Some(cells) = T::external(field) {
                        *len = values.len();
                        copy_into(cells, values);
                    }
                },
                scope => return Err(CoreError::ScopeStore),
                unknown => {});
            return Ok(());
        }

        let kind = if theirs == DatumType::Unknown { mine } else { theirs };
        let copied = by_kind!(kind,
            T => T::wrap_owned(if theirs == DatumType::Unknown {
                Vec::new()
            } else {
                other.values::<T>()?
            }),
            scope => return Err(CoreError::ScopeStore),
            unknown => Buffer::Unknown);
        if let Storage::Owned { buffer, capacity } = &mut self.storage {
            *capacity = (*capacity).max(copied.len());
            *buffer = copied;
            buffer.reserve_exact(*capacity - buffer.len());
        }
        Ok(())
    }

    /// Nested scope handles, or an empty slice for other kinds.
    #[must_use]
    pub fn scopes(&self) -> &[ScopeId] {
        match &self.storage {
            Storage::Owned {
                buffer: Buffer::Scope(ids),
                ..
            } => ids,
            _ => &[],
        }
    }

    /// Reads nested scope handle `index`.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` or `IndexOutOfBounds`.
    pub fn scope(&self, index: usize) -> CoreResult<ScopeId> {
        if self.datum_type() != DatumType::Scope {
            return Err(self.mismatch(DatumType::Scope));
        }
        self.scopes()
            .get(index)
            .copied()
            .ok_or(CoreError::IndexOutOfBounds {
                index,
                size: self.len(),
            })
    }

    pub(crate) fn push_scope(&mut self, id: ScopeId) -> CoreResult<()> {
        self.ensure_type(DatumType::Scope)?;
        let strategy = self.strategy;
        if let Storage::Owned {
            buffer: Buffer::Scope(ids),
            capacity,
        } = &mut self.storage
        {
            push_owned(ids, capacity, strategy, id);
        }
        Ok(())
    }

    pub(crate) fn remove_scope(&mut self, id: ScopeId) -> Option<usize> {
        if let Storage::Owned {
            buffer: Buffer::Scope(ids),
            ..
        } = &mut self.storage
        {
            let index = ids.iter().position(|&candidate| candidate == id)?;
            ids.remove(index);
            return Some(index);
        }
        None
    }
}

fn copy_into<T: Default>(field: &Field<T>, values: Vec<T>) {
    let count = values.len();
    let mut cells = field.borrow_mut();
    for (slot, value) in cells.iter_mut().zip(values) {
        *slot = value;
    }
    for slot in cells.iter_mut().skip(count) {
        *slot = T::default();
    }
}

impl PartialEq for Datum {
    fn eq(&self, other: &Self) -> bool {
        if self.datum_type() != other.datum_type() || self.len() != other.len() {
            return false;
        }
        by_kind!(self.datum_type(),
            T => self
                .slice::<T, _>(|mine| other.slice::<T, _>(|theirs| mine == theirs).unwrap_or(false))
                .unwrap_or(false),
            scope => self.scopes() == other.scopes(),
            unknown => true)
    }
}

macro_rules! datum_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Datum {
                fn from(value: $t) -> Self {
                    Self::from_value(value)
                }
            }
        )*
    };
}

datum_from!(i32, f32, Vec4, Mat4, String, Opaque, DatumRef);

impl From<&str> for Datum {
    fn from(value: &str) -> Self {
        Self::from_value(value.to_string())
    }
}
