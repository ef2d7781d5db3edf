//! # Core Error Types
//!
//! Every failure raised by the datum, scope and registry layers.
//!
//! Lookups that may legitimately miss (`find`, `search`, `orphan`) return
//! `Option` instead; an error always means the call was misused and nothing
//! was changed.

use thiserror::Error;

use crate::datum::DatumType;
use crate::scope::ScopeId;

/// Broad category of a [`CoreError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Value or type key inconsistent with what is already fixed.
    TypeMismatch,
    /// Growing or shrinking storage that cannot change size.
    CapacityViolation,
    /// Index outside `[0, size)`.
    BoundsViolation,
    /// Misuse of the tree shape or of attribute names.
    StructuralViolation,
}

/// Errors that can occur in the attribute tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A value of one kind was used with a store fixed to another.
    #[error("type mismatch: store holds {found:?}, operation needs {expected:?}")]
    TypeMismatch {
        /// The kind the operation needed.
        expected: DatumType,
        /// The kind the store is fixed to.
        found: DatumType,
    },

    /// A type key was registered twice.
    #[error("type already registered: {0}")]
    TypeAlreadyRegistered(&'static str),

    /// A type was registered before its parent.
    #[error("parent {parent} of type {type_key} is not registered")]
    ParentNotRegistered {
        /// The type being registered.
        type_key: &'static str,
        /// Its missing parent.
        parent: &'static str,
    },

    /// A type key has no registry entry.
    #[error("type not registered: {0}")]
    TypeNotRegistered(&'static str),

    /// External storage cannot grow or shrink.
    #[error("external storage is fixed at {capacity} elements, requested {requested}")]
    ExternalCapacity {
        /// The aliased span length.
        capacity: usize,
        /// The capacity the operation needed.
        requested: usize,
    },

    /// External storage requested over a store that owns memory.
    #[error("store already owns {capacity} elements of storage")]
    OwnedStorage {
        /// Capacity currently owned.
        capacity: usize,
    },

    /// Sizing operation on a store whose kind is not set.
    #[error("store type is not set")]
    UnsetType,

    /// Index outside the store or table.
    #[error("index {index} out of bounds for size {size}")]
    IndexOutOfBounds {
        /// Requested index.
        index: usize,
        /// Current size.
        size: usize,
    },

    /// Attribute names cannot be empty.
    #[error("attribute name cannot be empty")]
    EmptyName,

    /// The same name appeared twice in an initializer.
    #[error("duplicate attribute name: {0}")]
    DuplicateName(String),

    /// A nested scope was requested under an attribute of another kind.
    #[error("attribute {name} holds {found:?}, not scopes")]
    NotAScope {
        /// The attribute name.
        name: String,
        /// The kind it holds.
        found: DatumType,
    },

    /// Adopting the scope would make it its own ancestor.
    #[error("adopting {child} under {parent} would create a cycle")]
    CycleDetected {
        /// Would-be parent.
        parent: ScopeId,
        /// Would-be child.
        child: ScopeId,
    },

    /// Auxiliary attributes cannot reuse a prescribed name.
    #[error("{0} is a prescribed attribute")]
    PrescribedAttribute(String),

    /// The handle does not refer to a live scope.
    #[error("stale or null scope handle {0}")]
    StaleHandle(ScopeId),

    /// The scope's host is checked out (it is being updated).
    #[error("host of scope {0} is in use")]
    HostUnavailable(ScopeId),

    /// Nested scope stores are resized and copied only through the tree.
    #[error("scope stores are managed by the tree")]
    ScopeStore,

    /// Pointer-like values have no textual form to parse.
    #[error("{0:?} values cannot be set from text")]
    NotRepresentable(DatumType),

    /// Text did not parse as the store's kind.
    #[error("cannot parse {text:?} as {kind:?}")]
    ParseFailed {
        /// The store's kind.
        kind: DatumType,
        /// The offending text.
        text: String,
    },

    /// A host does not expose the field a signature binds to.
    #[error("host {type_key} has no field {field} for attribute {attribute}")]
    MissingField {
        /// Host type.
        type_key: &'static str,
        /// Field identifier from the signature.
        field: u16,
        /// Attribute being bound.
        attribute: String,
    },
}

impl CoreError {
    /// Returns the category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TypeMismatch { .. }
            | Self::TypeAlreadyRegistered(_)
            | Self::ParentNotRegistered { .. }
            | Self::TypeNotRegistered(_)
            | Self::NotRepresentable(_)
            | Self::ParseFailed { .. }
            | Self::MissingField { .. } => ErrorKind::TypeMismatch,
            Self::ExternalCapacity { .. } | Self::OwnedStorage { .. } | Self::UnsetType => {
                ErrorKind::CapacityViolation
            }
            Self::IndexOutOfBounds { .. } => ErrorKind::BoundsViolation,
            Self::EmptyName
            | Self::DuplicateName(_)
            | Self::NotAScope { .. }
            | Self::CycleDetected { .. }
            | Self::PrescribedAttribute(_)
            | Self::StaleHandle(_)
            | Self::HostUnavailable(_)
            | Self::ScopeStore => ErrorKind::StructuralViolation,
        }
    }
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
