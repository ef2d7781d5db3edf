//! Per-attribute declarations that drive scope population.

use crate::datum::DatumType;

use super::FieldId;

/// Where a prescribed attribute keeps its values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignatureStorage {
    /// The scope owns a datum of `size` elements.
    Internal,
    /// The datum aliases the host member with this id.
    External(FieldId),
}

/// Declares one prescribed attribute of a reflected type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    /// Attribute name.
    pub name: &'static str,
    /// Value kind.
    pub kind: DatumType,
    /// Owned or aliased.
    pub storage: SignatureStorage,
    /// Element count. For scope-kind attributes, the initial capacity.
    pub size: usize,
}

impl Signature {
    /// An owned attribute.
    #[must_use]
    pub const fn internal(name: &'static str, kind: DatumType, size: usize) -> Self {
        Self {
            name,
            kind,
            storage: SignatureStorage::Internal,
            size,
        }
    }

    /// An attribute aliasing host member `field`.
    #[must_use]
    pub const fn external(name: &'static str, kind: DatumType, size: usize, field: FieldId) -> Self {
        Self {
            name,
            kind,
            storage: SignatureStorage::External(field),
            size,
        }
    }

    /// Checks for owned storage.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self.storage, SignatureStorage::Internal)
    }
}
