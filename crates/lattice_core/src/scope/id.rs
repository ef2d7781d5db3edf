//! Handles that name scopes inside a [`Tree`](super::Tree).
//!
//! A tree reuses the slot of a destroyed scope, bumping that slot's
//! generation. Handles taken before the reuse keep the old generation, so the
//! tree rejects them with `StaleHandle` instead of resolving them to the
//! newcomer.

use std::fmt;

/// Copyable name of one scope in a tree.
///
/// Packs the slot and the generation it was issued for into one word, slot
/// in the low half. [`ScopeId::NULL`] names nothing and is the default, which
/// is what an unset [`DatumRef`](crate::DatumRef) holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ScopeId(u64);

impl ScopeId {
    /// Never issued by a tree.
    pub const NULL: Self = Self(u64::MAX);

    /// Packs `index` and `generation`. Trees build handles themselves; this
    /// is for tests and for decoding stored handles.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Slot the scope occupies.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Slot generation the handle was issued for.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// True for [`ScopeId::NULL`].
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Default for ScopeId {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "scope(null)")
        } else {
            write!(f, "scope({}v{})", self.index(), self.generation())
        }
    }
}
