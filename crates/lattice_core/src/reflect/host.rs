//! Native objects that back reflected scopes.

use crate::datum::ExternalField;

use super::TypeKey;

/// Identifies one reflected member of a host type.
pub type FieldId = u16;

/// Exposes a native object's members to the attribute tree.
pub trait Reflect {
    /// Registry key of the object's concrete type.
    fn type_key(&self) -> TypeKey;

    /// Aliases the member identified by `id`, or `None` if the type has no
    /// such member.
    fn field(&self, id: FieldId) -> Option<ExternalField>;
}

/// A [`Reflect`] object the tree can own and copy.
///
/// `duplicate` must copy member values into fresh cells (see
/// [`Field`](crate::datum::Field)'s `Clone`); the tree then re-binds the
/// copied scope's external attributes to the duplicate's fields.
pub trait Host: Reflect {
    /// Deep copy preserving the concrete type.
    fn duplicate(&self) -> Box<Self>;
}

/// Host type for trees that hold plain scopes only. It has no values.
#[derive(Debug)]
pub enum Plain {}

impl Reflect for Plain {
    fn type_key(&self) -> TypeKey {
        match *self {}
    }

    fn field(&self, _id: FieldId) -> Option<ExternalField> {
        match *self {}
    }
}

impl Host for Plain {
    fn duplicate(&self) -> Box<Self> {
        match *self {}
    }
}
