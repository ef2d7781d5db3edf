//! # Reflected Scopes
//!
//! Builds scopes whose prescribed attributes come from the type registry.
//! Population runs root-most type first, so inherited attributes precede a
//! type's own. Owned attributes are typed and sized from their signature;
//! external ones alias the host's fields and are remembered as bindings.

use crate::datum::{Datum, DatumType};
use crate::error::{CoreError, CoreResult};
use crate::scope::{Binding, Scope, ScopeId, Tree};

use super::{Host, SignatureStorage, TypeRegistry};

impl<H: ?Sized + Host> Tree<H> {
    /// Creates a parentless scope hosted by `host`, populated from the
    /// signatures of its type and every ancestor.
    ///
    /// # Errors
    ///
    /// `TypeNotRegistered`, `MissingField`, `TypeMismatch` or
    /// `ExternalCapacity` when a host field disagrees with its signature.
    /// No scope is created on error.
    pub fn create_attributed(&mut self, registry: &TypeRegistry, host: Box<H>) -> CoreResult<ScopeId> {
        let type_key = host.type_key();
        let mut scope = Scope::new();
        let mut bindings = Vec::new();

        for signature in registry.prescribed(type_key)? {
            let datum = scope.append_raw(signature.name)?;
            match signature.storage {
                SignatureStorage::Internal => {
                    datum.set_type(signature.kind)?;
                    if signature.kind == DatumType::Scope {
                        datum.reserve(signature.size)?;
                    } else {
                        datum.resize(signature.size)?;
                    }
                }
                SignatureStorage::External(field) => {
                    let aliased = host.field(field).ok_or_else(|| CoreError::MissingField {
                        type_key,
                        field,
                        attribute: signature.name.to_string(),
                    })?;
                    if aliased.datum_type() != signature.kind {
                        return Err(CoreError::TypeMismatch {
                            expected: signature.kind,
                            found: aliased.datum_type(),
                        });
                    }
                    if aliased.len() != signature.size {
                        return Err(CoreError::ExternalCapacity {
                            capacity: aliased.len(),
                            requested: signature.size,
                        });
                    }
                    datum.set_external(aliased)?;
                    bindings.push(Binding {
                        attribute: signature.name.to_string(),
                        field,
                    });
                }
            }
        }

        let id = self.insert(scope, Some(host), bindings);
        tracing::debug!("Created {} as {}", type_key, id);
        Ok(id)
    }

    /// Checks whether `id` has an attribute called `name`.
    #[must_use]
    pub fn is_attribute(&self, id: ScopeId, name: &str) -> bool {
        self.get(id).is_some_and(|scope| scope.contains(name))
    }

    /// Checks whether `name` is declared by the type of `id` or an ancestor
    /// type. Scopes without a host have no prescribed attributes.
    #[must_use]
    pub fn is_prescribed_attribute(&self, registry: &TypeRegistry, id: ScopeId, name: &str) -> bool {
        self.is_attribute(id, name)
            && self
                .type_key(id)
                .is_some_and(|key| registry.is_prescribed(key, name))
    }

    /// Checks whether `name` exists on `id` but is not prescribed.
    #[must_use]
    pub fn is_auxiliary_attribute(&self, registry: &TypeRegistry, id: ScopeId, name: &str) -> bool {
        self.is_attribute(id, name) && !self.is_prescribed_attribute(registry, id, name)
    }

    /// Appends (or finds) an auxiliary attribute.
    ///
    /// # Errors
    ///
    /// `PrescribedAttribute` if `name` is prescribed for the scope's type,
    /// otherwise as [`append`](Tree::append).
    pub fn append_auxiliary_attribute(
        &mut self,
        registry: &TypeRegistry,
        id: ScopeId,
        name: &str,
    ) -> CoreResult<&mut Datum> {
        if self
            .type_key(id)
            .is_some_and(|key| registry.is_prescribed(key, name))
        {
            return Err(CoreError::PrescribedAttribute(name.to_string()));
        }
        self.append(id, name)
    }
}
