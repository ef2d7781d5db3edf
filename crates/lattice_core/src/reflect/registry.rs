//! # Type Registry
//!
//! Maps a type key to its prescribed attribute signatures and its parent
//! type. Registration order is enforced: a parent must be registered before
//! its children. The registry is an ordinary value passed to whoever builds
//! reflected scopes; there is no global instance.

use std::collections::HashMap;

use crate::error::{CoreError, CoreResult};

use super::Signature;

/// Registry key of a reflected type.
pub type TypeKey = &'static str;

/// The implicit root of every inheritance chain. It has no signatures and
/// needs no registration.
pub const ROOT_TYPE: TypeKey = "Attributed";

/// Registered data for one type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeInfo {
    /// This type's own signatures, excluding inherited ones.
    pub signatures: Vec<Signature>,
    /// Parent type key.
    pub parent: TypeKey,
}

/// A Rust type that declares its own reflection data.
pub trait Registered {
    /// Registry key.
    const TYPE: TypeKey;
    /// Parent registry key.
    const PARENT: TypeKey = ROOT_TYPE;

    /// Signatures declared by this type, excluding inherited ones.
    fn signatures() -> Vec<Signature>;
}

/// Signature lists keyed by type, with inheritance.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<TypeKey, TypeInfo>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `key` with its own signatures under `parent`.
    ///
    /// # Errors
    ///
    /// `TypeAlreadyRegistered` if `key` is present (or is the root),
    /// `ParentNotRegistered` if `parent` is neither registered nor the root.
    pub fn register(
        &mut self,
        key: TypeKey,
        parent: TypeKey,
        signatures: Vec<Signature>,
    ) -> CoreResult<()> {
        if key == ROOT_TYPE || self.types.contains_key(key) {
            return Err(CoreError::TypeAlreadyRegistered(key));
        }
        if !self.is_registered(parent) {
            return Err(CoreError::ParentNotRegistered {
                type_key: key,
                parent,
            });
        }
        tracing::debug!("Registered type {} (parent {}, {} signatures)", key, parent, signatures.len());
        self.types.insert(key, TypeInfo { signatures, parent });
        Ok(())
    }

    /// Registers a [`Registered`] type.
    ///
    /// # Errors
    ///
    /// As [`register`](Self::register).
    pub fn register_type<T: Registered>(&mut self) -> CoreResult<()> {
        self.register(T::TYPE, T::PARENT, T::signatures())
    }

    /// Looks up a type.
    #[must_use]
    pub fn find(&self, key: &str) -> Option<&TypeInfo> {
        self.types.get(key)
    }

    /// Checks whether `key` is registered. The root always is.
    #[must_use]
    pub fn is_registered(&self, key: &str) -> bool {
        key == ROOT_TYPE || self.types.contains_key(key)
    }

    /// Removes one type. Children registered under it stay registered but
    /// their chains stop at the gap.
    pub fn deregister(&mut self, key: &str) -> Option<TypeInfo> {
        self.types.remove(key)
    }

    /// Removes every type.
    pub fn clear(&mut self) {
        self.types.clear();
    }

    /// Number of registered types, excluding the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Checks whether nothing beyond the root is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// The inheritance chain of `key`, root-most first, ending with `key`.
    /// The root itself has an empty chain.
    ///
    /// # Errors
    ///
    /// `TypeNotRegistered`.
    pub fn chain(&self, key: &'static str) -> CoreResult<Vec<&TypeInfo>> {
        if key == ROOT_TYPE {
            return Ok(Vec::new());
        }
        let mut current = self
            .types
            .get(key)
            .ok_or(CoreError::TypeNotRegistered(key))?;
        let mut chain = vec![current];
        while let Some(parent) = self.types.get(current.parent) {
            // Re-registering a removed ancestor under its own descendant can loop.
            if chain.len() > self.types.len() {
                break;
            }
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        Ok(chain)
    }

    /// Every signature `key` prescribes, inherited ones first.
    ///
    /// # Errors
    ///
    /// `TypeNotRegistered`.
    pub fn prescribed(&self, key: &'static str) -> CoreResult<Vec<&Signature>> {
        Ok(self
            .chain(key)?
            .into_iter()
            .flat_map(|info| info.signatures.iter())
            .collect())
    }

    /// Checks whether `name` is prescribed by `key` or any ancestor.
    #[must_use]
    pub fn is_prescribed(&self, key: &str, name: &str) -> bool {
        let mut current = self.types.get(key);
        let mut steps = 0;
        while let Some(info) = current {
            steps += 1;
            if steps > self.types.len() {
                break;
            }
            if info.signatures.iter().any(|signature| signature.name == name) {
                return true;
            }
            current = self.types.get(info.parent);
        }
        false
    }
}
