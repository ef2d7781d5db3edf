//! Class name → constructor registry for scene nodes.

use std::collections::HashMap;

use lattice_core::TypeKey;

use crate::error::{SceneError, SceneResult};
use crate::node::SceneNode;

/// Builds a default instance of one node class.
pub type Constructor = fn() -> Box<dyn SceneNode>;

/// Constructors keyed by the same names as the type registry.
#[derive(Debug, Default)]
pub struct Factory {
    constructors: HashMap<TypeKey, Constructor>,
}

impl Factory {
    /// Creates an empty factory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constructor.
    ///
    /// # Errors
    ///
    /// `DuplicateClass`.
    pub fn register(&mut self, class: TypeKey, constructor: Constructor) -> SceneResult<()> {
        if self.constructors.contains_key(class) {
            return Err(SceneError::DuplicateClass(class));
        }
        self.constructors.insert(class, constructor);
        Ok(())
    }

    /// Registers `T::default` under `class`.
    ///
    /// # Errors
    ///
    /// `DuplicateClass`.
    pub fn register_default<T: SceneNode + Default>(&mut self, class: TypeKey) -> SceneResult<()> {
        self.register(class, construct::<T>)
    }

    /// Builds a node of `class`.
    ///
    /// # Errors
    ///
    /// `UnknownClass`.
    pub fn create(&self, class: &str) -> SceneResult<Box<dyn SceneNode>> {
        self.constructors
            .get(class)
            .map(|constructor| constructor())
            .ok_or_else(|| SceneError::UnknownClass(class.to_string()))
    }

    /// Checks whether `class` is registered.
    #[must_use]
    pub fn contains(&self, class: &str) -> bool {
        self.constructors.contains_key(class)
    }

    /// Number of registered classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// Checks for an empty factory.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// Registered class names.
    pub fn classes(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.constructors.keys().copied()
    }
}

fn construct<T: SceneNode + Default>() -> Box<dyn SceneNode> {
    Box::new(T::default())
}
