//! # Scene Error Types
//!
//! All errors that can occur while building or updating a scene.

use lattice_core::{CoreError, ErrorKind, ScopeId};
use thiserror::Error;

/// Errors that can occur in the scene layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// Attribute tree misuse.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// No constructor registered under this class name.
    #[error("unknown class: {0}")]
    UnknownClass(String),

    /// A constructor is already registered under this class name.
    #[error("class already registered: {0}")]
    DuplicateClass(&'static str),

    /// A pending add was recorded without a destination attribute.
    #[error("pending add of {0} has no destination attribute name")]
    MissingAttributeName(ScopeId),

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Scene document that cannot be mapped onto the tree.
    #[error("invalid document: {0}")]
    InvalidDocument(String),
}

impl SceneError {
    /// Category of the error, where it maps onto the core taxonomy.
    #[must_use]
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Core(error) => Some(error.kind()),
            Self::MissingAttributeName(_) => Some(ErrorKind::StructuralViolation),
            Self::UnknownClass(_)
            | Self::DuplicateClass(_)
            | Self::InvalidConfig(_)
            | Self::InvalidDocument(_) => None,
        }
    }
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;
