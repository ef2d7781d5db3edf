//! # Lattice Core
//!
//! Reflection-based attribute tree:
//! - [`Datum`]: a typed array of values, owned or aliasing a host field
//! - [`Scope`]: an ordered name → datum table
//! - [`Tree`]: generational arena of scopes with single ownership
//! - [`TypeRegistry`]: per-type attribute signatures with inheritance
//!
//! ## Example
//!
//! ```
//! use lattice_core::{DatumType, ScopeTree};
//!
//! let mut tree = ScopeTree::new();
//! let root = tree.create();
//! tree.append(root, "Gravity").unwrap().push_back(9.8_f32).unwrap();
//! let child = tree.append_scope(root, "Children").unwrap();
//!
//! let (owner, gravity) = tree.search(child, "Gravity").unwrap();
//! assert_eq!(owner, root);
//! assert_eq!(gravity.datum_type(), DatumType::Float);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod datum;
pub mod error;
pub mod reflect;
pub mod scope;

pub use datum::{
    default_reserve_strategy, Datum, DatumRef, DatumType, Element, ExternalField, Field, Opaque,
    ReserveStrategy,
};
pub use error::{CoreError, CoreResult, ErrorKind};
pub use reflect::{
    FieldId, Host, Plain, Reflect, Registered, Signature, SignatureStorage, TypeInfo, TypeKey,
    TypeRegistry, ROOT_TYPE,
};
pub use scope::{Scope, ScopeId, ScopeMut, ScopeTree, Tree};

pub use lattice_shared::{Mat4, Vec4};
