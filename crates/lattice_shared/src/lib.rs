//! # Lattice Shared
//!
//! Plain value types used by the variant store and anything that reads
//! attribute values out of the tree (renderers, tools, tests).
//!
//! Nothing in here knows about scopes, registries or the scene tree.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]

pub mod math;

pub use math::{Mat4, ParseMathError, Vec4};
