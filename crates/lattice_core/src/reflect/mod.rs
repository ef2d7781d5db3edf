//! Reflection: type signatures, the registry, and host-backed scopes.

mod attributed;
mod host;
mod registry;
mod signature;

pub use host::{FieldId, Host, Plain, Reflect};
pub use registry::{Registered, TypeInfo, TypeKey, TypeRegistry, ROOT_TYPE};
pub use signature::{Signature, SignatureStorage};
