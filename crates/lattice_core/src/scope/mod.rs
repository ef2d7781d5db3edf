//! Attribute tables and the arena that links them into a tree.

mod id;
mod table;
mod tree;

pub use id::ScopeId;
pub use table::{Scope, ScopeMut};
pub use tree::{ScopeTree, Tree};

pub(crate) use tree::Binding;
