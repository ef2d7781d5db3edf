//! # Actions
//!
//! Leaves of the scene tree. Every action type derives from [`Action`] in
//! the type registry, so each one has a `Name` attribute aliasing field
//! [`Action::NAME_FIELD`] of its host.

mod create;
mod destroy;
mod increment;
mod list;
mod list_if;

pub use create::ActionCreate;
pub use destroy::ActionDestroy;
pub use increment::ActionIncrement;
pub use list::ActionList;
pub use list_if::ActionListIf;

use std::any::Any;

use lattice_core::{DatumType, ExternalField, Field, FieldId, Reflect, Registered, Signature, TypeKey};

use crate::context::UpdateContext;
use crate::error::SceneResult;
use crate::node::{SceneNode, NAME};

/// Action that does nothing. Base type of every action.
#[derive(Clone, Debug, Default)]
pub struct Action {
    name: Field<String>,
}

impl Action {
    /// Field id of `Name`, shared by every action type.
    pub const NAME_FIELD: FieldId = 0;

    /// Creates an action called `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Field::new(name.into()),
        }
    }

    /// Current name.
    #[must_use]
    pub fn name(&self) -> String {
        self.name.get()
    }
}

impl Registered for Action {
    const TYPE: TypeKey = "Action";

    fn signatures() -> Vec<Signature> {
        vec![Signature::external(NAME, DatumType::String, 1, Self::NAME_FIELD)]
    }
}

impl Reflect for Action {
    fn type_key(&self) -> TypeKey {
        Self::TYPE
    }

    fn field(&self, id: FieldId) -> Option<ExternalField> {
        (id == Self::NAME_FIELD).then(|| self.name.external())
    }
}

impl SceneNode for Action {
    fn clone_node(&self) -> Box<dyn SceneNode> {
        Box::new(self.clone())
    }

    fn update(&mut self, _ctx: &mut UpdateContext<'_>) -> SceneResult<()> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
