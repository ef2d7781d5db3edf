//! Action that runs nested actions in order.

use std::any::Any;

use lattice_core::{DatumType, ExternalField, Field, FieldId, Reflect, Registered, Signature, TypeKey};

use super::Action;
use crate::context::UpdateContext;
use crate::error::SceneResult;
use crate::node::SceneNode;

/// Runs every action in its `Actions` attribute.
#[derive(Clone, Debug, Default)]
pub struct ActionList {
    name: Field<String>,
}

impl ActionList {
    /// Attribute holding the nested actions.
    pub const ACTIONS: &'static str = "Actions";

    /// Creates a list called `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Field::new(name.into()),
        }
    }
}

impl Registered for ActionList {
    const TYPE: TypeKey = "ActionList";
    const PARENT: TypeKey = Action::TYPE;

    fn signatures() -> Vec<Signature> {
        vec![Signature::internal(Self::ACTIONS, DatumType::Scope, 0)]
    }
}

impl Reflect for ActionList {
    fn type_key(&self) -> TypeKey {
        Self::TYPE
    }

    fn field(&self, id: FieldId) -> Option<ExternalField> {
        (id == Action::NAME_FIELD).then(|| self.name.external())
    }
}

impl SceneNode for ActionList {
    fn clone_node(&self) -> Box<dyn SceneNode> {
        Box::new(self.clone())
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) -> SceneResult<()> {
        ctx.update_actions(Self::ACTIONS)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
