//! Third level of the scene tree.

use std::any::Any;

use lattice_core::{DatumType, ExternalField, Field, FieldId, Reflect, Registered, Signature, TypeKey};

use crate::context::UpdateContext;
use crate::error::SceneResult;
use crate::node::{SceneNode, NAME};

/// Object in a sector; runs its actions every update.
#[derive(Clone, Debug, Default)]
pub struct Entity {
    name: Field<String>,
}

impl Entity {
    /// Field id of `Name`.
    pub const NAME_FIELD: FieldId = 0;
    /// Attribute holding the actions.
    pub const ACTIONS: &'static str = "Actions";

    /// Creates an entity called `name`.
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

impl Registered for Entity {
    const TYPE: TypeKey = "Entity";

    fn signatures() -> Vec<Signature> {
        vec![
            Signature::external(NAME, DatumType::String, 1, Self::NAME_FIELD),
            Signature::internal(Self::ACTIONS, DatumType::Scope, 0),
        ]
    }
}

impl Reflect for Entity {
    fn type_key(&self) -> TypeKey {
        Self::TYPE
    }

    fn field(&self, id: FieldId) -> Option<ExternalField> {
        (id == Self::NAME_FIELD).then(|| self.name.external())
    }
}

impl SceneNode for Entity {
    fn clone_node(&self) -> Box<dyn SceneNode> {
        Box::new(self.clone())
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) -> SceneResult<()> {
        let previous = ctx.state().entity;
        ctx.state_mut().entity = Some(ctx.current());
        let result = ctx.update_actions(Self::ACTIONS);
        ctx.state_mut().entity = previous;
        result
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
