//! Second level of the scene tree.

use std::any::Any;

use lattice_core::{DatumType, ExternalField, Field, FieldId, Reflect, Registered, Signature, TypeKey};

use crate::context::UpdateContext;
use crate::error::SceneResult;
use crate::node::{SceneNode, NAME};

/// Groups entities inside a world.
#[derive(Clone, Debug, Default)]
pub struct Sector {
    name: Field<String>,
}

impl Sector {
    /// Field id of `Name`.
    pub const NAME_FIELD: FieldId = 0;
    /// Attribute holding the entities.
    pub const ENTITIES: &'static str = "Entities";

    /// Creates a sector called `name`.
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

impl Registered for Sector {
    const TYPE: TypeKey = "Sector";

    fn signatures() -> Vec<Signature> {
        vec![
            Signature::external(NAME, DatumType::String, 1, Self::NAME_FIELD),
            Signature::internal(Self::ENTITIES, DatumType::Scope, 0),
        ]
    }
}

impl Reflect for Sector {
    fn type_key(&self) -> TypeKey {
        Self::TYPE
    }

    fn field(&self, id: FieldId) -> Option<ExternalField> {
        (id == Self::NAME_FIELD).then(|| self.name.external())
    }
}

impl SceneNode for Sector {
    fn clone_node(&self) -> Box<dyn SceneNode> {
        Box::new(self.clone())
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) -> SceneResult<()> {
        let previous = ctx.state().sector;
        ctx.state_mut().sector = Some(ctx.current());
        let result = ctx.update_children(Self::ENTITIES);
        ctx.state_mut().sector = previous;
        result
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
