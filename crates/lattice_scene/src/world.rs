//! Root of the scene tree.

use std::any::Any;

use lattice_core::{DatumType, ExternalField, Field, FieldId, Reflect, Registered, Signature, TypeKey};

use crate::context::UpdateContext;
use crate::error::SceneResult;
use crate::node::{SceneNode, NAME};

/// Top-level node owning every sector.
#[derive(Clone, Debug, Default)]
pub struct World {
    name: Field<String>,
}

impl World {
    /// Field id of `Name`.
    pub const NAME_FIELD: FieldId = 0;
    /// Attribute holding the sectors.
    pub const SECTORS: &'static str = "Sectors";

    /// Creates a world called `name`.
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

impl Registered for World {
    const TYPE: TypeKey = "World";

    fn signatures() -> Vec<Signature> {
        vec![
            Signature::external(NAME, DatumType::String, 1, Self::NAME_FIELD),
            Signature::internal(Self::SECTORS, DatumType::Scope, 0),
        ]
    }
}

impl Reflect for World {
    fn type_key(&self) -> TypeKey {
        Self::TYPE
    }

    fn field(&self, id: FieldId) -> Option<ExternalField> {
        (id == Self::NAME_FIELD).then(|| self.name.external())
    }
}

impl SceneNode for World {
    fn clone_node(&self) -> Box<dyn SceneNode> {
        Box::new(self.clone())
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) -> SceneResult<()> {
        ctx.state_mut().world = ctx.current();
        ctx.update_children(Self::SECTORS)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
