//! Action that removes named children.

use std::any::Any;

use lattice_core::{
    DatumType, ExternalField, Field, FieldId, Reflect, Registered, ScopeId, Signature, TypeKey,
};

use super::Action;
use crate::context::UpdateContext;
use crate::error::SceneResult;
use crate::node::{node_name, SceneNode};
use crate::pending::PendingChild;

/// Queues removal of every child called `Target` held in the attribute
/// named by `Attribute`, searching upward from the action's parent.
#[derive(Clone, Debug, Default)]
pub struct ActionDestroy {
    name: Field<String>,
    attribute: Field<String>,
    target: Field<String>,
}

impl ActionDestroy {
    /// Field id of `Attribute`.
    pub const ATTRIBUTE_FIELD: FieldId = 1;
    /// Field id of `Target`.
    pub const TARGET_FIELD: FieldId = 2;
    /// Attribute naming the attribute holding the victims.
    pub const ATTRIBUTE: &'static str = "Attribute";
    /// Attribute naming the victims.
    pub const TARGET: &'static str = "Target";

    /// Creates an action removing children called `target` from `attribute`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        attribute: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            name: Field::new(name.into()),
            attribute: Field::new(attribute.into()),
            target: Field::new(target.into()),
        }
    }
}

impl Registered for ActionDestroy {
    const TYPE: TypeKey = "ActionDestroy";
    const PARENT: TypeKey = Action::TYPE;

    fn signatures() -> Vec<Signature> {
        vec![
            Signature::external(Self::ATTRIBUTE, DatumType::String, 1, Self::ATTRIBUTE_FIELD),
            Signature::external(Self::TARGET, DatumType::String, 1, Self::TARGET_FIELD),
        ]
    }
}

impl Reflect for ActionDestroy {
    fn type_key(&self) -> TypeKey {
        Self::TYPE
    }

    fn field(&self, id: FieldId) -> Option<ExternalField> {
        match id {
            Action::NAME_FIELD => Some(self.name.external()),
            Self::ATTRIBUTE_FIELD => Some(self.attribute.external()),
            Self::TARGET_FIELD => Some(self.target.external()),
            _ => None,
        }
    }
}

impl SceneNode for ActionDestroy {
    fn clone_node(&self) -> Box<dyn SceneNode> {
        Box::new(self.clone())
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) -> SceneResult<()> {
        let attribute = self.attribute.get();
        let target = self.target.get();
        let Some(parent) = ctx.tree().parent(ctx.current()) else {
            return Ok(());
        };
        let Some((owner, datum)) = ctx.tree().search(parent, &attribute) else {
            return Ok(());
        };
        let doomed: Vec<ScopeId> = datum
            .scopes()
            .iter()
            .copied()
            .filter(|&child| node_name(ctx.tree(), child).as_deref() == Some(target.as_str()))
            .collect();
        for child in doomed {
            ctx.enqueue(PendingChild::remove(child, owner));
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
