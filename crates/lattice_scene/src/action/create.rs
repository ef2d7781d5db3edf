//! Action that spawns copies of prototype scopes.

use std::any::Any;

use lattice_core::{DatumType, ExternalField, Field, FieldId, Reflect, Registered, Signature, TypeKey};

use super::Action;
use crate::context::UpdateContext;
use crate::error::SceneResult;
use crate::node::SceneNode;
use crate::pending::{PendingChild, PendingOp};

/// Copies every scope in `Prototype` and queues each copy for adoption
/// under the attribute named by `Attribute`.
///
/// The destination is the nearest scope at or above the action's parent
/// that already has that attribute, or the parent itself when none does.
/// An empty `Attribute` still queues the copies; applying them fails.
#[derive(Clone, Debug, Default)]
pub struct ActionCreate {
    name: Field<String>,
    attribute: Field<String>,
}

impl ActionCreate {
    /// Field id of `Attribute`.
    pub const ATTRIBUTE_FIELD: FieldId = 1;
    /// Attribute naming the destination attribute.
    pub const ATTRIBUTE: &'static str = "Attribute";
    /// Attribute holding the prototypes.
    pub const PROTOTYPE: &'static str = "Prototype";

    /// Creates an action spawning into `attribute`.
    #[must_use]
    pub fn new(name: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            name: Field::new(name.into()),
            attribute: Field::new(attribute.into()),
        }
    }
}

impl Registered for ActionCreate {
    const TYPE: TypeKey = "ActionCreate";
    const PARENT: TypeKey = Action::TYPE;

    fn signatures() -> Vec<Signature> {
        vec![
            Signature::external(Self::ATTRIBUTE, DatumType::String, 1, Self::ATTRIBUTE_FIELD),
            Signature::internal(Self::PROTOTYPE, DatumType::Scope, 0),
        ]
    }
}

impl Reflect for ActionCreate {
    fn type_key(&self) -> TypeKey {
        Self::TYPE
    }

    fn field(&self, id: FieldId) -> Option<ExternalField> {
        match id {
            Action::NAME_FIELD => Some(self.name.external()),
            Self::ATTRIBUTE_FIELD => Some(self.attribute.external()),
            _ => None,
        }
    }
}

impl SceneNode for ActionCreate {
    fn clone_node(&self) -> Box<dyn SceneNode> {
        Box::new(self.clone())
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) -> SceneResult<()> {
        let current = ctx.current();
        let Some(parent) = ctx.tree().parent(current) else {
            return Ok(());
        };
        let attribute = Some(self.attribute.get()).filter(|name| !name.is_empty());
        let target = attribute
            .as_deref()
            .and_then(|name| ctx.tree().search(parent, name))
            .map_or(parent, |(owner, _)| owner);

        let prototypes = ctx
            .attribute(Self::PROTOTYPE)
            .map(|datum| datum.scopes().to_vec())
            .unwrap_or_default();
        for prototype in prototypes {
            let child = ctx.tree_mut().clone_scope(prototype)?;
            ctx.enqueue(PendingChild {
                child,
                op: PendingOp::Add,
                target,
                attribute: attribute.clone(),
            });
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
