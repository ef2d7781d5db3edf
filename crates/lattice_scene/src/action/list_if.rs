//! Conditional action list.

use std::any::Any;

use lattice_core::{
    Datum, DatumType, ExternalField, Field, FieldId, Reflect, Registered, Signature, TypeKey,
};

use super::{Action, ActionList};
use crate::context::UpdateContext;
use crate::error::SceneResult;
use crate::node::SceneNode;

/// Runs `Actions` when the attribute named by `Condition` is truthy,
/// `Else` otherwise.
///
/// The condition is looked up with an upward search from the action.
/// Integers and floats are truthy when non-zero, strings when non-empty,
/// anything else when it holds at least one element. A missing attribute
/// is false.
#[derive(Clone, Debug, Default)]
pub struct ActionListIf {
    name: Field<String>,
    condition: Field<String>,
}

impl ActionListIf {
    /// Field id of `Condition`.
    pub const CONDITION_FIELD: FieldId = 1;
    /// Attribute naming the condition.
    pub const CONDITION: &'static str = "Condition";
    /// Attribute holding the actions run when the condition is false.
    pub const ELSE: &'static str = "Else";

    /// Creates a conditional list testing attribute `condition`.
    #[must_use]
    pub fn new(name: impl Into<String>, condition: impl Into<String>) -> Self {
        Self {
            name: Field::new(name.into()),
            condition: Field::new(condition.into()),
        }
    }
}

fn is_truthy(datum: &Datum) -> bool {
    match datum.datum_type() {
        DatumType::Integer => datum.get::<i32>(0).is_ok_and(|v| v != 0),
        DatumType::Float => datum.get::<f32>(0).is_ok_and(|v| v != 0.0),
        DatumType::String => datum.get::<String>(0).is_ok_and(|v| !v.is_empty()),
        _ => !datum.is_empty(),
    }
}

impl Registered for ActionListIf {
    const TYPE: TypeKey = "ActionListIf";
    const PARENT: TypeKey = ActionList::TYPE;

    fn signatures() -> Vec<Signature> {
        vec![
            Signature::external(Self::CONDITION, DatumType::String, 1, Self::CONDITION_FIELD),
            Signature::internal(Self::ELSE, DatumType::Scope, 0),
        ]
    }
}

impl Reflect for ActionListIf {
    fn type_key(&self) -> TypeKey {
        Self::TYPE
    }

    fn field(&self, id: FieldId) -> Option<ExternalField> {
        match id {
            Action::NAME_FIELD => Some(self.name.external()),
            Self::CONDITION_FIELD => Some(self.condition.external()),
            _ => None,
        }
    }
}

impl SceneNode for ActionListIf {
    fn clone_node(&self) -> Box<dyn SceneNode> {
        Box::new(self.clone())
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) -> SceneResult<()> {
        let condition = self.condition.get();
        let truthy = ctx.search(&condition).is_some_and(|(_, datum)| is_truthy(datum));
        let branch = if truthy { ActionList::ACTIONS } else { Self::ELSE };
        ctx.update_actions(branch)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
