//! Action that bumps a numeric attribute.

use std::any::Any;

use lattice_core::{DatumType, ExternalField, Field, FieldId, Reflect, Registered, Signature, TypeKey};

use super::Action;
use crate::context::UpdateContext;
use crate::error::SceneResult;
use crate::node::SceneNode;

/// Adds `Step` to the first value of the attribute named by `Target`.
///
/// The target is found with an upward search from the action. Integer
/// targets wrap on overflow; float targets receive the step converted to
/// `f32`. Missing, empty, or non-numeric targets are left alone.
#[derive(Clone, Debug)]
pub struct ActionIncrement {
    name: Field<String>,
    target: Field<String>,
    step: Field<i32>,
}

impl ActionIncrement {
    /// Field id of `Target`.
    pub const TARGET_FIELD: FieldId = 1;
    /// Field id of `Step`.
    pub const STEP_FIELD: FieldId = 2;
    /// Attribute naming the value to increment.
    pub const TARGET: &'static str = "Target";
    /// Attribute holding the increment.
    pub const STEP: &'static str = "Step";

    /// Creates an action adding `step` to `target`.
    #[must_use]
    pub fn new(name: impl Into<String>, target: impl Into<String>, step: i32) -> Self {
        Self {
            name: Field::new(name.into()),
            target: Field::new(target.into()),
            step: Field::new(step),
        }
    }

    /// Current step.
    #[must_use]
    pub fn step(&self) -> i32 {
        self.step.get()
    }
}

impl Default for ActionIncrement {
    fn default() -> Self {
        Self::new(String::new(), String::new(), 1)
    }
}

impl Registered for ActionIncrement {
    const TYPE: TypeKey = "ActionIncrement";
    const PARENT: TypeKey = Action::TYPE;

    fn signatures() -> Vec<Signature> {
        vec![
            Signature::external(Self::TARGET, DatumType::String, 1, Self::TARGET_FIELD),
            Signature::external(Self::STEP, DatumType::Integer, 1, Self::STEP_FIELD),
        ]
    }
}

impl Reflect for ActionIncrement {
    fn type_key(&self) -> TypeKey {
        Self::TYPE
    }

    fn field(&self, id: FieldId) -> Option<ExternalField> {
        match id {
            Action::NAME_FIELD => Some(self.name.external()),
            Self::TARGET_FIELD => Some(self.target.external()),
            Self::STEP_FIELD => Some(self.step.external()),
            _ => None,
        }
    }
}

impl SceneNode for ActionIncrement {
    fn clone_node(&self) -> Box<dyn SceneNode> {
        Box::new(self.clone())
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) -> SceneResult<()> {
        let target = self.target.get();
        let step = self.step.get();
        let Some((owner, datum)) = ctx.search_mut(&target) else {
            tracing::trace!("Increment target {} not found", target);
            return Ok(());
        };
        if datum.is_empty() {
            return Ok(());
        }
        match datum.datum_type() {
            DatumType::Integer => {
                let value = datum.get::<i32>(0)?;
                datum.set(0, value.wrapping_add(step))?;
            }
            DatumType::Float => {
                let value = datum.get::<f32>(0)?;
                datum.set(0, value + step as f32)?;
            }
            other => {
                tracing::trace!("Increment target {} on {} is {:?}", target, owner, other);
            }
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
