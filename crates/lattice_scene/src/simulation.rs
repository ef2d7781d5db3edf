//! # Simulation
//!
//! Owns one world and drives it tick by tick:
//! 1. Advance the clock and publish the time in [`WorldState`]
//! 2. Update the world; sectors, entities and actions follow in table order
//! 3. Apply the structural edits recorded during the pass, in order
//! 4. Clear the pending list
//!
//! Nothing recorded in step 2 is visible until step 3.

use std::path::Path;

use lattice_core::{Registered, ScopeId, TypeRegistry};

use crate::action::{Action, ActionCreate, ActionDestroy, ActionIncrement, ActionList, ActionListIf};
use crate::clock::{GameClock, GameTime};
use crate::config::SimulationConfig;
use crate::context::{UpdateContext, WorldState};
use crate::entity::Entity;
use crate::error::{SceneError, SceneResult};
use crate::factory::Factory;
use crate::loader::DocumentLoader;
use crate::node::{SceneNode, SceneTree, NAME};
use crate::pending::{PendingChild, PendingOp};
use crate::sector::Sector;
use crate::world::World;

/// A world, its tree, and everything needed to update it.
pub struct Simulation {
    tree: SceneTree,
    registry: TypeRegistry,
    factory: Factory,
    clock: GameClock,
    state: WorldState,
    pending: Vec<PendingChild>,
    world: ScopeId,
}

impl Simulation {
    /// Creates a simulation with the built-in node types registered and an
    /// empty world.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the configuration does not validate.
    pub fn new(config: &SimulationConfig) -> SceneResult<Self> {
        config.validate()?;

        let mut simulation = Self {
            tree: SceneTree::with_capacity(config.tree_capacity),
            registry: TypeRegistry::new(),
            factory: Factory::new(),
            clock: GameClock::from_config(&config.clock),
            state: WorldState::default(),
            pending: Vec::new(),
            world: ScopeId::NULL,
        };
        simulation.register::<World>()?;
        simulation.register::<Sector>()?;
        simulation.register::<Entity>()?;
        simulation.register::<Action>()?;
        simulation.register::<ActionList>()?;
        simulation.register::<ActionListIf>()?;
        simulation.register::<ActionIncrement>()?;
        simulation.register::<ActionCreate>()?;
        simulation.register::<ActionDestroy>()?;

        simulation.world = simulation.create_node(Box::new(World::new(config.world_name.clone())))?;
        simulation.state.world = simulation.world;
        tracing::debug!("Simulation created with world {}", simulation.world);
        Ok(simulation)
    }

    /// Registers a node type with both the type registry and the factory.
    ///
    /// # Errors
    ///
    /// `DuplicateClass`, or the registry's error if the parent type is not
    /// registered yet.
    pub fn register<T: SceneNode + Registered + Default>(&mut self) -> SceneResult<()> {
        if self.factory.contains(T::TYPE) {
            return Err(SceneError::DuplicateClass(T::TYPE));
        }
        self.registry.register_type::<T>()?;
        self.factory.register_default::<T>(T::TYPE)
    }

    /// Creates a parentless scope hosted by `node`.
    ///
    /// # Errors
    ///
    /// `TypeNotRegistered`, or a host field disagreeing with its signature.
    pub fn create_node(&mut self, node: Box<dyn SceneNode>) -> SceneResult<ScopeId> {
        Ok(self.tree.create_attributed(&self.registry, node)?)
    }

    /// Creates a parentless node of a registered class, by name.
    ///
    /// # Errors
    ///
    /// `UnknownClass`, or as [`create_node`](Self::create_node).
    pub fn spawn(&mut self, class: &str) -> SceneResult<ScopeId> {
        let node = self.factory.create(class)?;
        self.create_node(node)
    }

    /// Creates a sector in the world.
    ///
    /// # Errors
    ///
    /// As [`create_node`](Self::create_node).
    pub fn create_sector(&mut self, name: &str) -> SceneResult<ScopeId> {
        let id = self.create_node(Box::new(Sector::new(name)))?;
        self.attach(self.world, id, World::SECTORS)
    }

    /// Creates an entity in `sector`.
    ///
    /// # Errors
    ///
    /// `StaleHandle` or `NotAScope` if `sector` cannot hold entities.
    pub fn create_entity(&mut self, sector: ScopeId, name: &str) -> SceneResult<ScopeId> {
        let id = self.create_node(Box::new(Entity::new(name)))?;
        self.attach(sector, id, Sector::ENTITIES)
    }

    /// Creates an action of `class` called `name` in the `Actions` of
    /// `parent`, which is an entity or an action list.
    ///
    /// # Errors
    ///
    /// `UnknownClass`, or as [`create_entity`](Self::create_entity).
    pub fn create_action(&mut self, parent: ScopeId, class: &str, name: &str) -> SceneResult<ScopeId> {
        let id = self.spawn(class)?;
        let renamed = match self.tree.get_mut(id).and_then(|scope| scope.into_find_mut(NAME)) {
            Some(datum) => datum.set(0, name.to_string()),
            None => Ok(()),
        };
        if let Err(error) = renamed {
            self.tree.destroy(id)?;
            return Err(error.into());
        }
        self.attach(parent, id, Entity::ACTIONS)
    }

    fn attach(&mut self, parent: ScopeId, child: ScopeId, attribute: &str) -> SceneResult<ScopeId> {
        if let Err(error) = self.tree.adopt(parent, child, attribute) {
            self.tree.destroy(child)?;
            return Err(error.into());
        }
        Ok(child)
    }

    /// Populates the world from a TOML scene document.
    ///
    /// # Errors
    ///
    /// `InvalidDocument`, or any error raised while populating.
    pub fn load_document(&mut self, text: &str) -> SceneResult<()> {
        DocumentLoader::new(&mut self.tree, &self.registry, &self.factory).load_str(self.world, text)
    }

    /// Populates the world from a TOML scene document on disk.
    ///
    /// # Errors
    ///
    /// `InvalidDocument` if the file cannot be read, otherwise as
    /// [`load_document`](Self::load_document).
    pub fn load_document_file(&mut self, path: impl AsRef<Path>) -> SceneResult<()> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| SceneError::InvalidDocument(format!("Failed to read document: {e}")))?;
        self.load_document(&text)
    }

    /// Runs one tick.
    ///
    /// # Errors
    ///
    /// The first error raised by a node, in which case nothing recorded
    /// during the pass is applied, or the first pending edit that cannot be
    /// applied (`MissingAttributeName`, or the adopt error), in which case
    /// the edits after it are discarded.
    pub fn update(&mut self) -> SceneResult<GameTime> {
        let time = self.clock.tick();
        self.state = WorldState {
            game_time: time,
            world: self.world,
            ..WorldState::default()
        };

        let traversal = {
            let mut ctx = UpdateContext::new(
                &mut self.tree,
                &self.registry,
                &mut self.state,
                &mut self.pending,
                self.world,
            );
            ctx.update_node(self.world)
        };
        if let Err(error) = traversal {
            let pending = std::mem::take(&mut self.pending);
            self.discard(pending);
            return Err(error);
        }

        self.apply_pending()?;
        Ok(time)
    }

    fn apply_pending(&mut self) -> SceneResult<()> {
        let pending = std::mem::take(&mut self.pending);
        if pending.is_empty() {
            return Ok(());
        }
        tracing::debug!("Applying {} pending changes", pending.len());

        let mut records = pending.into_iter();
        while let Some(change) = records.next() {
            if let Err(error) = self.apply(&change) {
                tracing::debug!("Pending {:?} of {} failed: {}", change.op, change.child, error);
                self.discard(std::iter::once(change).chain(records));
                return Err(error);
            }
        }
        Ok(())
    }

    fn apply(&mut self, change: &PendingChild) -> SceneResult<()> {
        match change.op {
            PendingOp::Add => {
                let attribute = change
                    .attribute
                    .as_deref()
                    .filter(|name| !name.is_empty())
                    .ok_or(SceneError::MissingAttributeName(change.child))?;
                self.tree.adopt(change.target, change.child, attribute)?;
            }
            PendingOp::Remove => {
                if self.tree.orphan(change.target, change.child).is_none() {
                    tracing::warn!("Skipping removal of {}: not owned by {}", change.child, change.target);
                    return Ok(());
                }
                self.tree.destroy(change.child)?;
            }
        }
        Ok(())
    }

    /// Destroys the detached copies queued by unapplied adds.
    fn discard(&mut self, records: impl IntoIterator<Item = PendingChild>) {
        for change in records {
            let detached = change.op == PendingOp::Add
                && change.child != self.world
                && self.tree.contains(change.child)
                && self.tree.parent(change.child).is_none();
            if detached && self.tree.destroy(change.child).is_ok() {
                tracing::debug!("Discarded pending add of {}", change.child);
            }
        }
    }

    /// The world scope.
    #[must_use]
    pub fn world(&self) -> ScopeId {
        self.world
    }

    /// The tree.
    #[must_use]
    pub fn tree(&self) -> &SceneTree {
        &self.tree
    }

    /// The tree, for direct edits between ticks.
    pub fn tree_mut(&mut self) -> &mut SceneTree {
        &mut self.tree
    }

    /// The type registry.
    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// The node factory.
    #[must_use]
    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    /// State left by the last tick.
    #[must_use]
    pub fn state(&self) -> &WorldState {
        &self.state
    }

    /// Time of the last tick.
    #[must_use]
    pub fn game_time(&self) -> GameTime {
        self.clock.current()
    }

    /// Edits waiting to be applied. Empty between ticks.
    #[must_use]
    pub fn pending(&self) -> &[PendingChild] {
        &self.pending
    }
}
