//! Integration tests for the update protocol and deferred edits.

use std::any::Any;

use lattice_core::{
    CoreError, DatumType, ExternalField, Field, FieldId, Reflect, Registered, ScopeId, Signature,
    TypeKey,
};
use lattice_scene::{
    host_as, node_name, Action, ActionCreate, ActionDestroy, ActionIncrement, ActionListIf, Entity,
    PendingChild, SceneError, SceneNode, SceneResult, Sector, Simulation, SimulationConfig,
    UpdateContext,
};

fn simulation() -> Simulation {
    let mut config = SimulationConfig::default();
    config.clock.fixed_step_ms = Some(10);
    Simulation::new(&config).unwrap()
}

/// Records how many entities its sector held when it ran.
#[derive(Clone, Debug, Default)]
struct Census {
    name: Field<String>,
    seen: Field<i32>,
}

impl Census {
    const SEEN_FIELD: FieldId = 1;
}

impl Registered for Census {
    const TYPE: TypeKey = "Census";
    const PARENT: TypeKey = Action::TYPE;

    fn signatures() -> Vec<Signature> {
        vec![Signature::external("Seen", DatumType::Integer, 1, Self::SEEN_FIELD)]
    }
}

impl Reflect for Census {
    fn type_key(&self) -> TypeKey {
        Self::TYPE
    }

    fn field(&self, id: FieldId) -> Option<ExternalField> {
        match id {
            Action::NAME_FIELD => Some(self.name.external()),
            Self::SEEN_FIELD => Some(self.seen.external()),
            _ => None,
        }
    }
}

impl SceneNode for Census {
    fn clone_node(&self) -> Box<dyn SceneNode> {
        Box::new(self.clone())
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) -> SceneResult<()> {
        let count = ctx.search(Sector::ENTITIES).map_or(0, |(_, datum)| datum.len());
        self.seen.set(count as i32);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Fails every update.
#[derive(Clone, Debug, Default)]
struct Broken {
    name: Field<String>,
}

impl Registered for Broken {
    const TYPE: TypeKey = "Broken";
    const PARENT: TypeKey = Action::TYPE;

    fn signatures() -> Vec<Signature> {
        Vec::new()
    }
}

impl Reflect for Broken {
    fn type_key(&self) -> TypeKey {
        Self::TYPE
    }

    fn field(&self, id: FieldId) -> Option<ExternalField> {
        (id == Action::NAME_FIELD).then(|| self.name.external())
    }
}

impl SceneNode for Broken {
    fn clone_node(&self) -> Box<dyn SceneNode> {
        Box::new(self.clone())
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) -> SceneResult<()> {
        let current = ctx.current();
        ctx.tree_mut().append(current, "")?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Queues a fixed batch of edits against its sector every update.
///
/// Adds `fresh` then removes it, then removes `doomed` and adds a copy of it.
#[derive(Clone, Debug, Default)]
struct Reshuffle {
    name: Field<String>,
    fresh: ScopeId,
    doomed: ScopeId,
}

impl Registered for Reshuffle {
    const TYPE: TypeKey = "Reshuffle";
    const PARENT: TypeKey = Action::TYPE;

    fn signatures() -> Vec<Signature> {
        Vec::new()
    }
}

impl Reflect for Reshuffle {
    fn type_key(&self) -> TypeKey {
        Self::TYPE
    }

    fn field(&self, id: FieldId) -> Option<ExternalField> {
        (id == Action::NAME_FIELD).then(|| self.name.external())
    }
}

impl SceneNode for Reshuffle {
    fn clone_node(&self) -> Box<dyn SceneNode> {
        Box::new(self.clone())
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) -> SceneResult<()> {
        let Some((sector, _)) = ctx.search(Sector::ENTITIES) else {
            return Ok(());
        };
        let copy = ctx.tree_mut().clone_scope(self.doomed)?;
        ctx.enqueue(PendingChild::add(self.fresh, sector, Sector::ENTITIES));
        ctx.enqueue(PendingChild::remove(self.fresh, sector));
        ctx.enqueue(PendingChild::remove(self.doomed, sector));
        ctx.enqueue(PendingChild::add(copy, sector, Sector::ENTITIES));
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn add_action(sim: &mut Simulation, parent: ScopeId, node: Box<dyn SceneNode>) -> ScopeId {
    let id = sim.create_node(node).unwrap();
    sim.tree_mut().adopt(parent, id, Entity::ACTIONS).unwrap();
    id
}

fn add_spawner(sim: &mut Simulation, parent: ScopeId, attribute: &str, prototype: &str) -> ScopeId {
    let spawn = add_action(sim, parent, Box::new(ActionCreate::new("Spawn", attribute)));
    let proto = sim.create_node(Box::new(Entity::new(prototype))).unwrap();
    sim.tree_mut().adopt(spawn, proto, ActionCreate::PROTOTYPE).unwrap();
    spawn
}

fn int_attribute(sim: &Simulation, id: ScopeId, name: &str) -> i32 {
    sim.tree().get(id).unwrap().find(name).unwrap().get::<i32>(0).unwrap()
}

fn entity_names(sim: &Simulation, sector: ScopeId) -> Vec<String> {
    sim.tree()
        .get(sector)
        .unwrap()
        .find(Sector::ENTITIES)
        .unwrap()
        .scopes()
        .iter()
        .filter_map(|&id| node_name(sim.tree(), id))
        .collect()
}

// =============================================================================
// Update protocol
// =============================================================================

#[test]
fn test_increment_counter_three_ticks() {
    let mut sim = simulation();
    let sector = sim.create_sector("Plains").unwrap();
    let entity = sim.create_entity(sector, "Counter").unwrap();
    sim.tree_mut().append(entity, "counter").unwrap().push_back(0).unwrap();
    add_action(&mut sim, entity, Box::new(ActionIncrement::new("Bump", "counter", 5)));

    for _ in 0..3 {
        sim.update().unwrap();
    }

    assert_eq!(int_attribute(&sim, entity, "counter"), 15);
}

#[test]
fn test_increment_float_target_on_sector() {
    let mut sim = simulation();
    let sector = sim.create_sector("Plains").unwrap();
    sim.tree_mut().append(sector, "Heat").unwrap().push_back(0.5_f32).unwrap();
    let entity = sim.create_entity(sector, "Sun").unwrap();
    add_action(&mut sim, entity, Box::new(ActionIncrement::new("Warm", "Heat", 2)));

    sim.update().unwrap();

    let heat = sim.tree().get(sector).unwrap().find("Heat").unwrap();
    assert_eq!(heat.get::<f32>(0).unwrap(), 2.5);
}

#[test]
fn test_increment_missing_target_is_ignored() {
    let mut sim = simulation();
    let sector = sim.create_sector("Plains").unwrap();
    let entity = sim.create_entity(sector, "Lost").unwrap();
    add_action(&mut sim, entity, Box::new(ActionIncrement::new("Bump", "nothing", 1)));

    assert!(sim.update().is_ok());
}

#[test]
fn test_list_if_branches() {
    let mut sim = simulation();
    let sector = sim.create_sector("Plains").unwrap();
    let entity = sim.create_entity(sector, "Guard").unwrap();
    for name in ["Armed", "hits", "misses"] {
        sim.tree_mut().append(entity, name).unwrap().push_back(0).unwrap();
    }

    let check = add_action(&mut sim, entity, Box::new(ActionListIf::new("Check", "Armed")));
    add_action(&mut sim, check, Box::new(ActionIncrement::new("Hit", "hits", 1)));
    let miss = sim
        .create_node(Box::new(ActionIncrement::new("Miss", "misses", 1)))
        .unwrap();
    sim.tree_mut().adopt(check, miss, ActionListIf::ELSE).unwrap();

    sim.update().unwrap();
    assert_eq!(int_attribute(&sim, entity, "hits"), 0);
    assert_eq!(int_attribute(&sim, entity, "misses"), 1);

    sim.tree_mut()
        .get_mut(entity)
        .unwrap()
        .find_mut("Armed")
        .unwrap()
        .set(0, 1)
        .unwrap();
    sim.update().unwrap();
    assert_eq!(int_attribute(&sim, entity, "hits"), 1);
    assert_eq!(int_attribute(&sim, entity, "misses"), 1);
}

#[test]
fn test_state_is_reset_after_tick() {
    let mut sim = simulation();
    let sector = sim.create_sector("Plains").unwrap();
    let entity = sim.create_entity(sector, "Hero").unwrap();
    add_action(&mut sim, entity, Box::new(Action::new("Idle")));

    let time = sim.update().unwrap();

    assert_eq!(time.frame, 1);
    assert_eq!(sim.state().world, sim.world());
    assert_eq!(sim.state().sector, None);
    assert_eq!(sim.state().entity, None);
    assert_eq!(sim.state().action, None);
}

// =============================================================================
// Deferred edits
// =============================================================================

#[test]
fn test_deferred_add_and_remove() {
    let mut sim = simulation();
    sim.register::<Census>().unwrap();
    let sector = sim.create_sector("Plains").unwrap();
    let victim = sim.create_entity(sector, "Victim").unwrap();
    let director = sim.create_entity(sector, "Director").unwrap();

    add_spawner(&mut sim, director, Sector::ENTITIES, "Spawned");
    add_action(&mut sim, director, Box::new(ActionDestroy::new("Cull", Sector::ENTITIES, "Victim")));
    let census = add_action(&mut sim, director, Box::new(Census::default()));

    sim.update().unwrap();

    // Nothing moved while the pass was running.
    assert_eq!(int_attribute(&sim, census, "Seen"), 2);
    assert!(!sim.tree().contains(victim));
    assert_eq!(entity_names(&sim, sector), vec!["Director", "Spawned"]);
    assert!(sim.pending().is_empty());

    sim.update().unwrap();
    assert_eq!(int_attribute(&sim, census, "Seen"), 2);
    assert_eq!(entity_names(&sim, sector), vec!["Director", "Spawned", "Spawned"]);
}

#[test]
fn test_pending_edits_apply_in_recorded_order() {
    let mut sim = simulation();
    sim.register::<Reshuffle>().unwrap();
    let sector = sim.create_sector("Plains").unwrap();
    let keeper = sim.create_entity(sector, "Keeper").unwrap();
    let doomed = sim.create_entity(sector, "Doomed").unwrap();
    let fresh = sim.create_node(Box::new(Entity::new("Fresh"))).unwrap();

    let reshuffle = Reshuffle {
        fresh,
        doomed,
        ..Reshuffle::default()
    };
    add_action(&mut sim, keeper, Box::new(reshuffle));

    sim.update().unwrap();

    // Add then Remove of the same scope both run: it ends up destroyed.
    assert!(!sim.tree().contains(fresh));
    // Remove then Add of a copy both run: the copy replaces the original.
    assert!(!sim.tree().contains(doomed));
    let entities = sim
        .tree()
        .get(sector)
        .unwrap()
        .find(Sector::ENTITIES)
        .unwrap()
        .scopes()
        .to_vec();
    assert_eq!(entities.len(), 2);
    assert_eq!(entities[0], keeper);
    let copy = entities[1];
    assert_ne!(copy, doomed);
    assert_eq!(sim.tree().parent(copy), Some(sector));
    assert_eq!(entity_names(&sim, sector), vec!["Keeper", "Doomed"]);
    assert!(sim.pending().is_empty());
}

#[test]
fn test_spawned_copy_is_independent() {
    let mut sim = simulation();
    let sector = sim.create_sector("Plains").unwrap();
    let director = sim.create_entity(sector, "Director").unwrap();
    let spawn = add_spawner(&mut sim, director, Sector::ENTITIES, "Spawned");

    sim.update().unwrap();

    let prototype = sim
        .tree()
        .get(spawn)
        .unwrap()
        .find(ActionCreate::PROTOTYPE)
        .unwrap()
        .scope(0)
        .unwrap();
    let copy = *sim
        .tree()
        .get(sector)
        .unwrap()
        .find(Sector::ENTITIES)
        .unwrap()
        .scopes()
        .last()
        .unwrap();
    assert_ne!(copy, prototype);

    sim.tree_mut()
        .get_mut(copy)
        .unwrap()
        .find_mut("Name")
        .unwrap()
        .set(0, String::from("Renamed"))
        .unwrap();

    assert_eq!(host_as::<Entity>(sim.tree(), copy).unwrap().name(), "Renamed");
    assert_eq!(host_as::<Entity>(sim.tree(), prototype).unwrap().name(), "Spawned");
}

#[test]
fn test_create_without_destination_is_fatal() {
    let mut sim = simulation();
    let sector = sim.create_sector("Plains").unwrap();
    let director = sim.create_entity(sector, "Director").unwrap();
    add_spawner(&mut sim, director, "", "Spawned");
    let before = sim.tree().len();

    let result = sim.update();

    assert!(matches!(result, Err(SceneError::MissingAttributeName(_))));
    assert_eq!(sim.tree().len(), before);
    assert!(sim.pending().is_empty());
}

#[test]
fn test_traversal_error_discards_pending() {
    let mut sim = simulation();
    sim.register::<Broken>().unwrap();
    let sector = sim.create_sector("Plains").unwrap();
    let director = sim.create_entity(sector, "Director").unwrap();
    add_spawner(&mut sim, director, Sector::ENTITIES, "Spawned");
    add_action(&mut sim, director, Box::new(Broken::default()));
    let before = sim.tree().len();

    let result = sim.update();

    assert_eq!(result, Err(SceneError::Core(CoreError::EmptyName)));
    assert_eq!(sim.tree().len(), before);
    assert_eq!(entity_names(&sim, sector), vec!["Director"]);

    // Hosts are back in place after the failed pass.
    assert!(sim.tree().host(director).is_some());
}

#[test]
fn test_destroy_unknown_target_is_noop() {
    let mut sim = simulation();
    let sector = sim.create_sector("Plains").unwrap();
    let entity = sim.create_entity(sector, "Hero").unwrap();
    add_action(&mut sim, entity, Box::new(ActionDestroy::new("Cull", Sector::ENTITIES, "Ghost")));

    sim.update().unwrap();

    assert_eq!(entity_names(&sim, sector), vec!["Hero"]);
}

#[test]
fn test_entity_can_destroy_itself() {
    let mut sim = simulation();
    let sector = sim.create_sector("Plains").unwrap();
    let entity = sim.create_entity(sector, "Doomed").unwrap();
    let cull = add_action(&mut sim, entity, Box::new(ActionDestroy::new("Cull", Sector::ENTITIES, "Doomed")));

    sim.update().unwrap();

    assert!(!sim.tree().contains(entity));
    assert!(!sim.tree().contains(cull));
    assert!(entity_names(&sim, sector).is_empty());
}
