//! # Lattice Scene
//!
//! World / Sector / Entity / Action tree built on the attribute tree.
//!
//! Each node is a scope hosted by a [`SceneNode`]. A [`Simulation`] ticks
//! the world: nodes update in table order, structural edits they request
//! are queued as [`PendingChild`] records and applied once the pass is
//! over.
//!
//! ## Example
//!
//! ```
//! use lattice_scene::{ActionIncrement, Simulation, SimulationConfig};
//!
//! let mut sim = Simulation::new(&SimulationConfig::default()).unwrap();
//! let sector = sim.create_sector("Plains").unwrap();
//! let hero = sim.create_entity(sector, "Hero").unwrap();
//! sim.tree_mut().append(hero, "Score").unwrap().push_back(0).unwrap();
//!
//! let bump = sim.create_action(hero, "ActionIncrement", "Bump").unwrap();
//! let mut scope = sim.tree_mut().get_mut(bump).unwrap();
//! scope.find_mut(ActionIncrement::TARGET).unwrap().set(0, String::from("Score")).unwrap();
//!
//! sim.update().unwrap();
//! sim.update().unwrap();
//! let score = sim.tree().get(hero).unwrap().find("Score").unwrap();
//! assert_eq!(score.get::<i32>(0).unwrap(), 2);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod action;
pub mod clock;
pub mod config;
pub mod context;
pub mod entity;
pub mod error;
pub mod factory;
pub mod loader;
pub mod node;
pub mod pending;
pub mod sector;
pub mod simulation;
pub mod world;

pub use action::{Action, ActionCreate, ActionDestroy, ActionIncrement, ActionList, ActionListIf};
pub use clock::{GameClock, GameTime};
pub use config::{ClockConfig, SimulationConfig};
pub use context::{UpdateContext, WorldState};
pub use entity::Entity;
pub use error::{SceneError, SceneResult};
pub use factory::{Constructor, Factory};
pub use loader::{DocumentLoader, CLASS_KEY};
pub use node::{host_as, host_as_mut, node_name, SceneNode, SceneTree, NAME};
pub use pending::{PendingChild, PendingOp};
pub use sector::Sector;
pub use simulation::Simulation;
pub use world::World;
