//! The simulation environment: the robot collection the API operates on.
//!
//! [`SimulationEnvironment`] is the capability surface the command
//! dispatcher needs. [`EcsEnvironment`] implements it over a bevy `World`,
//! one entity per robot.

pub mod definition;
pub mod error;
pub mod scene;

use std::path::Path;

use bevy::prelude::*;

use crate::components::{DofState, LoadOrder, NextLoadOrder, RobotName};
pub use definition::{parse_robot_str, JointDefinition, JointKind, RobotDefinition};
pub use error::{DefinitionError, EnvironmentError};

/// Opaque reference to a loaded robot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RobotHandle(Entity);

/// Attribute-bearing view of one robot. Staged by `set`, then committed.
#[derive(Clone, Debug, PartialEq)]
pub struct RobotState {
    pub name: String,
    pub dof: DofState,
}

pub trait SimulationEnvironment {
    /// Load every robot in a scene file. Returns the number of robots added.
    fn load_scene(&mut self, path: &Path) -> Result<usize, EnvironmentError>;

    /// Names of loaded robots in load order.
    fn list_entity_names(&self) -> Vec<String>;

    fn parse_entity_definition(&self, xml: &str) -> Result<RobotDefinition, DefinitionError>;

    fn add_entity(&mut self, definition: RobotDefinition) -> Result<RobotHandle, EnvironmentError>;

    fn get_entity(&self, name: &str) -> Option<RobotHandle>;

    fn remove_entity(&mut self, handle: RobotHandle) -> Result<(), EnvironmentError>;

    /// Snapshot of a robot's attributes.
    fn robot_state(&self, handle: RobotHandle) -> Result<RobotState, EnvironmentError>;

    /// Replace a robot's attributes with `state`.
    fn commit_robot_state(
        &mut self,
        handle: RobotHandle,
        state: RobotState,
    ) -> Result<(), EnvironmentError>;
}

pub struct EnvironmentPlugin;

impl Plugin for EnvironmentPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NextLoadOrder>();
    }
}

/// [`SimulationEnvironment`] over a bevy `World`.
pub struct EcsEnvironment<'w> {
    world: &'w mut World,
}

impl<'w> EcsEnvironment<'w> {
    pub fn new(world: &'w mut World) -> Self {
        Self { world }
    }

    fn robots(&self) -> Vec<(LoadOrder, Entity, &RobotName)> {
        let mut robots: Vec<_> = self
            .world
            .iter_entities()
            .filter_map(|e| Some((*e.get::<LoadOrder>()?, e.id(), e.get::<RobotName>()?)))
            .collect();
        robots.sort_by_key(|(order, _, _)| *order);
        robots
    }

    fn name_taken_by_other(&self, name: &str, handle: Option<RobotHandle>) -> bool {
        self.robots()
            .iter()
            .any(|(_, entity, n)| n.0 == name && Some(RobotHandle(*entity)) != handle)
    }
}

impl SimulationEnvironment for EcsEnvironment<'_> {
    fn load_scene(&mut self, path: &Path) -> Result<usize, EnvironmentError> {
        let xml = std::fs::read_to_string(path).map_err(|source| EnvironmentError::SceneRead {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let robots = scene::parse_scene_str(&xml, base_dir).map_err(|source| {
            EnvironmentError::SceneDefinition {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let count = robots.len();
        for robot in robots {
            let name = robot.name.clone();
            let dof = robot.dof();
            self.add_entity(robot)?;
            debug!("[Environment] Loaded robot {} ({} DOF)", name, dof);
        }
        Ok(count)
    }

    fn list_entity_names(&self) -> Vec<String> {
        self.robots()
            .into_iter()
            .map(|(_, _, name)| name.0.clone())
            .collect()
    }

    fn parse_entity_definition(&self, xml: &str) -> Result<RobotDefinition, DefinitionError> {
        parse_robot_str(xml)
    }

    fn add_entity(&mut self, definition: RobotDefinition) -> Result<RobotHandle, EnvironmentError> {
        if self.name_taken_by_other(&definition.name, None) {
            return Err(EnvironmentError::DuplicateName(definition.name));
        }
        let order = self
            .world
            .get_resource_or_insert_with(NextLoadOrder::default)
            .allocate();
        let dof = definition.dof_state();
        let entity = self
            .world
            .spawn((RobotName(definition.name), order, dof))
            .id();
        Ok(RobotHandle(entity))
    }

    fn get_entity(&self, name: &str) -> Option<RobotHandle> {
        self.robots()
            .into_iter()
            .find(|(_, _, n)| n.0 == name)
            .map(|(_, entity, _)| RobotHandle(entity))
    }

    fn remove_entity(&mut self, handle: RobotHandle) -> Result<(), EnvironmentError> {
        if self.world.get::<RobotName>(handle.0).is_none() {
            return Err(EnvironmentError::StaleHandle);
        }
        self.world.despawn(handle.0);
        Ok(())
    }

    fn robot_state(&self, handle: RobotHandle) -> Result<RobotState, EnvironmentError> {
        match (
            self.world.get::<RobotName>(handle.0),
            self.world.get::<DofState>(handle.0),
        ) {
            (Some(name), Some(dof)) => Ok(RobotState {
                name: name.0.clone(),
                dof: dof.clone(),
            }),
            _ => Err(EnvironmentError::StaleHandle),
        }
    }

    fn commit_robot_state(
        &mut self,
        handle: RobotHandle,
        state: RobotState,
    ) -> Result<(), EnvironmentError> {
        if self.world.get::<RobotName>(handle.0).is_none() {
            return Err(EnvironmentError::StaleHandle);
        }
        if self.name_taken_by_other(&state.name, Some(handle)) {
            return Err(EnvironmentError::DuplicateName(state.name));
        }
        self.world
            .entity_mut(handle.0)
            .insert((RobotName(state.name), state.dof));
        Ok(())
    }
}
