#[cfg(test)]
mod tests;

use super::*;
use crate::attributes::apply_attribute;
use crate::environment::{EcsEnvironment, SimulationEnvironment};

/// Drain queued API commands against the environment world.
///
/// This is the only place the environment is touched after startup, so
/// commands apply one at a time in arrival order.
pub(super) fn process_api_commands(world: &mut World) {
    let Some(receiver) = world
        .get_resource::<ApiChannels>()
        .map(|channels| channels.receiver.clone())
    else {
        return;
    };

    while let Ok(cmd) = receiver.try_recv() {
        handle_api_command(world, cmd);
    }
}

pub(super) fn handle_api_command(world: &mut World, cmd: ApiCommand) {
    let mut env = EcsEnvironment::new(world);
    match cmd {
        ApiCommand::ListRobots(tx) => {
            let _ = tx.send(env.list_entity_names());
        }
        ApiCommand::Execute(command, tx) => {
            let kind = command.kind();
            let outcome = execute_command(&mut env, command);
            match &outcome {
                Ok(()) => info!("[API] {} applied", kind),
                Err(e) => warn!("[API] {} failed: {}", kind, e),
            }
            let robots = env.list_entity_names();
            let _ = tx.send(CommandReply { outcome, robots });
        }
    }
}

/// Run one command. On error the environment is left as it was.
pub(super) fn execute_command<E: SimulationEnvironment>(
    env: &mut E,
    command: RobotCommand,
) -> Result<(), CommandError> {
    match command {
        RobotCommand::Add { xml } => {
            let definition = env.parse_entity_definition(&xml)?;
            env.add_entity(definition)?;
        }
        RobotCommand::Set { robot, attributes } => {
            let handle = env
                .get_entity(&robot)
                .ok_or(CommandError::RobotNotFound(robot))?;
            let mut staged = env.robot_state(handle)?;
            for (key, value) in &attributes {
                apply_attribute(&mut staged, key, value)?;
            }
            env.commit_robot_state(handle, staged)?;
        }
        RobotCommand::Remove { robot } => {
            let handle = env
                .get_entity(&robot)
                .ok_or(CommandError::RobotNotFound(robot))?;
            env.remove_entity(handle)?;
        }
        RobotCommand::Download => {}
    }
    Ok(())
}
