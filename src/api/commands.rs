use super::*;

/// Commands sent from API -> environment worker
pub enum ApiCommand {
    ListRobots(tokio::sync::oneshot::Sender<Vec<String>>),
    Execute(RobotCommand, tokio::sync::oneshot::Sender<CommandReply>),
}

/// Outcome of one executed command, with the roster read right after it ran.
pub struct CommandReply {
    pub outcome: Result<(), CommandError>,
    pub robots: Vec<String>,
}

#[derive(Resource)]
pub struct ApiChannels {
    pub receiver: Receiver<ApiCommand>,
}
