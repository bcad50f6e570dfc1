use super::*;

#[derive(Clone)]
pub(super) struct AppState {
    pub(super) sender: Sender<ApiCommand>,
}

impl AppState {
    /// Current roster, or `None` if the worker is gone.
    pub(super) async fn roster(&self) -> Option<Vec<String>> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.sender.send(ApiCommand::ListRobots(tx)).ok()?;
        rx.await.ok()
    }

    pub(super) async fn execute(&self, command: RobotCommand) -> Option<CommandReply> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.sender.send(ApiCommand::Execute(command, tx)).ok()?;
        rx.await.ok()
    }
}
