use super::*;
use crate::components::NextLoadOrder;
use crate::attributes::AttributeError;
use crate::environment::{EnvironmentError, RobotDefinition};
use serde_json::json;

const ARM_XML: &str = r#"<Robot name="arm">
    <KinBody>
        <Joint name="shoulder" type="hinge"><limitsdeg>-90 90</limitsdeg></Joint>
        <Joint name="elbow" type="hinge"><limitsrad>-1 1</limitsrad></Joint>
    </KinBody>
</Robot>"#;

fn setup_runtime_app(receiver: Receiver<ApiCommand>, robots: &[&str]) -> App {
    let mut app = App::new();
    app.insert_resource(ApiChannels { receiver })
        .insert_resource(NextLoadOrder::default())
        .add_systems(Update, process_api_commands);
    let mut env = EcsEnvironment::new(app.world_mut());
    for name in robots {
        env.add_entity(RobotDefinition::new(*name))
            .expect("seed robot");
    }
    app
}

fn execute(app: &mut App, sender: &Sender<ApiCommand>, request: serde_json::Value) -> CommandReply {
    let command = RobotCommand::from_value(&request).expect("valid command");
    let (tx, rx) = tokio::sync::oneshot::channel();
    sender
        .send(ApiCommand::Execute(command, tx))
        .expect("send command");
    app.update();
    rx.blocking_recv().expect("command reply")
}

fn roster(app: &mut App, sender: &Sender<ApiCommand>) -> Vec<String> {
    let (tx, rx) = tokio::sync::oneshot::channel();
    sender.send(ApiCommand::ListRobots(tx)).expect("send list");
    app.update();
    rx.blocking_recv().expect("roster reply")
}

#[test]
fn add_puts_new_robot_in_roster_once() {
    let (sender, receiver) = crossbeam_channel::unbounded::<ApiCommand>();
    let mut app = setup_runtime_app(receiver, &["R1"]);

    let reply = execute(&mut app, &sender, json!({"type": "add", "xml": ARM_XML}));
    assert!(reply.outcome.is_ok());
    assert_eq!(reply.robots, vec!["R1", "arm"]);
    assert_eq!(reply.robots.iter().filter(|n| *n == "arm").count(), 1);

    let again = execute(&mut app, &sender, json!({"type": "add", "xml": ARM_XML}));
    assert!(matches!(
        again.outcome,
        Err(CommandError::Environment(EnvironmentError::DuplicateName(_)))
    ));
    assert_eq!(again.robots, vec!["R1", "arm"]);
}

#[test]
fn add_with_broken_xml_leaves_roster_alone() {
    let (sender, receiver) = crossbeam_channel::unbounded::<ApiCommand>();
    let mut app = setup_runtime_app(receiver, &["R1"]);

    let reply = execute(&mut app, &sender, json!({"type": "add", "xml": "<Robot name="}));
    assert!(matches!(reply.outcome, Err(CommandError::Definition(_))));
    assert_eq!(reply.robots, vec!["R1"]);
}

#[test]
fn rename_then_remove_scenario() {
    let (sender, receiver) = crossbeam_channel::unbounded::<ApiCommand>();
    let mut app = setup_runtime_app(receiver, &["R1"]);

    let renamed = execute(
        &mut app,
        &sender,
        json!({"type": "set", "robot": "R1", "set": {"Name": "R2"}}),
    );
    assert!(renamed.outcome.is_ok());
    assert_eq!(roster(&mut app, &sender), vec!["R2"]);

    let removed = execute(&mut app, &sender, json!({"type": "remove", "robot": "R2"}));
    assert!(removed.outcome.is_ok());
    assert!(roster(&mut app, &sender).is_empty());
}

#[test]
fn removing_twice_reports_not_found() {
    let (sender, receiver) = crossbeam_channel::unbounded::<ApiCommand>();
    let mut app = setup_runtime_app(receiver, &["R1", "R2"]);

    let first = execute(&mut app, &sender, json!({"type": "remove", "robot": "R1"}));
    assert!(first.outcome.is_ok());
    assert_eq!(first.robots, vec!["R2"]);

    let second = execute(&mut app, &sender, json!({"type": "remove", "robot": "R1"}));
    assert!(matches!(second.outcome, Err(CommandError::RobotNotFound(name)) if name == "R1"));
    assert_eq!(second.robots, vec!["R2"]);
}

#[test]
fn set_on_missing_robot_is_not_found() {
    let (sender, receiver) = crossbeam_channel::unbounded::<ApiCommand>();
    let mut app = setup_runtime_app(receiver, &["R1"]);

    let reply = execute(
        &mut app,
        &sender,
        json!({"type": "set", "robot": "ghost", "set": {"Name": "x"}}),
    );
    assert!(matches!(reply.outcome, Err(CommandError::RobotNotFound(_))));
    assert_eq!(reply.robots, vec!["R1"]);
}

#[test]
fn failed_set_applies_nothing() {
    let (sender, receiver) = crossbeam_channel::unbounded::<ApiCommand>();
    let mut app = setup_runtime_app(receiver, &[]);
    execute(&mut app, &sender, json!({"type": "add", "xml": ARM_XML}));

    let reply = execute(
        &mut app,
        &sender,
        json!({"type": "set", "robot": "arm", "set": {"Name": "renamed", "Color": "red"}}),
    );
    assert!(matches!(
        reply.outcome,
        Err(CommandError::Attribute(AttributeError::Unknown(_)))
    ));
    assert_eq!(reply.robots, vec!["arm"]);
}

#[test]
fn set_updates_joint_state() {
    let (sender, receiver) = crossbeam_channel::unbounded::<ApiCommand>();
    let mut app = setup_runtime_app(receiver, &[]);
    execute(&mut app, &sender, json!({"type": "add", "xml": ARM_XML}));

    let reply = execute(
        &mut app,
        &sender,
        json!({"type": "set", "robot": "arm", "set": {"DOFValues": [0.5, 5.0], "DOFWeights": [2.0, 3.0]}}),
    );
    assert!(reply.outcome.is_ok());

    let env = EcsEnvironment::new(app.world_mut());
    let handle = env.get_entity("arm").expect("arm loaded");
    let state = env.robot_state(handle).expect("state");
    assert_eq!(state.dof.values, vec![0.5, 1.0]);
    assert_eq!(state.dof.weights, vec![2.0, 3.0]);
}

#[test]
fn download_is_an_accepted_no_op() {
    let (sender, receiver) = crossbeam_channel::unbounded::<ApiCommand>();
    let mut app = setup_runtime_app(receiver, &["R1"]);

    let reply = execute(&mut app, &sender, json!({"type": "download"}));
    assert!(reply.outcome.is_ok());
    assert_eq!(reply.robots, vec!["R1"]);
}

#[test]
fn queued_commands_run_in_arrival_order() {
    let (sender, receiver) = crossbeam_channel::unbounded::<ApiCommand>();
    let mut app = setup_runtime_app(receiver, &["R1"]);

    let mut replies = Vec::new();
    for request in [
        json!({"type": "set", "robot": "R1", "set": {"Name": "R2"}}),
        json!({"type": "remove", "robot": "R1"}),
        json!({"type": "remove", "robot": "R2"}),
    ] {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let command = RobotCommand::from_value(&request).expect("valid command");
        sender
            .send(ApiCommand::Execute(command, tx))
            .expect("send command");
        replies.push(rx);
    }
    app.update();

    let replies: Vec<_> = replies
        .into_iter()
        .map(|rx| rx.blocking_recv().expect("reply"))
        .collect();
    assert!(replies[0].outcome.is_ok());
    assert!(matches!(replies[1].outcome, Err(CommandError::RobotNotFound(_))));
    assert!(replies[2].outcome.is_ok());
    assert_eq!(replies[0].robots, vec!["R2"]);
    assert!(replies[2].robots.is_empty());
}
