use super::*;
use axum::extract::rejection::BytesRejection;

type EnvelopeResponse = (StatusCode, Json<Envelope>);

pub(super) async fn get_status(State(state): State<AppState>) -> EnvelopeResponse {
    match state.roster().await {
        Some(robots) => (StatusCode::OK, Json(Envelope::success(robots))),
        None => worker_unavailable(),
    }
}

pub(super) async fn post_command(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> EnvelopeResponse {
    let parsed = body
        .map_err(CommandError::from)
        .and_then(|body| RobotCommand::from_body(&body));
    let command = match parsed {
        Ok(command) => command,
        Err(err) => {
            warn!("[API] Rejected request: {}", err);
            return match state.roster().await {
                Some(robots) => command_failed(&err, robots),
                None => worker_unavailable(),
            };
        }
    };

    match state.execute(command).await {
        Some(CommandReply {
            outcome: Ok(()),
            robots,
        }) => (StatusCode::OK, Json(Envelope::success(robots))),
        Some(CommandReply {
            outcome: Err(err),
            robots,
        }) => command_failed(&err, robots),
        None => worker_unavailable(),
    }
}

fn command_failed(err: &CommandError, robots: Vec<String>) -> EnvelopeResponse {
    (
        err.status(),
        Json(Envelope::failure(err.wire_message(), robots)),
    )
}

fn worker_unavailable() -> EnvelopeResponse {
    error!("[API] Environment worker is not running");
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(Envelope::failure("Simulation environment unavailable", Vec::new())),
    )
}
