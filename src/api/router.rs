use super::*;
use axum::extract::DefaultBodyLimit;

/// Every path answers: GET reports the roster, POST runs a command.
/// Request bodies are not size-capped; robot documents can be large.
pub(super) fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(get_status).post(post_command))
        .route("/{*path}", get(get_status).post(post_command))
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}
