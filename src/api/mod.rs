mod command_runtime;
mod commands;
mod error;
mod router;
mod routes_core;
mod state;
pub mod types;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use bevy::prelude::*;
use crossbeam_channel::{Receiver, Sender};

use command_runtime::*;
use commands::*;
use error::CommandError;
use router::build_router;
use routes_core::*;
use state::*;
use types::*;

/// Serves the HTTP API and runs the command worker.
///
/// The listener is bound by the caller so a bad address fails startup
/// before the app loop begins.
pub struct ApiPlugin {
    listener: std::net::TcpListener,
}

impl ApiPlugin {
    pub fn new(listener: std::net::TcpListener) -> Self {
        Self { listener }
    }
}

impl Plugin for ApiPlugin {
    fn build(&self, app: &mut App) {
        let (tx, rx) = crossbeam_channel::unbounded::<ApiCommand>();

        app.insert_resource(ApiChannels { receiver: rx })
            .add_systems(Update, process_api_commands);

        let listener = match self.listener.try_clone() {
            Ok(listener) => listener,
            Err(e) => {
                error!("[API] Failed to hand listener to server thread: {}", e);
                std::process::exit(1);
            }
        };
        let state = AppState { sender: tx };
        std::thread::spawn(move || {
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    error!("[API] Failed to start tokio runtime: {}", e);
                    std::process::exit(1);
                }
            };
            rt.block_on(async {
                if let Err(e) = serve(listener, state).await {
                    error!("[API] HTTP server stopped: {}", e);
                    std::process::exit(1);
                }
            });
        });
    }
}

async fn serve(listener: std::net::TcpListener, state: AppState) -> std::io::Result<()> {
    listener.set_nonblocking(true)?;
    let listener = tokio::net::TcpListener::from_std(listener)?;
    if let Ok(addr) = listener.local_addr() {
        info!("[API] Listening on http://{}", addr);
    }
    axum::serve(listener, build_router(state)).await
}
