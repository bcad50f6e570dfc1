mod api;
mod attributes;
mod components;
mod config;
mod environment;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use clap::Parser;

use config::ServerConfig;
use environment::{EcsEnvironment, EnvironmentPlugin, SimulationEnvironment};

fn main() {
    let config = ServerConfig::parse();

    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(config.tick_interval())),
        LogPlugin::default(),
        EnvironmentPlugin,
    ));

    info!("[Robohost] Starting environment {}", config.env.display());
    match EcsEnvironment::new(app.world_mut()).load_scene(&config.env) {
        Ok(count) => info!("[Robohost] Loaded {} robots", count),
        Err(e) => {
            error!("[Robohost] {}", e);
            std::process::exit(1);
        }
    }

    let listener = match std::net::TcpListener::bind(config.bind_address()) {
        Ok(listener) => listener,
        Err(e) => {
            error!(
                "[Robohost] Failed to bind {}:{}: {}",
                config.listen, config.port, e
            );
            std::process::exit(1);
        }
    };
    info!(
        "[Robohost] Starting HTTP server on {}:{}",
        config.listen, config.port
    );

    app.add_plugins(api::ApiPlugin::new(listener));
    app.run();
}
