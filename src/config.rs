use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

pub const DEFAULT_SCENE: &str = "data/lab1.env.xml";

/// Initialize a simulation environment and serve it over HTTP.
#[derive(Parser, Debug, Clone)]
#[command(name = "robohost", version)]
pub struct ServerConfig {
    /// Server IP address
    #[arg(short = 'l', long, env = "ROBOHOST_LISTEN", default_value = "0.0.0.0")]
    pub listen: String,

    /// Server port
    #[arg(short = 'p', long, env = "ROBOHOST_PORT", default_value_t = 8888)]
    pub port: u16,

    /// Scene file loaded at startup
    #[arg(short = 'e', long = "env", env = "ROBOHOST_ENV", default_value = DEFAULT_SCENE)]
    pub env: PathBuf,

    /// Command worker loop rate in Hz
    #[arg(long, env = "ROBOHOST_TICK_HZ", default_value_t = 120.0, value_parser = parse_tick_hz)]
    pub tick_hz: f64,
}

impl ServerConfig {
    pub fn bind_address(&self) -> (&str, u16) {
        (self.listen.as_str(), self.port)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_hz)
    }
}

fn parse_tick_hz(s: &str) -> Result<f64, String> {
    let hz: f64 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if !hz.is_finite() || hz <= 0.0 {
        return Err(format!("tick rate must be positive, got {hz}"));
    }
    Ok(hz)
}
