use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Server configuration.
///
/// Loadable from a JSON file; missing fields take the documented defaults.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the listener binds.
    pub bind_addr: SocketAddr,
    /// Bytes pre-allocated per connection window.
    pub initial_window: usize,
    /// Safety cap on a single pull or watch-delta closure.
    pub max_pull_vertices: usize,
    /// Maximum concurrently served connections.
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:9418".parse().expect("static address"),
            initial_window: 64 * 1024,
            max_pull_vertices: 1_000_000,
            max_connections: 256,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|e| ServerError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, "127.0.0.1:9418".parse().unwrap());
        assert_eq!(config.initial_window, 64 * 1024);
        assert_eq!(config.max_pull_vertices, 1_000_000);
        assert_eq!(config.max_connections, 256);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: ServerConfig =
            serde_json::from_str(r#"{"bind_addr": "0.0.0.0:7070"}"#).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:7070".parse().unwrap());
        assert_eq!(config.max_connections, 256);
    }

    #[test]
    fn json_roundtrip() {
        let config = ServerConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ServerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.bind_addr, config.bind_addr);
        assert_eq!(parsed.initial_window, config.initial_window);
    }
}
