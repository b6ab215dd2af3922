use serde::Deserialize;

// Re-export the reconnect policy config so callers can build a full
// ClientConfig from one import.
pub use crate::reconnect::ReconnectConfig;

/// Complete client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// WebSocket endpoint for the activity update stream
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

fn default_endpoint() -> String {
    "ws://localhost:8000/ws/activities".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            reconnect: ReconnectConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Config pointing at a specific endpoint, default reconnect policy
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> Result<ClientConfig, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    let config: ClientConfig = toml::from_str(&contents)?;
    Ok(config)
}
