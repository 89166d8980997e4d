//! Server configuration: defaults, optional TOML file, then CLI/env.

use std::net::IpAddr;
use std::path::Path;

use pairchat_common::ConfigError;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub bind_address: String,
    /// Port to listen on.
    pub port: u16,
    /// Largest inbound text frame accepted, in bytes.
    pub max_message_bytes: usize,
    /// Per-connection outbound event buffer.
    pub outbound_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".into(),
            port: 3000,
            max_message_bytes: 4096,
            outbound_buffer: 256,
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Overrides taken from the command line or environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub port: Option<u16>,
    pub bind_address: Option<String>,
}

pub fn load_from_path(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ParseError(format!("failed to read {}: {e}", path.display())))?;

    let config: ServerConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Build the effective config and validate it.
pub fn resolve(file: Option<&Path>, overrides: Overrides) -> Result<ServerConfig, ConfigError> {
    let mut config = match file {
        Some(path) => load_from_path(path)?,
        None => ServerConfig::default(),
    };

    if let Some(port) = overrides.port {
        config.port = port;
    }
    if let Some(bind) = overrides.bind_address {
        config.bind_address = bind;
    }

    validate(&config)?;
    Ok(config)
}

/// Run all validations, collecting every error into one.
pub fn validate(config: &ServerConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    if config.bind_address.parse::<IpAddr>().is_err() {
        errors.push(format!(
            "bind_address = {:?} is not an IP address",
            config.bind_address
        ));
    }
    validate_range(
        &mut errors,
        "max_message_bytes",
        config.max_message_bytes,
        1,
        1024 * 1024,
    );
    validate_range(&mut errors, "outbound_buffer", config.outbound_buffer, 1, 65_536);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_range(errors: &mut Vec<String>, name: &str, value: usize, min: usize, max: usize) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}
