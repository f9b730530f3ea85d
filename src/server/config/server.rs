use serde::Deserialize;

use crate::lib::errors::ConfigError;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

/// HTTP bind settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RawServerSection {
    pub host: Option<String>,
    pub port: Option<String>,
}

pub fn parse_server_section(raw: RawServerSection) -> Result<ServerSection, ConfigError> {
    let host = raw
        .host
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = match raw.port.as_deref().map(str::trim) {
        None | Some("") => DEFAULT_PORT,
        Some(value) => parse_port(value)?,
    };
    Ok(ServerSection { host, port })
}

fn parse_port(value: &str) -> Result<u16, ConfigError> {
    match value.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(ConfigError::InvalidField {
            field: "PORT",
            message: format!("Use a port in the range 1-65535 (got `{value}`)"),
        }),
    }
}
