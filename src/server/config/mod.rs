//! Load and validate server configuration.
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use config::Environment;
use serde::Deserialize;
use tracing::{error, info};

use crate::lib::errors::ConfigError;

pub mod docs;
pub mod server;
pub mod telemetry;
pub mod wallet;

pub use docs::{
    DocsSection, ServerIdentity, MARINADE_FINANCE_DOCS_URL, MCP_CLIENT_NAME, MCP_CLIENT_VERSION,
    MCP_SERVER_NAME, MCP_SERVER_VERSION,
};
pub use server::{parse_server_section, RawServerSection, ServerSection, DEFAULT_HOST, DEFAULT_PORT};
pub use wallet::{
    parse_wallet_section, Network, RawWalletSection, WalletCredentials, WalletSection,
};

const ENV_ORIGIN: &str = "the process environment";

/// Top-level configuration container, built once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server: ServerSection,
    pub network: Network,
    pub wallet: Option<WalletCredentials>,
    pub docs: DocsSection,
    pub identity: ServerIdentity,
}

#[derive(Debug, Deserialize, Default)]
struct RawServerConfig {
    #[serde(flatten)]
    server: RawServerSection,
    #[serde(flatten)]
    wallet: RawWalletSection,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: ServerSection::default(),
            network: Network::default(),
            wallet: None,
            docs: DocsSection::default(),
            identity: ServerIdentity::default(),
        }
    }
}

impl ServerConfig {
    /// Read `HOST`, `PORT`, `ENVIRONMENT`, `PRIVATE_KEY`, `RPC_URL` and `DEVNET_RPC_URL`.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        Self::load(Environment::default())
    }

    /// Same as [`ServerConfig::load_from_env`] but reads from an explicit map.
    pub fn load_from_map(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::load(Environment::default().source(Some(vars)))
    }

    fn load(environment: Environment) -> Result<Self, ConfigError> {
        info!(
            target: "marinade_mcp::config",
            origin = ENV_ORIGIN,
            "Starting configuration load"
        );

        let document = config::Config::builder()
            .add_source(environment)
            .build()
            .map_err(|err| {
                let error = ConfigError::from_read_error(ENV_ORIGIN, err);
                error!(
                    target: "marinade_mcp::config",
                    reason = %error,
                    "Failed to read configuration"
                );
                error
            })?;

        let raw: RawServerConfig = document.try_deserialize().map_err(|err| {
            let error = ConfigError::from_parse_error(ENV_ORIGIN, err);
            error!(
                target: "marinade_mcp::config",
                reason = %error,
                "Failed to parse configuration"
            );
            error
        })?;

        let config = Self::from_raw(raw).map_err(|err| {
            error!(
                target: "marinade_mcp::config",
                reason = %err,
                "Failed to validate configuration"
            );
            err
        })?;

        telemetry::log_loaded(&config);
        Ok(config)
    }

    fn from_raw(raw: RawServerConfig) -> Result<Self, ConfigError> {
        let server = parse_server_section(raw.server)?;
        let wallet = parse_wallet_section(raw.wallet)?;
        if !wallet.partial.is_empty() {
            telemetry::log_partial_credentials(&wallet.partial);
        }

        Ok(Self {
            server,
            network: wallet.network,
            wallet: wallet.credentials,
            docs: DocsSection::default(),
            identity: ServerIdentity::default(),
        })
    }

    /// On-chain tools are registered only when wallet credentials are complete.
    pub fn onchain_enabled(&self) -> bool {
        self.wallet.is_some()
    }

    /// Apply command-line overrides for the HTTP bind address.
    pub fn with_bind_overrides(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.server.host = host;
        }
        if let Some(port) = port {
            self.server.port = port;
        }
        self
    }
}

/// Load an env file into the process environment without overriding existing variables.
///
/// An explicit path must exist; otherwise a `.env` in the working directory (or its
/// ancestors) is used when present.
pub fn load_env_file(explicit: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    match explicit {
        Some(path) => {
            dotenv::from_path(path).map_err(|source| ConfigError::EnvFile {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(Some(path.to_path_buf()))
        }
        None => Ok(dotenv::dotenv().ok()),
    }
}
