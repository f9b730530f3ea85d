use std::path::Path;

use tracing::{debug, info, warn};

use super::ServerConfig;

pub fn log_env_file(path: Option<&Path>) {
    match path {
        Some(path) => info!(
            target: "marinade_mcp::config",
            path = %path.display(),
            "Loaded environment variables from env file"
        ),
        None => debug!(
            target: "marinade_mcp::config",
            "No .env file found; using the process environment only"
        ),
    }
}

pub fn log_partial_credentials(present: &[&'static str]) {
    warn!(
        target: "marinade_mcp::config",
        present = ?present,
        required = ?["PRIVATE_KEY", "RPC_URL", "DEVNET_RPC_URL"],
        "Wallet credentials are incomplete; on-chain tools are disabled"
    );
}

pub fn log_loaded(config: &ServerConfig) {
    info!(
        target: "marinade_mcp::config",
        host = %config.server.host,
        port = config.server.port,
        network = config.network.as_str(),
        onchain_tools = config.onchain_enabled(),
        docs_url = %config.docs.base_url,
        "Configuration loaded successfully"
    );
}
