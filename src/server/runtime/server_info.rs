use crate::{cli::LaunchProfile, server::config::ServerConfig};

/// Build the `ServerInfo.instructions` string shown to MCP clients.
pub fn build_instructions(profile: &LaunchProfile, config: &ServerConfig) -> String {
    let onchain = if config.onchain_enabled() {
        format!(
            "On-chain tools (get_marinade_state, get_msol_balance, stake_msol, unstake_msol, send_msol) act on {network} with the configured wallet; stake, unstake and send submit real transactions.",
            network = config.network.as_str()
        )
    } else {
        "On-chain tools are disabled; set PRIVATE_KEY, RPC_URL and DEVNET_RPC_URL to enable them."
            .to_string()
    };
    format!(
        "Marinade Finance MCP server ({transport} mode). Use search_documentation for questions about Marinade liquid staking. {onchain}",
        transport = profile.transport.as_str(),
    )
}
