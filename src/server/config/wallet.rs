use std::fmt;

use serde::Deserialize;

use crate::lib::errors::ConfigError;

const MAINNET_FLAG: &str = "MAINNET";

/// Solana cluster the on-chain tools talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    Mainnet,
    #[default]
    Devnet,
}

impl Network {
    /// `ENVIRONMENT=MAINNET` selects mainnet; any other value selects devnet.
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag {
            Some(MAINNET_FLAG) => Network::Mainnet,
            _ => Network::Devnet,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Devnet => "devnet",
        }
    }

    /// Label used in startup logs.
    pub const fn mode_label(&self) -> &'static str {
        match self {
            Network::Mainnet => "Mainnet",
            Network::Devnet => "Testnet",
        }
    }

    /// Query string appended to Solana explorer links.
    pub const fn explorer_cluster_query(&self) -> &'static str {
        match self {
            Network::Mainnet => "",
            Network::Devnet => "?cluster=devnet",
        }
    }
}

/// Credentials required by the on-chain tools.
#[derive(Clone, PartialEq, Eq)]
pub struct WalletCredentials {
    pub private_key_base58: String,
    pub rpc_url_mainnet: String,
    pub rpc_url_devnet: String,
}

impl WalletCredentials {
    pub fn rpc_url(&self, network: Network) -> &str {
        match network {
            Network::Mainnet => &self.rpc_url_mainnet,
            Network::Devnet => &self.rpc_url_devnet,
        }
    }
}

impl fmt::Debug for WalletCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletCredentials")
            .field("private_key_base58", &"<redacted>")
            .field("rpc_url_mainnet", &self.rpc_url_mainnet)
            .field("rpc_url_devnet", &self.rpc_url_devnet)
            .finish()
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RawWalletSection {
    pub environment: Option<String>,
    pub private_key: Option<String>,
    pub rpc_url: Option<String>,
    pub devnet_rpc_url: Option<String>,
}

/// Wallet section after validation. `credentials` is `None` unless all three values are set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletSection {
    pub network: Network,
    pub credentials: Option<WalletCredentials>,
    /// Variables that were set while others were missing.
    pub partial: Vec<&'static str>,
}

pub fn parse_wallet_section(raw: RawWalletSection) -> Result<WalletSection, ConfigError> {
    let network = Network::from_flag(raw.environment.as_deref());
    let private_key = non_empty(raw.private_key);
    let rpc_url = non_empty(raw.rpc_url);
    let devnet_rpc_url = non_empty(raw.devnet_rpc_url);

    let credentials = match (private_key.clone(), rpc_url.clone(), devnet_rpc_url.clone()) {
        (Some(private_key_base58), Some(rpc_url_mainnet), Some(rpc_url_devnet)) => {
            validate_rpc_url("RPC_URL", &rpc_url_mainnet)?;
            validate_rpc_url("DEVNET_RPC_URL", &rpc_url_devnet)?;
            Some(WalletCredentials {
                private_key_base58,
                rpc_url_mainnet,
                rpc_url_devnet,
            })
        }
        _ => None,
    };

    let partial = if credentials.is_some() {
        Vec::new()
    } else {
        [
            ("PRIVATE_KEY", private_key.is_some()),
            ("RPC_URL", rpc_url.is_some()),
            ("DEVNET_RPC_URL", devnet_rpc_url.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    };

    Ok(WalletSection {
        network,
        credentials,
        partial,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn validate_rpc_url(field: &'static str, url: &str) -> Result<(), ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        return Ok(());
    }
    Err(ConfigError::InvalidField {
        field,
        message: format!("RPC endpoints must be http(s) URLs (got `{url}`)"),
    })
}
