use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};
use spl_associated_token_account::get_associated_token_address;
use spl_token::solana_program::program_pack::Pack;

use super::{ui_amount, MarinadeTools, BALANCE_LABELS, BALANCE_TOOL_ID, MSOL_MINT};
use crate::{
    lib::errors::ChainError,
    tools::envelope::{with_tool_error_handling, ToolFailure, ToolResult},
};

pub const INVALID_WALLET_ADDRESS: &str = "Invalid wallet address";

/// Input for `get_msol_balance`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetMsolBalanceRequest {
    /// Wallet to inspect; defaults to the configured wallet
    #[serde(default)]
    pub wallet_address: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MsolBalance {
    pub wallet_address: String,
    pub token_account: String,
    pub balance: f64,
    pub raw_balance: String,
    pub network: &'static str,
}

/// Parse a base58 address, labelling the failure for the caller.
pub fn parse_address(label: &'static str, address: &str) -> Result<Pubkey, ToolFailure> {
    Pubkey::from_str(address.trim()).map_err(|err| {
        ToolFailure::rejected(label, format!("{address:?} is not a valid public key: {err}"))
    })
}

/// mSOL held by the token account at `token_account`; `None` when it does not exist.
pub async fn token_balance(
    client: &RpcClient,
    token_account: &Pubkey,
) -> Result<Option<u64>, ChainError> {
    let Some(account) = client
        .get_account_with_commitment(token_account, CommitmentConfig::confirmed())
        .await?
        .value
    else {
        return Ok(None);
    };
    let token = spl_token::state::Account::unpack(&account.data).map_err(|err| {
        ChainError::Decode {
            account: "mSOL token",
            message: err.to_string(),
        }
    })?;
    Ok(Some(token.amount))
}

/// `get_msol_balance`: mSOL held by a wallet's associated token account.
pub async fn get_msol_balance(tools: MarinadeTools<'_>, request: GetMsolBalanceRequest) -> ToolResult {
    with_tool_error_handling(BALANCE_TOOL_ID, BALANCE_LABELS, async {
        let requested = request
            .wallet_address
            .as_deref()
            .filter(|address| !address.trim().is_empty())
            .map(|address| parse_address(INVALID_WALLET_ADDRESS, address))
            .transpose()?;

        let context = tools.open()?;
        let owner = requested.unwrap_or_else(|| context.wallet());
        let token_account = get_associated_token_address(&owner, &MSOL_MINT);
        let raw = token_balance(&context.client, &token_account)
            .await?
            .unwrap_or_default();

        Ok::<_, ToolFailure>(MsolBalance {
            wallet_address: owner.to_string(),
            token_account: token_account.to_string(),
            balance: ui_amount(raw),
            raw_balance: raw.to_string(),
            network: context.network.as_str(),
        })
    })
    .await
}
