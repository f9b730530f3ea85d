use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use solana_sdk::{commitment_config::CommitmentConfig, signature::Signature};
use spl_associated_token_account::{
    get_associated_token_address, instruction::create_associated_token_account_idempotent,
};
use tracing::info;

use super::{
    parse_amount, program, state::fetch_state, ui_amount, ChainContext, MarinadeTools,
    INSUFFICIENT_BALANCE, MARINADE_STATE_ADDRESS, STAKE_LABELS, STAKE_TOOL_ID, UNSTAKE_LABELS,
    UNSTAKE_TOOL_ID,
};
use crate::{
    lib::errors::ChainError,
    tools::envelope::{with_tool_error_handling, ToolFailure, ToolResult},
};

/// Input for `stake_msol`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StakeMsolRequest {
    /// Amount of SOL to stake
    #[schemars(range(min = 0.0))]
    pub amount: f64,
}

/// Input for `unstake_msol`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UnstakeMsolRequest {
    /// Amount of mSOL to unstake
    #[schemars(range(min = 0.0))]
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeReceipt {
    pub success: bool,
    pub transaction_signature: String,
    pub explorer_url: String,
    pub amount: f64,
    pub raw_amount: String,
    pub msol_token_account: String,
    pub network: &'static str,
}

impl StakeReceipt {
    fn new(context: &ChainContext, signature: &Signature, raw_amount: u64, token_account: String) -> Self {
        Self {
            success: true,
            transaction_signature: signature.to_string(),
            explorer_url: context.explorer_url(signature),
            amount: ui_amount(raw_amount),
            raw_amount: raw_amount.to_string(),
            msol_token_account: token_account,
            network: context.network.as_str(),
        }
    }
}

/// `stake_msol`: deposit SOL into Marinade and receive mSOL.
pub async fn stake_msol(tools: MarinadeTools<'_>, request: StakeMsolRequest) -> ToolResult {
    with_tool_error_handling(STAKE_TOOL_ID, STAKE_LABELS, async {
        let lamports = parse_amount(request.amount)?;
        let context = tools.open()?;
        let wallet = context.wallet();

        let available = context
            .client
            .get_balance_with_commitment(&wallet, CommitmentConfig::confirmed())
            .await
            .map_err(ChainError::from)?
            .value;
        if available < lamports {
            return Err(ToolFailure::rejected(
                INSUFFICIENT_BALANCE,
                format!(
                    "Wallet {wallet} holds {} SOL but {} SOL is required",
                    ui_amount(available),
                    ui_amount(lamports)
                ),
            ));
        }

        let state = fetch_state(&context.client, &MARINADE_STATE_ADDRESS).await?;
        let msol_account = get_associated_token_address(&wallet, &state.msol_mint);
        let signature = context
            .submit(&[
                create_associated_token_account_idempotent(
                    &wallet,
                    &wallet,
                    &state.msol_mint,
                    &spl_token::id(),
                ),
                program::deposit(&state, &wallet, &msol_account, lamports),
            ])
            .await?;

        info!(
            target: "marinade_mcp::tools",
            lamports,
            signature = %signature,
            "Staked SOL with Marinade"
        );
        Ok::<_, ToolFailure>(StakeReceipt::new(
            &context,
            &signature,
            lamports,
            msol_account.to_string(),
        ))
    })
    .await
}

/// `unstake_msol`: swap mSOL for SOL through the liquidity pool.
///
/// There is no balance pre-check; the program rejects overdrafts.
pub async fn unstake_msol(tools: MarinadeTools<'_>, request: UnstakeMsolRequest) -> ToolResult {
    with_tool_error_handling(UNSTAKE_TOOL_ID, UNSTAKE_LABELS, async {
        let msol_amount = parse_amount(request.amount)?;
        let context = tools.open()?;
        let wallet = context.wallet();

        let state = fetch_state(&context.client, &MARINADE_STATE_ADDRESS).await?;
        let msol_account = get_associated_token_address(&wallet, &state.msol_mint);
        let signature = context
            .submit(&[program::liquid_unstake(
                &state,
                &wallet,
                &msol_account,
                msol_amount,
            )])
            .await?;

        info!(
            target: "marinade_mcp::tools",
            msol_amount,
            signature = %signature,
            "Liquid-unstaked mSOL"
        );
        Ok::<_, ToolFailure>(StakeReceipt::new(
            &context,
            &signature,
            msol_amount,
            msol_account.to_string(),
        ))
    })
    .await
}
