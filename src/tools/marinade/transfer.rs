use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use spl_associated_token_account::{
    get_associated_token_address, instruction::create_associated_token_account_idempotent,
};
use tracing::info;

use super::{
    balance::{parse_address, token_balance},
    parse_amount, ui_amount, MarinadeTools, INSUFFICIENT_BALANCE, MSOL_DECIMALS, MSOL_MINT,
    SEND_LABELS, SEND_TOOL_ID,
};
use crate::{
    lib::errors::ChainError,
    tools::envelope::{with_tool_error_handling, ToolFailure, ToolResult},
};

pub const INVALID_RECIPIENT_ADDRESS: &str = "Invalid recipient address";

/// Input for `send_msol`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMsolRequest {
    /// Wallet that receives the mSOL
    pub recipient_address: String,
    /// Amount of mSOL to send
    #[schemars(range(min = 0.0))]
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferReceipt {
    pub success: bool,
    pub transaction_signature: String,
    pub explorer_url: String,
    pub sender_address: String,
    pub recipient_address: String,
    pub recipient_token_account: String,
    pub recipient_account_created: bool,
    pub amount: f64,
    pub raw_amount: String,
    pub network: &'static str,
}

/// `send_msol`: SPL transfer of mSOL to another wallet.
pub async fn send_msol(tools: MarinadeTools<'_>, request: SendMsolRequest) -> ToolResult {
    with_tool_error_handling(SEND_TOOL_ID, SEND_LABELS, async {
        let recipient = parse_address(INVALID_RECIPIENT_ADDRESS, &request.recipient_address)?;
        let amount = parse_amount(request.amount)?;
        let context = tools.open()?;
        let sender = context.wallet();

        let source = get_associated_token_address(&sender, &MSOL_MINT);
        let available = token_balance(&context.client, &source)
            .await?
            .unwrap_or_default();
        if available < amount {
            return Err(ToolFailure::rejected(
                INSUFFICIENT_BALANCE,
                format!(
                    "Wallet {sender} holds {} mSOL but {} mSOL is required",
                    ui_amount(available),
                    ui_amount(amount)
                ),
            ));
        }

        let destination = get_associated_token_address(&recipient, &MSOL_MINT);
        let recipient_account_created = token_balance(&context.client, &destination)
            .await?
            .is_none();

        let mut instructions = Vec::with_capacity(2);
        if recipient_account_created {
            instructions.push(create_associated_token_account_idempotent(
                &sender,
                &recipient,
                &MSOL_MINT,
                &spl_token::id(),
            ));
        }
        instructions.push(
            spl_token::instruction::transfer_checked(
                &spl_token::id(),
                &source,
                &MSOL_MINT,
                &destination,
                &sender,
                &[],
                amount,
                MSOL_DECIMALS,
            )
            .map_err(ChainError::from)?,
        );
        let signature = context.submit(&instructions).await?;

        info!(
            target: "marinade_mcp::tools",
            amount,
            recipient = %recipient,
            recipient_account_created,
            signature = %signature,
            "Sent mSOL"
        );
        Ok::<_, ToolFailure>(TransferReceipt {
            success: true,
            transaction_signature: signature.to_string(),
            explorer_url: context.explorer_url(&signature),
            sender_address: sender.to_string(),
            recipient_address: recipient.to_string(),
            recipient_token_account: destination.to_string(),
            recipient_account_created,
            amount: ui_amount(amount),
            raw_amount: amount.to_string(),
            network: context.network.as_str(),
        })
    })
    .await
}
