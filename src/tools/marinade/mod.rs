//! On-chain Marinade tools: protocol state, mSOL balance, staking, and transfers.

pub mod balance;
pub mod connection;
pub mod program;
pub mod state;
pub mod stake;
pub mod transfer;

use crate::{
    lib::{
        errors::ChainError,
        sanitize::{safe_serialize, SanitizePolicy},
    },
    server::config::{Network, WalletCredentials},
    tools::envelope::{with_tool_error_handling, ErrorLabels, ToolFailure, ToolResult},
};

pub use balance::{get_msol_balance, GetMsolBalanceRequest};
pub use connection::{ChainContext, LiveRpcConnector, MockRpcConnector, RpcConnector};
pub use program::{MARINADE_PROGRAM_ID, MARINADE_STATE_ADDRESS, MSOL_DECIMALS, MSOL_MINT};
pub use stake::{stake_msol, unstake_msol, StakeMsolRequest, UnstakeMsolRequest};
pub use transfer::{send_msol, SendMsolRequest};

pub const STATE_TOOL_ID: &str = "get_marinade_state";
pub const BALANCE_TOOL_ID: &str = "get_msol_balance";
pub const STAKE_TOOL_ID: &str = "stake_msol";
pub const UNSTAKE_TOOL_ID: &str = "unstake_msol";
pub const SEND_TOOL_ID: &str = "send_msol";

pub const STATE_LABELS: ErrorLabels =
    ErrorLabels::new("Failed to fetch Marinade state", "Request timed out");
pub const BALANCE_LABELS: ErrorLabels =
    ErrorLabels::new("Failed to fetch mSOL balance", "Request timed out");
pub const STAKE_LABELS: ErrorLabels = ErrorLabels::new("Failed to stake SOL", "Transaction timed out");
pub const UNSTAKE_LABELS: ErrorLabels =
    ErrorLabels::new("Failed to unstake mSOL", "Transaction timed out");
pub const SEND_LABELS: ErrorLabels = ErrorLabels::new("Failed to send mSOL", "Transaction timed out");

pub const INVALID_AMOUNT: &str = "Invalid amount";
pub const INSUFFICIENT_BALANCE: &str = "Insufficient balance";

/// Everything an on-chain tool call needs from the server.
#[derive(Clone, Copy)]
pub struct MarinadeTools<'a> {
    pub wallet: Option<&'a WalletCredentials>,
    pub network: Network,
    pub connector: &'a dyn RpcConnector,
}

impl<'a> MarinadeTools<'a> {
    pub fn new(
        wallet: Option<&'a WalletCredentials>,
        network: Network,
        connector: &'a dyn RpcConnector,
    ) -> Self {
        Self {
            wallet,
            network,
            connector,
        }
    }

    /// Fresh connection for one invocation.
    pub fn open(&self) -> Result<ChainContext, ChainError> {
        ChainContext::open(self.wallet, self.network, self.connector)
    }
}

/// Convert a human amount with 9 decimals into base units.
pub fn parse_amount(amount: f64) -> Result<u64, ToolFailure> {
    let scale = 10f64.powi(MSOL_DECIMALS.into());
    if !amount.is_finite() || amount < 0.0 {
        return Err(ToolFailure::rejected(
            INVALID_AMOUNT,
            format!("Amount must be a finite, non-negative number (got {amount})"),
        ));
    }
    let base_units = (amount * scale).round();
    if base_units >= u64::MAX as f64 {
        return Err(ToolFailure::rejected(
            INVALID_AMOUNT,
            format!("Amount {amount} is too large"),
        ));
    }
    let base_units = base_units as u64;
    if base_units == 0 {
        return Err(ToolFailure::rejected(
            INVALID_AMOUNT,
            format!("Amount {amount} is below the smallest unit (0.000000001)"),
        ));
    }
    Ok(base_units)
}

/// Base units rendered as a human amount.
pub fn ui_amount(base_units: u64) -> f64 {
    spl_token::amount_to_ui_amount(base_units, MSOL_DECIMALS)
}

/// `get_marinade_state`: decoded protocol state rendered through the sanitizer.
pub async fn get_marinade_state(tools: MarinadeTools<'_>) -> ToolResult {
    with_tool_error_handling(STATE_TOOL_ID, STATE_LABELS, async {
        let context = tools.open()?;
        let state = state::fetch_state(&context.client, &MARINADE_STATE_ADDRESS).await?;
        let (graph, root) = state::build_view(&state, context.network);
        Ok::<_, ToolFailure>(safe_serialize(&graph, root, &SanitizePolicy::DEFAULT))
    })
    .await
}
