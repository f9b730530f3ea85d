//! Per-call blockchain connection setup and transaction submission.
use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use serde_json::Value;
use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    nonblocking::rpc_client::RpcClient,
    rpc_config::RpcSendTransactionConfig,
    rpc_request::{RpcError, RpcRequest},
};
use solana_sdk::{
    commitment_config::{CommitmentConfig, CommitmentLevel},
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::Transaction,
};
use tracing::{debug, info, warn};

use crate::{
    lib::errors::ChainError,
    server::config::{Network, WalletCredentials},
};

/// Submission retries handed to the RPC node.
pub const MAX_SEND_RETRIES: usize = 3;

/// Opens RPC clients. Each tool call asks for a fresh client.
pub trait RpcConnector: Send + Sync {
    fn connect(&self, rpc_url: &str) -> RpcClient;
}

/// Connector for real RPC endpoints with confirmed commitment.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveRpcConnector;

impl RpcConnector for LiveRpcConnector {
    fn connect(&self, rpc_url: &str) -> RpcClient {
        RpcClient::new_with_commitment(rpc_url.to_string(), CommitmentConfig::confirmed())
    }
}

/// Connector handing out mock clients primed with canned RPC responses.
///
/// Each canned response is served once per client; later requests of the
/// same kind fall back to the mock sender's defaults.
#[derive(Debug, Default)]
pub struct MockRpcConnector {
    mocks: HashMap<RpcRequest, Value>,
    connections: AtomicUsize,
}

impl MockRpcConnector {
    pub fn new(mocks: HashMap<RpcRequest, Value>) -> Self {
        Self {
            mocks,
            connections: AtomicUsize::new(0),
        }
    }

    /// Number of clients opened so far.
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

impl RpcConnector for MockRpcConnector {
    fn connect(&self, _rpc_url: &str) -> RpcClient {
        self.connections.fetch_add(1, Ordering::SeqCst);
        RpcClient::new_mock_with_mocks("succeeds".to_string(), self.mocks.clone())
    }
}

/// Decode a base58-encoded 64-byte secret key.
pub fn decode_keypair(private_key_base58: &str) -> Result<Keypair, ChainError> {
    let bytes = bs58::decode(private_key_base58.trim())
        .into_vec()
        .map_err(|err| ChainError::InvalidPrivateKey {
            message: format!("not valid base58: {err}"),
        })?;
    Keypair::from_bytes(&bytes).map_err(|err| ChainError::InvalidPrivateKey {
        message: format!("expected a 64-byte secret key: {err}"),
    })
}

/// Wallet, network, and RPC client for a single tool invocation.
pub struct ChainContext {
    pub client: RpcClient,
    pub payer: Keypair,
    pub network: Network,
}

impl ChainContext {
    /// Decode the wallet and open a connection for `network`.
    pub fn open(
        wallet: Option<&WalletCredentials>,
        network: Network,
        connector: &dyn RpcConnector,
    ) -> Result<Self, ChainError> {
        let wallet = wallet.ok_or(ChainError::MissingCredentials {
            field: "PRIVATE_KEY",
        })?;
        let payer = decode_keypair(&wallet.private_key_base58)?;
        let rpc_url = wallet.rpc_url(network);
        debug!(
            target: "marinade_mcp::chain",
            network = network.as_str(),
            wallet = %payer.pubkey(),
            "Opening RPC connection"
        );
        Ok(Self {
            client: connector.connect(rpc_url),
            payer,
            network,
        })
    }

    pub fn wallet(&self) -> Pubkey {
        self.payer.pubkey()
    }

    /// Sign, send, and wait for confirmed commitment.
    ///
    /// Resending and confirmation are left to the client's confirmation routine.
    pub async fn submit(&self, instructions: &[Instruction]) -> Result<Signature, ChainError> {
        let blockhash = self.client.get_latest_blockhash().await?;
        let transaction = Transaction::new_signed_with_payer(
            instructions,
            Some(&self.payer.pubkey()),
            &[&self.payer],
            blockhash,
        );
        let signature = transaction.signatures[0];
        self.client
            .send_and_confirm_transaction_with_spinner_and_config(
                &transaction,
                CommitmentConfig::confirmed(),
                RpcSendTransactionConfig {
                    preflight_commitment: Some(CommitmentLevel::Confirmed),
                    max_retries: Some(MAX_SEND_RETRIES),
                    ..RpcSendTransactionConfig::default()
                },
            )
            .await
            .map_err(|err| confirmation_error(signature, err))?;

        info!(
            target: "marinade_mcp::chain",
            network = self.network.as_str(),
            signature = %signature,
            "Transaction confirmed"
        );
        Ok(signature)
    }

    pub fn explorer_url(&self, signature: &Signature) -> String {
        explorer_url(self.network, signature)
    }
}

/// Classify a failure from the confirmation routine for `signature`.
///
/// `ForUser` errors are raised once the routine stops waiting without seeing a
/// status, so the transaction may still land.
pub fn confirmation_error(signature: Signature, err: ClientError) -> ChainError {
    let classified = match err.kind() {
        ClientErrorKind::TransactionError(tx_err) => Some(ChainError::TransactionFailed {
            signature,
            message: tx_err.to_string(),
        }),
        ClientErrorKind::RpcError(RpcError::ForUser(message)) => {
            warn!(
                target: "marinade_mcp::chain",
                signature = %signature,
                reason = %message,
                "Transaction confirmation not observed"
            );
            Some(ChainError::ConfirmationTimeout {
                signature,
                message: message.clone(),
            })
        }
        _ => None,
    };
    classified.unwrap_or(ChainError::Rpc(err))
}

pub fn explorer_url(network: Network, signature: &Signature) -> String {
    format!(
        "https://explorer.solana.com/tx/{signature}{}",
        network.explorer_cluster_query()
    )
}
