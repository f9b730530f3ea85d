use std::path::PathBuf;

use config::ConfigError as ConfigLoaderError;
use solana_client::client_error::ClientError;
use solana_sdk::{program_error::ProgramError, pubkey::Pubkey, signature::Signature};
use thiserror::Error;

/// Errors that can occur while loading or validating the runtime configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to collect configuration sources.
    #[error("Failed to read configuration from {origin}: {source}")]
    Read {
        origin: &'static str,
        #[source]
        source: ConfigLoaderError,
    },
    /// Failed to deserialize collected values into the raw structure.
    #[error("Failed to parse configuration from {origin}: {source}")]
    Parse {
        origin: &'static str,
        #[source]
        source: ConfigLoaderError,
    },
    /// Field failed validation.
    #[error("Configuration has invalid `{field}`: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },
    /// An explicitly requested env file could not be loaded.
    #[error("Failed to load env file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenv::Error,
    },
}

impl ConfigError {
    /// Helper to wrap `config::ConfigError` as a read failure.
    pub fn from_read_error(origin: &'static str, source: ConfigLoaderError) -> Self {
        Self::Read { origin, source }
    }

    /// Helper to wrap `config::ConfigError` as a parse failure.
    pub fn from_parse_error(origin: &'static str, source: ConfigLoaderError) -> Self {
        Self::Parse { origin, source }
    }
}

/// Failures raised while talking to Solana or the Marinade program.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("Wallet credentials are not configured: {field} is missing")]
    MissingCredentials { field: &'static str },
    #[error("Invalid wallet private key: {message}")]
    InvalidPrivateKey { message: String },
    #[error("RPC request failed: {0}")]
    Rpc(#[from] ClientError),
    #[error("Account {address} not found")]
    AccountNotFound { address: Pubkey },
    #[error("Failed to decode {account} account: {message}")]
    Decode {
        account: &'static str,
        message: String,
    },
    #[error("Failed to build instruction: {0}")]
    Instruction(#[from] ProgramError),
    #[error("Transaction {signature} failed: {message}")]
    TransactionFailed {
        signature: Signature,
        message: String,
    },
    /// The transaction was sent but confirmation was never observed; it may still land.
    #[error("Transaction {signature} timed out before confirmation: {message}")]
    ConfirmationTimeout {
        signature: Signature,
        message: String,
    },
}

/// Failures raised by the documentation MCP client.
#[derive(Debug, Error)]
pub enum DocsClientError {
    #[error("Failed to connect to documentation server at {url}: {message}")]
    Connect { url: String, message: String },
    #[error("Documentation request failed: {0}")]
    Service(#[from] rmcp::service::ServiceError),
}
