use std::{collections::HashMap, sync::Arc};

use anyhow::Result;
use serde_json::json;
use solana_client::rpc_request::RpcRequest;
use solana_sdk::{pubkey::Pubkey, signer::Signer};

use marinade_mcp::tools::marinade::MockRpcConnector;

use crate::common::{config_with_wallet, text_payload, wallet_credentials, InMemorySession};

#[tokio::test]
async fn balance_of_wallet_without_token_account_is_zero() -> Result<()> {
    let (keypair, credentials) = wallet_credentials();
    let connector = Arc::new(MockRpcConnector::default());
    let session = InMemorySession::start(config_with_wallet(credentials), connector.clone()).await?;

    let result = session.call("get_msol_balance", json!({})).await?;
    session.shutdown().await;

    let payload = text_payload(&result);
    assert_eq!(payload["balance"], 0.0, "payload: {payload}");
    assert_eq!(payload["rawBalance"], "0");
    assert_eq!(payload["walletAddress"], keypair.pubkey().to_string());
    assert_ne!(result.is_error, Some(true));
    assert_eq!(connector.connections(), 1);
    Ok(())
}

#[tokio::test]
async fn malformed_wallet_address_never_reaches_rpc() -> Result<()> {
    let (_, credentials) = wallet_credentials();
    let connector = Arc::new(MockRpcConnector::default());
    let session = InMemorySession::start(config_with_wallet(credentials), connector.clone()).await?;

    let result = session
        .call("get_msol_balance", json!({ "walletAddress": "not-a-key" }))
        .await?;
    session.shutdown().await;

    let payload = text_payload(&result);
    assert_eq!(payload["error"], "Invalid wallet address");
    assert!(payload["reason"].as_str().unwrap_or_default().contains("not-a-key"));
    assert_eq!(connector.connections(), 0);
    Ok(())
}

#[tokio::test]
async fn stake_beyond_sol_balance_is_refused() -> Result<()> {
    let (_, credentials) = wallet_credentials();
    let mocks = HashMap::from([(
        RpcRequest::GetBalance,
        json!({ "context": { "slot": 1 }, "value": 1_000_000 }),
    )]);
    let connector = Arc::new(MockRpcConnector::new(mocks));
    let session = InMemorySession::start(config_with_wallet(credentials), connector).await?;

    let result = session.call("stake_msol", json!({ "amount": 2.5 })).await?;
    session.shutdown().await;

    let payload = text_payload(&result);
    assert_eq!(payload["error"], "Insufficient balance", "payload: {payload}");
    assert!(payload.get("transactionSignature").is_none());
    Ok(())
}

#[tokio::test]
async fn send_rejects_malformed_recipient() -> Result<()> {
    let (_, credentials) = wallet_credentials();
    let connector = Arc::new(MockRpcConnector::default());
    let session = InMemorySession::start(config_with_wallet(credentials), connector.clone()).await?;

    let result = session
        .call(
            "send_msol",
            json!({ "recipientAddress": "0xdeadbeef", "amount": 1.0 }),
        )
        .await?;
    session.shutdown().await;

    assert_eq!(text_payload(&result)["error"], "Invalid recipient address");
    assert_eq!(connector.connections(), 0);
    Ok(())
}

#[tokio::test]
async fn send_without_msol_reports_insufficient_balance() -> Result<()> {
    let (_, credentials) = wallet_credentials();
    let session = InMemorySession::start(
        config_with_wallet(credentials),
        Arc::new(MockRpcConnector::default()),
    )
    .await?;

    let result = session
        .call(
            "send_msol",
            json!({ "recipientAddress": Pubkey::new_unique().to_string(), "amount": 0.1 }),
        )
        .await?;
    session.shutdown().await;

    assert_eq!(text_payload(&result)["error"], "Insufficient balance");
    Ok(())
}

#[tokio::test]
async fn unreadable_private_key_surfaces_as_failure_envelope() -> Result<()> {
    let (_, mut credentials) = wallet_credentials();
    credentials.private_key_base58 = "not-base58!".into();
    let session = InMemorySession::start(
        config_with_wallet(credentials),
        Arc::new(MockRpcConnector::default()),
    )
    .await?;

    let result = session.call("get_marinade_state", json!({})).await?;
    session.shutdown().await;

    let payload = text_payload(&result);
    assert_eq!(payload["error"], "Failed to fetch Marinade state");
    assert!(payload["reason"]
        .as_str()
        .unwrap_or_default()
        .contains("Invalid wallet private key"));
    Ok(())
}
