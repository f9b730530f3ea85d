use std::sync::Arc;

use anyhow::Result;

use marinade_mcp::{
    server::{
        config::ServerConfig,
        runtime::{build_tool_router, catalog, CATALOG_ORDER},
    },
    tools::marinade::MockRpcConnector,
};

use crate::common::{env_map, wallet_credentials, InMemorySession};

fn credential_env(private_key: &str) -> Vec<(&'static str, String)> {
    vec![
        ("PRIVATE_KEY", private_key.to_string()),
        ("RPC_URL", "https://api.mainnet-beta.solana.com".to_string()),
        ("DEVNET_RPC_URL", "https://api.devnet.solana.com".to_string()),
    ]
}

#[tokio::test]
async fn catalog_without_credentials_is_docs_only() -> Result<()> {
    let config = ServerConfig::load_from_map(env_map(&[("ENVIRONMENT", "MAINNET")]))?;
    let session = InMemorySession::start(config, Arc::new(MockRpcConnector::default())).await?;

    let names = session.tool_names().await?;
    session.shutdown().await;

    assert_eq!(names, vec!["search_documentation".to_string()]);
    Ok(())
}

#[tokio::test]
async fn catalog_with_credentials_lists_tools_in_catalog_order() -> Result<()> {
    let (_, credentials) = wallet_credentials();
    let pairs = credential_env(&credentials.private_key_base58);
    let borrowed: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (*k, v.as_str())).collect();
    let config = ServerConfig::load_from_map(env_map(&borrowed))?;
    let session = InMemorySession::start(config, Arc::new(MockRpcConnector::default())).await?;

    let names = session.tool_names().await?;
    session.shutdown().await;

    assert_eq!(names, CATALOG_ORDER.to_vec());
    Ok(())
}

#[test]
fn any_missing_credential_hides_onchain_tools() -> Result<()> {
    let (_, credentials) = wallet_credentials();
    let full = credential_env(&credentials.private_key_base58);

    for skipped in 0..full.len() {
        let pairs: Vec<(&str, &str)> = full
            .iter()
            .enumerate()
            .map(|(index, (key, value))| {
                let value = if index == skipped { "" } else { value.as_str() };
                (*key, value)
            })
            .collect();
        let config = ServerConfig::load_from_map(env_map(&pairs))?;

        let names = catalog(&build_tool_router(&config));

        assert_eq!(
            names,
            vec!["search_documentation".to_string()],
            "{} empty",
            full[skipped].0
        );
    }
    Ok(())
}

#[tokio::test]
async fn tool_schemas_describe_inputs() -> Result<()> {
    let (_, credentials) = wallet_credentials();
    let config = crate::common::config_with_wallet(credentials);
    let session = InMemorySession::start(config, Arc::new(MockRpcConnector::default())).await?;

    let tools = session.client.list_all_tools().await?;
    session.shutdown().await;

    let schema_of = |name: &str| {
        tools
            .iter()
            .find(|tool| tool.name == name)
            .map(|tool| serde_json::Value::Object((*tool.input_schema).clone()))
            .unwrap_or_else(|| panic!("{name} missing"))
    };
    assert!(schema_of("search_documentation")["properties"]["query"].is_object());
    assert!(schema_of("get_msol_balance")["properties"]["walletAddress"].is_object());
    let send = schema_of("send_msol");
    assert!(send["properties"]["recipientAddress"].is_object());
    assert_eq!(send["properties"]["amount"]["minimum"], 0.0);
    Ok(())
}
