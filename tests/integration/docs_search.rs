use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters, ServerHandler},
    model::{CallToolResult, Content, ErrorData, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    transport::streamable_http_server::{
        session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
    },
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use tokio::{net::TcpListener, task::JoinHandle};

use marinade_mcp::{
    server::config::{DocsSection, ServerConfig},
    tools::{
        docs::{DocsClient, DOCS_MCP_SUFFIX, UPSTREAM_SEARCH_TOOL},
        marinade::MockRpcConnector,
    },
};

use crate::common::InMemorySession;

#[derive(Debug, Deserialize, JsonSchema)]
struct UpstreamQuery {
    query: String,
}

/// Stand-in for the GitBook documentation server.
#[derive(Clone)]
struct FakeDocs {
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl FakeDocs {
    fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }

    #[tool(name = "searchDocumentation", description = "Search the docs")]
    async fn search(
        &self,
        Parameters(UpstreamQuery { query }): Parameters<UpstreamQuery>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::text(format!(
            "Title: Results for {query}\nLink: https://docs.marinade.finance/liquid-staking"
        ))]))
    }
}

#[tool_handler]
impl ServerHandler for FakeDocs {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..ServerInfo::default()
        }
    }
}

async fn start_fake_docs() -> Result<(DocsSection, JoinHandle<()>)> {
    let service = StreamableHttpService::new(
        || Ok(FakeDocs::new()),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig::default(),
    );
    let router = Router::new().nest_service(DOCS_MCP_SUFFIX, service);
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    let docs = DocsSection {
        base_url: format!("http://{addr}"),
        ..DocsSection::default()
    };
    Ok((docs, handle))
}

#[tokio::test]
async fn docs_client_sees_upstream_tools() -> Result<()> {
    let (docs, handle) = start_fake_docs().await?;

    let client = DocsClient::connect(&docs).await?;
    let names: Vec<String> = client
        .list_tools()
        .await?
        .into_iter()
        .map(|tool| tool.name.to_string())
        .collect();
    client.close().await;
    handle.abort();

    assert_eq!(names, vec![UPSTREAM_SEARCH_TOOL.to_string()]);
    Ok(())
}

#[tokio::test]
async fn search_documentation_passes_upstream_result_through() -> Result<()> {
    let (docs, handle) = start_fake_docs().await?;
    let config = ServerConfig {
        docs,
        ..ServerConfig::default()
    };
    let session = InMemorySession::start(config, Arc::new(MockRpcConnector::default())).await?;

    let result = session
        .call("search_documentation", json!({ "query": "mSOL price" }))
        .await?;
    session.shutdown().await;
    handle.abort();

    assert_ne!(result.is_error, Some(true));
    let text = result.content[0]
        .as_text()
        .map(|text| text.text.clone())
        .unwrap_or_default();
    assert!(text.contains("Results for mSOL price"), "text: {text}");
    assert!(text.contains("https://docs.marinade.finance/liquid-staking"));
    Ok(())
}

#[tokio::test]
async fn unreachable_docs_server_is_reported_not_raised() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    let config = ServerConfig {
        docs: DocsSection {
            base_url: format!("http://{addr}"),
            ..DocsSection::default()
        },
        ..ServerConfig::default()
    };
    let session = InMemorySession::start(config, Arc::new(MockRpcConnector::default())).await?;

    let result = session
        .call("search_documentation", json!({ "query": "validators" }))
        .await?;
    session.shutdown().await;

    let payload = crate::common::text_payload(&result);
    assert_eq!(payload["error"], "Failed to search documentation");
    assert!(!payload["reason"].as_str().unwrap_or_default().is_empty());
    Ok(())
}
