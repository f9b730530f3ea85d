//! Documentation search proxied to the Marinade Finance GitBook MCP server.

pub mod client;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    server::config::DocsSection,
    tools::envelope::{with_tool_error_handling, ErrorLabels, ToolFailure, ToolResult},
};

pub use client::{endpoint_url, DocsClient, DOCS_MCP_SUFFIX};

pub const SEARCH_TOOL_ID: &str = "search_documentation";

/// Name of the search tool on the upstream documentation server.
pub const UPSTREAM_SEARCH_TOOL: &str = "searchDocumentation";

pub const SEARCH_LABELS: ErrorLabels =
    ErrorLabels::new("Failed to search documentation", "Request timed out");

/// Input for `search_documentation`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchDocumentationRequest {
    /// The search query string
    pub query: String,
}

/// Forward `query` to the documentation server and return its raw response.
pub async fn search_documentation(docs: &DocsSection, request: SearchDocumentationRequest) -> ToolResult {
    with_tool_error_handling(SEARCH_TOOL_ID, SEARCH_LABELS, async {
        let client = DocsClient::connect(docs).await?;
        let arguments = json!({ "query": request.query });
        let arguments = arguments.as_object().cloned().unwrap_or_default();
        let response = client.call_tool(UPSTREAM_SEARCH_TOOL, arguments).await;
        client.close().await;
        Ok::<_, ToolFailure>(response?)
    })
    .await
}
