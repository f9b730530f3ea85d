//! Connected client for one remote documentation MCP endpoint.
use rmcp::{
    model::{
        CallToolRequestParam, CallToolResult, ClientCapabilities, ClientInfo, Implementation,
        JsonObject, Tool,
    },
    service::RunningService,
    transport::StreamableHttpClientTransport,
    RoleClient, ServiceExt,
};
use tracing::{debug, error};

use crate::{lib::errors::DocsClientError, server::config::DocsSection};

/// Path appended to the documentation base URL.
pub const DOCS_MCP_SUFFIX: &str = "/~gitbook/mcp";

/// Build the MCP endpoint URL for a documentation site.
pub fn endpoint_url(base_url: &str) -> String {
    format!("{}{DOCS_MCP_SUFFIX}", base_url.trim_end_matches('/'))
}

/// A live session with the documentation server. One per search; never pooled.
pub struct DocsClient {
    service: RunningService<RoleClient, ClientInfo>,
}

impl DocsClient {
    /// Open the transport and perform the initialize handshake.
    pub async fn connect(docs: &DocsSection) -> Result<Self, DocsClientError> {
        let url = endpoint_url(&docs.base_url);
        let client_info = ClientInfo {
            capabilities: ClientCapabilities::default(),
            client_info: Implementation {
                name: docs.client_name.clone(),
                version: docs.client_version.clone(),
                ..Implementation::default()
            },
            ..ClientInfo::default()
        };

        let transport = StreamableHttpClientTransport::from_uri(url.clone());
        let service = client_info.serve(transport).await.map_err(|err| {
            let error = DocsClientError::Connect {
                url: url.clone(),
                message: err.to_string(),
            };
            error!(
                target: "marinade_mcp::docs",
                url = %url,
                reason = %error,
                "Error connecting to documentation server"
            );
            error
        })?;
        debug!(target: "marinade_mcp::docs", url = %url, "Connected to documentation server");

        Ok(Self { service })
    }

    /// Tools advertised by the documentation server.
    pub async fn list_tools(&self) -> Result<Vec<Tool>, DocsClientError> {
        Ok(self.service.list_all_tools().await?)
    }

    pub async fn call_tool(
        &self,
        name: &str,
        arguments: JsonObject,
    ) -> Result<CallToolResult, DocsClientError> {
        let result = self
            .service
            .call_tool(CallToolRequestParam {
                name: name.to_string().into(),
                arguments: Some(arguments),
            })
            .await?;
        Ok(result)
    }

    /// Close the session. Errors while shutting down are only logged.
    pub async fn close(self) {
        if let Err(err) = self.service.cancel().await {
            debug!(
                target: "marinade_mcp::docs",
                error = %err,
                "Documentation client did not shut down cleanly"
            );
        }
    }
}
