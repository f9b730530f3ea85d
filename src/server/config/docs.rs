//! Static identity strings for the documentation client and the MCP server.

pub const MCP_CLIENT_NAME: &str = "marinade-finance-docs-client";
pub const MCP_CLIENT_VERSION: &str = "1.0.0";
pub const MARINADE_FINANCE_DOCS_URL: &str = "https://docs.marinade.finance";

pub const MCP_SERVER_NAME: &str = "marinade-finance-mcp-server";
pub const MCP_SERVER_VERSION: &str = "1.0.0";

/// Documentation endpoint and the identity presented to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocsSection {
    pub base_url: String,
    pub client_name: String,
    pub client_version: String,
}

impl Default for DocsSection {
    fn default() -> Self {
        Self {
            base_url: MARINADE_FINANCE_DOCS_URL.to_string(),
            client_name: MCP_CLIENT_NAME.to_string(),
            client_version: MCP_CLIENT_VERSION.to_string(),
        }
    }
}

/// Identity reported in `ServerInfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerIdentity {
    pub name: String,
    pub version: String,
}

impl Default for ServerIdentity {
    fn default() -> Self {
        Self {
            name: MCP_SERVER_NAME.to_string(),
            version: MCP_SERVER_VERSION.to_string(),
        }
    }
}
