use std::sync::Arc;

use rmcp::{
    handler::server::{tool::ToolCallContext, wrapper::Parameters, ServerHandler},
    model::{
        CallToolRequestParam, CallToolResult, ErrorData, Implementation, ListToolsResult,
        PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
    tool, tool_router, RoleServer,
};

use crate::{
    server::config::ServerConfig,
    tools::{
        self,
        docs::{self, SearchDocumentationRequest},
        marinade::{
            self, GetMsolBalanceRequest, LiveRpcConnector, MarinadeTools, RpcConnector,
            SendMsolRequest, StakeMsolRequest, UnstakeMsolRequest,
        },
        ServerToolRouter,
    },
};

#[derive(Clone)]
pub struct MarinadeServer {
    config: Arc<ServerConfig>,
    instructions: Arc<String>,
    connector: Arc<dyn RpcConnector>,
    tool_router: ServerToolRouter<Self>,
}

impl MarinadeServer {
    pub fn new(config: Arc<ServerConfig>, instructions: Arc<String>) -> Self {
        Self::with_connector(config, instructions, Arc::new(LiveRpcConnector))
    }

    /// Server whose on-chain tools open RPC clients through `connector`.
    pub fn with_connector(
        config: Arc<ServerConfig>,
        instructions: Arc<String>,
        connector: Arc<dyn RpcConnector>,
    ) -> Self {
        let tool_router = build_tool_router(&config);
        Self {
            config,
            instructions,
            connector,
            tool_router,
        }
    }

    /// Registered tool names in catalog order.
    pub fn tool_names(&self) -> Vec<String> {
        catalog(&self.tool_router)
    }

    fn marinade(&self) -> MarinadeTools<'_> {
        MarinadeTools::new(
            self.config.wallet.as_ref(),
            self.config.network,
            self.connector.as_ref(),
        )
    }
}

/// Tool catalog for `config`: documentation tools always, on-chain tools only
/// when the wallet credentials are complete.
pub fn build_tool_router(config: &ServerConfig) -> ServerToolRouter<MarinadeServer> {
    let onchain = config
        .onchain_enabled()
        .then(MarinadeServer::onchain_router);
    tools::build_router(MarinadeServer::docs_router, onchain)
}

/// Order in which tools are listed to clients.
pub const CATALOG_ORDER: [&str; 6] = [
    docs::SEARCH_TOOL_ID,
    marinade::STATE_TOOL_ID,
    marinade::BALANCE_TOOL_ID,
    marinade::STAKE_TOOL_ID,
    marinade::UNSTAKE_TOOL_ID,
    marinade::SEND_TOOL_ID,
];

/// Registered tools sorted by [`CATALOG_ORDER`].
pub fn ordered_tools(router: &ServerToolRouter<MarinadeServer>) -> Vec<Tool> {
    let mut tools = router.list_all();
    tools.sort_by_key(|tool| {
        CATALOG_ORDER
            .iter()
            .position(|name| *name == tool.name)
            .unwrap_or(CATALOG_ORDER.len())
    });
    tools
}

pub fn catalog(router: &ServerToolRouter<MarinadeServer>) -> Vec<String> {
    ordered_tools(router)
        .into_iter()
        .map(|tool| tool.name.to_string())
        .collect()
}

#[tool_router(router = docs_router, vis = "pub(crate)")]
impl MarinadeServer {
    #[tool(
        name = "search_documentation",
        title = "Search Marinade Finance Documentation",
        description = "Search across the documentation to find relevant information, code examples, API references, and guides. Use this tool when you need to answer questions about Marinade Finance Docs, find specific documentation, understand how features work, or locate implementation details. The search returns contextual content with titles and direct links to the documentation pages."
    )]
    async fn search_documentation(
        &self,
        Parameters(request): Parameters<SearchDocumentationRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(docs::search_documentation(&self.config.docs, request)
            .await
            .into())
    }
}

#[tool_router(router = onchain_router, vis = "pub(crate)")]
impl MarinadeServer {
    #[tool(
        name = "get_marinade_state",
        title = "Get Marinade State",
        description = "Fetch the current Marinade Finance liquid staking state: mSOL price and supply, reserve balance, liquidity pool parameters, fees, and program addresses."
    )]
    async fn get_marinade_state(&self) -> Result<CallToolResult, ErrorData> {
        Ok(marinade::get_marinade_state(self.marinade()).await.into())
    }

    #[tool(
        name = "get_msol_balance",
        title = "Get mSOL Balance",
        description = "Get the mSOL balance of a wallet. Defaults to the configured wallet when no address is given."
    )]
    async fn get_msol_balance(
        &self,
        Parameters(request): Parameters<GetMsolBalanceRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(marinade::get_msol_balance(self.marinade(), request)
            .await
            .into())
    }

    #[tool(
        name = "stake_msol",
        title = "Stake SOL for mSOL",
        description = "Stake SOL from the configured wallet with Marinade Finance and receive mSOL. The amount is in SOL."
    )]
    async fn stake_msol(
        &self,
        Parameters(request): Parameters<StakeMsolRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(marinade::stake_msol(self.marinade(), request).await.into())
    }

    #[tool(
        name = "unstake_msol",
        title = "Unstake mSOL",
        description = "Liquid-unstake mSOL from the configured wallet back to SOL through the Marinade liquidity pool. The amount is in mSOL."
    )]
    async fn unstake_msol(
        &self,
        Parameters(request): Parameters<UnstakeMsolRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(marinade::unstake_msol(self.marinade(), request).await.into())
    }

    #[tool(
        name = "send_msol",
        title = "Send mSOL",
        description = "Send mSOL from the configured wallet to another wallet, creating the recipient's token account when needed. The amount is in mSOL."
    )]
    async fn send_msol(
        &self,
        Parameters(request): Parameters<SendMsolRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(marinade::send_msol(self.marinade(), request).await.into())
    }
}

impl ServerHandler for MarinadeServer {
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(ordered_tools(&self.tool_router)))
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.config.identity.name.clone(),
                version: self.config.identity.version.clone(),
                ..Implementation::from_build_env()
            },
            instructions: Some((*self.instructions).clone()),
            ..ServerInfo::default()
        }
    }
}
