//! MCP tools registered on the server and helper functions for the router.

pub mod docs;
pub mod envelope;
pub mod marinade;

use rmcp::handler::server::router::tool::ToolRouter;

pub use envelope::{
    with_tool_error_handling, ContentItem, ErrorEnvelope, ErrorLabels, ToolFailure, ToolResult,
};

pub type ServerToolRouter<S> = ToolRouter<S>;

/// Combine the always-on router with an optional extension.
pub fn build_router<S>(
    base: impl FnOnce() -> ServerToolRouter<S>,
    extension: Option<ServerToolRouter<S>>,
) -> ServerToolRouter<S>
where
    S: Send + Sync + 'static,
{
    match extension {
        Some(extension) => base() + extension,
        None => base(),
    }
}
