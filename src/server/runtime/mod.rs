//! MCP server startup and tool registration.
pub mod http;
mod server_info;
mod startup;
mod tool_registry;

pub use server_info::build_instructions;
pub use startup::{run_server, RuntimeExit};
pub use tool_registry::{build_tool_router, catalog, ordered_tools, MarinadeServer, CATALOG_ORDER};
