//! Stateless streamable HTTP surface.
use std::{any::Any, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    http::{header::CONTENT_TYPE, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post_service},
    Json, Router,
};
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{self, CorsLayer},
};
use tracing::{debug, error, info};

use super::MarinadeServer;
use crate::{server::config::ServerConfig, tools::marinade::RpcConnector};

pub const MCP_PATH: &str = "/mcp";
pub const HEALTH_PATH: &str = "/health";
pub const SESSION_ID_HEADER: &str = "mcp-session-id";

pub const METHOD_NOT_ALLOWED_CODE: i64 = -32000;
pub const INTERNAL_ERROR_CODE: i64 = -32603;

fn jsonrpc_error(code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "error": { "code": code, "message": message },
        "id": null,
    })
}

/// Router for `/mcp` and `/health`.
///
/// Every POST builds a fresh [`MarinadeServer`] that handles exactly one exchange.
pub fn router(
    config: Arc<ServerConfig>,
    instructions: Arc<String>,
    connector: Arc<dyn RpcConnector>,
) -> Router {
    let service = StreamableHttpService::new(
        move || {
            debug!(target: "marinade_mcp::http", "Serving MCP request");
            Ok(MarinadeServer::with_connector(
                config.clone(),
                instructions.clone(),
                connector.clone(),
            ))
        },
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig {
            stateful_mode: false,
            ..Default::default()
        },
    );

    let cors_layer = CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods(cors::Any)
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(SESSION_ID_HEADER)]);

    Router::new()
        .route(
            MCP_PATH,
            post_service(service)
                .get(method_not_allowed)
                .delete(method_not_allowed),
        )
        .route(HEALTH_PATH, get(health))
        .layer(CatchPanicLayer::custom(internal_error))
        .layer(cors_layer)
}

/// Bind `host:port` and serve until Ctrl-C.
pub async fn serve(router: Router, host: &str, port: u16) -> Result<()> {
    let addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind HTTP address {addr}"))?;
    info!(
        target: "marinade_mcp::runtime",
        transport = "http",
        bind_addr = %addr,
        "MCP Stateless Streamable HTTP listening on http://{addr}"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .with_context(|| format!("HTTP server on {addr} failed"))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(
            target: "marinade_mcp::runtime",
            error = %err,
            "Failed to listen for shutdown signal"
        );
        std::future::pending::<()>().await;
    }
    info!(target: "marinade_mcp::runtime", "Shutting down HTTP server");
}

async fn method_not_allowed() -> Response {
    info!(target: "marinade_mcp::http", "Rejected non-POST MCP request");
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(jsonrpc_error(METHOD_NOT_ALLOWED_CODE, "Method not allowed.")),
    )
        .into_response()
}

async fn health() -> &'static str {
    "ok"
}

fn internal_error(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(
        target: "marinade_mcp::http",
        panic = detail,
        "Error handling MCP request"
    );
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(jsonrpc_error(INTERNAL_ERROR_CODE, "Internal server error")),
    )
        .into_response()
}
