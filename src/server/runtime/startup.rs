use std::{process::ExitCode, sync::Arc};

use anyhow::Error;
use rmcp::ServiceExt;

use crate::{
    cli::{LaunchProfile, TransportMode},
    lib::telemetry::{emit_runtime_mode, RuntimeModeTelemetry},
    server::{
        config::ServerConfig,
        runtime::{build_instructions, http, MarinadeServer},
    },
    tools::marinade::LiveRpcConnector,
};

/// Bundles a runtime error message with an exit code.
#[derive(Debug)]
pub struct RuntimeExit {
    message: String,
    exit_code: ExitCode,
}

impl RuntimeExit {
    pub fn from_error(err: impl Into<Error>) -> Self {
        let err = err.into();
        Self {
            message: format!("{err:?}"),
            exit_code: ExitCode::FAILURE,
        }
    }

    pub fn report(self) -> ExitCode {
        eprintln!("{}", self.message);
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Start the MCP server on the transport selected by the launch profile.
pub async fn run_server(profile: LaunchProfile, config: ServerConfig) -> Result<(), RuntimeExit> {
    let instructions = Arc::new(build_instructions(&profile, &config));
    let config = Arc::new(config);
    let server = MarinadeServer::new(config.clone(), instructions.clone());
    let tools = server.tool_names();

    let (host, port) = match profile.transport {
        TransportMode::Stdio => (None, None),
        TransportMode::Http => (Some(config.server.host.as_str()), Some(config.server.port)),
    };
    emit_runtime_mode(&RuntimeModeTelemetry {
        transport: profile.transport.as_str(),
        host,
        port,
        network: config.network.as_str(),
        onchain_tools: config.onchain_enabled(),
        tools: &tools,
        launch_args: &profile.launch_args,
    });

    match profile.transport {
        TransportMode::Stdio => run_stdio(server, &config).await,
        TransportMode::Http => run_http(config, instructions).await,
    }
}

async fn run_stdio(server: MarinadeServer, config: &ServerConfig) -> Result<(), RuntimeExit> {
    let running = server
        .serve(rmcp::transport::stdio())
        .await
        .map_err(RuntimeExit::from_error)?;
    tracing::info!(
        target: "marinade_mcp::runtime",
        transport = "stdio",
        "Marinade Finance MCP Server running on stdio"
    );
    log_mode(config);
    running.waiting().await.map_err(RuntimeExit::from_error)?;
    Ok(())
}

async fn run_http(config: Arc<ServerConfig>, instructions: Arc<String>) -> Result<(), RuntimeExit> {
    let router = http::router(config.clone(), instructions, Arc::new(LiveRpcConnector));
    log_mode(&config);
    http::serve(router, &config.server.host, config.server.port)
        .await
        .map_err(RuntimeExit::from_error)
}

fn log_mode(config: &ServerConfig) {
    tracing::info!(
        target: "marinade_mcp::runtime",
        network = config.network.as_str(),
        "Mode: {}",
        config.network.mode_label()
    );
}
