//! Telemetry initialization and tool-call span helpers.

use std::time::Instant;

use anyhow::Result;
use serde::Serialize;
use tracing::{info, info_span, Level, Span};
use tracing_subscriber::{fmt, fmt::writer::MakeWriterExt, EnvFilter};

/// Where log lines are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    /// Stdout carries the protocol, so every line goes to stderr.
    Stdio,
    /// Warnings and errors go to stderr, everything else to stdout.
    Http,
}

/// Initialize `tracing` and format developer logs.
pub fn init_tracing(mode: LogMode) -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true);

    let installed = match mode {
        LogMode::Stdio => builder.with_writer(std::io::stderr).try_init(),
        LogMode::Http => builder
            .with_writer(
                std::io::stderr
                    .with_max_level(Level::WARN)
                    .or_else(std::io::stdout),
            )
            .try_init(),
    };
    installed.map_err(|err| anyhow::anyhow!("failed to initialize tracing: {err}"))
}

/// Span helper to record start and finish of a tool invocation.
pub struct ToolCallSpan {
    span: Span,
    started_at: Instant,
    tool: &'static str,
}

impl ToolCallSpan {
    /// Start a tool span.
    pub fn start(tool: &'static str) -> Self {
        let span = info_span!(target: "marinade_mcp::tools", "tool_call", tool);
        Self {
            span,
            started_at: Instant::now(),
            tool,
        }
    }

    /// Close the span while recording the outcome.
    pub fn finish(self, outcome: &'static str) {
        let elapsed_ms = self.started_at.elapsed().as_millis();
        let _entered = self.span.enter();
        info!(
            target: "marinade_mcp::tools",
            tool = self.tool,
            outcome = outcome,
            elapsed_ms = elapsed_ms,
            "Completed tool call"
        );
    }
}

/// Payload for logging MCP runtime state as structured telemetry.
#[derive(Debug, Serialize)]
pub struct RuntimeModeTelemetry<'a> {
    pub transport: &'a str,
    pub host: Option<&'a str>,
    pub port: Option<u16>,
    pub network: &'a str,
    pub onchain_tools: bool,
    pub tools: &'a [String],
    pub launch_args: &'a [String],
}

/// Emit runtime mode to `tracing`.
pub fn emit_runtime_mode(telemetry: &RuntimeModeTelemetry<'_>) {
    info!(
        target: "marinade_mcp::runtime",
        transport = telemetry.transport,
        host = telemetry.host.unwrap_or(""),
        port = telemetry.port.unwrap_or_default(),
        network = telemetry.network,
        onchain_tools = telemetry.onchain_tools,
        tools = ?telemetry.tools,
        launch_args = ?telemetry.launch_args,
        "Started MCP server"
    );
}
