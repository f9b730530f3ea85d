//! LaunchProfile and transport resolution.
use std::path::{Path, PathBuf};

use clap::ValueEnum;

use crate::lib::telemetry::LogMode;

pub const USE_STREAMABLE_HTTP_ENV: &str = "USE_STREAMABLE_HTTP";

/// MCP transport mode.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum TransportMode {
    Stdio,
    Http,
}

impl TransportMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Stdio => "stdio",
            TransportMode::Http => "http",
        }
    }

    pub const fn log_mode(&self) -> LogMode {
        match self {
            TransportMode::Stdio => LogMode::Stdio,
            TransportMode::Http => LogMode::Http,
        }
    }
}

/// Resolved launch profile.
#[derive(Debug, Clone)]
pub struct LaunchProfile {
    pub transport: TransportMode,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub env_file: Option<PathBuf>,
    pub launch_args: Vec<String>,
}

/// Resolve the transport in the order: CLI flag → `USE_STREAMABLE_HTTP` → stdio.
///
/// Only the exact value `true` enables HTTP.
pub fn resolve_transport(cli: Option<TransportMode>, use_streamable_http: Option<&str>) -> TransportMode {
    cli.unwrap_or(match use_streamable_http {
        Some("true") => TransportMode::Http,
        _ => TransportMode::Stdio,
    })
}

/// Build launch arguments suitable for reproduction/logging.
pub fn build_launch_args(
    transport: TransportMode,
    host: Option<&str>,
    port: Option<u16>,
    env_file: Option<&Path>,
) -> Vec<String> {
    let mut args = vec![format!("--transport={}", transport.as_str())];
    if let Some(host) = host {
        args.push(format!("--host={host}"));
    }
    if let Some(port) = port {
        args.push(format!("--port={port}"));
    }
    if let Some(path) = env_file {
        args.push(format!("--env-file={}", path.display()));
    }
    args
}
