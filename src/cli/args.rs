//! CLI argument definitions and `LaunchProfile` construction.
use std::{env, path::PathBuf};

use clap::Parser;

use super::{build_launch_args, resolve_transport, LaunchProfile, TransportMode, USE_STREAMABLE_HTTP_ENV};

/// Command-line arguments.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    author,
    version,
    about = "Marinade Finance MCP server (documentation search and mSOL liquid staking)",
    long_about = None
)]
pub struct LaunchProfileArgs {
    /// Select stdio or http (defaults to USE_STREAMABLE_HTTP).
    #[arg(long, value_enum)]
    pub transport: Option<TransportMode>,
    /// HTTP bind host (overrides HOST).
    #[arg(long)]
    pub host: Option<String>,
    /// HTTP bind port (overrides PORT).
    #[arg(long)]
    pub port: Option<u16>,
    /// Env file to load before reading configuration (defaults to `.env` when present).
    #[arg(long = "env-file")]
    pub env_file: Option<PathBuf>,
}

impl LaunchProfileArgs {
    /// Build a `LaunchProfile` from CLI args and the process environment.
    ///
    /// Call after the env file has been loaded so `USE_STREAMABLE_HTTP` from it is seen.
    pub fn build(self) -> LaunchProfile {
        let flag = env::var(USE_STREAMABLE_HTTP_ENV).ok();
        self.build_with_flag(flag.as_deref())
    }

    pub fn build_with_flag(self, use_streamable_http: Option<&str>) -> LaunchProfile {
        let transport = resolve_transport(self.transport, use_streamable_http);
        let launch_args = build_launch_args(
            transport,
            self.host.as_deref(),
            self.port,
            self.env_file.as_deref(),
        );

        LaunchProfile {
            transport,
            host: self.host,
            port: self.port,
            env_file: self.env_file,
            launch_args,
        }
    }
}
