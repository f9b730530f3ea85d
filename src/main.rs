//! Entry point for the Marinade Finance MCP server.
use std::process::ExitCode;

use anyhow::Error;
use clap::Parser;
use marinade_mcp::{
    cli::LaunchProfileArgs,
    lib::telemetry,
    server::{
        config::{self, ServerConfig},
        runtime::{self, RuntimeExit},
    },
};

#[tokio::main]
async fn main() -> ExitCode {
    match bootstrap().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(exit) => exit.report(),
    }
}

async fn bootstrap() -> Result<(), RuntimeExit> {
    let args = LaunchProfileArgs::parse();
    let env_file = config::load_env_file(args.env_file.as_deref())
        .map_err(|err| RuntimeExit::from_error(Error::new(err)))?;
    let profile = args.build();

    telemetry::init_tracing(profile.transport.log_mode()).map_err(RuntimeExit::from_error)?;
    config::telemetry::log_env_file(env_file.as_deref());

    let config = ServerConfig::load_from_env()
        .map_err(|err| RuntimeExit::from_error(Error::new(err)))?
        .with_bind_overrides(profile.host.clone(), profile.port);
    runtime::run_server(profile, config).await
}
