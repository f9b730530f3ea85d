use std::{collections::HashMap, io, path::PathBuf, process::Stdio, sync::Arc};

use anyhow::{Context, Result};
use rmcp::{
    model::{CallToolRequestParam, CallToolResult, ClientInfo},
    serve_client,
    service::RunningService,
    RoleClient, ServiceExt,
};
use serde_json::Value;
use solana_sdk::signature::Keypair;
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, ReadBuf},
    process::{Child, ChildStdin, ChildStdout, Command},
    task::JoinHandle,
};

use marinade_mcp::{
    server::{
        config::{ServerConfig, WalletCredentials},
        runtime::MarinadeServer,
    },
    tools::marinade::RpcConnector,
};

pub const BINARY_PATH: &str = env!("CARGO_BIN_EXE_marinade-mcp");

const CREDENTIAL_VARS: [&str; 3] = ["PRIVATE_KEY", "RPC_URL", "DEVNET_RPC_URL"];

/// Spawn the binary in stdio mode with no wallet configured.
pub async fn spawn_server_process() -> Result<(Child, ChildIoBridge, Option<JoinHandle<()>>)> {
    let mut command = Command::new(BINARY_PATH);
    command
        .arg("--transport")
        .arg("stdio")
        .arg("--env-file")
        .arg(fixture("tests/fixtures/stdio.env"))
        .env("RUST_LOG", "warn")
        .stdout(Stdio::piped())
        .stdin(Stdio::piped())
        .stderr(Stdio::piped());
    for var in CREDENTIAL_VARS {
        command.env_remove(var);
    }
    let mut child = command.spawn().context("failed to spawn server process")?;
    let stdout = child.stdout.take().context("child stdout")?;
    let stdin = child.stdin.take().context("child stdin")?;
    let bridge = ChildIoBridge::new(stdout, stdin);
    let stderr_handle = child.stderr.take().map(|mut stderr| {
        tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
        })
    });
    Ok((child, bridge, stderr_handle))
}

pub fn fixture(relative: &str) -> String {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    root.join(relative).display().to_string()
}

pub fn wallet_credentials() -> (Keypair, WalletCredentials) {
    let keypair = Keypair::new();
    let credentials = WalletCredentials {
        private_key_base58: bs58::encode(keypair.to_bytes()).into_string(),
        rpc_url_mainnet: "https://mainnet.example".into(),
        rpc_url_devnet: "https://devnet.example".into(),
    };
    (keypair, credentials)
}

pub fn config_with_wallet(credentials: WalletCredentials) -> ServerConfig {
    ServerConfig {
        wallet: Some(credentials),
        ..ServerConfig::default()
    }
}

pub fn env_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Server and client connected over an in-memory duplex pipe.
pub struct InMemorySession {
    pub client: RunningService<RoleClient, ClientInfo>,
    server_task: JoinHandle<Result<()>>,
}

impl InMemorySession {
    pub async fn start(config: ServerConfig, connector: Arc<dyn RpcConnector>) -> Result<Self> {
        let server = MarinadeServer::with_connector(
            Arc::new(config),
            Arc::new("integration".into()),
            connector,
        );
        let (server_transport, client_transport) = tokio::io::duplex(16 * 1024);
        let server_task = tokio::spawn(async move {
            server.serve(server_transport).await?.waiting().await?;
            Result::<_, anyhow::Error>::Ok(())
        });
        let client = serve_client(ClientInfo::default(), client_transport).await?;
        Ok(Self {
            client,
            server_task,
        })
    }

    pub async fn call(&self, name: &str, arguments: Value) -> Result<CallToolResult> {
        let arguments = match arguments {
            Value::Object(map) => Some(map),
            _ => None,
        };
        Ok(self
            .client
            .call_tool(CallToolRequestParam {
                name: name.to_string().into(),
                arguments,
            })
            .await?)
    }

    /// Tool names in the order the server lists them.
    pub async fn tool_names(&self) -> Result<Vec<String>> {
        Ok(self
            .client
            .list_all_tools()
            .await?
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect())
    }

    pub async fn shutdown(self) {
        let _ = self.client.cancel().await;
        let _ = self.server_task.await;
    }
}

/// The single text item of a tool result, parsed as JSON.
pub fn text_payload(result: &CallToolResult) -> Value {
    assert_eq!(result.content.len(), 1, "expected one content item: {result:?}");
    let text = result.content[0]
        .as_text()
        .map(|text| text.text.clone())
        .unwrap_or_else(|| panic!("expected text content: {result:?}"));
    serde_json::from_str(&text).unwrap_or_else(|err| panic!("invalid JSON payload {text}: {err}"))
}

pub struct ChildIoBridge {
    stdout: ChildStdout,
    stdin: ChildStdin,
}

impl ChildIoBridge {
    pub fn new(stdout: ChildStdout, stdin: ChildStdin) -> Self {
        Self { stdout, stdin }
    }
}

impl AsyncRead for ChildIoBridge {
    fn poll_read(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> std::task::Poll<io::Result<()>> {
        std::pin::Pin::new(&mut self.stdout).poll_read(cx, buf)
    }
}

impl AsyncWrite for ChildIoBridge {
    fn poll_write(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        data: &[u8],
    ) -> std::task::Poll<io::Result<usize>> {
        std::pin::Pin::new(&mut self.stdin).poll_write(cx, data)
    }

    fn poll_flush(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<io::Result<()>> {
        std::pin::Pin::new(&mut self.stdin).poll_flush(cx)
    }

    fn poll_shutdown(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<io::Result<()>> {
        std::pin::Pin::new(&mut self.stdin).poll_shutdown(cx)
    }
}
