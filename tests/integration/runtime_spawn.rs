use std::time::Duration;

use anyhow::Result;
use rmcp::{model::ClientInfo, serve_client};
use tokio::time::timeout;

use crate::common::spawn_server_process;

#[tokio::test]
async fn stdio_spawn_lists_documentation_tool() -> Result<()> {
    let (mut child, transport, stderr_task) = spawn_server_process().await?;

    let client = serve_client(ClientInfo::default(), transport).await?;
    let info = client.peer_info().cloned();
    let list = client.list_tools(None).await?;
    let names: Vec<String> = list.tools.iter().map(|tool| tool.name.to_string()).collect();
    assert_eq!(names, vec!["search_documentation".to_string()]);
    assert_eq!(
        info.map(|info| info.server_info.name),
        Some("marinade-finance-mcp-server".to_string())
    );

    client.cancel().await?;
    let status = timeout(Duration::from_secs(5), child.wait()).await??;
    assert!(
        status.success(),
        "server should exit cleanly but exit status was {status:?}"
    );
    if let Some(handle) = stderr_task {
        let _ = handle.await;
    }
    Ok(())
}

#[tokio::test]
async fn invalid_port_fails_startup() -> Result<()> {
    let output = tokio::process::Command::new(crate::common::BINARY_PATH)
        .arg("--transport")
        .arg("stdio")
        .env("PORT", "70000")
        .output()
        .await?;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("PORT"), "stderr: {stderr}");
    Ok(())
}
