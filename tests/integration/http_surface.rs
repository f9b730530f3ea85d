use std::{sync::Arc, time::Duration};

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use futures::StreamExt;
use serde_json::{json, Value};
use tokio::time::timeout;
use tower::ServiceExt;

use marinade_mcp::{
    server::{config::ServerConfig, runtime::http},
    tools::marinade::MockRpcConnector,
};

fn app() -> Router {
    http::router(
        Arc::new(ServerConfig::default()),
        Arc::new("http-surface".into()),
        Arc::new(MockRpcConnector::default()),
    )
}

async fn json_body(body: Body) -> Result<Value> {
    let bytes = to_bytes(body, usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn get_and_delete_on_mcp_are_rejected() -> Result<()> {
    for method in [Method::GET, Method::DELETE] {
        let response = app()
            .oneshot(
                Request::builder()
                    .method(method.clone())
                    .uri("/mcp")
                    .body(Body::from(r#"{"ignored":true}"#))?,
            )
            .await?;

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
        assert_eq!(
            json_body(response.into_body()).await?,
            json!({
                "jsonrpc": "2.0",
                "error": { "code": -32000, "message": "Method not allowed." },
                "id": null
            })
        );
    }
    Ok(())
}

#[tokio::test]
async fn health_reports_ok() -> Result<()> {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    assert_eq!(&bytes[..], b"ok");
    Ok(())
}

#[tokio::test]
async fn cors_preflight_allows_any_origin_and_session_header() -> Result<()> {
    let response = app()
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/mcp")
                .header(header::ORIGIN, "https://inspector.example")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(
                    header::ACCESS_CONTROL_REQUEST_HEADERS,
                    "content-type,mcp-session-id",
                )
                .body(Body::empty())?,
        )
        .await?;

    let headers = response.headers();
    assert_eq!(
        headers
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok()),
        Some("*")
    );
    let allowed = headers
        .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();
    assert!(allowed.contains("content-type"), "allowed headers: {allowed}");
    assert!(allowed.contains("mcp-session-id"), "allowed headers: {allowed}");
    Ok(())
}

#[tokio::test]
async fn post_initialize_is_answered_statelessly() -> Result<()> {
    let request = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2025-03-26",
            "capabilities": {},
            "clientInfo": { "name": "http-surface-test", "version": "0.0.0" }
        }
    });
    let response = app()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/mcp")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::ACCEPT, "application/json, text/event-stream")
                .body(Body::from(request.to_string()))?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers().get("mcp-session-id").is_none(),
        "stateless mode must not issue sessions"
    );

    let mut stream = response.into_body().into_data_stream();
    let mut received = String::new();
    while !received.contains("marinade-finance-mcp-server") {
        let chunk = timeout(Duration::from_secs(5), stream.next())
            .await?
            .expect("response ended before the initialize result")?;
        received.push_str(&String::from_utf8_lossy(&chunk));
    }
    assert!(received.contains("\"id\":1"), "response: {received}");
    Ok(())
}
