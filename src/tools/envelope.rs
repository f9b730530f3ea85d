//! Tool result shaping shared by every tool callback.
//!
//! Callbacks never fail at the protocol level: success payloads and failures
//! are both rendered as pretty-printed JSON inside a single text item.

use std::{future::Future, io};

use rmcp::model::{CallToolResult, Content};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

use crate::lib::{
    errors::{ChainError, DocsClientError},
    telemetry::ToolCallSpan,
};

/// Content type every item is normalized to before it leaves the server.
pub const TEXT_CONTENT_TYPE: &str = "text";

/// Suggestion attached to timeout envelopes.
pub const RETRY_SUGGESTION: &str = "The request timed out. Please try again.";

const TIMEOUT_MARKERS: &[&str] = &["timed out", "timeout", "abort", "cancel"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl ContentItem {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: TEXT_CONTENT_TYPE.to_string(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: Vec<ContentItem>,
}

impl ToolResult {
    /// Single text item holding `payload` as pretty-printed JSON.
    pub fn json<T: Serialize>(payload: &T) -> Self {
        let text = serde_json::to_string_pretty(payload).unwrap_or_else(|err| {
            json!({
                "error": "Failed to serialize response",
                "reason": err.to_string(),
            })
            .to_string()
        });
        Self {
            content: vec![ContentItem::text(text)],
        }
    }

    pub fn first_text(&self) -> Option<&str> {
        self.content.first().map(|item| item.text.as_str())
    }
}

/// Items are forced to text regardless of the type the callback set.
impl From<ToolResult> for CallToolResult {
    fn from(result: ToolResult) -> Self {
        CallToolResult::success(
            result
                .content
                .into_iter()
                .map(|item| Content::text(item.text))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub suggestion: Option<String>,
}

/// Labels a tool uses for its two failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorLabels {
    pub failure: &'static str,
    pub timeout: &'static str,
}

impl ErrorLabels {
    pub const fn new(failure: &'static str, timeout: &'static str) -> Self {
        Self { failure, timeout }
    }
}

/// Failure returned by a tool body.
#[derive(Debug, Error)]
pub enum ToolFailure {
    /// Classified by the tool itself (bad input, insufficient funds).
    #[error("{label}: {reason}")]
    Rejected {
        label: &'static str,
        reason: String,
        suggestion: Option<String>,
    },
    /// Anything else; classified by [`with_tool_error_handling`].
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl ToolFailure {
    pub fn rejected(label: &'static str, reason: impl Into<String>) -> Self {
        Self::Rejected {
            label,
            reason: reason.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(self, suggestion: impl Into<String>) -> Self {
        match self {
            Self::Rejected { label, reason, .. } => Self::Rejected {
                label,
                reason,
                suggestion: Some(suggestion.into()),
            },
            other => other,
        }
    }
}

impl From<ChainError> for ToolFailure {
    fn from(err: ChainError) -> Self {
        Self::Failed(anyhow::Error::new(err))
    }
}

impl From<DocsClientError> for ToolFailure {
    fn from(err: DocsClientError) -> Self {
        Self::Failed(anyhow::Error::new(err))
    }
}

/// Run a tool body and turn its outcome into a [`ToolResult`].
pub async fn with_tool_error_handling<T, F>(
    tool: &'static str,
    labels: ErrorLabels,
    operation: F,
) -> ToolResult
where
    T: Serialize,
    F: Future<Output = Result<T, ToolFailure>>,
{
    let span = ToolCallSpan::start(tool);
    match operation.await {
        Ok(payload) => {
            span.finish("ok");
            ToolResult::json(&payload)
        }
        Err(ToolFailure::Rejected {
            label,
            reason,
            suggestion,
        }) => {
            span.finish("rejected");
            ToolResult::json(&ErrorEnvelope {
                error: label.to_string(),
                reason,
                suggestion,
            })
        }
        Err(ToolFailure::Failed(err)) => {
            let timed_out = is_timeout(&err);
            warn!(
                target: "marinade_mcp::tools",
                tool,
                timed_out,
                error = %format!("{err:#}"),
                "Tool call failed"
            );
            span.finish(if timed_out { "timeout" } else { "failed" });
            let envelope = if timed_out {
                ErrorEnvelope {
                    error: labels.timeout.to_string(),
                    reason: err.to_string(),
                    suggestion: Some(RETRY_SUGGESTION.to_string()),
                }
            } else {
                ErrorEnvelope {
                    error: labels.failure.to_string(),
                    reason: err.to_string(),
                    suggestion: None,
                }
            };
            ToolResult::json(&envelope)
        }
    }
}

/// True when any cause in the chain looks like a cancellation or timeout.
pub fn is_timeout(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        if cause.is::<tokio::time::error::Elapsed>() {
            return true;
        }
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            if io_err.kind() == io::ErrorKind::TimedOut {
                return true;
            }
        }
        let message = cause.to_string().to_ascii_lowercase();
        TIMEOUT_MARKERS.iter().any(|marker| message.contains(marker))
    })
}
