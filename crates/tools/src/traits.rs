use crate::call::ToolCall;
use crate::execution_context::ExecutionContext;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use wallet_agent_context::WalletContext;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Execution error: {0}")]
    Execution(String),
    #[error("Tool execution timed out after {0}ms")]
    Timeout(u64),
    #[error("Tool execution cancelled")]
    Cancelled,
    #[error("Tool execution panicked: {0}")]
    Panicked(String),
}

/// Outcome of one tool invocation. Tool failures are reported here, never raised.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
}

impl ActionResult {
    pub fn success(message: impl Into<String>, data: Option<serde_json::Value>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error: Some(error.into()),
        }
    }

    /// `error` when present, otherwise `message`.
    pub fn failure_reason(&self) -> String {
        self.error.clone().unwrap_or_else(|| self.message.clone())
    }
}

impl From<ToolError> for ActionResult {
    fn from(err: ToolError) -> Self {
        ActionResult::failure("Tool execution failed", err.to_string())
    }
}

/// Backend that actually carries out decoded tool calls.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn handle(
        &self,
        call: ToolCall,
        context: &WalletContext,
        ctx: &ExecutionContext,
    ) -> Result<ActionResult, ToolError>;
}
