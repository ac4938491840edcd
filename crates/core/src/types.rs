use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use wallet_agent_context::WalletContext;
use wallet_agent_tasks::{Task, TaskPlan};

pub const LABEL_UNKNOWN: &str = "UNKNOWN";
pub const LABEL_CONVERSATIONAL: &str = "CONVERSATIONAL";

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Classification failed: {0}")]
    Classification(String),
    #[error("Conversation closed")]
    ConversationClosed,
}

/// Classifier verdict for one message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Intention {
    pub label: String,
    pub confidence: f64,
    pub suggested_tools: Vec<String>,
    pub needs_planning: bool,
    /// The text that was classified; the planner mines it for parameters.
    pub request: String,
}

impl Intention {
    pub fn unknown(request: &str) -> Self {
        Self {
            label: LABEL_UNKNOWN.to_string(),
            confidence: 0.5,
            suggested_tools: Vec::new(),
            needs_planning: false,
            request: request.to_string(),
        }
    }

    pub fn is_conversational(&self) -> bool {
        self.label == LABEL_CONVERSATIONAL
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    Reasoning,
    Planning,
    AwaitingConfirmation,
    Executing,
}

/// Per-conversation state. Owned by exactly one writer at a time.
#[derive(Debug, Clone)]
pub struct AgentState {
    pub completed_tasks: Vec<Task>,
    pub wallet_context: Arc<WalletContext>,
    pub current_plan: Option<TaskPlan>,
    pub reasoning_history: Vec<Intention>,
    pub phase: TurnPhase,
}

impl AgentState {
    pub fn new(wallet_context: WalletContext) -> Self {
        Self {
            completed_tasks: Vec::new(),
            wallet_context: Arc::new(wallet_context),
            current_plan: None,
            reasoning_history: Vec::new(),
            phase: TurnPhase::Idle,
        }
    }

    pub fn awaiting_confirmation(&self) -> bool {
        self.phase == TurnPhase::AwaitingConfirmation && self.current_plan.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentResponse {
    pub message: String,
    pub requires_confirmation: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_plan_summary: Option<Vec<String>>,
}

impl AgentResponse {
    pub fn reply(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            requires_confirmation: false,
            pending_plan_summary: None,
        }
    }

    pub fn confirmation(message: impl Into<String>, summary: Vec<String>) -> Self {
        Self {
            message: message.into(),
            requires_confirmation: true,
            pending_plan_summary: Some(summary),
        }
    }
}
