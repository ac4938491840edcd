use crate::traits::Interface;
use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::Mutex;

/// In-memory interface fed from a script; records everything shown.
#[derive(Default)]
pub struct ScriptedInterface {
    inputs: Mutex<VecDeque<String>>,
    approvals: Mutex<VecDeque<bool>>,
    outputs: Mutex<Vec<String>>,
}

impl ScriptedInterface {
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: Mutex::new(inputs.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    /// Answers for successive approval prompts; unanswered prompts are denied.
    pub fn with_approvals(self, approvals: impl IntoIterator<Item = bool>) -> Self {
        Self {
            approvals: Mutex::new(approvals.into_iter().collect()),
            ..self
        }
    }

    pub async fn outputs(&self) -> Vec<String> {
        self.outputs.lock().await.clone()
    }
}

#[async_trait]
impl Interface for ScriptedInterface {
    async fn receive_input(&self) -> Option<String> {
        self.inputs.lock().await.pop_front()
    }

    async fn send_output(&self, message: &str) {
        self.outputs.lock().await.push(message.to_string());
    }

    async fn request_approval(&self, action: &str) -> bool {
        self.outputs
            .lock()
            .await
            .push(format!("approval: {}", action));
        self.approvals.lock().await.pop_front().unwrap_or(false)
    }

    async fn show_status(&self, status: &str) {
        self.outputs.lock().await.push(format!("status: {}", status));
    }
}
