use crate::agent::Agent;
use crate::types::{AgentError, AgentResponse, AgentState};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

enum Command {
    Message {
        text: String,
        reply: oneshot::Sender<AgentResponse>,
    },
    Confirm {
        reply: oneshot::Sender<AgentResponse>,
    },
    Reject {
        reply: oneshot::Sender<AgentResponse>,
    },
    Snapshot {
        reply: oneshot::Sender<AgentState>,
    },
}

/// Handle to a task that owns one caller's [`AgentState`].
///
/// Commands are served one at a time, so a turn never observes another
/// turn's half-written state.
#[derive(Clone)]
pub struct Conversation {
    tx: mpsc::Sender<Command>,
}

impl Conversation {
    pub fn spawn(agent: Arc<Agent>, caller_id: String, state: AgentState) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<Command>(16);

        let handle = tokio::spawn(async move {
            let mut state = state;
            info!("Conversation started for {}", caller_id);

            while let Some(command) = rx.recv().await {
                match command {
                    Command::Message { text, reply } => {
                        let (next, response) =
                            agent.process_message(state, &text, &caller_id).await;
                        state = next;
                        let _ = reply.send(response);
                    }
                    Command::Confirm { reply } => {
                        let (next, response) = agent.confirm_pending(state, &caller_id).await;
                        state = next;
                        let _ = reply.send(response);
                    }
                    Command::Reject { reply } => {
                        let (next, response) = agent.reject_pending(state);
                        state = next;
                        let _ = reply.send(response);
                    }
                    Command::Snapshot { reply } => {
                        let _ = reply.send(state.clone());
                    }
                }
            }

            debug!("Conversation for {} closed", caller_id);
        });

        (Self { tx }, handle)
    }

    pub async fn send(&self, text: impl Into<String>) -> Result<AgentResponse, AgentError> {
        let (reply, rx) = oneshot::channel();
        self.request(Command::Message {
            text: text.into(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| AgentError::ConversationClosed)
    }

    pub async fn confirm(&self) -> Result<AgentResponse, AgentError> {
        let (reply, rx) = oneshot::channel();
        self.request(Command::Confirm { reply }).await?;
        rx.await.map_err(|_| AgentError::ConversationClosed)
    }

    pub async fn reject(&self) -> Result<AgentResponse, AgentError> {
        let (reply, rx) = oneshot::channel();
        self.request(Command::Reject { reply }).await?;
        rx.await.map_err(|_| AgentError::ConversationClosed)
    }

    pub async fn snapshot(&self) -> Result<AgentState, AgentError> {
        let (reply, rx) = oneshot::channel();
        self.request(Command::Snapshot { reply }).await?;
        rx.await.map_err(|_| AgentError::ConversationClosed)
    }

    async fn request(&self, command: Command) -> Result<(), AgentError> {
        self.tx
            .send(command)
            .await
            .map_err(|_| AgentError::ConversationClosed)
    }
}
