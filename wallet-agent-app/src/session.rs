use anyhow::{Context, Result};
use wallet_agent_core::{Conversation, MetricsSnapshot};
use wallet_agent_interfaces::Interface;

const HELP: &str = "Commands:\n\
  /state    - Show the conversation state\n\
  /metrics  - Show agent counters\n\
  /help     - Show this help message\n\
  /quit     - Exit\n\
Anything else is sent to the assistant.";

/// Reads lines until EOF or `/quit`, asking for approval whenever a plan is held.
pub async fn run_session(
    interface: &dyn Interface,
    conversation: &Conversation,
    metrics: impl Fn() -> MetricsSnapshot,
) -> Result<()> {
    while let Some(input) = interface.receive_input().await {
        match input.as_str() {
            "" => continue,
            "/quit" | "/exit" => {
                interface.send_output("Goodbye!").await;
                break;
            }
            "/help" => interface.send_output(HELP).await,
            "/state" => {
                let state = conversation.snapshot().await.context("Conversation ended")?;
                interface
                    .show_status(&format!(
                        "phase: {:?}, tasks run: {}, intentions: {}, pending plan: {}",
                        state.phase,
                        state.completed_tasks.len(),
                        state.reasoning_history.len(),
                        state
                            .current_plan
                            .as_ref()
                            .map(|plan| plan.id.as_str())
                            .unwrap_or("none")
                    ))
                    .await;
            }
            "/metrics" => {
                let snapshot = metrics();
                interface
                    .show_status(&format!(
                        "turns: {}, plans: {}, task success rate: {:.0}%",
                        snapshot.turns,
                        snapshot.plans_executed,
                        snapshot.task_success_rate() * 100.0
                    ))
                    .await;
            }
            text => {
                let response = conversation.send(text).await.context("Conversation ended")?;
                interface.present(&response).await;

                if response.requires_confirmation {
                    let action = response
                        .pending_plan_summary
                        .as_deref()
                        .unwrap_or_default()
                        .join("; ");
                    let follow_up = if interface.request_approval(&action).await {
                        conversation.confirm().await
                    } else {
                        conversation.reject().await
                    }
                    .context("Conversation ended")?;
                    interface.present(&follow_up).await;
                }
            }
        }
    }
    Ok(())
}
