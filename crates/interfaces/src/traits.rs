use async_trait::async_trait;
use wallet_agent_core::AgentResponse;

/// Where user text comes from and where agent replies go.
#[async_trait]
pub trait Interface: Send + Sync {
    async fn receive_input(&self) -> Option<String>;
    async fn send_output(&self, message: &str);
    async fn request_approval(&self, action: &str) -> bool;
    async fn show_status(&self, status: &str);

    async fn present(&self, response: &AgentResponse) {
        self.send_output(&render_response(response)).await;
    }
}

pub fn render_response(response: &AgentResponse) -> String {
    match &response.pending_plan_summary {
        Some(summary) if response.requires_confirmation && !response.message.contains('\n') => {
            format!("{}\n{}", response.message, summary.join("\n"))
        }
        _ => response.message.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_reply_is_message() {
        let response = AgentResponse::reply("done");
        assert_eq!(render_response(&response), "done");
    }

    #[test]
    fn test_one_line_confirmation_gets_summary() {
        let response = AgentResponse::confirmation(
            "Confirm?",
            vec!["1. create_transfer".to_string()],
        );
        assert_eq!(render_response(&response), "Confirm?\n1. create_transfer");

        let listed = AgentResponse::confirmation(
            "Actions:\n- create_transfer\nContinue?",
            vec!["1. create_transfer".to_string()],
        );
        assert_eq!(render_response(&listed), listed.message);
    }
}
