use crate::config::PolicyConfig;
use serde_json::{Map, Value};
use wallet_agent_tools::ActionKind;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmationDecision {
    NotRequired,
    Required(String),
}

/// Decides which tool calls need a human "yes" before they run.
pub struct ConfirmationPolicy {
    config: PolicyConfig,
}

impl ConfirmationPolicy {
    pub fn new() -> Self {
        Self::with_config(PolicyConfig::default())
    }

    pub fn with_config(config: PolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    pub fn evaluate(&self, tool_name: &str, params: &Map<String, Value>) -> ConfirmationDecision {
        let kind = ActionKind::from_tool_name(tool_name);

        if self.config.always_confirm.contains(&kind) {
            return ConfirmationDecision::Required(format!("{} always needs confirmation", kind));
        }

        if kind == ActionKind::CreateTransaction {
            let Some(amount) = params.get("amount").and_then(Value::as_f64) else {
                return ConfirmationDecision::NotRequired;
            };
            let currency = params.get("currency").and_then(Value::as_str);
            let threshold = self.config.threshold_for(currency);
            if amount >= threshold {
                return ConfirmationDecision::Required(format!(
                    "amount {} reaches the {} threshold",
                    amount, threshold
                ));
            }
        }

        ConfirmationDecision::NotRequired
    }

    pub fn needs_confirmation(&self, tool_name: &str, params: &Map<String, Value>) -> bool {
        let decision = self.evaluate(tool_name, params);
        if let ConfirmationDecision::Required(reason) = &decision {
            tracing::debug!("Confirmation required for {}: {}", tool_name, reason);
        }
        decision != ConfirmationDecision::NotRequired
    }
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self::new()
    }
}
