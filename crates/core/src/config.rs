use crate::types::AgentError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;
use wallet_agent_tools::ActionKind;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AgentConfig {
    pub uses_structured_reasoning: bool,
    /// Upper bound on tasks per plan.
    pub max_planning_depth: usize,
    pub auto_execute: bool,
    pub confirmation_required_for: BTreeSet<ActionKind>,
    pub confidence_threshold: f64,
    /// Below this confidence a plan is held for confirmation. Off when unset.
    pub confirm_below_confidence: Option<f64>,
    pub max_replan_attempts: u32,
    pub reasoning_timeout_ms: u64,
    pub task_timeout_ms: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        let mut confirmation_required_for = BTreeSet::new();
        confirmation_required_for.insert(ActionKind::CreateTransfer);

        Self {
            uses_structured_reasoning: true,
            max_planning_depth: 5,
            auto_execute: true,
            confirmation_required_for,
            confidence_threshold: 0.5,
            confirm_below_confidence: None,
            max_replan_attempts: 0,
            reasoning_timeout_ms: 2_000,
            task_timeout_ms: 10_000,
        }
    }
}

impl AgentConfig {
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self, AgentError> {
        let content = tokio::fs::read_to_string(&path).await?;
        let config: AgentConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AgentError> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(AgentError::Config(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if let Some(value) = self.confirm_below_confidence {
            if !(0.0..=1.0).contains(&value) {
                return Err(AgentError::Config(format!(
                    "confirm_below_confidence must be within [0, 1], got {}",
                    value
                )));
            }
        }
        if self.max_planning_depth == 0 {
            return Err(AgentError::Config(
                "max_planning_depth must be at least 1".to_string(),
            ));
        }
        if self.reasoning_timeout_ms == 0 || self.task_timeout_ms == 0 {
            return Err(AgentError::Config("timeouts must be positive".to_string()));
        }
        Ok(())
    }

    pub fn reasoning_timeout(&self) -> Duration {
        Duration::from_millis(self.reasoning_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AgentConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.uses_structured_reasoning);
        assert_eq!(config.max_planning_depth, 5);
        assert!(config.auto_execute);
        assert!(config
            .confirmation_required_for
            .contains(&ActionKind::CreateTransfer));
    }

    #[test]
    fn test_yaml_overrides() {
        let yaml = r#"
auto_execute: false
confidence_threshold: 0.7
confirmation_required_for: [CREATE_TRANSFER, CREATE_ACCOUNT]
"#;
        let config: AgentConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(!config.auto_execute);
        assert_eq!(config.confidence_threshold, 0.7);
        assert_eq!(config.confirmation_required_for.len(), 2);
        assert_eq!(config.max_planning_depth, 5);
    }

    #[test]
    fn test_validation_errors() {
        let config = AgentConfig {
            confidence_threshold: 1.5,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(AgentError::Config(_))));

        let config = AgentConfig {
            max_planning_depth: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("agent.yaml");
        tokio::fs::write(&path, "max_replan_attempts: 2\n").await.unwrap();

        let config = AgentConfig::load(&path).await.unwrap();
        assert_eq!(config.max_replan_attempts, 2);
    }
}
