use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use wallet_agent_tools::ActionKind;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid policy: {0}")]
    Invalid(String),
}

/// Thresholds and always-confirm actions for the confirmation gate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PolicyConfig {
    /// Threshold for transactions whose currency has no explicit entry.
    pub default_threshold: f64,
    pub currency_thresholds: BTreeMap<String, f64>,
    pub always_confirm: Vec<ActionKind>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        let mut currency_thresholds = BTreeMap::new();
        currency_thresholds.insert("USD".to_string(), 100.0);

        Self {
            default_threshold: 1000.0,
            currency_thresholds,
            always_confirm: vec![ActionKind::CreateTransfer, ActionKind::CreateAccount],
        }
    }
}

impl PolicyConfig {
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self, PolicyError> {
        let content = tokio::fs::read_to_string(&path).await?;
        let config: PolicyConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PolicyError> {
        let content = serde_yaml::to_string(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), PolicyError> {
        check_threshold("default_threshold", self.default_threshold)?;
        for (currency, threshold) in &self.currency_thresholds {
            check_threshold(currency, *threshold)?;
        }
        if self.always_confirm.iter().any(|kind| !kind.is_mutating()) {
            return Err(PolicyError::Invalid(
                "always_confirm may only list create actions".to_string(),
            ));
        }
        Ok(())
    }

    pub fn threshold_for(&self, currency: Option<&str>) -> f64 {
        currency
            .and_then(|code| self.currency_thresholds.get(&code.to_uppercase()))
            .copied()
            .unwrap_or(self.default_threshold)
    }
}

fn check_threshold(name: &str, value: f64) -> Result<(), PolicyError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PolicyError::Invalid(format!(
            "threshold {} must be a positive number, got {}",
            name, value
        )));
    }
    Ok(())
}
