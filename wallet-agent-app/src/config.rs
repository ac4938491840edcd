use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use wallet_agent_core::AgentConfig;
use wallet_agent_policy::PolicyConfig;

pub const DEFAULT_CONFIG_PATH: &str = "config/wallet-agent.yaml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub agent: AgentConfig,
    pub policy: PolicyConfig,
    /// Directory holding one `<caller_id>.json` wallet snapshot per caller.
    pub context_dir: PathBuf,
    pub caller_id: String,
    /// Used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            agent: AgentConfig::default(),
            policy: PolicyConfig::default(),
            context_dir: PathBuf::from("./data/context"),
            caller_id: "local".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: AppConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Falls back to defaults when the file does not exist.
    pub async fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if !path.as_ref().exists() {
            return Ok(Self::default());
        }
        Self::load(path).await
    }

    pub fn validate(&self) -> Result<()> {
        self.agent.validate().context("Invalid agent section")?;
        self.policy.validate().context("Invalid policy section")?;

        let valid_caller = !self.caller_id.is_empty()
            && self
                .caller_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid_caller {
            bail!("caller_id must be non-empty and contain only letters, digits, '-' or '_'");
        }
        if self.log_filter.trim().is_empty() {
            bail!("log_filter must not be empty");
        }
        Ok(())
    }
}
