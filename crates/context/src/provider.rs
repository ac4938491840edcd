use crate::types::WalletContext;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid caller id: {0}")]
    InvalidCaller(String),
}

/// Builds the read-only snapshot a plan executes against.
#[async_trait]
pub trait ContextProvider: Send + Sync {
    async fn build_context(&self, caller_id: &str, query: &str)
        -> Result<WalletContext, ContextError>;
}

/// Loads `<caller_id>.json` snapshots from a directory.
pub struct FileContextProvider {
    base_path: PathBuf,
}

impl FileContextProvider {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub async fn initialize(&self) -> Result<(), ContextError> {
        fs::create_dir_all(&self.base_path).await?;
        tracing::info!("Context provider initialized at {:?}", self.base_path);
        Ok(())
    }

    pub async fn load(&self, caller_id: &str) -> Result<WalletContext, ContextError> {
        let path = self.context_path(caller_id)?;

        if !path.exists() {
            tracing::info!("No stored wallet for caller {}, using empty snapshot", caller_id);
            return Ok(WalletContext::empty(caller_id));
        }

        let content = fs::read_to_string(&path).await?;
        let mut context: WalletContext = serde_json::from_str(&content)?;
        context.caller_id = caller_id.to_string();

        tracing::debug!(
            "Loaded wallet for caller {}: {} accounts, {} transactions",
            caller_id,
            context.accounts.len(),
            context.transactions.len()
        );
        Ok(context)
    }

    pub async fn save(&self, context: &WalletContext) -> Result<(), ContextError> {
        let path = self.context_path(&context.caller_id)?;

        // Atomic write: write to temp file, then rename
        let temp_path = path.with_extension("tmp");
        let content = serde_json::to_string_pretty(context)?;

        fs::write(&temp_path, content).await?;
        fs::rename(&temp_path, &path).await?;

        tracing::debug!("Saved wallet for caller: {}", context.caller_id);
        Ok(())
    }

    fn context_path(&self, caller_id: &str) -> Result<PathBuf, ContextError> {
        let valid = !caller_id.is_empty()
            && caller_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(ContextError::InvalidCaller(caller_id.to_string()));
        }
        Ok(self.base_path.join(format!("{}.json", caller_id)))
    }
}

#[async_trait]
impl ContextProvider for FileContextProvider {
    async fn build_context(
        &self,
        caller_id: &str,
        _query: &str,
    ) -> Result<WalletContext, ContextError> {
        let mut context = self.load(caller_id).await?;
        context.generated_at = Some(chrono::Utc::now());
        Ok(context)
    }
}

/// Hands out clones of a fixed snapshot.
pub struct StaticContextProvider {
    context: WalletContext,
}

impl StaticContextProvider {
    pub fn new(context: WalletContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl ContextProvider for StaticContextProvider {
    async fn build_context(
        &self,
        _caller_id: &str,
        _query: &str,
    ) -> Result<WalletContext, ContextError> {
        Ok(self.context.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AccountSummary;

    #[tokio::test]
    async fn test_context_lifecycle() {
        let temp_dir = tempfile::tempdir().unwrap();
        let provider = FileContextProvider::new(temp_dir.path());

        provider.initialize().await.unwrap();

        let mut context = provider.load("alice").await.unwrap();
        assert!(context.accounts.is_empty());
        context.accounts.push(AccountSummary {
            name: "Checking".to_string(),
            kind: "BANK".to_string(),
            balance: 10.0,
            currency: "USD".to_string(),
        });

        provider.save(&context).await.unwrap();

        let built = provider.build_context("alice", "balance?").await.unwrap();
        assert_eq!(built.accounts.len(), 1);
        assert!(built.generated_at.is_some());
    }

    #[tokio::test]
    async fn test_rejects_path_like_caller_ids() {
        let temp_dir = tempfile::tempdir().unwrap();
        let provider = FileContextProvider::new(temp_dir.path());

        let result = provider.load("../etc/passwd").await;
        assert!(matches!(result, Err(ContextError::InvalidCaller(_))));
    }
}
