use crate::config::AppConfig;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wallet_agent_context::{ContextProvider, FileContextProvider};
use wallet_agent_core::{Agent, AgentState, Conversation};
use wallet_agent_policy::ConfirmationPolicy;
use wallet_agent_tools::{LedgerActions, ToolRegistry};

/// Everything a running session needs.
pub struct Runtime {
    pub agent: Arc<Agent>,
    pub conversation: Conversation,
    pub handle: JoinHandle<()>,
    pub ledger: Arc<LedgerActions>,
}

/// `RUST_LOG` wins over the configured filter.
pub fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

pub async fn bootstrap(config: &AppConfig) -> Result<Runtime> {
    let provider = Arc::new(FileContextProvider::new(&config.context_dir));
    provider
        .initialize()
        .await
        .context("Failed to initialize context directory")?;
    let initial = provider
        .build_context(&config.caller_id, "")
        .await
        .with_context(|| format!("Failed to load wallet for {}", config.caller_id))?;

    let ledger = Arc::new(LedgerActions::new());
    let registry = Arc::new(ToolRegistry::with_builtin_catalog(ledger.clone()));
    let policy = Arc::new(ConfirmationPolicy::with_config(config.policy.clone()));

    tracing::info!(
        "Loaded {} tools for caller {}",
        registry.list().len(),
        config.caller_id
    );

    let agent = Arc::new(
        Agent::new(config.agent.clone(), registry, policy).with_context_provider(provider),
    );
    let (conversation, handle) = Conversation::spawn(
        agent.clone(),
        config.caller_id.clone(),
        AgentState::new(initial),
    );

    Ok(Runtime {
        agent,
        conversation,
        handle,
        ledger,
    })
}
