use anyhow::{Context, Result};
use std::path::PathBuf;
use wallet_agent_app::config::DEFAULT_CONFIG_PATH;
use wallet_agent_app::{bootstrap, init_logging, run_session, AppConfig};
use wallet_agent_interfaces::{Interface, TerminalInterface};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let config = AppConfig::load_or_default(&config_path)
        .await
        .context("Failed to load configuration")?;
    init_logging(&config.log_filter);
    tracing::info!("Starting wallet agent with {}", config_path.display());

    let runtime = bootstrap(&config).await?;
    let interface = TerminalInterface::new();

    interface
        .send_output("Wallet assistant ready. Type /help for commands.")
        .await;

    let metrics = runtime.agent.metrics();
    run_session(&interface, &runtime.conversation, || metrics.snapshot()).await?;

    runtime.agent.shutdown_token().cancel();
    drop(runtime.conversation);
    runtime
        .handle
        .await
        .context("Conversation task failed")?;
    Ok(())
}
