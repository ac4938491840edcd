use serde_json::json;
use wallet_agent_app::{bootstrap, run_session, AppConfig};
use wallet_agent_core::CAPABILITIES_MESSAGE;
use wallet_agent_interfaces::ScriptedInterface;
use wallet_agent_tools::ActionKind;

async fn config_with_wallet(dir: &std::path::Path) -> AppConfig {
    let wallet = json!({
        "caller_id": "maria",
        "base_currency": "USD",
        "accounts": [
            { "name": "Checking", "kind": "BANK", "balance": 500.0, "currency": "USD" },
            { "name": "Savings", "kind": "SAVINGS", "balance": 0.0, "currency": "USD" }
        ]
    });
    tokio::fs::write(dir.join("maria.json"), wallet.to_string())
        .await
        .unwrap();

    let mut config = AppConfig {
        context_dir: dir.to_path_buf(),
        caller_id: "maria".to_string(),
        ..Default::default()
    };
    config.agent.auto_execute = false;
    config
}

#[tokio::test]
async fn test_approved_transfer_is_recorded() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = config_with_wallet(temp_dir.path()).await;
    let runtime = bootstrap(&config).await.unwrap();

    let interface = ScriptedInterface::new([
        "hello",
        "transfer 200 from Checking to Savings",
        "/state",
        "/quit",
        "never read",
    ])
    .with_approvals([true]);

    let metrics = runtime.agent.metrics();
    run_session(&interface, &runtime.conversation, || metrics.snapshot())
        .await
        .unwrap();

    let outputs = interface.outputs().await;
    assert_eq!(outputs[0], CAPABILITIES_MESSAGE);
    assert!(outputs[1].contains("create_transfer"));
    assert!(outputs[2].starts_with("approval: 1. create_transfer"));
    assert_eq!(
        outputs[3],
        "✓ Plan executed successfully. 1 task(s) completed."
    );
    assert!(outputs[4].starts_with("status: phase: Idle, tasks run: 1"));
    assert_eq!(outputs[5], "Goodbye!");
    assert_eq!(outputs.len(), 6);

    let journal = runtime.ledger.journal().await;
    assert_eq!(journal.len(), 1);
    assert_eq!(journal[0].kind, ActionKind::CreateTransfer);
    assert_eq!(journal[0].caller_id, "maria");
}

#[tokio::test]
async fn test_denied_transfer_runs_nothing() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = config_with_wallet(temp_dir.path()).await;
    let runtime = bootstrap(&config).await.unwrap();

    let interface = ScriptedInterface::new(["transfer 50 from Checking to Savings"]);

    run_session(&interface, &runtime.conversation, || {
        runtime.agent.metrics().snapshot()
    })
    .await
    .unwrap();

    let outputs = interface.outputs().await;
    assert_eq!(outputs.last().unwrap(), "Okay, I won't run those actions.");
    assert!(runtime.ledger.journal().await.is_empty());

    let state = runtime.conversation.snapshot().await.unwrap();
    assert!(state.current_plan.is_none());
    assert!(state.completed_tasks.is_empty());
}

#[tokio::test]
async fn test_balance_query_reads_stored_wallet() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = config_with_wallet(temp_dir.path()).await;
    let runtime = bootstrap(&config).await.unwrap();

    let response = runtime
        .conversation
        .send("what is my balance")
        .await
        .unwrap();
    assert!(!response.requires_confirmation);
    assert_eq!(
        response.message,
        "✓ Plan executed successfully. 1 task(s) completed."
    );

    let state = runtime.conversation.snapshot().await.unwrap();
    let result = state.completed_tasks[0].result.clone().unwrap();
    assert_eq!(result["totals"]["USD"], 500.0);
}
