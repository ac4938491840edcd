use wallet_agent_app::AppConfig;
use wallet_agent_tools::ActionKind;

#[tokio::test]
async fn test_sample_config_parses() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/wallet-agent.yaml");
    let config = AppConfig::load(path).await.unwrap();

    assert_eq!(config.caller_id, "local");
    assert!(!config.agent.auto_execute);
    assert!(config
        .agent
        .confirmation_required_for
        .contains(&ActionKind::CreateTransfer));
    assert_eq!(config.policy.threshold_for(Some("usd")), 100.0);
    assert_eq!(config.policy.threshold_for(Some("EUR")), 1000.0);
}

#[tokio::test]
async fn test_missing_file_uses_defaults() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = AppConfig::load_or_default(temp_dir.path().join("absent.yaml"))
        .await
        .unwrap();
    assert_eq!(config, AppConfig::default());
    assert!(config.validate().is_ok());
}

#[tokio::test]
async fn test_partial_file_keeps_defaults() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("partial.yaml");
    tokio::fs::write(&path, "caller_id: maria\nagent:\n  max_replan_attempts: 1\n")
        .await
        .unwrap();

    let config = AppConfig::load(&path).await.unwrap();
    assert_eq!(config.caller_id, "maria");
    assert_eq!(config.agent.max_replan_attempts, 1);
    assert_eq!(config.agent.max_planning_depth, 5);
    assert_eq!(config.log_filter, "info");
}

#[tokio::test]
async fn test_invalid_values_are_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();

    let path = temp_dir.path().join("threshold.yaml");
    tokio::fs::write(&path, "agent:\n  confidence_threshold: 2.0\n")
        .await
        .unwrap();
    assert!(AppConfig::load(&path).await.is_err());

    let path = temp_dir.path().join("caller.yaml");
    tokio::fs::write(&path, "caller_id: \"../etc\"\n").await.unwrap();
    assert!(AppConfig::load(&path).await.is_err());

    let path = temp_dir.path().join("policy.yaml");
    tokio::fs::write(&path, "policy:\n  default_threshold: -5\n")
        .await
        .unwrap();
    assert!(AppConfig::load(&path).await.is_err());
}
