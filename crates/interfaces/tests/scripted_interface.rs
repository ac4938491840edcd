use wallet_agent_core::AgentResponse;
use wallet_agent_interfaces::{Interface, ScriptedInterface};

#[tokio::test]
async fn test_script_is_replayed_in_order() {
    let interface = ScriptedInterface::new(["hello", "balance"]).with_approvals([true]);

    assert_eq!(interface.receive_input().await.as_deref(), Some("hello"));
    assert_eq!(interface.receive_input().await.as_deref(), Some("balance"));
    assert_eq!(interface.receive_input().await, None);

    assert!(interface.request_approval("transfer").await);
    assert!(!interface.request_approval("transfer again").await);

    interface.present(&AgentResponse::reply("done")).await;
    interface.show_status("idle").await;

    assert_eq!(
        interface.outputs().await,
        vec![
            "approval: transfer".to_string(),
            "approval: transfer again".to_string(),
            "done".to_string(),
            "status: idle".to_string(),
        ]
    );
}
