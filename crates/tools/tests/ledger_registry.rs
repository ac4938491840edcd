use chrono::NaiveDate;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use wallet_agent_context::{AccountSummary, WalletContext};
use wallet_agent_tools::{ExecutionContext, LedgerActions, ToolRegistry};

fn params(value: Value) -> Map<String, Value> {
    value.as_object().unwrap().clone()
}

fn wallet() -> Arc<WalletContext> {
    let mut ctx = WalletContext::empty("dana");
    ctx.accounts.push(AccountSummary {
        name: "Checking".to_string(),
        kind: "BANK".to_string(),
        balance: 300.0,
        currency: "USD".to_string(),
    });
    Arc::new(ctx)
}

#[tokio::test]
async fn test_create_transaction_through_registry() {
    let ledger = Arc::new(LedgerActions::with_reference_date(
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
    ));
    let registry = ToolRegistry::with_builtin_catalog(ledger.clone());

    let result = registry
        .execute(
            "create_transaction",
            &params(json!({
                "amount": 18.5,
                "type": "EXPENSE",
                "description": "Coffee beans",
                "currency": "USD"
            })),
            wallet(),
            ExecutionContext::new("dana".to_string(), 1000),
        )
        .await;

    assert!(result.success, "{:?}", result);
    assert!(result.message.contains("Coffee beans"));
    assert_eq!(ledger.journal().await.len(), 1);
}

#[tokio::test]
async fn test_enum_violation_is_rejected_before_the_ledger() {
    let ledger = Arc::new(LedgerActions::new());
    let registry = ToolRegistry::with_builtin_catalog(ledger.clone());

    let result = registry
        .execute(
            "create_account",
            &params(json!({ "name": "Wallet", "type": "CRYPTO", "currency": "USD" })),
            wallet(),
            ExecutionContext::new("dana".to_string(), 1000),
        )
        .await;

    assert!(!result.success);
    assert!(result.failure_reason().contains("CRYPTO"));
    assert!(ledger.journal().await.is_empty());
}

#[tokio::test]
async fn test_balance_of_all_accounts() {
    let registry = ToolRegistry::with_builtin_catalog(Arc::new(LedgerActions::new()));

    let result = registry
        .execute(
            "get_account_balance",
            &Map::new(),
            wallet(),
            ExecutionContext::new("dana".to_string(), 1000),
        )
        .await;

    assert!(result.success);
    assert_eq!(result.data.unwrap()["totals"]["USD"], 300.0);
}
