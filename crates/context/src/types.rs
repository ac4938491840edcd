use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Read-only snapshot of a caller's wallet, shared by every task of a plan.
///
/// The orchestration layer never looks inside; only tool handlers do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletContext {
    pub caller_id: String,
    #[serde(default = "default_currency")]
    pub base_currency: String,
    #[serde(default)]
    pub accounts: Vec<AccountSummary>,
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
    #[serde(default)]
    pub budgets: Vec<BudgetSummary>,
    #[serde(default)]
    pub goals: Vec<GoalSummary>,
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSummary {
    pub name: String,
    pub kind: String,
    pub balance: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Expense,
    Income,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: f64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub account: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub category: String,
    pub budget: f64,
    pub spent: f64,
}

impl BudgetSummary {
    pub fn remaining(&self) -> f64 {
        self.budget - self.spent
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalSummary {
    pub name: String,
    pub target: f64,
    pub current: f64,
}

impl WalletContext {
    pub fn empty(caller_id: &str) -> Self {
        Self {
            caller_id: caller_id.to_string(),
            base_currency: default_currency(),
            accounts: Vec::new(),
            transactions: Vec::new(),
            budgets: Vec::new(),
            goals: Vec::new(),
            generated_at: None,
        }
    }

    pub fn account(&self, name: &str) -> Option<&AccountSummary> {
        let needle = name.to_lowercase();
        self.accounts
            .iter()
            .find(|account| account.name.to_lowercase() == needle)
    }

    /// Sum of balances per currency code.
    pub fn total_balance_by_currency(&self) -> BTreeMap<String, f64> {
        let mut totals = BTreeMap::new();
        for account in &self.accounts {
            *totals.entry(account.currency.clone()).or_insert(0.0) += account.balance;
        }
        totals
    }

    /// Transactions dated within `[from, to]`, both inclusive.
    pub fn transactions_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> impl Iterator<Item = &TransactionRecord> {
        self.transactions
            .iter()
            .filter(move |tx| tx.date >= from && tx.date <= to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WalletContext {
        let mut ctx = WalletContext::empty("user-1");
        ctx.accounts.push(AccountSummary {
            name: "Checking".to_string(),
            kind: "BANK".to_string(),
            balance: 1200.0,
            currency: "USD".to_string(),
        });
        ctx.accounts.push(AccountSummary {
            name: "Cash".to_string(),
            kind: "CASH".to_string(),
            balance: 50.5,
            currency: "USD".to_string(),
        });
        ctx.accounts.push(AccountSummary {
            name: "Euro savings".to_string(),
            kind: "SAVINGS".to_string(),
            balance: 300.0,
            currency: "EUR".to_string(),
        });
        ctx
    }

    #[test]
    fn test_account_lookup_is_case_insensitive() {
        let ctx = sample();
        assert!(ctx.account("checking").is_some());
        assert!(ctx.account("CASH").is_some());
        assert!(ctx.account("brokerage").is_none());
    }

    #[test]
    fn test_total_balance_groups_by_currency() {
        let totals = sample().total_balance_by_currency();
        assert_eq!(totals.len(), 2);
        assert!((totals["USD"] - 1250.5).abs() < f64::EPSILON);
        assert!((totals["EUR"] - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_transaction_json_shape() {
        let json = r#"{
            "date": "2024-03-02",
            "type": "EXPENSE",
            "amount": 12.5,
            "category": "Food"
        }"#;
        let tx: TransactionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(tx.kind, TransactionType::Expense);
        assert_eq!(tx.category.as_deref(), Some("Food"));
        assert!(tx.description.is_none());
    }
}
