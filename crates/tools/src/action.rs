use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of actions a plan task can perform.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    CreateTransaction,
    CreateBudget,
    CreateGoal,
    CreateAccount,
    CreateTransfer,
    QueryBalance,
    QueryCategorySpending,
    QueryFinancialData,
    AnalyzeSpending,
    CalculatePercentages,
    GetFinancialSummary,
    ComparePeriods,
    AnalyzeByCategory,
    GetSpendingTrends,
    /// Tool name with no known action; such tasks never pass validation.
    Unknown,
}

const TOOL_NAMES: &[(ActionKind, &str)] = &[
    (ActionKind::CreateTransaction, "create_transaction"),
    (ActionKind::CreateBudget, "create_budget"),
    (ActionKind::CreateGoal, "create_goal"),
    (ActionKind::CreateAccount, "create_account"),
    (ActionKind::CreateTransfer, "create_transfer"),
    (ActionKind::QueryBalance, "get_account_balance"),
    (ActionKind::QueryCategorySpending, "get_category_spending"),
    (ActionKind::QueryFinancialData, "query_financial_data"),
    (ActionKind::AnalyzeSpending, "analyze_spending"),
    (ActionKind::CalculatePercentages, "calculate_percentages"),
    (ActionKind::GetFinancialSummary, "get_financial_summary"),
    (ActionKind::ComparePeriods, "compare_periods"),
    (ActionKind::AnalyzeByCategory, "analyze_by_category"),
    (ActionKind::GetSpendingTrends, "get_spending_trends"),
];

impl ActionKind {
    pub fn from_tool_name(name: &str) -> Self {
        TOOL_NAMES
            .iter()
            .find(|(_, tool)| *tool == name)
            .map(|(kind, _)| *kind)
            .unwrap_or(ActionKind::Unknown)
    }

    pub fn tool_name(&self) -> Option<&'static str> {
        TOOL_NAMES
            .iter()
            .find(|(kind, _)| kind == self)
            .map(|(_, tool)| *tool)
    }

    /// Creating or moving money. A failed mutating task halts later waves.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            ActionKind::CreateTransaction
                | ActionKind::CreateBudget
                | ActionKind::CreateGoal
                | ActionKind::CreateAccount
                | ActionKind::CreateTransfer
        )
    }

    pub fn all() -> impl Iterator<Item = ActionKind> {
        TOOL_NAMES.iter().map(|(kind, _)| *kind)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActionKind::CreateTransaction => "CREATE_TRANSACTION",
            ActionKind::CreateBudget => "CREATE_BUDGET",
            ActionKind::CreateGoal => "CREATE_GOAL",
            ActionKind::CreateAccount => "CREATE_ACCOUNT",
            ActionKind::CreateTransfer => "CREATE_TRANSFER",
            ActionKind::QueryBalance => "QUERY_BALANCE",
            ActionKind::QueryCategorySpending => "QUERY_CATEGORY_SPENDING",
            ActionKind::QueryFinancialData => "QUERY_FINANCIAL_DATA",
            ActionKind::AnalyzeSpending => "ANALYZE_SPENDING",
            ActionKind::CalculatePercentages => "CALCULATE_PERCENTAGES",
            ActionKind::GetFinancialSummary => "GET_FINANCIAL_SUMMARY",
            ActionKind::ComparePeriods => "COMPARE_PERIODS",
            ActionKind::AnalyzeByCategory => "ANALYZE_BY_CATEGORY",
            ActionKind::GetSpendingTrends => "GET_SPENDING_TRENDS",
            ActionKind::Unknown => "UNKNOWN",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_name_mapping_is_bijective() {
        for kind in ActionKind::all() {
            let name = kind.tool_name().unwrap();
            assert_eq!(ActionKind::from_tool_name(name), kind);
        }
        assert_eq!(ActionKind::from_tool_name("does_not_exist"), ActionKind::Unknown);
        assert_eq!(ActionKind::Unknown.tool_name(), None);
    }

    #[test]
    fn test_only_create_actions_mutate() {
        assert!(ActionKind::CreateTransfer.is_mutating());
        assert!(ActionKind::CreateAccount.is_mutating());
        assert!(!ActionKind::AnalyzeSpending.is_mutating());
        assert!(!ActionKind::QueryBalance.is_mutating());
        assert!(!ActionKind::Unknown.is_mutating());
    }

    #[test]
    fn test_display_matches_serde_name() {
        let json = serde_json::to_string(&ActionKind::CreateTransfer).unwrap();
        assert_eq!(json, format!("\"{}\"", ActionKind::CreateTransfer));
        let parsed: ActionKind = serde_json::from_str("\"QUERY_BALANCE\"").unwrap();
        assert_eq!(parsed, ActionKind::QueryBalance);
    }
}
