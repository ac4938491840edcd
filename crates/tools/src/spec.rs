use crate::action::ActionKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Number,
    String,
    Boolean,
}

impl ParamType {
    fn matches(&self, value: &Value) -> bool {
        match self {
            ParamType::Number => value.is_number(),
            ParamType::String => value.is_string(),
            ParamType::Boolean => value.is_boolean(),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            ParamType::Number => "number",
            ParamType::String => "string",
            ParamType::Boolean => "boolean",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamConstraint {
    #[serde(rename = "type")]
    pub param_type: ParamType,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "enum")]
    pub allowed: Option<Vec<String>>,
}

/// Catalog entry for one invocable tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub kind: ActionKind,
    pub description: String,
    pub required_params: Vec<String>,
    pub param_constraints: BTreeMap<String, ParamConstraint>,
}

impl ToolSpec {
    pub fn new(kind: ActionKind, name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            description: description.to_string(),
            required_params: Vec::new(),
            param_constraints: BTreeMap::new(),
        }
    }

    pub fn required(mut self, name: &str, param_type: ParamType) -> Self {
        self.required_params.push(name.to_string());
        self.optional(name, param_type)
    }

    pub fn optional(mut self, name: &str, param_type: ParamType) -> Self {
        self.param_constraints.insert(
            name.to_string(),
            ParamConstraint {
                param_type,
                allowed: None,
            },
        );
        self
    }

    /// Restricts an already declared string parameter to a fixed set.
    pub fn one_of(mut self, name: &str, values: &[&str]) -> Self {
        if let Some(constraint) = self.param_constraints.get_mut(name) {
            constraint.allowed = Some(values.iter().map(|v| v.to_string()).collect());
        }
        self
    }

    /// Checks required presence, primitive types and enum membership.
    /// Undeclared parameters are ignored.
    pub fn validate_params(&self, params: &Map<String, Value>) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        for name in &self.required_params {
            match params.get(name) {
                None | Some(Value::Null) => {
                    errors.push(format!("Missing required parameter: {}", name));
                }
                Some(_) => {}
            }
        }

        for (name, constraint) in &self.param_constraints {
            let value = match params.get(name) {
                Some(Value::Null) | None => continue,
                Some(value) => value,
            };

            if !constraint.param_type.matches(value) {
                errors.push(format!(
                    "Parameter {} must be a {}",
                    name,
                    constraint.param_type.as_str()
                ));
                continue;
            }

            if let (Some(allowed), Some(text)) = (&constraint.allowed, value.as_str()) {
                if !allowed.iter().any(|a| a == text) {
                    errors.push(format!(
                        "Parameter {} must be one of [{}], got {}",
                        name,
                        allowed.join(", "),
                        text
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// JSON-schema shaped description, as handed to function-calling models.
    pub fn schema(&self) -> Value {
        let mut properties = Map::new();
        for (name, constraint) in &self.param_constraints {
            let mut prop = Map::new();
            prop.insert(
                "type".to_string(),
                Value::String(constraint.param_type.as_str().to_string()),
            );
            if let Some(allowed) = &constraint.allowed {
                prop.insert("enum".to_string(), serde_json::json!(allowed));
            }
            properties.insert(name.clone(), Value::Object(prop));
        }

        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": {
                    "type": "object",
                    "properties": properties,
                    "required": self.required_params,
                }
            }
        })
    }
}

pub const CURRENCIES: &[&str] = &[
    "USD", "VES", "EUR", "GBP", "JPY", "CAD", "AUD", "MXN", "BRL",
];
pub const PERIODS: &[&str] = &["today", "week", "month", "year"];

/// The built-in finance catalog.
pub fn builtin_specs() -> Vec<ToolSpec> {
    use ParamType::*;

    vec![
        ToolSpec::new(
            ActionKind::CreateTransaction,
            "create_transaction",
            "Record a new income or expense",
        )
        .required("amount", Number)
        .required("type", String)
        .one_of("type", &["EXPENSE", "INCOME"])
        .required("description", String)
        .optional("currency", String)
        .one_of("currency", CURRENCIES)
        .optional("category", String)
        .optional("accountName", String)
        .optional("date", String),
        ToolSpec::new(
            ActionKind::CreateBudget,
            "create_budget",
            "Create a monthly budget for a category",
        )
        .required("category", String)
        .required("amount", Number)
        .optional("monthYear", String),
        ToolSpec::new(ActionKind::CreateGoal, "create_goal", "Create a savings goal")
            .required("name", String)
            .required("target", Number)
            .optional("targetDate", String)
            .optional("accountName", String),
        ToolSpec::new(
            ActionKind::CreateAccount,
            "create_account",
            "Open a new account",
        )
        .required("name", String)
        .required("type", String)
        .one_of("type", &["BANK", "CARD", "CASH", "SAVINGS", "INVESTMENT"])
        .required("currency", String)
        .one_of("currency", CURRENCIES)
        .optional("initialBalance", Number),
        ToolSpec::new(
            ActionKind::CreateTransfer,
            "create_transfer",
            "Move money between two accounts",
        )
        .required("amount", Number)
        .required("fromAccountName", String)
        .required("toAccountName", String)
        .optional("description", String)
        .optional("date", String),
        ToolSpec::new(
            ActionKind::QueryBalance,
            "get_account_balance",
            "Current balance of one account or all accounts",
        )
        .optional("accountName", String),
        ToolSpec::new(
            ActionKind::QueryCategorySpending,
            "get_category_spending",
            "Spending in a category over a period",
        )
        .required("category", String)
        .optional("period", String)
        .one_of("period", PERIODS),
        ToolSpec::new(
            ActionKind::QueryFinancialData,
            "query_financial_data",
            "Filter, aggregate and rank transactions",
        )
        .optional("type", String)
        .one_of("type", &["expense", "income", "both"])
        .optional("period", String)
        .one_of("period", PERIODS)
        .optional("aggregation", String)
        .one_of("aggregation", &["sum", "max", "min", "avg", "count"])
        .optional("limit", Number)
        .optional("orderBy", String)
        .one_of("orderBy", &["amount", "date"])
        .optional("orderDirection", String)
        .one_of("orderDirection", &["asc", "desc"])
        .optional("groupBy", String)
        .one_of("groupBy", &["category"]),
        ToolSpec::new(
            ActionKind::AnalyzeSpending,
            "analyze_spending",
            "Break down spending by category",
        )
        .optional("period", String)
        .one_of("period", PERIODS),
        ToolSpec::new(
            ActionKind::CalculatePercentages,
            "calculate_percentages",
            "Share of total spending per category",
        )
        .optional("period", String)
        .one_of("period", PERIODS),
        ToolSpec::new(
            ActionKind::GetFinancialSummary,
            "get_financial_summary",
            "Income, expenses, balances and budgets at a glance",
        ),
        ToolSpec::new(
            ActionKind::ComparePeriods,
            "compare_periods",
            "Compare this month against the previous one",
        ),
        ToolSpec::new(
            ActionKind::AnalyzeByCategory,
            "analyze_by_category",
            "Totals and averages per category",
        )
        .optional("averageBy", String)
        .one_of("averageBy", &["month", "transaction"]),
        ToolSpec::new(
            ActionKind::GetSpendingTrends,
            "get_spending_trends",
            "Monthly income and expense totals",
        )
        .optional("months", Number),
    ]
}
