use crate::action::ActionKind;
use crate::traits::ToolError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use wallet_agent_context::TransactionType;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Ves,
    Eur,
    Gbp,
    Jpy,
    Cad,
    Aud,
    Mxn,
    Brl,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Ves => "VES",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Jpy => "JPY",
            Currency::Cad => "CAD",
            Currency::Aud => "AUD",
            Currency::Mxn => "MXN",
            Currency::Brl => "BRL",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountKind {
    Bank,
    Card,
    Cash,
    Savings,
    Investment,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Today,
    Week,
    Month,
    Year,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlowFilter {
    Expense,
    Income,
    Both,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Sum,
    Max,
    Min,
    Avg,
    Count,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderBy {
    Amount,
    Date,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub description: String,
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub account_name: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewBudget {
    pub category: String,
    pub amount: f64,
    #[serde(default)]
    pub month_year: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub name: String,
    pub target: f64,
    #[serde(default)]
    pub target_date: Option<String>,
    #[serde(default)]
    pub account_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AccountKind,
    pub currency: Currency,
    #[serde(default)]
    pub initial_balance: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewTransfer {
    pub amount: f64,
    pub from_account_name: String,
    pub to_account_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BalanceQuery {
    #[serde(default)]
    pub account_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategorySpendingQuery {
    pub category: String,
    #[serde(default)]
    pub period: Option<Period>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinancialDataQuery {
    #[serde(default, rename = "type")]
    pub flow: Option<FlowFilter>,
    #[serde(default)]
    pub period: Option<Period>,
    #[serde(default)]
    pub aggregation: Option<Aggregation>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub order_by: Option<OrderBy>,
    #[serde(default)]
    pub order_direction: Option<OrderDirection>,
    #[serde(default)]
    pub group_by: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PeriodQuery {
    #[serde(default)]
    pub period: Option<Period>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAnalysisQuery {
    #[serde(default)]
    pub average_by: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendQuery {
    #[serde(default)]
    pub months: Option<u32>,
}

/// A schema-checked tool invocation, one variant per action.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    CreateTransaction(NewTransaction),
    CreateBudget(NewBudget),
    CreateGoal(NewGoal),
    CreateAccount(NewAccount),
    CreateTransfer(NewTransfer),
    QueryBalance(BalanceQuery),
    QueryCategorySpending(CategorySpendingQuery),
    QueryFinancialData(FinancialDataQuery),
    AnalyzeSpending(PeriodQuery),
    CalculatePercentages(PeriodQuery),
    GetFinancialSummary,
    ComparePeriods,
    AnalyzeByCategory(CategoryAnalysisQuery),
    GetSpendingTrends(TrendQuery),
}

impl ToolCall {
    pub fn decode(kind: ActionKind, params: &Map<String, Value>) -> Result<Self, ToolError> {
        let call = match kind {
            ActionKind::CreateTransaction => ToolCall::CreateTransaction(parse(params)?),
            ActionKind::CreateBudget => ToolCall::CreateBudget(parse(params)?),
            ActionKind::CreateGoal => ToolCall::CreateGoal(parse(params)?),
            ActionKind::CreateAccount => ToolCall::CreateAccount(parse(params)?),
            ActionKind::CreateTransfer => ToolCall::CreateTransfer(parse(params)?),
            ActionKind::QueryBalance => ToolCall::QueryBalance(parse(params)?),
            ActionKind::QueryCategorySpending => ToolCall::QueryCategorySpending(parse(params)?),
            ActionKind::QueryFinancialData => ToolCall::QueryFinancialData(parse(params)?),
            ActionKind::AnalyzeSpending => ToolCall::AnalyzeSpending(parse(params)?),
            ActionKind::CalculatePercentages => ToolCall::CalculatePercentages(parse(params)?),
            ActionKind::GetFinancialSummary => ToolCall::GetFinancialSummary,
            ActionKind::ComparePeriods => ToolCall::ComparePeriods,
            ActionKind::AnalyzeByCategory => ToolCall::AnalyzeByCategory(parse(params)?),
            ActionKind::GetSpendingTrends => ToolCall::GetSpendingTrends(parse(params)?),
            ActionKind::Unknown => {
                return Err(ToolError::Validation("Unknown action".to_string()));
            }
        };
        Ok(call)
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            ToolCall::CreateTransaction(_) => ActionKind::CreateTransaction,
            ToolCall::CreateBudget(_) => ActionKind::CreateBudget,
            ToolCall::CreateGoal(_) => ActionKind::CreateGoal,
            ToolCall::CreateAccount(_) => ActionKind::CreateAccount,
            ToolCall::CreateTransfer(_) => ActionKind::CreateTransfer,
            ToolCall::QueryBalance(_) => ActionKind::QueryBalance,
            ToolCall::QueryCategorySpending(_) => ActionKind::QueryCategorySpending,
            ToolCall::QueryFinancialData(_) => ActionKind::QueryFinancialData,
            ToolCall::AnalyzeSpending(_) => ActionKind::AnalyzeSpending,
            ToolCall::CalculatePercentages(_) => ActionKind::CalculatePercentages,
            ToolCall::GetFinancialSummary => ActionKind::GetFinancialSummary,
            ToolCall::ComparePeriods => ActionKind::ComparePeriods,
            ToolCall::AnalyzeByCategory(_) => ActionKind::AnalyzeByCategory,
            ToolCall::GetSpendingTrends(_) => ActionKind::GetSpendingTrends,
        }
    }
}

fn parse<T: DeserializeOwned>(params: &Map<String, Value>) -> Result<T, ToolError> {
    // Nulls mean "absent"; serde would otherwise reject them for non-Option fields.
    let cleaned: Map<String, Value> = params
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    serde_json::from_value(Value::Object(cleaned))
        .map_err(|e| ToolError::Validation(format!("Invalid parameters: {}", e)))
}
