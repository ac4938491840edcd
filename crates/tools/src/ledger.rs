//! Reference action backend.
//!
//! Queries are answered from the read-only wallet snapshot; creations are
//! validated against it and recorded in an in-memory journal.

use crate::action::ActionKind;
use crate::call::*;
use crate::execution_context::ExecutionContext;
use crate::traits::{ActionHandler, ActionResult, ToolError};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tokio::sync::Mutex;
use wallet_agent_context::{TransactionRecord, TransactionType, WalletContext};

const DEFAULT_TREND_MONTHS: u32 = 6;
const MAX_TREND_MONTHS: u32 = 120;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    pub caller_id: String,
    pub kind: ActionKind,
    pub payload: Value,
    pub recorded_at: DateTime<Utc>,
}

pub struct LedgerActions {
    reference_date: Option<NaiveDate>,
    journal: Mutex<Vec<JournalEntry>>,
}

impl LedgerActions {
    pub fn new() -> Self {
        Self {
            reference_date: None,
            journal: Mutex::new(Vec::new()),
        }
    }

    /// Pins "today" for period calculations.
    pub fn with_reference_date(date: NaiveDate) -> Self {
        Self {
            reference_date: Some(date),
            journal: Mutex::new(Vec::new()),
        }
    }

    pub async fn journal(&self) -> Vec<JournalEntry> {
        self.journal.lock().await.clone()
    }

    fn today(&self) -> NaiveDate {
        self.reference_date.unwrap_or_else(|| Utc::now().date_naive())
    }

    fn period_range(&self, period: Option<Period>) -> (NaiveDate, NaiveDate) {
        let today = self.today();
        let from = match period {
            None => NaiveDate::MIN,
            Some(Period::Today) => today,
            Some(Period::Week) => today - Duration::days(6),
            Some(Period::Month) => month_start(today.year(), today.month()),
            Some(Period::Year) => month_start(today.year(), 1),
        };
        (from, today)
    }

    async fn record(&self, kind: ActionKind, ctx: &ExecutionContext, payload: Value) -> String {
        let entry = JournalEntry {
            id: uuid::Uuid::new_v4().to_string(),
            caller_id: ctx.caller_id.clone(),
            kind,
            payload,
            recorded_at: Utc::now(),
        };
        let id = entry.id.clone();
        self.journal.lock().await.push(entry);
        tracing::info!("Recorded {} [{}] for caller {}", kind, id, ctx.caller_id);
        id
    }

    async fn create_transaction(
        &self,
        tx: NewTransaction,
        context: &WalletContext,
        ctx: &ExecutionContext,
    ) -> Result<ActionResult, ToolError> {
        if tx.amount <= 0.0 {
            return Ok(ActionResult::failure(
                "Could not create transaction",
                "Amount must be positive",
            ));
        }
        if let Some(name) = &tx.account_name {
            if context.account(name).is_none() {
                return Ok(ActionResult::failure(
                    "Could not create transaction",
                    format!("Account not found: {}", name),
                ));
            }
        }

        let currency = tx
            .currency
            .map(|c| c.code().to_string())
            .unwrap_or_else(|| context.base_currency.clone());
        let payload = serde_json::to_value(&tx).map_err(|e| ToolError::Execution(e.to_string()))?;
        let id = self.record(ActionKind::CreateTransaction, ctx, payload).await;

        let label = match tx.kind {
            TransactionType::Expense => "Expense",
            TransactionType::Income => "Income",
        };
        Ok(ActionResult::success(
            format!("{} of {:.2} {} recorded: {}", label, tx.amount, currency, tx.description),
            Some(json!({ "id": id, "amount": tx.amount, "currency": currency })),
        ))
    }

    async fn create_budget(
        &self,
        budget: NewBudget,
        context: &WalletContext,
        ctx: &ExecutionContext,
    ) -> Result<ActionResult, ToolError> {
        if budget.amount <= 0.0 {
            return Ok(ActionResult::failure(
                "Could not create budget",
                "Amount must be positive",
            ));
        }
        let exists = context
            .budgets
            .iter()
            .any(|b| b.category.eq_ignore_ascii_case(&budget.category));
        if exists {
            return Ok(ActionResult::failure(
                "Could not create budget",
                format!("A budget for {} already exists", budget.category),
            ));
        }

        let month_year = budget
            .month_year
            .clone()
            .unwrap_or_else(|| self.today().format("%Y-%m").to_string());
        let payload =
            serde_json::to_value(&budget).map_err(|e| ToolError::Execution(e.to_string()))?;
        let id = self.record(ActionKind::CreateBudget, ctx, payload).await;

        Ok(ActionResult::success(
            format!(
                "Budget of {:.2} for {} created ({})",
                budget.amount, budget.category, month_year
            ),
            Some(json!({ "id": id, "category": budget.category, "monthYear": month_year })),
        ))
    }

    async fn create_goal(
        &self,
        goal: NewGoal,
        ctx: &ExecutionContext,
    ) -> Result<ActionResult, ToolError> {
        if goal.target <= 0.0 {
            return Ok(ActionResult::failure(
                "Could not create goal",
                "Target must be positive",
            ));
        }
        let payload = serde_json::to_value(&goal).map_err(|e| ToolError::Execution(e.to_string()))?;
        let id = self.record(ActionKind::CreateGoal, ctx, payload).await;

        Ok(ActionResult::success(
            format!("Goal \"{}\" created with target {:.2}", goal.name, goal.target),
            Some(json!({ "id": id, "name": goal.name, "target": goal.target })),
        ))
    }

    async fn create_account(
        &self,
        account: NewAccount,
        context: &WalletContext,
        ctx: &ExecutionContext,
    ) -> Result<ActionResult, ToolError> {
        if context.account(&account.name).is_some() {
            return Ok(ActionResult::failure(
                "Could not create account",
                format!("Account already exists: {}", account.name),
            ));
        }
        let payload =
            serde_json::to_value(&account).map_err(|e| ToolError::Execution(e.to_string()))?;
        let id = self.record(ActionKind::CreateAccount, ctx, payload).await;

        Ok(ActionResult::success(
            format!(
                "Account \"{}\" opened in {}",
                account.name,
                account.currency.code()
            ),
            Some(json!({
                "id": id,
                "name": account.name,
                "balance": account.initial_balance.unwrap_or(0.0),
            })),
        ))
    }

    async fn create_transfer(
        &self,
        transfer: NewTransfer,
        context: &WalletContext,
        ctx: &ExecutionContext,
    ) -> Result<ActionResult, ToolError> {
        const FAILED: &str = "Could not create transfer";

        if transfer.amount <= 0.0 {
            return Ok(ActionResult::failure(FAILED, "Amount must be positive"));
        }
        if transfer
            .from_account_name
            .eq_ignore_ascii_case(&transfer.to_account_name)
        {
            return Ok(ActionResult::failure(
                FAILED,
                "Source and destination accounts must differ",
            ));
        }
        let from = match context.account(&transfer.from_account_name) {
            Some(account) => account,
            None => {
                return Ok(ActionResult::failure(
                    FAILED,
                    format!("Account not found: {}", transfer.from_account_name),
                ))
            }
        };
        if context.account(&transfer.to_account_name).is_none() {
            return Ok(ActionResult::failure(
                FAILED,
                format!("Account not found: {}", transfer.to_account_name),
            ));
        }
        if from.balance < transfer.amount {
            return Ok(ActionResult::failure(
                FAILED,
                format!(
                    "Insufficient funds in {}: {:.2} available",
                    from.name, from.balance
                ),
            ));
        }

        let payload =
            serde_json::to_value(&transfer).map_err(|e| ToolError::Execution(e.to_string()))?;
        let id = self.record(ActionKind::CreateTransfer, ctx, payload).await;

        Ok(ActionResult::success(
            format!(
                "Transferred {:.2} {} from {} to {}",
                transfer.amount, from.currency, transfer.from_account_name, transfer.to_account_name
            ),
            Some(json!({ "id": id, "amount": transfer.amount })),
        ))
    }

    fn account_balance(&self, query: BalanceQuery, context: &WalletContext) -> ActionResult {
        match query.account_name {
            Some(name) => match context.account(&name) {
                Some(account) => ActionResult::success(
                    format!(
                        "{} balance: {:.2} {}",
                        account.name, account.balance, account.currency
                    ),
                    Some(json!({
                        "name": account.name,
                        "balance": account.balance,
                        "currency": account.currency,
                    })),
                ),
                None => ActionResult::failure(
                    "Could not read balance",
                    format!("Account not found: {}", name),
                ),
            },
            None => {
                let totals = context.total_balance_by_currency();
                let accounts: Vec<Value> = context
                    .accounts
                    .iter()
                    .map(|a| json!({ "name": a.name, "balance": a.balance, "currency": a.currency }))
                    .collect();
                ActionResult::success(
                    format!("Balances for {} account(s)", accounts.len()),
                    Some(json!({ "totals": totals, "accounts": accounts })),
                )
            }
        }
    }

    fn category_spending(
        &self,
        query: CategorySpendingQuery,
        context: &WalletContext,
    ) -> ActionResult {
        let (from, to) = self.period_range(query.period);
        let matching: Vec<&TransactionRecord> = context
            .transactions_between(from, to)
            .filter(|tx| tx.kind == TransactionType::Expense)
            .filter(|tx| {
                tx.category
                    .as_deref()
                    .map(|c| c.eq_ignore_ascii_case(&query.category))
                    .unwrap_or(false)
            })
            .collect();
        let total: f64 = matching.iter().map(|tx| tx.amount).sum();

        ActionResult::success(
            format!("Spent {:.2} on {}", total, query.category),
            Some(json!({
                "category": query.category,
                "total": total,
                "transactions": matching.len(),
            })),
        )
    }

    fn financial_data(&self, query: FinancialDataQuery, context: &WalletContext) -> ActionResult {
        let (from, to) = self.period_range(query.period);
        let mut rows: Vec<&TransactionRecord> = context
            .transactions_between(from, to)
            .filter(|tx| match query.flow.unwrap_or(FlowFilter::Both) {
                FlowFilter::Expense => tx.kind == TransactionType::Expense,
                FlowFilter::Income => tx.kind == TransactionType::Income,
                FlowFilter::Both => true,
            })
            .collect();

        if query.group_by.as_deref() == Some("category") {
            let groups = sum_by_category(rows.iter().copied());
            let mut ranked: Vec<(String, f64)> = groups.into_iter().collect();
            sort_pairs(&mut ranked, query.order_direction);
            if let Some(limit) = query.limit {
                ranked.truncate(limit);
            }
            let data: Vec<Value> = ranked
                .iter()
                .map(|(category, total)| json!({ "category": category, "total": total }))
                .collect();
            return ActionResult::success(
                format!("{} categor(ies) found", data.len()),
                Some(json!({ "groups": data })),
            );
        }

        // A ranked list wins over a single aggregate when both are asked for.
        if let (Some(aggregation), None) = (query.aggregation, query.limit) {
            let amounts: Vec<f64> = rows.iter().map(|tx| tx.amount).collect();
            let value = aggregate(aggregation, &amounts);
            return ActionResult::success(
                format!("{:?} over {} transaction(s)", aggregation, amounts.len()),
                Some(json!({ "aggregation": aggregation, "value": value, "count": amounts.len() })),
            );
        }

        let descending = query.order_direction != Some(OrderDirection::Asc);
        match query.order_by {
            Some(OrderBy::Amount) => rows.sort_by(|a, b| a.amount.total_cmp(&b.amount)),
            Some(OrderBy::Date) => rows.sort_by_key(|tx| tx.date),
            None => {}
        }
        if query.order_by.is_some() && descending {
            rows.reverse();
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        ActionResult::success(
            format!("{} transaction(s) found", rows.len()),
            Some(json!({ "transactions": rows })),
        )
    }

    fn analyze_spending(&self, query: PeriodQuery, context: &WalletContext) -> ActionResult {
        let (from, to) = self.period_range(query.period);
        let expenses = context
            .transactions_between(from, to)
            .filter(|tx| tx.kind == TransactionType::Expense);
        let mut ranked: Vec<(String, f64)> = sum_by_category(expenses).into_iter().collect();
        sort_pairs(&mut ranked, Some(OrderDirection::Desc));
        let total: f64 = ranked.iter().map(|(_, amount)| amount).sum();

        let top = ranked
            .first()
            .map(|(category, _)| category.clone())
            .unwrap_or_default();
        ActionResult::success(
            format!("Total spending {:.2} across {} categories", total, ranked.len()),
            Some(json!({
                "total": total,
                "topCategory": top,
                "byCategory": ranked
                    .iter()
                    .map(|(category, amount)| json!({ "category": category, "total": amount }))
                    .collect::<Vec<_>>(),
            })),
        )
    }

    fn percentages(&self, query: PeriodQuery, context: &WalletContext) -> ActionResult {
        let (from, to) = self.period_range(query.period);
        let expenses = context
            .transactions_between(from, to)
            .filter(|tx| tx.kind == TransactionType::Expense);
        let mut ranked: Vec<(String, f64)> = sum_by_category(expenses).into_iter().collect();
        sort_pairs(&mut ranked, Some(OrderDirection::Desc));
        let total: f64 = ranked.iter().map(|(_, amount)| amount).sum();

        let shares: Vec<Value> = ranked
            .iter()
            .map(|(category, amount)| {
                let share = if total > 0.0 { amount / total * 100.0 } else { 0.0 };
                json!({ "category": category, "total": amount, "percentage": share })
            })
            .collect();
        ActionResult::success(
            format!("Spending shares for {} categories", shares.len()),
            Some(json!({ "total": total, "shares": shares })),
        )
    }

    fn summary(&self, context: &WalletContext) -> ActionResult {
        let (from, to) = self.period_range(Some(Period::Month));
        let (income, expenses) = flows(context.transactions_between(from, to));

        ActionResult::success(
            format!(
                "This month: income {:.2}, expenses {:.2}, net {:.2}",
                income,
                expenses,
                income - expenses
            ),
            Some(json!({
                "income": income,
                "expenses": expenses,
                "net": income - expenses,
                "balances": context.total_balance_by_currency(),
                "budgets": context
                    .budgets
                    .iter()
                    .map(|b| json!({ "category": b.category, "remaining": b.remaining() }))
                    .collect::<Vec<_>>(),
                "goals": context.goals.len(),
            })),
        )
    }

    fn compare_periods(&self, context: &WalletContext) -> ActionResult {
        let today = self.today();
        let current_start = month_start(today.year(), today.month());
        let (prev_year, prev_month) = previous_month(today.year(), today.month());
        let previous_start = month_start(prev_year, prev_month);
        let previous_end = current_start.pred_opt().unwrap_or(current_start);

        let (current_income, current_expenses) =
            flows(context.transactions_between(current_start, today));
        let (previous_income, previous_expenses) =
            flows(context.transactions_between(previous_start, previous_end));

        let change = if previous_expenses > 0.0 {
            Some((current_expenses - previous_expenses) / previous_expenses * 100.0)
        } else {
            None
        };

        ActionResult::success(
            format!(
                "Expenses {:.2} this month vs {:.2} last month",
                current_expenses, previous_expenses
            ),
            Some(json!({
                "current": { "income": current_income, "expenses": current_expenses },
                "previous": { "income": previous_income, "expenses": previous_expenses },
                "expenseChangePercent": change,
            })),
        )
    }

    fn by_category(&self, query: CategoryAnalysisQuery, context: &WalletContext) -> ActionResult {
        let per_month = query.average_by.as_deref() == Some("month");
        let mut stats: BTreeMap<String, (f64, usize, std::collections::BTreeSet<(i32, u32)>)> =
            BTreeMap::new();

        for tx in context
            .transactions
            .iter()
            .filter(|tx| tx.kind == TransactionType::Expense)
        {
            let category = tx.category.clone().unwrap_or_else(|| "Uncategorized".to_string());
            let entry = stats.entry(category).or_default();
            entry.0 += tx.amount;
            entry.1 += 1;
            entry.2.insert((tx.date.year(), tx.date.month()));
        }

        let rows: Vec<Value> = stats
            .iter()
            .map(|(category, (total, count, months))| {
                let divisor = if per_month { months.len() } else { *count };
                let average = if divisor > 0 { total / divisor as f64 } else { 0.0 };
                json!({ "category": category, "total": total, "count": count, "average": average })
            })
            .collect();

        ActionResult::success(
            format!("Analyzed {} categories", rows.len()),
            Some(json!({
                "averageBy": if per_month { "month" } else { "transaction" },
                "categories": rows,
            })),
        )
    }

    fn trends(&self, query: TrendQuery, context: &WalletContext) -> ActionResult {
        let months = query
            .months
            .unwrap_or(DEFAULT_TREND_MONTHS)
            .clamp(1, MAX_TREND_MONTHS);
        let today = self.today();
        let (mut year, mut month) = (today.year(), today.month());
        let mut series = Vec::new();

        for _ in 0..months {
            let start = month_start(year, month);
            let end = month_end(year, month);
            let (income, expenses) = flows(context.transactions_between(start, end));
            series.push(json!({
                "month": format!("{:04}-{:02}", year, month),
                "income": income,
                "expenses": expenses,
            }));
            (year, month) = previous_month(year, month);
        }
        series.reverse();

        ActionResult::success(
            format!("Spending trend over {} month(s)", months),
            Some(json!({ "months": series })),
        )
    }
}

impl Default for LedgerActions {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActionHandler for LedgerActions {
    async fn handle(
        &self,
        call: ToolCall,
        context: &WalletContext,
        ctx: &ExecutionContext,
    ) -> Result<ActionResult, ToolError> {
        tracing::debug!("Ledger handling {} for {}", call.kind(), ctx.caller_id);

        match call {
            ToolCall::CreateTransaction(tx) => self.create_transaction(tx, context, ctx).await,
            ToolCall::CreateBudget(budget) => self.create_budget(budget, context, ctx).await,
            ToolCall::CreateGoal(goal) => self.create_goal(goal, ctx).await,
            ToolCall::CreateAccount(account) => self.create_account(account, context, ctx).await,
            ToolCall::CreateTransfer(transfer) => {
                self.create_transfer(transfer, context, ctx).await
            }
            ToolCall::QueryBalance(query) => Ok(self.account_balance(query, context)),
            ToolCall::QueryCategorySpending(query) => Ok(self.category_spending(query, context)),
            ToolCall::QueryFinancialData(query) => Ok(self.financial_data(query, context)),
            ToolCall::AnalyzeSpending(query) => Ok(self.analyze_spending(query, context)),
            ToolCall::CalculatePercentages(query) => Ok(self.percentages(query, context)),
            ToolCall::GetFinancialSummary => Ok(self.summary(context)),
            ToolCall::ComparePeriods => Ok(self.compare_periods(context)),
            ToolCall::AnalyzeByCategory(query) => Ok(self.by_category(query, context)),
            ToolCall::GetSpendingTrends(query) => Ok(self.trends(query, context)),
        }
    }
}

fn month_start(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

fn month_end(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let next = month_start(next_year, next_month);
    next.pred_opt().unwrap_or(next)
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

fn sum_by_category<'a>(txs: impl Iterator<Item = &'a TransactionRecord>) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for tx in txs {
        let category = tx.category.clone().unwrap_or_else(|| "Uncategorized".to_string());
        *totals.entry(category).or_insert(0.0) += tx.amount;
    }
    totals
}

fn sort_pairs(pairs: &mut [(String, f64)], direction: Option<OrderDirection>) {
    pairs.sort_by(|a, b| a.1.total_cmp(&b.1));
    if direction != Some(OrderDirection::Asc) {
        pairs.reverse();
    }
}

fn flows<'a>(txs: impl Iterator<Item = &'a TransactionRecord>) -> (f64, f64) {
    txs.fold((0.0, 0.0), |(income, expenses), tx| match tx.kind {
        TransactionType::Income => (income + tx.amount, expenses),
        TransactionType::Expense => (income, expenses + tx.amount),
    })
}

fn aggregate(aggregation: Aggregation, amounts: &[f64]) -> Option<f64> {
    if amounts.is_empty() {
        return match aggregation {
            Aggregation::Count => Some(0.0),
            Aggregation::Sum => Some(0.0),
            _ => None,
        };
    }
    let value = match aggregation {
        Aggregation::Sum => amounts.iter().sum(),
        Aggregation::Max => amounts.iter().copied().fold(f64::MIN, f64::max),
        Aggregation::Min => amounts.iter().copied().fold(f64::MAX, f64::min),
        Aggregation::Avg => amounts.iter().sum::<f64>() / amounts.len() as f64,
        Aggregation::Count => amounts.len() as f64,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wallet_agent_context::AccountSummary;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tx(day: NaiveDate, kind: TransactionType, amount: f64, category: &str) -> TransactionRecord {
        TransactionRecord {
            date: day,
            kind,
            amount,
            currency: None,
            category: Some(category.to_string()),
            description: None,
            account: None,
        }
    }

    fn wallet() -> WalletContext {
        let mut ctx = WalletContext::empty("alice");
        ctx.accounts.push(AccountSummary {
            name: "Checking".to_string(),
            kind: "BANK".to_string(),
            balance: 500.0,
            currency: "USD".to_string(),
        });
        ctx.accounts.push(AccountSummary {
            name: "Savings".to_string(),
            kind: "SAVINGS".to_string(),
            balance: 1000.0,
            currency: "USD".to_string(),
        });
        ctx.transactions = vec![
            tx(date(2024, 5, 2), TransactionType::Expense, 40.0, "Food"),
            tx(date(2024, 5, 10), TransactionType::Expense, 120.0, "Rent"),
            tx(date(2024, 5, 15), TransactionType::Expense, 60.0, "Food"),
            tx(date(2024, 5, 1), TransactionType::Income, 2000.0, "Salary"),
            tx(date(2024, 4, 12), TransactionType::Expense, 100.0, "Food"),
        ];
        ctx
    }

    fn ledger() -> LedgerActions {
        LedgerActions::with_reference_date(date(2024, 5, 15))
    }

    fn ctx() -> ExecutionContext {
        ExecutionContext::new("alice".to_string(), 1000)
    }

    #[tokio::test]
    async fn test_category_spending_for_month() {
        let result = ledger()
            .handle(
                ToolCall::QueryCategorySpending(CategorySpendingQuery {
                    category: "food".to_string(),
                    period: Some(Period::Month),
                }),
                &wallet(),
                &ctx(),
            )
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.data.unwrap()["total"], 100.0);
    }

    #[tokio::test]
    async fn test_top_expenses_ordered_desc() {
        let query = FinancialDataQuery {
            flow: Some(FlowFilter::Expense),
            limit: Some(2),
            order_by: Some(OrderBy::Amount),
            order_direction: Some(OrderDirection::Desc),
            ..Default::default()
        };
        let result = ledger()
            .handle(ToolCall::QueryFinancialData(query), &wallet(), &ctx())
            .await
            .unwrap();

        let data = result.data.unwrap();
        let rows = data["transactions"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["amount"], 120.0);
        assert_eq!(rows[1]["amount"], 100.0);
    }

    #[tokio::test]
    async fn test_max_aggregation_for_month() {
        let query = FinancialDataQuery {
            flow: Some(FlowFilter::Expense),
            period: Some(Period::Month),
            aggregation: Some(Aggregation::Max),
            ..Default::default()
        };
        let result = ledger()
            .handle(ToolCall::QueryFinancialData(query), &wallet(), &ctx())
            .await
            .unwrap();
        assert_eq!(result.data.unwrap()["value"], 120.0);
    }

    #[tokio::test]
    async fn test_compare_periods() {
        let result = ledger()
            .handle(ToolCall::ComparePeriods, &wallet(), &ctx())
            .await
            .unwrap();
        let data = result.data.unwrap();
        assert_eq!(data["current"]["expenses"], 220.0);
        assert_eq!(data["previous"]["expenses"], 100.0);
    }

    #[tokio::test]
    async fn test_transfer_is_journaled() {
        let ledger = ledger();
        let result = ledger
            .handle(
                ToolCall::CreateTransfer(NewTransfer {
                    amount: 200.0,
                    from_account_name: "checking".to_string(),
                    to_account_name: "Savings".to_string(),
                    description: None,
                    date: None,
                }),
                &wallet(),
                &ctx(),
            )
            .await
            .unwrap();

        assert!(result.success, "{:?}", result);
        let journal = ledger.journal().await;
        assert_eq!(journal.len(), 1);
        assert_eq!(journal[0].kind, ActionKind::CreateTransfer);
        assert_eq!(journal[0].caller_id, "alice");
    }

    #[tokio::test]
    async fn test_transfer_rejections() {
        let ledger = ledger();
        let overdraw = ledger
            .handle(
                ToolCall::CreateTransfer(NewTransfer {
                    amount: 900.0,
                    from_account_name: "Checking".to_string(),
                    to_account_name: "Savings".to_string(),
                    description: None,
                    date: None,
                }),
                &wallet(),
                &ctx(),
            )
            .await
            .unwrap();
        assert!(!overdraw.success);
        assert!(overdraw.failure_reason().contains("Insufficient funds"));

        let unknown = ledger
            .handle(
                ToolCall::CreateTransfer(NewTransfer {
                    amount: 10.0,
                    from_account_name: "Checking".to_string(),
                    to_account_name: "Brokerage".to_string(),
                    description: None,
                    date: None,
                }),
                &wallet(),
                &ctx(),
            )
            .await
            .unwrap();
        assert!(unknown.failure_reason().contains("Brokerage"));
        assert!(ledger.journal().await.is_empty());
    }

    #[tokio::test]
    async fn test_trends_cover_requested_months() {
        let result = ledger()
            .handle(
                ToolCall::GetSpendingTrends(TrendQuery { months: Some(2) }),
                &wallet(),
                &ctx(),
            )
            .await
            .unwrap();
        let data = result.data.unwrap();
        let months = data["months"].as_array().unwrap();
        assert_eq!(months.len(), 2);
        assert_eq!(months[0]["month"], "2024-04");
        assert_eq!(months[1]["expenses"], 220.0);
    }

    #[tokio::test]
    async fn test_trend_window_is_capped() {
        let result = ledger()
            .handle(
                ToolCall::GetSpendingTrends(TrendQuery {
                    months: Some(4_000_000_000),
                }),
                &wallet(),
                &ctx(),
            )
            .await
            .unwrap();
        let data = result.data.unwrap();
        assert_eq!(data["months"].as_array().unwrap().len(), 120);
    }

    #[test]
    fn test_month_helpers() {
        assert_eq!(month_end(2024, 2), date(2024, 2, 29));
        assert_eq!(month_end(2023, 12), date(2023, 12, 31));
        assert_eq!(previous_month(2024, 1), (2023, 12));
    }
}
