//! Regex heuristics that pull tool parameters out of the user's request.

use regex::Regex;
use serde_json::{json, Map, Value};
use wallet_agent_context::WalletContext;
use wallet_agent_tools::spec::CURRENCIES;

pub struct ParamExtractor {
    number: Regex,
    thousands: Regex,
    currency_code: Regex,
    dollars: Regex,
    euros: Regex,
    bolivares: Regex,
    top_n: Regex,
    transfer_from: Regex,
    transfer_to: Regex,
    category_after: Regex,
    category_before: Regex,
    purpose: Regex,
    goal_name: Regex,
    account_name: Regex,
    income_words: Regex,
}

impl ParamExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            number: Regex::new(r"\d[\d,]*(?:\.\d+)?")?,
            thousands: Regex::new(r"^\d{1,3}(?:,\d{3})+$")?,
            currency_code: Regex::new(r"(?i)\b(usd|ves|eur|gbp|jpy|cad|aud|mxn|brl)\b")?,
            dollars: Regex::new(r"(?i)d[oó]lar|dollar|\$")?,
            euros: Regex::new(r"(?i)euro|€")?,
            bolivares: Regex::new(r"(?i)bol[ií]var|\bbs\b")?,
            top_n: Regex::new(r"(?i)(?:top|primeros?|mayores?|ranking)\s*(\d+)")?,
            transfer_from: Regex::new(
                r"(?i)\b(?:from|desde|de)\s+(?:my\s+|mi\s+|la\s+|el\s+)?(?:account\s+|cuenta\s+)?([\p{L}\d]+)",
            )?,
            transfer_to: Regex::new(
                r"(?i)\b(?:to|into|hacia|a)\s+(?:my\s+|mi\s+|la\s+|el\s+)?(?:account\s+|cuenta\s+)?([\p{L}\d]+)",
            )?,
            category_after: Regex::new(
                r"(?i)\b(?:categor(?:y|[ií]a)|on|en|for|para)\s+(?:of\s+|de\s+|the\s+|la\s+|el\s+)?(\p{L}+)",
            )?,
            category_before: Regex::new(r"(?i)(\p{L}+)\s+(?:category|categor[ií]a)")?,
            purpose: Regex::new(r"(?i)\b(?:for|para|por|on|en)\s+(.+?)\s*[.!?]*$")?,
            goal_name: Regex::new(
                r"(?i)\b(?:called|named|llamad[ao]|for|para)\s+(?:a\s+|an\s+|the\s+|un\s+|una\s+)?([\p{L}][\p{L}\s]*?)\s*(?:$|[.!?,]|\d|\b(?:of|de|with|con|by)\b)",
            )?,
            account_name: Regex::new(
                r#"(?i)\b(?:called|named|llamad[ao]|nombre)\s+"?([\p{L}\d][\p{L}\d ]*?)"?\s*(?:$|[.!?,]|\b(?:in|en|with|con)\b)"#,
            )?,
            income_words: Regex::new(
                r"(?i)ingreso|income|salary|salario|sueldo|cobr|earn|received|recib",
            )?,
        })
    }

    /// Parameters for `tool_name`; unknown tools get none.
    pub fn extract(&self, tool_name: &str, request: &str, context: &WalletContext) -> Map<String, Value> {
        match tool_name {
            "query_financial_data" => self.financial_query(request),
            "get_category_spending" => self.category_spending(request),
            "analyze_spending" | "calculate_percentages" => {
                let mut params = Map::new();
                if let Some(period) = period_of(request) {
                    params.insert("period".to_string(), json!(period));
                }
                params
            }
            "create_transaction" => self.transaction(request, context),
            "create_transfer" => self.transfer(request),
            "create_budget" => self.budget(request),
            "create_goal" => self.goal(request),
            "create_account" => self.account(request, context),
            _ => Map::new(),
        }
    }

    fn financial_query(&self, request: &str) -> Map<String, Value> {
        let text = request.to_lowercase();
        let mut params = Map::new();

        let flow = if has(&text, &["gasto", "expense"]) {
            "expense"
        } else if has(&text, &["ingreso", "income"]) {
            "income"
        } else {
            "both"
        };
        params.insert("type".to_string(), json!(flow));

        if let Some(period) = period_of(&text) {
            params.insert("period".to_string(), json!(period));
        }

        if has(&text, &["mayor", "máximo", "max", "highest", "top", "biggest", "largest"]) {
            params.insert("aggregation".to_string(), json!("max"));
        }

        if let Some(limit) = self
            .top_n
            .captures(&text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u64>().ok())
        {
            params.insert("limit".to_string(), json!(limit));
        }

        if has(&text, &["mayor", "más", "máximo", "highest", "most", "biggest", "largest"]) {
            params.insert("orderBy".to_string(), json!("amount"));
            params.insert("orderDirection".to_string(), json!("desc"));
        } else if has(&text, &["menor", "menos", "mínimo", "lowest", "least", "smallest"]) {
            params.insert("orderBy".to_string(), json!("amount"));
            params.insert("orderDirection".to_string(), json!("asc"));
        }

        let by_category = has(&text, &["categoría", "categoria", "category", "categories"])
            && has(&text, &["con más", "con mayor", "por", "most", "by", "per"]);
        if by_category {
            params.insert("groupBy".to_string(), json!("category"));
            if !params.contains_key("orderBy") {
                params.insert("orderBy".to_string(), json!("amount"));
                params.insert("orderDirection".to_string(), json!("desc"));
            }
        }

        params
    }

    fn category_spending(&self, request: &str) -> Map<String, Value> {
        let mut params = Map::new();
        if let Some(category) = self.category(request) {
            params.insert("category".to_string(), json!(category));
        }
        if let Some(period) = period_of(&request.to_lowercase()) {
            params.insert("period".to_string(), json!(period));
        }
        params
    }

    fn transaction(&self, request: &str, context: &WalletContext) -> Map<String, Value> {
        let mut params = Map::new();
        if let Some(amount) = self.amount(request) {
            params.insert("amount".to_string(), json!(amount));
        }
        let kind = if self.income_words.is_match(request) {
            "INCOME"
        } else {
            "EXPENSE"
        };
        params.insert("type".to_string(), json!(kind));

        let description = self
            .purpose
            .captures(request)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| request.trim().to_string());
        params.insert("description".to_string(), json!(description));

        if let Some(currency) = self.currency(request, context) {
            params.insert("currency".to_string(), json!(currency));
        }
        params
    }

    fn transfer(&self, request: &str) -> Map<String, Value> {
        let mut params = Map::new();
        if let Some(amount) = self.amount(request) {
            params.insert("amount".to_string(), json!(amount));
        }
        if let Some(from) = first_capture(&self.transfer_from, request) {
            params.insert("fromAccountName".to_string(), json!(from));
        }
        if let Some(to) = first_capture(&self.transfer_to, request) {
            params.insert("toAccountName".to_string(), json!(to));
        }
        params
    }

    fn budget(&self, request: &str) -> Map<String, Value> {
        let mut params = Map::new();
        if let Some(category) = self.category(request) {
            params.insert("category".to_string(), json!(category));
        }
        if let Some(amount) = self.amount(request) {
            params.insert("amount".to_string(), json!(amount));
        }
        params
    }

    fn goal(&self, request: &str) -> Map<String, Value> {
        let mut params = Map::new();
        if let Some(name) = first_capture(&self.goal_name, request) {
            params.insert("name".to_string(), json!(name.trim()));
        }
        if let Some(target) = self.amount(request) {
            params.insert("target".to_string(), json!(target));
        }
        params
    }

    fn account(&self, request: &str, context: &WalletContext) -> Map<String, Value> {
        let text = request.to_lowercase();
        let mut params = Map::new();

        let kind = [
            (&["savings", "ahorro"][..], "SAVINGS"),
            (&["card", "tarjeta"][..], "CARD"),
            (&["cash", "efectivo"][..], "CASH"),
            (&["investment", "inversión", "inversion"][..], "INVESTMENT"),
            (&["bank", "banco", "checking", "corriente"][..], "BANK"),
        ]
        .into_iter()
        .find(|(words, _)| has(&text, words));

        if let Some((_, kind)) = kind {
            params.insert("type".to_string(), json!(kind));
        }

        let name = first_capture(&self.account_name, request).or_else(|| {
            kind.map(|(words, _)| capitalize(words[0]))
        });
        if let Some(name) = name {
            params.insert("name".to_string(), json!(name.trim()));
        }

        if let Some(currency) = self.currency(request, context) {
            params.insert("currency".to_string(), json!(currency));
        }
        params
    }

    fn amount(&self, request: &str) -> Option<f64> {
        let raw = self.number.find(request)?.as_str().trim_end_matches(',');
        let normalized = if raw.contains('.') || self.thousands.is_match(raw) {
            raw.replace(',', "")
        } else {
            raw.replace(',', ".")
        };
        normalized.parse().ok()
    }

    fn currency(&self, request: &str, context: &WalletContext) -> Option<String> {
        if let Some(code) = first_capture(&self.currency_code, request) {
            return Some(code.to_uppercase());
        }
        if self.dollars.is_match(request) {
            return Some("USD".to_string());
        }
        if self.euros.is_match(request) {
            return Some("EUR".to_string());
        }
        if self.bolivares.is_match(request) {
            return Some("VES".to_string());
        }
        let base = context.base_currency.to_uppercase();
        CURRENCIES.contains(&base.as_str()).then_some(base)
    }

    fn category(&self, request: &str) -> Option<String> {
        first_capture(&self.category_after, request)
            .or_else(|| first_capture(&self.category_before, request))
            .map(|c| capitalize(&c))
    }
}

/// Whole-word match; a trailing plural or `-ly` suffix still counts.
fn has(text: &str, words: &[&str]) -> bool {
    let alternation = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{})(?:s|es|ly)?\b", alternation))
        .map(|re| re.is_match(text))
        .unwrap_or(false)
}

fn period_of(text: &str) -> Option<&'static str> {
    let text = text.to_lowercase();
    if has(&text, &["hoy", "today"]) {
        Some("today")
    } else if has(&text, &["semana", "week"]) {
        Some("week")
    } else if has(&text, &["mes", "month", "mensual"]) {
        Some("month")
    } else if has(&text, &["año", "year", "anual", "annual"]) {
        Some("year")
    } else {
        None
    }
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
