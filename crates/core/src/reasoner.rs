//! Keyword classifier for English and Spanish requests.
//!
//! Rules are checked in order against the lowercased text and the first
//! match wins, so more specific rules sit above broader ones.

use crate::types::{AgentError, Intention, LABEL_CONVERSATIONAL};
use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, warn};
use wallet_agent_context::WalletContext;
use wallet_agent_tools::ActionKind;

const AVERAGE: &str = r"promedio|average|media|mean";
const INCOME: &str = r"ingreso|income";
const MONTHLY: &str = r"mensual|monthly";
const EXPENSE: &str = r"gasto|expense|spending";
const ANALYZE: &str = r"analizar|analyze|an[aá]lisis|analysis|estad[ií]stica|statistics";
const CATEGORY: &str = r"categor[ií]a|category|categories";
const PERCENT: &str = r"porcentaje|percentage";
const COMPARE: &str = r"comparar|compare|comparaci[oó]n|comparison|\bvs\b|versus";
const SUMMARY: &str = r"resumen|summary|resumir|summarize";
const TRANSFER: &str = r"transfer|transferir|mover dinero|move money";
const CREATE: &str =
    r"crear|create|agregar|a[ñn]adir|\badd\b|nuev[oa]|\bnew\b|registrar|register|record";
const CREATE_TRANSACTION: &str = r"transacci|transaction|gasto|expense|ingreso|income";
const BUDGET: &str = r"presupuesto|budget";
const GOAL: &str = r"\bmeta\b|goal|objetivo|target";
const ACCOUNT: &str = r"cuenta|account";
const TRANSACTIONS: &str = r"transacci[oó]n|transacciones|transactions?|gastos?|expenses?|ingresos?|income";
const TODAY: &str = r"\bhoy\b|today";
const BALANCE: &str = r"saldo|balance|dinero|money|cu[aá]nto|tengo";
const CONVERSATIONAL: &str = r"^(hola|hi\b|hello|hey|buenos d[ií]as|buenas tardes|buenas noches)|prop[oó]sito|purpose|qu[eé] haces|para qu[eé] sirves|ayuda|help";
const CONNECTOR: &str = r"\b(?:and|then|y|luego)\b";

struct RuleSpec {
    label: &'static str,
    confidence: f64,
    tool: Option<&'static str>,
    all: &'static [&'static str],
    none: &'static [&'static str],
}

const fn rule(
    label: &'static str,
    confidence: f64,
    tool: &'static str,
    all: &'static [&'static str],
) -> RuleSpec {
    RuleSpec {
        label,
        confidence,
        tool: Some(tool),
        all,
        none: &[],
    }
}

const AVERAGE_RULES: &[RuleSpec] = &[
    rule(
        "CALCULATE_AVERAGE_MONTHLY_INCOME",
        0.95,
        "query_financial_data",
        &[AVERAGE, INCOME, MONTHLY],
    ),
    rule(
        "CALCULATE_AVERAGE_MONTHLY_EXPENSES",
        0.95,
        "query_financial_data",
        &[AVERAGE, EXPENSE, MONTHLY],
    ),
    rule(
        "CALCULATE_AVERAGE_EXPENSES",
        0.9,
        "query_financial_data",
        &[AVERAGE, EXPENSE],
    ),
    rule("CALCULATE_AVERAGE", 0.85, "query_financial_data", &[AVERAGE]),
];

const SIMPLE_AVERAGE_RULES: &[RuleSpec] = &[rule(
    "CALCULATE_AVERAGE_MONTHLY_EXPENSES",
    0.9,
    "get_spending_trends",
    &[AVERAGE, r"gasto|expense|spending|mensual|monthly"],
)];

const SHARED_RULES: &[RuleSpec] = &[
    rule("ANALYZE_FINANCES", 0.85, "analyze_by_category", &[ANALYZE, CATEGORY]),
    rule("ANALYZE_FINANCES", 0.85, "calculate_percentages", &[ANALYZE, PERCENT]),
    rule("ANALYZE_FINANCES", 0.85, "analyze_spending", &[ANALYZE]),
    rule("COMPARE_PERIODS", 0.9, "compare_periods", &[COMPARE]),
    rule("GET_SUMMARY", 0.85, "get_financial_summary", &[SUMMARY]),
    rule("CREATE_TRANSFER", 0.9, "create_transfer", &[TRANSFER]),
    rule(
        "CREATE_TRANSACTION",
        0.9,
        "create_transaction",
        &[CREATE, CREATE_TRANSACTION],
    ),
    rule("CREATE_BUDGET", 0.9, "create_budget", &[CREATE, BUDGET]),
    rule("CREATE_GOAL", 0.9, "create_goal", &[CREATE, GOAL]),
    rule("CREATE_ACCOUNT", 0.9, "create_account", &[CREATE, ACCOUNT]),
    RuleSpec {
        label: "QUERY_TODAY_TRANSACTIONS",
        confidence: 0.95,
        tool: Some("query_financial_data"),
        all: &[TRANSACTIONS, TODAY],
        none: &[CATEGORY],
    },
    rule(
        "QUERY_CATEGORY_SPENDING",
        0.9,
        "get_category_spending",
        &[TRANSACTIONS, CATEGORY],
    ),
    rule("QUERY_TRANSACTIONS", 0.8, "query_financial_data", &[TRANSACTIONS]),
    rule("QUERY_BALANCE", 0.85, "get_account_balance", &[BALANCE]),
    RuleSpec {
        label: LABEL_CONVERSATIONAL,
        confidence: 0.9,
        tool: None,
        all: &[CONVERSATIONAL],
        none: &[],
    },
];

struct Rule {
    label: &'static str,
    confidence: f64,
    tool: Option<&'static str>,
    all: Vec<Regex>,
    none: Vec<Regex>,
}

impl Rule {
    fn compile(spec: &RuleSpec) -> Result<Self, regex::Error> {
        Ok(Self {
            label: spec.label,
            confidence: spec.confidence,
            tool: spec.tool,
            all: spec.all.iter().map(|p| Regex::new(p)).collect::<Result<_, _>>()?,
            none: spec.none.iter().map(|p| Regex::new(p)).collect::<Result<_, _>>()?,
        })
    }

    fn matches(&self, text: &str) -> bool {
        self.all.iter().all(|re| re.is_match(text)) && !self.none.iter().any(|re| re.is_match(text))
    }
}

/// An ordered rule table, optionally aware of compound requests.
pub struct PatternClassifier {
    rules: Vec<Rule>,
    connector: Option<Regex>,
}

impl PatternClassifier {
    pub fn enhanced() -> Result<Self, regex::Error> {
        let specs = AVERAGE_RULES.iter().chain(SHARED_RULES.iter());
        Ok(Self {
            rules: specs.map(Rule::compile).collect::<Result<_, _>>()?,
            connector: Some(Regex::new(CONNECTOR)?),
        })
    }

    pub fn simple() -> Result<Self, regex::Error> {
        let specs = SIMPLE_AVERAGE_RULES.iter().chain(SHARED_RULES.iter());
        Ok(Self {
            rules: specs.map(Rule::compile).collect::<Result<_, _>>()?,
            connector: None,
        })
    }

    fn first_match(&self, lower: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.matches(lower))
    }

    pub fn classify(&self, text: &str) -> Intention {
        let lower = text.to_lowercase();
        let Some(primary) = self.first_match(&lower) else {
            return Intention::unknown(text);
        };

        let mut intention = Intention {
            label: primary.label.to_string(),
            confidence: primary.confidence,
            suggested_tools: primary.tool.iter().map(|t| t.to_string()).collect(),
            needs_planning: false,
            request: text.to_string(),
        };

        if let Some(connector) = &self.connector {
            for clause in connector.split(&lower).skip(1) {
                let Some(tool) = self.first_match(clause).and_then(|rule| rule.tool) else {
                    continue;
                };
                let kind = ActionKind::from_tool_name(tool);
                let read_only = kind != ActionKind::Unknown && !kind.is_mutating();
                if read_only && !intention.suggested_tools.iter().any(|t| t == tool) {
                    intention.suggested_tools.push(tool.to_string());
                }
            }
            intention.needs_planning = intention.suggested_tools.len() > 1;
        }

        intention
    }
}

/// Anything that can turn a message into an [`Intention`].
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, text: &str, context: &WalletContext)
        -> Result<Intention, AgentError>;
}

pub struct Reasoner {
    structured: bool,
    enhanced: Option<PatternClassifier>,
    simple: Option<PatternClassifier>,
}

impl Reasoner {
    pub fn new(structured: bool) -> Self {
        let enhanced = match PatternClassifier::enhanced() {
            Ok(classifier) => Some(classifier),
            Err(e) => {
                warn!("Enhanced classifier unavailable: {}", e);
                None
            }
        };
        let simple = match PatternClassifier::simple() {
            Ok(classifier) => Some(classifier),
            Err(e) => {
                warn!("Simple classifier unavailable: {}", e);
                None
            }
        };
        Self {
            structured,
            enhanced,
            simple,
        }
    }

    pub fn classify_text(&self, text: &str) -> Intention {
        let classifier = if self.structured {
            self.enhanced.as_ref().or(self.simple.as_ref())
        } else {
            self.simple.as_ref()
        };

        let intention = match classifier {
            Some(classifier) => classifier.classify(text),
            None => Intention::unknown(text),
        };

        debug!(
            "Classified as {} ({:.2}) with tools {:?}",
            intention.label, intention.confidence, intention.suggested_tools
        );
        intention
    }
}

#[async_trait]
impl IntentClassifier for Reasoner {
    async fn classify(
        &self,
        text: &str,
        _context: &WalletContext,
    ) -> Result<Intention, AgentError> {
        Ok(self.classify_text(text))
    }
}
