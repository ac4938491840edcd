pub mod agent;
pub mod config;
pub mod conversation;
pub mod metrics;
pub mod planner;
pub mod reasoner;
pub mod types;

pub use agent::{Agent, CAPABILITIES_MESSAGE, CLARIFICATION_MESSAGE};
pub use config::AgentConfig;
pub use conversation::Conversation;
pub use metrics::{Metrics, MetricsSnapshot};
pub use planner::{is_read_only, ParamExtractor, PlanValidation, Planner};
pub use reasoner::{IntentClassifier, PatternClassifier, Reasoner};
pub use types::*;
