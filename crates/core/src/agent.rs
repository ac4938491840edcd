use crate::config::AgentConfig;
use crate::metrics::Metrics;
use crate::planner::Planner;
use crate::reasoner::{IntentClassifier, Reasoner};
use crate::types::*;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use wallet_agent_context::{ContextProvider, WalletContext};
use wallet_agent_executor::{should_replan, ExecutionOutcome, ExecutorConfig, PlanExecutor};
use wallet_agent_policy::ConfirmationPolicy;
use wallet_agent_tasks::{TaskPlan, TaskStatus};
use wallet_agent_tools::ToolRegistry;

pub const CLARIFICATION_MESSAGE: &str =
    "I'm not sure I understood your request. Could you rephrase it or give me more details?";

pub const CAPABILITIES_MESSAGE: &str = "I'm your personal finance assistant. I can:\n\
- Check account balances and recent transactions\n\
- Analyze your spending by category and over time\n\
- Compare this month with the previous one\n\
- Record expenses, income and transfers\n\
- Create budgets, savings goals and accounts\n\
\n\
What would you like to do?";

/// Reasoner → Planner → Executor pipeline with its three gates.
///
/// The agent holds no conversation state of its own: every turn takes an
/// [`AgentState`] and hands back the next one.
pub struct Agent {
    config: AgentConfig,
    classifier: Arc<dyn IntentClassifier>,
    planner: Planner,
    executor: PlanExecutor,
    context_provider: Option<Arc<dyn ContextProvider>>,
    metrics: Arc<Metrics>,
    shutdown: CancellationToken,
}

impl Agent {
    pub fn new(
        config: AgentConfig,
        registry: Arc<ToolRegistry>,
        policy: Arc<ConfirmationPolicy>,
    ) -> Self {
        let classifier: Arc<dyn IntentClassifier> =
            Arc::new(Reasoner::new(config.uses_structured_reasoning));
        let executor = PlanExecutor::new(
            registry.clone(),
            ExecutorConfig {
                task_timeout_ms: config.task_timeout_ms,
            },
        );

        Self {
            planner: Planner::new(registry, policy),
            executor,
            classifier,
            context_provider: None,
            metrics: Metrics::new(),
            shutdown: CancellationToken::new(),
            config,
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn IntentClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_context_provider(mut self, provider: Arc<dyn ContextProvider>) -> Self {
        self.context_provider = Some(provider);
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        self.metrics.clone()
    }

    /// Cancelling this token stops in-flight plans before their next wave.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub async fn process_message(
        &self,
        mut state: AgentState,
        text: &str,
        caller_id: &str,
    ) -> (AgentState, AgentResponse) {
        info!("Processing message for {}: {:?}", caller_id, preview(text));
        self.metrics.inc_turns();

        if let Some(stale) = state.current_plan.take() {
            info!("Discarding pending plan {} for a new message", stale.id);
        }

        self.refresh_context(&mut state, caller_id, text).await;

        state.phase = TurnPhase::Reasoning;
        let intention = self.classify(text, &state.wallet_context).await;
        info!(
            "Reasoning completed: {} (confidence: {})",
            intention.label, intention.confidence
        );
        state.reasoning_history.push(intention.clone());

        if intention.confidence < self.config.confidence_threshold {
            self.metrics.inc_clarifications();
            state.phase = TurnPhase::Idle;
            return (state, AgentResponse::reply(CLARIFICATION_MESSAGE));
        }

        if intention.is_conversational() {
            state.phase = TurnPhase::Idle;
            return (state, AgentResponse::reply(CAPABILITIES_MESSAGE));
        }

        state.phase = TurnPhase::Planning;
        let plan = self
            .planner
            .plan(&intention, &state.wallet_context, &self.config);
        let validation = self.planner.validate(&plan, &self.config);
        if !validation.valid {
            warn!("Plan validation failed: {:?}", validation.errors);
            self.metrics.inc_validation_failures();
            state.phase = TurnPhase::Idle;
            return (
                state,
                AgentResponse::reply(format!(
                    "I couldn't build a valid plan for your request: {}",
                    validation.errors.join(", ")
                )),
            );
        }

        let plan = self.planner.reorder(plan);
        info!("Plan created: {} task(s)", plan.tasks.len());

        let low_confidence = self
            .config
            .confirm_below_confidence
            .map_or(false, |limit| intention.confidence < limit);

        if (plan.requires_confirmation || low_confidence) && !self.config.auto_execute {
            self.metrics.inc_confirmations_requested();
            let response = confirmation_request(&plan, &intention, low_confidence);
            state.current_plan = Some(plan);
            state.phase = TurnPhase::AwaitingConfirmation;
            return (state, response);
        }

        state.current_plan = Some(plan);
        self.run_current_plan(state, caller_id).await
    }

    /// Executes the plan held for confirmation.
    pub async fn confirm_pending(
        &self,
        state: AgentState,
        caller_id: &str,
    ) -> (AgentState, AgentResponse) {
        if !state.awaiting_confirmation() {
            return (
                state,
                AgentResponse::reply("There is no plan waiting for confirmation."),
            );
        }
        info!("Plan confirmed by {}", caller_id);
        self.run_current_plan(state, caller_id).await
    }

    pub fn reject_pending(&self, mut state: AgentState) -> (AgentState, AgentResponse) {
        state.phase = TurnPhase::Idle;
        match state.current_plan.take() {
            Some(plan) => {
                info!("Plan {} rejected", plan.id);
                (
                    state,
                    AgentResponse::reply("Okay, I won't run those actions."),
                )
            }
            None => (state, AgentResponse::reply("There is nothing to cancel.")),
        }
    }

    async fn run_current_plan(
        &self,
        mut state: AgentState,
        caller_id: &str,
    ) -> (AgentState, AgentResponse) {
        let Some(mut plan) = state.current_plan.take() else {
            state.phase = TurnPhase::Idle;
            return (state, AgentResponse::reply("There is no plan to run."));
        };
        state.phase = TurnPhase::Executing;

        let mut outcome = self.execute(&mut plan, &mut state, caller_id).await;
        let mut replan = should_replan(&plan, &outcome.results);
        if replan {
            warn!("Plan {} should be replanned", plan.id);
            self.metrics.inc_replans_suggested();
        }

        let request = state
            .reasoning_history
            .last()
            .map(|intention| intention.request.clone())
            .unwrap_or_default();

        let mut attempts = 0;
        while replan && attempts < self.config.max_replan_attempts {
            attempts += 1;
            self.metrics.inc_replan_attempts();
            info!(
                "Replanning attempt {}/{}",
                attempts, self.config.max_replan_attempts
            );

            let reasons: Vec<String> = plan
                .tasks
                .iter()
                .filter(|task| task.status == TaskStatus::Failed)
                .map(|task| task.error.clone().unwrap_or_else(|| "unknown error".to_string()))
                .collect();
            let annotated = format!("{} (previous attempt failed: {})", request, reasons.join("; "));

            let mut intention = self.classify(&annotated, &state.wallet_context).await;
            intention.request = request.clone();

            let next = self
                .planner
                .plan(&intention, &state.wallet_context, &self.config);
            let validation = self.planner.validate(&next, &self.config);
            if !validation.valid {
                warn!("Replan validation failed: {:?}", validation.errors);
                break;
            }
            if next.requires_confirmation && !self.config.auto_execute {
                warn!("Replanned plan needs confirmation; not retrying");
                break;
            }

            plan = self.planner.reorder(next);
            outcome = self.execute(&mut plan, &mut state, caller_id).await;
            replan = should_replan(&plan, &outcome.results);
        }

        state.phase = TurnPhase::Idle;

        let message = match (attempts, outcome.success) {
            (0, _) => outcome.final_message,
            (n, true) => format!(
                "✓ Completed after {} retry attempt(s). {}",
                n, outcome.final_message
            ),
            (n, false) => format!(
                "⚠ Tried {} retry attempt(s) but could not complete the request. {}",
                n, outcome.final_message
            ),
        };

        (state, AgentResponse::reply(message))
    }

    async fn execute(
        &self,
        plan: &mut TaskPlan,
        state: &mut AgentState,
        caller_id: &str,
    ) -> ExecutionOutcome {
        let outcome = self
            .executor
            .execute(
                plan,
                caller_id,
                state.wallet_context.clone(),
                self.shutdown.child_token(),
            )
            .await;

        let succeeded = outcome.results.iter().filter(|r| r.success).count() as u64;
        let failed = outcome.results.len() as u64 - succeeded;
        self.metrics.inc_plans_executed();
        self.metrics.add_task_outcomes(succeeded, failed);

        state.completed_tasks.extend(plan.tasks.iter().cloned());
        outcome
    }

    async fn classify(&self, text: &str, context: &WalletContext) -> Intention {
        let deadline = self.config.reasoning_timeout();
        match tokio::time::timeout(deadline, self.classifier.classify(text, context)).await {
            Ok(Ok(intention)) => intention,
            Ok(Err(e)) => {
                warn!("Classification failed: {}", e);
                Intention::unknown(text)
            }
            Err(_) => {
                warn!("Classification timed out after {:?}", deadline);
                self.metrics.inc_classifier_timeouts();
                Intention::unknown(text)
            }
        }
    }

    async fn refresh_context(&self, state: &mut AgentState, caller_id: &str, text: &str) {
        let Some(provider) = &self.context_provider else {
            return;
        };
        match provider.build_context(caller_id, text).await {
            Ok(context) => {
                debug!("Context refreshed for {}", caller_id);
                state.wallet_context = Arc::new(context);
            }
            Err(e) => warn!("Keeping previous context for {}: {}", caller_id, e),
        }
    }
}

fn confirmation_request(plan: &TaskPlan, intention: &Intention, low_confidence: bool) -> AgentResponse {
    let actions: Vec<String> = plan
        .tasks
        .iter()
        .map(|task| format!("- {}", task.description))
        .collect();
    let mut message = format!(
        "To complete your request I need to run the following actions:\n{}\nDo you want to continue?",
        actions.join("\n")
    );
    if low_confidence {
        message.push_str(&format!(
            "\n\n(Note: I am {}% confident in this interpretation)",
            (intention.confidence * 100.0).round()
        ));
    }
    AgentResponse::confirmation(message, plan.summary_lines())
}

fn preview(text: &str) -> String {
    text.chars().take(50).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wallet_agent_tools::LedgerActions;

    fn agent(config: AgentConfig) -> Agent {
        let registry = ToolRegistry::with_builtin_catalog(Arc::new(LedgerActions::new()));
        Agent::new(
            config,
            Arc::new(registry),
            Arc::new(ConfirmationPolicy::new()),
        )
    }

    fn state() -> AgentState {
        AgentState::new(WalletContext::empty("unit"))
    }

    #[tokio::test]
    async fn test_conversational_reply() {
        let agent = agent(AgentConfig::default());
        let (state, response) = agent.process_message(state(), "hello", "unit").await;
        assert_eq!(response.message, CAPABILITIES_MESSAGE);
        assert!(state.completed_tasks.is_empty());
        assert_eq!(state.phase, TurnPhase::Idle);
    }

    #[tokio::test]
    async fn test_reject_clears_pending_plan() {
        let agent = agent(AgentConfig {
            auto_execute: false,
            ..Default::default()
        });
        let (state, response) = agent
            .process_message(state(), "transfer 20 from Checking to Savings", "unit")
            .await;
        assert!(response.requires_confirmation);
        assert!(state.awaiting_confirmation());

        let (state, response) = agent.reject_pending(state);
        assert_eq!(response.message, "Okay, I won't run those actions.");
        assert!(state.current_plan.is_none());
        assert!(state.completed_tasks.is_empty());

        let (_, response) = agent.confirm_pending(state, "unit").await;
        assert_eq!(response.message, "There is no plan waiting for confirmation.");
    }

    #[tokio::test]
    async fn test_unknown_request_fails_validation() {
        let agent = agent(AgentConfig::default());
        let (state, response) = agent.process_message(state(), "qwerty", "unit").await;
        assert_eq!(
            response.message,
            "I couldn't build a valid plan for your request: Plan has no tasks"
        );
        assert_eq!(state.reasoning_history.len(), 1);
        assert_eq!(agent.metrics().snapshot().validation_failures, 1);
    }
}
