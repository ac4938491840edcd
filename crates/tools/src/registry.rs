use crate::call::ToolCall;
use crate::execution_context::ExecutionContext;
use crate::spec::{builtin_specs, ToolSpec};
use crate::traits::{ActionHandler, ActionResult, ToolError};
use serde_json::{Map, Value};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use wallet_agent_context::WalletContext;

pub struct ToolRegistry {
    specs: HashMap<String, ToolSpec>,
    handler: Arc<dyn ActionHandler>,
}

impl ToolRegistry {
    pub fn new(handler: Arc<dyn ActionHandler>) -> Self {
        Self {
            specs: HashMap::new(),
            handler,
        }
    }

    pub fn with_builtin_catalog(handler: Arc<dyn ActionHandler>) -> Self {
        let mut registry = Self::new(handler);
        for spec in builtin_specs() {
            registry.register(spec);
        }
        registry
    }

    pub fn register(&mut self, spec: ToolSpec) {
        self.specs.insert(spec.name.clone(), spec);
    }

    pub fn lookup(&self, name: &str) -> Option<&ToolSpec> {
        self.specs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.specs.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn schemas(&self) -> Vec<Value> {
        let mut specs: Vec<&ToolSpec> = self.specs.values().collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs.into_iter().map(ToolSpec::schema).collect()
    }

    /// Looks up, validates, decodes and runs one tool call.
    ///
    /// Every failure (unknown tool, bad parameters, handler error, panic,
    /// timeout, cancellation) comes back as an unsuccessful `ActionResult`.
    pub async fn execute(
        &self,
        name: &str,
        params: &Map<String, Value>,
        context: Arc<WalletContext>,
        ctx: ExecutionContext,
    ) -> ActionResult {
        info!("Dispatching tool: {} for caller: {}", name, ctx.caller_id);

        let spec = match self.lookup(name) {
            Some(spec) => spec,
            None => {
                warn!("Tool not found: {}", name);
                return ToolError::NotFound(name.to_string()).into();
            }
        };

        if let Err(errors) = spec.validate_params(params) {
            warn!("Rejected parameters for {}: {:?}", name, errors);
            return ActionResult::failure(
                format!("Invalid parameters for {}", name),
                errors.join("; "),
            );
        }

        let call = match ToolCall::decode(spec.kind, params) {
            Ok(call) => call,
            Err(e) => return e.into(),
        };

        let call_ref = ctx.call_ref.clone();
        match self.execute_with_protection(call, context, ctx).await {
            Ok(result) => {
                debug!("Tool {} [{}] finished: success={}", name, call_ref, result.success);
                result
            }
            Err(e) => {
                warn!("Tool {} [{}] failed: {}", name, call_ref, e);
                e.into()
            }
        }
    }

    async fn execute_with_protection(
        &self,
        call: ToolCall,
        context: Arc<WalletContext>,
        ctx: ExecutionContext,
    ) -> Result<ActionResult, ToolError> {
        if ctx.is_cancelled() {
            return Err(ToolError::Cancelled);
        }

        let timeout_ms = ctx.timeout_ms;
        let deadline = ctx.timeout();
        let cancel = ctx.cancel.clone();
        let handler = self.handler.clone();

        // Spawn task to isolate panics
        let mut handle =
            tokio::spawn(async move { handler.handle(call, &context, &ctx).await });

        tokio::select! {
            _ = cancel.cancelled() => {
                handle.abort();
                Err(ToolError::Cancelled)
            }
            outcome = timeout(deadline, &mut handle) => match outcome {
                Ok(Ok(result)) => result,
                Ok(Err(join_err)) => {
                    if join_err.is_panic() {
                        let message = panic_message(join_err.into_panic());
                        error!("Tool execution panicked: {}", message);
                        Err(ToolError::Panicked(message))
                    } else {
                        Err(ToolError::Cancelled)
                    }
                }
                Err(_) => {
                    handle.abort();
                    Err(ToolError::Timeout(timeout_ms))
                }
            }
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => payload
            .downcast_ref::<&str>()
            .map(|message| message.to_string())
            .unwrap_or_else(|| "unknown panic".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct ScriptedHandler {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ActionHandler for ScriptedHandler {
        async fn handle(
            &self,
            call: ToolCall,
            _context: &WalletContext,
            _ctx: &ExecutionContext,
        ) -> Result<ActionResult, ToolError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match call {
                ToolCall::ComparePeriods => panic!("boom"),
                ToolCall::GetSpendingTrends(_) => {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(ActionResult::success("late", None))
                }
                ToolCall::QueryBalance(_) => Err(ToolError::Execution("ledger offline".to_string())),
                other => Ok(ActionResult::success(
                    format!("{} done", other.kind()),
                    Some(json!({ "ok": true })),
                )),
            }
        }
    }

    fn registry() -> (ToolRegistry, Arc<ScriptedHandler>) {
        let handler = Arc::new(ScriptedHandler {
            calls: AtomicUsize::new(0),
        });
        (ToolRegistry::with_builtin_catalog(handler.clone()), handler)
    }

    fn context() -> Arc<WalletContext> {
        Arc::new(WalletContext::empty("tester"))
    }

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn test_successful_dispatch() {
        let (registry, handler) = registry();
        let result = registry
            .execute(
                "analyze_spending",
                &Map::new(),
                context(),
                ExecutionContext::new("tester".to_string(), 1000),
            )
            .await;

        assert!(result.success);
        assert_eq!(result.data, Some(json!({ "ok": true })));
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_tool_and_bad_params_never_reach_handler() {
        let (registry, handler) = registry();
        let ctx = ExecutionContext::new("tester".to_string(), 1000);

        let missing = registry
            .execute("does_not_exist", &Map::new(), context(), ctx.clone())
            .await;
        assert!(!missing.success);
        assert!(missing.failure_reason().contains("does_not_exist"));

        let invalid = registry
            .execute(
                "create_transfer",
                &params(json!({ "amount": 10 })),
                context(),
                ctx,
            )
            .await;
        assert!(!invalid.success);
        assert!(invalid.failure_reason().contains("fromAccountName"));
        assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_handler_error_becomes_failure() {
        let (registry, _) = registry();
        let result = registry
            .execute(
                "get_account_balance",
                &Map::new(),
                context(),
                ExecutionContext::new("tester".to_string(), 1000),
            )
            .await;
        assert!(!result.success);
        assert!(result.failure_reason().contains("ledger offline"));
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let (registry, _) = registry();
        let result = registry
            .execute(
                "compare_periods",
                &Map::new(),
                context(),
                ExecutionContext::new("tester".to_string(), 1000),
            )
            .await;
        assert!(!result.success);
        assert!(result.failure_reason().contains("panicked"));
        assert!(result.failure_reason().contains("boom"));
    }

    #[tokio::test]
    async fn test_timeout_is_enforced() {
        let (registry, _) = registry();
        let result = registry
            .execute(
                "get_spending_trends",
                &Map::new(),
                context(),
                ExecutionContext::new("tester".to_string(), 20),
            )
            .await;
        assert!(!result.success);
        assert!(result.failure_reason().contains("timed out"));
    }

    #[tokio::test]
    async fn test_cancelled_context_skips_handler() {
        let (registry, handler) = registry();
        let ctx = ExecutionContext::new("tester".to_string(), 1000);
        ctx.cancel.cancel();

        let result = registry
            .execute("analyze_spending", &Map::new(), context(), ctx)
            .await;
        assert!(!result.success);
        assert!(result.failure_reason().contains("cancelled"));
        assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_catalog_listing() {
        let (registry, _) = registry();
        assert!(registry.contains("create_transfer"));
        assert!(!registry.contains("does_not_exist"));
        assert_eq!(registry.list().len(), registry.schemas().len());
        assert_eq!(registry.list()[0], "analyze_by_category");
    }
}
