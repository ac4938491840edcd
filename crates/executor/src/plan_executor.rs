use crate::waves::group_into_waves;
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use wallet_agent_context::WalletContext;
use wallet_agent_tasks::{TaskPlan, TaskStatus};
use wallet_agent_tools::{ActionResult, ExecutionContext, ToolRegistry};

pub const UNMET_DEPENDENCY: &str = "unmet dependency";
pub const CANCELLED: &str = "cancelled";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    pub task_timeout_ms: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            task_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub success: bool,
    /// One entry per processed task, in plan order.
    pub results: Vec<ActionResult>,
    pub final_message: String,
}

pub struct PlanExecutor {
    registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
}

impl PlanExecutor {
    pub fn new(registry: Arc<ToolRegistry>, config: ExecutorConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Runs the plan wave by wave, mutating task status in place.
    ///
    /// A failed mutating task stops later waves and leaves them pending. A
    /// cancelled token stops before the next wave and fails every task that
    /// was never dispatched.
    pub async fn execute(
        &self,
        plan: &mut TaskPlan,
        caller_id: &str,
        context: Arc<WalletContext>,
        cancel: CancellationToken,
    ) -> ExecutionOutcome {
        let waves = group_into_waves(&plan.tasks);
        let mut results: Vec<Option<ActionResult>> = vec![None; plan.tasks.len()];

        info!(
            "Executing plan {} ({} tasks in {} waves) for {}",
            plan.id,
            plan.tasks.len(),
            waves.len(),
            caller_id
        );

        for (wave_number, wave) in waves.iter().enumerate() {
            if cancel.is_cancelled() {
                warn!("Plan {} cancelled before wave {}", plan.id, wave_number + 1);
                for &index in waves[wave_number..].iter().flatten() {
                    let task = &mut plan.tasks[index];
                    if let Err(e) = task.fail(CANCELLED) {
                        warn!("{}", e);
                    }
                    results[index] = Some(ActionResult::failure(
                        format!("Cancelled {}", task.tool_name),
                        CANCELLED,
                    ));
                }
                break;
            }

            let mut dispatch = Vec::new();
            for &index in wave {
                let unmet = plan.tasks[index].depends_on.iter().any(|dep| {
                    plan.task(dep).map(|t| t.status) != Some(TaskStatus::Completed)
                });

                let task = &mut plan.tasks[index];
                if unmet {
                    debug!("Task {} has an unmet dependency", task.id);
                    if let Err(e) = task.fail(UNMET_DEPENDENCY) {
                        warn!("{}", e);
                    }
                    results[index] = Some(ActionResult::failure(
                        format!("Skipped {}", task.tool_name),
                        UNMET_DEPENDENCY,
                    ));
                    continue;
                }

                if let Err(e) = task.start() {
                    warn!("{}", e);
                    continue;
                }
                dispatch.push((index, task.tool_name.clone(), task.parameters.clone()));
            }

            let registry = &self.registry;
            let timeout_ms = self.config.task_timeout_ms;
            let outcomes = join_all(dispatch.into_iter().map(|(index, tool_name, params)| {
                let context = context.clone();
                let ctx =
                    ExecutionContext::with_cancel(caller_id.to_string(), timeout_ms, cancel.clone());
                async move {
                    let result = registry.execute(&tool_name, &params, context, ctx).await;
                    (index, result)
                }
            }))
            .await;

            let mut stop = false;
            for (index, result) in outcomes {
                let task = &mut plan.tasks[index];
                let applied = if result.success {
                    task.complete(result.data.clone())
                } else {
                    if task.action_kind.is_mutating() {
                        stop = true;
                    }
                    task.fail(result.failure_reason())
                };
                if let Err(e) = applied {
                    warn!("{}", e);
                }
                results[index] = Some(result);
            }

            // A skipped mutating task counts as a failed one too.
            stop |= wave.iter().any(|&index| {
                let task = &plan.tasks[index];
                task.status == TaskStatus::Failed && task.action_kind.is_mutating()
            });

            if stop {
                warn!(
                    "Critical task failed in wave {}, stopping plan {}",
                    wave_number + 1,
                    plan.id
                );
                break;
            }
        }

        let results: Vec<ActionResult> = results.into_iter().flatten().collect();
        let (success, final_message) = summarize(&results);
        info!("Plan {} finished: {}", plan.id, final_message);

        ExecutionOutcome {
            success,
            results,
            final_message,
        }
    }
}

/// Overall success flag and user-facing message for a set of results.
pub fn summarize(results: &[ActionResult]) -> (bool, String) {
    let succeeded = results.iter().filter(|r| r.success).count();
    let failed = results.len() - succeeded;

    let message = if failed == 0 {
        format!("✓ Plan executed successfully. {} task(s) completed.", succeeded)
    } else if succeeded == 0 {
        "✗ Plan failed. All tasks failed.".to_string()
    } else {
        format!(
            "⚠ Plan executed partially. {} succeeded, {} failed.",
            succeeded, failed
        )
    };

    (failed == 0, message)
}

/// True when every result failed or more than half of them did.
pub fn should_replan(plan: &TaskPlan, results: &[ActionResult]) -> bool {
    if results.iter().all(|r| !r.success) {
        debug!("Plan {}: every task failed", plan.id);
        return true;
    }
    let failed = results.iter().filter(|r| !r.success).count();
    failed as f64 / results.len() as f64 > 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use wallet_agent_tasks::Task;

    fn ok() -> ActionResult {
        ActionResult::success("ok", None)
    }

    fn err() -> ActionResult {
        ActionResult::failure("bad", "boom")
    }

    #[test]
    fn test_summary_messages() {
        assert_eq!(
            summarize(&[ok(), ok()]),
            (true, "✓ Plan executed successfully. 2 task(s) completed.".to_string())
        );
        assert_eq!(
            summarize(&[err(), err()]),
            (false, "✗ Plan failed. All tasks failed.".to_string())
        );
        assert_eq!(
            summarize(&[ok(), err(), ok()]),
            (false, "⚠ Plan executed partially. 2 succeeded, 1 failed.".to_string())
        );
    }

    #[test]
    fn test_replan_decision() {
        let plan = TaskPlan::new(vec![Task::new("task-1", "analyze_spending", Default::default())], false);
        assert!(should_replan(&plan, &[err()]));
        assert!(should_replan(&plan, &[err(), err(), ok()]));
        assert!(!should_replan(&plan, &[err(), ok()]));
        assert!(!should_replan(&plan, &[ok(), ok(), err()]));
    }
}
