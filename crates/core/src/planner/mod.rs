//! Turns an [`Intention`] into a validated, dependency-ordered [`TaskPlan`].

pub mod params;

pub use params::ParamExtractor;

use crate::config::AgentConfig;
use crate::types::Intention;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};
use wallet_agent_context::WalletContext;
use wallet_agent_policy::ConfirmationPolicy;
use wallet_agent_tasks::{Task, TaskPlan};
use wallet_agent_tools::ToolRegistry;

const READ_ONLY_PREFIXES: [&str; 5] = ["analyze_", "get_", "query_", "calculate_", "compare_"];

#[derive(Debug, Clone, PartialEq)]
pub struct PlanValidation {
    pub valid: bool,
    pub errors: Vec<String>,
}

pub struct Planner {
    registry: Arc<ToolRegistry>,
    policy: Arc<ConfirmationPolicy>,
    extractor: Option<ParamExtractor>,
}

impl Planner {
    pub fn new(registry: Arc<ToolRegistry>, policy: Arc<ConfirmationPolicy>) -> Self {
        let extractor = match ParamExtractor::new() {
            Ok(extractor) => Some(extractor),
            Err(e) => {
                warn!("Parameter extraction disabled: {}", e);
                None
            }
        };
        Self {
            registry,
            policy,
            extractor,
        }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn plan(&self, intention: &Intention, context: &WalletContext, config: &AgentConfig) -> TaskPlan {
        let tools = &intention.suggested_tools;

        let tasks: Vec<Task> = if !intention.needs_planning && tools.len() == 1 {
            vec![self.task("task-1", &tools[0], intention, context)]
        } else {
            let mut tasks: Vec<Task> = Vec::with_capacity(tools.len());
            for (i, tool) in tools.iter().enumerate() {
                let mut task = self.task(&format!("task-{}", i + 1), tool, intention, context);
                if !is_read_only(tool) {
                    if let Some(previous) = tasks.last() {
                        task = task.depending_on(previous.id.clone());
                    }
                }
                tasks.push(task);
            }
            tasks
        };

        let requires_confirmation = tasks.iter().any(|task| {
            config.confirmation_required_for.contains(&task.action_kind)
                || self.policy.needs_confirmation(&task.tool_name, &task.parameters)
        });

        debug!(
            "Planned {} task(s) for {} (confirmation: {})",
            tasks.len(),
            intention.label,
            requires_confirmation
        );
        TaskPlan::new(tasks, requires_confirmation)
    }

    /// Collects every structural problem; an empty error list means the plan may run.
    pub fn validate(&self, plan: &TaskPlan, config: &AgentConfig) -> PlanValidation {
        let mut errors = Vec::new();

        if plan.tasks.is_empty() {
            errors.push("Plan has no tasks".to_string());
        }
        if plan.tasks.len() > config.max_planning_depth {
            errors.push(format!(
                "Plan has {} tasks, exceeding the maximum of {}",
                plan.tasks.len(),
                config.max_planning_depth
            ));
        }

        let mut seen = HashSet::new();
        for task in &plan.tasks {
            if !seen.insert(task.id.as_str()) {
                errors.push(format!("Duplicate task id: {}", task.id));
            }
        }

        let ids = plan.ids();
        for task in &plan.tasks {
            if !self.registry.contains(&task.tool_name) {
                errors.push(format!("Unknown tool: {}", task.tool_name));
            }
            for dep in &task.depends_on {
                if !ids.contains(dep.as_str()) {
                    errors.push(format!("Task {} depends on missing task {}", task.id, dep));
                }
            }
        }

        if let Some(cycle) = cyclic_tasks(plan) {
            errors.push(format!("Dependency cycle between tasks: {}", cycle.join(", ")));
        }

        PlanValidation {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Stable topological order. A stalled pass appends the remainder untouched.
    pub fn reorder(&self, mut plan: TaskPlan) -> TaskPlan {
        let mut remaining = std::mem::take(&mut plan.tasks);
        let mut ordered: Vec<Task> = Vec::with_capacity(remaining.len());
        let mut placed: HashSet<String> = HashSet::new();

        while !remaining.is_empty() {
            let before = remaining.len();
            let mut rest = Vec::with_capacity(remaining.len());
            for task in remaining {
                if task.depends_on.iter().all(|dep| placed.contains(dep)) {
                    placed.insert(task.id.clone());
                    ordered.push(task);
                } else {
                    rest.push(task);
                }
            }
            remaining = rest;

            if remaining.len() == before {
                warn!(
                    "Could not order {} task(s) in plan {}; keeping original order",
                    remaining.len(),
                    plan.id
                );
                ordered.append(&mut remaining);
            }
        }

        plan.tasks = ordered;
        plan
    }

    fn task(&self, id: &str, tool: &str, intention: &Intention, context: &WalletContext) -> Task {
        let parameters = self
            .extractor
            .as_ref()
            .map(|extractor| extractor.extract(tool, &intention.request, context))
            .unwrap_or_default();
        Task::new(id, tool, parameters)
    }
}

pub fn is_read_only(tool_name: &str) -> bool {
    READ_ONLY_PREFIXES
        .iter()
        .any(|prefix| tool_name.starts_with(prefix))
}

/// Kahn's algorithm over in-plan edges; returns the ids left over when a cycle exists.
fn cyclic_tasks(plan: &TaskPlan) -> Option<Vec<String>> {
    let ids = plan.ids();
    let mut indegree: HashMap<&str, usize> = HashMap::new();
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();

    for task in &plan.tasks {
        let deps = task
            .depends_on
            .iter()
            .filter(|dep| ids.contains(dep.as_str()))
            .count();
        indegree.insert(task.id.as_str(), deps);
        for dep in task.depends_on.iter().filter(|dep| ids.contains(dep.as_str())) {
            dependents.entry(dep.as_str()).or_default().push(task.id.as_str());
        }
    }

    let mut ready: Vec<&str> = indegree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| *id)
        .collect();
    let mut visited = 0;

    while let Some(id) = ready.pop() {
        visited += 1;
        for dependent in dependents.get(id).into_iter().flatten() {
            if let Some(degree) = indegree.get_mut(dependent) {
                *degree -= 1;
                if *degree == 0 {
                    ready.push(*dependent);
                }
            }
        }
    }

    if visited == indegree.len() {
        return None;
    }
    let mut stuck: Vec<String> = indegree
        .into_iter()
        .filter(|(_, degree)| *degree > 0)
        .map(|(id, _)| id.to_string())
        .collect();
    stuck.sort();
    Some(stuck)
}
