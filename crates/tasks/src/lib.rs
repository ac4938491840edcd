use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;
use wallet_agent_tools::ActionKind;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Task not found: {0}")]
    NotFound(String),
    #[error("Task already exists: {0}")]
    AlreadyExists(String),
    #[error("Invalid status transition for {id}: {from:?} -> {to:?}")]
    InvalidTransition {
        id: String,
        from: TaskStatus,
        to: TaskStatus,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub tool_name: String,
    pub action_kind: ActionKind,
    pub description: String,
    pub parameters: Map<String, Value>,
    pub depends_on: BTreeSet<String>,
    pub status: TaskStatus,
    pub result: Option<Value>,
    pub error: Option<String>,
}

impl Task {
    pub fn new(id: impl Into<String>, tool_name: &str, parameters: Map<String, Value>) -> Self {
        let action_kind = ActionKind::from_tool_name(tool_name);
        Self {
            id: id.into(),
            tool_name: tool_name.to_string(),
            action_kind,
            description: describe(tool_name, &parameters),
            parameters,
            depends_on: BTreeSet::new(),
            status: TaskStatus::Pending,
            result: None,
            error: None,
        }
    }

    pub fn depending_on(mut self, id: impl Into<String>) -> Self {
        self.depends_on.insert(id.into());
        self
    }

    pub fn start(&mut self) -> Result<(), TaskError> {
        self.transition(TaskStatus::Running)
    }

    pub fn complete(&mut self, result: Option<Value>) -> Result<(), TaskError> {
        self.transition(TaskStatus::Completed)?;
        self.result = result;
        self.error = None;
        Ok(())
    }

    /// Pending tasks may fail directly (unmet dependencies never start).
    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), TaskError> {
        self.transition(TaskStatus::Failed)?;
        self.error = Some(error.into());
        Ok(())
    }

    fn transition(&mut self, to: TaskStatus) -> Result<(), TaskError> {
        let allowed = matches!(
            (self.status, to),
            (TaskStatus::Pending, TaskStatus::Running)
                | (TaskStatus::Pending, TaskStatus::Failed)
                | (TaskStatus::Running, TaskStatus::Completed)
                | (TaskStatus::Running, TaskStatus::Failed)
        );
        if !allowed {
            return Err(TaskError::InvalidTransition {
                id: self.id.clone(),
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}

fn describe(tool_name: &str, parameters: &Map<String, Value>) -> String {
    if parameters.is_empty() {
        return tool_name.to_string();
    }
    let args: Vec<String> = parameters
        .iter()
        .map(|(key, value)| match value {
            Value::String(text) => format!("{}={}", key, text),
            other => format!("{}={}", key, other),
        })
        .collect();
    format!("{} ({})", tool_name, args.join(", "))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskPlan {
    pub id: String,
    pub tasks: Vec<Task>,
    pub estimated_steps: usize,
    pub requires_confirmation: bool,
}

impl TaskPlan {
    pub fn new(tasks: Vec<Task>, requires_confirmation: bool) -> Self {
        let estimated_steps = tasks.len();
        Self {
            id: format!("plan-{}", uuid::Uuid::new_v4()),
            tasks,
            estimated_steps,
            requires_confirmation,
        }
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn task_mut(&mut self, id: &str) -> Result<&mut Task, TaskError> {
        self.tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| TaskError::NotFound(id.to_string()))
    }

    pub fn push(&mut self, task: Task) -> Result<(), TaskError> {
        if self.task(&task.id).is_some() {
            return Err(TaskError::AlreadyExists(task.id));
        }
        self.tasks.push(task);
        self.estimated_steps = self.tasks.len();
        Ok(())
    }

    pub fn ids(&self) -> HashSet<&str> {
        self.tasks.iter().map(|task| task.id.as_str()).collect()
    }

    pub fn count_with_status(&self, status: TaskStatus) -> usize {
        self.tasks.iter().filter(|task| task.status == status).count()
    }

    /// One line per task, used when asking the user to confirm.
    pub fn summary_lines(&self) -> Vec<String> {
        self.tasks
            .iter()
            .enumerate()
            .map(|(i, task)| format!("{}. {}", i + 1, task.description))
            .collect()
    }
}
