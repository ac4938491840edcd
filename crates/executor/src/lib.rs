pub mod plan_executor;
pub mod waves;

pub use plan_executor::{should_replan, summarize, ExecutionOutcome, ExecutorConfig, PlanExecutor};
pub use waves::group_into_waves;
