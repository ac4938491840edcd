pub mod action;
pub mod call;
pub mod execution_context;
pub mod ledger;
pub mod registry;
pub mod spec;
pub mod traits;

pub use action::ActionKind;
pub use call::ToolCall;
pub use execution_context::ExecutionContext;
pub use ledger::{JournalEntry, LedgerActions};
pub use registry::ToolRegistry;
pub use spec::{builtin_specs, ParamConstraint, ParamType, ToolSpec};
pub use traits::{ActionHandler, ActionResult, ToolError};
