use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Per-call envelope threaded from the executor into every tool.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub caller_id: String,
    pub timeout_ms: u64,
    pub call_ref: String,
    pub cancel: CancellationToken,
}

impl ExecutionContext {
    pub fn new(caller_id: String, timeout_ms: u64) -> Self {
        Self::with_cancel(caller_id, timeout_ms, CancellationToken::new())
    }

    pub fn with_cancel(caller_id: String, timeout_ms: u64, cancel: CancellationToken) -> Self {
        Self {
            caller_id,
            timeout_ms,
            call_ref: uuid::Uuid::new_v4().to_string(),
            cancel,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
