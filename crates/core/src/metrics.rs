use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Default)]
pub struct Metrics {
    turns: AtomicU64,
    clarifications: AtomicU64,
    validation_failures: AtomicU64,
    confirmations_requested: AtomicU64,
    plans_executed: AtomicU64,
    task_successes: AtomicU64,
    task_failures: AtomicU64,
    replans_suggested: AtomicU64,
    replan_attempts: AtomicU64,
    classifier_timeouts: AtomicU64,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_turns(&self) {
        self.turns.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_clarifications(&self) {
        self.clarifications.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_validation_failures(&self) {
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_confirmations_requested(&self) {
        self.confirmations_requested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_plans_executed(&self) {
        self.plans_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_task_outcomes(&self, successes: u64, failures: u64) {
        self.task_successes.fetch_add(successes, Ordering::Relaxed);
        self.task_failures.fetch_add(failures, Ordering::Relaxed);
    }

    pub fn inc_replans_suggested(&self) {
        self.replans_suggested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_replan_attempts(&self) {
        self.replan_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_classifier_timeouts(&self) {
        self.classifier_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            turns: self.turns.load(Ordering::Relaxed),
            clarifications: self.clarifications.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
            confirmations_requested: self.confirmations_requested.load(Ordering::Relaxed),
            plans_executed: self.plans_executed.load(Ordering::Relaxed),
            task_successes: self.task_successes.load(Ordering::Relaxed),
            task_failures: self.task_failures.load(Ordering::Relaxed),
            replans_suggested: self.replans_suggested.load(Ordering::Relaxed),
            replan_attempts: self.replan_attempts.load(Ordering::Relaxed),
            classifier_timeouts: self.classifier_timeouts.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub turns: u64,
    pub clarifications: u64,
    pub validation_failures: u64,
    pub confirmations_requested: u64,
    pub plans_executed: u64,
    pub task_successes: u64,
    pub task_failures: u64,
    pub replans_suggested: u64,
    pub replan_attempts: u64,
    pub classifier_timeouts: u64,
}

impl MetricsSnapshot {
    pub fn task_success_rate(&self) -> f64 {
        let total = self.task_successes + self.task_failures;
        if total == 0 {
            return 1.0;
        }
        self.task_successes as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_and_rate() {
        let metrics = Metrics::new();
        assert_eq!(metrics.snapshot().task_success_rate(), 1.0);

        metrics.inc_turns();
        metrics.inc_turns();
        metrics.add_task_outcomes(3, 1);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.turns, 2);
        assert_eq!(snapshot.task_successes, 3);
        assert_eq!(snapshot.task_success_rate(), 0.75);
    }
}
