use std::collections::HashSet;
use wallet_agent_tasks::Task;

/// Splits tasks into waves; every task's dependencies sit in earlier waves.
///
/// Returns indices into `tasks`. When no remaining task can be scheduled
/// (a cycle, or a dependency on an id outside the plan) all of them are
/// dumped into one final wave, so grouping always terminates.
pub fn group_into_waves(tasks: &[Task]) -> Vec<Vec<usize>> {
    let mut scheduled: HashSet<&str> = HashSet::new();
    let mut remaining: Vec<usize> = (0..tasks.len()).collect();
    let mut waves = Vec::new();

    while !remaining.is_empty() {
        let (mut wave, blocked): (Vec<usize>, Vec<usize>) =
            remaining.iter().partition(|&&index| {
                tasks[index]
                    .depends_on
                    .iter()
                    .all(|dep| scheduled.contains(dep.as_str()))
            });

        if wave.is_empty() {
            tracing::warn!(
                "Unresolvable dependencies among {} task(s), running them as one wave",
                blocked.len()
            );
            wave = blocked;
            remaining = Vec::new();
        } else {
            remaining = blocked;
        }

        for &index in &wave {
            scheduled.insert(tasks[index].id.as_str());
        }
        waves.push(wave);
    }

    waves
}
