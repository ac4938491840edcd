#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Property tests for wave grouping over random dependency graphs.

use proptest::prelude::*;
use serde_json::Map;
use std::collections::HashMap;
use wallet_agent_executor::group_into_waves;
use wallet_agent_tasks::Task;

/// Random DAG: task i may only depend on tasks with a smaller index,
/// then the task list is shuffled by a rotation.
fn dag_strategy() -> impl Strategy<Value = Vec<Task>> {
    (1usize..12)
        .prop_flat_map(|n| {
            let edges = proptest::collection::vec(proptest::collection::vec(any::<bool>(), n), n);
            (Just(n), edges, 0..n)
        })
        .prop_map(|(n, edges, rotation)| {
            let mut tasks: Vec<Task> = (0..n)
                .map(|i| {
                    let mut task = Task::new(format!("task-{}", i + 1), "analyze_spending", Map::new());
                    for j in 0..i {
                        if edges[i][j] {
                            task = task.depending_on(format!("task-{}", j + 1));
                        }
                    }
                    task
                })
                .collect();
            tasks.rotate_left(rotation);
            tasks
        })
}

proptest! {
    #[test]
    fn every_task_lands_in_exactly_one_wave(tasks in dag_strategy()) {
        let waves = group_into_waves(&tasks);
        let mut seen: Vec<usize> = waves.iter().flatten().copied().collect();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..tasks.len()).collect::<Vec<_>>());
    }

    #[test]
    fn dependencies_sit_in_strictly_earlier_waves(tasks in dag_strategy()) {
        let waves = group_into_waves(&tasks);
        let mut wave_of: HashMap<&str, usize> = HashMap::new();
        for (w, wave) in waves.iter().enumerate() {
            for &index in wave {
                wave_of.insert(tasks[index].id.as_str(), w);
            }
        }
        for task in &tasks {
            for dep in &task.depends_on {
                prop_assert!(wave_of[dep.as_str()] < wave_of[task.id.as_str()]);
            }
        }
    }

    #[test]
    fn no_wave_is_empty(tasks in dag_strategy()) {
        let waves = group_into_waves(&tasks);
        prop_assert!(waves.iter().all(|wave| !wave.is_empty()));
        prop_assert!(waves.len() <= tasks.len());
    }
}
