use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::pipeline::task_executor::{ExtractionTask, TaskExecutor, TaskKey, TaskResult};

/// Runs every task on its own scoped thread.
///
/// Results are gathered over a channel and put back into task order, so the
/// output matches `SequentialTaskExecutor` for deterministic collaborators.
/// A panicking task is reported as that task's failure.
pub struct ThreadedTaskExecutor;

impl ThreadedTaskExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ThreadedTaskExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskExecutor for ThreadedTaskExecutor {
    fn execute<'a>(&self, tasks: Vec<ExtractionTask<'a>>) -> Vec<(TaskKey, TaskResult)> {
        let count = tasks.len();
        let keys: Vec<TaskKey> = tasks.iter().map(|t| t.key).collect();

        // Capacity covers every task, so senders never block.
        let (result_tx, result_rx) = crossbeam_channel::bounded::<(usize, TaskResult)>(count.max(1));

        std::thread::scope(|scope| {
            for (index, task) in tasks.into_iter().enumerate() {
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    let key = task.key;
                    let result = panic::catch_unwind(AssertUnwindSafe(task.run))
                        .unwrap_or_else(|payload| Err(panic_message(key, payload)));
                    log::debug!("Task {key:?} finished (ok: {})", result.is_ok());
                    let _ = result_tx.send((index, result));
                });
            }
        });
        drop(result_tx);

        let mut slots: Vec<Option<TaskResult>> = (0..count).map(|_| None).collect();
        for (index, result) in result_rx.try_iter() {
            slots[index] = Some(result);
        }

        keys.into_iter()
            .zip(slots)
            .map(|(key, slot)| {
                let result = slot.unwrap_or_else(|| Err(format!("task {key:?} produced no result")));
                (key, result)
            })
            .collect()
    }
}

fn panic_message(key: TaskKey, payload: Box<dyn Any + Send>) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("task {key:?} panicked: {detail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::task_executor::TaskOutput;
    use std::time::Duration;

    fn topics(label: &str) -> TaskResult {
        Ok(TaskOutput::Topics(vec![label.to_string()]))
    }

    #[test]
    fn test_results_follow_task_order_not_finish_order() {
        let tasks = vec![
            ExtractionTask::new(TaskKey::Requirement(0), || {
                std::thread::sleep(Duration::from_millis(50));
                topics("slow")
            }),
            ExtractionTask::new(TaskKey::Requirement(1), || topics("fast")),
        ];

        let results = ThreadedTaskExecutor::new().execute(tasks);

        assert_eq!(results[0], (TaskKey::Requirement(0), topics("slow")));
        assert_eq!(results[1], (TaskKey::Requirement(1), topics("fast")));
    }

    #[test]
    fn test_tasks_can_borrow_caller_data() {
        let text = String::from("shared transcript");
        let tasks = vec![
            ExtractionTask::new(TaskKey::CompanyPolicies, || topics(&text)),
            ExtractionTask::new(TaskKey::CustomerObjections, || topics(&text[..6])),
        ];

        let results = ThreadedTaskExecutor::new().execute(tasks);

        assert_eq!(results[0].1, topics("shared transcript"));
        assert_eq!(results[1].1, topics("shared"));
    }

    #[test]
    fn test_panicking_task_is_isolated() {
        let tasks = vec![
            ExtractionTask::new(TaskKey::Entities, || panic!("recognizer exploded")),
            ExtractionTask::new(TaskKey::CustomerObjections, || topics("Car Issues")),
        ];

        let results = ThreadedTaskExecutor::new().execute(tasks);

        let err = results[0].1.clone().unwrap_err();
        assert!(err.contains("Entities"), "got: {err}");
        assert!(err.contains("recognizer exploded"), "got: {err}");
        assert_eq!(results[1].1, topics("Car Issues"));
    }

    #[test]
    fn test_no_tasks_no_results() {
        assert!(ThreadedTaskExecutor::new().execute(Vec::new()).is_empty());
    }
}
