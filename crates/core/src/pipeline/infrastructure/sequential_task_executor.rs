use crate::pipeline::task_executor::{ExtractionTask, TaskExecutor, TaskKey, TaskResult};

/// Runs tasks one after another on the calling thread.
pub struct SequentialTaskExecutor;

impl TaskExecutor for SequentialTaskExecutor {
    fn execute<'a>(&self, tasks: Vec<ExtractionTask<'a>>) -> Vec<(TaskKey, TaskResult)> {
        tasks
            .into_iter()
            .map(|task| {
                let result = (task.run)();
                log::debug!("Task {:?} finished (ok: {})", task.key, result.is_ok());
                (task.key, result)
            })
            .collect()
    }
}
