pub mod sequential_task_executor;
pub mod threaded_task_executor;
