pub mod infrastructure;
pub mod process_transcript_use_case;
pub mod task_executor;
