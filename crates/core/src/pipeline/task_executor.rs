use crate::entities::domain::entity_span::EntitySpan;
use crate::extraction::extraction_record::RequirementValue;

/// Identifies one collaborator call made while processing a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKey {
    /// Classification for the category at this index of the config.
    Requirement(usize),
    /// The single entity-recognition call shared by pattern categories.
    Entities,
    CompanyPolicies,
    CustomerObjections,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutput {
    Requirement(RequirementValue),
    Entities(Vec<EntitySpan>),
    Topics(Vec<String>),
}

/// A failed task carries its rendered error message.
pub type TaskResult = Result<TaskOutput, String>;

pub struct ExtractionTask<'a> {
    pub key: TaskKey,
    pub run: Box<dyn FnOnce() -> TaskResult + Send + 'a>,
}

impl<'a> ExtractionTask<'a> {
    pub fn new(key: TaskKey, run: impl FnOnce() -> TaskResult + Send + 'a) -> Self {
        Self {
            key,
            run: Box::new(run),
        }
    }
}

/// Abstracts how the independent collaborator calls of one transcript run.
///
/// This is a port. Infrastructure provides sequential and threaded
/// implementations. Results come back in task order whatever the execution
/// order, and one task failing never affects another's result.
pub trait TaskExecutor: Send + Sync {
    fn execute<'a>(&self, tasks: Vec<ExtractionTask<'a>>) -> Vec<(TaskKey, TaskResult)>;
}
