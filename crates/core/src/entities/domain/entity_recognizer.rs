use super::entity_span::EntitySpan;
use crate::shared::error::CollaboratorError;

/// Domain interface for named-entity recognition.
///
/// Implementations return every span they recognize, in text order. The
/// extraction core filters the spans itself, so any engine that yields
/// plausible year and quantity spans is substitutable.
pub trait EntityRecognizer: Send + Sync {
    fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>, CollaboratorError>;
}
