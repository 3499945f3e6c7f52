use super::classification_result::ClassificationResult;
use crate::shared::error::{CollaboratorError, ExtractionError};

/// Domain interface for zero-shot text classification.
///
/// Implementations score `text` against every candidate label independently
/// (multi-label) and return all of them, highest confidence first.
pub trait ZeroShotClassifier: Send + Sync {
    fn classify(
        &self,
        text: &str,
        candidate_labels: &[String],
    ) -> Result<ClassificationResult, CollaboratorError>;
}

/// Classify and reject responses that break the ranking contract.
pub fn classify_checked(
    classifier: &dyn ZeroShotClassifier,
    text: &str,
    candidate_labels: &[String],
) -> Result<ClassificationResult, CollaboratorError> {
    let result = classifier.classify(text, candidate_labels)?;
    result
        .validate_against(candidate_labels)
        .map_err(|reason| ExtractionError::InvalidClassification {
            labels: candidate_labels.to_vec(),
            reason,
        })?;
    Ok(result)
}
