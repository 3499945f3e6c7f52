use crate::classification::domain::classification_result::ClassificationResult;
use crate::classification::domain::zero_shot_classifier::{classify_checked, ZeroShotClassifier};
use crate::shared::error::CollaboratorError;

/// Finds which of a fixed set of topics (company policies, customer
/// objections) a transcript talks about.
pub struct TopicExtractor;

impl TopicExtractor {
    pub fn extract(
        classifier: &dyn ZeroShotClassifier,
        text: &str,
        labels: &[String],
        threshold: f32,
    ) -> Result<Vec<String>, CollaboratorError> {
        let result = classify_checked(classifier, text, labels)?;
        Ok(Self::select(&result, threshold))
    }

    /// Every label scoring strictly above `threshold`, in ranked order.
    pub fn select(result: &ClassificationResult, threshold: f32) -> Vec<String> {
        result
            .labels()
            .iter()
            .filter(|scored| scored.score > threshold)
            .map(|scored| scored.label.clone())
            .collect()
    }
}
