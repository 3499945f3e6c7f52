use super::category_spec::CategorySpec;
use super::extraction_record::{ExtractedRequirements, RequirementValue};
use crate::classification::domain::classification_result::ClassificationResult;
use crate::classification::domain::zero_shot_classifier::{classify_checked, ZeroShotClassifier};
use crate::entities::domain::entity_pattern::EntityPattern;
use crate::entities::domain::entity_span::EntitySpan;
use crate::shared::error::CollaboratorError;

/// Outcome of one collaborator call, with the failure already rendered.
pub type CallOutcome<T> = Result<T, String>;

/// Fills customer-requirement categories.
///
/// Classified categories take the top label when it clears the threshold.
/// Pattern categories keep the recognized entities whose text matches the
/// category's pattern. All pattern categories share one recognizer call.
pub struct RequirementExtractor;

impl RequirementExtractor {
    pub fn classify_category(
        classifier: &dyn ZeroShotClassifier,
        text: &str,
        labels: &[String],
        threshold: f32,
    ) -> Result<RequirementValue, CollaboratorError> {
        let result = classify_checked(classifier, text, labels)?;
        Ok(Self::select_label(&result, threshold))
    }

    /// The first-ranked label if its score is strictly above `threshold`.
    pub fn select_label(result: &ClassificationResult, threshold: f32) -> RequirementValue {
        match result.top() {
            Some(top) if top.score > threshold => RequirementValue::Label(top.label.clone()),
            _ => RequirementValue::Absent,
        }
    }

    pub fn match_pattern(spans: &[EntitySpan], pattern: EntityPattern) -> RequirementValue {
        RequirementValue::from_matches(pattern.select(spans))
    }

    /// Builds the per-category mapping from collaborator outcomes.
    ///
    /// `classified[i]` holds the outcome for `categories[i]` when that
    /// category is classified; `entities` is the shared recognizer outcome.
    /// Every category appears in the output, in configuration order. A
    /// category whose outcome is missing is reported as failed.
    pub fn assemble(
        categories: &[CategorySpec],
        mut classified: Vec<Option<CallOutcome<RequirementValue>>>,
        entities: Option<&CallOutcome<Vec<EntitySpan>>>,
    ) -> ExtractedRequirements {
        let mut requirements = ExtractedRequirements::default();
        for (index, category) in categories.iter().enumerate() {
            let value = match category {
                CategorySpec::Classified { .. } => {
                    match classified.get_mut(index).and_then(Option::take) {
                        Some(Ok(value)) => value,
                        Some(Err(message)) => RequirementValue::Failed(message),
                        None => not_evaluated(),
                    }
                }
                CategorySpec::Pattern { pattern, .. } => match entities {
                    Some(Ok(spans)) => Self::match_pattern(spans, *pattern),
                    Some(Err(message)) => RequirementValue::Failed(message.clone()),
                    None => not_evaluated(),
                },
            };
            requirements.push(category.name(), value);
        }
        requirements
    }
}

fn not_evaluated() -> RequirementValue {
    RequirementValue::Failed("category was not evaluated".to_string())
}
