use regex::Regex;

use crate::entities::domain::entity_recognizer::EntityRecognizer;
use crate::entities::domain::entity_span::{EntityLabel, EntitySpan};
use crate::shared::error::CollaboratorError;

const QUANTITY_PATTERN: &str =
    r"\b\d+(?:,\d{3})*(?:\.\d+)?\s*(?:kilometers|kilometres|kms|km|miles|mi)\b";
const NUMBER_PATTERN: &str = r"\b\d+(?:,\d{3})*(?:\.\d+)?\b";

/// Plain four-digit numbers in this range are labelled as dates.
const YEAR_RANGE: std::ops::RangeInclusive<u32> = 1000..=2999;

/// Rule-based recognizer for the numeric entities sales calls mention:
/// distances, years and bare counts.
///
/// Quantity spans win over the numbers inside them, so `"45,000 km"` is one
/// span rather than a quantity plus a cardinal.
pub struct QuantityEntityRecognizer {
    quantity: Regex,
    number: Regex,
}

impl QuantityEntityRecognizer {
    pub fn new() -> Result<Self, CollaboratorError> {
        Ok(Self {
            quantity: Regex::new(QUANTITY_PATTERN)?,
            number: Regex::new(NUMBER_PATTERN)?,
        })
    }
}

impl EntityRecognizer for QuantityEntityRecognizer {
    fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>, CollaboratorError> {
        let mut spans: Vec<EntitySpan> = self
            .quantity
            .find_iter(text)
            .map(|m| EntitySpan::new(m.as_str(), EntityLabel::Quantity, m.start(), m.end()))
            .collect();

        let numbers: Vec<EntitySpan> = self
            .number
            .find_iter(text)
            .filter(|m| !spans.iter().any(|q| q.overlaps(m.start(), m.end())))
            .map(|m| EntitySpan::new(m.as_str(), number_label(m.as_str()), m.start(), m.end()))
            .collect();
        spans.extend(numbers);

        spans.sort_by_key(|s| s.start);
        Ok(spans)
    }
}

fn number_label(number: &str) -> EntityLabel {
    let is_year = number.len() == 4
        && number
            .parse::<u32>()
            .map(|n| YEAR_RANGE.contains(&n))
            .unwrap_or(false);
    if is_year {
        EntityLabel::Date
    } else {
        EntityLabel::Cardinal
    }
}
