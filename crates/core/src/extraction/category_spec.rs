use serde::{Deserialize, Serialize};

use crate::entities::domain::entity_pattern::EntityPattern;
use crate::shared::constants::{
    CAR_TYPE, CAR_TYPE_LABELS, COLOR, COLOR_LABELS, DISTANCE_TRAVELLED, FUEL_TYPE,
    FUEL_TYPE_LABELS, MAKE_YEAR, TRANSMISSION_TYPE, TRANSMISSION_TYPE_LABELS,
};

/// A customer-requirement category and the strategy used to fill it.
///
/// In JSON a classified category carries `labels`, a pattern category
/// carries `pattern`:
///
/// ```json
/// {"name": "Car Type", "labels": ["Hatchback", "SUV", "Sedan"]}
/// {"name": "Make Year", "pattern": "make_year"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategorySpec {
    Classified { name: String, labels: Vec<String> },
    Pattern { name: String, pattern: EntityPattern },
}

impl CategorySpec {
    pub fn classified(name: &str, labels: &[&str]) -> Self {
        CategorySpec::Classified {
            name: name.to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    pub fn pattern(name: &str, pattern: EntityPattern) -> Self {
        CategorySpec::Pattern {
            name: name.to_string(),
            pattern,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CategorySpec::Classified { name, .. } | CategorySpec::Pattern { name, .. } => name,
        }
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self, CategorySpec::Pattern { .. })
    }

    /// The car-sales category table, in output order.
    pub fn defaults() -> Vec<CategorySpec> {
        vec![
            CategorySpec::classified(CAR_TYPE, CAR_TYPE_LABELS),
            CategorySpec::classified(FUEL_TYPE, FUEL_TYPE_LABELS),
            CategorySpec::classified(COLOR, COLOR_LABELS),
            CategorySpec::pattern(DISTANCE_TRAVELLED, EntityPattern::DistanceTravelled),
            CategorySpec::pattern(MAKE_YEAR, EntityPattern::MakeYear),
            CategorySpec::classified(TRANSMISSION_TYPE, TRANSMISSION_TYPE_LABELS),
        ]
    }
}
