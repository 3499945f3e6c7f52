use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::entity_span::EntitySpan;

/// Surface-text patterns used to derive requirements from recognized entities.
///
/// Patterns are anchored at the start of the entity text only, so an entity
/// such as `"1998 model"` still counts as a year and is reported whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityPattern {
    /// A four-digit year starting with 19 or 20.
    MakeYear,
    /// A number, optionally comma-grouped and decimal, followed by a
    /// distance unit.
    DistanceTravelled,
}

impl EntityPattern {
    pub fn matches(&self, surface: &str) -> bool {
        self.regex().is_match(surface)
    }

    /// Surface texts of the spans matching this pattern, in span order.
    pub fn select(&self, spans: &[EntitySpan]) -> Vec<String> {
        spans
            .iter()
            .filter(|span| self.matches(&span.text))
            .map(|span| span.text.clone())
            .collect()
    }

    fn regex(&self) -> &'static Regex {
        static MAKE_YEAR: OnceLock<Regex> = OnceLock::new();
        static DISTANCE: OnceLock<Regex> = OnceLock::new();
        match self {
            EntityPattern::MakeYear => MAKE_YEAR
                .get_or_init(|| Regex::new(r"^\b(19|20)\d{2}\b").expect("make year regex")),
            EntityPattern::DistanceTravelled => DISTANCE.get_or_init(|| {
                Regex::new(r"^\d+(,\d{3})*(\.\d+)?\s*(km|kilometers|miles)")
                    .expect("distance regex")
            }),
        }
    }
}
