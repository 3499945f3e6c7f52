use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// The value determined for one customer-requirement category.
#[derive(Debug, Clone, PartialEq)]
pub enum RequirementValue {
    /// The accepted top classification label.
    Label(String),
    /// Entity texts matching the category's pattern. Never empty.
    Matches(Vec<String>),
    /// Evaluated, nothing qualified.
    Absent,
    /// The collaborator call behind this category failed.
    Failed(String),
}

impl RequirementValue {
    /// `Matches` for a non-empty list, `Absent` otherwise.
    pub fn from_matches(matches: Vec<String>) -> Self {
        if matches.is_empty() {
            RequirementValue::Absent
        } else {
            RequirementValue::Matches(matches)
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RequirementValue::Failed(_))
    }
}

impl Serialize for RequirementValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RequirementValue::Label(label) => serializer.serialize_str(label),
            RequirementValue::Matches(matches) => matches.serialize(serializer),
            RequirementValue::Absent => serializer.serialize_none(),
            RequirementValue::Failed(message) => serialize_error(serializer, message),
        }
    }
}

/// Category values in configuration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedRequirements {
    entries: Vec<(String, RequirementValue)>,
}

impl ExtractedRequirements {
    pub fn push(&mut self, category: impl Into<String>, value: RequirementValue) {
        self.entries.push((category.into(), value));
    }

    pub fn get(&self, category: &str) -> Option<&RequirementValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RequirementValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ExtractedRequirements {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Topics (policies or objections) detected in a transcript.
///
/// An empty `Detected` list is a real answer: nothing cleared the bar.
#[derive(Debug, Clone, PartialEq)]
pub enum TopicOutcome {
    Detected(Vec<String>),
    Failed(String),
}

impl Serialize for TopicOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TopicOutcome::Detected(topics) => topics.serialize(serializer),
            TopicOutcome::Failed(message) => serialize_error(serializer, message),
        }
    }
}

fn serialize_error<S: Serializer>(serializer: S, message: &str) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(1))?;
    map.serialize_entry("error", message)?;
    map.end()
}

/// Structured result for one transcript.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionRecord {
    pub conversation_id: String,
    pub customer_requirements: ExtractedRequirements,
    pub company_policies_discussed: TopicOutcome,
    pub customer_objections: TopicOutcome,
}
