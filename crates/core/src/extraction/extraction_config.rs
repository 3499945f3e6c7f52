use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::category_spec::CategorySpec;
use crate::shared::constants::{
    COMPANY_POLICIES, CUSTOMER_OBJECTIONS, REQUIREMENT_CONFIDENCE_THRESHOLD,
    TOPIC_CONFIDENCE_THRESHOLD,
};
use crate::shared::error::ExtractionError;

/// Static extraction policy: what to look for and how sure we must be.
///
/// Fields missing from a JSON override fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub categories: Vec<CategorySpec>,
    pub company_policies: Vec<String>,
    pub customer_objections: Vec<String>,
    pub requirement_threshold: f32,
    pub topic_threshold: f32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            categories: CategorySpec::defaults(),
            company_policies: to_strings(COMPANY_POLICIES),
            customer_objections: to_strings(CUSTOMER_OBJECTIONS),
            requirement_threshold: REQUIREMENT_CONFIDENCE_THRESHOLD,
            topic_threshold: TOPIC_CONFIDENCE_THRESHOLD,
        }
    }
}

impl ExtractionConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ExtractionError> {
        let json = fs::read_to_string(path).map_err(|e| ExtractionError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|e| ExtractionError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ExtractionError> {
        check_threshold("requirement_threshold", self.requirement_threshold)?;
        check_threshold("topic_threshold", self.topic_threshold)?;
        check_labels("company_policies", &self.company_policies)?;
        check_labels("customer_objections", &self.customer_objections)?;

        let mut names = HashSet::new();
        for category in &self.categories {
            if !names.insert(category.name()) {
                return Err(ExtractionError::Config(format!(
                    "duplicate category '{}'",
                    category.name()
                )));
            }
            if let CategorySpec::Classified { name, labels } = category {
                check_labels(name, labels)?;
            }
        }
        Ok(())
    }
}

fn to_strings(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|l| l.to_string()).collect()
}

fn check_threshold(field: &str, value: f32) -> Result<(), ExtractionError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ExtractionError::Config(format!(
            "{field} must be between 0.0 and 1.0, got {value}"
        )));
    }
    Ok(())
}

fn check_labels(field: &str, labels: &[String]) -> Result<(), ExtractionError> {
    if labels.is_empty() {
        return Err(ExtractionError::Config(format!(
            "{field} needs at least one label"
        )));
    }
    let unique: HashSet<&str> = labels.iter().map(String::as_str).collect();
    if unique.len() != labels.len() {
        return Err(ExtractionError::Config(format!(
            "{field} has duplicate labels"
        )));
    }
    Ok(())
}
