use std::collections::HashSet;

#[derive(Clone, Debug, PartialEq)]
pub struct ScoredLabel {
    pub label: String,
    pub score: f32,
}

impl ScoredLabel {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Labels ranked by descending confidence for one (text, candidates) query.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClassificationResult {
    labels: Vec<ScoredLabel>,
}

impl ClassificationResult {
    /// Builds a result from unordered scores, sorting them highest first.
    ///
    /// The sort is stable, so equal scores keep their input order.
    pub fn ranked(mut labels: Vec<ScoredLabel>) -> Self {
        labels.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Self { labels }
    }

    /// Wraps labels that are already in collaborator order, without sorting.
    pub fn from_ranked(labels: Vec<ScoredLabel>) -> Self {
        Self { labels }
    }

    pub fn labels(&self) -> &[ScoredLabel] {
        &self.labels
    }

    pub fn top(&self) -> Option<&ScoredLabel> {
        self.labels.first()
    }

    /// Checks the collaborator contract: exactly one entry per candidate,
    /// no extras, scores in [0, 1] and sorted descending.
    pub fn validate_against(&self, candidates: &[String]) -> Result<(), String> {
        if self.labels.len() != candidates.len() {
            return Err(format!(
                "expected {} labels, got {}",
                candidates.len(),
                self.labels.len()
            ));
        }

        let expected: HashSet<&str> = candidates.iter().map(String::as_str).collect();
        let mut seen: HashSet<&str> = HashSet::with_capacity(self.labels.len());
        for scored in &self.labels {
            if !expected.contains(scored.label.as_str()) {
                return Err(format!("unexpected label '{}'", scored.label));
            }
            if !seen.insert(scored.label.as_str()) {
                return Err(format!("duplicate label '{}'", scored.label));
            }
            if !(0.0..=1.0).contains(&scored.score) {
                return Err(format!(
                    "score {} for '{}' is outside [0, 1]",
                    scored.score, scored.label
                ));
            }
        }

        if self.labels.windows(2).any(|w| w[0].score < w[1].score) {
            return Err("scores are not sorted in descending order".to_string());
        }
        Ok(())
    }
}
