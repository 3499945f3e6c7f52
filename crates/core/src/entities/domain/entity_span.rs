#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityLabel {
    /// A calendar year or date expression.
    Date,
    /// A bare number with no unit.
    Cardinal,
    /// A number with a measurement unit.
    Quantity,
}

/// A recognized entity; `start`/`end` are byte offsets into the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySpan {
    pub text: String,
    pub label: EntityLabel,
    pub start: usize,
    pub end: usize,
}

impl EntitySpan {
    pub fn new(text: impl Into<String>, label: EntityLabel, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            label,
            start,
            end,
        }
    }

    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && start < self.end
    }
}
