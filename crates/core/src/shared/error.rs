use std::path::PathBuf;

use thiserror::Error;

/// Error type returned across collaborator ports.
///
/// Must be `Send + Sync` so task outcomes can cross thread boundaries.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("classifier broke its contract for labels {labels:?}: {reason}")]
    InvalidClassification { labels: Vec<String>, reason: String },
    #[error("every collaborator call failed for conversation {conversation_id}: {first_error}")]
    AllCollaboratorsFailed {
        conversation_id: String,
        first_error: String,
    },
    #[error("invalid extraction config: {0}")]
    Config(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
