// src/error.rs
//! Error taxonomy shared by every pipeline operation.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// A batch record is missing the comment field or the document cannot be read.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// The sentiment backend failed, timed out or answered with an unknown label.
    #[error("Classification unavailable: {0}")]
    ClassificationUnavailable(String),

    /// The summarization backend failed, timed out or produced nothing.
    #[error("Summarization unavailable: {0}")]
    SummarizationUnavailable(String),

    /// Raised only by ad-hoc validation of a blank comment.
    #[error("Empty input: nothing to analyze")]
    EmptyInput,
}

impl PipelineError {
    /// Stable snake_case code used in JSON error bodies and metric labels.
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::MalformedInput(_) => "malformed_input",
            PipelineError::ClassificationUnavailable(_) => "classification_unavailable",
            PipelineError::SummarizationUnavailable(_) => "summarization_unavailable",
            PipelineError::EmptyInput => "empty_input",
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_detail() {
        let e = PipelineError::MalformedInput("record 2: missing `comentario`".into());
        assert_eq!(
            e.to_string(),
            "Malformed input: record 2: missing `comentario`"
        );
        assert_eq!(e.code(), "malformed_input");
    }
}
