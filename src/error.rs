use thiserror::Error;

/// Failures that abort a pipeline run. Nothing is written when one of these
/// surfaces.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Schema mismatch in {relation}.{column}: {detail}")]
    SchemaMismatch {
        relation: String,
        column: String,
        detail: String,
    },

    #[error("Duplicate key {key} in {relation}")]
    DuplicateKey { relation: String, key: i64 },

    #[error("Arithmetic edge case in {relation} for id {id}: {detail}")]
    ArithmeticEdgeCase {
        relation: String,
        id: i64,
        detail: String,
    },

    #[error("Unknown stage: {0}")]
    UnknownStage(String),

    #[error("Circular dependency detected at: {0}")]
    CircularDependency(String),
}

impl PipelineError {
    pub fn schema(
        relation: impl Into<String>,
        column: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        PipelineError::SchemaMismatch {
            relation: relation.into(),
            column: column.into(),
            detail: detail.into(),
        }
    }

    pub fn arithmetic(relation: impl Into<String>, id: i64, detail: impl Into<String>) -> Self {
        PipelineError::ArithmeticEdgeCase {
            relation: relation.into(),
            id,
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
