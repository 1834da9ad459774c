//! Shared error types for the services crate.

use thiserror::Error;

use course_core::model::{ConceptId, LessonId, PartId, QuizError};
use storage::document::StoreError;

/// Errors emitted by analytics sinks.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnalyticsError {
    #[error("analytics collector returned status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("sink error: {0}")]
    Sink(String),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error("lesson {0} is not in the progress snapshot")]
    UnknownLesson(LessonId),
    #[error("concept {0} is not in the progress snapshot")]
    UnknownConcept(ConceptId),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Storage(#[from] StoreError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors emitted by `ProjectService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProjectServiceError {
    #[error("project part {0} is not in the progress snapshot")]
    UnknownPart(PartId),
    #[error("attempt {attempt} is out of range ({submissions} submissions recorded)")]
    AttemptOutOfRange { attempt: u32, submissions: usize },
    #[error(transparent)]
    Storage(#[from] StoreError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors emitted by `FeedbackService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FeedbackServiceError {
    #[error(transparent)]
    Storage(#[from] StoreError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
