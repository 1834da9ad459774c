use serde::{Deserialize, Serialize};
use std::fmt;

/// What the feedback is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    Concept,
    Lesson,
    Project,
}

impl fmt::Display for FeedbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackKind::Concept => write!(f, "concept"),
            FeedbackKind::Lesson => write!(f, "lesson"),
            FeedbackKind::Project => write!(f, "project"),
        }
    }
}

/// A learner's rating (and optional free-text comment) on a piece of course
/// material, stored in the course's `feedback` subcollection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub value: i32,
    pub feedback: Option<String>,
    #[serde(rename = "type")]
    pub kind: FeedbackKind,
}
