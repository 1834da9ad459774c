use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{CourseId, PartId, SubmissionId, UserId};
use crate::model::project::AttemptStatus;

/// Status written to the mentor's review ledger once a review lands.
pub const REVIEWED: &str = "reviewed";

/// The full submission document stored in the course's `submissions`
/// subcollection.
///
/// Unlike the progress snapshot, this document is written whole, so the
/// review fields serialize as explicit nulls until a mentor fills them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionDocument {
    pub id: SubmissionId,
    pub course: CourseId,
    pub part: PartId,
    pub attempt: u32,
    /// Store path of the submitting learner's user document.
    pub student: String,
    pub submitted_at: DateTime<Utc>,
    pub submission_content: String,
    pub mentor: Option<UserId>,
    pub status: Option<AttemptStatus>,
    pub review_content: Option<String>,
    pub review_started_at: Option<DateTime<Utc>>,
    pub review_ended_at: Option<DateTime<Utc>>,
}

impl SubmissionDocument {
    /// A brand-new submission with every review field unset.
    #[must_use]
    pub fn new(
        id: SubmissionId,
        course: CourseId,
        part: PartId,
        attempt: u32,
        student: impl Into<String>,
        submitted_at: DateTime<Utc>,
        submission_content: impl Into<String>,
    ) -> Self {
        Self {
            id,
            course,
            part,
            attempt,
            student: student.into(),
            submitted_at,
            submission_content: submission_content.into(),
            mentor: None,
            status: None,
            review_content: None,
            review_started_at: None,
            review_ended_at: None,
        }
    }
}

/// Merge payload applied to a submission document when a mentor reviews it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionReview {
    pub status: AttemptStatus,
    pub review_content: String,
    pub review_ended_at: DateTime<Utc>,
}
