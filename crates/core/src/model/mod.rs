mod feedback;
mod ids;
mod progress;
mod project;
mod quiz;
mod submission;

pub use feedback::{FeedbackEntry, FeedbackKind};
pub use ids::{
    ConceptId, CourseId, FeedbackId, LessonId, PartId, SubmissionId, UserId,
};
pub use progress::{ConceptProgress, CourseProgress, LessonProgress};
pub use project::{
    AttemptStatus, ParseStatusError, PartProgress, ProjectProgress, SubmissionSummary,
    MAX_PART_SUBMISSIONS,
};
pub use quiz::{QuizAttempt, QuizError};
pub use submission::{SubmissionDocument, SubmissionReview, REVIEWED};
