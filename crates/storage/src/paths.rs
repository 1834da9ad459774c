use std::fmt;

use course_core::model::{CourseId, FeedbackId, SubmissionId, UserId};

/// Slash-joined path of a document in the store, e.g.
/// `users/ada/courses/privacy-101`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocPath(String);

impl DocPath {
    /// Build a path from its segments.
    ///
    /// Segments are joined verbatim; callers pass IDs, not slashes.
    #[must_use]
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = segments
            .into_iter()
            .map(|s| s.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join("/");
        Self(joined)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `users/{user}`
#[must_use]
pub fn user_doc(user: &UserId) -> DocPath {
    DocPath::new(["users", user.as_str()])
}

/// `users/{user}/courses/{course}` — the progress snapshot document.
#[must_use]
pub fn course_doc(user: &UserId, course: &CourseId) -> DocPath {
    DocPath::new(["users", user.as_str(), "courses", course.as_str()])
}

/// `users/{user}/courses/{course}/submissions/{submission}`
#[must_use]
pub fn submission_doc(user: &UserId, course: &CourseId, submission: &SubmissionId) -> DocPath {
    DocPath::new([
        "users",
        user.as_str(),
        "courses",
        course.as_str(),
        "submissions",
        submission.as_str(),
    ])
}

/// `users/{user}/courses/{course}/feedback/{feedback}`
#[must_use]
pub fn feedback_doc(user: &UserId, course: &CourseId, feedback: &FeedbackId) -> DocPath {
    DocPath::new([
        "users",
        user.as_str(),
        "courses",
        course.as_str(),
        "feedback",
        feedback.as_str(),
    ])
}

/// `users/{mentor}/reviews/{submission}` — the mentor's review ledger.
#[must_use]
pub fn mentor_review_doc(mentor: &UserId, submission: &SubmissionId) -> DocPath {
    DocPath::new(["users", mentor.as_str(), "reviews", submission.as_str()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_doc_path_layout() {
        let path = course_doc(&UserId::new("ada"), &CourseId::new("privacy-101"));
        assert_eq!(path.as_str(), "users/ada/courses/privacy-101");
    }

    #[test]
    fn submission_doc_path_layout() {
        let path = submission_doc(
            &UserId::new("ada"),
            &CourseId::new("privacy-101"),
            &SubmissionId::new("s1"),
        );
        assert_eq!(
            path.as_str(),
            "users/ada/courses/privacy-101/submissions/s1"
        );
    }

    #[test]
    fn mentor_review_path_lives_under_mentor() {
        let path = mentor_review_doc(&UserId::new("grace"), &SubmissionId::new("s1"));
        assert_eq!(path.as_str(), "users/grace/reviews/s1");
    }
}
