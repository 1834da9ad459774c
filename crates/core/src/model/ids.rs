use serde::{Deserialize, Serialize};
use std::fmt;

/// Declares a string-backed identifier newtype.
///
/// The document store keys everything by opaque string IDs, so all of these
/// share the same shape: transparent serde, ordered for use as map keys.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the underlying string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Unique identifier for a user (learner or mentor).
    UserId
);
string_id!(
    /// Unique identifier for a course.
    CourseId
);
string_id!(
    /// Unique identifier for a lesson within a course.
    LessonId
);
string_id!(
    /// Unique identifier for a concept within a lesson.
    ConceptId
);
string_id!(
    /// Unique identifier for a project part.
    PartId
);
string_id!(
    /// Unique identifier for a submission document.
    SubmissionId
);
string_id!(
    /// Unique identifier for a feedback document.
    FeedbackId
);
