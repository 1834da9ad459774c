use std::sync::Arc;

use course_core::model::{CourseId, FeedbackEntry, FeedbackId, FeedbackKind, UserId};
use storage::document::DocumentStore;
use storage::patch::Patch;
use storage::paths;

use crate::analytics::{emit, AnalyticsEvent, AnalyticsSink};
use crate::error::FeedbackServiceError;

/// Records learner feedback on course material.
#[derive(Clone)]
pub struct FeedbackService {
    store: Arc<dyn DocumentStore>,
    analytics: Arc<dyn AnalyticsSink>,
}

impl FeedbackService {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, analytics: Arc<dyn AnalyticsSink>) -> Self {
        Self { store, analytics }
    }

    /// Record a rating (and optional comment) against a feedback document.
    ///
    /// Repeated calls for the same feedback ID overwrite the previous rating;
    /// there is no idempotency guard here.
    ///
    /// # Errors
    ///
    /// Returns storage or serialization errors from the write.
    pub async fn provide(
        &self,
        user: &UserId,
        course: &CourseId,
        feedback_id: &FeedbackId,
        value: i32,
        feedback: Option<String>,
        kind: FeedbackKind,
    ) -> Result<(), FeedbackServiceError> {
        emit(
            self.analytics.as_ref(),
            AnalyticsEvent::FeedbackCreated {
                course: course.clone(),
                feedback: feedback_id.clone(),
                kind,
            },
        )
        .await;

        let entry = FeedbackEntry {
            value,
            feedback,
            kind,
        };
        self.store
            .merge(
                &paths::feedback_doc(user, course, feedback_id),
                Patch::from_document(serde_json::to_value(&entry)?),
            )
            .await?;
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
