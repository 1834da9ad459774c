use std::sync::Arc;

use serde_json::json;

use course_core::model::{
    AttemptStatus, CourseId, CourseProgress, PartId, PartProgress, ProjectProgress,
    SubmissionDocument, SubmissionId, SubmissionReview, SubmissionSummary, UserId, REVIEWED,
};
use course_core::Clock;
use storage::document::DocumentStore;
use storage::patch::Patch;
use storage::paths;

use crate::analytics::{emit, AnalyticsEvent, AnalyticsSink};
use crate::error::ProjectServiceError;

/// Records project-part progress, learner submissions, and mentor reviews.
#[derive(Clone)]
pub struct ProjectService {
    clock: Clock,
    store: Arc<dyn DocumentStore>,
    analytics: Arc<dyn AnalyticsSink>,
}

impl ProjectService {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, analytics: Arc<dyn AnalyticsSink>) -> Self {
        Self {
            clock: Clock::default(),
            store,
            analytics,
        }
    }

    /// Override the clock (usually for deterministic testing).
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Record that the learner opened a project part.
    ///
    /// Stamps the project start on first contact, then (re)creates the part
    /// slot with a fresh start time and empty submissions list, and
    /// merge-writes the full snapshot. Always writes.
    ///
    /// # Errors
    ///
    /// Returns storage or serialization errors from the write.
    pub async fn part_begun(
        &self,
        user: &UserId,
        course: &CourseId,
        progress: &mut CourseProgress,
        part: &PartId,
    ) -> Result<(), ProjectServiceError> {
        let now = self.clock.now();

        if !progress.has_started_project() {
            emit(
                self.analytics.as_ref(),
                AnalyticsEvent::ProjectStarted {
                    course: course.clone(),
                },
            )
            .await;

            progress.project = Some(ProjectProgress::begun_at(now));
        }

        emit(
            self.analytics.as_ref(),
            AnalyticsEvent::ProjectPartStarted {
                course: course.clone(),
                part: part.clone(),
            },
        )
        .await;

        progress
            .project
            .get_or_insert_with(ProjectProgress::default)
            .parts
            .insert(part.clone(), PartProgress::begun_at(now));

        let patch = Patch::from_document(serde_json::to_value(&*progress)?);
        self.store
            .merge(&paths::course_doc(user, course), patch)
            .await?;
        Ok(())
    }

    /// Record a learner's submission against a project part.
    ///
    /// Refused (returning `None`) once the part has used up its submission
    /// allowance. Otherwise allocates a submission ID, writes the full
    /// submission document to the subcollection, and array-unions a summary
    /// onto the part's `submissions`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownPart` if the part is not in the snapshot, or
    /// storage/serialization errors from the writes.
    pub async fn submit_attempt(
        &self,
        user: &UserId,
        course: &CourseId,
        progress: &CourseProgress,
        part: &PartId,
        content: &str,
    ) -> Result<Option<SubmissionId>, ProjectServiceError> {
        let part_progress = progress
            .part(part)
            .ok_or_else(|| ProjectServiceError::UnknownPart(part.clone()))?;

        if !part_progress.can_submit() {
            tracing::debug!(%part, "submission allowance used up, refusing submission");
            return Ok(None);
        }
        let attempt = part_progress.next_attempt();

        emit(
            self.analytics.as_ref(),
            AnalyticsEvent::ProjectSubmissionCreated {
                course: course.clone(),
                part: part.clone(),
                attempt,
            },
        )
        .await;

        let now = self.clock.now();
        let submission = SubmissionId::new(self.store.allocate_id().await?);

        let document = SubmissionDocument::new(
            submission.clone(),
            course.clone(),
            part.clone(),
            attempt,
            paths::user_doc(user).as_str(),
            now,
            content,
        );
        self.store
            .set(
                &paths::submission_doc(user, course, &submission),
                serde_json::to_value(&document)?,
            )
            .await?;

        // Summary on the part references the document written above.
        let summary = SubmissionSummary::new(now, submission.clone());
        let patch = Patch::nested(
            ["project", "parts", part.as_str(), "submissions"],
            Patch::array_union(vec![serde_json::to_value(&summary)?]),
        );
        self.store
            .merge(&paths::course_doc(user, course), patch)
            .await?;

        Ok(Some(submission))
    }

    /// Record a mentor's review of a submission.
    ///
    /// Updates the submission document, the matching summary on the student's
    /// part (which also gets stamped complete), and the mentor's review
    /// ledger.
    ///
    /// # Errors
    ///
    /// Returns `UnknownPart` or `AttemptOutOfRange` when the snapshot does not
    /// hold the reviewed attempt, or storage/serialization errors.
    #[allow(clippy::too_many_arguments)]
    pub async fn review_submission(
        &self,
        student: &UserId,
        mentor: &UserId,
        course: &CourseId,
        part: &PartId,
        attempt: u32,
        submission: &SubmissionId,
        status: AttemptStatus,
        progress: &mut CourseProgress,
        content: &str,
    ) -> Result<(), ProjectServiceError> {
        emit(
            self.analytics.as_ref(),
            AnalyticsEvent::ProjectSubmissionReviewed {
                course: course.clone(),
                part: part.clone(),
                attempt,
            },
        )
        .await;

        let now = self.clock.now();

        let review = SubmissionReview {
            status,
            review_content: content.to_owned(),
            review_ended_at: now,
        };
        self.store
            .merge(
                &paths::submission_doc(student, course, submission),
                Patch::from_document(serde_json::to_value(&review)?),
            )
            .await?;

        let part_progress = progress
            .part_mut(part)
            .ok_or_else(|| ProjectServiceError::UnknownPart(part.clone()))?;
        let recorded = part_progress.submissions.len();
        let index = attempt
            .checked_sub(1)
            .ok_or(ProjectServiceError::AttemptOutOfRange {
                attempt,
                submissions: recorded,
            })? as usize;
        let summary = part_progress.submissions.get_mut(index).ok_or(
            ProjectServiceError::AttemptOutOfRange {
                attempt,
                submissions: recorded,
            },
        )?;
        summary.status = Some(status);
        summary.reviewed_at = Some(now);

        let patch = Patch::nested(
            ["project", "parts", part.as_str()],
            Patch::map([
                ("completed_at", Patch::set(serde_json::to_value(now)?)),
                (
                    "submissions",
                    Patch::set(serde_json::to_value(&part_progress.submissions)?),
                ),
            ]),
        );
        self.store
            .merge(&paths::course_doc(student, course), patch)
            .await?;

        self.store
            .merge(
                &paths::mentor_review_doc(mentor, submission),
                Patch::map([
                    ("status", Patch::set(json!(REVIEWED))),
                    ("completed_at", Patch::set(serde_json::to_value(now)?)),
                ]),
            )
            .await?;

        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use course_core::model::MAX_PART_SUBMISSIONS;
    use course_core::time::{fixed_clock, fixed_now};
    use storage::document::InMemoryStore;

    use crate::analytics::RecordingSink;

    fn service(store: &InMemoryStore, sink: &RecordingSink) -> ProjectService {
        ProjectService::new(Arc::new(store.clone()), Arc::new(sink.clone()))
            .with_clock(fixed_clock())
    }

    fn ids() -> (UserId, CourseId, PartId) {
        (
            UserId::new("ada"),
            CourseId::new("privacy-101"),
            PartId::new("p1"),
        )
    }

    async fn stored_progress(store: &InMemoryStore, user: &UserId, course: &CourseId) -> CourseProgress {
        let value = store
            .get(&paths::course_doc(user, course))
            .await
            .unwrap()
            .expect("course document exists");
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn first_part_begun_stamps_project() {
        let store = InMemoryStore::new();
        let sink = RecordingSink::new();
        let svc = service(&store, &sink);
        let (user, course, part) = ids();

        let mut progress = CourseProgress::default();
        svc.part_begun(&user, &course, &mut progress, &part)
            .await
            .unwrap();

        assert_eq!(
            sink.event_names().unwrap(),
            vec!["project_started", "project_part_started"]
        );

        let stored = stored_progress(&store, &user, &course).await;
        assert!(stored.has_started_project());
        let stored_part = stored.part(&part).expect("part exists");
        assert_eq!(stored_part.started_at, Some(fixed_now()));
        assert!(stored_part.submissions.is_empty());
    }

    #[tokio::test]
    async fn later_part_begun_skips_project_event() {
        let store = InMemoryStore::new();
        let sink = RecordingSink::new();
        let svc = service(&store, &sink);
        let (user, course, part) = ids();
        let second = PartId::new("p2");

        let mut progress = CourseProgress::default();
        svc.part_begun(&user, &course, &mut progress, &part)
            .await
            .unwrap();
        svc.part_begun(&user, &course, &mut progress, &second)
            .await
            .unwrap();

        let names = sink.event_names().unwrap();
        assert_eq!(
            names.iter().filter(|n| **n == "project_started").count(),
            1
        );
        assert_eq!(
            names
                .iter()
                .filter(|n| **n == "project_part_started")
                .count(),
            2
        );

        let stored = stored_progress(&store, &user, &course).await;
        assert!(stored.part(&part).is_some());
        assert!(stored.part(&second).is_some());
    }

    #[tokio::test]
    async fn submit_attempt_writes_document_and_summary() {
        let store = InMemoryStore::new();
        let sink = RecordingSink::new();
        let svc = service(&store, &sink);
        let (user, course, part) = ids();

        let mut progress = CourseProgress::default();
        svc.part_begun(&user, &course, &mut progress, &part)
            .await
            .unwrap();

        let submission = svc
            .submit_attempt(&user, &course, &progress, &part, "my project")
            .await
            .unwrap()
            .expect("submission accepted");

        let doc_value = store
            .get(&paths::submission_doc(&user, &course, &submission))
            .await
            .unwrap()
            .expect("submission document exists");
        let document: SubmissionDocument = serde_json::from_value(doc_value).unwrap();
        assert_eq!(document.attempt, 1);
        assert_eq!(document.submission_content, "my project");
        assert_eq!(document.student, "users/ada");
        assert!(document.status.is_none());

        let stored = stored_progress(&store, &user, &course).await;
        let summaries = &stored.part(&part).unwrap().submissions;
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].submission, submission);
    }

    #[tokio::test]
    async fn submit_attempt_enforces_limit() {
        let store = InMemoryStore::new();
        let sink = RecordingSink::new();
        let svc = service(&store, &sink);
        let (user, course, part) = ids();

        let mut progress = CourseProgress::default();
        svc.part_begun(&user, &course, &mut progress, &part)
            .await
            .unwrap();
        for i in 0..MAX_PART_SUBMISSIONS {
            progress
                .part_mut(&part)
                .unwrap()
                .submissions
                .push(SubmissionSummary::new(
                    fixed_now(),
                    SubmissionId::new(format!("s{i}")),
                ));
        }

        let refused = svc
            .submit_attempt(&user, &course, &progress, &part, "one too many")
            .await
            .unwrap();
        assert!(refused.is_none());
        assert!(!sink
            .event_names()
            .unwrap()
            .contains(&"project_submission_created"));
    }

    #[tokio::test]
    async fn submit_attempt_requires_known_part() {
        let store = InMemoryStore::new();
        let sink = RecordingSink::new();
        let svc = service(&store, &sink);
        let (user, course, part) = ids();

        let progress = CourseProgress::default();
        let err = svc
            .submit_attempt(&user, &course, &progress, &part, "early")
            .await
            .unwrap_err();
        assert!(matches!(err, ProjectServiceError::UnknownPart(_)));
    }

    #[tokio::test]
    async fn review_updates_submission_part_and_ledger() {
        let store = InMemoryStore::new();
        let sink = RecordingSink::new();
        let svc = service(&store, &sink);
        let (student, course, part) = ids();
        let mentor = UserId::new("grace");

        let mut progress = CourseProgress::default();
        svc.part_begun(&student, &course, &mut progress, &part)
            .await
            .unwrap();
        let submission = svc
            .submit_attempt(&student, &course, &progress, &part, "my project")
            .await
            .unwrap()
            .unwrap();
        // mirror the store-side summary the submission created
        progress
            .part_mut(&part)
            .unwrap()
            .submissions
            .push(SubmissionSummary::new(fixed_now(), submission.clone()));

        svc.review_submission(
            &student,
            &mentor,
            &course,
            &part,
            1,
            &submission,
            AttemptStatus::Passed,
            &mut progress,
            "well done",
        )
        .await
        .unwrap();

        let doc_value = store
            .get(&paths::submission_doc(&student, &course, &submission))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc_value["status"], "passed");
        assert_eq!(doc_value["review_content"], "well done");
        assert_eq!(doc_value["submission_content"], "my project");

        let stored = stored_progress(&store, &student, &course).await;
        let stored_part = stored.part(&part).unwrap();
        assert!(stored_part.completed_at.is_some());
        assert_eq!(
            stored_part.submissions[0].status,
            Some(AttemptStatus::Passed)
        );

        let ledger = store
            .get(&paths::mentor_review_doc(&mentor, &submission))
            .await
            .unwrap()
            .expect("ledger entry exists");
        assert_eq!(ledger["status"], "reviewed");
        assert!(sink
            .event_names()
            .unwrap()
            .contains(&"project_submission_reviewed"));
    }

    #[tokio::test]
    async fn review_rejects_out_of_range_attempt() {
        let store = InMemoryStore::new();
        let sink = RecordingSink::new();
        let svc = service(&store, &sink);
        let (student, course, part) = ids();
        let mentor = UserId::new("grace");

        let mut progress = CourseProgress::default();
        svc.part_begun(&student, &course, &mut progress, &part)
            .await
            .unwrap();

        let err = svc
            .review_submission(
                &student,
                &mentor,
                &course,
                &part,
                2,
                &SubmissionId::new("missing"),
                AttemptStatus::Failed,
                &mut progress,
                "??",
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProjectServiceError::AttemptOutOfRange { attempt: 2, .. }
        ));
    }
}
