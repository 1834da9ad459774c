use std::sync::Arc;

use course_core::model::{
    ConceptId, ConceptProgress, CourseId, CourseProgress, LessonId, LessonProgress, QuizAttempt,
    UserId,
};
use course_core::Clock;
use storage::document::DocumentStore;
use storage::patch::Patch;
use storage::paths;

use crate::analytics::{emit, AnalyticsEvent, AnalyticsSink};
use crate::error::ProgressServiceError;

/// What a lesson-start call actually stamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonStart {
    pub course_started: bool,
    pub lesson_started: bool,
}

/// Records lesson, concept, and quiz progress against the course document.
///
/// Every operation is the same shape: an idempotency predicate over the
/// caller's progress snapshot, an analytics event, and a merge-write.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    store: Arc<dyn DocumentStore>,
    analytics: Arc<dyn AnalyticsSink>,
}

impl ProgressService {
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

    /// Record that the learner opened a concept.
    ///
    /// No-op when the concept already has a start timestamp. Otherwise stamps
    /// the concept on the snapshot and merge-writes the full snapshot.
    /// Returns whether a write happened.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::UnknownLesson` if the lesson is not in
    /// the snapshot, or storage/serialization errors from the write.
    pub async fn concept_started(
        &self,
        user: &UserId,
        course: &CourseId,
        progress: &mut CourseProgress,
        lesson: &LessonId,
        concept: &ConceptId,
    ) -> Result<bool, ProgressServiceError> {
        if progress.has_started_concept(lesson, concept) {
            tracing::debug!(%lesson, %concept, "concept already started, skipping write");
            return Ok(false);
        }

        emit(
            self.analytics.as_ref(),
            AnalyticsEvent::ConceptStarted {
                course: course.clone(),
                lesson: lesson.clone(),
                concept: concept.clone(),
            },
        )
        .await;

        let now = self.clock.now();
        progress
            .lesson_mut(lesson)
            .ok_or_else(|| ProgressServiceError::UnknownLesson(lesson.clone()))?
            .concepts
            .insert(concept.clone(), ConceptProgress::started_at(now));

        let patch = Patch::from_document(serde_json::to_value(&*progress)?);
        self.store
            .merge(&paths::course_doc(user, course), patch)
            .await?;
        Ok(true)
    }

    /// Record that the learner finished a concept.
    ///
    /// No-op when the concept already has a completion timestamp. Writes a
    /// minimal nested patch; the snapshot itself is left untouched.
    ///
    /// # Errors
    ///
    /// Returns storage or serialization errors from the write.
    pub async fn concept_completed(
        &self,
        user: &UserId,
        course: &CourseId,
        progress: &CourseProgress,
        lesson: &LessonId,
        concept: &ConceptId,
    ) -> Result<bool, ProgressServiceError> {
        if progress.has_completed_concept(lesson, concept) {
            return Ok(false);
        }

        emit(
            self.analytics.as_ref(),
            AnalyticsEvent::ConceptCompleted {
                course: course.clone(),
                lesson: lesson.clone(),
                concept: concept.clone(),
            },
        )
        .await;

        let now = self.clock.now();
        let patch = Patch::nested(
            [
                "lessons",
                lesson.as_str(),
                "concepts",
                concept.as_str(),
                "completed_at",
            ],
            Patch::set(serde_json::to_value(now)?),
        );
        self.store
            .merge(&paths::course_doc(user, course), patch)
            .await?;
        Ok(true)
    }

    /// Record a finished quiz attempt on a concept.
    ///
    /// The guard is count-based: nothing is written unless the store holds
    /// fewer attempts than the caller says the learner has taken, so a replayed
    /// request cannot duplicate an attempt. Returns the stored attempt, or
    /// `None` when the guard suppressed the write.
    ///
    /// # Errors
    ///
    /// Returns `UnknownLesson`/`UnknownConcept` for missing snapshot slots,
    /// `Quiz` for an impossible score, or storage/serialization errors.
    pub async fn quiz_finished(
        &self,
        user: &UserId,
        course: &CourseId,
        progress: &CourseProgress,
        lesson: &LessonId,
        concept: &ConceptId,
        num_quizzes: usize,
        correct: u32,
        questions: u32,
    ) -> Result<Option<QuizAttempt>, ProgressServiceError> {
        let lesson_progress = progress
            .lesson(lesson)
            .ok_or_else(|| ProgressServiceError::UnknownLesson(lesson.clone()))?;
        let concept_progress = lesson_progress
            .concepts
            .get(concept)
            .ok_or_else(|| ProgressServiceError::UnknownConcept(concept.clone()))?;

        if concept_progress.quizzes.len() >= num_quizzes {
            tracing::debug!(%lesson, %concept, "quiz attempt already recorded, skipping write");
            return Ok(None);
        }

        let attempt = QuizAttempt::score(correct, questions)?;
        emit(
            self.analytics.as_ref(),
            AnalyticsEvent::QuizCompleted {
                course: course.clone(),
                lesson: lesson.clone(),
                concept: concept.clone(),
                percentage: attempt.percentage,
                questions,
                correct,
            },
        )
        .await;

        let patch = Patch::nested(
            ["lessons", lesson.as_str(), "concepts", concept.as_str(), "quizzes"],
            Patch::array_union(vec![serde_json::to_value(&attempt)?]),
        );
        self.store
            .merge(&paths::course_doc(user, course), patch)
            .await?;
        Ok(Some(attempt))
    }

    /// Record that the learner opened a lesson.
    ///
    /// Stamps the course start the first time any lesson is opened and the
    /// lesson start the first time this lesson is opened, then merge-writes
    /// the full snapshot. Unlike the other operations this always writes.
    ///
    /// # Errors
    ///
    /// Returns storage or serialization errors from the write.
    pub async fn lesson_started(
        &self,
        user: &UserId,
        course: &CourseId,
        progress: &mut CourseProgress,
        lesson: &LessonId,
    ) -> Result<LessonStart, ProgressServiceError> {
        let course_started = !progress.has_started();
        let lesson_started = !progress.has_started_lesson(lesson);
        let now = self.clock.now();

        if course_started {
            emit(
                self.analytics.as_ref(),
                AnalyticsEvent::CourseStarted {
                    course: course.clone(),
                },
            )
            .await;

            progress.started_at = Some(now);
            progress.lessons.clear();
        }

        if lesson_started {
            emit(
                self.analytics.as_ref(),
                AnalyticsEvent::LessonStarted {
                    course: course.clone(),
                    lesson: lesson.clone(),
                },
            )
            .await;

            progress
                .lessons
                .insert(lesson.clone(), LessonProgress::started_at(now));
        }

        let patch = Patch::from_document(serde_json::to_value(&*progress)?);
        self.store
            .merge(&paths::course_doc(user, course), patch)
            .await?;

        Ok(LessonStart {
            course_started,
            lesson_started,
        })
    }

    /// Record that the learner finished a lesson.
    ///
    /// No-op when the lesson already has a completion timestamp. Writes a
    /// minimal nested patch.
    ///
    /// # Errors
    ///
    /// Returns storage or serialization errors from the write.
    pub async fn lesson_completed(
        &self,
        user: &UserId,
        course: &CourseId,
        progress: &CourseProgress,
        lesson: &LessonId,
    ) -> Result<bool, ProgressServiceError> {
        if progress.has_completed_lesson(lesson) {
            return Ok(false);
        }

        emit(
            self.analytics.as_ref(),
            AnalyticsEvent::LessonCompleted {
                course: course.clone(),
                lesson: lesson.clone(),
            },
        )
        .await;

        let now = self.clock.now();
        let patch = Patch::nested(
            ["lessons", lesson.as_str(), "completed_at"],
            Patch::set(serde_json::to_value(now)?),
        );
        self.store
            .merge(&paths::course_doc(user, course), patch)
            .await?;
        Ok(true)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
