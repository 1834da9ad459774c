use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use course_core::model::{ConceptId, CourseId, FeedbackId, FeedbackKind, LessonId, PartId};

use crate::error::AnalyticsError;

//
// ─── EVENTS ────────────────────────────────────────────────────────────────────
//

/// One analytics event per handler write, matching the event names and
/// payloads the platform's dashboards already consume.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsEvent {
    CourseStarted {
        course: CourseId,
    },
    LessonStarted {
        course: CourseId,
        lesson: LessonId,
    },
    LessonCompleted {
        course: CourseId,
        lesson: LessonId,
    },
    ConceptStarted {
        course: CourseId,
        lesson: LessonId,
        concept: ConceptId,
    },
    ConceptCompleted {
        course: CourseId,
        lesson: LessonId,
        concept: ConceptId,
    },
    QuizCompleted {
        course: CourseId,
        lesson: LessonId,
        concept: ConceptId,
        percentage: f64,
        questions: u32,
        correct: u32,
    },
    ProjectStarted {
        course: CourseId,
    },
    ProjectPartStarted {
        course: CourseId,
        part: PartId,
    },
    ProjectSubmissionCreated {
        course: CourseId,
        part: PartId,
        attempt: u32,
    },
    ProjectSubmissionReviewed {
        course: CourseId,
        part: PartId,
        attempt: u32,
    },
    FeedbackCreated {
        course: CourseId,
        feedback: FeedbackId,
        kind: FeedbackKind,
    },
}

impl AnalyticsEvent {
    /// Wire name of the event.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            AnalyticsEvent::CourseStarted { .. } => "course_started",
            AnalyticsEvent::LessonStarted { .. } => "lesson_started",
            AnalyticsEvent::LessonCompleted { .. } => "lesson_completed",
            AnalyticsEvent::ConceptStarted { .. } => "concept_started",
            AnalyticsEvent::ConceptCompleted { .. } => "concept_completed",
            AnalyticsEvent::QuizCompleted { .. } => "quiz_completed",
            AnalyticsEvent::ProjectStarted { .. } => "project_started",
            AnalyticsEvent::ProjectPartStarted { .. } => "project_part_started",
            AnalyticsEvent::ProjectSubmissionCreated { .. } => "project_submission_created",
            AnalyticsEvent::ProjectSubmissionReviewed { .. } => "project_submission_reviewed",
            AnalyticsEvent::FeedbackCreated { .. } => "feedback_created",
        }
    }

    /// Event parameters as a JSON object.
    #[must_use]
    pub fn params(&self) -> Value {
        match self {
            AnalyticsEvent::CourseStarted { course }
            | AnalyticsEvent::ProjectStarted { course } => json!({ "course": course }),
            AnalyticsEvent::LessonStarted { course, lesson }
            | AnalyticsEvent::LessonCompleted { course, lesson } => {
                json!({ "course": course, "lesson": lesson })
            }
            AnalyticsEvent::ConceptStarted {
                course,
                lesson,
                concept,
            }
            | AnalyticsEvent::ConceptCompleted {
                course,
                lesson,
                concept,
            } => json!({ "course": course, "lesson": lesson, "concept": concept }),
            AnalyticsEvent::QuizCompleted {
                course,
                lesson,
                concept,
                percentage,
                questions,
                correct,
            } => json!({
                "course": course,
                "lesson": lesson,
                "concept": concept,
                "percentage": percentage,
                "questions": questions,
                "correct": correct,
            }),
            AnalyticsEvent::ProjectPartStarted { course, part } => {
                json!({ "course": course, "part": part })
            }
            AnalyticsEvent::ProjectSubmissionCreated {
                course,
                part,
                attempt,
            }
            | AnalyticsEvent::ProjectSubmissionReviewed {
                course,
                part,
                attempt,
            } => json!({ "course": course, "part": part, "attempt": attempt }),
            AnalyticsEvent::FeedbackCreated {
                course,
                feedback,
                kind,
            } => json!({ "course": course, "feedback": feedback, "type": kind }),
        }
    }
}

//
// ─── SINKS ─────────────────────────────────────────────────────────────────────
//

/// Destination for analytics events.
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    /// Deliver one event.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError` if delivery fails.
    async fn record(&self, event: &AnalyticsEvent) -> Result<(), AnalyticsError>;
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

#[async_trait]
impl AnalyticsSink for NoopSink {
    async fn record(&self, _event: &AnalyticsEvent) -> Result<(), AnalyticsError> {
        Ok(())
    }
}

/// Sink that keeps events in memory, for tests.
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<AnalyticsEvent>>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Sink` if the inner lock is poisoned.
    pub fn events(&self) -> Result<Vec<AnalyticsEvent>, AnalyticsError> {
        let guard = self
            .events
            .lock()
            .map_err(|e| AnalyticsError::Sink(e.to_string()))?;
        Ok(guard.clone())
    }

    /// Names of recorded events, in order.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Sink` if the inner lock is poisoned.
    pub fn event_names(&self) -> Result<Vec<&'static str>, AnalyticsError> {
        Ok(self.events()?.iter().map(AnalyticsEvent::name).collect())
    }
}

#[async_trait]
impl AnalyticsSink for RecordingSink {
    async fn record(&self, event: &AnalyticsEvent) -> Result<(), AnalyticsError> {
        let mut guard = self
            .events
            .lock()
            .map_err(|e| AnalyticsError::Sink(e.to_string()))?;
        guard.push(event.clone());
        Ok(())
    }
}

/// Deliver an event, logging instead of failing when the sink errors.
///
/// Analytics is fire-and-forget here: a dead collector must never abort the
/// progress write it rides along with.
pub(crate) async fn emit(sink: &dyn AnalyticsSink, event: AnalyticsEvent) {
    tracing::debug!(event = event.name(), "analytics event");
    if let Err(err) = sink.record(&event).await {
        tracing::warn!(event = event.name(), error = %err, "analytics delivery failed");
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
