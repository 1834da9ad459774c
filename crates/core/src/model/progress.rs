use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{ConceptId, LessonId, PartId};
use crate::model::project::{PartProgress, ProjectProgress};
use crate::model::quiz::QuizAttempt;

//
// ─── SNAPSHOT SHAPE ────────────────────────────────────────────────────────────
//

/// Progress on a single concept within a lesson.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConceptProgress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quizzes: Vec<QuizAttempt>,
}

impl ConceptProgress {
    /// A concept the learner has just opened.
    #[must_use]
    pub fn started_at(at: DateTime<Utc>) -> Self {
        Self {
            started_at: Some(at),
            completed_at: None,
            quizzes: Vec::new(),
        }
    }
}

/// Progress on a single lesson.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LessonProgress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub concepts: BTreeMap<ConceptId, ConceptProgress>,
}

impl LessonProgress {
    /// A lesson the learner has just opened, with an empty concept map.
    #[must_use]
    pub fn started_at(at: DateTime<Utc>) -> Self {
        Self {
            started_at: Some(at),
            completed_at: None,
            concepts: BTreeMap::new(),
        }
    }
}

/// The learner's progress snapshot for one course, mirroring the course
/// document in the store. Fields left unset are omitted on serialization so a
/// merge-write never nulls out what the store already holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseProgress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub lessons: BTreeMap<LessonId, LessonProgress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectProgress>,
}

//
// ─── PREDICATES & ACCESSORS ────────────────────────────────────────────────────
//

impl CourseProgress {
    /// Has the learner started this course at all.
    #[must_use]
    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    #[must_use]
    pub fn has_started_lesson(&self, lesson: &LessonId) -> bool {
        self.lesson(lesson).is_some_and(|l| l.started_at.is_some())
    }

    #[must_use]
    pub fn has_completed_lesson(&self, lesson: &LessonId) -> bool {
        self.lesson(lesson).is_some_and(|l| l.completed_at.is_some())
    }

    #[must_use]
    pub fn has_started_concept(&self, lesson: &LessonId, concept: &ConceptId) -> bool {
        self.concept(lesson, concept)
            .is_some_and(|c| c.started_at.is_some())
    }

    #[must_use]
    pub fn has_completed_concept(&self, lesson: &LessonId, concept: &ConceptId) -> bool {
        self.concept(lesson, concept)
            .is_some_and(|c| c.completed_at.is_some())
    }

    #[must_use]
    pub fn has_started_project(&self) -> bool {
        self.project
            .as_ref()
            .is_some_and(|p| p.started_at.is_some())
    }

    #[must_use]
    pub fn lesson(&self, lesson: &LessonId) -> Option<&LessonProgress> {
        self.lessons.get(lesson)
    }

    #[must_use]
    pub fn lesson_mut(&mut self, lesson: &LessonId) -> Option<&mut LessonProgress> {
        self.lessons.get_mut(lesson)
    }

    #[must_use]
    pub fn concept(&self, lesson: &LessonId, concept: &ConceptId) -> Option<&ConceptProgress> {
        self.lesson(lesson).and_then(|l| l.concepts.get(concept))
    }

    #[must_use]
    pub fn concept_mut(
        &mut self,
        lesson: &LessonId,
        concept: &ConceptId,
    ) -> Option<&mut ConceptProgress> {
        self.lesson_mut(lesson)
            .and_then(|l| l.concepts.get_mut(concept))
    }

    /// Number of quiz attempts stored for a concept; zero when the concept is
    /// missing or has no quizzes yet.
    #[must_use]
    pub fn quiz_attempts(&self, lesson: &LessonId, concept: &ConceptId) -> usize {
        self.concept(lesson, concept)
            .map_or(0, |c| c.quizzes.len())
    }

    #[must_use]
    pub fn part(&self, part: &PartId) -> Option<&PartProgress> {
        self.project.as_ref().and_then(|p| p.parts.get(part))
    }

    #[must_use]
    pub fn part_mut(&mut self, part: &PartId) -> Option<&mut PartProgress> {
        self.project.as_mut().and_then(|p| p.parts.get_mut(part))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn snapshot_with_lesson(lesson: &LessonId) -> CourseProgress {
        let mut progress = CourseProgress {
            started_at: Some(fixed_now()),
            ..CourseProgress::default()
        };
        progress
            .lessons
            .insert(lesson.clone(), LessonProgress::started_at(fixed_now()));
        progress
    }

    #[test]
    fn fresh_snapshot_has_nothing_started() {
        let progress = CourseProgress::default();
        let lesson = LessonId::new("l1");
        let concept = ConceptId::new("c1");

        assert!(!progress.has_started());
        assert!(!progress.has_started_lesson(&lesson));
        assert!(!progress.has_completed_lesson(&lesson));
        assert!(!progress.has_started_concept(&lesson, &concept));
        assert!(!progress.has_completed_concept(&lesson, &concept));
        assert!(!progress.has_started_project());
        assert_eq!(progress.quiz_attempts(&lesson, &concept), 0);
    }

    #[test]
    fn started_lesson_is_not_completed() {
        let lesson = LessonId::new("l1");
        let progress = snapshot_with_lesson(&lesson);

        assert!(progress.has_started());
        assert!(progress.has_started_lesson(&lesson));
        assert!(!progress.has_completed_lesson(&lesson));
    }

    #[test]
    fn concept_predicates_track_timestamps() {
        let lesson = LessonId::new("l1");
        let concept = ConceptId::new("c1");
        let mut progress = snapshot_with_lesson(&lesson);

        progress
            .lesson_mut(&lesson)
            .unwrap()
            .concepts
            .insert(concept.clone(), ConceptProgress::started_at(fixed_now()));
        assert!(progress.has_started_concept(&lesson, &concept));
        assert!(!progress.has_completed_concept(&lesson, &concept));

        progress.concept_mut(&lesson, &concept).unwrap().completed_at = Some(fixed_now());
        assert!(progress.has_completed_concept(&lesson, &concept));
    }

    #[test]
    fn quiz_attempts_counts_stored_quizzes() {
        let lesson = LessonId::new("l1");
        let concept = ConceptId::new("c1");
        let mut progress = snapshot_with_lesson(&lesson);
        progress
            .lesson_mut(&lesson)
            .unwrap()
            .concepts
            .insert(concept.clone(), ConceptProgress::started_at(fixed_now()));

        progress
            .concept_mut(&lesson, &concept)
            .unwrap()
            .quizzes
            .push(QuizAttempt::score(2, 4).unwrap());

        assert_eq!(progress.quiz_attempts(&lesson, &concept), 1);
    }

    #[test]
    fn unset_timestamps_are_omitted_from_json() {
        let lesson = LessonId::new("l1");
        let progress = snapshot_with_lesson(&lesson);
        let value = serde_json::to_value(&progress).unwrap();

        let obj = value.as_object().unwrap();
        assert!(obj.contains_key("started_at"));
        assert!(!obj.contains_key("completed_at"));
        assert!(!obj.contains_key("project"));

        let lesson_obj = value["lessons"]["l1"].as_object().unwrap();
        assert!(!lesson_obj.contains_key("completed_at"));
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let lesson = LessonId::new("l1");
        let mut progress = snapshot_with_lesson(&lesson);
        progress.project = Some(ProjectProgress::begun_at(fixed_now()));

        let json = serde_json::to_string(&progress).unwrap();
        let back: CourseProgress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, progress);
    }
}
