use std::sync::Arc;

use course_core::model::{
    AttemptStatus, ConceptId, CourseId, CourseProgress, FeedbackId, FeedbackKind, LessonId, PartId,
    UserId,
};
use course_core::time::fixed_clock;
use services::{FeedbackService, ProgressService, ProjectService, RecordingSink};
use storage::document::{DocumentStore, InMemoryStore};
use storage::paths;

async fn reload(store: &InMemoryStore, user: &UserId, course: &CourseId) -> CourseProgress {
    let value = store
        .get(&paths::course_doc(user, course))
        .await
        .unwrap()
        .expect("course document exists");
    serde_json::from_value(value).unwrap()
}

#[tokio::test]
async fn full_course_flow_round_trips_through_store() {
    let store = InMemoryStore::new();
    let sink = RecordingSink::new();

    let progress_svc = ProgressService::new(Arc::new(store.clone()), Arc::new(sink.clone()))
        .with_clock(fixed_clock());
    let project_svc = ProjectService::new(Arc::new(store.clone()), Arc::new(sink.clone()))
        .with_clock(fixed_clock());
    let feedback_svc = FeedbackService::new(Arc::new(store.clone()), Arc::new(sink.clone()));

    let student = UserId::new("ada");
    let mentor = UserId::new("grace");
    let course = CourseId::new("privacy-101");
    let lesson = LessonId::new("l1");
    let concept = ConceptId::new("c1");
    let part = PartId::new("p1");

    // lesson and concept work
    let mut progress = CourseProgress::default();
    progress_svc
        .lesson_started(&student, &course, &mut progress, &lesson)
        .await
        .unwrap();

    let mut progress = reload(&store, &student, &course).await;
    progress_svc
        .concept_started(&student, &course, &mut progress, &lesson, &concept)
        .await
        .unwrap();

    let progress = reload(&store, &student, &course).await;
    progress_svc
        .quiz_finished(&student, &course, &progress, &lesson, &concept, 1, 4, 5)
        .await
        .unwrap()
        .expect("quiz attempt stored");

    let progress = reload(&store, &student, &course).await;
    progress_svc
        .concept_completed(&student, &course, &progress, &lesson, &concept)
        .await
        .unwrap();
    progress_svc
        .lesson_completed(&student, &course, &progress, &lesson)
        .await
        .unwrap();

    // project work
    let mut progress = reload(&store, &student, &course).await;
    project_svc
        .part_begun(&student, &course, &mut progress, &part)
        .await
        .unwrap();

    let progress = reload(&store, &student, &course).await;
    let submission = project_svc
        .submit_attempt(&student, &course, &progress, &part, "my project")
        .await
        .unwrap()
        .expect("submission accepted");

    let mut progress = reload(&store, &student, &course).await;
    project_svc
        .review_submission(
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

    // feedback
    feedback_svc
        .provide(
            &student,
            &course,
            &FeedbackId::new("l1"),
            5,
            Some("great".into()),
            FeedbackKind::Lesson,
        )
        .await
        .unwrap();

    // final snapshot state
    let final_progress = reload(&store, &student, &course).await;
    assert!(final_progress.has_started());
    assert!(final_progress.has_completed_lesson(&lesson));
    assert!(final_progress.has_completed_concept(&lesson, &concept));
    assert_eq!(final_progress.quiz_attempts(&lesson, &concept), 1);

    let final_part = final_progress.part(&part).expect("part exists");
    assert!(final_part.completed_at.is_some());
    assert_eq!(final_part.submissions.len(), 1);
    assert_eq!(final_part.submissions[0].status, Some(AttemptStatus::Passed));

    // mentor ledger exists
    let ledger = store
        .get(&paths::mentor_review_doc(&mentor, &submission))
        .await
        .unwrap()
        .expect("ledger entry exists");
    assert_eq!(ledger["status"], "reviewed");

    // one event per handler decision, in call order
    assert_eq!(
        sink.event_names().unwrap(),
        vec![
            "course_started",
            "lesson_started",
            "concept_started",
            "quiz_completed",
            "concept_completed",
            "lesson_completed",
            "project_started",
            "project_part_started",
            "project_submission_created",
            "project_submission_reviewed",
            "feedback_created",
        ]
    );
}

#[tokio::test]
async fn replayed_flow_writes_nothing_twice() {
    let store = InMemoryStore::new();
    let sink = RecordingSink::new();

    let progress_svc = ProgressService::new(Arc::new(store.clone()), Arc::new(sink.clone()))
        .with_clock(fixed_clock());

    let student = UserId::new("ada");
    let course = CourseId::new("privacy-101");
    let lesson = LessonId::new("l1");
    let concept = ConceptId::new("c1");

    let mut progress = CourseProgress::default();
    progress_svc
        .lesson_started(&student, &course, &mut progress, &lesson)
        .await
        .unwrap();
    let mut progress = reload(&store, &student, &course).await;
    progress_svc
        .concept_started(&student, &course, &mut progress, &lesson, &concept)
        .await
        .unwrap();
    let progress = reload(&store, &student, &course).await;
    progress_svc
        .concept_completed(&student, &course, &progress, &lesson, &concept)
        .await
        .unwrap();

    let events_after_first_pass = sink.event_names().unwrap().len();

    // replay the same calls against a fresh snapshot of the stored state
    let mut progress = reload(&store, &student, &course).await;
    assert!(!progress_svc
        .concept_started(&student, &course, &mut progress, &lesson, &concept)
        .await
        .unwrap());
    let progress = reload(&store, &student, &course).await;
    assert!(!progress_svc
        .concept_completed(&student, &course, &progress, &lesson, &concept)
        .await
        .unwrap());

    assert_eq!(sink.event_names().unwrap().len(), events_after_first_pass);
}
