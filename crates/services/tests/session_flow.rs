use std::sync::Arc;

use exam_core::model::{MockTestId, OptionId, SessionPhase, SessionSettingsDraft, SubmissionKind};
use exam_core::time::fixed_now;
use services::{AppServices, Clock, SessionEvent};
use storage::repository::{InMemoryRepository, Storage};

async fn app(draft: SessionSettingsDraft) -> AppServices {
    AppServices::in_memory_seeded(Clock::fixed(fixed_now()), draft.validate().unwrap())
        .await
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn full_attempt_is_scored_persisted_and_listed() {
    let app = app(SessionSettingsDraft::default()).await;
    let mock_tests = app.mock_tests();
    let active = mock_tests.start_test(&MockTestId::new("mock-4")).await.unwrap();

    // Two right, one wrong, one marked and left unanswered.
    active.select_option(OptionId::new("a")).await.unwrap();
    active.next().await.unwrap();
    active.select_option(OptionId::new("a")).await.unwrap();
    active.next().await.unwrap();
    active.select_option(OptionId::new("b")).await.unwrap();
    active.next().await.unwrap();
    active.mark_for_review().await.unwrap();

    let progress = active.progress().await;
    assert_eq!(progress.attempted(), 3);
    assert_eq!(progress.marked, 1);
    assert_eq!(progress.unanswered, 11);

    let current = active.current().await.unwrap();
    assert_eq!(current.index, 3);
    assert_eq!(current.total, 15);

    let result = active.submit().await.unwrap();
    assert_eq!(result.obtained_marks(), 7);
    assert_eq!(result.total_marks(), 60);
    assert_eq!((result.correct(), result.wrong(), result.unanswered()), (2, 1, 12));
    assert!(result.outcomes()[3].was_marked);

    let id = mock_tests.persist_result(&active).await.unwrap();
    let results = app.results();
    let history = results.list_recent(10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, id);
    assert_eq!(history[0].obtained_marks, 7);

    let catalog = results.catalog().await.unwrap();
    let quick = catalog
        .iter()
        .find(|entry| entry.summary.id == MockTestId::new("mock-4"))
        .unwrap();
    assert!(quick.attempted);
    assert_eq!(quick.best_obtained_marks, Some(7));

    let stats = results.stats().await.unwrap();
    assert_eq!(stats.attempts, 1);
}

#[tokio::test(start_paused = true)]
async fn countdown_expiry_auto_submits_with_answers_so_far() {
    let app = app(SessionSettingsDraft {
        duration_override_secs: Some(5),
        ..SessionSettingsDraft::default()
    })
    .await;
    let mock_tests = app.mock_tests();
    let active = mock_tests.start_test(&MockTestId::new("mock-1")).await.unwrap();
    let mut events = active.subscribe();

    active.select_option(OptionId::new("a")).await.unwrap();

    let mut ticks = 0;
    let result = loop {
        match events.recv().await.unwrap() {
            SessionEvent::Tick { .. } => ticks += 1,
            SessionEvent::LowTime { remaining_secs } => assert!(remaining_secs <= 5),
            SessionEvent::Submitted { kind, result } => {
                assert_eq!(kind, SubmissionKind::TimeExpired);
                break result;
            }
        }
    };

    assert_eq!(ticks, 5);
    assert_eq!(result.obtained_marks(), 4);
    assert_eq!(result.time_taken_secs(), 5);
    assert_eq!(active.snapshot().await.phase, SessionPhase::Submitted);

    assert!(active.submit().await.unwrap_err().is_already_submitted());
    assert!(active
        .select_option(OptionId::new("b"))
        .await
        .unwrap_err()
        .is_already_submitted());

    let id = mock_tests.persist_result(&active).await.unwrap();
    let stored = app.results().get_result(id).await.unwrap();
    assert_eq!(stored.submission(), SubmissionKind::TimeExpired);
}

#[tokio::test(start_paused = true)]
async fn pause_stretches_the_attempt() {
    let app = app(SessionSettingsDraft {
        duration_override_secs: Some(3),
        ..SessionSettingsDraft::default()
    })
    .await;
    let active = app
        .mock_tests()
        .start_test(&MockTestId::new("mock-4"))
        .await
        .unwrap();

    active.pause().await.unwrap();
    tokio::time::sleep(std::time::Duration::from_secs(30)).await;
    assert!(!active.is_submitted().await);
    assert_eq!(active.snapshot().await.remaining_secs, 3);

    active.resume().await.unwrap();
    tokio::time::sleep(std::time::Duration::from_secs(4)).await;
    assert!(active.is_submitted().await);
}

#[tokio::test]
async fn empty_storage_has_no_catalog() {
    let repo = InMemoryRepository::new();
    let storage = Storage {
        question_bank: Arc::new(repo.clone()),
        results: Arc::new(repo),
    };
    let app = AppServices::new(&storage, Clock::default(), Default::default());
    assert!(app.results().catalog().await.unwrap().is_empty());
    assert!(app.results().list_recent(5).await.unwrap().is_empty());
}
