use std::sync::Arc;

use tripwire_core::AppError;

use crate::test_fakes::{FakeAuditRecordRepository, table};

use super::EventRecorder;

#[tokio::test]
async fn record_is_idempotent_per_event_id() {
    let repository = Arc::new(FakeAuditRecordRepository::default());
    let recorder = EventRecorder::new(repository.clone());
    let raw = r#"{"eventID":"e1","eventName":"ConsoleLogin"}"#;

    let first = recorder.record(&table(), raw, "RootLogin").await;
    assert!(first.is_ok());
    assert_eq!(
        first
            .unwrap_or_else(|_| unreachable!())
            .map(|event_id| event_id.as_str().to_owned()),
        Some("e1".to_owned())
    );

    let second = recorder.record(&table(), raw, "RootLogin").await;
    assert!(second.is_ok());
    assert!(second.unwrap_or_else(|_| unreachable!()).is_none());

    assert_eq!(repository.records.lock().await.len(), 1);
    let stored = repository.stored("audit", "e1").await;
    assert!(stored.is_some());
    let stored = stored.unwrap_or_else(|| unreachable!());
    assert!(stored.ticket_id().is_none());
    assert_eq!(stored.alarm_type(), "RootLogin");
}

#[tokio::test]
async fn record_does_not_overwrite_existing_record() {
    let repository = Arc::new(FakeAuditRecordRepository::default());
    let recorder = EventRecorder::new(repository.clone());

    let first = recorder
        .record(&table(), r#"{"eventID":"e1","eventName":"First"}"#, "AlarmA")
        .await;
    assert!(first.is_ok());
    let second = recorder
        .record(&table(), r#"{"eventID":"e1","eventName":"Second"}"#, "AlarmB")
        .await;
    assert!(second.is_ok());

    let stored = repository
        .stored("audit", "e1")
        .await
        .unwrap_or_else(|| unreachable!());
    assert_eq!(stored.alarm_type(), "AlarmA");
    assert_eq!(
        stored.log_record().get("eventName"),
        Some(&serde_json::json!("First"))
    );
}

#[tokio::test]
async fn concurrent_records_for_same_event_store_exactly_one() {
    let repository = Arc::new(FakeAuditRecordRepository::default());
    let recorder = Arc::new(EventRecorder::new(repository.clone()));

    let mut handles = Vec::new();
    for _ in 0..16 {
        let recorder = recorder.clone();
        handles.push(tokio::spawn(async move {
            recorder
                .record(&table(), r#"{"eventID":"race"}"#, "Alarm")
                .await
        }));
    }

    let mut created = 0;
    for handle in handles {
        let result = handle.await;
        assert!(result.is_ok());
        let result = result.unwrap_or_else(|_| unreachable!());
        assert!(result.is_ok());
        if result.unwrap_or_else(|_| unreachable!()).is_some() {
            created += 1;
        }
    }

    assert_eq!(created, 1);
    assert_eq!(repository.records.lock().await.len(), 1);
}

#[tokio::test]
async fn record_rejects_malformed_entries() {
    let recorder = EventRecorder::new(Arc::new(FakeAuditRecordRepository::default()));

    let result = recorder.record(&table(), "{not json", "Alarm").await;
    assert!(matches!(result, Err(AppError::MalformedLogEntry(_))));
}

#[tokio::test]
async fn record_batch_skips_malformed_and_duplicate_entries() {
    let repository = Arc::new(FakeAuditRecordRepository::default());
    let recorder = EventRecorder::new(repository.clone());
    let entries = vec![
        r#"{"eventID":"a"}"#.to_owned(),
        "garbage".to_owned(),
        r#"{"eventName":"NoId"}"#.to_owned(),
        r#"{"eventID":"b"}"#.to_owned(),
        r#"{"eventID":"a"}"#.to_owned(),
    ];

    let events = recorder.record_batch(&table(), &entries, "Alarm").await;
    assert!(events.is_ok());
    let events: Vec<String> = events
        .unwrap_or_default()
        .iter()
        .map(|event_id| event_id.as_str().to_owned())
        .collect();
    assert_eq!(events, vec!["a".to_owned(), "b".to_owned()]);

    let replay = recorder.record_batch(&table(), &entries, "Alarm").await;
    assert!(replay.is_ok());
    assert!(replay.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn record_batch_propagates_store_failures() {
    let repository = Arc::new(FakeAuditRecordRepository::default());
    *repository.fail_writes.lock().await = true;
    let recorder = EventRecorder::new(repository);

    let result = recorder
        .record_batch(&table(), &[r#"{"eventID":"a"}"#.to_owned()], "Alarm")
        .await;
    assert!(matches!(result, Err(AppError::Store(_))));
}

#[tokio::test]
async fn record_batch_keeps_entries_inserted_before_a_store_failure() {
    let repository = Arc::new(FakeAuditRecordRepository::default());
    *repository.fail_insert_for.lock().await = Some("b".to_owned());
    let recorder = EventRecorder::new(repository.clone());
    let entries = vec![
        r#"{"eventID":"a"}"#.to_owned(),
        r#"{"eventID":"b"}"#.to_owned(),
    ];

    let aborted = recorder.record_batch(&table(), &entries, "Alarm").await;
    assert!(matches!(aborted, Err(AppError::Store(_))));
    assert!(repository.stored("audit", "a").await.is_some());
    assert!(repository.stored("audit", "b").await.is_none());

    *repository.fail_insert_for.lock().await = None;
    let retried = recorder.record_batch(&table(), &entries, "Alarm").await;
    let retried: Vec<String> = retried
        .unwrap_or_default()
        .into_iter()
        .map(|event_id| event_id.as_str().to_owned())
        .collect();
    assert_eq!(retried, vec!["b".to_owned()]);

    let stranded = repository.stored("audit", "a").await;
    assert!(stranded.is_some_and(|record| record.ticket_id().is_none()));
}
