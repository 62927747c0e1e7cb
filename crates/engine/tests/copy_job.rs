use connectors::{error::StoreError, memory::MemoryTable};
use engine::{
    config::{CopyConfig, CopySettings},
    error::{CopyError, Operation},
    job::CopyJob,
};
use model::{record::Record, value::AttrValue};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn record(id: u32) -> Record {
    Record::from_iter([
        ("PK".to_string(), AttrValue::S(format!("ITEM#{id:04}"))),
        ("n".to_string(), AttrValue::N(id.to_string())),
    ])
}

fn settings(page_size: usize, max_batch_size: usize) -> CopySettings {
    CopySettings {
        page_size,
        max_batch_size,
        max_attempts: 5,
        base_delay_ms: 1,
        max_delay_ms: 2,
    }
}

async fn tables(record_count: u32) -> (Arc<MemoryTable>, Arc<MemoryTable>) {
    let source = MemoryTable::new(&["PK"]);
    source
        .load((0..record_count).map(record).collect())
        .await
        .expect("seed source");
    (Arc::new(source), Arc::new(MemoryTable::new(&["PK"])))
}

fn job(source: &Arc<MemoryTable>, target: &Arc<MemoryTable>, settings: CopySettings) -> CopyJob {
    let config = CopyConfig::new("src-table", "dst-table").with_settings(settings);
    CopyJob::new(source.clone(), target.clone(), config)
}

#[tokio::test]
async fn copies_every_record_for_any_page_size() {
    for page_size in [1usize, 3, 7, 25, 100] {
        let (source, target) = tables(30).await;
        let summary = job(&source, &target, settings(page_size, 25))
            .run()
            .await
            .expect("copy");

        assert_eq!(summary.records_read, 30, "page_size {page_size}");
        assert_eq!(summary.records_written, 30, "page_size {page_size}");
        assert!(summary.is_complete());
        assert_eq!(target.records().await, source.records().await);
    }
}

#[tokio::test]
async fn thirty_records_page_25_makes_two_pages_and_two_batches() {
    let (source, target) = tables(30).await;
    let summary = job(&source, &target, settings(25, 25))
        .run()
        .await
        .expect("copy");

    assert_eq!(summary.records_read, 30);
    assert_eq!(summary.records_written, 30);
    assert_eq!(summary.pages_scanned, 2);
    assert_eq!(summary.failed.len(), 0);
    assert_eq!(target.submissions().await, vec![25, 5]);
}

#[tokio::test]
async fn pages_are_chunked_at_the_batch_ceiling() {
    let (source, target) = tables(60).await;
    // One 60-record page; max_batch_size above the ceiling gets clamped.
    let summary = job(&source, &target, settings(100, 100))
        .run()
        .await
        .expect("copy");

    assert_eq!(target.submissions().await, vec![25, 25, 10]);
    assert_eq!(summary.records_written, 60);
}

#[tokio::test]
async fn only_the_unprocessed_subset_is_resubmitted() {
    let (source, target) = tables(25).await;
    target.plan_unprocessed(vec![4]).await;

    let summary = job(&source, &target, settings(25, 25))
        .run()
        .await
        .expect("copy");

    assert_eq!(target.submissions().await, vec![25, 4]);
    assert_eq!(summary.records_written, 25);
    assert!(summary.is_complete());
    assert_eq!(target.len().await, 25);
}

#[tokio::test]
async fn records_that_never_commit_are_reported_by_key() {
    let (source, target) = tables(25).await;
    // Two records stay unprocessed on every submission; with 3 attempts
    // they are reported rather than retried forever.
    target.plan_unprocessed(vec![2, 2, 2]).await;

    let mut config = settings(25, 25);
    config.max_attempts = 3;
    let summary = job(&source, &target, config).run().await.expect("copy");

    assert_eq!(summary.records_written, 23);
    assert_eq!(summary.failed.len(), 2);
    assert_eq!(target.len().await, 23);
    for failure in &summary.failed {
        assert_eq!(failure.attempts, 3);
        assert!(failure.key.attributes().contains_key("PK"));
    }
    assert_eq!(target.submissions().await, vec![25, 2, 2]);
}

#[tokio::test]
async fn empty_filtered_pages_do_not_terminate_the_scan() {
    let (source, target) = tables(6).await;
    let filtered = (0..3)
        .map(|id| record(id).project_key(&["PK".to_string()]))
        .collect();
    source.filter_out(filtered).await;

    let summary = job(&source, &target, settings(3, 25))
        .run()
        .await
        .expect("copy");

    // First page evaluates 3 records, returns none, and keeps its cursor;
    // the scan must go on.
    assert!(summary.pages_scanned >= 2);
    assert_eq!(summary.records_read, 3);
    assert_eq!(target.len().await, 3);
}

#[tokio::test]
async fn absent_cursor_ends_the_loop_without_an_extra_read() {
    let (source, target) = tables(10).await;
    job(&source, &target, settings(25, 25))
        .run()
        .await
        .expect("copy");

    assert_eq!(source.scan_calls().await, 1);
    assert_eq!(target.len().await, 10);
}

#[tokio::test]
async fn rerunning_the_whole_job_creates_no_duplicates() {
    let (source, target) = tables(30).await;

    let first = job(&source, &target, settings(25, 25))
        .run()
        .await
        .expect("first run");
    let second = job(&source, &target, settings(25, 25))
        .run()
        .await
        .expect("second run");

    assert_eq!(first.records_written, 30);
    assert_eq!(second.records_written, 30);
    assert_eq!(target.len().await, 30);
}

#[tokio::test]
async fn empty_source_completes_cleanly() {
    let (source, target) = tables(0).await;
    let summary = job(&source, &target, settings(25, 25))
        .run()
        .await
        .expect("copy");

    assert_eq!(summary.records_read, 0);
    assert_eq!(summary.records_written, 0);
    assert_eq!(summary.pages_scanned, 1);
    assert!(target.is_empty().await);
}

#[tokio::test]
async fn attribute_encodings_survive_the_copy_unchanged() {
    let mut nested = BTreeMap::new();
    nested.insert("empty_list".to_string(), AttrValue::L(Vec::new()));
    nested.insert("flag".to_string(), AttrValue::Bool(false));

    let special = Record::from_iter([
        ("PK".to_string(), AttrValue::S("SPECIAL".to_string())),
        ("empty_set".to_string(), AttrValue::Ss(Vec::new())),
        ("binary".to_string(), AttrValue::B(vec![0, 255, 16])),
        ("nested".to_string(), AttrValue::M(nested)),
        ("null".to_string(), AttrValue::Null),
        ("exact".to_string(), AttrValue::N("0.10000000000000001".to_string())),
    ]);

    let source = Arc::new(MemoryTable::new(&["PK"]));
    source.load(vec![special.clone()]).await.expect("seed");
    let target = Arc::new(MemoryTable::new(&["PK"]));

    job(&source, &target, settings(25, 25))
        .run()
        .await
        .expect("copy");

    assert_eq!(target.records().await, vec![special]);
}

#[tokio::test]
async fn transient_scan_errors_are_retried_without_losing_position() {
    let (source, target) = tables(10).await;
    source
        .push_scan_fault(StoreError::Throttled("slow down".to_string()))
        .await;
    source
        .push_scan_fault(StoreError::Timeout("deadline".to_string()))
        .await;

    let summary = job(&source, &target, settings(25, 25))
        .run()
        .await
        .expect("copy");

    assert_eq!(summary.records_written, 10);
    // Two faulted attempts plus the one that succeeded.
    assert_eq!(source.scan_calls().await, 3);
}

#[tokio::test]
async fn fatal_scan_errors_abort_with_progress_context() {
    let (source, target) = tables(10).await;
    source
        .push_scan_fault(StoreError::AccessDenied("not allowed".to_string()))
        .await;

    let err = job(&source, &target, settings(25, 25))
        .run()
        .await
        .expect_err("must abort");

    match err {
        CopyError::Store {
            operation,
            records_read,
            records_written,
            source: StoreError::AccessDenied(_),
            ..
        } => {
            assert_eq!(operation, Operation::Scan);
            assert_eq!(records_read, 0);
            assert_eq!(records_written, 0);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn fatal_write_errors_abort_the_job() {
    let (source, target) = tables(10).await;
    target
        .push_write_fault(StoreError::TableNotFound("dst-table".to_string()))
        .await;

    let err = job(&source, &target, settings(25, 25))
        .run()
        .await
        .expect_err("must abort");

    assert!(matches!(
        err,
        CopyError::Store {
            operation: Operation::BatchWrite,
            source: StoreError::TableNotFound(_),
            ..
        }
    ));
}

#[tokio::test]
async fn transient_write_errors_are_retried_then_succeed() {
    let (source, target) = tables(10).await;
    target
        .push_write_fault(StoreError::Throttled("busy".to_string()))
        .await;

    let summary = job(&source, &target, settings(25, 25))
        .run()
        .await
        .expect("copy");

    assert_eq!(summary.records_written, 10);
    assert_eq!(target.submissions().await, vec![10, 10]);
}

#[tokio::test]
async fn cancellation_takes_effect_between_pages() {
    let (source, target) = tables(10).await;
    let cancel = CancellationToken::new();
    cancel.cancel();

    let config = CopyConfig::new("src-table", "dst-table").with_settings(settings(25, 25));
    let err = CopyJob::new(source.clone(), target.clone(), config)
        .with_cancellation(cancel)
        .run()
        .await
        .expect_err("must stop");

    assert!(matches!(err, CopyError::ShutdownRequested { .. }));
    assert!(target.is_empty().await);
}
