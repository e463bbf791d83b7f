use crate::integration::support::{seeded, session_at, upload, TestStorage};
use cidnav::config::StorageConfig;
use cidnav::resolve::{resolve_unique_name, NameKind};
use cidnav::upload::{FileStatus, UploadQueue};
use cidnav::{ApiError, StorageClient};
use std::sync::Arc;

#[tokio::test]
async fn failed_transfer_stops_batch_without_commit() {
    let store = TestStorage::new(seeded(&[]).await);
    store.fail_on("c.txt");
    let before = store.inner.committed_root();

    let mut queue = UploadQueue::new(true);
    queue.show(
        "",
        vec![upload("a.txt", "a"), upload("b.txt", "b"), upload("c.txt", "c")],
    );
    let err = queue.submit(Some(&store)).await.unwrap_err();

    assert!(matches!(err, ApiError::UploadFailed { index: 2, .. }));
    let records = queue.records();
    assert_eq!(records[0].status, FileStatus::Success);
    assert_eq!(records[0].percentage, 100);
    assert_eq!(records[1].status, FileStatus::Success);
    assert_eq!(records[2].status, FileStatus::Failed);
    assert_eq!(records[2].percentage, 0);
    assert_eq!(store.applies(), 0);
    assert_eq!(store.inner.committed_root(), before);
}

#[tokio::test]
async fn resubmit_uploads_only_unfinished_records() {
    let store = TestStorage::new(seeded(&[]).await);
    store.fail_on("c.txt");
    let mut queue = UploadQueue::new(true);
    queue.show(
        "/inbox",
        vec![upload("a.txt", "a"), upload("b.txt", "b"), upload("c.txt", "c")],
    );
    assert!(queue.submit(Some(&store)).await.is_err());

    store.heal();
    let outcome = queue.submit(Some(&store)).await.unwrap();
    assert_eq!(outcome.paths, vec!["/inbox/c.txt"]);
    assert_eq!(store.applies(), 1);
    assert!(queue.records().iter().all(|r| r.status == FileStatus::Success));

    // records staged by the failed attempt land in the same snapshot
    for path in ["/inbox/a.txt", "/inbox/b.txt", "/inbox/c.txt"] {
        assert!(store.inner.get_file_node(path).await.is_ok(), "{}", path);
    }
    assert!(matches!(
        queue.submit(Some(&store)).await,
        Err(ApiError::QueueEmpty)
    ));
}

#[tokio::test]
async fn colliding_upload_gets_suffixed_name() {
    let store = TestStorage::new(seeded(&[("/docs/a.txt", "old")]).await);
    let mut queue = UploadQueue::new(true);
    queue.show("/docs", vec![upload("a.txt", "new"), upload("b.txt", "b")]);

    let outcome = queue.submit(Some(&store)).await.unwrap();
    assert_eq!(outcome.paths, vec!["/docs/a(1).txt", "/docs/b.txt"]);
    assert_eq!(store.applies(), 1);
    assert_eq!(outcome.root_cid, store.inner.committed_root());
}

#[tokio::test]
async fn cancel_discards_staged_batch() {
    let store = Arc::new(TestStorage::new(seeded(&[]).await));
    store.gate("b.txt");
    let mut queue = UploadQueue::new(true);
    queue.show("", vec![upload("a.txt", "a"), upload("b.txt", "b")]);
    let handle = queue.cancel_handle();

    let canceller = {
        let store = store.clone();
        async move {
            store.reached.notified().await;
            handle.cancel();
        }
    };
    let (result, ()) = tokio::join!(queue.submit(Some(&*store)), canceller);

    assert!(matches!(result, Err(ApiError::Cancelled)));
    assert!(queue
        .records()
        .iter()
        .all(|r| r.status == FileStatus::Listed && r.percentage == 0));
    assert_eq!(store.resets(), 1);
    assert_eq!(store.applies(), 0);
    assert!(store.inner.get_file_node("/a.txt").await.is_err());
}

#[tokio::test]
async fn cancel_after_failed_batch_requeues_earlier_transfers() {
    let store = Arc::new(TestStorage::new(seeded(&[]).await));
    store.fail_on("c.txt");
    let mut queue = UploadQueue::new(true);
    queue.show(
        "",
        vec![upload("a.txt", "a"), upload("b.txt", "b"), upload("c.txt", "c")],
    );
    assert!(queue.submit(Some(&*store)).await.is_err());
    assert!(queue.records()[0].is_staged());

    store.heal();
    store.gate("c.txt");
    let handle = queue.cancel_handle();
    let canceller = {
        let store = store.clone();
        async move {
            store.reached.notified().await;
            handle.cancel();
        }
    };
    let (result, ()) = tokio::join!(queue.submit(Some(&*store)), canceller);
    assert!(matches!(result, Err(ApiError::Cancelled)));

    // the reset dropped a.txt and b.txt too, so none may claim success
    assert!(queue
        .records()
        .iter()
        .all(|r| r.status == FileStatus::Listed && r.percentage == 0 && !r.is_staged()));

    store.open_gate();
    let outcome = queue.submit(Some(&*store)).await.unwrap();
    assert_eq!(outcome.paths, vec!["/a.txt", "/b.txt", "/c.txt"]);
    for path in ["/a.txt", "/b.txt", "/c.txt"] {
        assert!(store.inner.get_file_node(path).await.is_ok(), "{}", path);
    }
    assert!(queue.records().iter().all(|r| r.status == FileStatus::Success));
}

#[tokio::test]
async fn reopening_view_requeues_uncommitted_transfers() {
    let store = Arc::new(TestStorage::new(seeded(&[]).await));
    store.fail_on("b.txt");
    let (mut session, _) = session_at(store.clone(), StorageConfig::default(), "/").await;
    assert!(session.open_upload_modal(None, vec![upload("a.txt", "a"), upload("b.txt", "b")]));
    assert!(session.submit_uploads().await.is_err());
    assert_eq!(session.uploads().records()[0].status, FileStatus::Success);

    session.on_show().await.unwrap();
    assert!(session
        .uploads()
        .records()
        .iter()
        .all(|r| r.status != FileStatus::Success && !r.is_staged()));
    assert!(store.inner.get_file_node("/a.txt").await.is_err());
}

#[tokio::test]
async fn single_mode_queue_uploads_latest_file() {
    let store = TestStorage::new(seeded(&[]).await);
    let mut queue = UploadQueue::new(false);
    queue.show("", vec![upload("a.txt", "a"), upload("b.txt", "b")]);
    queue.add_files(vec![upload("c.txt", "c")]);

    let outcome = queue.submit(Some(&store)).await.unwrap();
    assert_eq!(outcome.paths, vec!["/c.txt"]);
    assert!(store.inner.get_file_node("/a.txt").await.is_err());
}

#[tokio::test]
async fn failed_existence_lookup_keeps_desired_name() {
    let store = TestStorage::new(seeded(&[("/docs/a.txt", "old")]).await);
    let docs = store.get_file_node("/docs").await.unwrap();
    store.break_lookups();

    let name = resolve_unique_name(&store, &docs, "a.txt", NameKind::File).await;
    assert_eq!(name, "a.txt");
    let name = resolve_unique_name(&store, &docs, "New folder", NameKind::Folder).await;
    assert_eq!(name, "New folder");
}

#[tokio::test]
async fn submit_preconditions() {
    let store = TestStorage::new(seeded(&[]).await);
    let mut queue = UploadQueue::new(true);
    assert!(matches!(
        queue.submit(Some(&store)).await,
        Err(ApiError::QueueEmpty)
    ));
    queue.add_files(vec![upload("a.txt", "a")]);
    assert!(matches!(
        queue.submit(None).await,
        Err(ApiError::StorageNotBound)
    ));
    assert_eq!(queue.records()[0].status, FileStatus::Listed);
}
