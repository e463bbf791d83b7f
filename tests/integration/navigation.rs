use crate::integration::support::{seeded, session_at, upload};
use cidnav::config::StorageConfig;
use cidnav::handlers::OpenMode;
use cidnav::session::StorageHooks;
use cidnav::{ApiError, StorageClient, StorageError};
use parking_lot::Mutex;
use std::sync::Arc;

fn names(session: &cidnav::StorageSession) -> Vec<String> {
    session.table().iter().map(|r| r.name.clone()).collect()
}

#[tokio::test]
async fn fresh_session_writes_live_root_to_url() {
    let store = seeded(&[("/a.txt", "a")]).await;
    let root = store.committed_root();
    let (session, history) = session_at(store, StorageConfig::default(), "/").await;

    assert!(!session.state().read_only);
    assert_eq!(session.state().root_cid.as_deref(), Some(root.as_str()));
    assert_eq!(history.entries().last().unwrap(), &format!("#/{}", root));
    assert_eq!(names(&session), vec!["a.txt"]);
}

#[tokio::test]
async fn foreign_cid_is_read_only() {
    let store = seeded(&[("/a.txt", "a")]).await;
    let old_root = store.committed_root();
    store.add_file_content("/b.txt", "b").await.unwrap();
    store.apply_updates().await.unwrap();

    let location = format!("#/{}", old_root);
    let (mut session, _) = session_at(store.clone(), StorageConfig::default(), &location).await;
    let viewed_root = store.committed_root();

    assert!(session.state().read_only);
    assert_eq!(names(&session), vec!["a.txt"]);
    assert!(matches!(
        session.rename_node("/a.txt", "c.txt").await,
        Err(ApiError::ReadOnly(_))
    ));
    assert!(matches!(
        session.add_new_folder(None).await,
        Err(ApiError::ReadOnly(_))
    ));
    assert!(!session.open_upload_modal(None, vec![upload("x.txt", "x")]));
    assert!(matches!(
        session.upload_files(vec![upload("x.txt", "x")]).await,
        Err(ApiError::ReadOnly(_))
    ));
    session.uploads_mut().show("", vec![upload("y.txt", "y")]);
    assert!(matches!(
        session.submit_uploads().await,
        Err(ApiError::ReadOnly(_))
    ));
    assert_eq!(store.committed_root(), viewed_root);
    assert!(store.get_file_node("/x.txt").await.is_err());
}

#[tokio::test]
async fn live_cid_in_url_is_writable() {
    let store = seeded(&[("/a.txt", "a")]).await;
    let location = format!("#/{}", store.committed_root());
    let (session, _) = session_at(store, StorageConfig::default(), &location).await;
    assert!(!session.state().read_only);
}

#[tokio::test]
async fn modal_session_never_touches_url() {
    let store = seeded(&[("/docs/a.md", "a")]).await;
    let config = StorageConfig {
        is_modal: true,
        ..Default::default()
    };
    let foreign = "#/bafyforeign".to_string();
    let (mut session, history) = session_at(store, config, &foreign).await;

    assert!(!session.state().read_only);
    session.open_folder("/docs", false).await.unwrap();
    assert_eq!(history.entries(), vec![foreign]);
    assert_eq!(names(&session), vec!["a.md"]);
}

#[tokio::test]
async fn rename_collision_gets_suffix_and_shows_parent() {
    let store = seeded(&[("/docs/a.txt", "a"), ("/docs/b.txt", "b")]).await;
    let (mut session, history) = session_at(store.clone(), StorageConfig::default(), "/").await;

    let root = session.rename_node("/docs/b.txt", "a.txt").await.unwrap();
    assert_eq!(root, store.committed_root());
    assert_eq!(session.state().current_path, "/docs");
    assert_eq!(names(&session), vec!["a(1).txt", "a.txt"]);
    assert_eq!(
        history.entries().last().unwrap(),
        &format!("#/{}/docs", root)
    );
}

#[tokio::test]
async fn renaming_to_same_name_commits_nothing() {
    let store = seeded(&[("/a.txt", "a")]).await;
    let before = store.committed_root();
    let (mut session, _) = session_at(store.clone(), StorageConfig::default(), "/").await;
    assert_eq!(session.rename_node("/a.txt", "a.txt").await.unwrap(), before);
    assert_eq!(store.committed_root(), before);
}

#[tokio::test]
async fn renamed_folder_is_displayed() {
    let store = seeded(&[("/docs/a.txt", "a")]).await;
    let (mut session, _) = session_at(store, StorageConfig::default(), "/").await;
    session.rename_node("/docs", "notes").await.unwrap();
    assert_eq!(session.state().current_path, "/notes");
    assert_eq!(names(&session), vec!["a.txt"]);
}

#[tokio::test]
async fn folder_renamed_onto_taken_names_is_numbered() {
    let store = seeded(&[
        ("/docs/a.txt", "a"),
        ("/notes/x.txt", "x"),
        ("/notes 1/y.txt", "y"),
    ])
    .await;
    let (mut session, _) = session_at(store.clone(), StorageConfig::default(), "/").await;
    session.rename_node("/docs", "notes").await.unwrap();

    assert_eq!(session.state().current_path, "/notes 2");
    assert_eq!(names(&session), vec!["a.txt"]);
    assert!(store.get_file_node("/docs").await.is_err());
    assert!(store.get_file_node("/notes/x.txt").await.is_ok());
}

#[tokio::test]
async fn delete_shows_parent_and_root_is_refused() {
    let store = seeded(&[("/docs/a.txt", "a"), ("/docs/b.txt", "b")]).await;
    let (mut session, _) = session_at(store, StorageConfig::default(), "/").await;

    session.delete_node("/docs/a.txt").await.unwrap();
    assert_eq!(session.state().current_path, "/docs");
    assert_eq!(names(&session), vec!["b.txt"]);
    assert!(matches!(
        session.delete_node("").await,
        Err(ApiError::Storage(StorageError::InvalidPath(_)))
    ));
}

#[tokio::test]
async fn new_folders_are_numbered() {
    let store = seeded(&[]).await;
    let (mut session, _) = session_at(store, StorageConfig::default(), "/").await;
    session.add_new_folder(None).await.unwrap();
    session.add_new_folder(None).await.unwrap();
    assert_eq!(names(&session), vec!["New folder", "New folder 1"]);
}

#[tokio::test]
async fn asset_folder_is_browsed_as_root() {
    let store = seeded(&[("/_assets/img/logo.png", "png"), ("/readme.md", "hi")]).await;
    let assets_cid = store.get_file_node("/_assets").await.unwrap().cid;
    let (mut session, history) = session_at(store.clone(), StorageConfig::default(), "/").await;

    assert!(session.state().asset_root);
    assert_eq!(session.state().root_cid.as_deref(), Some(assets_cid.as_str()));
    assert_eq!(session.state().current_path, "/_assets");
    assert_eq!(names(&session), vec!["img"]);

    session.open_folder("/_assets/img", false).await.unwrap();
    let location = history.entries().last().unwrap().clone();
    assert_eq!(location, format!("#/{}/img", assets_cid));

    // the written location reopens the same folder, writable
    let (reopened, _) = session_at(store, StorageConfig::default(), &location).await;
    assert!(!reopened.state().read_only);
    assert_eq!(reopened.state().current_path, "/_assets/img");
    assert_eq!(names(&reopened), vec!["logo.png"]);
}

#[tokio::test]
async fn file_in_location_is_previewed() {
    let store = seeded(&[("/docs/a.md", "a")]).await;
    let location = format!("#/{}/docs/a.md", store.committed_root());
    let (session, _) = session_at(store, StorageConfig::default(), &location).await;

    assert_eq!(session.state().current_path, "/docs");
    assert_eq!(session.preview().map(|p| p.name.as_str()), Some("a.md"));
    assert_eq!(session.current_file(), Some("a.md"));
}

#[tokio::test]
async fn single_upload_reports_url_through_hook() {
    let store = seeded(&[("/docs/a.md", "a")]).await;
    let config = StorageConfig {
        upload_multiple: false,
        ..Default::default()
    };
    let seen = Arc::new(Mutex::new(Vec::new()));
    let hooks = {
        let seen = seen.clone();
        StorageHooks::default().on_uploaded_file(move |url| seen.lock().push(url.to_string()))
    };
    let (session, _) = session_at(store.clone(), config, "/").await;
    let mut session = session.with_hooks(hooks);

    assert!(session.open_upload_modal(Some("/docs"), vec![upload("pic.png", "x")]));
    let outcome = session.submit_uploads().await.unwrap();
    assert_eq!(outcome.paths, vec!["/docs/pic.png"]);

    let docs_cid = store.get_file_node("/docs").await.unwrap().cid;
    assert_eq!(
        seen.lock().clone(),
        vec![format!("https://ipfs.io/ipfs/{}/pic.png", docs_cid)]
    );
    assert_eq!(session.state().current_path, "");
}

#[tokio::test]
async fn host_upload_api_returns_gateway_urls() {
    let store = seeded(&[("/a.txt", "a")]).await;
    let (mut session, _) = session_at(store.clone(), StorageConfig::default(), "/").await;

    let uploaded = session
        .upload_files(vec![upload("a.txt", "again"), upload("new/b.txt", "b")])
        .await
        .unwrap();
    let root = store.committed_root();
    assert_eq!(uploaded[0].file_name, "a.txt");
    assert_eq!(uploaded[0].url, format!("https://ipfs.io/ipfs/{}/a(1).txt", root));
    assert_eq!(uploaded[1].url, format!("https://ipfs.io/ipfs/{}/new/b.txt", root));
}

#[tokio::test]
async fn opening_files_dispatches_to_handlers() {
    let store = seeded(&[("/docs/a.md", "a"), ("/docs/raw.bin", "b")]).await;
    let docs_cid = store.get_file_node("/docs").await.unwrap().cid;
    let (mut session, _) = session_at(store, StorageConfig::default(), "/").await;

    let folder = session.open_folder("/docs", false).await.unwrap();
    let md = folder.links.iter().find(|l| l.name == "a.md").unwrap();
    let opened = session.open_file(md).await.unwrap().unwrap();
    assert_eq!(opened.mode, OpenMode::Edit);
    assert_eq!(opened.url, format!("https://ipfs.io/ipfs/{}/a.md", docs_cid));

    let raw = folder.links.iter().find(|l| l.name == "raw.bin").unwrap();
    assert!(session.open_file(raw).await.unwrap().is_none());
}

#[tokio::test]
async fn saving_content_commits_and_keeps_folder() {
    let store = seeded(&[("/docs/a.md", "a")]).await;
    let (mut session, _) = session_at(store.clone(), StorageConfig::default(), "/").await;
    session.open_folder("/docs", false).await.unwrap();

    let root = session.save_file_content("/docs/a.md", "longer").await.unwrap();
    assert_eq!(root, store.committed_root());
    assert_eq!(session.state().current_path, "/docs");
    assert_eq!(session.table()[0].size, 6);
}

#[tokio::test]
async fn selecting_a_file_row_opens_url_for_host() {
    let store = seeded(&[("/a.txt", "a")]).await;
    let root = store.committed_root();
    let opened = Arc::new(Mutex::new(None));
    let hooks = {
        let opened = opened.clone();
        StorageHooks::default().on_open(move |url| *opened.lock() = Some(url.to_string()))
    };
    let (session, _) = session_at(store, StorageConfig::default(), "/").await;
    let mut session = session.with_hooks(hooks);

    session.select_row(0).await.unwrap();
    assert_eq!(session.current_file(), Some("a.txt"));
    let url = session.open_url_for_current_file().unwrap();
    assert_eq!(url, format!("https://ipfs.io/ipfs/{}/a.txt", root));
    assert_eq!(opened.lock().clone(), Some(url));
    assert!(matches!(
        session.select_row(9).await,
        Err(ApiError::NotFound(_))
    ));
}
