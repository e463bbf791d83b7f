use crate::integration::support::{seeded, session_at};
use cidnav::config::StorageConfig;
use cidnav::StorageClient;

#[tokio::test]
async fn displayed_path_expands_ancestors_and_selects_target() {
    let store = seeded(&[("/a/b/c/deep.txt", "x"), ("/z/other.txt", "y")]).await;
    let location = format!("#/{}/a/b", store.committed_root());
    let (session, _) = session_at(store, StorageConfig::default(), &location).await;

    let index = session.tree().index();
    assert!(index.lookup("").unwrap().expanded);
    assert!(index.lookup("/a").unwrap().expanded);
    let target = index.lookup("/a/b").unwrap();
    assert!(target.expanded && target.active);
    assert!(!index.lookup("/a/b/c").unwrap().expanded);
    assert!(!index.lookup("/z").unwrap().expanded);
    assert!(index.lookup("/a/b/c/deep.txt").is_none());

    let crumbs: Vec<_> = session.breadcrumb().iter().map(|c| c.path.as_str()).collect();
    assert_eq!(crumbs, vec!["", "/a", "/a/b"]);
}

#[tokio::test]
async fn mutation_refreshes_cids_along_the_path() {
    let store = seeded(&[("/a/b/file.txt", "x")]).await;
    let (mut session, _) = session_at(store.clone(), StorageConfig::default(), "/").await;
    session.open_folder("/a", false).await.unwrap();
    let old_a = session.tree().index().lookup("/a").unwrap().cid.clone();

    session.add_new_folder(Some("/a/b")).await.unwrap();

    let index = session.tree().index();
    assert_eq!(index.lookup("").unwrap().cid, store.committed_root());
    assert_ne!(index.lookup("/a").unwrap().cid, old_a);
    assert_eq!(
        index.lookup("/a").unwrap().cid,
        store.get_file_node("/a").await.unwrap().cid
    );
}

#[tokio::test]
async fn toggling_an_open_folder_collapses_it() {
    let store = seeded(&[("/a/x.txt", "x")]).await;
    let (mut session, _) = session_at(store, StorageConfig::default(), "/").await;

    session.open_folder("/a", true).await.unwrap();
    assert!(session.tree().index().lookup("/a").unwrap().expanded);
    session.open_folder("/a", true).await.unwrap();
    assert!(!session.tree().index().lookup("/a").unwrap().expanded);
    session.open_folder("/a", false).await.unwrap();
    assert!(session.tree().index().lookup("/a").unwrap().expanded);
}

#[tokio::test]
async fn shown_files_are_indexed() {
    let store = seeded(&[("/a/x.txt", "x")]).await;
    let config = StorageConfig {
        is_file_shown: true,
        ..Default::default()
    };
    let (mut session, _) = session_at(store, config, "/").await;
    session.open_folder("/a", false).await.unwrap();
    assert!(session.tree().index().lookup("/a/x.txt").is_some());
}

#[tokio::test]
async fn untyped_listings_are_probed() {
    let store = cidnav::MemoryStorage::new().with_untyped_links();
    store.add_file_content("/dir/f.txt", "f").await.unwrap();
    store.add_file_content("/top.txt", "t").await.unwrap();
    store.apply_updates().await.unwrap();

    let (session, _) = session_at(
        std::sync::Arc::new(store),
        StorageConfig::default(),
        "/",
    )
    .await;
    let kinds: Vec<_> = session
        .table()
        .iter()
        .map(|r| (r.name.as_str(), r.kind.as_str()))
        .collect();
    assert_eq!(kinds, vec![("dir", "dir"), ("top.txt", "file")]);
}
