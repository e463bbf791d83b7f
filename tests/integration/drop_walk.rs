use crate::integration::support::{seeded, session_at};
use cidnav::config::StorageConfig;
use cidnav::upload::FileStatus;
use cidnav::StorageClient;

#[tokio::test]
async fn dropped_folder_uploads_into_current_folder() {
    let tmp = tempfile::tempdir().unwrap();
    let album = tmp.path().join("album");
    std::fs::create_dir_all(album.join("raw")).unwrap();
    std::fs::write(album.join("cover.png"), b"cover").unwrap();
    std::fs::write(album.join("raw").join("one.png"), b"one").unwrap();

    let store = seeded(&[("/photos/keep.txt", "k")]).await;
    let (mut session, _) = session_at(store.clone(), StorageConfig::default(), "/").await;
    session.open_folder("/photos", false).await.unwrap();

    let count = session.drop_files(&[album], None).unwrap();
    assert_eq!(count, 2);
    assert_eq!(session.uploads().folder_path(), "/photos");

    let outcome = session.submit_uploads().await.unwrap();
    assert_eq!(
        outcome.paths,
        vec!["/photos/album/cover.png", "/photos/album/raw/one.png"]
    );
    assert!(session
        .uploads()
        .records()
        .iter()
        .all(|r| r.status == FileStatus::Success));
    assert!(store.get_file_node("/photos/album/raw/one.png").await.is_ok());
    assert_eq!(session.state().current_path, "/photos");
}

#[tokio::test]
async fn upload_modal_collects_into_dated_assets_folder() {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("logo.svg");
    std::fs::write(&file, b"<svg/>").unwrap();

    let store = seeded(&[("/_assets/keep.txt", "k")]).await;
    let config = StorageConfig {
        is_upload_modal: true,
        ..Default::default()
    };
    let (mut session, _) = session_at(store, config, "/").await;
    assert!(session.uploads().folder_path().starts_with("/_assets/uploads_"));

    session.drop_files(&[file], None).unwrap();
    let outcome = session.submit_uploads().await.unwrap();
    assert!(outcome.paths[0].starts_with("/_assets/uploads_"));
    assert!(outcome.paths[0].ends_with("/logo.svg"));
}
