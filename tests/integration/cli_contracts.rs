use cidnav::config::CidnavConfig;
use cidnav::tooling::cli::{CliContext, Commands};
use tempfile::TempDir;

fn context(dir: &TempDir) -> CliContext {
    CliContext::new(CidnavConfig::default(), Some(dir.path().join("store.json"))).unwrap()
}

#[tokio::test]
async fn upload_json_contract_has_root_and_paths() {
    let dir = TempDir::new().unwrap();
    let local = dir.path().join("notes.md");
    std::fs::write(&local, "# notes").unwrap();

    let output = context(&dir)
        .execute(&Commands::Upload {
            paths: vec![local],
            to: Some("/docs".to_string()),
            format: "json".to_string(),
        })
        .await
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert!(parsed.get("root_cid").and_then(|v| v.as_str()).is_some());
    assert_eq!(parsed["paths"][0], "/docs/notes.md");
}

#[tokio::test]
async fn ls_json_contract_has_row_fields() {
    let dir = TempDir::new().unwrap();
    let local = dir.path().join("a.txt");
    std::fs::write(&local, "abc").unwrap();
    let ctx = context(&dir);
    ctx.execute(&Commands::Upload {
        paths: vec![local],
        to: None,
        format: "text".to_string(),
    })
    .await
    .unwrap();

    let output = ctx
        .execute(&Commands::Ls {
            path: None,
            format: "json".to_string(),
        })
        .await
        .unwrap();
    let rows: serde_json::Value = serde_json::from_str(&output).unwrap();
    let row = &rows[0];
    for field in ["name", "cid", "type", "size", "path"] {
        assert!(row.get(field).is_some(), "missing {}", field);
    }
    assert_eq!(row["path"], "/a.txt");
    assert_eq!(row["size"], 3);
}

#[tokio::test]
async fn rm_then_ls_is_empty() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    ctx.execute(&Commands::Mkdir { parent: None }).await.unwrap();
    ctx.execute(&Commands::Rm {
        path: "/New folder".to_string(),
    })
    .await
    .unwrap();
    let output = ctx
        .execute(&Commands::Ls {
            path: None,
            format: "json".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(output.trim(), "[]");
}

#[tokio::test]
async fn missing_path_is_an_error() {
    let dir = TempDir::new().unwrap();
    assert!(context(&dir)
        .execute(&Commands::Rm {
            path: "/nope".to_string(),
        })
        .await
        .is_err());
}
